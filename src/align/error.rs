use std::path::PathBuf;

/// Error taxonomy for the aligner core.
///
/// Every variant is fatal to the run it occurred in: the aligner is a
/// pipeline, and a partial mapping produced before a failure is not
/// trustworthy, so callers should discard it rather than attempt to salvage
/// anything already emitted.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    #[error(
        "no match found between '{text_file}' and '{audio_file}'; \
         every admissible path is dominated by skipping both sequences \
         (try lowering skip_penalty)"
    )]
    EmptyMatch {
        text_file: String,
        audio_file: String,
    },

    #[error("feature matrix for '{file}' is malformed: {reason}")]
    MalformedFeatureMatrix { file: String, reason: String },

    #[error(
        "anchor table for '{file}' violates strict ascending order at index {index} \
         (frame {previous} followed by {current})"
    )]
    AnchorMonotonicityViolation {
        file: String,
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("failed to read directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AlignError>;
