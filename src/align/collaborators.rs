use std::path::Path;

use ndarray::Array2;

/// One `(start_seconds, fragment_id)` pair produced by a synthesizer,
/// sorted strictly ascending on `start_seconds`.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthAnchor {
    pub start_seconds: f64,
    pub fragment_id: String,
}

/// Synthesizes a text file into audio and reports each fragment's start
/// time within that audio. The core depends only on this trait, never on
/// a concrete TTS engine.
pub trait Synthesizer {
    /// Synthesizes `text_path`, returning the anchors it reports and the
    /// path to the synthesized audio it produced.
    fn synthesize(&self, text_path: &Path) -> anyhow::Result<(Vec<SynthAnchor>, std::path::PathBuf)>;
}

/// Extracts an MFCC matrix (including the zeroth coefficient) from an audio
/// file. The core drops column 0 and re-contiguates; this trait
/// need not do either.
pub trait FeatureExtractor {
    /// Returns an `n x d'` matrix at the canonical 40ms frame period.
    fn mfcc(&self, audio_path: &Path) -> anyhow::Result<Array2<f32>>;
}

/// Decodes an arbitrary audio container into PCM WAV suitable for MFCC
/// extraction.
pub trait AudioConverter {
    fn convert_audio(&self, src: &Path, dst: &Path) -> anyhow::Result<()>;
}
