use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::{AlignConfig, AmbiguousTailPolicy};

use super::anchor::{self, Anchor, AnchorTable};
use super::collaborators::{FeatureExtractor, Synthesizer};
use super::error::{AlignError, Result};
use super::fastdtw;
use super::feature_matrix::FeatureMatrix;
use super::mapping::Mapping;

struct TextState {
    display_name: String,
    matrix: FeatureMatrix,
    anchors: AnchorTable,
}

struct AudioState {
    display_name: String,
    matrix: FeatureMatrix,
    audio_start_frame_offset: usize,
}

/// Walks the text-file and audio-file streams, running FastDTWBD and anchor
/// projection once per iteration and carrying tail state forward across
/// file boundaries.
pub struct StreamController<'a> {
    text_files: std::vec::IntoIter<PathBuf>,
    audio_files: std::vec::IntoIter<PathBuf>,
    synthesizer: &'a dyn Synthesizer,
    extractor: &'a dyn FeatureExtractor,
    config: AlignConfig,
}

impl<'a> StreamController<'a> {
    /// `text_files` and `audio_files` must already be in the caller's
    /// intended iteration order (lexicographic by file name).
    pub fn new(
        text_files: Vec<PathBuf>,
        audio_files: Vec<PathBuf>,
        synthesizer: &'a dyn Synthesizer,
        extractor: &'a dyn FeatureExtractor,
        config: AlignConfig,
    ) -> Self {
        Self {
            text_files: text_files.into_iter(),
            audio_files: audio_files.into_iter(),
            synthesizer,
            extractor,
            config,
        }
    }

    /// Runs the streaming loop to completion, returning the accumulated
    /// mapping. Terminates cleanly as soon as
    /// either stream has no next item when it needs to advance.
    pub fn run(mut self) -> Result<Mapping> {
        let mut mapping = Mapping::new();
        let mut text_state: Option<TextState> = None;
        let mut audio_state: Option<AudioState> = None;
        let mut advance_text = true;
        let mut advance_audio = true;

        loop {
            if advance_text {
                match self.next_text_state()? {
                    Some(state) => text_state = Some(state),
                    None => return Ok(mapping),
                }
            }
            if advance_audio {
                match self.next_audio_state()? {
                    Some(state) => audio_state = Some(state),
                    None => return Ok(mapping),
                }
            }

            let text = text_state.as_ref().expect("advance_text populated text_state");
            let audio = audio_state.as_ref().expect("advance_audio populated audio_state");

            info!(
                text_file = %text.display_name,
                audio_file = %audio.display_name,
                text_frames = text.matrix.rows(),
                audio_frames = audio.matrix.rows(),
                "aligning iteration"
            );

            let result = fastdtw::align(&text.matrix, &audio.matrix, self.config.skip_penalty, self.config.radius);
            if result.is_empty() {
                return Err(AlignError::EmptyMatch {
                    text_file: text.display_name.clone(),
                    audio_file: audio.display_name.clone(),
                });
            }

            let projection = anchor::project(
                &text.anchors,
                &result.path,
                audio.audio_start_frame_offset,
                self.config.frame_period_seconds,
            );

            let text_out = AlignConfig::prefixed(&self.config.output_text_path_prefix, &text.display_name);
            let audio_out = AlignConfig::prefixed(&self.config.output_audio_path_prefix, &audio.display_name);
            mapping.extend(&text_out, &audio_out, &projection.fragments);

            let (last_text_frame, last_audio_frame) = *result.path.last().expect("non-empty path has a last cell");

            advance_text = projection.next_anchor_index >= text.anchors.len();
            if !advance_text {
                let previous = text_state.take().expect("text_state present this iteration");
                let anchors = previous.anchors.slice_and_rebase(projection.next_anchor_index, last_text_frame);
                let matrix = previous.matrix.slice_from(last_text_frame);
                text_state = Some(TextState {
                    display_name: previous.display_name,
                    matrix,
                    anchors,
                });
            }

            let audio_fully_consumed = last_audio_frame >= audio.matrix.rows().saturating_sub(1);
            advance_audio = match self.config.ambiguous_tail_policy {
                AmbiguousTailPolicy::PreferAudio => audio_fully_consumed || !advance_text,
                AmbiguousTailPolicy::PreferText => audio_fully_consumed,
            };
            if !advance_audio {
                let previous = audio_state.take().expect("audio_state present this iteration");
                let matrix = previous.matrix.slice_from(last_audio_frame);
                audio_state = Some(AudioState {
                    display_name: previous.display_name,
                    matrix,
                    audio_start_frame_offset: previous.audio_start_frame_offset + last_audio_frame,
                });
            }
        }
    }

    fn next_text_state(&mut self) -> Result<Option<TextState>> {
        let Some(path) = self.text_files.next() else {
            return Ok(None);
        };
        let display_name = display_name(&path);

        let (synth_anchors, synth_audio_path) = self.synthesizer.synthesize(&path)?;
        let raw_mfcc = self.extractor.mfcc(&synth_audio_path)?;
        let matrix = FeatureMatrix::from_mfcc(raw_mfcc.view(), display_name.clone())?;

        let anchors: Vec<Anchor> = synth_anchors
            .into_iter()
            .map(|a| Anchor {
                frame: self.config.anchor_frame_index(a.start_seconds),
                fragment_id: a.fragment_id,
            })
            .collect();
        let anchors = AnchorTable::new(anchors, &display_name)?;

        Ok(Some(TextState {
            display_name,
            matrix,
            anchors,
        }))
    }

    fn next_audio_state(&mut self) -> Result<Option<AudioState>> {
        let Some(path) = self.audio_files.next() else {
            return Ok(None);
        };
        let display_name = display_name(&path);
        let raw_mfcc = self.extractor.mfcc(&path)?;
        let matrix = FeatureMatrix::from_mfcc(raw_mfcc.view(), display_name.clone())?;

        Ok(Some(AudioState {
            display_name,
            matrix,
            audio_start_frame_offset: 0,
        }))
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| {
            warn!(path = %path.display(), "file name has no final component, using full path");
            path.to_string_lossy().into_owned()
        })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use ndarray::Array2;

    use super::*;
    use crate::align::collaborators::SynthAnchor;

    struct FixedSynthesizer {
        anchors: Vec<SynthAnchor>,
        audio_path: PathBuf,
    }

    impl Synthesizer for FixedSynthesizer {
        fn synthesize(&self, _text_path: &Path) -> anyhow::Result<(Vec<SynthAnchor>, PathBuf)> {
            Ok((self.anchors.clone(), self.audio_path.clone()))
        }
    }

    /// Produces a ramp matrix keyed by how many rows the requested path
    /// "represents" — tests encode the row count in the file stem.
    struct RampExtractor;

    impl FeatureExtractor for RampExtractor {
        fn mfcc(&self, audio_path: &Path) -> anyhow::Result<Array2<f32>> {
            let rows: usize = audio_path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
                .unwrap_or(10);
            let mut out = Array2::<f32>::zeros((rows, 2));
            for i in 0..rows {
                out[[i, 0]] = 0.0;
                out[[i, 1]] = i as f32;
            }
            Ok(out)
        }
    }

    #[test]
    fn single_text_single_audio_fully_consumes_both_streams() {
        let synthesizer = FixedSynthesizer {
            anchors: vec![
                SynthAnchor {
                    start_seconds: 0.0,
                    fragment_id: "f0".into(),
                },
                SynthAnchor {
                    start_seconds: 0.1,
                    fragment_id: "f1".into(),
                },
            ],
            audio_path: PathBuf::from("10.wav"),
        };
        let extractor = RampExtractor;
        let config = AlignConfig::default().with_skip_penalty(0.1);

        let controller = StreamController::new(
            vec![PathBuf::from("chapter.txt")],
            vec![PathBuf::from("10.wav")],
            &synthesizer,
            &extractor,
            config,
        );

        let mapping = controller.run().unwrap();
        let fragments = mapping.fragments_for("chapter.txt");
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].0, "f0");
        assert_eq!(fragments[1].0, "f1");
    }

    #[test]
    fn empty_match_is_reported_as_fatal() {
        // skip_penalty 0.0 with disjoint single-frame sequences makes the
        // best cost a free double-skip.
        struct DisjointExtractor;
        impl FeatureExtractor for DisjointExtractor {
            fn mfcc(&self, path: &Path) -> anyhow::Result<Array2<f32>> {
                let mut out = Array2::<f32>::zeros((1, 2));
                out[[0, 1]] = if path == Path::new("chapter.txt.synth") {
                    0.0
                } else {
                    1000.0
                };
                Ok(out)
            }
        }

        let synthesizer = FixedSynthesizer {
            anchors: vec![SynthAnchor {
                start_seconds: 0.0,
                fragment_id: "f0".into(),
            }],
            audio_path: PathBuf::from("chapter.txt.synth"),
        };
        let extractor = DisjointExtractor;
        let config = AlignConfig::default().with_skip_penalty(0.0);

        let controller = StreamController::new(
            vec![PathBuf::from("chapter.txt")],
            vec![PathBuf::from("other.wav")],
            &synthesizer,
            &extractor,
            config,
        );

        let err = controller.run().unwrap_err();
        assert!(matches!(err, AlignError::EmptyMatch { .. }));
    }

    #[test]
    fn stream_exhaustion_returns_partial_mapping_cleanly() {
        let synthesizer = FixedSynthesizer {
            anchors: vec![SynthAnchor {
                start_seconds: 0.0,
                fragment_id: "f0".into(),
            }],
            audio_path: PathBuf::from("10.wav"),
        };
        let extractor = RampExtractor;
        let config = AlignConfig::default().with_skip_penalty(0.1);

        // No audio files at all: the controller must terminate cleanly with
        // an empty mapping rather than erroring.
        let controller = StreamController::new(
            vec![PathBuf::from("chapter.txt")],
            vec![],
            &synthesizer,
            &extractor,
            config,
        );

        let mapping = controller.run().unwrap();
        assert!(mapping.is_empty());
    }
}
