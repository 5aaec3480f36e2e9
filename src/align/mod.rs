//! The boundary-tolerant, streaming sequence aligner core: feature matrices
//! (F), the DTWBD kernel (D) and its FastDTWBD accelerator (R), the anchor
//! projector (A), the stream controller (S), and the time formatter (T).

pub mod anchor;
pub mod collaborators;
pub mod controller;
pub mod convert;
pub mod dtw;
pub mod error;
pub mod fastdtw;
pub mod feature_matrix;
pub mod mapping;
pub mod mfcc;
pub mod synth;
pub mod time;

pub use anchor::{Anchor, AnchorTable, FragmentTiming, Projection};
pub use collaborators::{AudioConverter, FeatureExtractor, SynthAnchor, Synthesizer};
pub use controller::StreamController;
pub use convert::SymphoniaConverter;
pub use dtw::{Band, DtwResult, Path};
pub use error::{AlignError, Result};
pub use feature_matrix::FeatureMatrix;
pub use mapping::{FragmentRecord, Mapping};
pub use mfcc::MfccExtractor;
pub use synth::SidecarSynthesizer;
pub use time::{parse_time_str, time_to_str};
