pub mod decoder;
pub mod encoder;
pub mod resample;

/// Raw PCM audio, downmixed to mono `f32` samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}
