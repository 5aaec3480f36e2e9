use std::f64::consts::PI;
use std::path::Path;

use anyhow::{Context, Result};
use aus::analysis;
use aus::analysis::mel::MelFilterbank;
use aus::spectrum;
use aus::WindowType;
use ndarray::Array2;

use crate::audio::decoder::decode_audio;
use crate::audio::resample;
use crate::config::AlignConfig;

use super::collaborators::FeatureExtractor;

const TARGET_SAMPLE_RATE: u32 = 16_000;
const WINDOW_MS: usize = 100;
const MEL_BANDS: usize = 40;
const N_MFCC: usize = 13;
const MIN_FREQ: f64 = 20.0;

/// Default MFCC extractor: decode, resample to 16kHz, run an FFT-based mel
/// spectrogram through `aus`, then a DCT-II with orthonormal scaling to
/// produce MFCCs including coefficient zero — callers drop that column
/// themselves.
///
/// Unlike a z-score-normalized mel spectrogram, features here are not
/// normalized: DTWBD's Euclidean distance operates on raw MFCC magnitudes,
/// and per-file normalization would distort cross-file comparability.
pub struct MfccExtractor {
    hop_seconds: f64,
}

impl MfccExtractor {
    pub fn from_config(config: &AlignConfig) -> Self {
        Self {
            hop_seconds: config.frame_period_seconds,
        }
    }
}

impl FeatureExtractor for MfccExtractor {
    fn mfcc(&self, audio_path: &Path) -> Result<Array2<f32>> {
        let audio = decode_audio(audio_path)
            .with_context(|| format!("failed to decode '{}'", audio_path.display()))?;
        let mono = if audio.sample_rate == TARGET_SAMPLE_RATE {
            audio.samples
        } else {
            resample::linear_resample(&audio.samples, audio.sample_rate, TARGET_SAMPLE_RATE)
                .with_context(|| {
                    format!(
                        "failed to resample '{}' from {} Hz to {} Hz",
                        audio_path.display(),
                        audio.sample_rate,
                        TARGET_SAMPLE_RATE
                    )
                })?
        };

        let audio_f64: Vec<f64> = mono.iter().map(|&s| s as f64).collect();
        let fft_size = ((TARGET_SAMPLE_RATE as f64 * WINDOW_MS as f64) / 1000.0).round() as usize;
        let hop_size = ((TARGET_SAMPLE_RATE as f64) * self.hop_seconds).round().max(1.0) as usize;

        let stft = spectrum::rstft(&audio_f64, fft_size.max(1), hop_size, WindowType::Hanning);
        let (magnitude, _) = spectrum::complex_to_polar_rstft(&stft);
        let power = analysis::make_power_spectrogram(&magnitude);

        let freqs = spectrum::rfftfreq(fft_size.max(1), TARGET_SAMPLE_RATE);
        let filterbank = MelFilterbank::new(
            MIN_FREQ,
            (TARGET_SAMPLE_RATE as f64) / 2.0,
            MEL_BANDS,
            &freqs,
            true,
        );
        let mel = analysis::mel::make_mel_spectrogram(&power, &filterbank);

        let n_frames = mel.len();
        let mut out = Array2::<f32>::zeros((n_frames, N_MFCC));
        for (frame_idx, mel_frame) in mel.iter().enumerate() {
            let log_mel: Vec<f64> = mel_frame.iter().map(|&v| (v.max(1e-10)).ln()).collect();
            let coefficients = dct_ii_ortho(&log_mel, N_MFCC);
            for (k, value) in coefficients.into_iter().enumerate() {
                out[[frame_idx, k]] = value as f32;
            }
        }

        Ok(out)
    }
}

/// DCT-II with `norm='ortho'` scaling, matching the conventional MFCC
/// recipe rather than an unnormalized variant.
fn dct_ii_ortho(input: &[f64], out_len: usize) -> Vec<f64> {
    let n = input.len();
    if n == 0 {
        return vec![0.0; out_len];
    }
    let mut out = vec![0.0; out_len];
    for (k, slot) in out.iter_mut().enumerate() {
        let mut sum = 0.0;
        for (i, &value) in input.iter().enumerate() {
            sum += value * (PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n as f64)).cos();
        }
        *slot = sum;
    }
    if !out.is_empty() {
        out[0] *= (1.0 / n as f64).sqrt();
        for value in out.iter_mut().skip(1) {
            *value *= (2.0 / n as f64).sqrt();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dct_of_empty_input_is_zero_vector() {
        assert_eq!(dct_ii_ortho(&[], 13), vec![0.0; 13]);
    }

    #[test]
    fn dct_of_constant_input_concentrates_energy_in_coefficient_zero() {
        let input = vec![2.0; 40];
        let out = dct_ii_ortho(&input, 13);
        assert!(out[0].abs() > 1.0);
        for &value in &out[1..] {
            assert!(value.abs() < 1e-9);
        }
    }
}
