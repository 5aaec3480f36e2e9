use std::path::Path;

use anyhow::{Context, Result};

use crate::audio::{decoder::decode_audio, encoder::encode_audio};

use super::collaborators::AudioConverter;

/// Default `AudioConverter`: decodes whatever container `symphonia` can
/// probe and re-encodes it as a mono 16-bit PCM WAV. Useful for callers who
/// do not already have PCM audio on disk; reuses the same decoder
/// `MfccExtractor` runs its own decode step against.
pub struct SymphoniaConverter;

impl AudioConverter for SymphoniaConverter {
    fn convert_audio(&self, src: &Path, dst: &Path) -> Result<()> {
        let audio = decode_audio(src).with_context(|| format!("failed to decode '{}'", src.display()))?;
        encode_audio(&audio, dst).with_context(|| format!("failed to write WAV '{}'", dst.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioData;
    use crate::audio::encoder::encode_audio;

    #[test]
    fn round_trips_a_wav_file_through_convert_audio() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.wav");
        let dst = dir.path().join("out.wav");

        let tone = AudioData {
            samples: (0..1600).map(|i| (i as f32 * 0.01).sin() * 0.5).collect(),
            sample_rate: 16_000,
        };
        encode_audio(&tone, &src).unwrap();

        SymphoniaConverter.convert_audio(&src, &dst).unwrap();
        assert!(dst.exists());
    }
}
