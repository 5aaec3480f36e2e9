use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::collaborators::{SynthAnchor, Synthesizer};

/// Default `Synthesizer`: reads a JSON sidecar manifest next to the text
/// file instead of invoking a real TTS engine.
///
/// For `chapter01.txt`, the manifest is `chapter01.txt.synth.json`:
/// ```json
/// { "audio_path": "chapter01.synth.wav", "anchors": [[0.0, "f000"], [2.4, "f001"]] }
/// ```
/// `audio_path` is resolved relative to the manifest's own directory.
pub struct SidecarSynthesizer;

#[derive(Debug, Deserialize)]
struct Manifest {
    audio_path: PathBuf,
    anchors: Vec<(f64, String)>,
}

impl Synthesizer for SidecarSynthesizer {
    fn synthesize(&self, text_path: &Path) -> Result<(Vec<SynthAnchor>, PathBuf)> {
        let manifest_path = sidecar_path(text_path);
        let raw = fs::read_to_string(&manifest_path)
            .with_context(|| format!("failed to read synth manifest '{}'", manifest_path.display()))?;
        let manifest: Manifest = serde_json::from_str(&raw)
            .with_context(|| format!("malformed synth manifest '{}'", manifest_path.display()))?;

        let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
        let audio_path = base_dir.join(&manifest.audio_path);

        let anchors = manifest
            .anchors
            .into_iter()
            .map(|(start_seconds, fragment_id)| SynthAnchor {
                start_seconds,
                fragment_id,
            })
            .collect();

        Ok((anchors, audio_path))
    }
}

fn sidecar_path(text_path: &Path) -> PathBuf {
    let mut name = text_path.as_os_str().to_owned();
    name.push(".synth.json");
    PathBuf::from(name)
}
