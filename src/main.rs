use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::info;

use textaudio_align::align::{MfccExtractor, SidecarSynthesizer, StreamController};
use textaudio_align::config::{AlignConfig, AmbiguousTailPolicy, AnchorFramePolicy};

/// Aligns a stream of text fragments with a stream of recorded audio files,
/// producing a per-text-file mapping of fragment id to matched audio
/// interval (boundary-tolerant streaming sequence alignment).
#[derive(Parser, Debug)]
#[command(name = "textaudio-align")]
#[command(version = "0.1.0")]
#[command(about = "Boundary-tolerant streaming text/audio aligner", long_about = None)]
struct Args {
    /// Directory of text files, visited in lexicographic file-name order.
    #[arg(value_name = "TEXT_DIR")]
    text_dir: PathBuf,

    /// Directory of recorded audio files, visited in lexicographic file-name order.
    #[arg(value_name = "AUDIO_DIR")]
    audio_dir: PathBuf,

    /// Directory to write one `<text-file-stem>.json` mapping per text file.
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Per-frame cost of unmatched boundary content.
    #[arg(long, default_value_t = 0.75)]
    skip_penalty: f64,

    /// FastDTW search-band radius.
    #[arg(long, default_value_t = 200)]
    radius: usize,

    /// Frame duration in seconds (`δ`).
    #[arg(long, default_value_t = 0.040)]
    frame_period_seconds: f64,

    /// Prefix recorded against `text_file` entries in the emitted mapping.
    #[arg(long, default_value = "")]
    output_text_path_prefix: String,

    /// Prefix recorded against `audio_file` entries in the emitted mapping.
    #[arg(long, default_value = "")]
    output_audio_path_prefix: String,

    /// When both streams have a residual tail, which side to advance.
    #[arg(long, value_enum, default_value = "audio")]
    ambiguous_tail_policy: AmbiguousTailArg,

    /// Rounding mode used to convert anchor seconds to frame indices.
    #[arg(long, value_enum, default_value = "floor")]
    anchor_frame_policy: AnchorFrameArg,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum AmbiguousTailArg {
    Audio,
    Text,
}

impl From<AmbiguousTailArg> for AmbiguousTailPolicy {
    fn from(value: AmbiguousTailArg) -> Self {
        match value {
            AmbiguousTailArg::Audio => AmbiguousTailPolicy::PreferAudio,
            AmbiguousTailArg::Text => AmbiguousTailPolicy::PreferText,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum AnchorFrameArg {
    Floor,
    Round,
}

impl From<AnchorFrameArg> for AnchorFramePolicy {
    fn from(value: AnchorFrameArg) -> Self {
        match value {
            AnchorFrameArg::Floor => AnchorFramePolicy::Floor,
            AnchorFrameArg::Round => AnchorFramePolicy::RoundNearest,
        }
    }
}

impl Args {
    fn validate(&self) -> Result<()> {
        ensure!(self.text_dir.is_dir(), "text directory does not exist: {:?}", self.text_dir);
        ensure!(self.audio_dir.is_dir(), "audio directory does not exist: {:?}", self.audio_dir);
        ensure!(self.skip_penalty >= 0.0, "skip_penalty must be non-negative");
        ensure!(self.radius > 0, "radius must be positive");
        ensure!(self.frame_period_seconds > 0.0, "frame_period_seconds must be positive");
        Ok(())
    }

    fn config(&self) -> AlignConfig {
        AlignConfig::default()
            .with_skip_penalty(self.skip_penalty)
            .with_radius(self.radius)
            .with_frame_period_seconds(self.frame_period_seconds)
            .with_output_text_path_prefix(self.output_text_path_prefix.clone())
            .with_output_audio_path_prefix(self.output_audio_path_prefix.clone())
            .with_ambiguous_tail_policy(self.ambiguous_tail_policy.into())
            .with_anchor_frame_policy(self.anchor_frame_policy.into())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    args.validate().context("invalid command-line arguments")?;

    let text_files = sorted_dir_entries(&args.text_dir)?;
    let audio_files = sorted_dir_entries(&args.audio_dir)?;
    info!(
        text_files = text_files.len(),
        audio_files = audio_files.len(),
        "starting alignment run"
    );

    let synthesizer = SidecarSynthesizer;
    let extractor = MfccExtractor::from_config(&args.config());
    let controller = StreamController::new(text_files, audio_files, &synthesizer, &extractor, args.config());

    let mapping = controller.run().context("alignment run failed")?;
    write_mapping(&mapping, &args.output_dir)?;
    info!(fragments = mapping.len(), "alignment complete");
    Ok(())
}

/// Lists a directory's entries in lexicographic file-name order, skipping subdirectories.
fn sorted_dir_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {:?}", dir))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    entries.sort();
    Ok(entries)
}

/// Writes one `<text-file-stem>.json` file per text file into `output_dir`.
fn write_mapping(mapping: &textaudio_align::align::Mapping, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {:?}", output_dir))?;

    let full_json = mapping.to_json();
    for text_file in mapping.text_files() {
        let stem = Path::new(text_file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| text_file.to_string());
        let json = serde_json::to_string_pretty(&full_json[text_file])
            .with_context(|| format!("failed to serialize mapping for '{}'", text_file))?;
        let path = output_dir.join(format!("{stem}.json"));
        fs::write(&path, json).with_context(|| format!("failed to write {:?}", path))?;
    }
    Ok(())
}
