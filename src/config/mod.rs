use std::path::PathBuf;

/// Tail-advance policy for the streaming controller when both the text and
/// audio side have residual, unconsumed frames after an alignment call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbiguousTailPolicy {
    /// Prefer to pull the next audio file (the default).
    #[default]
    PreferAudio,
    /// Prefer to pull the next text file instead.
    PreferText,
}

/// Rounding mode for converting an anchor's `start_seconds` to a frame
/// index. Truncation (`Floor`) is the default, biasing every anchor up to
/// one frame early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorFramePolicy {
    #[default]
    Floor,
    RoundNearest,
}

/// Core configuration recognised by the aligner.
#[derive(Debug, Clone)]
pub struct AlignConfig {
    /// Per-frame cost of unmatched boundary content.
    pub skip_penalty: f64,
    /// FastDTW search-band radius.
    pub radius: usize,
    /// Frame duration `δ`, in seconds.
    pub frame_period_seconds: f64,
    /// Prefix prepended to `text_file` entries in the emitted mapping.
    pub output_text_path_prefix: String,
    /// Prefix prepended to `audio_file` entries in the emitted mapping.
    pub output_audio_path_prefix: String,
    /// Policy used to break ties when both streams have residual tails.
    pub ambiguous_tail_policy: AmbiguousTailPolicy,
    /// Rounding mode for anchor seconds -> frame index conversion.
    pub anchor_frame_policy: AnchorFramePolicy,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            skip_penalty: 0.75,
            radius: 200,
            frame_period_seconds: 0.040,
            output_text_path_prefix: String::new(),
            output_audio_path_prefix: String::new(),
            ambiguous_tail_policy: AmbiguousTailPolicy::default(),
            anchor_frame_policy: AnchorFramePolicy::default(),
        }
    }
}

impl AlignConfig {
    pub fn with_skip_penalty(mut self, skip_penalty: f64) -> Self {
        self.skip_penalty = skip_penalty;
        self
    }

    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_frame_period_seconds(mut self, frame_period_seconds: f64) -> Self {
        self.frame_period_seconds = frame_period_seconds;
        self
    }

    pub fn with_output_text_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_text_path_prefix = prefix.into();
        self
    }

    pub fn with_output_audio_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_audio_path_prefix = prefix.into();
        self
    }

    pub fn with_ambiguous_tail_policy(mut self, policy: AmbiguousTailPolicy) -> Self {
        self.ambiguous_tail_policy = policy;
        self
    }

    pub fn with_anchor_frame_policy(mut self, policy: AnchorFramePolicy) -> Self {
        self.anchor_frame_policy = policy;
        self
    }

    /// Converts anchor `start_seconds` to a frame index per
    /// `anchor_frame_policy`.
    pub fn anchor_frame_index(&self, start_seconds: f64) -> usize {
        let raw = start_seconds / self.frame_period_seconds;
        let frame = match self.anchor_frame_policy {
            AnchorFramePolicy::Floor => raw.floor(),
            AnchorFramePolicy::RoundNearest => raw.round(),
        };
        frame.max(0.0) as usize
    }

    /// Joins a prefix (as recorded in output paths) with a bare file name.
    pub fn prefixed(prefix: &str, file_name: &str) -> String {
        if prefix.is_empty() {
            return file_name.to_string();
        }
        PathBuf::from(prefix)
            .join(file_name)
            .to_string_lossy()
            .into_owned()
    }
}
