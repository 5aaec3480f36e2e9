use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::anchor::FragmentTiming;
use super::time::time_to_str;

/// One fragment's final record: which text and audio file it came from, and
/// its matched interval in the recorded audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRecord {
    pub text_file: String,
    pub audio_file: String,
    pub begin_seconds: f64,
    pub end_seconds: f64,
}

impl FragmentRecord {
    pub fn begin_time_str(&self) -> String {
        time_to_str(self.begin_seconds)
    }

    pub fn end_time_str(&self) -> String {
        time_to_str(self.end_seconds)
    }
}

/// The complete output of a streaming run: every fragment's record, indexed
/// first by the text file it belongs to and then by fragment id, preserving
/// the order fragments were emitted in within each text file.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    by_text_file: BTreeMap<String, Vec<(String, FragmentRecord)>>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one text file's worth of freshly projected fragment timings,
    /// pairing each with the audio file the projection ran against.
    pub fn extend(&mut self, text_file: &str, audio_file: &str, timings: &[FragmentTiming]) {
        let entry = self.by_text_file.entry(text_file.to_string()).or_default();
        for timing in timings {
            entry.push((
                timing.fragment_id.clone(),
                FragmentRecord {
                    text_file: text_file.to_string(),
                    audio_file: audio_file.to_string(),
                    begin_seconds: timing.begin_seconds,
                    end_seconds: timing.end_seconds,
                },
            ));
        }
    }

    pub fn text_files(&self) -> impl Iterator<Item = &str> {
        self.by_text_file.keys().map(String::as_str)
    }

    pub fn fragments_for(&self, text_file: &str) -> &[(String, FragmentRecord)] {
        self.by_text_file
            .get(text_file)
            .map_or(&[], |fragments| fragments.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.by_text_file.values().all(|fragments| fragments.is_empty())
    }

    pub fn len(&self) -> usize {
        self.by_text_file.values().map(Vec::len).sum()
    }

    /// Flattens the mapping into a `text_file -> fragment_id -> record` JSON
    /// tree, ready for a per-text-file JSON renderer.
    pub fn to_json(&self) -> serde_json::Value {
        let mut root = serde_json::Map::new();
        for (text_file, fragments) in &self.by_text_file {
            let mut inner = serde_json::Map::new();
            for (fragment_id, record) in fragments {
                inner.insert(
                    fragment_id.clone(),
                    serde_json::json!({
                        "audio_file": record.audio_file,
                        "begin": record.begin_time_str(),
                        "end": record.end_time_str(),
                    }),
                );
            }
            root.insert(text_file.clone(), serde_json::Value::Object(inner));
        }
        serde_json::Value::Object(root)
    }
}
