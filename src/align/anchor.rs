use super::dtw::Path;
use super::error::{AlignError, Result};

/// One `(frame_index, fragment_id)` pair from a text file's anchor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub frame: usize,
    pub fragment_id: String,
}

/// A sorted-ascending anchor table for a single text file.
#[derive(Debug, Clone)]
pub struct AnchorTable {
    anchors: Vec<Anchor>,
}

impl AnchorTable {
    /// Builds a table, checking strict ascending order on `frame`.
    pub fn new(anchors: Vec<Anchor>, file: &str) -> Result<Self> {
        for (index, window) in anchors.windows(2).enumerate() {
            if window[1].frame <= window[0].frame {
                return Err(AlignError::AnchorMonotonicityViolation {
                    file: file.to_string(),
                    index: index + 1,
                    previous: window[0].frame as i64,
                    current: window[1].frame as i64,
                });
            }
        }
        Ok(Self { anchors })
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn as_slice(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Slices the table starting at `from` (inclusive) and rebases the
    /// remaining frame indices by subtracting `rebase_by`.
    pub fn slice_and_rebase(&self, from: usize, rebase_by: usize) -> Self {
        let anchors = self.anchors[from.min(self.anchors.len())..]
            .iter()
            .map(|a| Anchor {
                frame: a.frame.saturating_sub(rebase_by),
                fragment_id: a.fragment_id.clone(),
            })
            .collect();
        Self { anchors }
    }
}

/// One fragment's timing, in seconds, produced by a single projection call.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentTiming {
    pub fragment_id: String,
    pub begin_seconds: f64,
    pub end_seconds: f64,
}

/// Result of projecting an anchor table through one warping path.
#[derive(Debug, Clone)]
pub struct Projection {
    pub fragments: Vec<FragmentTiming>,
    /// Index of the first anchor *not* covered by this projection — equal
    /// to `anchors.len()` iff every anchor was consumed.
    pub next_anchor_index: usize,
}

/// Projects `anchors` through warping path `path`, producing fragment
/// timings in seconds. `audio_start_frame_offset` accounts for
/// audio frames consumed by earlier streaming iterations, and
/// `frame_period_seconds` is `δ`.
pub fn project(
    anchors: &AnchorTable,
    path: &Path,
    audio_start_frame_offset: usize,
    frame_period_seconds: f64,
) -> Projection {
    if path.is_empty() || anchors.is_empty() {
        return Projection {
            fragments: Vec::new(),
            next_anchor_index: 0,
        };
    }

    let anchors = anchors.as_slice();
    let f0 = path[0].0;
    let f1 = path[path.len() - 1].0;

    let k0_raw = anchors.partition_point(|a| a.frame < f0);
    let k1 = anchors.partition_point(|a| a.frame <= f1);
    let k0 = k0_raw.saturating_sub(1);

    let mut timings = Vec::with_capacity(k1 - k0 + 1);
    for anchor in &anchors[k0..k1] {
        let idx = path.partition_point(|&(i, _)| i < anchor.frame);
        let idx = idx.min(path.len() - 1);
        let audio_frame = path[idx].1;
        timings.push(frame_to_seconds(
            audio_frame + audio_start_frame_offset,
            frame_period_seconds,
        ));
    }
    timings.push(frame_to_seconds(
        path[path.len() - 1].1 + audio_start_frame_offset,
        frame_period_seconds,
    ));

    let fragments = anchors[k0..k1]
        .iter()
        .zip(timings.windows(2))
        .map(|(anchor, window)| FragmentTiming {
            fragment_id: anchor.fragment_id.clone(),
            begin_seconds: window[0],
            end_seconds: window[1],
        })
        .collect();

    Projection {
        fragments,
        next_anchor_index: k1,
    }
}

fn frame_to_seconds(frame: usize, frame_period_seconds: f64) -> f64 {
    frame as f64 * frame_period_seconds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(frame: usize, id: &str) -> Anchor {
        Anchor {
            frame,
            fragment_id: id.to_string(),
        }
    }

    #[test]
    fn rejects_non_ascending_anchors() {
        let err = AnchorTable::new(vec![anchor(5, "f0"), anchor(5, "f1")], "t.txt").unwrap_err();
        assert!(matches!(
            err,
            AlignError::AnchorMonotonicityViolation { .. }
        ));
    }

    #[test]
    fn projects_fragments_within_matched_region_and_extends_low_end() {
        let table = AnchorTable::new(
            vec![anchor(0, "f0"), anchor(2, "f1"), anchor(4, "f2")],
            "t.txt",
        )
        .unwrap();
        // matched region covers text frames [1, 4]
        let path: Path = vec![(1, 10), (2, 11), (3, 12), (4, 13)];
        let projection = project(&table, &path, 0, 0.040);
        // f0 (frame 0) is extended in because it straddles the start.
        assert_eq!(projection.fragments.len(), 3);
        assert_eq!(projection.fragments[0].fragment_id, "f0");
        assert_eq!(projection.next_anchor_index, 3);
        assert_eq!(projection.fragments.last().unwrap().fragment_id, "f2");
        assert!((projection.fragments.last().unwrap().end_seconds - 13.0 * 0.040).abs() < 1e-9);
    }

    #[test]
    fn begin_never_exceeds_end() {
        let table = AnchorTable::new(vec![anchor(0, "f0"), anchor(1, "f1")], "t.txt").unwrap();
        let path: Path = vec![(0, 0), (1, 1), (1, 2)];
        let projection = project(&table, &path, 0, 0.040);
        for fragment in &projection.fragments {
            assert!(fragment.begin_seconds <= fragment.end_seconds);
        }
    }

    #[test]
    fn applies_audio_start_frame_offset() {
        let table = AnchorTable::new(vec![anchor(0, "f0")], "t.txt").unwrap();
        let path: Path = vec![(0, 5)];
        let projection = project(&table, &path, 100, 0.040);
        assert!((projection.fragments[0].begin_seconds - (5 + 100) as f64 * 0.040).abs() < 1e-9);
    }

    #[test]
    fn slice_and_rebase_keeps_strictly_increasing_non_negative_frames() {
        let table = AnchorTable::new(
            vec![anchor(3, "f0"), anchor(7, "f1"), anchor(12, "f2")],
            "t.txt",
        )
        .unwrap();
        let tail = table.slice_and_rebase(1, 7);
        let frames: Vec<usize> = tail.as_slice().iter().map(|a| a.frame).collect();
        assert_eq!(frames, vec![0, 5]);
        assert!(frames.windows(2).all(|w| w[1] > w[0]));
    }
}
