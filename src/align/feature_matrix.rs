use std::sync::Arc;

use ndarray::ArrayView2;

use super::error::{AlignError, Result};

/// A row-major matrix of MFCC frames with the zeroth coefficient dropped.
///
/// Storage is a single contiguous `Arc<[f32]>` plus a row offset and row
/// count, so `slice_from` is O(1): it re-owns the same backing buffer
/// instead of copying per-row data. The zeroth-coefficient drop does
/// require one contiguous copy up front (`from_mfcc`), because dropping a
/// column leaves the source view strided.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    data: Arc<[f32]>,
    row_offset: usize,
    row_count: usize,
    cols: usize,
}

impl FeatureMatrix {
    /// Builds a feature matrix from a raw MFCC matrix (including the zeroth
    /// coefficient), dropping column 0 and materializing a contiguous copy.
    pub fn from_mfcc(raw: ArrayView2<f32>, file: impl Into<String>) -> Result<Self> {
        let rows = raw.nrows();
        let raw_cols = raw.ncols();
        if raw_cols < 2 {
            return Err(AlignError::MalformedFeatureMatrix {
                file: file.into(),
                reason: format!(
                    "expected at least 2 MFCC columns (including coefficient 0), found {raw_cols}"
                ),
            });
        }
        let cols = raw_cols - 1;
        let mut flat = Vec::with_capacity(rows * cols);
        for row in raw.rows() {
            flat.extend(row.iter().skip(1).copied());
        }
        Ok(Self {
            data: Arc::from(flat.into_boxed_slice()),
            row_offset: 0,
            row_count: rows,
            cols,
        })
    }

    /// Builds a feature matrix directly from already-trimmed row-major data
    /// (used by tests and by callers who already excluded coefficient 0).
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let row_count = rows.len();
        let cols = rows.first().map_or(0, |r| r.len());
        let mut flat = Vec::with_capacity(row_count * cols);
        for row in rows {
            debug_assert_eq!(row.len(), cols, "ragged feature matrix row");
            flat.extend(row.iter().map(|&v| v as f32));
        }
        Self {
            data: Arc::from(flat.into_boxed_slice()),
            row_offset: 0,
            row_count,
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.row_count
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn row(&self, index: usize) -> &[f32] {
        assert!(index < self.row_count, "row index out of bounds");
        let start = (self.row_offset + index) * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Cheaply re-owns the subsequence starting at `start` (inclusive),
    /// sharing the backing buffer rather than copying rows.
    pub fn slice_from(&self, start: usize) -> Self {
        let start = start.min(self.row_count);
        Self {
            data: Arc::clone(&self.data),
            row_offset: self.row_offset + start,
            row_count: self.row_count - start,
            cols: self.cols,
        }
    }

    /// Euclidean distance between row `i` of `self` and row `j` of `other`.
    pub fn distance(&self, i: usize, other: &Self, j: usize) -> f64 {
        let a = self.row(i);
        let b = other.row(j);
        debug_assert_eq!(a.len(), b.len(), "column dimension mismatch");
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| {
                let diff = (x - y) as f64;
                diff * diff
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Downsamples by factor 2 via pairwise row averaging; an odd tailing
    /// row is kept as-is.
    pub fn downsample_by_two(&self) -> Self {
        let out_rows = self.row_count / 2 + self.row_count % 2;
        let mut flat = Vec::with_capacity(out_rows * self.cols);
        let mut i = 0;
        while i + 1 < self.row_count {
            let a = self.row(i);
            let b = self.row(i + 1);
            flat.extend(a.iter().zip(b.iter()).map(|(&x, &y)| (x + y) * 0.5));
            i += 2;
        }
        if i < self.row_count {
            flat.extend_from_slice(self.row(i));
        }
        Self {
            data: Arc::from(flat.into_boxed_slice()),
            row_offset: 0,
            row_count: out_rows,
            cols: self.cols,
        }
    }
}
