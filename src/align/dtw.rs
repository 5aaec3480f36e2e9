use std::collections::HashMap;

use super::feature_matrix::FeatureMatrix;

/// A coordinate-monotone alignment between two frame sequences.
pub type Path = Vec<(usize, usize)>;

/// Outcome of a boundary-tolerant DTW solve.
#[derive(Debug, Clone)]
pub struct DtwResult {
    pub cost: f64,
    pub path: Path,
}

impl DtwResult {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Restricts the DTW recurrence to a set of admissible `(i, j)` cells.
///
/// `FastDTWBD` builds one of these from a dilated, projected coarse path;
/// the unrestricted kernel is simply `Band::full`, which allows every cell.
#[derive(Debug, Clone)]
pub struct Band {
    row_ranges: Vec<Option<(usize, usize)>>,
}

impl Band {
    /// The band that allows every `(i, j)` cell of an `n x m` matrix.
    pub fn full(n: usize, m: usize) -> Self {
        let range = if m == 0 { None } else { Some((0, m - 1)) };
        Self {
            row_ranges: vec![range; n],
        }
    }

    /// Builds a band by dilating each of `cells` by `radius` rows and
    /// columns and clamping to the `n x m` matrix bounds.
    pub fn dilated(n: usize, m: usize, cells: impl IntoIterator<Item = (usize, usize)>, radius: usize) -> Self {
        let mut row_ranges: Vec<Option<(usize, usize)>> = vec![None; n];
        for (i, j) in cells {
            let i_lo = i.saturating_sub(radius);
            let i_hi = (i + radius).min(n.saturating_sub(1));
            let j_lo = j.saturating_sub(radius);
            let j_hi = (j + radius).min(m.saturating_sub(1));
            for row in row_lo_hi(i_lo, i_hi) {
                let entry = row_ranges[row].get_or_insert((j_lo, j_hi));
                entry.0 = entry.0.min(j_lo);
                entry.1 = entry.1.max(j_hi);
            }
        }
        Self { row_ranges }
    }

    pub fn allows(&self, i: usize, j: usize) -> bool {
        self.row_ranges
            .get(i)
            .and_then(|range| *range)
            .is_some_and(|(lo, hi)| j >= lo && j <= hi)
    }
}

fn row_lo_hi(lo: usize, hi: usize) -> impl Iterator<Item = usize> {
    lo..=hi
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Start,
    Diagonal,
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    cost: f64,
    step: Step,
    /// True once the accumulated cost includes at least one real frame
    /// match (as opposed to a pure boundary skip charge).
    matched: bool,
}

/// Runs the unrestricted boundary-tolerant DTW kernel.
pub fn align(a: &FeatureMatrix, b: &FeatureMatrix, skip_penalty: f64) -> DtwResult {
    let band = Band::full(a.rows(), b.rows());
    align_in_band(a, b, skip_penalty, &band)
}

/// Runs the kernel restricted to `band`.
pub fn align_in_band(a: &FeatureMatrix, b: &FeatureMatrix, skip_penalty: f64, band: &Band) -> DtwResult {
    let n = a.rows();
    let m = b.rows();
    if n == 0 || m == 0 {
        return DtwResult {
            cost: 0.0,
            path: Vec::new(),
        };
    }

    let mut table: HashMap<(usize, usize), Cell> = HashMap::new();

    for i in 0..n {
        for j in 0..m {
            if !band.allows(i, j) {
                continue;
            }
            let cell = if j == 0 && i == 0 {
                boundary_entry_cell(a.distance(0, b, 0), 0, skip_penalty)
            } else if j == 0 {
                boundary_entry_cell(a.distance(i, b, 0), i, skip_penalty)
            } else if i == 0 {
                boundary_entry_cell(a.distance(0, b, j), j, skip_penalty)
            } else {
                let distance = a.distance(i, b, j);
                let candidates = [
                    (Step::Diagonal, table.get(&(i - 1, j - 1))),
                    (Step::Horizontal, table.get(&(i, j - 1))),
                    (Step::Vertical, table.get(&(i - 1, j))),
                ];
                let best = candidates
                    .into_iter()
                    .filter_map(|(step, predecessor)| predecessor.map(|p| (step, p)))
                    .min_by(|(_, a), (_, b)| {
                        a.cost
                            .partial_cmp(&b.cost)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    });
                match best {
                    Some((step, predecessor)) => Cell {
                        cost: distance + predecessor.cost,
                        step,
                        matched: true,
                    },
                    None => continue,
                }
            };
            table.insert((i, j), cell);
        }
    }

    let end = best_terminal_cell(&table, n, m, skip_penalty);
    let Some((end_i, end_j, end_cell)) = end else {
        return DtwResult {
            cost: 0.0,
            path: Vec::new(),
        };
    };

    if !end_cell.matched {
        return DtwResult {
            cost: end_cell.cost,
            path: Vec::new(),
        };
    }

    DtwResult {
        cost: end_cell.cost,
        path: backtrack(&table, end_i, end_j),
    }
}

/// The first-row/first-column init: entering the matched region at this
/// boundary cell after skipping `skipped` frames, versus staying a pure
/// skip one frame longer.
fn boundary_entry_cell(distance: f64, skipped: usize, skip_penalty: f64) -> Cell {
    let matched_cost = skipped as f64 * skip_penalty + distance;
    let skip_cost = (skipped + 1) as f64 * skip_penalty;
    if matched_cost < skip_cost {
        Cell {
            cost: matched_cost,
            step: Step::Start,
            matched: true,
        }
    } else {
        Cell {
            cost: skip_cost,
            step: Step::Start,
            matched: false,
        }
    }
}

fn best_terminal_cell(
    table: &HashMap<(usize, usize), Cell>,
    n: usize,
    m: usize,
    skip_penalty: f64,
) -> Option<(usize, usize, Cell)> {
    let last_col = m - 1;
    let last_row = n - 1;

    let via_last_column = (0..n).filter_map(|i| {
        table.get(&(i, last_col)).map(|cell| {
            let tail = (last_row - i) as f64 * skip_penalty;
            (i, last_col, cell.cost + tail, *cell)
        })
    });
    let via_last_row = (0..m).filter_map(|j| {
        table.get(&(last_row, j)).map(|cell| {
            let tail = (last_col - j) as f64 * skip_penalty;
            (last_row, j, cell.cost + tail, *cell)
        })
    });

    via_last_column
        .chain(via_last_row)
        .min_by(|(_, _, a, _), (_, _, b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, j, total, mut cell)| {
            cell.cost = total;
            (i, j, cell)
        })
}

fn backtrack(table: &HashMap<(usize, usize), Cell>, end_i: usize, end_j: usize) -> Path {
    let mut path = Vec::new();
    let (mut i, mut j) = (end_i, end_j);
    loop {
        path.push((i, j));
        let cell = table[&(i, j)];
        match cell.step {
            Step::Start => break,
            Step::Diagonal => {
                i -= 1;
                j -= 1;
            }
            Step::Horizontal => j -= 1,
            Step::Vertical => i -= 1,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn matrix(rows: &[&[f64]]) -> FeatureMatrix {
        FeatureMatrix::from_rows(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>())
    }

    #[test]
    fn identical_sequences_yield_identity_path_with_zero_cost() {
        let a = matrix(&[&[1.0], &[2.0], &[3.0], &[4.0]]);
        let b = matrix(&[&[1.0], &[2.0], &[3.0], &[4.0]]);
        let result = align(&a, &b, 0.5);
        assert_eq!(result.path, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
        assert_abs_diff_eq!(result.cost, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn extra_prefix_on_b_is_skipped() {
        let a = matrix(&[&[1.0], &[2.0]]);
        let b = matrix(&[&[9.0], &[9.0], &[1.0], &[2.0]]);
        let result = align(&a, &b, 0.1);
        assert_eq!(result.path.first(), Some(&(0, 2)));
        assert_eq!(result.path.last(), Some(&(1, 3)));
        assert_abs_diff_eq!(result.cost, 0.2, epsilon = 1e-9);
    }

    #[test]
    fn extra_suffix_on_a_is_skipped() {
        let a = matrix(&[&[1.0], &[2.0], &[9.0], &[9.0]]);
        let b = matrix(&[&[1.0], &[2.0]]);
        let result = align(&a, &b, 0.1);
        assert_eq!(result.path.first(), Some(&(0, 0)));
        assert_eq!(result.path.last(), Some(&(1, 1)));
        assert_abs_diff_eq!(result.cost, 0.2, epsilon = 1e-9);
    }

    #[test]
    fn low_skip_penalty_relative_to_distance_yields_empty_match() {
        let a = matrix(&[&[0.0]]);
        let b = matrix(&[&[1000.0]]);
        let result = align(&a, &b, 0.0);
        assert!(result.is_empty());
    }

    #[test]
    fn zero_skip_penalty_matches_classical_dtw_cost() {
        // b repeats a's first transition, so the classical (non-skipping)
        // path already costs 0; a free boundary escape cannot beat it, so
        // equality actually holds rather than the weaker classical bound.
        let a = matrix(&[&[1.0], &[2.0], &[3.0]]);
        let b = matrix(&[&[1.0], &[1.0], &[2.0], &[3.0]]);
        let classical = classical_dtw_cost(&a, &b);
        let result = align(&a, &b, 0.0);
        assert_abs_diff_eq!(result.cost, classical, epsilon = 1e-9);
        assert!(!result.is_empty());
    }

    #[test]
    fn extra_prefix_on_b_with_nonzero_entry_distance_charges_both_skip_and_match() {
        let a = matrix(&[&[1.0], &[2.0]]);
        let b = matrix(&[&[9.0], &[1.05], &[2.0]]);
        let result = align(&a, &b, 0.1);
        assert_eq!(result.path.first(), Some(&(0, 1)));
        assert_eq!(result.path.last(), Some(&(1, 2)));
        // one skipped boundary frame (0.1) plus the entry match distance
        // |1.0 - 1.05| = 0.05.
        assert_abs_diff_eq!(result.cost, 0.15, epsilon = 1e-9);
    }

    #[test]
    fn extra_suffix_on_a_with_nonzero_entry_distance_charges_both_skip_and_match() {
        let a = matrix(&[&[2.0], &[1.05], &[9.0]]);
        let b = matrix(&[&[2.0], &[1.0]]);
        let result = align(&a, &b, 0.1);
        assert_eq!(result.path.first(), Some(&(0, 0)));
        assert_eq!(result.path.last(), Some(&(1, 1)));
        // matched distances 0.0 + 0.05 plus one skipped trailing frame (0.1).
        assert_abs_diff_eq!(result.cost, 0.15, epsilon = 1e-9);
    }

    #[test]
    fn self_alignment_is_identity_regardless_of_skip_penalty() {
        let a = matrix(&[&[1.0, 2.0], &[3.0, 1.0], &[0.5, 0.5], &[9.0, 9.0]]);
        for p in [0.0, 0.3, 5.0] {
            let result = align(&a, &a, p);
            let expected: Path = (0..a.rows()).map(|i| (i, i)).collect();
            assert_eq!(result.path, expected);
            assert_abs_diff_eq!(result.cost, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn zero_length_inputs_yield_empty_path() {
        let a = FeatureMatrix::from_rows(&[]);
        let b = matrix(&[&[1.0]]);
        assert!(align(&a, &b, 0.5).is_empty());
        assert!(align(&b, &a, 0.5).is_empty());
    }

    fn classical_dtw_cost(a: &FeatureMatrix, b: &FeatureMatrix) -> f64 {
        let n = a.rows();
        let m = b.rows();
        let mut dp = vec![vec![f64::INFINITY; m]; n];
        for i in 0..n {
            for j in 0..m {
                let d = a.distance(i, b, j);
                let best_prev = match (i, j) {
                    (0, 0) => 0.0,
                    (0, j) => dp[0][j - 1],
                    (i, 0) => dp[i - 1][0],
                    (i, j) => dp[i - 1][j - 1].min(dp[i][j - 1]).min(dp[i - 1][j]),
                };
                dp[i][j] = d + best_prev;
            }
        }
        dp[n - 1][m - 1]
    }
}
