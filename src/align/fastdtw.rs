use super::dtw::{self, Band, DtwResult, Path};
use super::feature_matrix::FeatureMatrix;

/// Multi-resolution accelerator around the boundary-tolerant DTW kernel.
/// Runs in `O((n + m) * radius)` time and memory instead of the kernel's
/// `O(n * m)`.
pub fn align(a: &FeatureMatrix, b: &FeatureMatrix, skip_penalty: f64, radius: usize) -> DtwResult {
    let n = a.rows();
    let m = b.rows();

    if n.min(m) <= radius + 2 {
        return dtw::align(a, b, skip_penalty);
    }

    let a_coarse = a.downsample_by_two();
    let b_coarse = b.downsample_by_two();
    let coarse = align(&a_coarse, &b_coarse, skip_penalty, radius);
    if coarse.is_empty() {
        // The coarse problem is already dominated by pure skipping; a finer
        // grid only makes matching more expensive relative to skipping, so
        // there is no admissible fine-grained match either.
        return coarse;
    }

    let projected = project_path(&coarse.path);
    let band = Band::dilated(n, m, projected, radius);
    dtw::align_in_band(a, b, skip_penalty, &band)
}

/// Projects a coarse warping path back onto the finer grid: each coarse
/// cell maps to its corresponding 2x2 block.
fn project_path(coarse_path: &Path) -> Vec<(usize, usize)> {
    let mut fine = Vec::with_capacity(coarse_path.len() * 4);
    for &(ci, cj) in coarse_path {
        for di in 0..2 {
            for dj in 0..2 {
                fine.push((ci * 2 + di, cj * 2 + dj));
            }
        }
    }
    fine
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn matrix(rows: &[&[f64]]) -> FeatureMatrix {
        FeatureMatrix::from_rows(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>())
    }

    fn ramp(len: usize) -> FeatureMatrix {
        let rows: Vec<Vec<f64>> = (0..len).map(|i| vec![i as f64]).collect();
        FeatureMatrix::from_rows(&rows)
    }

    #[test]
    fn large_radius_matches_unrestricted_kernel_exactly() {
        let a = ramp(40);
        let b = ramp(40);
        let exact = dtw::align(&a, &b, 0.5);
        let fast = align(&a, &b, 0.5, 200);
        assert_eq!(exact.path, fast.path);
        assert_abs_diff_eq!(exact.cost, fast.cost, epsilon = 1e-9);
    }

    #[test]
    fn small_radius_recurses_and_still_finds_identity_path() {
        let a = ramp(50);
        let b = ramp(50);
        let fast = align(&a, &b, 0.5, 4);
        let expected: Path = (0..50).map(|i| (i, i)).collect();
        assert_eq!(fast.path, expected);
        assert_abs_diff_eq!(fast.cost, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn base_case_skips_recursion_when_min_dimension_within_radius() {
        let a = matrix(&[&[1.0], &[2.0]]);
        let b = matrix(&[&[1.0], &[2.0], &[3.0]]);
        let direct = dtw::align(&a, &b, 0.2);
        let fast = align(&a, &b, 0.2, 200);
        assert_eq!(direct.path, fast.path);
    }

    #[test]
    fn propagates_empty_match_from_coarse_level() {
        let a = ramp(1000);
        let b_rows: Vec<Vec<f64>> = (0..1000).map(|i| vec![i as f64 + 1_000_000.0]).collect();
        let b = FeatureMatrix::from_rows(&b_rows);
        let fast = align(&a, &b, 0.0, 8);
        assert!(fast.is_empty());
    }

    #[test]
    fn project_path_expands_each_cell_to_its_2x2_block() {
        let coarse = vec![(0, 0), (1, 1)];
        let fine = project_path(&coarse);
        assert!(fine.contains(&(0, 0)));
        assert!(fine.contains(&(1, 1)));
        assert!(fine.contains(&(2, 2)));
        assert!(fine.contains(&(3, 3)));
        assert_eq!(fine.len(), 8);
    }
}
