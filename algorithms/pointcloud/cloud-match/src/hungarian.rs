use ndarray::ArrayView2;
use pcloud_helpers::Float;

/// Minimum-cost perfect assignment on a square cost matrix (Hungarian method
/// with row/column potentials, `O(n^3)`).
///
/// Returns the matched costs, one per row, in row order.
pub(crate) fn assignment_costs<F: Float>(costs: ArrayView2<F>) -> Vec<F> {
    let n = costs.nrows();
    // 1-based bookkeeping; index 0 is the virtual column used to grow paths
    let mut u = vec![F::zero(); n + 1];
    let mut v = vec![F::zero(); n + 1];
    let mut row_of = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        row_of[0] = row;
        let mut col0 = 0;
        let mut minv = vec![F::infinity(); n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[col0] = true;
            let i0 = row_of[col0];
            let mut delta = F::infinity();
            let mut col1 = 0;
            for col in 1..=n {
                if used[col] {
                    continue;
                }
                let reduced = costs[[i0 - 1, col - 1]] - u[i0] - v[col];
                if reduced < minv[col] {
                    minv[col] = reduced;
                    way[col] = col0;
                }
                if minv[col] < delta {
                    delta = minv[col];
                    col1 = col;
                }
            }
            // only reachable with non-finite costs, which the matcher rejects
            if col1 == 0 {
                break;
            }
            for col in 0..=n {
                if used[col] {
                    u[row_of[col]] += delta;
                    v[col] -= delta;
                } else {
                    minv[col] -= delta;
                }
            }
            col0 = col1;
            if row_of[col0] == 0 {
                break;
            }
        }
        while col0 != 0 {
            let prev = way[col0];
            row_of[col0] = row_of[prev];
            col0 = prev;
        }
    }

    let mut matched = vec![F::zero(); n];
    for col in 1..=n {
        if row_of[col] != 0 {
            matched[row_of[col] - 1] = costs[[row_of[col] - 1, col - 1]];
        }
    }
    matched
}
