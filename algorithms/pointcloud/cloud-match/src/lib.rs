use ndarray::{Array2, ArrayView2};
use pcloud_helpers::{Distance, Float, Gesture};
use std::cmp::Ordering;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod hungarian;

/// Errors that can occur when comparing two point clouds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// Both clouds must have the same number of points.
    #[error("cannot match clouds of {left} and {right} points")]
    DimensionMismatch { left: usize, right: usize },
    #[error("cannot match empty clouds")]
    EmptyCloud,
    /// A point distance came out NaN or infinite
    #[error("invalid point distance (likely due to NaN or infinite values in data)")]
    InvalidDistance,
    #[error("epsilon must lie in [0, 1]")]
    InvalidEpsilon,
}

/// How points of one cloud are paired with points of the other.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum MatchStrategy<F>
where
    F: Float,
{
    /// Repeatedly pair the closest still-unmatched points of both clouds.
    /// Ties go to the lexicographically smallest `(i, j)`.
    #[default]
    Greedy,
    /// Multi-start greedy matching with decreasing weights, as in the $P
    /// recognizer. Start points step by `floor(n^(1 - epsilon))`.
    Weighted { epsilon: F },
    /// Minimum-cost perfect matching.
    Optimal,
}

/// Computes the dissimilarity of two normalized point clouds.
///
/// The result is a mean per-point distance, so it is comparable between any
/// two pairs of clouds with the same point count.
#[derive(Debug, Clone)]
pub struct CloudMatcher<F, D>
where
    F: Float,
    D: Distance<F>,
{
    strategy: MatchStrategy<F>,
    distance: D,
}

impl<F, D> CloudMatcher<F, D>
where
    F: Float,
    D: Distance<F>,
{
    /// Creates a matcher.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidEpsilon` if a `Weighted` strategy carries an
    /// epsilon outside `[0, 1]`.
    pub fn new(strategy: MatchStrategy<F>, distance: D) -> Result<Self, MatchError> {
        if let MatchStrategy::Weighted { epsilon } = strategy {
            if !(epsilon >= F::zero() && epsilon <= F::one()) {
                return Err(MatchError::InvalidEpsilon);
            }
        }
        Ok(Self { strategy, distance })
    }

    pub fn strategy(&self) -> MatchStrategy<F> {
        self.strategy
    }

    /// Distance between two clouds given as `n x 2` coordinate matrices.
    ///
    /// # Errors
    ///
    /// * `MatchError::DimensionMismatch` if the clouds have different point counts.
    /// * `MatchError::EmptyCloud` if both clouds are empty.
    /// * `MatchError::InvalidDistance` if a point distance is NaN or infinite.
    pub fn distance(&self, a: ArrayView2<F>, b: ArrayView2<F>) -> Result<F, MatchError> {
        if a.nrows() != b.nrows() {
            return Err(MatchError::DimensionMismatch {
                left: a.nrows(),
                right: b.nrows(),
            });
        }
        if a.nrows() == 0 {
            return Err(MatchError::EmptyCloud);
        }

        let costs = self.cost_matrix(a, b)?;
        let dist = match self.strategy {
            MatchStrategy::Greedy => greedy(costs.view()),
            MatchStrategy::Weighted { epsilon } => weighted(costs.view(), epsilon),
            MatchStrategy::Optimal => mean_of_sorted(hungarian::assignment_costs(costs.view())),
        };
        Ok(dist)
    }

    /// Distance between two normalized gestures.
    pub fn gesture_distance(&self, a: &Gesture<F>, b: &Gesture<F>) -> Result<F, MatchError> {
        self.distance(a.coords().view(), b.coords().view())
    }

    fn cost_matrix(&self, a: ArrayView2<F>, b: ArrayView2<F>) -> Result<Array2<F>, MatchError> {
        let n = a.nrows();
        let mut costs = Array2::zeros((n, n));
        for (i, pa) in a.rows().into_iter().enumerate() {
            for (j, pb) in b.rows().into_iter().enumerate() {
                let d = self.distance.distance(pa, pb);
                if !d.is_finite() {
                    return Err(MatchError::InvalidDistance);
                }
                costs[[i, j]] = d;
            }
        }
        Ok(costs)
    }
}

/// Global greedy assignment, `O(n^2 log n)`.
///
/// Sorting every candidate pair once by `(cost, i, j)` and taking each pair
/// whose endpoints are both still free is the same as repeatedly picking the
/// cheapest remaining pair.
fn greedy<F: Float>(costs: ArrayView2<F>) -> F {
    let n = costs.nrows();
    let mut pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .collect();
    pairs.sort_by(|&a, &b| {
        costs[a]
            .partial_cmp(&costs[b])
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });

    let mut free_a = vec![true; n];
    let mut free_b = vec![true; n];
    let mut matched = Vec::with_capacity(n);
    for (i, j) in pairs {
        if free_a[i] && free_b[j] {
            free_a[i] = false;
            free_b[j] = false;
            matched.push(costs[[i, j]]);
            if matched.len() == n {
                break;
            }
        }
    }
    mean_of_sorted(matched)
}

/// Weighted multi-start matching; the smaller of both directions wins.
fn weighted<F: Float>(costs: ArrayView2<F>, epsilon: F) -> F {
    let n = costs.nrows();
    let step: usize = F::from_count(n).powf(F::one() - epsilon).floor().as_();
    let mut best = F::infinity();
    for start in (0..n).step_by(step.max(1)) {
        let forward = directed_weighted(costs, start);
        let backward = directed_weighted(costs.t(), start);
        best = best.min(forward).min(backward);
    }
    best
}

/// Matches every row, in cyclic order from `start`, to its closest free
/// column. The k-th match weighs `1 - k / n`.
fn directed_weighted<F: Float>(costs: ArrayView2<F>, start: usize) -> F {
    let n = costs.nrows();
    let count = F::from_count(n);
    let mut free = vec![true; n];
    let mut sum = F::zero();
    let mut weights = F::zero();
    for k in 0..n {
        let i = (start + k) % n;
        let mut closest = None;
        let mut min = F::infinity();
        for j in 0..n {
            if free[j] && costs[[i, j]] < min {
                min = costs[[i, j]];
                closest = Some(j);
            }
        }
        if let Some(j) = closest {
            free[j] = false;
            let weight = F::one() - F::from_count(k) / count;
            sum += weight * min;
            weights += weight;
        }
    }
    sum / weights
}

/// Mean of the matched costs, summed smallest first so that equal multisets
/// always give bit-identical results.
fn mean_of_sorted<F: Float>(mut matched: Vec<F>) -> F {
    matched.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = F::from_count(matched.len());
    matched.into_iter().sum::<F>() / n
}
