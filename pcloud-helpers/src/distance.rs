use crate::Float;
use ndarray::ArrayView1;

/// A metric between two coordinate rows of a point cloud.
pub trait Distance<F: Float>: Clone + Send + Sync {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F;
}

/// Euclidean distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L2Dist;

impl<F: Float> Distance<F> for L2Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y) * (x - y))
            .sum::<F>()
            .sqrt()
    }
}

/// Manhattan distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L1Dist;

impl<F: Float> Distance<F> for L1Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| num_traits::Float::abs(x - y))
            .sum()
    }
}
