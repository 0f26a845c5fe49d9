use ndarray::{NdFloat, ScalarOperand};

use num_traits::{AsPrimitive, FromPrimitive, Signed};
use rand::distr::uniform::SampleUniform;

use std::iter::Sum;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

// Include submodules
mod common;
mod distance;
mod trace;

// Re-export types from submodules
pub use common::{Gesture, TracePoint};
pub use distance::{Distance, L1Dist, L2Dist};
pub use trace::GestureBuilder;

/// Floating point type used for gesture coordinates.
///
/// Implemented for `f32` and `f64`; `f64` is the reference precision.
pub trait Float:
    NdFloat
    + FromPrimitive
    + Default
    + Signed
    + Sum
    + AsPrimitive<usize>
    + for<'a> AddAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> DivAssign<&'a Self>
    + SampleUniform
    + ScalarOperand
    + std::marker::Unpin
{
    /// Converts a point count into the float domain.
    fn from_count(n: usize) -> Self;

    /// Converts an `f64` constant, rounding when `Self` is narrower.
    fn from_f64_lossy(value: f64) -> Self;
}

impl Float for f32 {
    fn from_count(n: usize) -> Self {
        n as f32
    }

    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }
}

impl Float for f64 {
    fn from_count(n: usize) -> Self {
        n as f64
    }

    fn from_f64_lossy(value: f64) -> Self {
        value
    }
}
