//! Geometric normalization of gestures into canonical point clouds.
//!
//! A gesture goes through resampling, translation of its centroid to the
//! origin, optional rotation to a reference angle and scaling to a reference
//! bounding box. The result is a new [`Gesture`] with a fixed number of
//! points that can be compared point-to-point with any other gesture
//! normalized under the same configuration.

use ndarray::{Array2, Axis, array};
use ndarray_stats::QuantileExt;
use pcloud_helpers::{Float, Gesture, TracePoint};
use thiserror::Error;
use tracing::trace;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod resample;

pub use resample::resample;

/// Errors that can occur while normalizing a gesture.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    /// A path needs at least two samples.
    #[error("gesture has {points} point(s), at least 2 are needed to define a path")]
    InsufficientData { points: usize },
    /// The resampling target must be at least 2.
    #[error("point count must be at least 2, got {0}")]
    InvalidPointCount(usize),
    #[error("reference size must be positive and finite")]
    InvalidReferenceSize,
    #[error("reference angle must be finite")]
    InvalidReferenceAngle,
    /// The gesture contains a NaN or infinite coordinate.
    #[error("gesture contains a non-finite coordinate")]
    NonFiniteCoordinate,
}

/// Parameters of the normalization pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct NormalizationConfig<F>
where
    F: Float,
{
    /// Number of points every normalized cloud has.
    pub point_count: usize,
    /// Scale both axes by the same factor (keeps the aspect ratio).
    pub uniform_scale: bool,
    /// Align the first point with `reference_angle` before scaling.
    pub rotation_invariant: bool,
    /// Edge length of the reference bounding box.
    pub reference_size: F,
    /// Angle in radians the centroid-to-first-point vector is rotated onto.
    pub reference_angle: F,
}

impl<F> Default for NormalizationConfig<F>
where
    F: Float,
{
    fn default() -> Self {
        NormalizationConfig {
            point_count: 32,
            uniform_scale: true,
            rotation_invariant: false,
            reference_size: F::one(),
            reference_angle: F::zero(),
        }
    }
}

impl<F> NormalizationConfig<F>
where
    F: Float,
{
    pub fn with_point_count(mut self, point_count: usize) -> Self {
        self.point_count = point_count;
        self
    }

    pub fn with_uniform_scale(mut self, uniform_scale: bool) -> Self {
        self.uniform_scale = uniform_scale;
        self
    }

    pub fn with_rotation_invariant(mut self, rotation_invariant: bool) -> Self {
        self.rotation_invariant = rotation_invariant;
        self
    }

    pub fn with_reference_size(mut self, reference_size: F) -> Self {
        self.reference_size = reference_size;
        self
    }

    pub fn with_reference_angle(mut self, reference_angle: F) -> Self {
        self.reference_angle = reference_angle;
        self
    }

    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.point_count < 2 {
            return Err(NormalizeError::InvalidPointCount(self.point_count));
        }
        if !self.reference_size.is_finite() || self.reference_size <= F::zero() {
            return Err(NormalizeError::InvalidReferenceSize);
        }
        if !self.reference_angle.is_finite() {
            return Err(NormalizeError::InvalidReferenceAngle);
        }
        Ok(())
    }
}

/// Turns raw gestures into normalized point clouds.
#[derive(Debug, Clone)]
pub struct Normalizer<F>
where
    F: Float,
{
    config: NormalizationConfig<F>,
}

impl<F> Default for Normalizer<F>
where
    F: Float,
{
    fn default() -> Self {
        Normalizer {
            config: NormalizationConfig::default(),
        }
    }
}

impl<F> Normalizer<F>
where
    F: Float,
{
    /// Creates a normalizer.
    ///
    /// # Errors
    ///
    /// Returns the first violation reported by [`NormalizationConfig::validate`].
    pub fn new(config: NormalizationConfig<F>) -> Result<Self, NormalizeError> {
        config.validate()?;
        Ok(Normalizer { config })
    }

    pub fn config(&self) -> &NormalizationConfig<F> {
        &self.config
    }

    /// Normalizes `gesture` into a new gesture with the same label and
    /// exactly `point_count` points.
    ///
    /// The input is left untouched. The same input and configuration always
    /// produce bit-identical output.
    ///
    /// # Errors
    ///
    /// * `NormalizeError::InsufficientData` if the gesture has fewer than 2 points.
    /// * `NormalizeError::NonFiniteCoordinate` if any coordinate is NaN or infinite,
    ///   or the path is too long to measure.
    pub fn normalize(&self, gesture: &Gesture<F>) -> Result<Gesture<F>, NormalizeError> {
        if gesture
            .points()
            .iter()
            .any(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(NormalizeError::NonFiniteCoordinate);
        }

        let resampled = resample(gesture.points(), self.config.point_count)?;
        let mut cloud = Array2::from_shape_fn((resampled.len(), 2), |(i, axis)| {
            if axis == 0 { resampled[i].x } else { resampled[i].y }
        });

        translate_to_origin(&mut cloud)?;
        if self.config.rotation_invariant {
            rotate_to(&mut cloud, self.config.reference_angle);
        }
        scale_to(
            &mut cloud,
            self.config.reference_size,
            self.config.uniform_scale,
        )?;

        trace!(
            label = gesture.label(),
            input_points = gesture.len(),
            output_points = resampled.len(),
            "normalized gesture"
        );

        let points = cloud
            .rows()
            .into_iter()
            .zip(resampled.iter())
            .map(|(row, p)| TracePoint::new(row[0], row[1], p.stroke_id))
            .collect();
        Ok(Gesture::new(gesture.label(), points))
    }
}

/// Subtracts the centroid from every point.
fn translate_to_origin<F: Float>(cloud: &mut Array2<F>) -> Result<(), NormalizeError> {
    let centroid = cloud
        .mean_axis(Axis(0))
        .ok_or(NormalizeError::InsufficientData { points: 0 })?;
    *cloud -= &centroid;
    Ok(())
}

/// Rotates a centered cloud about the origin so that its first point lies at
/// `reference_angle`.
fn rotate_to<F: Float>(cloud: &mut Array2<F>, reference_angle: F) {
    let first = cloud.row(0);
    let indicative = first[1].atan2(first[0]);
    let (sin, cos) = (reference_angle - indicative).sin_cos();
    // row vectors, so this is the transpose of the usual rotation matrix
    let rotation = array![[cos, sin], [-sin, cos]];
    *cloud = cloud.dot(&rotation);
}

/// Scales the cloud so that its bounding box fits the reference square.
fn scale_to<F: Float>(
    cloud: &mut Array2<F>,
    reference_size: F,
    uniform: bool,
) -> Result<(), NormalizeError> {
    let mut extents = [F::zero(); 2];
    for (axis, extent) in extents.iter_mut().enumerate() {
        let column = cloud.column(axis);
        let min = *column
            .min()
            .map_err(|_| NormalizeError::NonFiniteCoordinate)?;
        let max = *column
            .max()
            .map_err(|_| NormalizeError::NonFiniteCoordinate)?;
        *extent = max - min;
    }

    if uniform {
        let extent = extents[0].max(extents[1]);
        if extent > F::zero() {
            let factor = reference_size / extent;
            cloud.mapv_inplace(|v| v * factor);
        }
    } else {
        for (axis, &extent) in extents.iter().enumerate() {
            if extent > F::zero() {
                let factor = reference_size / extent;
                cloud.column_mut(axis).mapv_inplace(|v| v * factor);
            }
        }
    }
    Ok(())
}
