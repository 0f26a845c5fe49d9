use crate::Float;
use ndarray::Array2;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// A single 2D sample of a trace.
///
/// `stroke_id` groups the samples captured during one continuous pen-down
/// segment of a multi-stroke gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct TracePoint<F>
where
    F: Float,
{
    pub x: F,
    pub y: F,
    pub stroke_id: i32,
}

impl<F> TracePoint<F>
where
    F: Float,
{
    pub fn new(x: F, y: F, stroke_id: i32) -> Self {
        TracePoint { x, y, stroke_id }
    }

    /// Euclidean distance to `other`, ignoring stroke ids.
    pub fn distance_to(&self, other: &TracePoint<F>) -> F {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A labeled, ordered sequence of trace points, possibly spanning several
/// strokes.
///
/// A `Gesture` is immutable once built: every transformation of the point
/// cloud produces a new value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Gesture<F>
where
    F: Float,
{
    label: String,
    points: Vec<TracePoint<F>>,
}

impl<F> Gesture<F>
where
    F: Float,
{
    pub fn new(label: impl Into<String>, points: Vec<TracePoint<F>>) -> Self {
        Gesture {
            label: label.into(),
            points,
        }
    }

    /// Builds an unlabeled gesture, typically a candidate to classify.
    pub fn unlabeled(points: Vec<TracePoint<F>>) -> Self {
        Self::new(String::new(), points)
    }

    /// Builds a single-stroke gesture from raw `(x, y)` pairs.
    pub fn from_xy(label: impl Into<String>, xy: &[(F, F)]) -> Self {
        let points = xy
            .iter()
            .map(|&(x, y)| TracePoint::new(x, y, 0))
            .collect();
        Self::new(label, points)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn points(&self) -> &[TracePoint<F>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of pen-down segments, counting each change of stroke id along
    /// the capture order.
    pub fn stroke_count(&self) -> usize {
        match self.points.first() {
            None => 0,
            Some(_) => {
                1 + self
                    .points
                    .windows(2)
                    .filter(|w| w[0].stroke_id != w[1].stroke_id)
                    .count()
            }
        }
    }

    /// Length of the polyline through all points, including the jumps between
    /// consecutive strokes.
    pub fn path_length(&self) -> F {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    /// The coordinates as an `n x 2` matrix (column 0 is x, column 1 is y).
    pub fn coords(&self) -> Array2<F> {
        Array2::from_shape_fn((self.points.len(), 2), |(i, axis)| {
            let p = &self.points[i];
            if axis == 0 { p.x } else { p.y }
        })
    }

    /// A copy of this gesture filed under another label.
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self::new(label, self.points.clone())
    }
}
