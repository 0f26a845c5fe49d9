use pcloud_helpers::{Float, TracePoint};

use crate::NormalizeError;

/// Resamples a polyline into exactly `n` points spaced evenly by arc length.
///
/// All strokes are walked as one path: the pen-up jump between two strokes
/// counts towards the length like any other segment. The first and last
/// output points are the first and last input points; every interpolated
/// point keeps the stroke id of the sample that starts its segment.
///
/// Fails with `NonFiniteCoordinate` when the path length overflows.
pub fn resample<F: Float>(
    points: &[TracePoint<F>],
    n: usize,
) -> Result<Vec<TracePoint<F>>, NormalizeError> {
    if points.len() < 2 {
        return Err(NormalizeError::InsufficientData {
            points: points.len(),
        });
    }
    if n < 2 {
        return Err(NormalizeError::InvalidPointCount(n));
    }

    // cumulative[i] is the arc length from points[0] to points[i]
    let mut cumulative = Vec::with_capacity(points.len());
    let mut running = F::zero();
    cumulative.push(running);
    for w in points.windows(2) {
        running += w[0].distance_to(&w[1]);
        cumulative.push(running);
    }

    let first = points[0];
    let last = points[points.len() - 1];
    let total = running;
    // finite samples can still be far enough apart to overflow the length
    if !total.is_finite() {
        return Err(NormalizeError::NonFiniteCoordinate);
    }
    if total <= F::zero() {
        return Ok(vec![first; n]);
    }

    let interval = total / F::from_count(n - 1);
    let last_segment = points.len() - 2;
    let mut out = Vec::with_capacity(n);
    out.push(first);

    let mut seg = 0;
    for k in 1..n - 1 {
        let target = interval * F::from_count(k);
        while seg < last_segment && cumulative[seg + 1] < target {
            seg += 1;
        }
        let a = points[seg];
        let b = points[seg + 1];
        let seg_len = cumulative[seg + 1] - cumulative[seg];
        let t = if seg_len > F::zero() {
            ((target - cumulative[seg]) / seg_len)
                .max(F::zero())
                .min(F::one())
        } else {
            F::zero()
        };
        out.push(TracePoint::new(
            a.x + (b.x - a.x) * t,
            a.y + (b.y - a.y) * t,
            a.stroke_id,
        ));
    }

    out.push(last);
    Ok(out)
}
