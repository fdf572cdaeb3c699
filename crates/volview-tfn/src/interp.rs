//! Piecewise-linear interpolation over sorted control points.

use crate::point::{ControlPoint, Lerp};

/// Evaluates a control-point curve at `x`.
///
/// Points must be sorted by x. Queries at or before the first knot return the
/// first value, at or after the last knot the last value. Between knots the
/// bracketing pair is blended linearly; a zero-width pair yields its left
/// value. An empty slice yields the value type's default.
///
/// # Example
///
/// ```rust
/// use volview_tfn::{interpolate, OpacityPoint};
///
/// let ramp = [OpacityPoint::new(0.0, 0.0), OpacityPoint::new(1.0, 1.0)];
/// assert_eq!(interpolate(&ramp, 0.25), 0.25);
/// assert_eq!(interpolate(&ramp, 7.0), 1.0);
/// ```
pub fn interpolate<P: ControlPoint>(points: &[P], x: f32) -> P::Value {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return P::Value::default();
    };
    if x <= first.x() {
        return first.value();
    }
    if x >= last.x() {
        return last.value();
    }

    // First knot strictly right of x; the clamps above keep it in 1..len.
    let hi = points.partition_point(|p| p.x() <= x);
    let (p0, p1) = (&points[hi - 1], &points[hi]);
    let (x0, x1) = (p0.x(), p1.x());
    if x1 == x0 {
        return p0.value();
    }
    p0.value().lerp(p1.value(), (x - x0) / (x1 - x0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColorPoint, OpacityPoint};
    use approx::assert_relative_eq;

    fn jet() -> Vec<ColorPoint> {
        vec![
            ColorPoint::new(0.0, 0.0, 0.0, 1.0),
            ColorPoint::new(0.3, 0.0, 1.0, 1.0),
            ColorPoint::new(0.6, 1.0, 1.0, 0.0),
            ColorPoint::new(1.0, 1.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_exact_at_knots() {
        let pts = jet();
        for p in &pts {
            assert_eq!(interpolate(&pts, p.x), p.rgb);
        }
    }

    #[test]
    fn test_clamps_outside() {
        let pts = jet();
        assert_eq!(interpolate(&pts, -1e6), [0.0, 0.0, 1.0]);
        assert_eq!(interpolate(&pts, -0.001), [0.0, 0.0, 1.0]);
        assert_eq!(interpolate(&pts, 1.001), [1.0, 0.0, 0.0]);
        assert_eq!(interpolate(&pts, f32::MAX), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_linear_between() {
        let pts = jet();
        let c = interpolate(&pts, 0.45);
        assert_relative_eq!(c[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(c[1], 1.0);
        assert_relative_eq!(c[2], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_equal_values_midpoint() {
        let pts = [
            OpacityPoint::new(0.0, 0.0),
            OpacityPoint::new(0.2, 0.7),
            OpacityPoint::new(0.8, 0.7),
            OpacityPoint::new(1.0, 1.0),
        ];
        assert_eq!(interpolate(&pts, 0.5), 0.7);
    }

    #[test]
    fn test_zero_width_pair() {
        let pts = [
            OpacityPoint::new(0.0, 0.0),
            OpacityPoint::new(0.5, 0.2),
            OpacityPoint::new(0.5, 0.9),
            OpacityPoint::new(1.0, 1.0),
        ];
        // x == 0.5 lands right of both coincident knots.
        assert_relative_eq!(interpolate(&pts, 0.5), 0.9);
        assert_relative_eq!(interpolate(&pts, 0.25), 0.1);
    }

    #[test]
    fn test_single_and_empty() {
        let one = [OpacityPoint::new(0.4, 0.6)];
        assert_eq!(interpolate(&one, 0.0), 0.6);
        assert_eq!(interpolate(&one, 1.0), 0.6);
        let none: [OpacityPoint; 0] = [];
        assert_eq!(interpolate(&none, 0.5), 0.0);
    }
}
