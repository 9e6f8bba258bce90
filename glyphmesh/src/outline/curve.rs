//! Expansion of quadratic contours into polylines.

use kurbo::{ParamCurve, Point, QuadBez};

use super::OutlinePoint;

/// Expands a closed TrueType contour into an explicit polyline.
///
/// Consecutive on-curve points form straight edges. An off-curve point
/// between two on-curve points is the control point of a quadratic segment,
/// and two consecutive off-curve points imply an on-curve point at their
/// midpoint. The contour is cyclic: when it begins with an off-curve point
/// it starts from the last point if that one is on-curve, and from the
/// midpoint of the first and last points otherwise.
///
/// With `spline_steps == 0` the raw control points are returned unchanged.
/// Otherwise each quadratic segment contributes its interior samples at
/// `t = i / spline_steps` for `i` in `1..spline_steps`, between its own end
/// points.
///
/// Consecutive duplicate points are dropped and the polyline is not closed
/// explicitly: the last point connects back to the first.
pub fn flatten_contour(points: &[OutlinePoint], spline_steps: u32) -> Vec<Point> {
    let mut flattener = Flattener {
        out: Vec::with_capacity(points.len() * (spline_steps.max(1) as usize)),
        steps: spline_steps,
    };
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return flattener.out;
    };
    if spline_steps == 0 {
        for point in points {
            flattener.push(point.point);
        }
        return flattener.finish();
    }
    let (start, rest) = if first.on_curve {
        (first.point, &points[1..])
    } else if last.on_curve {
        (last.point, &points[..points.len() - 1])
    } else {
        (first.point.midpoint(last.point), points)
    };
    flattener.push(start);
    let mut current = start;
    let mut control: Option<Point> = None;
    for point in rest {
        if point.on_curve {
            if let Some(control) = control.take() {
                flattener.quad_to(current, control, point.point);
            }
            flattener.push(point.point);
            current = point.point;
        } else {
            if let Some(control) = control {
                let implied = control.midpoint(point.point);
                flattener.quad_to(current, control, implied);
                flattener.push(implied);
                current = implied;
            }
            control = Some(point.point);
        }
    }
    if let Some(control) = control {
        flattener.quad_to(current, control, start);
    }
    flattener.finish()
}

struct Flattener {
    out: Vec<Point>,
    steps: u32,
}

impl Flattener {
    fn push(&mut self, point: Point) {
        if self.out.last() != Some(&point) {
            self.out.push(point);
        }
    }

    /// Pushes the interior samples of a quadratic segment.
    fn quad_to(&mut self, start: Point, control: Point, end: Point) {
        let quad = QuadBez::new(start, control, end);
        for i in 1..self.steps {
            self.push(quad.eval(i as f64 / self.steps as f64));
        }
    }

    fn finish(mut self) -> Vec<Point> {
        while self.out.len() > 1 && self.out.first() == self.out.last() {
            self.out.pop();
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(x: f64, y: f64) -> OutlinePoint {
        OutlinePoint::new(Point::new(x, y), true)
    }

    fn off(x: f64, y: f64) -> OutlinePoint {
        OutlinePoint::new(Point::new(x, y), false)
    }

    #[test]
    fn straight_edges_are_verbatim() {
        let square = [on(0.0, 0.0), on(10.0, 0.0), on(10.0, 10.0), on(0.0, 10.0)];
        for steps in [0, 1, 4] {
            assert_eq!(
                flatten_contour(&square, steps),
                square.iter().map(|p| p.point).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn raw_control_points() {
        let contour = [off(0.0, 0.0), on(10.0, 0.0), off(10.0, 10.0), off(0.0, 10.0)];
        assert_eq!(
            flatten_contour(&contour, 0),
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ]
        );
    }

    #[test]
    fn samples_quadratic_segment() {
        let contour = [on(0.0, 0.0), off(10.0, 20.0), on(20.0, 0.0)];
        let flattened = flatten_contour(&contour, 2);
        // B(0.5) = 0.25 * p0 + 0.5 * p1 + 0.25 * p2
        assert_eq!(
            flattened,
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(20.0, 0.0),
            ]
        );
        assert_eq!(flatten_contour(&contour, 8).len(), 2 + 7);
        // one step keeps only the segment end points
        assert_eq!(flatten_contour(&contour, 1).len(), 2);
    }

    #[test]
    fn implied_midpoint_between_off_curve_points() {
        let contour = [on(0.0, 0.0), off(0.0, 10.0), off(10.0, 10.0), on(10.0, 0.0)];
        let flattened = flatten_contour(&contour, 1);
        assert_eq!(
            flattened,
            vec![
                Point::new(0.0, 0.0),
                Point::new(5.0, 10.0),
                Point::new(10.0, 0.0),
            ]
        );
    }

    #[test]
    fn leading_off_curve_starts_at_last_point() {
        let contour = [off(0.0, 10.0), on(10.0, 10.0), on(10.0, 0.0), on(0.0, 0.0)];
        let flattened = flatten_contour(&contour, 1);
        assert_eq!(flattened[0], Point::new(0.0, 0.0));
        assert_eq!(flattened.len(), 3);
    }

    #[test]
    fn all_off_curve_contour() {
        let contour = [off(0.0, 0.0), off(10.0, 0.0), off(10.0, 10.0), off(0.0, 10.0)];
        let flattened = flatten_contour(&contour, 1);
        // only the four implied midpoints remain
        assert_eq!(
            flattened,
            vec![
                Point::new(0.0, 5.0),
                Point::new(5.0, 0.0),
                Point::new(10.0, 5.0),
                Point::new(5.0, 10.0),
            ]
        );
        assert_eq!(flatten_contour(&contour, 4).len(), 4 * 4);
    }

    #[test]
    fn duplicates_are_dropped() {
        let contour = [
            on(0.0, 0.0),
            on(0.0, 0.0),
            on(10.0, 0.0),
            on(10.0, 10.0),
            on(0.0, 0.0),
        ];
        assert_eq!(flatten_contour(&contour, 0).len(), 3);
        assert!(flatten_contour(&[], 3).is_empty());
        assert_eq!(flatten_contour(&[on(1.0, 1.0)], 3).len(), 1);
    }
}
