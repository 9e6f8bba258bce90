//! Planar predicates over closed polygons.

use kurbo::Point;

/// Twice the signed area of the triangle `(o, a, b)`.
///
/// Positive when the triangle winds counter-clockwise.
pub(crate) fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a - o).cross(b - o)
}

/// Signed area of a closed polygon, positive for counter-clockwise winding.
pub(crate) fn signed_area(polygon: &[Point]) -> f64 {
    let Some(&last) = polygon.last() else {
        return 0.0;
    };
    let mut prev = last;
    let mut sum = 0.0;
    for &point in polygon {
        sum += prev.x * point.y - point.x * prev.y;
        prev = point;
    }
    sum * 0.5
}

/// Even-odd point containment.
///
/// Edges that appear twice with opposite direction cancel, so seams created
/// by hole bridging do not change the result.
pub(crate) fn contains(polygon: &[Point], point: Point) -> bool {
    let Some(&last) = polygon.last() else {
        return false;
    };
    let mut inside = false;
    let mut prev = last;
    for &next in polygon {
        // order the end points so both directions of an edge agree exactly
        let (a, b) = if prev.y < next.y {
            (prev, next)
        } else {
            (next, prev)
        };
        prev = next;
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (b.x - a.x) * (point.y - a.y) / (b.y - a.y);
            if point.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// True if `point` lies strictly inside the counter-clockwise triangle.
pub(crate) fn in_triangle(a: Point, b: Point, c: Point, point: Point) -> bool {
    cross(a, b, point) > 0.0 && cross(b, c, point) > 0.0 && cross(c, a, point) > 0.0
}

/// True if `point` lies inside the counter-clockwise triangle or on one of
/// its edges.
pub(crate) fn in_closed_triangle(a: Point, b: Point, c: Point, point: Point) -> bool {
    cross(a, b, point) >= 0.0 && cross(b, c, point) >= 0.0 && cross(c, a, point) >= 0.0
}

/// True if the open segments `p1-p2` and `q1-q2` cross at a single interior
/// point. Touching and collinear segments do not count.
pub(crate) fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Iterates the edges of a closed polygon, including the closing edge.
pub(crate) fn edges(polygon: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    polygon
        .iter()
        .copied()
        .zip(polygon.iter().copied().cycle().skip(1))
}
