//! Ear clipping of a single counter-clockwise polygon.

use kurbo::Point;

use super::{
    classify::MIN_AREA,
    polygon::{contains, cross, in_closed_triangle, segments_cross},
};

/// Triangulates a counter-clockwise, weakly simple polygon.
///
/// Returns triangles as indices into `polygon`, wound counter-clockwise,
/// and whether the polygon was fully consumed.
///
/// Before each ear is searched for, vertices whose corner has negligible
/// area (collinear runs and zero width spikes) are dropped from the ring
/// without emitting a triangle. An ear is then a convex vertex whose
/// triangle has no other remaining vertex inside it or on its edges, whose
/// closing diagonal crosses no remaining edge, and whose centroid lies
/// inside the polygon. Copies of the ear's own corners, which hole seams
/// create, never block it.
///
/// The search gives up, keeping the triangles found so far, when a full
/// pass over the remaining vertices finds no ear.
pub(crate) fn ear_clip(polygon: &[Point]) -> (Vec<[u32; 3]>, bool) {
    let n = polygon.len();
    if n < 3 {
        return (Vec::new(), false);
    }
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);
    let mut current = 0;
    while remaining.len() > 3 {
        let len = remaining.len();
        let corner = |i: usize| [(i + len - 1) % len, i, (i + 1) % len].map(|j| remaining[j]);
        let flat = (0..len).find(|&i| {
            let [a, b, c] = corner(i).map(|j| polygon[j]);
            cross(a, b, c).abs() * 0.5 < MIN_AREA
        });
        if let Some(i) = flat {
            remaining.remove(i);
            current = i % remaining.len();
            continue;
        }
        let ear = (0..len).map(|offset| (current + offset) % len).find(|&i| {
            let [a, b, c] = corner(i).map(|j| polygon[j]);
            cross(a, b, c) > 0.0 && is_ear(polygon, &remaining, corner(i))
        });
        let Some(i) = ear else {
            return (triangles, false);
        };
        let [prev, vertex, next] = corner(i);
        triangles.push([prev as u32, vertex as u32, next as u32]);
        remaining.remove(i);
        current = i % remaining.len();
    }
    let [a, b, c] = [remaining[0], remaining[1], remaining[2]];
    if cross(polygon[a], polygon[b], polygon[c]) > 0.0 {
        triangles.push([a as u32, b as u32, c as u32]);
    }
    (triangles, true)
}

fn is_ear(polygon: &[Point], remaining: &[usize], corners: [usize; 3]) -> bool {
    let [a, b, c] = corners.map(|i| polygon[i]);
    let is_corner = |point: Point| point == a || point == b || point == c;
    let blocked = remaining.iter().any(|&j| {
        let point = polygon[j];
        !corners.contains(&j) && !is_corner(point) && in_closed_triangle(a, b, c, point)
    });
    if blocked {
        return false;
    }
    // the diagonal c-a becomes an edge once the ear is gone
    let len = remaining.len();
    let diagonal_crosses = (0..len).any(|k| {
        let (p, q) = (polygon[remaining[k]], polygon[remaining[(k + 1) % len]]);
        let touches = [p, q].iter().any(|end| *end == a || *end == c);
        !touches && segments_cross(c, a, p, q)
    });
    if diagonal_crosses {
        return false;
    }
    let centroid = Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
    contains(polygon, centroid)
}
