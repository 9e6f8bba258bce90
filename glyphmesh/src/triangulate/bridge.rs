//! Merging holes into their outer contour.
//!
//! Each hole is joined to the outer boundary by a pair of coincident edges
//! (a seam) running from the hole's rightmost vertex to the nearest outer
//! vertex that can see it. The result is a single weakly simple polygon
//! that a plain ear clipper can triangulate.

use kurbo::Point;

use super::polygon::{cross, edges, segments_cross};

/// Splices every hole into the counter-clockwise `outer` contour.
///
/// Holes must wind clockwise. They are bridged in order of decreasing
/// rightmost x so that earlier seams never block later ones.
pub(crate) fn merge_holes(outer: &[Point], holes: &[Vec<Point>]) -> Vec<Point> {
    let mut order: Vec<(usize, usize)> = holes
        .iter()
        .enumerate()
        .filter_map(|(i, hole)| rightmost(hole).map(|vertex| (i, vertex)))
        .collect();
    order.sort_by(|a, b| holes[b.0][b.1].x.total_cmp(&holes[a.0][a.1].x));

    let mut merged = outer.to_vec();
    for (pos, &(hole_idx, vertex)) in order.iter().enumerate() {
        let hole = &holes[hole_idx];
        let pending = order[pos + 1..].iter().map(|&(i, _)| holes[i].as_slice());
        let bridge = find_bridge(&merged, hole, vertex, pending);
        merged = splice(&merged, bridge, hole, vertex);
    }
    merged
}

/// Index of the vertex with the greatest x, first one on ties.
fn rightmost(points: &[Point]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, point) in points.iter().enumerate() {
        if best.is_none_or(|best| point.x > points[best].x) {
            best = Some(i);
        }
    }
    best
}

/// Chooses the polygon vertex that the hole vertex is bridged to.
///
/// The closest vertex whose connecting segment stays inside the polygon is
/// preferred. Without one, the closest vertex to the right of the hole
/// vertex is used, then the closest vertex overall.
fn find_bridge<'a>(
    polygon: &[Point],
    hole: &[Point],
    hole_vertex: usize,
    pending: impl Iterator<Item = &'a [Point]> + Clone,
) -> usize {
    let target = hole[hole_vertex];
    let visible = nearest(polygon, target, |i| {
        in_cone(polygon, i, target)
            && !crosses_any(polygon[i], target, polygon)
            && !crosses_any(polygon[i], target, hole)
            && !pending
                .clone()
                .any(|other| crosses_any(polygon[i], target, other))
    });
    if let Some(index) = visible {
        return index;
    }
    log::debug!(
        "no visible bridge vertex for hole point ({}, {}), falling back to nearest",
        target.x,
        target.y
    );
    nearest(polygon, target, |i| polygon[i].x > target.x)
        .or_else(|| nearest(polygon, target, |_| true))
        .unwrap_or_default()
}

fn nearest(
    polygon: &[Point],
    target: Point,
    mut accept: impl FnMut(usize) -> bool,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, point) in polygon.iter().enumerate() {
        let distance = point.distance_squared(target);
        if best.is_some_and(|(_, best)| distance >= best) {
            continue;
        }
        if accept(i) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}

/// True if `target` lies within the interior angle at polygon vertex `i`.
fn in_cone(polygon: &[Point], i: usize, target: Point) -> bool {
    let n = polygon.len();
    let prev = polygon[(i + n - 1) % n];
    let vertex = polygon[i];
    let next = polygon[(i + 1) % n];
    let left_of_incoming = cross(prev, vertex, target) > 0.0;
    let left_of_outgoing = cross(vertex, next, target) > 0.0;
    if cross(prev, vertex, next) >= 0.0 {
        left_of_incoming && left_of_outgoing
    } else {
        left_of_incoming || left_of_outgoing
    }
}

/// True if the segment `a-b` properly crosses an edge of `polygon` that does
/// not share an end point with it.
fn crosses_any(a: Point, b: Point, polygon: &[Point]) -> bool {
    edges(polygon).any(|(p, q)| {
        let shares_end = [p, q].iter().any(|end| *end == a || *end == b);
        !shares_end && segments_cross(a, b, p, q)
    })
}

/// Inserts the hole after polygon vertex `bridge`, starting and ending at
/// `hole_vertex`, and closes the seam back to the bridge vertex.
fn splice(polygon: &[Point], bridge: usize, hole: &[Point], hole_vertex: usize) -> Vec<Point> {
    let mut merged = Vec::with_capacity(polygon.len() + hole.len() + 2);
    merged.extend_from_slice(&polygon[..=bridge]);
    merged.extend_from_slice(&hole[hole_vertex..]);
    merged.extend_from_slice(&hole[..hole_vertex]);
    merged.push(hole[hole_vertex]);
    merged.push(polygon[bridge]);
    merged.extend_from_slice(&polygon[bridge + 1..]);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulate::polygon::signed_area;

    fn points(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn square_hole() {
        let outer = points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let hole = points(&[(3.0, 3.0), (3.0, 7.0), (7.0, 7.0), (7.0, 3.0)]);
        let merged = merge_holes(&outer, &[hole]);
        assert_eq!(
            merged,
            points(&[
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (7.0, 7.0),
                (7.0, 3.0),
                (3.0, 3.0),
                (3.0, 7.0),
                (7.0, 7.0),
                (10.0, 10.0),
                (0.0, 10.0),
            ])
        );
        assert_eq!(signed_area(&merged), 84.0);
    }

    #[test]
    fn bridges_into_notch() {
        let outer = points(&[
            (0.0, 0.0),
            (20.0, 0.0),
            (20.0, 4.0),
            (11.0, 5.0),
            (20.0, 6.0),
            (20.0, 10.0),
            (0.0, 10.0),
        ]);
        let hole = points(&[(2.0, 2.0), (2.0, 8.0), (8.0, 5.0)]);
        let merged = merge_holes(&outer, &[hole]);
        assert_eq!(merged[3], Point::new(11.0, 5.0));
        assert_eq!(merged[4], Point::new(8.0, 5.0));
        assert_eq!(merged.len(), 7 + 3 + 2);
    }

    #[test]
    fn holes_bridge_right_to_left() {
        let outer = points(&[(0.0, 0.0), (30.0, 0.0), (30.0, 10.0), (0.0, 10.0)]);
        let a = points(&[(20.0, 2.0), (20.0, 8.0), (25.0, 8.0), (25.0, 2.0)]);
        let b = points(&[(5.0, 4.0), (5.0, 6.0), (10.0, 6.0), (10.0, 4.0)]);
        let merged = merge_holes(&outer, &[b, a]);
        assert_eq!(merged.len(), 4 + 2 * (4 + 2));
        assert_eq!(signed_area(&merged), 300.0 - 30.0 - 10.0);
        // hole a is bridged first, to the outer corner at (30, 10)
        assert_eq!(merged[2], Point::new(30.0, 10.0));
        assert_eq!(merged[3], Point::new(25.0, 8.0));
    }

    #[test]
    fn pending_hole_blocks_bridge() {
        let outer = points(&[
            (0.0, 0.0),
            (100.0, 0.0),
            (100.0, 100.0),
            (0.0, 100.0),
            (0.0, 50.0),
        ]);
        let near = points(&[(7.0, 48.0), (7.0, 52.0), (10.0, 50.0)]);
        // a tall hole between `near` and the vertex at (0, 50)
        let wall = points(&[(3.0, 40.0), (3.0, 60.0), (6.0, 60.0), (6.0, 40.0)]);
        let merged = merge_holes(&outer, &[wall, near]);
        assert_eq!(merged[0], Point::new(0.0, 0.0));
        assert_eq!(merged[1], Point::new(10.0, 50.0));
        assert_eq!(merged.len(), 5 + (3 + 2) + (4 + 2));
        assert_eq!(signed_area(&merged), 10000.0 - 6.0 - 60.0);
    }

    #[test]
    fn rightmost_prefers_first() {
        let hole = points(&[(0.0, 0.0), (5.0, 1.0), (5.0, 2.0)]);
        assert_eq!(rightmost(&hole), Some(1));
        assert_eq!(rightmost(&[]), None);
    }

    #[test]
    fn cone_at_reflex_vertex() {
        let outer = points(&[
            (0.0, 0.0),
            (20.0, 0.0),
            (20.0, 4.0),
            (11.0, 5.0),
            (20.0, 6.0),
            (20.0, 10.0),
            (0.0, 10.0),
        ]);
        // (11, 5) is reflex; points to its left are inside the polygon
        assert!(in_cone(&outer, 3, Point::new(8.0, 5.0)));
        assert!(!in_cone(&outer, 3, Point::new(15.0, 5.0)));
        // convex corner
        assert!(in_cone(&outer, 0, Point::new(1.0, 1.0)));
        assert!(!in_cone(&outer, 0, Point::new(-1.0, 1.0)));
    }
}
