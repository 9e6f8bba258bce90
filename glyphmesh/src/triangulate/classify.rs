//! Grouping of contours into outer shapes and the holes they enclose.

use kurbo::Point;

use super::polygon::{contains, signed_area};

/// Below this absolute area a contour is treated as degenerate.
pub(crate) const MIN_AREA: f64 = 1e-10;

/// Maximum number of vertices tested when deciding containment.
const CONTAINMENT_SAMPLES: usize = 32;

/// An outer contour, wound counter-clockwise, with the clockwise holes that
/// lie directly inside it.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ShapeGroup {
    pub outer: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Role {
    Outer(usize),
    Hole,
}

/// Classifies contours by containment rather than by their stored winding.
///
/// Contours are visited from largest to smallest absolute area. A contour
/// whose sampled vertices mostly fall inside a larger contour takes the
/// opposite role of the smallest such contour: inside an outer it is a hole,
/// inside a hole it is a new outer (an island). Contours with fewer than
/// three points or negligible area are dropped.
pub(crate) fn classify(contours: &[Vec<Point>]) -> Vec<ShapeGroup> {
    let mut sorted: Vec<(&[Point], f64)> = contours
        .iter()
        .filter(|contour| contour.len() >= 3)
        .map(|contour| (contour.as_slice(), signed_area(contour)))
        .filter(|(_, area)| area.abs() >= MIN_AREA)
        .collect();
    // stable, so equal areas keep their font order
    sorted.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

    let mut groups: Vec<ShapeGroup> = Vec::new();
    let mut roles: Vec<Role> = Vec::with_capacity(sorted.len());
    for (i, &(contour, area)) in sorted.iter().enumerate() {
        let parent = (0..i)
            .rev()
            .find(|&candidate| mostly_inside(contour, sorted[candidate].0));
        match parent.map(|parent| roles[parent]) {
            Some(Role::Outer(group)) => {
                groups[group].holes.push(oriented(contour, area, false));
                roles.push(Role::Hole);
            }
            Some(Role::Hole) | None => {
                roles.push(Role::Outer(groups.len()));
                groups.push(ShapeGroup {
                    outer: oriented(contour, area, true),
                    holes: Vec::new(),
                });
            }
        }
    }
    groups
}

fn mostly_inside(contour: &[Point], container: &[Point]) -> bool {
    let stride = contour.len().div_ceil(CONTAINMENT_SAMPLES).max(1);
    let mut samples = 0;
    let mut inside = 0;
    for &point in contour.iter().step_by(stride) {
        samples += 1;
        if contains(container, point) {
            inside += 1;
        }
    }
    inside * 2 > samples
}

/// Copies the contour, reversing it if needed so it winds counter-clockwise
/// (`ccw == true`) or clockwise.
fn oriented(contour: &[Point], area: f64, ccw: bool) -> Vec<Point> {
    let mut points = contour.to_vec();
    if (area > 0.0) != ccw {
        points.reverse();
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ]
    }

    fn reversed(mut points: Vec<Point>) -> Vec<Point> {
        points.reverse();
        points
    }

    #[test]
    fn single_outer_is_counter_clockwise() {
        let groups = classify(&[reversed(square(0.0, 0.0, 10.0))]);
        assert_eq!(groups.len(), 1);
        assert!(signed_area(&groups[0].outer) > 0.0);
        assert!(groups[0].holes.is_empty());
    }

    #[test]
    fn hole_ignores_stored_winding() {
        // both contours wound counter-clockwise, hole listed first
        let groups = classify(&[square(3.0, 3.0, 4.0), square(0.0, 0.0, 10.0)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].outer.len(), 4);
        assert_eq!(groups[0].holes.len(), 1);
        assert!(signed_area(&groups[0].outer) > 0.0);
        assert!(signed_area(&groups[0].holes[0]) < 0.0);
    }

    #[test]
    fn disjoint_outers() {
        let groups = classify(&[square(0.0, 0.0, 10.0), square(20.0, 0.0, 5.0)]);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|group| group.holes.is_empty()));
    }

    #[test]
    fn island_inside_hole() {
        let groups = classify(&[
            square(0.0, 0.0, 30.0),
            square(5.0, 5.0, 20.0),
            square(10.0, 10.0, 10.0),
            square(12.0, 12.0, 6.0),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].holes.len(), 1);
        assert_eq!(groups[1].outer, square(10.0, 10.0, 10.0));
        assert_eq!(groups[1].holes, vec![reversed(square(12.0, 12.0, 6.0))]);
    }

    #[test]
    fn degenerate_contours_are_dropped() {
        let line = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(10.0, 10.0)];
        let pair = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        let groups = classify(&[line, pair, square(0.0, 0.0, 1.0)]);
        assert_eq!(groups.len(), 1);
        assert!(classify(&[]).is_empty());
    }
}
