//! Triangulation of glyph outlines with holes.
//!
//! Contours are grouped into outer shapes and holes by containment (see
//! [`triangulate`]), each hole is bridged into its outer contour, and the
//! merged polygons are ear clipped. Degenerate contours are skipped, and a
//! polygon that runs out of ears yields a partial result rather than an
//! error.

mod bridge;
mod classify;
mod earclip;
mod polygon;

use kurbo::Point;

use crate::MeshError;

/// Triangles covering the filled area of a set of contours.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triangulation {
    /// Vertices of the merged polygons, in the input coordinate space.
    ///
    /// Bridge vertices appear twice.
    pub vertices: Vec<Point>,
    /// Counter-clockwise triangles as indices into `vertices`.
    pub triangles: Vec<[u32; 3]>,
    /// False if some polygon could not be fully triangulated.
    pub complete: bool,
}

impl Triangulation {
    /// Returns the problem with an incomplete triangulation.
    pub fn error(&self) -> Option<MeshError> {
        (!self.complete).then_some(MeshError::DegenerateGeometry)
    }
}

/// Triangulates the region enclosed by closed polylines.
///
/// Contours are classified as outer shapes or holes by containment, so
/// their stored winding does not matter. Every outer shape is triangulated
/// together with the holes directly inside it. Contours with fewer than
/// three points or negligible area are ignored.
pub fn triangulate(contours: &[Vec<Point>]) -> Triangulation {
    let mut result = Triangulation {
        complete: true,
        ..Default::default()
    };
    for group in classify::classify(contours) {
        let merged = bridge::merge_holes(&group.outer, &group.holes);
        let (triangles, complete) = earclip::ear_clip(&merged);
        if !complete {
            log::debug!(
                "{}: clipped {} triangles from a polygon with {} vertices",
                MeshError::DegenerateGeometry,
                triangles.len(),
                merged.len()
            );
            result.complete = false;
        }
        let base = result.vertices.len() as u32;
        result
            .triangles
            .extend(triangles.iter().map(|t| t.map(|i| i + base)));
        result.vertices.extend(merged);
    }
    result
}
