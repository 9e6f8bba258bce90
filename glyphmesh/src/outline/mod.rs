//! Extraction of glyph outlines from the `glyf` table.
//!
//! An outline is a list of closed contours, each a cyclic sequence of
//! on-curve and off-curve points in font units. Composite glyphs are
//! resolved into a single list of contours with each component's transform
//! and offset applied.

mod curve;
mod load;

use kurbo::Point;
use read_outlines::types::{BoundingBox, GlyphId};

pub use curve::flatten_contour;
pub use load::OutlineGlyphs;

/// A point of a contour in font units.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct OutlinePoint {
    pub point: Point,
    /// True if the point lies on the curve, false for quadratic control
    /// points.
    pub on_curve: bool,
}

impl OutlinePoint {
    pub fn new(point: Point, on_curve: bool) -> Self {
        Self { point, on_curve }
    }
}

/// One closed loop of an outline.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Contour {
    points: Vec<OutlinePoint>,
}

impl Contour {
    pub fn new(points: Vec<OutlinePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[OutlinePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Expands the contour into a polyline, see [`flatten_contour`].
    pub fn flatten(&self, spline_steps: u32) -> Vec<Point> {
        flatten_contour(&self.points, spline_steps)
    }
}

/// The outline of a single glyph.
#[derive(Clone, PartialEq, Debug)]
pub struct GlyphOutline {
    pub glyph_id: GlyphId,
    pub contours: Vec<Contour>,
    /// Advance width in font units.
    pub advance_width: u16,
    /// Bounding box in font units.
    ///
    /// Taken from the glyph header for simple glyphs and computed from the
    /// transformed points for composites.
    pub bounds: BoundingBox<f64>,
    pub is_composite: bool,
}

impl GlyphOutline {
    /// Total number of points over all contours.
    pub fn num_points(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    /// Expands every contour into a polyline.
    pub fn flatten(&self, spline_steps: u32) -> Vec<Vec<Point>> {
        self.contours
            .iter()
            .map(|contour| contour.flatten(spline_steps))
            .collect()
    }
}
