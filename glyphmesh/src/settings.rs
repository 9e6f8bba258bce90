//! Options for a single meshing request.

use crate::mesh::MeshKind;

/// Settings that control how text is converted into a mesh.
///
/// Only `font_size`, `spline_steps` and `filled` affect geometry. The
/// remaining fields are carried through to the resulting
/// [`TextMesh`](crate::TextMesh) for the renderer.
///
/// With the `serde` feature enabled, missing fields take their default
/// values when deserializing.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextSettings {
    /// World units per em.
    ///
    /// A negative size mirrors the text through the origin.
    pub font_size: f32,
    /// Number of steps each quadratic segment is sampled with.
    ///
    /// Zero keeps the raw control points. A value `n > 0` adds `n - 1`
    /// interior samples per segment.
    pub spline_steps: u32,
    /// Produce a triangle mesh rather than a line wireframe.
    pub filled: bool,
    /// Advisory line width for wireframes.
    pub line_width: f32,
    /// RGBA tint.
    pub color: [f32; 4],
    /// Translation applied to the whole string.
    pub position: [f32; 3],
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            font_size: 1.0,
            spline_steps: 0,
            filled: false,
            line_width: 1.0,
            color: [1.0; 4],
            position: [0.0; 3],
        }
    }
}

impl TextSettings {
    /// Creates default settings for the given font size.
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            ..Default::default()
        }
    }

    pub fn with_spline_steps(mut self, spline_steps: u32) -> Self {
        self.spline_steps = spline_steps;
        self
    }

    pub fn with_filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }

    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    /// Returns the kind of mesh these settings produce.
    pub fn kind(&self) -> MeshKind {
        if self.filled {
            MeshKind::Filled
        } else {
            MeshKind::Wireframe
        }
    }
}
