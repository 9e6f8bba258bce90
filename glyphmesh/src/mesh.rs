//! Vertex and index buffers produced from glyph outlines.
//!
//! All meshes use world units: font units are multiplied by
//! `font_size / units_per_em`. Vertices are stored as flat `x, y, z`
//! triples with `z == 0` before placement.

use kurbo::Point;
use read_outlines::types::GlyphId;

use crate::{outline::GlyphOutline, triangulate::triangulate};

/// Axis aligned bounding box in world units.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    /// An empty box located at `point`.
    pub fn at(point: [f32; 3]) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Bounds) -> Self {
        Self {
            min: [0, 1, 2].map(|i| self.min[i].min(other.min[i])),
            max: [0, 1, 2].map(|i| self.max[i].max(other.max[i])),
        }
    }

    pub fn translate(&self, offset: [f32; 3]) -> Self {
        Self {
            min: [0, 1, 2].map(|i| self.min[i] + offset[i]),
            max: [0, 1, 2].map(|i| self.max[i] + offset[i]),
        }
    }

    /// Bounds of a flat vertex buffer, or `None` if it is empty.
    fn of_vertices(vertices: &[f32]) -> Option<Self> {
        let mut points = vertices.chunks_exact(3).map(|v| [v[0], v[1], v[2]]);
        let first = Self::at(points.next()?);
        Some(points.fold(first, |bounds, point| bounds.union(&Self::at(point))))
    }
}

/// Whether indices describe line segments or triangles.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeshKind {
    /// Index pairs, one per line segment.
    #[default]
    Wireframe,
    /// Index triples, one per counter-clockwise triangle.
    Filled,
}

/// The mesh of a single glyph, relative to its origin on the baseline.
#[derive(Clone, PartialEq, Debug)]
pub struct GlyphMesh {
    pub glyph_id: GlyphId,
    /// Flat `x, y, z` triples.
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub bounds: Bounds,
    /// Horizontal advance in world units.
    pub advance_width: f32,
    pub kind: MeshKind,
    /// False if triangulation gave up on part of the outline.
    pub complete: bool,
}

impl GlyphMesh {
    /// A mesh without geometry that only carries an advance.
    pub(crate) fn empty(glyph_id: GlyphId, advance_width: f32, kind: MeshKind) -> Self {
        Self {
            glyph_id,
            vertices: Vec::new(),
            indices: Vec::new(),
            bounds: Bounds::default(),
            advance_width,
            kind,
            complete: true,
        }
    }

    /// Converts an outline to world units with the given scale and builds
    /// either a wireframe or a fill.
    pub(crate) fn from_outline(
        outline: &GlyphOutline,
        scale: f64,
        spline_steps: u32,
        kind: MeshKind,
    ) -> Self {
        let contours = outline.flatten(spline_steps);
        let mut mesh = Self::empty(
            outline.glyph_id,
            (outline.advance_width as f64 * scale) as f32,
            kind,
        );
        match kind {
            MeshKind::Wireframe => {
                for contour in contours.iter().filter(|contour| contour.len() >= 2) {
                    let base = mesh.vertex_count() as u32;
                    let len = contour.len() as u32;
                    mesh.push_points(contour, scale);
                    // a two point contour is a single segment, not a loop
                    let segments = if len == 2 { 1 } else { len };
                    mesh.indices
                        .extend((0..segments).flat_map(|i| [base + i, base + (i + 1) % len]));
                }
            }
            MeshKind::Filled => {
                let triangulation = triangulate(&contours);
                mesh.complete = triangulation.complete;
                mesh.push_points(&triangulation.vertices, scale);
                mesh.indices = triangulation.triangles.into_iter().flatten().collect();
            }
        }
        mesh.bounds = Bounds::of_vertices(&mesh.vertices).unwrap_or_default();
        mesh
    }

    fn push_points(&mut self, points: &[Point], scale: f64) {
        self.vertices.extend(
            points
                .iter()
                .flat_map(|p| [(p.x * scale) as f32, (p.y * scale) as f32, 0.0]),
        );
    }

    /// True if the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// The mesh of a laid out string.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextMesh {
    /// Flat `x, y, z` triples.
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    /// Union of the bounds of every glyph, or an empty box at the text
    /// position if nothing was drawn.
    pub bounds: Bounds,
    /// Total horizontal advance in world units.
    pub advance_width: f32,
    pub kind: MeshKind,
    pub color: [f32; 4],
    pub line_width: f32,
}

impl TextMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// True if the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the vertices as positions.
    pub fn positions(&self) -> &[[f32; 3]] {
        bytemuck::try_cast_slice(&self.vertices).unwrap_or_default()
    }

    /// Returns the vertex buffer as bytes in native endianness.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Returns the index buffer as bytes in native endianness.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Appends a glyph mesh translated by `offset`.
    ///
    /// Returns the placed bounds of the glyph, or `None` if it has no
    /// geometry. The bounds of the text itself are left untouched.
    pub(crate) fn append(&mut self, glyph: &GlyphMesh, offset: [f32; 3]) -> Option<Bounds> {
        if glyph.is_empty() {
            return None;
        }
        let base = self.vertex_count() as u32;
        self.vertices.extend(
            glyph
                .vertices
                .chunks_exact(3)
                .flat_map(|v| [v[0] + offset[0], v[1] + offset[1], v[2] + offset[2]]),
        );
        self.indices.extend(glyph.indices.iter().map(|i| i + base));
        Some(glyph.bounds.translate(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{Contour, OutlinePoint};
    use read_outlines::types::BoundingBox;

    fn square_outline() -> GlyphOutline {
        let points = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]
            .map(|p| OutlinePoint::new(Point::from(p), true));
        GlyphOutline {
            glyph_id: GlyphId::new(3),
            contours: vec![Contour::new(points.to_vec())],
            advance_width: 200,
            bounds: BoundingBox {
                x_min: 0.0,
                y_min: 0.0,
                x_max: 100.0,
                y_max: 100.0,
            },
            is_composite: false,
        }
    }

    #[test]
    fn wireframe_closes_contours() {
        let mesh = GlyphMesh::from_outline(&square_outline(), 0.01, 0, MeshKind::Wireframe);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 1, 2, 2, 3, 3, 0]);
        assert_eq!(mesh.advance_width, 2.0);
        assert_eq!(
            mesh.bounds,
            Bounds {
                min: [0.0; 3],
                max: [1.0, 1.0, 0.0]
            }
        );
    }

    #[test]
    fn two_point_contour_is_one_segment() {
        let mut outline = square_outline();
        let stroke = [(0.0, 300.0), (100.0, 300.0)]
            .map(|p| OutlinePoint::new(Point::from(p), true));
        outline.contours.push(Contour::new(stroke.to_vec()));
        let mesh = GlyphMesh::from_outline(&outline, 0.01, 0, MeshKind::Wireframe);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices[8..], [4, 5]);
    }

    #[test]
    fn filled_square() {
        let mesh = GlyphMesh::from_outline(&square_outline(), 0.01, 0, MeshKind::Filled);
        assert!(mesh.complete);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.vertices.chunks(3).all(|v| v[2] == 0.0));
    }

    #[test]
    fn negative_scale_keeps_winding() {
        let mesh = GlyphMesh::from_outline(&square_outline(), -0.01, 0, MeshKind::Filled);
        assert_eq!(mesh.bounds.min, [-1.0, -1.0, 0.0]);
        for t in mesh.indices.chunks(3) {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| {
                let i = i as usize * 3;
                Point::new(mesh.vertices[i] as f64, mesh.vertices[i + 1] as f64)
            });
            assert!((b - a).cross(c - a) > 0.0);
        }
    }

    #[test]
    fn text_append_offsets_indices() {
        let glyph = GlyphMesh::from_outline(&square_outline(), 0.01, 0, MeshKind::Wireframe);
        let mut text = TextMesh {
            vertices: Vec::new(),
            indices: Vec::new(),
            bounds: Bounds::at([5.0, 0.0, 0.0]),
            advance_width: 0.0,
            kind: MeshKind::Wireframe,
            color: [1.0; 4],
            line_width: 1.0,
        };
        let first = text.append(&glyph, [10.0, 0.0, 0.0]).unwrap();
        let second = text.append(&glyph, [12.0, 0.0, 1.0]).unwrap();
        assert_eq!(text.vertex_count(), 8);
        assert_eq!(text.indices[8..10], [4, 5]);
        assert_eq!(text.positions()[4], [12.0, 0.0, 1.0]);
        let bounds = first.union(&second);
        assert_eq!(bounds.min, [10.0, 0.0, 0.0]);
        assert_eq!(bounds.max, [13.0, 1.0, 1.0]);
        // untouched until the caller sets it
        assert_eq!(text.bounds, Bounds::at([5.0, 0.0, 0.0]));
        let empty = GlyphMesh::empty(GlyphId::new(1), 0.25, MeshKind::Wireframe);
        assert_eq!(text.append(&empty, [0.0; 3]), None);
        assert_eq!(text.vertex_bytes().len(), 8 * 3 * 4);
        assert_eq!(text.index_bytes().len(), 16 * 4);
    }
}
