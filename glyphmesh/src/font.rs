//! The font façade that turns text into meshes.

use std::sync::Arc;

use read_outlines::{
    types::{GlyphId, NameId},
    FontRef, TableProvider,
};

use crate::{
    charmap::Charmap,
    mesh::{Bounds, GlyphMesh, TextMesh},
    metrics::{GlyphMetrics, Metrics},
    outline::{GlyphOutline, OutlineGlyphs},
    GlyphMeshCache, MeshError, TextSettings,
};

/// Advance of a space, in ems.
const SPACE_ADVANCE: f32 = 0.25;

/// Advance used in place of an unrenderable character, in ems.
const FALLBACK_ADVANCE: f32 = 0.5;

/// A TrueType font prepared for meshing.
///
/// The font borrows its data; every mesh it returns owns its buffers.
#[derive(Clone)]
pub struct MeshFont<'a> {
    font: FontRef<'a>,
    charmap: Charmap<'a>,
    glyph_metrics: GlyphMetrics<'a>,
    outlines: OutlineGlyphs<'a>,
}

impl<'a> MeshFont<'a> {
    /// Parses the font and checks for the tables needed to build meshes.
    pub fn new(data: &'a [u8]) -> Result<Self, MeshError> {
        Self::from_font_ref(FontRef::new(data)?)
    }

    /// Prepares an already parsed font.
    ///
    /// The `head`, `maxp`, `hhea`, `hmtx`, `loca` and `glyf` tables are
    /// required. Without a usable `cmap` table every character is unmapped.
    pub fn from_font_ref(font: FontRef<'a>) -> Result<Self, MeshError> {
        font.head()?;
        font.maxp()?;
        font.hhea()?;
        font.hmtx()?;
        let outlines = OutlineGlyphs::new(&font)?;
        let charmap = Charmap::new(&font);
        if !charmap.has_map() {
            log::warn!("font has no supported character map, no characters will be drawn");
        }
        Ok(Self {
            glyph_metrics: GlyphMetrics::new(&font),
            charmap,
            outlines,
            font,
        })
    }

    pub fn font(&self) -> &FontRef<'a> {
        &self.font
    }

    pub fn charmap(&self) -> &Charmap<'a> {
        &self.charmap
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::new(&self.font)
    }

    pub fn glyph_metrics(&self) -> &GlyphMetrics<'a> {
        &self.glyph_metrics
    }

    /// Returns the family name from the `name` table, if present.
    pub fn family_name(&self) -> Option<String> {
        self.font.name().ok()?.find(NameId::FAMILY_NAME)
    }

    /// Returns the nominal glyph for a character.
    pub fn glyph_id(&self, ch: char) -> Option<GlyphId> {
        self.charmap.map(ch)
    }

    /// Loads the outline of a glyph in font units.
    pub fn outline(&self, glyph_id: GlyphId) -> Result<Option<GlyphOutline>, MeshError> {
        self.outlines.get(glyph_id)
    }

    /// Builds the origin relative mesh of a single glyph.
    ///
    /// A glyph without an outline produces an empty mesh that still carries
    /// its advance.
    pub fn glyph_mesh(
        &self,
        glyph_id: GlyphId,
        settings: &TextSettings,
    ) -> Result<GlyphMesh, MeshError> {
        let scale = self.scale(settings.font_size);
        let mesh = match self.outlines.get(glyph_id)? {
            Some(outline) => {
                GlyphMesh::from_outline(&outline, scale, settings.spline_steps, settings.kind())
            }
            None => {
                let advance = self
                    .glyph_metrics
                    .advance_width(glyph_id)
                    .unwrap_or_default();
                GlyphMesh::empty(glyph_id, (advance as f64 * scale) as f32, settings.kind())
            }
        };
        log::trace!(
            "glyph {glyph_id}: {} vertices, {} indices",
            mesh.vertex_count(),
            mesh.indices.len()
        );
        Ok(mesh)
    }

    /// Lays out `text` on a single line and builds its mesh.
    ///
    /// Characters are placed left to right starting at `settings.position`.
    /// This never fails: characters that cannot be drawn are logged and
    /// replaced by blank space.
    pub fn text_mesh(&self, text: &str, settings: &TextSettings) -> TextMesh {
        self.layout(text, settings, |glyph_id| {
            self.glyph_mesh(glyph_id, settings).map(Arc::new)
        })
    }

    /// Same as [`text_mesh`](Self::text_mesh) but reuses glyph meshes from
    /// `cache`.
    pub fn text_mesh_cached(
        &self,
        text: &str,
        settings: &TextSettings,
        cache: &GlyphMeshCache,
    ) -> TextMesh {
        self.layout(text, settings, |glyph_id| {
            cache.get_or_insert(glyph_id, settings, || self.glyph_mesh(glyph_id, settings))
        })
    }

    fn layout(
        &self,
        text: &str,
        settings: &TextSettings,
        mut glyph_mesh: impl FnMut(GlyphId) -> Result<Arc<GlyphMesh>, MeshError>,
    ) -> TextMesh {
        let [x, y, z] = settings.position;
        let mut mesh = TextMesh {
            vertices: Vec::new(),
            indices: Vec::new(),
            bounds: Bounds::at(settings.position),
            advance_width: 0.0,
            kind: settings.kind(),
            color: settings.color,
            line_width: settings.line_width,
        };
        let mut bounds: Option<Bounds> = None;
        let mut pen_x = 0.0;
        for ch in text.chars() {
            if ch == ' ' {
                pen_x += SPACE_ADVANCE * settings.font_size;
                continue;
            }
            let Some(glyph_id) = self.glyph_id(ch) else {
                log::warn!("no glyph for {ch:?}, skipping");
                pen_x += FALLBACK_ADVANCE * settings.font_size;
                continue;
            };
            match glyph_mesh(glyph_id) {
                Ok(glyph) => {
                    if let Some(placed) = mesh.append(&glyph, [x + pen_x, y, z]) {
                        bounds = Some(bounds.map_or(placed, |bounds| bounds.union(&placed)));
                    }
                    pen_x += glyph.advance_width;
                }
                Err(e) => {
                    log::warn!("glyph {glyph_id} for {ch:?} can't be drawn: {e}");
                    pen_x += FALLBACK_ADVANCE * settings.font_size;
                }
            }
        }
        mesh.advance_width = pen_x;
        if let Some(bounds) = bounds {
            mesh.bounds = bounds;
        }
        mesh
    }

    /// Factor converting font units to world units.
    fn scale(&self, font_size: f32) -> f64 {
        match self.glyph_metrics.units_per_em() {
            0 => 0.0,
            upem => font_size as f64 / upem as f64,
        }
    }
}
