//! Global font and glyph specific metrics.
//!
//! All values are reported in font units. Callers scale them with
//! [`GlyphMetrics::scale`], which maps font units to world units for a
//! given font size: `world = units / units_per_em * font_size`.

use read_outlines::{
    tables::hmtx::LongMetric,
    types::{BigEndian, GlyphId},
    TableProvider,
};

/// Metrics that apply to all glyphs in a font.
///
/// These are derived from the `head`, `maxp` and `hhea` tables.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct Metrics {
    /// Number of font design units per em unit.
    pub units_per_em: u16,
    /// Number of glyphs in the font.
    pub glyph_count: u16,
    /// Distance from the baseline to the top of the alignment box.
    pub ascent: i16,
    /// Distance from the baseline to the bottom of the alignment box.
    pub descent: i16,
    /// Recommended additional spacing between lines.
    pub leading: i16,
    /// Maximum advance width of all glyphs in the font.
    pub max_width: u16,
}

impl Metrics {
    /// Creates new metrics for the given font.
    ///
    /// Missing tables leave their fields zeroed.
    pub fn new<'a>(font: &impl TableProvider<'a>) -> Self {
        let mut metrics = Metrics::default();
        if let Ok(head) = font.head() {
            metrics.units_per_em = head.units_per_em();
        }
        if let Ok(maxp) = font.maxp() {
            metrics.glyph_count = maxp.num_glyphs();
        }
        if let Ok(hhea) = font.hhea() {
            metrics.ascent = hhea.ascender();
            metrics.descent = hhea.descender();
            metrics.leading = hhea.line_gap();
            metrics.max_width = hhea.advance_width_max();
        }
        metrics
    }
}

/// Glyph specific metrics.
#[derive(Clone, Default, Debug)]
pub struct GlyphMetrics<'a> {
    glyph_count: u32,
    units_per_em: u16,
    h_metrics: &'a [LongMetric],
    default_advance_width: u16,
    lsbs: &'a [BigEndian<i16>],
}

impl<'a> GlyphMetrics<'a> {
    /// Creates new glyph metrics from the given font.
    pub fn new(font: &impl TableProvider<'a>) -> Self {
        let glyph_count = font
            .maxp()
            .map(|maxp| maxp.num_glyphs() as u32)
            .unwrap_or_default();
        let units_per_em = font
            .head()
            .map(|head| head.units_per_em())
            .unwrap_or_default();
        let (h_metrics, default_advance_width, lsbs) = font
            .hmtx()
            .map(|hmtx| {
                let h_metrics = hmtx.h_metrics();
                let default_advance_width = h_metrics.last().map(|m| m.advance()).unwrap_or(0);
                let lsbs = hmtx.left_side_bearings();
                (h_metrics, default_advance_width, lsbs)
            })
            .unwrap_or_default();
        Self {
            glyph_count,
            units_per_em,
            h_metrics,
            default_advance_width,
            lsbs,
        }
    }

    /// Returns the number of available glyphs in the font.
    pub fn glyph_count(&self) -> u32 {
        self.glyph_count
    }

    /// Returns the number of font units per em.
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Returns the factor converting font units to world units at the given
    /// font size, or zero if the font has no valid units per em.
    pub fn scale(&self, font_size: f32) -> f32 {
        if self.units_per_em == 0 {
            0.0
        } else {
            font_size / self.units_per_em as f32
        }
    }

    /// Returns the advance width for the specified glyph in font units.
    ///
    /// Glyphs past the end of the long metrics share the final advance.
    /// Returns `None` if `glyph_id >= self.glyph_count()`.
    pub fn advance_width(&self, glyph_id: GlyphId) -> Option<u16> {
        if glyph_id.to_u32() >= self.glyph_count {
            return None;
        }
        Some(
            self.h_metrics
                .get(glyph_id.to_u32() as usize)
                .map(|metric| metric.advance())
                .unwrap_or(self.default_advance_width),
        )
    }

    /// Returns the left side bearing for the specified glyph in font units.
    ///
    /// Returns `None` if `glyph_id >= self.glyph_count()`.
    pub fn left_side_bearing(&self, glyph_id: GlyphId) -> Option<i16> {
        if glyph_id.to_u32() >= self.glyph_count {
            return None;
        }
        let gid_index = glyph_id.to_u32() as usize;
        Some(
            self.h_metrics
                .get(gid_index)
                .map(|metric| metric.side_bearing())
                .unwrap_or_else(|| {
                    self.lsbs
                        .get(gid_index.saturating_sub(self.h_metrics.len()))
                        .map(|lsb| lsb.get())
                        .unwrap_or_default()
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outline_test_data::glyph_font::{self, ADVANCES, NUMBER_OF_H_METRICS};
    use read_outlines::FontRef;

    #[test]
    fn metrics() {
        let font = FontRef::new(outline_test_data::glyph_font()).unwrap();
        let metrics = Metrics::new(&font);
        let expected = Metrics {
            units_per_em: 1000,
            glyph_count: glyph_font::NUM_GLYPHS,
            ascent: glyph_font::ASCENDER,
            descent: glyph_font::DESCENDER,
            leading: 0,
            max_width: 620,
        };
        assert_eq!(metrics, expected);
    }

    #[test]
    fn glyph_advances() {
        let font = FontRef::new(outline_test_data::glyph_font()).unwrap();
        let glyph_metrics = GlyphMetrics::new(&font);
        assert_eq!(glyph_metrics.glyph_count(), glyph_font::NUM_GLYPHS as u32);
        for (gid, advance) in ADVANCES.iter().enumerate() {
            let gid = GlyphId::new(gid as u16);
            let expected = if gid.to_u16() < NUMBER_OF_H_METRICS {
                *advance
            } else {
                ADVANCES[NUMBER_OF_H_METRICS as usize - 1]
            };
            assert_eq!(glyph_metrics.advance_width(gid), Some(expected));
        }
        assert_eq!(
            glyph_metrics.advance_width(GlyphId::new(glyph_font::NUM_GLYPHS)),
            None
        );
    }

    #[test]
    fn side_bearings() {
        let font = FontRef::new(outline_test_data::glyph_font()).unwrap();
        let glyph_metrics = GlyphMetrics::new(&font);
        // xMin of the notdef box and of the 'L' stem
        assert_eq!(glyph_metrics.left_side_bearing(glyph_font::NOTDEF), Some(50));
        assert_eq!(glyph_metrics.left_side_bearing(glyph_font::SPACE), Some(0));
        // stored in the trailing side bearing array
        assert_eq!(
            glyph_metrics.left_side_bearing(glyph_font::SKEWED),
            Some(60)
        );
    }

    #[test]
    fn scale_to_world_units() {
        let font = FontRef::new(outline_test_data::glyph_font()).unwrap();
        let glyph_metrics = GlyphMetrics::new(&font);
        assert_eq!(glyph_metrics.scale(2.0), 0.002);
        assert_eq!(GlyphMetrics::default().scale(2.0), 0.0);
    }
}
