//! The [hmtx (Horizontal Metrics)](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table

use bytemuck_derive::AnyBitPattern;
use types::{BigEndian, GlyphId, Tag};

use crate::{FontData, FontReadWithArgs, ReadArgs, ReadError, TopLevelTable};

/// An advance width and left side bearing pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnyBitPattern)]
#[repr(C)]
pub struct LongMetric {
    pub advance: BigEndian<u16>,
    pub side_bearing: BigEndian<i16>,
}

impl LongMetric {
    pub fn advance(&self) -> u16 {
        self.advance.get()
    }

    pub fn side_bearing(&self) -> i16 {
        self.side_bearing.get()
    }
}

/// The [hmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table.
#[derive(Clone, Copy, Debug)]
pub struct Hmtx<'a> {
    h_metrics: &'a [LongMetric],
    left_side_bearings: &'a [BigEndian<i16>],
}

impl TopLevelTable for Hmtx<'_> {
    const TAG: Tag = Tag::new(b"hmtx");
}

impl ReadArgs for Hmtx<'_> {
    /// `(numberOfHMetrics, numGlyphs)`
    type Args = (u16, u16);
}

impl<'a> FontReadWithArgs<'a> for Hmtx<'a> {
    fn read_with_args(data: FontData<'a>, args: &(u16, u16)) -> Result<Self, ReadError> {
        let (number_of_h_metrics, num_glyphs) = *args;
        if number_of_h_metrics == 0 && num_glyphs > 0 {
            return Err(ReadError::MalformedData("hmtx has no long metrics"));
        }
        let mut cursor = data.cursor();
        let h_metrics = cursor.read_array(number_of_h_metrics as usize)?;
        let lsb_count = num_glyphs.saturating_sub(number_of_h_metrics);
        let left_side_bearings = cursor.read_array(lsb_count as usize)?;
        Ok(Hmtx {
            h_metrics,
            left_side_bearings,
        })
    }
}

impl<'a> Hmtx<'a> {
    /// Read the table with the counts taken from `hhea` and `maxp`.
    pub fn read(
        data: FontData<'a>,
        number_of_h_metrics: u16,
        num_glyphs: u16,
    ) -> Result<Self, ReadError> {
        Self::read_with_args(data, &(number_of_h_metrics, num_glyphs))
    }

    pub fn h_metrics(&self) -> &'a [LongMetric] {
        self.h_metrics
    }

    /// Side bearings for glyphs past the end of [`Hmtx::h_metrics`].
    pub fn left_side_bearings(&self) -> &'a [BigEndian<i16>] {
        self.left_side_bearings
    }

    /// Returns the advance width for the given glyph identifier.
    ///
    /// Glyphs past the end of the long metrics array share the advance of
    /// the final entry.
    pub fn advance(&self, glyph_id: GlyphId) -> Option<u16> {
        let ix = glyph_id.to_u32() as usize;
        self.h_metrics
            .get(ix)
            .or_else(|| self.h_metrics.last())
            .map(LongMetric::advance)
    }

    /// Returns the left side bearing for the given glyph identifier.
    pub fn side_bearing(&self, glyph_id: GlyphId) -> Option<i16> {
        let ix = glyph_id.to_u32() as usize;
        match self.h_metrics.get(ix) {
            Some(metric) => Some(metric.side_bearing()),
            None => self
                .left_side_bearings
                .get(ix - self.h_metrics.len())
                .map(BigEndian::get),
        }
    }
}
