//! The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table

use bytemuck_derive::AnyBitPattern;
use types::{BigEndian, MajorMinor, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

#[derive(Clone, Copy, Debug, AnyBitPattern)]
#[repr(C)]
struct HheaRecord {
    version: BigEndian<MajorMinor>,
    ascender: BigEndian<i16>,
    descender: BigEndian<i16>,
    line_gap: BigEndian<i16>,
    advance_width_max: BigEndian<u16>,
    min_left_side_bearing: BigEndian<i16>,
    min_right_side_bearing: BigEndian<i16>,
    x_max_extent: BigEndian<i16>,
    caret_slope_rise: BigEndian<i16>,
    caret_slope_run: BigEndian<i16>,
    caret_offset: BigEndian<i16>,
    _reserved0: BigEndian<i16>,
    _reserved1: BigEndian<i16>,
    _reserved2: BigEndian<i16>,
    _reserved3: BigEndian<i16>,
    metric_data_format: BigEndian<i16>,
    number_of_h_metrics: BigEndian<u16>,
}

/// The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea)
/// (horizontal header) table.
#[derive(Clone, Copy, Debug)]
pub struct Hhea<'a> {
    record: &'a HheaRecord,
}

impl TopLevelTable for Hhea<'_> {
    const TAG: Tag = Tag::new(b"hhea");
}

impl<'a> FontRead<'a> for Hhea<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.read_ref_at(0).map(|record| Hhea { record })
    }
}

impl Hhea<'_> {
    pub fn version(&self) -> MajorMinor {
        self.record.version.get()
    }

    /// Typographic ascent.
    pub fn ascender(&self) -> i16 {
        self.record.ascender.get()
    }

    /// Typographic descent.
    pub fn descender(&self) -> i16 {
        self.record.descender.get()
    }

    /// Typographic line gap.
    pub fn line_gap(&self) -> i16 {
        self.record.line_gap.get()
    }

    /// Maximum advance width value in 'hmtx' table.
    pub fn advance_width_max(&self) -> u16 {
        self.record.advance_width_max.get()
    }

    pub fn min_left_side_bearing(&self) -> i16 {
        self.record.min_left_side_bearing.get()
    }

    pub fn min_right_side_bearing(&self) -> i16 {
        self.record.min_right_side_bearing.get()
    }

    pub fn x_max_extent(&self) -> i16 {
        self.record.x_max_extent.get()
    }

    pub fn caret_slope_rise(&self) -> i16 {
        self.record.caret_slope_rise.get()
    }

    pub fn caret_slope_run(&self) -> i16 {
        self.record.caret_slope_run.get()
    }

    pub fn caret_offset(&self) -> i16 {
        self.record.caret_offset.get()
    }

    /// 0 for current format.
    pub fn metric_data_format(&self) -> i16 {
        self.record.metric_data_format.get()
    }

    /// Number of LongMetric entries in the 'hmtx' table.
    pub fn number_of_h_metrics(&self) -> u16 {
        self.record.number_of_h_metrics.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outline_test_data::bebuffer::BeBuffer;

    #[test]
    fn read_metrics() {
        let buf = BeBuffer::new()
            .extend([1u16, 0])
            .extend([800i16, -200, 90])
            .push(1200u16)
            .extend([-40i16, -60, 1150, 1, 0, 0])
            .extend([0i16; 4])
            .push(0i16)
            .push(7u16);
        let hhea = Hhea::read(FontData::new(&buf)).unwrap();
        assert_eq!(hhea.ascender(), 800);
        assert_eq!(hhea.descender(), -200);
        assert_eq!(hhea.line_gap(), 90);
        assert_eq!(hhea.advance_width_max(), 1200);
        assert_eq!(hhea.x_max_extent(), 1150);
        assert_eq!(hhea.caret_slope_rise(), 1);
        assert_eq!(hhea.number_of_h_metrics(), 7);
        assert!(Hhea::read(FontData::new(&buf[..34])).is_err());
    }
}
