//! The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use bytemuck_derive::AnyBitPattern;
use types::{BigEndian, BoundingBox, Fixed, LongDateTime, MajorMinor, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The value every well formed `head` table stores in `magicNumber`.
pub const MAGIC_NUMBER: u32 = 0x5F0F3CF5;

/// Byte offset of `checksumAdjustment`, which is excluded from the table's
/// own checksum.
pub const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

#[derive(Clone, Copy, Debug, AnyBitPattern)]
#[repr(C)]
struct HeadRecord {
    version: BigEndian<MajorMinor>,
    font_revision: BigEndian<Fixed>,
    checksum_adjustment: BigEndian<u32>,
    magic_number: BigEndian<u32>,
    flags: BigEndian<u16>,
    units_per_em: BigEndian<u16>,
    created: BigEndian<LongDateTime>,
    modified: BigEndian<LongDateTime>,
    x_min: BigEndian<i16>,
    y_min: BigEndian<i16>,
    x_max: BigEndian<i16>,
    y_max: BigEndian<i16>,
    mac_style: BigEndian<u16>,
    lowest_rec_ppem: BigEndian<u16>,
    font_direction_hint: BigEndian<i16>,
    index_to_loc_format: BigEndian<i16>,
    glyph_data_format: BigEndian<i16>,
}

/// The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head)
/// (font header) table.
#[derive(Clone, Copy)]
pub struct Head<'a> {
    record: &'a HeadRecord,
}

impl TopLevelTable for Head<'_> {
    const TAG: Tag = Tag::new(b"head");
}

impl<'a> FontRead<'a> for Head<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let record: &HeadRecord = data.read_ref_at(0)?;
        let magic = record.magic_number.get();
        if magic != MAGIC_NUMBER {
            log::warn!("head magic number is 0x{magic:08X}, expected 0x{MAGIC_NUMBER:08X}");
        }
        if record.units_per_em.get() == 0 {
            return Err(ReadError::MalformedData("unitsPerEm is zero"));
        }
        Ok(Head { record })
    }
}

impl Head<'_> {
    /// Version number of the font header table.
    pub fn version(&self) -> MajorMinor {
        self.record.version.get()
    }

    /// Set by font manufacturer.
    pub fn font_revision(&self) -> Fixed {
        self.record.font_revision.get()
    }

    /// To compute: set it to 0, sum the entire font as uint32, then store
    /// 0xB1B0AFBA - sum.
    pub fn checksum_adjustment(&self) -> u32 {
        self.record.checksum_adjustment.get()
    }

    /// Set to 0x5F0F3CF5.
    pub fn magic_number(&self) -> u32 {
        self.record.magic_number.get()
    }

    pub fn flags(&self) -> u16 {
        self.record.flags.get()
    }

    /// Number of font units in one em. Never zero.
    pub fn units_per_em(&self) -> u16 {
        self.record.units_per_em.get()
    }

    pub fn created(&self) -> LongDateTime {
        self.record.created.get()
    }

    pub fn modified(&self) -> LongDateTime {
        self.record.modified.get()
    }

    pub fn x_min(&self) -> i16 {
        self.record.x_min.get()
    }

    pub fn y_min(&self) -> i16 {
        self.record.y_min.get()
    }

    pub fn x_max(&self) -> i16 {
        self.record.x_max.get()
    }

    pub fn y_max(&self) -> i16 {
        self.record.y_max.get()
    }

    /// The union of all glyph bounding boxes.
    pub fn bounds(&self) -> BoundingBox<i16> {
        BoundingBox {
            x_min: self.x_min(),
            y_min: self.y_min(),
            x_max: self.x_max(),
            y_max: self.y_max(),
        }
    }

    pub fn mac_style(&self) -> u16 {
        self.record.mac_style.get()
    }

    /// Smallest readable size in pixels.
    pub fn lowest_rec_ppem(&self) -> u16 {
        self.record.lowest_rec_ppem.get()
    }

    /// Deprecated (Set to 2).
    pub fn font_direction_hint(&self) -> i16 {
        self.record.font_direction_hint.get()
    }

    /// 0 for short offsets (Offset16), 1 for long (Offset32).
    pub fn index_to_loc_format(&self) -> i16 {
        self.record.index_to_loc_format.get()
    }

    /// 0 for current format.
    pub fn glyph_data_format(&self) -> i16 {
        self.record.glyph_data_format.get()
    }
}

impl std::fmt::Debug for Head<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Head")
            .field("units_per_em", &self.units_per_em())
            .field("bounds", &self.bounds())
            .field("index_to_loc_format", &self.index_to_loc_format())
            .finish()
    }
}
