//! The [cmap](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap) table

use std::ops::Range;

use bytemuck_derive::AnyBitPattern;
use types::{BigEndian, GlyphId, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The platform identifier of an encoding record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformId {
    Unicode,
    Macintosh,
    Iso,
    Windows,
    Custom,
    Unknown(u16),
}

impl From<u16> for PlatformId {
    fn from(raw: u16) -> Self {
        match raw {
            0 => PlatformId::Unicode,
            1 => PlatformId::Macintosh,
            2 => PlatformId::Iso,
            3 => PlatformId::Windows,
            4 => PlatformId::Custom,
            other => PlatformId::Unknown(other),
        }
    }
}

/// Locates a subtable for a platform and encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnyBitPattern)]
#[repr(C)]
pub struct EncodingRecord {
    pub platform_id: BigEndian<u16>,
    pub encoding_id: BigEndian<u16>,
    pub subtable_offset: BigEndian<u32>,
}

impl EncodingRecord {
    pub fn platform_id(&self) -> PlatformId {
        self.platform_id.get().into()
    }

    pub fn encoding_id(&self) -> u16 {
        self.encoding_id.get()
    }

    /// Byte offset from the start of the cmap table to the subtable.
    pub fn subtable_offset(&self) -> u32 {
        self.subtable_offset.get()
    }

    /// Resolve the subtable, given the data of the parent cmap table.
    pub fn subtable<'a>(&self, data: FontData<'a>) -> Result<CmapSubtable<'a>, ReadError> {
        data.split_off(self.subtable_offset() as usize)
            .ok_or(ReadError::OutOfBounds)
            .and_then(CmapSubtable::read)
    }
}

/// The [cmap](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap)
/// (character to glyph index mapping) table.
#[derive(Clone, Copy)]
pub struct Cmap<'a> {
    data: FontData<'a>,
    version: u16,
    encoding_records: &'a [EncodingRecord],
}

impl TopLevelTable for Cmap<'_> {
    const TAG: Tag = Tag::new(b"cmap");
}

impl<'a> FontRead<'a> for Cmap<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        let num_tables: u16 = cursor.read()?;
        let encoding_records = cursor.read_array(num_tables as usize)?;
        Ok(Cmap {
            data,
            version,
            encoding_records,
        })
    }
}

impl<'a> Cmap<'a> {
    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn encoding_records(&self) -> &'a [EncodingRecord] {
        self.encoding_records
    }

    /// The data of the whole table; subtable offsets are relative to this.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }

    /// Map a codepoint to a nominal glyph identifier
    ///
    /// This uses the first available subtable that provides a valid mapping.
    /// Callers that care which subtable is used should select one themselves.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let codepoint = codepoint.into();
        self.encoding_records
            .iter()
            .filter_map(|record| record.subtable(self.data).ok())
            .find_map(|subtable| subtable.map_codepoint(codepoint))
    }
}

impl std::fmt::Debug for Cmap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cmap")
            .field("version", &self.version)
            .field("encoding_records", &self.encoding_records)
            .finish()
    }
}

/// The subtable formats we know how to read.
#[derive(Clone, Debug)]
pub enum CmapSubtable<'a> {
    Format4(Cmap4<'a>),
    Format12(Cmap12<'a>),
}

impl<'a> FontRead<'a> for CmapSubtable<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            4 => Cmap4::read(data).map(CmapSubtable::Format4),
            12 => Cmap12::read(data).map(CmapSubtable::Format12),
            other => Err(ReadError::InvalidFormat(other as i64)),
        }
    }
}

impl CmapSubtable<'_> {
    pub fn format(&self) -> u16 {
        match self {
            CmapSubtable::Format4(_) => 4,
            CmapSubtable::Format12(_) => 12,
        }
    }

    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        match self {
            CmapSubtable::Format4(cmap4) => cmap4.map_codepoint(codepoint),
            CmapSubtable::Format12(cmap12) => cmap12.map_codepoint(codepoint),
        }
    }
}

/// [cmap Format 4](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values):
/// Segment mapping to delta values
#[derive(Clone)]
pub struct Cmap4<'a> {
    data: FontData<'a>,
    language: u16,
    end_code: &'a [BigEndian<u16>],
    start_code: &'a [BigEndian<u16>],
    id_delta: &'a [BigEndian<i16>],
    id_range_offsets: &'a [BigEndian<u16>],
    // position of id_range_offsets[0], which the indirect lookup is relative to
    id_range_offsets_pos: usize,
    glyph_id_array: &'a [BigEndian<u16>],
}

impl<'a> FontRead<'a> for Cmap4<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 4 {
            return Err(ReadError::InvalidFormat(format as i64));
        }
        let length: u16 = cursor.read()?;
        let language: u16 = cursor.read()?;
        let seg_count_x2: u16 = cursor.read()?;
        if seg_count_x2 % 2 != 0 {
            return Err(ReadError::MalformedData("odd segCountX2 in cmap format 4"));
        }
        let seg_count = seg_count_x2 as usize / 2;
        // searchRange, entrySelector, rangeShift
        cursor.advance_by(6);
        let end_code = cursor.read_array(seg_count)?;
        let _reserved_pad: u16 = cursor.read()?;
        let start_code = cursor.read_array(seg_count)?;
        let id_delta = cursor.read_array(seg_count)?;
        let id_range_offsets_pos = cursor.position()?;
        let id_range_offsets = cursor.read_array(seg_count)?;
        let glyph_id_start = cursor.position()?;
        // the length field is unreliable in the wild; trust it only when it
        // is consistent with the arrays we've already read.
        let declared_end = (length as usize).clamp(glyph_id_start, data.len());
        let glyph_id_len = (declared_end - glyph_id_start) / 2;
        let glyph_id_array = cursor.read_array(glyph_id_len)?;
        Ok(Cmap4 {
            data,
            language,
            end_code,
            start_code,
            id_delta,
            id_range_offsets,
            id_range_offsets_pos,
            glyph_id_array,
        })
    }
}

impl<'a> Cmap4<'a> {
    pub fn language(&self) -> u16 {
        self.language
    }

    /// Number of segments.
    pub fn seg_count(&self) -> usize {
        self.end_code.len()
    }

    /// End characterCode for each segment, last=0xFFFF.
    pub fn end_code(&self) -> &'a [BigEndian<u16>] {
        self.end_code
    }

    /// Start character code for each segment.
    pub fn start_code(&self) -> &'a [BigEndian<u16>] {
        self.start_code
    }

    /// Delta for all character codes in segment.
    pub fn id_delta(&self) -> &'a [BigEndian<i16>] {
        self.id_delta
    }

    /// Offsets into glyphIdArray or 0
    pub fn id_range_offsets(&self) -> &'a [BigEndian<u16>] {
        self.id_range_offsets
    }

    /// Glyph index array (arbitrary length)
    pub fn glyph_id_array(&self) -> &'a [BigEndian<u16>] {
        self.glyph_id_array
    }

    /// Maps a codepoint to a nominal glyph identifier.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let codepoint = codepoint.into();
        if codepoint > 0xFFFF {
            return None;
        }
        let codepoint = codepoint as u16;
        let mut lo = 0;
        let mut hi = self.seg_count();
        while lo < hi {
            let i = (lo + hi) / 2;
            let start_code = self.start_code.get(i)?.get();
            if codepoint < start_code {
                hi = i;
            } else if codepoint > self.end_code.get(i)?.get() {
                lo = i + 1;
            } else {
                return self.lookup_glyph_id(codepoint, i, start_code);
            }
        }
        None
    }

    /// Returns an iterator over all (codepoint, glyph identifier) pairs
    /// in the subtable.
    pub fn iter(&self) -> Cmap4Iter<'a> {
        Cmap4Iter::new(self.clone())
    }

    /// Does the final phase of glyph id lookup.
    ///
    /// Shared between Self::map_codepoint and Cmap4Iter.
    fn lookup_glyph_id(&self, codepoint: u16, index: usize, start_code: u16) -> Option<GlyphId> {
        let delta = self.id_delta.get(index)?.get();
        let range_offset = self.id_range_offsets.get(index)?.get() as usize;
        if range_offset == 0 {
            return Some(GlyphId::new(codepoint.wrapping_add_signed(delta)));
        }
        // the offset is relative to the location of the idRangeOffset entry itself
        let pos = self.id_range_offsets_pos
            + index * 2
            + range_offset
            + (codepoint - start_code) as usize * 2;
        let gid: u16 = self.data.read_at(pos).ok()?;
        (gid != 0).then_some(GlyphId::new(gid.wrapping_add_signed(delta)))
    }

    /// Returns the [start_code, end_code] range at the given index.
    fn code_range(&self, index: usize) -> Option<Range<u32>> {
        // Extend to u32 to ensure we don't overflow on the end + 1 bound
        // below.
        let start = self.start_code.get(index)?.get() as u32;
        let end = self.end_code.get(index)?.get() as u32;
        // Use end + 1 here because the range in the table is inclusive
        Some(start..end + 1)
    }
}

impl std::fmt::Debug for Cmap4<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cmap4")
            .field("seg_count", &self.seg_count())
            .field("glyph_id_array_len", &self.glyph_id_array.len())
            .finish()
    }
}

/// Iterator over all (codepoint, glyph identifier) pairs in
/// the subtable.
#[derive(Clone)]
pub struct Cmap4Iter<'a> {
    subtable: Cmap4<'a>,
    cur_range: Range<u32>,
    cur_start_code: u16,
    cur_range_ix: usize,
}

impl<'a> Cmap4Iter<'a> {
    fn new(subtable: Cmap4<'a>) -> Self {
        let cur_range = subtable.code_range(0).unwrap_or_default();
        let cur_start_code = cur_range.start as u16;
        Self {
            subtable,
            cur_range,
            cur_start_code,
            cur_range_ix: 0,
        }
    }
}

impl Iterator for Cmap4Iter<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(codepoint) = self.cur_range.next() {
                let Some(glyph_id) = self.subtable.lookup_glyph_id(
                    codepoint as u16,
                    self.cur_range_ix,
                    self.cur_start_code,
                ) else {
                    continue;
                };
                // The table might explicitly map some codepoints to 0. Avoid
                // returning those here.
                if glyph_id == GlyphId::NOTDEF {
                    continue;
                }
                return Some((codepoint, glyph_id));
            } else {
                self.cur_range_ix += 1;
                self.cur_range = self.subtable.code_range(self.cur_range_ix)?;
                self.cur_start_code = self.cur_range.start as u16;
            }
        }
    }
}

/// A run of sequential codepoints mapped to sequential glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnyBitPattern)]
#[repr(C)]
pub struct SequentialMapGroup {
    pub start_char_code: BigEndian<u32>,
    pub end_char_code: BigEndian<u32>,
    pub start_glyph_id: BigEndian<u32>,
}

impl SequentialMapGroup {
    /// First character code in this group.
    pub fn start_char_code(&self) -> u32 {
        self.start_char_code.get()
    }

    /// Last character code in this group; same condition as listed
    /// for the format 4 subtable
    pub fn end_char_code(&self) -> u32 {
        self.end_char_code.get()
    }

    /// Glyph index corresponding to the starting character code.
    pub fn start_glyph_id(&self) -> u32 {
        self.start_glyph_id.get()
    }
}

/// [cmap Format 12](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-12-segmented-coverage):
/// Segmented coverage
#[derive(Clone, Debug)]
pub struct Cmap12<'a> {
    language: u32,
    groups: &'a [SequentialMapGroup],
}

impl<'a> FontRead<'a> for Cmap12<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 12 {
            return Err(ReadError::InvalidFormat(format as i64));
        }
        // reserved, length
        cursor.advance_by(2 + 4);
        let language: u32 = cursor.read()?;
        let num_groups: u32 = cursor.read()?;
        let groups = cursor.read_array(num_groups as usize)?;
        Ok(Cmap12 { language, groups })
    }
}

impl<'a> Cmap12<'a> {
    pub fn language(&self) -> u32 {
        self.language
    }

    /// Array of SequentialMapGroup records.
    pub fn groups(&self) -> &'a [SequentialMapGroup] {
        self.groups
    }

    /// Maps a codepoint to a nominal glyph identifier.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let codepoint = codepoint.into();
        let mut lo = 0;
        let mut hi = self.groups.len();
        while lo < hi {
            let i = (lo + hi) / 2;
            let group = self.groups.get(i)?;
            if codepoint < group.start_char_code() {
                hi = i;
            } else if codepoint > group.end_char_code() {
                lo = i + 1;
            } else {
                return Some(self.lookup_glyph_id(
                    codepoint,
                    group.start_char_code(),
                    group.start_glyph_id(),
                ));
            }
        }
        None
    }

    /// Returns an iterator over all (codepoint, glyph identifier) pairs
    /// in the subtable.
    pub fn iter(&self) -> Cmap12Iter<'a> {
        Cmap12Iter::new(self.clone())
    }

    /// Does the final phase of glyph id lookup.
    ///
    /// Shared between Self::map_codepoint and Cmap12Iter.
    fn lookup_glyph_id(
        &self,
        codepoint: u32,
        start_char_code: u32,
        start_glyph_id: u32,
    ) -> GlyphId {
        GlyphId::new(start_glyph_id.wrapping_add(codepoint.wrapping_sub(start_char_code)) as u16)
    }

    /// Returns the codepoint range and start glyph id for the group
    /// at the given index.
    fn group(&self, index: usize) -> Option<(Range<u32>, u32)> {
        let group = self.groups.get(index)?;
        Some((
            // Use + 1 here because the group range is inclusive
            group.start_char_code()..group.end_char_code().saturating_add(1),
            group.start_glyph_id(),
        ))
    }
}

/// Iterator over all (codepoint, glyph identifier) pairs in
/// the subtable.
#[derive(Clone)]
pub struct Cmap12Iter<'a> {
    subtable: Cmap12<'a>,
    cur_range: Range<u32>,
    cur_start_code: u32,
    cur_start_glyph_id: u32,
    cur_range_ix: usize,
}

impl<'a> Cmap12Iter<'a> {
    fn new(subtable: Cmap12<'a>) -> Self {
        let (cur_range, cur_start_glyph_id) = subtable.group(0).unwrap_or_default();
        let cur_start_code = cur_range.start;
        Self {
            subtable,
            cur_range,
            cur_start_code,
            cur_start_glyph_id,
            cur_range_ix: 0,
        }
    }
}

impl Iterator for Cmap12Iter<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(codepoint) = self.cur_range.next() {
                let glyph_id = self.subtable.lookup_glyph_id(
                    codepoint,
                    self.cur_start_code,
                    self.cur_start_glyph_id,
                );
                // The table might explicitly map some codepoints to 0. Avoid
                // returning those here.
                if glyph_id == GlyphId::NOTDEF {
                    continue;
                }
                return Some((codepoint, glyph_id));
            } else {
                self.cur_range_ix += 1;
                (self.cur_range, self.cur_start_glyph_id) =
                    self.subtable.group(self.cur_range_ix)?;
                self.cur_start_code = self.cur_range.start;
            }
        }
    }
}
