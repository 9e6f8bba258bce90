//! Writers for the metadata tables

use outline_types::{Fixed, LongDateTime, MajorMinor, NameId, Version16Dot16};

use crate::bebuffer::BeBuffer;

/// Fields of the `head` table that tests care about.
#[derive(Clone, Copy, Debug)]
pub struct HeadFields {
    pub units_per_em: u16,
    pub bounds: (i16, i16, i16, i16),
    pub long_loca: bool,
    pub magic_number: u32,
}

impl Default for HeadFields {
    fn default() -> Self {
        HeadFields {
            units_per_em: 1000,
            bounds: (0, 0, 0, 0),
            long_loca: false,
            magic_number: 0x5F0F3CF5,
        }
    }
}

/// Marks `checksumAdjustment` in the buffer returned by [`head`].
pub const HEAD_CHECKSUM_ADJUSTMENT: &str = "checksum_adjustment";

pub fn head(fields: &HeadFields) -> BeBuffer {
    let (x_min, y_min, x_max, y_max) = fields.bounds;
    BeBuffer::new()
        .push(MajorMinor::VERSION_1_0)
        .push(Fixed::from_f64(1.0))
        .push_with_tag(0u32, HEAD_CHECKSUM_ADJUSTMENT)
        .push(fields.magic_number)
        .push(0b1011u16) // flags
        .push(fields.units_per_em)
        .extend([LongDateTime::new(3_600_000_000), LongDateTime::new(3_700_000_000)])
        .extend([x_min, y_min, x_max, y_max])
        .push(0u16) // macStyle
        .push(8u16) // lowestRecPPEM
        .push(2i16) // fontDirectionHint
        .push(fields.long_loca as i16)
        .push(0i16) // glyphDataFormat
}

/// Fields of the `hhea` table that tests care about.
#[derive(Clone, Copy, Debug, Default)]
pub struct HheaFields {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    pub number_of_h_metrics: u16,
}

pub fn hhea(fields: &HheaFields) -> BeBuffer {
    BeBuffer::new()
        .push(MajorMinor::VERSION_1_0)
        .extend([fields.ascender, fields.descender, fields.line_gap])
        .push(fields.advance_width_max)
        .extend([0i16, 0, 0]) // side bearing extrema and xMaxExtent
        .extend([1i16, 0, 0]) // caret slope rise, run, offset
        .extend([0i16; 4])
        .push(0i16) // metricDataFormat
        .push(fields.number_of_h_metrics)
}

/// Write `hmtx` from `(advance, lsb)` pairs, using long metrics for the
/// first `number_of_h_metrics` glyphs.
pub fn hmtx(metrics: &[(u16, i16)], number_of_h_metrics: u16) -> BeBuffer {
    let (long, short) = metrics.split_at((number_of_h_metrics as usize).min(metrics.len()));
    let mut buf = BeBuffer::new();
    for (advance, lsb) in long {
        buf = buf.push(*advance).push(*lsb);
    }
    buf.extend(short.iter().map(|(_, lsb)| *lsb))
}

/// Write a version 0.5 (`None`) or 1.0 `maxp` table.
///
/// The version 1.0 fields are given in table order, starting at maxPoints.
pub fn maxp(num_glyphs: u16, v1_fields: Option<[u16; 13]>) -> BeBuffer {
    match v1_fields {
        Some(fields) => BeBuffer::new()
            .push(Version16Dot16::VERSION_1_0)
            .push(num_glyphs)
            .extend(fields),
        None => BeBuffer::new()
            .push(Version16Dot16::VERSION_0_5)
            .push(num_glyphs),
    }
}

/// A record for [`name`], with the string encoded per platform.
#[derive(Clone, Debug)]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: NameId,
    pub value: String,
}

impl NameRecord {
    /// A Windows Unicode BMP record in US English.
    pub fn windows(name_id: NameId, value: &str) -> Self {
        NameRecord {
            platform_id: 3,
            encoding_id: 1,
            language_id: 0x409,
            name_id,
            value: value.into(),
        }
    }

    /// A Macintosh Roman record in English. Only ASCII values are supported.
    pub fn mac(name_id: NameId, value: &str) -> Self {
        NameRecord {
            platform_id: 1,
            encoding_id: 0,
            language_id: 0,
            name_id,
            value: value.into(),
        }
    }

    fn encode(&self) -> Vec<u8> {
        if self.platform_id == 1 {
            self.value.bytes().collect()
        } else {
            self.value
                .encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect()
        }
    }
}

/// Write a format 0 `name` table.
pub fn name(records: &[NameRecord]) -> BeBuffer {
    let storage_offset = 6 + records.len() * 12;
    let mut storage = Vec::new();
    let mut buf = BeBuffer::new()
        .push(0u16)
        .push(records.len() as u16)
        .push(storage_offset as u16);
    for record in records {
        let encoded = record.encode();
        buf = buf
            .extend([record.platform_id, record.encoding_id, record.language_id])
            .push(record.name_id)
            .extend([encoded.len() as u16, storage.len() as u16]);
        storage.extend(encoded);
    }
    buf.extend_bytes(&storage)
}

/// Write `loca` from glyph lengths.
///
/// Short offsets require every glyph length to be even.
pub fn loca(glyph_lengths: &[usize], long: bool) -> BeBuffer {
    let offsets = std::iter::once(0)
        .chain(glyph_lengths.iter().scan(0usize, |total, len| {
            *total += len;
            Some(*total)
        }))
        .collect::<Vec<_>>();
    if long {
        BeBuffer::new().extend(offsets.iter().map(|off| *off as u32))
    } else {
        BeBuffer::new().extend(offsets.iter().map(|off| (*off / 2) as u16))
    }
}
