//! cmap test data for scenarios not readily produced with ttx

use crate::{be_buffer, bebuffer::BeBuffer};

/// One segment of a format 4 subtable.
#[derive(Clone, Debug)]
pub struct Segment {
    start: u16,
    end: u16,
    delta: i16,
    glyph_ids: Option<Vec<u16>>,
}

impl Segment {
    /// Maps `start..=end` to `codepoint + delta`.
    pub fn delta(start: u16, end: u16, delta: i16) -> Self {
        Segment {
            start,
            end,
            delta,
            glyph_ids: None,
        }
    }

    /// Maps consecutive codepoints from `start` through the glyph id array.
    ///
    /// A zero entry leaves its codepoint unmapped.
    pub fn glyph_ids(start: u16, glyph_ids: &[u16]) -> Self {
        Segment {
            start,
            end: start + glyph_ids.len() as u16 - 1,
            delta: 0,
            glyph_ids: Some(glyph_ids.to_vec()),
        }
    }
}

/// Build a format 4 subtable.
///
/// Segments must be sorted and must not include the terminating `0xFFFF`
/// segment, which is always appended.
pub fn format4(segments: &[Segment]) -> BeBuffer {
    let mut segments = segments.to_vec();
    segments.push(Segment::delta(0xFFFF, 0xFFFF, 1));
    let seg_count = segments.len() as u16;
    let search = search_range_fields(seg_count);

    let mut id_range_offsets = Vec::with_capacity(segments.len());
    let mut glyph_id_array: Vec<u16> = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        match &segment.glyph_ids {
            // offset from this idRangeOffset entry to the segment's first
            // glyph id, in bytes
            Some(ids) => {
                let remaining_entries = segments.len() - i;
                id_range_offsets.push(((remaining_entries + glyph_id_array.len()) * 2) as u16);
                glyph_id_array.extend(ids);
            }
            None => id_range_offsets.push(0),
        }
    }

    let length = 16 + segments.len() * 8 + glyph_id_array.len() * 2;
    be_buffer! {
        4u16,
        (length as u16),
        0u16,
        (seg_count * 2),
        (search.0),
        (search.1),
        (search.2)
    }
    .extend(segments.iter().map(|seg| seg.end))
    .push(0u16)
    .extend(segments.iter().map(|seg| seg.start))
    .extend(segments.iter().map(|seg| seg.delta))
    .extend(id_range_offsets)
    .extend(glyph_id_array)
}

/// Build a format 12 subtable from `(start, end, start_glyph_id)` groups.
pub fn format12(groups: &[(u32, u32, u32)]) -> BeBuffer {
    let length = 16 + groups.len() as u32 * 12;
    let mut buf = be_buffer! {
        12u16,
        0u16,
        length,
        0u32,
        (groups.len() as u32)
    };
    for (start, end, glyph) in groups {
        buf = buf.extend([*start, *end, *glyph]);
    }
    buf
}

/// Build a cmap table from `(platform_id, encoding_id, subtable)` records.
pub fn table(records: &[(u16, u16, &[u8])]) -> BeBuffer {
    let mut buf = be_buffer! { 0u16, (records.len() as u16) };
    let mut offset = 4 + records.len() as u32 * 8;
    for (platform, encoding, subtable) in records {
        buf = buf.extend([*platform, *encoding]).push(offset);
        offset += subtable.len() as u32;
    }
    for (_, _, subtable) in records {
        buf = buf.extend_bytes(subtable);
    }
    buf
}

// (searchRange, entrySelector, rangeShift) for a segment count, in the
// doubled units format 4 uses
fn search_range_fields(seg_count: u16) -> (u16, u16, u16) {
    let entry_selector = if seg_count == 0 { 0 } else { seg_count.ilog2() as u16 };
    let search_range = 2 * (1u16 << entry_selector);
    (search_range, entry_selector, 2 * seg_count - search_range)
}
