//!  A builder for top-level font objects

use std::collections::BTreeMap;

use outline_types::{Tag, TT_SFNT_VERSION};

use crate::bebuffer::BeBuffer;

const TABLE_RECORD_LEN: usize = 16;
const HEAD_TAG: Tag = Tag::new(b"head");
const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

/// Build a font from some set of raw tables.
///
/// Tables are written in tag order with the directory sorted, as the
/// OpenType spec requires.
#[derive(Debug, Clone, Default)]
pub struct FontBuilder {
    tables: BTreeMap<Tag, Vec<u8>>,
    sfnt_version: Option<u32>,
}

impl FontBuilder {
    /// Create a new builder to compile a binary font
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder method to add raw data for the provided tag
    pub fn add_raw(&mut self, tag: Tag, data: impl Into<Vec<u8>>) -> &mut Self {
        self.tables.insert(tag, data.into());
        self
    }

    /// Remove the table with this tag, returning its data.
    pub fn remove(&mut self, tag: Tag) -> Option<Vec<u8>> {
        self.tables.remove(&tag)
    }

    /// Override the sfnt version written to the header.
    pub fn sfnt_version(&mut self, version: u32) -> &mut Self {
        self.sfnt_version = Some(version);
        self
    }

    /// Returns `true` if the builder contains a table with this tag.
    pub fn contains(&self, tag: Tag) -> bool {
        self.tables.contains_key(&tag)
    }

    /// Assemble all the tables into a binary font file with a [Table Directory].
    ///
    /// If a `head` table is present its `checksumAdjustment` is filled in.
    ///
    /// [Table Directory]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory
    pub fn build(&self) -> Vec<u8> {
        let num_tables = self.tables.len();
        let header_len = std::mem::size_of::<u32>() // sfnt
            + std::mem::size_of::<u16>() * 4 // num_tables to range_shift
            + num_tables * TABLE_RECORD_LEN;

        let entry_selector = if num_tables == 0 {
            0
        } else {
            num_tables.ilog2() as u16
        };
        let search_range = if num_tables == 0 {
            0
        } else {
            (1u16 << entry_selector) * TABLE_RECORD_LEN as u16
        };
        let range_shift = (num_tables * TABLE_RECORD_LEN) as u16 - search_range;

        let mut directory = BeBuffer::new()
            .push(self.sfnt_version.unwrap_or(TT_SFNT_VERSION))
            .extend([num_tables as u16, search_range, entry_selector, range_shift]);

        let mut position = header_len;
        let mut head_offset = None;
        for (tag, data) in &self.tables {
            if *tag == HEAD_TAG {
                head_offset = Some(position);
            }
            directory = directory
                .push(*tag)
                .extend([checksum(data), position as u32, data.len() as u32]);
            position += round4(data.len());
        }

        let mut font = directory.into_vec();
        for table in self.tables.values() {
            font.extend_from_slice(table);
            font.resize(round4(font.len()), 0);
        }

        if let Some(offset) = head_offset {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&font));
            font[offset + 8..offset + 12].copy_from_slice(&adjustment.to_be_bytes());
        }
        font
    }
}

/// <https://github.com/google/woff2/blob/a0d0ed7da27b708c0a4e96ad7a998bddc933c06e/src/round.h#L19>
fn round4(sz: usize) -> usize {
    (sz + 3) & !3
}

/// The wrapping sum of big-endian words, zero padded.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}
