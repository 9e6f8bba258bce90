//! Reading the TrueType tables that describe glyph outlines
//!
//! This crate provides memory safe, zero-allocation parsing of the tables a
//! glyph outline consumer needs: the table directory, `head`, `hhea`, `hmtx`,
//! `maxp`, `name`, `cmap`, `loca` and `glyf`. It is unopinionated, and
//! attempts to provide raw access to the underlying font data as it is
//! described in the [OpenType specification][spec].
//!
//! Fixed-size structures are read as `repr(C)` records of
//! [`BigEndian`](types::BigEndian) fields, cast directly from the font bytes
//! with [`bytemuck`].
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use read_outlines::{FontRef, TableProvider};
//! let font_bytes = std::fs::read(path_to_my_font_file).unwrap();
//! let font = FontRef::new(&font_bytes).expect("failed to read font data");
//! let head = font.head().expect("missing 'head' table");
//! let maxp = font.maxp().expect("missing 'maxp' table");
//!
//! println!("font version {} containing {} glyphs", head.font_revision(), maxp.num_glyphs());
//! ```
//!
//! [spec]: https://learn.microsoft.com/en-us/typography/opentype/spec/

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod font_data;
mod read;
mod table_provider;
pub mod tables;

pub use font_data::FontData;
pub use read::{FontRead, FontReadWithArgs, ReadArgs, ReadError};
pub use table_provider::{TableProvider, TopLevelTable};

/// Public re-export of the outline-types crate.
pub extern crate outline_types as types;

use bytemuck_derive::AnyBitPattern;
use types::{BigEndian, Tag, TRUE_SFNT_VERSION, TT_SFNT_VERSION};

const TABLE_RECORD_LEN: usize = 16;

/// Values for the binary search fields of the table directory.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchRange {
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl SearchRange {
    /// Compute the search fields for `n_items` records of `item_size` bytes.
    pub fn compute(n_items: usize, item_size: usize) -> Self {
        let entry_selector = if n_items == 0 {
            0
        } else {
            n_items.ilog2() as usize
        };
        let search_range = if n_items == 0 {
            0
        } else {
            (1usize << entry_selector) * item_size
        };
        let range_shift = (n_items * item_size).saturating_sub(search_range);
        SearchRange {
            search_range: search_range as u16,
            entry_selector: entry_selector as u16,
            range_shift: range_shift as u16,
        }
    }
}

#[derive(Clone, Copy, Debug, AnyBitPattern)]
#[repr(C)]
struct TableDirectoryHeader {
    sfnt_version: BigEndian<u32>,
    num_tables: BigEndian<u16>,
    search_range: BigEndian<u16>,
    entry_selector: BigEndian<u16>,
    range_shift: BigEndian<u16>,
}

/// A record in the table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnyBitPattern)]
#[repr(C)]
pub struct TableRecord {
    /// Table identifier.
    pub tag: BigEndian<Tag>,
    /// Checksum for the table.
    pub checksum: BigEndian<u32>,
    /// Offset from the beginning of the font data.
    pub offset: BigEndian<u32>,
    /// Length of the table.
    pub length: BigEndian<u32>,
}

impl TableRecord {
    pub fn tag(&self) -> Tag {
        self.tag.get()
    }

    pub fn checksum(&self) -> u32 {
        self.checksum.get()
    }

    pub fn offset(&self) -> u32 {
        self.offset.get()
    }

    pub fn length(&self) -> u32 {
        self.length.get()
    }
}

/// The [table directory](https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory)
/// at the start of a font file.
#[derive(Clone, Copy)]
pub struct TableDirectory<'a> {
    header: &'a TableDirectoryHeader,
    table_records: &'a [TableRecord],
}

impl<'a> FontRead<'a> for TableDirectory<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let header: &TableDirectoryHeader = data.read_ref_at(0)?;
        let num_tables = header.num_tables.get() as usize;
        let start = std::mem::size_of::<TableDirectoryHeader>();
        let table_records = data.read_array(start..start + num_tables * TABLE_RECORD_LEN)?;
        Ok(TableDirectory {
            header,
            table_records,
        })
    }
}

impl<'a> TableDirectory<'a> {
    /// 0x00010000 or 0x4F54544F
    pub fn sfnt_version(&self) -> u32 {
        self.header.sfnt_version.get()
    }

    /// Number of tables.
    pub fn num_tables(&self) -> u16 {
        self.header.num_tables.get()
    }

    pub fn search_range(&self) -> u16 {
        self.header.search_range.get()
    }

    pub fn entry_selector(&self) -> u16 {
        self.header.entry_selector.get()
    }

    pub fn range_shift(&self) -> u16 {
        self.header.range_shift.get()
    }

    /// Table records array, one for each top-level table in the font.
    pub fn table_records(&self) -> &'a [TableRecord] {
        self.table_records
    }

    fn is_sorted(&self) -> bool {
        self.table_records
            .windows(2)
            .all(|pair| pair[0].tag() < pair[1].tag())
    }
}

impl std::fmt::Debug for TableDirectory<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableDirectory")
            .field("sfnt_version", &format_args!("0x{:08X}", self.sfnt_version()))
            .field("tables", &self.table_records.iter().map(|rec| rec.tag()).collect::<Vec<_>>())
            .finish()
    }
}

/// Reference to an in-memory font.
///
/// This is a simple implementation of the [`TableProvider`] trait backed
/// by a borrowed slice containing font data.
#[derive(Clone)]
pub struct FontRef<'a> {
    data: FontData<'a>,
    pub table_directory: TableDirectory<'a>,
    // Whether the table directory is sorted and thus we can use binary search for
    // finding table records. In principle, fonts are required to have a sorted
    // table directory, but certain fonts don't seem to follow that requirement.
    table_directory_sorted: bool,
}

impl<'a> FontRef<'a> {
    /// Creates a new reference to an in-memory font backed by the given data.
    ///
    /// The data must be a single font with TrueType outlines, and every table
    /// record must lie within it.
    pub fn new(data: &'a [u8]) -> Result<Self, ReadError> {
        let data = FontData::new(data);
        let table_directory = TableDirectory::read(data)?;
        let sfnt_version = table_directory.sfnt_version();
        if ![TT_SFNT_VERSION, TRUE_SFNT_VERSION].contains(&sfnt_version) {
            return Err(ReadError::InvalidSfnt(sfnt_version));
        }
        let expected = SearchRange::compute(table_directory.num_tables() as usize, TABLE_RECORD_LEN);
        let stored = SearchRange {
            search_range: table_directory.search_range(),
            entry_selector: table_directory.entry_selector(),
            range_shift: table_directory.range_shift(),
        };
        if expected != stored {
            log::debug!("table directory search fields are {stored:?}, expected {expected:?}");
        }
        for record in table_directory.table_records() {
            let end = record.offset() as usize + record.length() as usize;
            if end > data.len() {
                return Err(ReadError::TableOutOfBounds(record.tag()));
            }
        }
        let table_directory_sorted = table_directory.is_sorted();
        if !table_directory_sorted {
            log::debug!("table directory is not sorted by tag");
        }
        Ok(FontRef {
            data,
            table_directory,
            table_directory_sorted,
        })
    }

    /// Returns the underlying font data.
    pub fn data(&self) -> FontData<'a> {
        self.data
    }

    /// Returns the associated table directory.
    pub fn table_directory(&self) -> &TableDirectory<'a> {
        &self.table_directory
    }

    /// Returns the data for the table with the specified tag, if present.
    pub fn table_data(&self, tag: Tag) -> Option<FontData<'a>> {
        self.table_record(tag).and_then(|record| {
            let start = record.offset() as usize;
            let len = record.length() as usize;
            self.data.slice(start..start.checked_add(len)?)
        })
    }

    fn table_record(&self, tag: Tag) -> Option<&'a TableRecord> {
        let records = self.table_directory.table_records();
        if self.table_directory_sorted {
            records
                .binary_search_by(|rec| rec.tag().cmp(&tag))
                .ok()
                .and_then(|idx| records.get(idx))
        } else {
            records.iter().find(|rec| rec.tag() == tag)
        }
    }

    /// Returns the tags of tables whose stored checksum does not match
    /// their contents.
    ///
    /// The `head` table is summed with its `checksumAdjustment` field set to
    /// zero. This is purely diagnostic; fonts with stale checksums are read
    /// normally.
    pub fn checksum_mismatches(&self) -> Vec<Tag> {
        let head_tag = <tables::head::Head as TopLevelTable>::TAG;
        self.table_directory
            .table_records()
            .iter()
            .filter(|record| {
                let Some(data) = self.table_data(record.tag()) else {
                    return true;
                };
                let mut checksum = tables::compute_checksum(data.as_bytes());
                if record.tag() == head_tag {
                    let adjustment = data
                        .read_at::<u32>(tables::head::CHECKSUM_ADJUSTMENT_OFFSET)
                        .unwrap_or_default();
                    checksum = checksum.wrapping_sub(adjustment);
                }
                checksum != record.checksum()
            })
            .map(|record| record.tag())
            .collect()
    }
}

impl<'a> TableProvider<'a> for FontRef<'a> {
    fn data_for_tag(&self, tag: Tag) -> Option<FontData<'a>> {
        self.table_data(tag)
    }
}

impl std::fmt::Debug for FontRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRef")
            .field("len", &self.data.len())
            .field("table_directory", &self.table_directory)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outline_test_data::bebuffer::BeBuffer;
    use outline_test_data::font::FontBuilder;

    fn tiny_font() -> Vec<u8> {
        let mut builder = FontBuilder::new();
        builder
            .add_raw(Tag::new(b"zzzz"), vec![1, 2, 3, 4, 5])
            .add_raw(Tag::new(b"aaaa"), vec![0, 0, 0, 9]);
        builder.build()
    }

    #[test]
    fn search_range() {
        // Based on Roboto's num tables
        assert_eq!(
            SearchRange::compute(0x16, TABLE_RECORD_LEN),
            SearchRange {
                search_range: 256,
                entry_selector: 4,
                range_shift: 96
            }
        );
        assert_eq!(SearchRange::compute(1, 16).search_range, 16);
        assert_eq!(SearchRange::compute(0, 16), SearchRange::default());
    }

    #[test]
    fn reads_directory() {
        let bytes = tiny_font();
        let font = FontRef::new(&bytes).unwrap();
        assert_eq!(font.table_directory.num_tables(), 2);
        assert_eq!(font.table_data(Tag::new(b"zzzz")).unwrap().as_bytes(), &[1, 2, 3, 4, 5]);
        assert_eq!(font.table_data(Tag::new(b"aaaa")).unwrap().len(), 4);
        assert!(font.table_data(Tag::new(b"head")).is_none());
        assert!(font.checksum_mismatches().is_empty());
    }

    #[test]
    fn unsorted_directory() {
        let mut bytes = tiny_font();
        // swap the two 16-byte records
        let (first, second) = bytes[12..44].split_at_mut(16);
        first.swap_with_slice(second);
        let font = FontRef::new(&bytes).unwrap();
        assert!(!font.table_directory_sorted);
        assert_eq!(font.table_data(Tag::new(b"aaaa")).unwrap().len(), 4);
        assert_eq!(font.table_data(Tag::new(b"zzzz")).unwrap().len(), 5);
    }

    #[test]
    fn rejects_other_outline_formats() {
        for version in [u32::from_be_bytes(*b"OTTO"), u32::from_be_bytes(*b"typ1")] {
            let buf = BeBuffer::new().push(version).extend([0u16, 0, 0, 0]);
            assert_eq!(FontRef::new(&buf).err(), Some(ReadError::InvalidSfnt(version)));
        }
    }

    #[test]
    fn table_past_end_of_file() {
        let buf = BeBuffer::new()
            .push(TT_SFNT_VERSION)
            .extend([1u16, 16, 0, 0])
            .push(Tag::new(b"glyf"))
            .extend([0u32, 28, 100]);
        assert_eq!(
            FontRef::new(&buf).err(),
            Some(ReadError::TableOutOfBounds(Tag::new(b"glyf")))
        );
    }

    #[test]
    fn truncated_directory() {
        let buf = BeBuffer::new().push(TT_SFNT_VERSION).extend([3u16, 32, 1, 16]);
        assert_eq!(FontRef::new(&buf).err(), Some(ReadError::OutOfBounds));
    }

    #[test]
    fn stale_checksum_is_reported() {
        let mut bytes = tiny_font();
        let offset = FontRef::new(&bytes)
            .unwrap()
            .table_data(Tag::new(b"zzzz"))
            .unwrap()
            .total_pos() as usize;
        bytes[offset] ^= 0xFF;
        let font = FontRef::new(&bytes).unwrap();
        assert_eq!(font.checksum_mismatches(), vec![Tag::new(b"zzzz")]);
    }
}
