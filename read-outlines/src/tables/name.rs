//! The [name (Naming)](https://docs.microsoft.com/en-us/typography/opentype/spec/name) table

use bytemuck_derive::AnyBitPattern;
use types::{BigEndian, NameId, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// US English, the language we prefer when a name exists in several.
const WINDOWS_ENGLISH_US: u16 = 0x0409;

/// A record locating one string in the table's storage area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnyBitPattern)]
#[repr(C)]
pub struct NameRecord {
    pub platform_id: BigEndian<u16>,
    pub encoding_id: BigEndian<u16>,
    pub language_id: BigEndian<u16>,
    pub name_id: BigEndian<NameId>,
    pub length: BigEndian<u16>,
    pub string_offset: BigEndian<u16>,
}

/// Part of the version 1 name table, locating a language tag string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnyBitPattern)]
#[repr(C)]
pub struct LangTagRecord {
    pub length: BigEndian<u16>,
    pub lang_tag_offset: BigEndian<u16>,
}

/// The [name](https://docs.microsoft.com/en-us/typography/opentype/spec/name) table.
#[derive(Clone, Copy)]
pub struct Name<'a> {
    data: FontData<'a>,
    format: u16,
    storage_offset: u16,
    name_records: &'a [NameRecord],
    lang_tag_records: &'a [LangTagRecord],
}

impl TopLevelTable for Name<'_> {
    const TAG: Tag = Tag::new(b"name");
}

impl<'a> FontRead<'a> for Name<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format > 1 {
            return Err(ReadError::InvalidFormat(format as i64));
        }
        let count: u16 = cursor.read()?;
        let storage_offset: u16 = cursor.read()?;
        let name_records = cursor.read_array(count as usize)?;
        let lang_tag_records = if format == 1 {
            let lang_tag_count: u16 = cursor.read()?;
            cursor.read_array(lang_tag_count as usize)?
        } else {
            &[]
        };
        Ok(Name {
            data,
            format,
            storage_offset,
            name_records,
            lang_tag_records,
        })
    }
}

impl<'a> Name<'a> {
    /// Table version number (0 or 1).
    pub fn format(&self) -> u16 {
        self.format
    }

    /// Number of name records.
    pub fn count(&self) -> u16 {
        self.name_records.len() as u16
    }

    /// Offset to start of string storage (from start of table).
    pub fn storage_offset(&self) -> u16 {
        self.storage_offset
    }

    /// The name records, which should be sorted by platform, encoding,
    /// language and name id.
    pub fn name_records(&self) -> &'a [NameRecord] {
        self.name_records
    }

    /// Language tag records; empty for version 0 tables.
    pub fn lang_tag_records(&self) -> &'a [LangTagRecord] {
        self.lang_tag_records
    }

    /// The FontData containing the encoded name strings.
    pub fn string_data(&self) -> FontData<'a> {
        self.data
            .split_off(self.storage_offset as usize)
            .unwrap_or_default()
    }

    /// Returns the best decodable string for the given name id.
    ///
    /// Windows Unicode records in US English are preferred, then any other
    /// Unicode record, then Mac Roman.
    pub fn find(&self, name_id: NameId) -> Option<String> {
        self.name_records
            .iter()
            .filter(|record| record.name_id() == name_id)
            .filter_map(|record| {
                let rank = match Encoding::new(record.platform_id(), record.encoding_id()) {
                    Encoding::Unknown => return None,
                    Encoding::MacRoman => 3,
                    Encoding::Utf16Be
                        if record.platform_id() == 3
                            && record.language_id() == WINDOWS_ENGLISH_US =>
                    {
                        0
                    }
                    Encoding::Utf16Be if record.platform_id() == 3 => 1,
                    Encoding::Utf16Be => 2,
                };
                let string = record.string(self.string_data()).ok()?;
                Some((rank, string))
            })
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, string)| string.to_string())
    }
}

impl std::fmt::Debug for Name<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Name")
            .field("format", &self.format)
            .field("count", &self.count())
            .finish()
    }
}

impl NameRecord {
    pub fn platform_id(&self) -> u16 {
        self.platform_id.get()
    }

    pub fn encoding_id(&self) -> u16 {
        self.encoding_id.get()
    }

    pub fn language_id(&self) -> u16 {
        self.language_id.get()
    }

    pub fn name_id(&self) -> NameId {
        self.name_id.get()
    }

    /// Return a type that can decode the string data for this name entry.
    pub fn string<'a>(&self, data: FontData<'a>) -> Result<NameString<'a>, ReadError> {
        let start = self.string_offset.get() as usize;
        let end = start + self.length.get() as usize;

        let data = data
            .as_bytes()
            .get(start..end)
            .ok_or(ReadError::OutOfBounds)?;

        let encoding = Encoding::new(self.platform_id(), self.encoding_id());
        Ok(NameString { data, encoding })
    }

    pub fn is_unicode(&self) -> bool {
        self.platform_id() == 0
            || (self.platform_id() == 3 && [0, 1, 10].contains(&self.encoding_id()))
    }
}

impl LangTagRecord {
    /// Return a type that can decode the language tag; always UTF-16BE.
    pub fn lang_tag<'a>(&self, data: FontData<'a>) -> Result<NameString<'a>, ReadError> {
        let start = self.lang_tag_offset.get() as usize;
        let end = start + self.length.get() as usize;

        let data = data
            .as_bytes()
            .get(start..end)
            .ok_or(ReadError::OutOfBounds)?;

        Ok(NameString {
            data,
            encoding: Encoding::Utf16Be,
        })
    }
}

/// Entry for a name in the naming table.
///
/// This provides an iterator over characters.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct NameString<'a> {
    data: &'a [u8],
    encoding: Encoding,
}

impl<'a> NameString<'a> {
    /// An iterator over the `char`s in this name.
    pub fn chars(&self) -> CharIter<'a> {
        CharIter {
            data: self.data,
            encoding: self.encoding,
            pos: 0,
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl<'a> IntoIterator for NameString<'a> {
    type Item = char;
    type IntoIter = CharIter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.chars()
    }
}

impl std::fmt::Display for NameString<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for c in self.chars() {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for NameString<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// An iterator over the chars of a name record.
#[derive(Clone)]
pub struct CharIter<'a> {
    data: &'a [u8],
    encoding: Encoding,
    pos: usize,
}

impl CharIter<'_> {
    fn bump_u16(&mut self) -> Option<u16> {
        let bytes = self.data.get(self.pos..self.pos + 2)?;
        self.pos += 2;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn bump_u8(&mut self) -> Option<u8> {
        let result = self.data.get(self.pos)?;
        self.pos += 1;
        Some(*result)
    }
}

impl Iterator for CharIter<'_> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }
        let rep = char::REPLACEMENT_CHARACTER;
        let raw_c = match self.encoding {
            Encoding::Utf16Be => {
                let Some(c1) = self.bump_u16() else {
                    // odd trailing byte
                    self.pos = self.data.len();
                    return Some(rep);
                };
                let c1 = c1 as u32;
                if (0xD800..0xDC00).contains(&c1) {
                    let Some(c2) = self.bump_u16() else {
                        return Some(rep);
                    };
                    ((c1 & 0x3FF) << 10) + (c2 as u32 & 0x3FF) + 0x10000
                } else {
                    c1
                }
            }
            Encoding::MacRoman => {
                let c = self.bump_u8()?;
                MacRomanMapping.decode(c) as u32
            }
            Encoding::Unknown => return None,
        };
        Some(char::from_u32(raw_c).unwrap_or(rep))
    }
}

/// The encoding used by the name table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Encoding {
    Utf16Be,
    MacRoman,
    Unknown,
}

impl Encoding {
    /// Determine the coding from the platform and encoding id.
    pub fn new(platform_id: u16, encoding_id: u16) -> Encoding {
        match (platform_id, encoding_id) {
            (0, _) => Encoding::Utf16Be,
            (1, 0) => Encoding::MacRoman,
            (3, 0) => Encoding::Utf16Be,
            (3, 1) => Encoding::Utf16Be,
            (3, 10) => Encoding::Utf16Be,
            _ => Encoding::Unknown,
        }
    }
}

/// A helper for decoding Mac OS Roman encoded strings.
pub struct MacRomanMapping;

impl MacRomanMapping {
    const START_REMAP: u8 = 128;

    /// Convert from a mac-roman encoded byte to a `char`
    pub fn decode(self, raw: u8) -> char {
        if raw < Self::START_REMAP {
            raw as char
        } else {
            let idx = raw - Self::START_REMAP;
            char::from_u32(MAC_ROMAN_DECODE[idx as usize] as u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
        }
    }
}

/// a lookup table for the Mac Roman encoding. this matches the values 128..=255
/// to specific unicode values.
#[rustfmt::skip]
static MAC_ROMAN_DECODE: [u16; 128] = [
    196, 197, 199, 201, 209, 214, 220, 225, 224, 226, 228, 227, 229, 231, 233,
    232, 234, 235, 237, 236, 238, 239, 241, 243, 242, 244, 246, 245, 250, 249,
    251, 252, 8224, 176, 162, 163, 167, 8226, 182, 223, 174, 169, 8482, 180,
    168, 8800, 198, 216, 8734, 177, 8804, 8805, 165, 181, 8706, 8721, 8719,
    960, 8747, 170, 186, 937, 230, 248, 191, 161, 172, 8730, 402, 8776, 8710,
    171, 187, 8230, 160, 192, 195, 213, 338, 339, 8211, 8212, 8220, 8221, 8216,
    8217, 247, 9674, 255, 376, 8260, 8364, 8249, 8250, 64257, 64258, 8225, 183,
    8218, 8222, 8240, 194, 202, 193, 203, 200, 205, 206, 207, 204, 211, 212,
    63743, 210, 218, 219, 217, 305, 710, 732, 175, 728, 729, 730, 184, 733,
    731, 711,
];

#[cfg(test)]
mod tests {
    use super::*;
    use outline_test_data::bebuffer::BeBuffer;

    // a name table with a Mac Roman family name and a Windows full name
    fn sample_name_table() -> BeBuffer {
        let mac_family = b"Caf\x8E";
        let win_full: Vec<u16> = "Test \u{1F600}".encode_utf16().collect();
        let win_full_len = (win_full.len() * 2) as u16;
        BeBuffer::new()
            .extend([0u16, 3, 6 + 3 * 12])
            // platform, encoding, language, name id, length, offset
            .extend([1u16, 0, 0, 1, mac_family.len() as u16, 0])
            .extend([3u16, 1, 0x409, 4, win_full_len, 4])
            .extend([3u16, 1, 0x40C, 4, 2, 4])
            .extend(mac_family.iter().copied())
            .extend(win_full)
    }

    #[test]
    fn decode_strings() {
        let buf = sample_name_table();
        let name = Name::read(FontData::new(&buf)).unwrap();
        assert_eq!(name.format(), 0);
        assert_eq!(name.count(), 3);
        let records = name.name_records();
        let family = records[0].string(name.string_data()).unwrap();
        assert_eq!(family.encoding(), Encoding::MacRoman);
        assert_eq!(family.to_string(), "Café");
        assert!(!records[0].is_unicode());
        assert!(records[1].is_unicode());
    }

    #[test]
    fn find_prefers_english_windows() {
        let buf = sample_name_table();
        let name = Name::read(FontData::new(&buf)).unwrap();
        assert_eq!(name.find(NameId::FULL_NAME).as_deref(), Some("Test \u{1F600}"));
        assert_eq!(name.find(NameId::FAMILY_NAME).as_deref(), Some("Café"));
        assert_eq!(name.find(NameId::POSTSCRIPT_NAME), None);
    }

    #[test]
    fn unpaired_surrogate() {
        let data = [0xD8, 0x3D];
        let string = NameString {
            data: &data,
            encoding: Encoding::Utf16Be,
        };
        assert_eq!(string.to_string(), "\u{FFFD}");
    }

    #[test]
    fn bad_format() {
        let buf = BeBuffer::new().extend([2u16, 0, 6]);
        assert!(matches!(
            Name::read(FontData::new(&buf)),
            Err(ReadError::InvalidFormat(2))
        ));
    }
}
