//! Mapping of characters (codepoints, not graphemes) to nominal glyph identifiers.
//!
//! This is a 1-to-1 mapping from Unicode characters to the "default" glyph
//! for each character. It is enough to lay out simple left-to-right text,
//! which is all the mesh compiler does, but not enough for scripts that
//! require shaping.

use read_outlines::{
    tables::cmap::{
        Cmap, Cmap12, Cmap12Iter, Cmap4, Cmap4Iter, CmapSubtable, EncodingRecord, PlatformId,
    },
    types::GlyphId,
    TableProvider,
};

/// Mapping of characters to nominal glyph identifiers.
///
/// The mappings are derived from the [cmap](https://learn.microsoft.com/en-us/typography/opentype/spec/cmap)
/// table.
///
/// ## Selection strategy
///
/// Fonts may contain several subtables in different formats and encodings.
/// Formats 4 and 12 are supported, and a subtable is chosen by the kind of
/// mapping it provides, from least to most preferred: a Windows symbol
/// subtable, a Unicode BMP subtable, a Unicode full repertoire subtable.
/// When several subtables provide the same kind of mapping the first one in
/// the font wins.
///
/// A font without a usable `cmap` produces an empty character map that maps
/// nothing.
#[derive(Clone, Default)]
pub struct Charmap<'a> {
    codepoint_subtable: Option<CodepointSubtable<'a>>,
}

impl<'a> Charmap<'a> {
    /// Creates a new character map from the given font.
    pub fn new(font: &impl TableProvider<'a>) -> Self {
        let Ok(cmap) = font.cmap() else {
            return Default::default();
        };
        let selection = MappingSelection::new(&cmap);
        Self {
            codepoint_subtable: selection.subtable.map(|subtable| CodepointSubtable {
                subtable,
                kind: selection.kind,
            }),
        }
    }

    /// Returns true if a suitable character mapping is available.
    pub fn has_map(&self) -> bool {
        self.codepoint_subtable.is_some()
    }

    /// Returns true if the selected mapping is a symbol mapping.
    pub fn is_symbol(&self) -> bool {
        self.mapping_kind() == MappingKind::Symbol
    }

    /// Returns the kind of the selected mapping.
    pub fn mapping_kind(&self) -> MappingKind {
        self.codepoint_subtable
            .as_ref()
            .map(|subtable| subtable.kind)
            .unwrap_or_default()
    }

    /// Maps a character to a nominal glyph identifier.
    ///
    /// Returns `None` if the character is unmapped or mapped to `.notdef`.
    pub fn map(&self, ch: impl Into<u32>) -> Option<GlyphId> {
        self.codepoint_subtable
            .as_ref()?
            .map(ch.into())
            .filter(|gid| *gid != GlyphId::NOTDEF)
    }

    /// Returns an iterator over all mappings of codepoint to nominal glyph
    /// identifiers in the character map.
    pub fn mappings(&self) -> Mappings<'a> {
        self.codepoint_subtable
            .as_ref()
            .map(|subtable| {
                Mappings(match &subtable.subtable {
                    SupportedSubtable::Format4(cmap4) => MappingsInner::Format4(cmap4.iter()),
                    SupportedSubtable::Format12(cmap12) => MappingsInner::Format12(cmap12.iter()),
                })
            })
            .unwrap_or(Mappings(MappingsInner::None))
    }
}

impl std::fmt::Debug for Charmap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Charmap")
            .field("kind", &self.mapping_kind())
            .finish()
    }
}

/// Iterator over all mappings of character to nominal glyph identifier
/// in a character map.
///
/// This is created with the [`Charmap::mappings`] method.
#[derive(Clone)]
pub struct Mappings<'a>(MappingsInner<'a>);

impl Iterator for Mappings<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.0 {
            MappingsInner::None => None,
            MappingsInner::Format4(iter) => iter.next(),
            MappingsInner::Format12(iter) => iter.next(),
        }
    }
}

#[derive(Clone)]
enum MappingsInner<'a> {
    None,
    Format4(Cmap4Iter<'a>),
    Format12(Cmap12Iter<'a>),
}

#[derive(Clone)]
struct CodepointSubtable<'a> {
    subtable: SupportedSubtable<'a>,
    kind: MappingKind,
}

impl CodepointSubtable<'_> {
    fn map(&self, codepoint: u32) -> Option<GlyphId> {
        self.map_impl(codepoint).or_else(|| {
            if self.kind == MappingKind::Symbol && codepoint <= 0x00FF {
                // Symbol fonts conventionally place their glyphs at
                // U+F000..F0FF and are addressed through U+0000..U+00FF.
                // See "Non-Standard (Symbol) Fonts" in
                // <https://learn.microsoft.com/en-us/typography/opentype/spec/recom>
                self.map_impl(codepoint + 0xF000)
            } else {
                None
            }
        })
    }

    fn map_impl(&self, codepoint: u32) -> Option<GlyphId> {
        match &self.subtable {
            SupportedSubtable::Format4(subtable) => subtable.map_codepoint(codepoint),
            SupportedSubtable::Format12(subtable) => subtable.map_codepoint(codepoint),
        }
    }
}

#[derive(Clone)]
enum SupportedSubtable<'a> {
    Format4(Cmap4<'a>),
    Format12(Cmap12<'a>),
}

impl<'a> SupportedSubtable<'a> {
    fn new(subtable: CmapSubtable<'a>) -> Option<Self> {
        Some(match subtable {
            CmapSubtable::Format4(cmap4) => Self::Format4(cmap4),
            CmapSubtable::Format12(cmap12) => Self::Format12(cmap12),
        })
    }

    fn from_cmap_record(cmap: &Cmap<'a>, record: &EncodingRecord) -> Option<Self> {
        Self::new(record.subtable(cmap.offset_data()).ok()?)
    }
}

/// The kind of mapping provided by a cmap subtable.
///
/// The ordering is significant and determines the priority of subtable
/// selection (greater is better).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MappingKind {
    /// No usable subtable.
    #[default]
    None = 0,
    /// A Windows symbol subtable.
    Symbol = 1,
    /// A Unicode subtable limited to the Basic Multilingual Plane.
    UnicodeBmp = 2,
    /// A Unicode subtable covering the full repertoire.
    UnicodeFull = 3,
}

/// The result of searching the cmap table for the best available subtable.
struct MappingSelection<'a> {
    kind: MappingKind,
    subtable: Option<SupportedSubtable<'a>>,
}

impl<'a> MappingSelection<'a> {
    fn new(cmap: &Cmap<'a>) -> Self {
        const ENCODING_MS_SYMBOL: u16 = 0;
        const ENCODING_MS_UNICODE_CS: u16 = 1;
        const ENCODING_MS_ID_UCS_4: u16 = 10;
        const ENCODING_APPLE_ID_UNICODE_32: u16 = 4;
        const ENCODING_APPLE_ID_VARIANT_SELECTOR: u16 = 5;
        const ENCODING_APPLE_ID_FULL_COVERAGE: u16 = 6;
        let mut selection = Self {
            kind: MappingKind::None,
            subtable: None,
        };
        for record in cmap.encoding_records() {
            let kind = match (record.platform_id(), record.encoding_id()) {
                (PlatformId::Windows, ENCODING_MS_SYMBOL) => MappingKind::Symbol,
                (PlatformId::Windows, ENCODING_MS_ID_UCS_4)
                | (PlatformId::Unicode, ENCODING_APPLE_ID_UNICODE_32) => MappingKind::UnicodeFull,
                (PlatformId::Unicode, ENCODING_APPLE_ID_VARIANT_SELECTOR)
                | (PlatformId::Unicode, ENCODING_APPLE_ID_FULL_COVERAGE) => continue,
                (PlatformId::Unicode, _) | (PlatformId::Windows, ENCODING_MS_UNICODE_CS) => {
                    MappingKind::UnicodeBmp
                }
                _ => continue,
            };
            // strictly greater, so the first of equally ranked records wins
            if kind <= selection.kind {
                continue;
            }
            if let Some(subtable) = SupportedSubtable::from_cmap_record(cmap, record) {
                selection.kind = kind;
                selection.subtable = Some(subtable);
            }
        }
        selection
    }
}
