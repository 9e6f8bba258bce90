//! Errors produced while meshing glyphs.

use core::fmt;

use read_outlines::{
    types::{GlyphId, Tag},
    ReadError,
};

use crate::decycler::MAX_COMPONENT_DEPTH;

/// Errors that may occur when loading a font or meshing one of its glyphs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// The font data is structurally invalid.
    MalformedFont(ReadError),
    /// A table required for meshing is absent.
    TableNotFound(Tag),
    /// The glyph identifier is not present in the font.
    GlyphNotFound(GlyphId),
    /// A composite glyph references itself or nests too deeply.
    RecursionLimitExceeded(GlyphId),
    /// A point-matched component names a point that does not exist.
    InvalidAnchorPoint(GlyphId, u16),
    /// No geometry could be produced.
    DegenerateGeometry,
}

impl From<ReadError> for MeshError {
    fn from(e: ReadError) -> Self {
        match e {
            ReadError::TableIsMissing(tag) => Self::TableNotFound(tag),
            other => Self::MalformedFont(other),
        }
    }
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MalformedFont(e) => write!(f, "malformed font: {e}"),
            Self::TableNotFound(tag) => write!(f, "the required {tag} table is missing"),
            Self::GlyphNotFound(gid) => write!(f, "Glyph {gid} was not found in the given font"),
            Self::RecursionLimitExceeded(gid) => write!(
                f,
                "Recursion limit ({MAX_COMPONENT_DEPTH}) exceeded or cycle detected when loading composite component {gid}",
            ),
            Self::InvalidAnchorPoint(gid, index) => write!(
                f,
                "Invalid anchor point index ({index}) for composite glyph {gid}",
            ),
            Self::DegenerateGeometry => write!(f, "no triangulation could be found"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MeshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedFont(e) => Some(e),
            _ => None,
        }
    }
}
