//! Common [scalar data types][data types] used in TrueType font files
//!
//! [data types]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#data-types

#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[cfg(all(not(feature = "std"), not(test)))]
#[macro_use]
extern crate core as std;

mod bbox;
mod fixed;
mod glyph_id;
mod longdatetime;
mod name_id;
mod point;
mod raw;
mod tag;
mod version;


pub use bbox::BoundingBox;
pub use fixed::{F2Dot14, Fixed};
pub use glyph_id::GlyphId;
pub use longdatetime::LongDateTime;
pub use name_id::NameId;
pub use point::Point;
pub use raw::{BigEndian, Scalar};
pub use tag::{InvalidTag, Tag};
pub use version::{MajorMinor, Version16Dot16};

/// The SFNT version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: u32 = 0x00010000;

/// The SFNT version used by some legacy Apple fonts with TrueType outlines.
pub const TRUE_SFNT_VERSION: u32 = u32::from_be_bytes(*b"true");

/// The SFNT version for fonts containing CFF outlines.
pub const CFF_SFNT_VERSION: u32 = 0x4F54544F;
