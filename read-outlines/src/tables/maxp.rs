//! The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table

use bytemuck_derive::AnyBitPattern;
use types::{BigEndian, Tag, Version16Dot16};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

#[derive(Clone, Copy, Debug, AnyBitPattern)]
#[repr(C)]
struct MaxpHeader {
    version: BigEndian<Version16Dot16>,
    num_glyphs: BigEndian<u16>,
}

/// Fields only present in version 1.0, used by TrueType outlines.
#[derive(Clone, Copy, Debug, AnyBitPattern)]
#[repr(C)]
struct MaxpV1 {
    max_points: BigEndian<u16>,
    max_contours: BigEndian<u16>,
    max_composite_points: BigEndian<u16>,
    max_composite_contours: BigEndian<u16>,
    max_zones: BigEndian<u16>,
    max_twilight_points: BigEndian<u16>,
    max_storage: BigEndian<u16>,
    max_function_defs: BigEndian<u16>,
    max_instruction_defs: BigEndian<u16>,
    max_stack_elements: BigEndian<u16>,
    max_size_of_instructions: BigEndian<u16>,
    max_component_elements: BigEndian<u16>,
    max_component_depth: BigEndian<u16>,
}

/// The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp)
/// (maximum profile) table.
#[derive(Clone, Copy, Debug)]
pub struct Maxp<'a> {
    header: &'a MaxpHeader,
    v1: Option<&'a MaxpV1>,
}

impl TopLevelTable for Maxp<'_> {
    const TAG: Tag = Tag::new(b"maxp");
}

impl<'a> FontRead<'a> for Maxp<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let header: &MaxpHeader = data.read_ref_at(0)?;
        let version = header.version.get();
        let v1 = if version == Version16Dot16::VERSION_0_5 {
            None
        } else if version == Version16Dot16::VERSION_1_0 {
            Some(data.read_ref_at(std::mem::size_of::<MaxpHeader>())?)
        } else {
            return Err(ReadError::InvalidFormat(version.to_major_minor().0 as i64));
        };
        Ok(Maxp { header, v1 })
    }
}

macro_rules! v1_fields {
    ($($(#[$attr:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$attr])*
            pub fn $name(&self) -> Option<u16> {
                self.v1.map(|v1| v1.$name.get())
            }
        )*
    };
}

impl Maxp<'_> {
    /// The table version, either 0.5 or 1.0.
    pub fn version(&self) -> Version16Dot16 {
        self.header.version.get()
    }

    /// The number of glyphs in the font.
    pub fn num_glyphs(&self) -> u16 {
        self.header.num_glyphs.get()
    }

    v1_fields! {
        /// Maximum points in a non-composite glyph.
        max_points,
        /// Maximum contours in a non-composite glyph.
        max_contours,
        /// Maximum points in a composite glyph.
        max_composite_points,
        /// Maximum contours in a composite glyph.
        max_composite_contours,
        max_zones,
        max_twilight_points,
        max_storage,
        max_function_defs,
        max_instruction_defs,
        max_stack_elements,
        max_size_of_instructions,
        /// Maximum number of components referenced at "top level" for any
        /// composite glyph.
        max_component_elements,
        /// Maximum levels of recursion; 1 for simple components.
        max_component_depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outline_test_data::bebuffer::BeBuffer;

    #[test]
    fn version_0_5() {
        let buf = BeBuffer::new().push(Version16Dot16::VERSION_0_5).push(12u16);
        let maxp = Maxp::read(FontData::new(&buf)).unwrap();
        assert_eq!(maxp.num_glyphs(), 12);
        assert_eq!(maxp.max_points(), None);
    }

    #[test]
    fn version_1_0() {
        let buf = BeBuffer::new()
            .push(Version16Dot16::VERSION_1_0)
            .push(3u16)
            .extend([40u16, 4, 80, 6, 2, 0, 0, 0, 0, 0, 0, 3, 1]);
        let maxp = Maxp::read(FontData::new(&buf)).unwrap();
        assert_eq!(maxp.num_glyphs(), 3);
        assert_eq!(maxp.max_points(), Some(40));
        assert_eq!(maxp.max_composite_contours(), Some(6));
        assert_eq!(maxp.max_component_depth(), Some(1));
        // version 1.0 without its fields
        assert!(Maxp::read(FontData::new(&buf[..6])).is_err());
    }

    #[test]
    fn unknown_version() {
        let buf = BeBuffer::new().push(0x0002_0000u32).push(3u16);
        assert!(matches!(
            Maxp::read(FontData::new(&buf)),
            Err(ReadError::InvalidFormat(2))
        ));
    }
}
