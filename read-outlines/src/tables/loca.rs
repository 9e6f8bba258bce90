//! The [loca (Index to Location)][loca] table
//!
//! [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use types::{BigEndian, GlyphId, Tag};

use super::glyf::{Glyf, Glyph};
use crate::{FontData, FontRead, FontReadWithArgs, ReadArgs, ReadError, TopLevelTable};

/// The [loca] table.
///
/// [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca
#[derive(Clone, Debug)]
pub enum Loca<'a> {
    Short(&'a [BigEndian<u16>]),
    Long(&'a [BigEndian<u32>]),
}

impl TopLevelTable for Loca<'_> {
    const TAG: Tag = Tag::new(b"loca");
}

impl<'a> Loca<'a> {
    pub fn read(data: FontData<'a>, is_long: bool) -> Result<Self, ReadError> {
        Self::read_with_args(data, &is_long)
    }

    /// The number of glyphs with an entry; one less than the number of offsets.
    pub fn len(&self) -> usize {
        match self {
            Loca::Short(data) => data.len().saturating_sub(1),
            Loca::Long(data) => data.len().saturating_sub(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempt to return the byte offset for a given glyph id.
    ///
    /// Short offsets are stored divided by two.
    pub fn get_raw(&self, idx: usize) -> Option<u32> {
        match self {
            Loca::Short(data) => data.get(idx).map(|x| x.get() as u32 * 2),
            Loca::Long(data) => data.get(idx).map(|x| x.get()),
        }
    }

    /// Returns the glyph for `gid`, or `None` if it has no outline.
    pub fn get_glyf(&self, gid: GlyphId, glyf: &Glyf<'a>) -> Result<Option<Glyph<'a>>, ReadError> {
        let idx = gid.to_u32() as usize;
        let start = self.get_raw(idx).ok_or(ReadError::OutOfBounds)?;
        let end = self.get_raw(idx + 1).ok_or(ReadError::OutOfBounds)?;
        if start == end {
            return Ok(None);
        }
        if start > end {
            return Err(ReadError::MalformedData("loca offsets are not ascending"));
        }
        let data = glyf
            .offset_data()
            .slice(start as usize..end as usize)
            .ok_or(ReadError::OutOfBounds)?;
        Glyph::read(data).map(Some)
    }
}

impl ReadArgs for Loca<'_> {
    type Args = bool;
}

impl<'a> FontReadWithArgs<'a> for Loca<'a> {
    fn read_with_args(data: FontData<'a>, args: &Self::Args) -> Result<Self, ReadError> {
        let is_long = *args;
        if is_long {
            data.read_array(0..data.len()).map(Loca::Long)
        } else {
            data.read_array(0..data.len()).map(Loca::Short)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outline_test_data::bebuffer::BeBuffer;
    use outline_test_data::glyph::GlyphBuilder;

    #[test]
    fn short_offsets_are_doubled() {
        let buf = BeBuffer::new().extend([0u16, 10, 10, 24]);
        let loca = Loca::read(FontData::new(&buf), false).unwrap();
        assert_eq!(loca.len(), 3);
        assert_eq!(loca.get_raw(1), Some(20));
        assert_eq!(loca.get_raw(3), Some(48));
        assert_eq!(loca.get_raw(4), None);
    }

    #[test]
    fn odd_length_long_table() {
        let buf = BeBuffer::new().extend([0u16, 10, 10]);
        assert_eq!(
            Loca::read(FontData::new(&buf), true).err(),
            Some(ReadError::InvalidArrayLen)
        );
    }

    #[test]
    fn glyph_lookup() {
        let glyph = GlyphBuilder::new()
            .contour(&[(0, 0, true), (10, 0, true), (0, 10, true)])
            .build();
        let len = glyph.len() as u32;
        let glyf_bytes = glyph.clone();
        let glyf = Glyf::read(FontData::new(&glyf_bytes)).unwrap();
        // gid 0 is empty, gid 1 is the triangle, gid 2 runs backwards
        let buf = BeBuffer::new().extend([0u32, 0, len, 0]);
        let loca = Loca::read(FontData::new(&buf), true).unwrap();
        assert!(loca.get_glyf(GlyphId::new(0), &glyf).unwrap().is_none());
        let triangle = loca.get_glyf(GlyphId::new(1), &glyf).unwrap().unwrap();
        assert_eq!(triangle.number_of_contours(), 1);
        assert!(matches!(
            loca.get_glyf(GlyphId::new(2), &glyf),
            Err(ReadError::MalformedData(_))
        ));
        assert_eq!(
            loca.get_glyf(GlyphId::new(3), &glyf).err(),
            Some(ReadError::OutOfBounds)
        );
    }
}
