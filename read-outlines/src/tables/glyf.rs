//! The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table

use bytemuck_derive::AnyBitPattern;
use types::{BigEndian, BoundingBox, F2Dot14, GlyphId, Point, Tag};

use crate::font_data::Cursor;
use crate::{FontData, FontRead, ReadError, TopLevelTable};

macro_rules! flags {
    ($(#[$attr:meta])* $name:ident($ty:ty) { $($(#[$fattr:meta])* $flag:ident = $value:expr,)* }) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name($ty);

        impl $name {
            $($(#[$fattr])* pub const $flag: Self = Self($value);)*

            const ALL: $ty = 0 $(| $value)*;

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn bits(self) -> $ty {
                self.0
            }

            /// Unknown bits are discarded.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self(bits & Self::ALL)
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut first = true;
                $(
                    if self.contains(Self::$flag) {
                        if !first {
                            f.write_str(" | ")?;
                        }
                        first = false;
                        f.write_str(stringify!($flag))?;
                    }
                )*
                if first {
                    f.write_str("(empty)")?;
                }
                Ok(())
            }
        }

        impl types::Scalar for $name {
            type Raw = <$ty as types::Scalar>::Raw;

            fn to_raw(self) -> Self::Raw {
                types::Scalar::to_raw(self.0)
            }

            fn from_raw(raw: Self::Raw) -> Self {
                Self::from_bits_truncate(<$ty as types::Scalar>::from_raw(raw))
            }
        }
    };
}

flags! {
    /// Flags used in [`SimpleGlyph`]
    SimpleGlyphFlags(u8) {
        /// Bit 0: If set, the point is on the curve; otherwise, it is off
        /// the curve.
        ON_CURVE_POINT = 0x01,
        /// Bit 1: If set, the corresponding x-coordinate is 1 byte long, and
        /// the sign is determined by X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR.
        X_SHORT_VECTOR = 0x02,
        /// Bit 2: If set, the corresponding y-coordinate is 1 byte long.
        Y_SHORT_VECTOR = 0x04,
        /// Bit 3: If set, the next byte specifies the number of additional
        /// times this flag byte is to be repeated.
        REPEAT_FLAG = 0x08,
        /// Bit 4: For a short x-coordinate this is the sign (set means
        /// positive). Otherwise, if set, the x-coordinate repeats the
        /// previous one and no delta is stored.
        X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 0x10,
        /// Bit 5: The y-coordinate counterpart of bit 4.
        Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 0x20,
        /// Bit 6: Contours may overlap.
        OVERLAP_SIMPLE = 0x40,
    }
}

flags! {
    /// Flags used in [`Component`]
    CompositeGlyphFlags(u16) {
        /// Bit 0: If this is set, the arguments are 16-bit (uint16 or int16);
        /// otherwise, they are bytes (uint8 or int8).
        ARG_1_AND_2_ARE_WORDS = 0x0001,
        /// Bit 1: If this is set, the arguments are signed xy values;
        /// otherwise, they are unsigned point numbers.
        ARGS_ARE_XY_VALUES = 0x0002,
        /// Bit 2: Round the xy values to the grid. Ignored without hinting.
        ROUND_XY_TO_GRID = 0x0004,
        /// Bit 3: There is a simple scale for the component.
        WE_HAVE_A_SCALE = 0x0008,
        /// Bit 5: At least one more glyph follows this one.
        MORE_COMPONENTS = 0x0020,
        /// Bit 6: The x direction will use a different scale from the y
        /// direction.
        WE_HAVE_AN_X_AND_Y_SCALE = 0x0040,
        /// Bit 7: There is a 2 by 2 transformation that will be used to scale
        /// the component.
        WE_HAVE_A_TWO_BY_TWO = 0x0080,
        /// Bit 8: Following the last component are instructions for the
        /// composite character.
        WE_HAVE_INSTRUCTIONS = 0x0100,
        /// Bit 9: Use this component's metrics for the composite glyph.
        USE_MY_METRICS = 0x0200,
        /// Bit 10: The components of the compound glyph overlap.
        OVERLAP_COMPOUND = 0x0400,
        /// Bit 11: The composite's offset is transformed by the component
        /// scale.
        SCALED_COMPONENT_OFFSET = 0x0800,
        /// Bit 12: The composite's offset is not scaled.
        UNSCALED_COMPONENT_OFFSET = 0x1000,
    }
}

/// The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table
#[derive(Clone, Copy, Debug)]
pub struct Glyf<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Glyf<'_> {
    const TAG: Tag = Tag::new(b"glyf");
}

impl<'a> FontRead<'a> for Glyf<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(Glyf { data })
    }
}

impl<'a> Glyf<'a> {
    /// The table data; `loca` offsets are relative to this.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }
}

/// The header shared by simple and composite glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnyBitPattern)]
#[repr(C)]
pub struct GlyphHeader {
    pub number_of_contours: BigEndian<i16>,
    pub x_min: BigEndian<i16>,
    pub y_min: BigEndian<i16>,
    pub x_max: BigEndian<i16>,
    pub y_max: BigEndian<i16>,
}

impl GlyphHeader {
    pub fn bounds(&self) -> BoundingBox<i16> {
        BoundingBox {
            x_min: self.x_min.get(),
            y_min: self.y_min.get(),
            x_max: self.x_max.get(),
            y_max: self.y_max.get(),
        }
    }
}

/// A glyph outline, either a list of contours or a list of components.
#[derive(Clone, Debug)]
pub enum Glyph<'a> {
    Simple(SimpleGlyph<'a>),
    Composite(CompositeGlyph<'a>),
}

macro_rules! field_getter {
    ($field:ident, $ty:ty) => {
        pub fn $field(&self) -> $ty {
            self.header().$field.get()
        }
    };
}

impl<'a> Glyph<'a> {
    pub fn header(&self) -> &'a GlyphHeader {
        match self {
            Self::Simple(glyph) => glyph.header,
            Self::Composite(glyph) => glyph.header,
        }
    }

    field_getter!(number_of_contours, i16);
    field_getter!(x_min, i16);
    field_getter!(x_max, i16);
    field_getter!(y_min, i16);
    field_getter!(y_max, i16);

    /// The bounding box stored in the glyph header.
    pub fn bounds(&self) -> BoundingBox<i16> {
        self.header().bounds()
    }
}

impl<'a> FontRead<'a> for Glyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let header: &GlyphHeader = data.read_ref_at(0)?;
        if header.number_of_contours.get() >= 0 {
            SimpleGlyph::read(data).map(Self::Simple)
        } else {
            CompositeGlyph::read(data).map(Self::Composite)
        }
    }
}

/// The [Glyph Header](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf#glyph-headers)
/// of a glyph made of contours.
#[derive(Clone)]
pub struct SimpleGlyph<'a> {
    header: &'a GlyphHeader,
    end_pts_of_contours: &'a [BigEndian<u16>],
    instructions: &'a [u8],
    glyph_data: &'a [u8],
}

impl<'a> FontRead<'a> for SimpleGlyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let header: &GlyphHeader = data.read_ref_at(0)?;
        let number_of_contours = header.number_of_contours.get();
        if number_of_contours < 0 {
            return Err(ReadError::MalformedData("composite glyph read as simple"));
        }
        cursor.advance_by(std::mem::size_of::<GlyphHeader>());
        let end_pts_of_contours: &[BigEndian<u16>] =
            cursor.read_array(number_of_contours as usize)?;
        let ascending = end_pts_of_contours
            .windows(2)
            .all(|pair| pair[0].get() < pair[1].get());
        if !ascending {
            return Err(ReadError::MalformedData(
                "contour end points are not increasing",
            ));
        }
        let instruction_length: u16 = cursor.read()?;
        let instructions = cursor.read_array(instruction_length as usize)?;
        let glyph_data_start = cursor.position()?;
        let glyph_data = data
            .split_off(glyph_data_start)
            .map(|data| data.as_bytes())
            .unwrap_or_default();
        Ok(SimpleGlyph {
            header,
            end_pts_of_contours,
            instructions,
            glyph_data,
        })
    }
}

impl<'a> SimpleGlyph<'a> {
    pub fn header(&self) -> &'a GlyphHeader {
        self.header
    }

    /// Number of contours; never negative for simple glyphs.
    pub fn number_of_contours(&self) -> i16 {
        self.header.number_of_contours.get()
    }

    pub fn bounds(&self) -> BoundingBox<i16> {
        self.header.bounds()
    }

    /// Array of point indices for the last point of each contour,
    /// in increasing numeric order.
    pub fn end_pts_of_contours(&self) -> &'a [BigEndian<u16>] {
        self.end_pts_of_contours
    }

    /// Hinting instructions, which we never execute.
    pub fn instructions(&self) -> &'a [u8] {
        self.instructions
    }

    /// The flags and coordinates, which must be decoded together.
    pub fn glyph_data(&self) -> &'a [u8] {
        self.glyph_data
    }

    /// Returns the total number of points.
    pub fn num_points(&self) -> usize {
        self.end_pts_of_contours
            .last()
            .map(|last| last.get() as usize + 1)
            .unwrap_or(0)
    }

    /// Reads points and flags into the provided buffers.
    ///
    /// Drops all flag bits except on-curve. The lengths of the buffers must be
    /// equal to the value returned by [num_points](Self::num_points).
    pub fn read_points_fast(
        &self,
        points: &mut [Point<i32>],
        flags: &mut [u8],
    ) -> Result<(), ReadError> {
        let n_points = self.num_points();
        if points.len() != n_points || flags.len() != n_points {
            return Err(ReadError::InvalidArrayLen);
        }
        let mut cursor = FontData::new(self.glyph_data).cursor();
        let mut i = 0;
        while i < n_points {
            let flag = cursor.read::<SimpleGlyphFlags>()?;
            let flag_bits = flag.bits();
            if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
                let count = (cursor.read::<u8>()? as usize + 1).min(n_points - i);
                for f in &mut flags[i..i + count] {
                    *f = flag_bits;
                }
                i += count;
            } else {
                flags[i] = flag_bits;
                i += 1;
            }
        }
        let mut x = 0i32;
        for (&flag_bits, point) in flags.iter().zip(points.iter_mut()) {
            let flag = SimpleGlyphFlags::from_bits_truncate(flag_bits);
            x = x.wrapping_add(read_delta(
                &mut cursor,
                flag,
                SimpleGlyphFlags::X_SHORT_VECTOR,
                SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
            )?);
            point.x = x;
        }
        let mut y = 0i32;
        for (flag_bits, point) in flags.iter_mut().zip(points.iter_mut()) {
            let flag = SimpleGlyphFlags::from_bits_truncate(*flag_bits);
            y = y.wrapping_add(read_delta(
                &mut cursor,
                flag,
                SimpleGlyphFlags::Y_SHORT_VECTOR,
                SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
            )?);
            point.y = y;
            // Only keep the on-curve bit
            *flag_bits &= SimpleGlyphFlags::ON_CURVE_POINT.bits();
        }
        Ok(())
    }

    /// Returns an iterator over the points in the glyph.
    ///
    /// This is slower than [read_points_fast](Self::read_points_fast) but
    /// provides access to the points without requiring a preallocated buffer.
    /// Iteration stops early if the point data is malformed.
    pub fn points(&self) -> impl Iterator<Item = CurvePoint> + 'a + Clone {
        self.points_impl()
            .unwrap_or_else(|| PointIter::new(&[], &[], &[]))
    }

    fn points_impl(&self) -> Option<PointIter<'a>> {
        let n_points = self.end_pts_of_contours.last()?.get().checked_add(1)?;
        let data = self.glyph_data;
        let lens = resolve_coords_len(data, n_points).ok()?;
        let total_len = lens.flags + lens.x_coords + lens.y_coords;
        if data.len() < total_len as usize {
            return None;
        }

        let (flags, data) = data.split_at(lens.flags as usize);
        let (x_coords, y_coords) = data.split_at(lens.x_coords as usize);

        Some(PointIter::new(flags, x_coords, y_coords))
    }
}

impl std::fmt::Debug for SimpleGlyph<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleGlyph")
            .field("number_of_contours", &self.number_of_contours())
            .field("num_points", &self.num_points())
            .field("bounds", &self.bounds())
            .finish()
    }
}

fn read_delta(
    cursor: &mut Cursor,
    flag: SimpleGlyphFlags,
    short: SimpleGlyphFlags,
    same_or_positive: SimpleGlyphFlags,
) -> Result<i32, ReadError> {
    Ok(
        match (flag.contains(short), flag.contains(same_or_positive)) {
            (true, true) => cursor.read::<u8>()? as i32,
            (true, false) => -(cursor.read::<u8>()? as i32),
            (false, false) => cursor.read::<i16>()? as i32,
            (false, true) => 0,
        },
    )
}

/// Point with an associated on-curve flag in a simple glyph.
///
/// This type is a simpler representation of the data in the blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurvePoint {
    /// X coordinate.
    pub x: i16,
    /// Y coordinate.
    pub y: i16,
    /// True if this is an on-curve point.
    pub on_curve: bool,
}

impl CurvePoint {
    /// Construct a new `CurvePoint`
    pub fn new(x: i16, y: i16, on_curve: bool) -> Self {
        Self { x, y, on_curve }
    }

    /// Convenience method to construct an on-curve point
    pub fn on_curve(x: i16, y: i16) -> Self {
        Self::new(x, y, true)
    }

    /// Convenience method to construct an off-curve point
    pub fn off_curve(x: i16, y: i16) -> Self {
        Self::new(x, y, false)
    }
}

#[derive(Clone)]
struct PointIter<'a> {
    flags: Cursor<'a>,
    x_coords: Cursor<'a>,
    y_coords: Cursor<'a>,
    flag_repeats: u16,
    cur_flags: SimpleGlyphFlags,
    cur_x: i16,
    cur_y: i16,
}

impl Iterator for PointIter<'_> {
    type Item = CurvePoint;
    fn next(&mut self) -> Option<Self::Item> {
        self.advance_flags()?;
        self.advance_points();
        let is_on_curve = self.cur_flags.contains(SimpleGlyphFlags::ON_CURVE_POINT);
        Some(CurvePoint::new(self.cur_x, self.cur_y, is_on_curve))
    }
}

impl<'a> PointIter<'a> {
    fn new(flags: &'a [u8], x_coords: &'a [u8], y_coords: &'a [u8]) -> Self {
        Self {
            flags: FontData::new(flags).cursor(),
            x_coords: FontData::new(x_coords).cursor(),
            y_coords: FontData::new(y_coords).cursor(),
            flag_repeats: 0,
            cur_flags: SimpleGlyphFlags::empty(),
            cur_x: 0,
            cur_y: 0,
        }
    }

    fn advance_flags(&mut self) -> Option<()> {
        if self.flag_repeats == 0 {
            self.cur_flags = self.flags.read().ok()?;
            self.flag_repeats = self
                .cur_flags
                .contains(SimpleGlyphFlags::REPEAT_FLAG)
                .then(|| self.flags.read::<u8>().ok())
                .flatten()
                .map_or(1, |repeats| repeats as u16 + 1);
        }
        self.flag_repeats -= 1;
        Some(())
    }

    fn advance_points(&mut self) {
        let delta_x = read_delta(
            &mut self.x_coords,
            self.cur_flags,
            SimpleGlyphFlags::X_SHORT_VECTOR,
            SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
        )
        .unwrap_or(0);
        let delta_y = read_delta(
            &mut self.y_coords,
            self.cur_flags,
            SimpleGlyphFlags::Y_SHORT_VECTOR,
            SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
        )
        .unwrap_or(0);

        self.cur_x = self.cur_x.wrapping_add(delta_x as i16);
        self.cur_y = self.cur_y.wrapping_add(delta_y as i16);
    }
}

/// Resolves coordinate arrays length.
///
/// The length depends on the flags, so we have to process them all to find it.
fn resolve_coords_len(data: &[u8], points_total: u16) -> Result<FieldLengths, ReadError> {
    let mut cursor = FontData::new(data).cursor();
    let mut flags_left = u32::from(points_total);
    let mut x_coords_len = 0;
    let mut y_coords_len = 0;
    while flags_left > 0 {
        let flags: SimpleGlyphFlags = cursor.read()?;

        // The number of times a glyph point repeats.
        let repeats = if flags.contains(SimpleGlyphFlags::REPEAT_FLAG) {
            let repeats: u8 = cursor.read()?;
            u32::from(repeats) + 1
        } else {
            1
        };

        if repeats > flags_left {
            return Err(ReadError::MalformedData("repeat count too large in glyf"));
        }

        x_coords_len += coord_len(
            flags,
            SimpleGlyphFlags::X_SHORT_VECTOR,
            SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
        ) * repeats;
        y_coords_len += coord_len(
            flags,
            SimpleGlyphFlags::Y_SHORT_VECTOR,
            SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
        ) * repeats;

        flags_left -= repeats;
    }

    Ok(FieldLengths {
        flags: cursor.position()? as u32,
        x_coords: x_coords_len,
        y_coords: y_coords_len,
    })
}

fn coord_len(flags: SimpleGlyphFlags, short: SimpleGlyphFlags, same: SimpleGlyphFlags) -> u32 {
    match (flags.contains(short), flags.contains(same)) {
        (true, _) => 1,
        (false, true) => 0,
        (false, false) => 2,
    }
}

struct FieldLengths {
    flags: u32,
    x_coords: u32,
    y_coords: u32,
}

/// Transform for a composite component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    /// X scale factor.
    pub xx: F2Dot14,
    /// YX skew factor.
    pub yx: F2Dot14,
    /// XY skew factor.
    pub xy: F2Dot14,
    /// Y scale factor.
    pub yy: F2Dot14,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            xx: F2Dot14::ONE,
            yx: F2Dot14::ZERO,
            xy: F2Dot14::ZERO,
            yy: F2Dot14::ONE,
        }
    }
}

/// A reference to another glyph. Part of [CompositeGlyph].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    /// Component flags.
    pub flags: CompositeGlyphFlags,
    /// Glyph identifier.
    pub glyph: GlyphId,
    /// Anchor for component placement.
    pub anchor: Anchor,
    /// Component transformation matrix.
    pub transform: Transform,
}

/// Anchor position for a composite component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Offset the component by this vector.
    Offset { x: i16, y: i16 },
    /// Align point `component` of the component with point `base` of the
    /// glyph assembled so far.
    Point { base: u16, component: u16 },
}

/// A glyph assembled from transformed references to other glyphs.
#[derive(Clone)]
pub struct CompositeGlyph<'a> {
    header: &'a GlyphHeader,
    component_data: &'a [u8],
}

impl<'a> FontRead<'a> for CompositeGlyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let header: &GlyphHeader = data.read_ref_at(0)?;
        if header.number_of_contours.get() >= 0 {
            return Err(ReadError::MalformedData("simple glyph read as composite"));
        }
        let component_data = data
            .split_off(std::mem::size_of::<GlyphHeader>())
            .map(|data| data.as_bytes())
            .unwrap_or_default();
        Ok(CompositeGlyph {
            header,
            component_data,
        })
    }
}

impl<'a> CompositeGlyph<'a> {
    pub fn header(&self) -> &'a GlyphHeader {
        self.header
    }

    pub fn bounds(&self) -> BoundingBox<i16> {
        self.header.bounds()
    }

    /// Returns an iterator over the components of the composite glyph.
    ///
    /// Iteration ends at the first truncated component record.
    pub fn components(&self) -> impl Iterator<Item = Component> + 'a + Clone {
        ComponentIter {
            cur_flags: CompositeGlyphFlags::empty(),
            done: false,
            cursor: FontData::new(self.component_data).cursor(),
        }
    }

    /// Returns the TrueType interpreter instructions.
    pub fn instructions(&self) -> Option<&'a [u8]> {
        ComponentIter {
            cur_flags: CompositeGlyphFlags::empty(),
            done: false,
            cursor: FontData::new(self.component_data).cursor(),
        }
        .instructions()
    }
}

impl std::fmt::Debug for CompositeGlyph<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeGlyph")
            .field("components", &self.components().collect::<Vec<_>>())
            .field("bounds", &self.bounds())
            .finish()
    }
}

#[derive(Clone)]
struct ComponentIter<'a> {
    cur_flags: CompositeGlyphFlags,
    done: bool,
    cursor: Cursor<'a>,
}

impl<'a> ComponentIter<'a> {
    fn instructions(&mut self) -> Option<&'a [u8]> {
        while self.by_ref().next().is_some() {}
        if self
            .cur_flags
            .contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS)
        {
            let len = self.cursor.read::<u16>().ok()? as usize;
            self.cursor.read_array(len).ok()
        } else {
            None
        }
    }
}

impl Iterator for ComponentIter<'_> {
    type Item = Component;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let flags: CompositeGlyphFlags = self.cursor.read().ok()?;
        self.cur_flags = flags;
        let glyph = self.cursor.read::<GlyphId>().ok()?;
        let args_are_words = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
        let args_are_xy_values = flags.contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES);
        let anchor = match (args_are_xy_values, args_are_words) {
            (true, true) => Anchor::Offset {
                x: self.cursor.read().ok()?,
                y: self.cursor.read().ok()?,
            },
            (true, false) => Anchor::Offset {
                x: self.cursor.read::<i8>().ok()? as _,
                y: self.cursor.read::<i8>().ok()? as _,
            },
            (false, true) => Anchor::Point {
                base: self.cursor.read().ok()?,
                component: self.cursor.read().ok()?,
            },
            (false, false) => Anchor::Point {
                base: self.cursor.read::<u8>().ok()? as _,
                component: self.cursor.read::<u8>().ok()? as _,
            },
        };
        let mut transform = Transform::default();
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            transform.xx = self.cursor.read().ok()?;
            transform.yy = transform.xx;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            transform.xx = self.cursor.read().ok()?;
            transform.yy = self.cursor.read().ok()?;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            transform.xx = self.cursor.read().ok()?;
            transform.yx = self.cursor.read().ok()?;
            transform.xy = self.cursor.read().ok()?;
            transform.yy = self.cursor.read().ok()?;
        }
        self.done = !flags.contains(CompositeGlyphFlags::MORE_COMPONENTS);

        Some(Component {
            flags,
            glyph,
            anchor,
            transform,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outline_test_data::glyph::{ComponentBuilder, GlyphBuilder};
    use pretty_assertions::assert_eq;

    fn triangle_with_curve() -> Vec<u8> {
        GlyphBuilder::new()
            .contour(&[(0, 0, true), (500, 0, true), (500, 700, false), (0, 700, true)])
            .contour(&[(100, 100, true), (100, 200, true), (-300, 200, true)])
            .instructions(&[0xB0, 0x01])
            .build()
    }

    #[test]
    fn simple_glyph() {
        let bytes = triangle_with_curve();
        let glyph = Glyph::read(FontData::new(&bytes)).unwrap();
        let Glyph::Simple(simple) = glyph else {
            panic!("expected a simple glyph");
        };
        assert_eq!(simple.number_of_contours(), 2);
        assert_eq!(simple.num_points(), 7);
        assert_eq!(simple.instructions(), &[0xB0, 0x01]);
        assert_eq!(
            simple.bounds(),
            BoundingBox {
                x_min: -300,
                y_min: 0,
                x_max: 500,
                y_max: 700
            }
        );
        let points: Vec<_> = simple.points().collect();
        assert_eq!(points[2], CurvePoint::off_curve(500, 700));
        assert_eq!(points[6], CurvePoint::on_curve(-300, 200));
        assert_eq!(points.len(), 7);
    }

    #[test]
    fn fast_points_match_iterator() {
        let bytes = triangle_with_curve();
        let Ok(Glyph::Simple(simple)) = Glyph::read(FontData::new(&bytes)) else {
            panic!("expected a simple glyph");
        };
        let mut points = vec![Point::default(); simple.num_points()];
        let mut flags = vec![0u8; simple.num_points()];
        simple.read_points_fast(&mut points, &mut flags).unwrap();
        for ((point, flag), expected) in points.iter().zip(&flags).zip(simple.points()) {
            assert_eq!(point.x, expected.x as i32);
            assert_eq!(point.y, expected.y as i32);
            assert_eq!(*flag == 1, expected.on_curve);
        }
        let mut short = vec![Point::default(); 2];
        assert_eq!(
            simple.read_points_fast(&mut short, &mut flags),
            Err(ReadError::InvalidArrayLen)
        );
    }

    #[test]
    fn repeated_flags() {
        // four on-curve points with short positive x and y deltas, the flag
        // stored once and repeated three times
        let mut bytes = Vec::new();
        for value in [1i16, 0, 0, 20, 20] {
            bytes.extend(value.to_be_bytes());
        }
        bytes.extend(3u16.to_be_bytes()); // end point
        bytes.extend(0u16.to_be_bytes()); // no instructions
        bytes.extend([0x01 | 0x02 | 0x04 | 0x08 | 0x10 | 0x20, 3]);
        bytes.extend([5, 5, 5, 5]);
        bytes.extend([5, 5, 5, 5]);
        let Ok(Glyph::Simple(simple)) = Glyph::read(FontData::new(&bytes)) else {
            panic!("expected a simple glyph");
        };
        let points: Vec<_> = simple.points().map(|p| (p.x, p.y)).collect();
        assert_eq!(points, [(5, 5), (10, 10), (15, 15), (20, 20)]);
    }

    #[test]
    fn longest_flag_run() {
        // a repeat count of 255 stands for 256 points
        let mut bytes = Vec::new();
        for value in [1i16, 0, 0, 256, 7] {
            bytes.extend(value.to_be_bytes());
        }
        bytes.extend(256u16.to_be_bytes()); // end point
        bytes.extend(0u16.to_be_bytes()); // no instructions
        // on curve, x +1 as a short vector, y unchanged
        bytes.extend([0x01 | 0x02 | 0x08 | 0x10 | 0x20, 255]);
        // on curve, x unchanged, y +7 as a short vector
        bytes.push(0x01 | 0x04 | 0x10 | 0x20);
        bytes.extend([1u8; 256]);
        bytes.push(7);
        let Ok(Glyph::Simple(simple)) = Glyph::read(FontData::new(&bytes)) else {
            panic!("expected a simple glyph");
        };
        let points: Vec<_> = simple.points().map(|p| (p.x, p.y)).collect();
        assert_eq!(points.len(), 257);
        assert_eq!(points[0], (1, 0));
        assert_eq!(points[255], (256, 0));
        assert_eq!(points[256], (256, 7));
        let mut fast = vec![Point::default(); 257];
        let mut flags = vec![0u8; 257];
        simple.read_points_fast(&mut fast, &mut flags).unwrap();
        assert_eq!(fast[256], Point::new(256, 7));
    }

    #[test]
    fn decreasing_end_points() {
        let mut bytes = Vec::new();
        for value in [2i16, 0, 0, 0, 0] {
            bytes.extend(value.to_be_bytes());
        }
        bytes.extend(5u16.to_be_bytes());
        bytes.extend(2u16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        assert!(matches!(
            Glyph::read(FontData::new(&bytes)),
            Err(ReadError::MalformedData(_))
        ));
    }

    #[test]
    fn composite_components() {
        let bytes = ComponentBuilder::new()
            .offset(GlyphId::new(3), 100, -20)
            .scaled(GlyphId::new(4), 0, 300, 0.5)
            .two_by_two(GlyphId::new(5), [1.0, 0.25, 0.0, 1.0])
            .point_anchor(GlyphId::new(6), 2, 0)
            .build((0, -20, 600, 700));
        let Ok(Glyph::Composite(composite)) = Glyph::read(FontData::new(&bytes)) else {
            panic!("expected a composite glyph");
        };
        let components: Vec<_> = composite.components().collect();
        assert_eq!(components.len(), 4);
        assert_eq!(components[0].glyph, GlyphId::new(3));
        assert_eq!(components[0].anchor, Anchor::Offset { x: 100, y: -20 });
        assert_eq!(components[0].transform, Transform::default());
        assert_eq!(components[1].anchor, Anchor::Offset { x: 0, y: 300 });
        assert_eq!(components[1].transform.xx, F2Dot14::from_f32(0.5));
        assert_eq!(components[1].transform.yy, F2Dot14::from_f32(0.5));
        assert_eq!(components[2].transform.yx, F2Dot14::from_f32(0.25));
        assert_eq!(
            components[3].anchor,
            Anchor::Point {
                base: 2,
                component: 0
            }
        );
        assert!(!components[3]
            .flags
            .contains(CompositeGlyphFlags::MORE_COMPONENTS));
        assert_eq!(composite.instructions(), None);
    }

    #[test]
    fn flags_debug() {
        let flags = CompositeGlyphFlags::ARGS_ARE_XY_VALUES | CompositeGlyphFlags::MORE_COMPONENTS;
        assert_eq!(format!("{flags:?}"), "ARGS_ARE_XY_VALUES | MORE_COMPONENTS");
        assert_eq!(SimpleGlyphFlags::from_bits_truncate(0xFF).bits(), 0x7F);
    }
}
