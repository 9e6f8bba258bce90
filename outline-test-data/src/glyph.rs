//! Encoding simple and composite glyphs into `glyf` data

use outline_types::{F2Dot14, GlyphId};

use crate::bebuffer::BeBuffer;

const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE: u8 = 0x20;

const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
const SCALED_COMPONENT_OFFSET: u16 = 0x0800;

/// A point as `(x, y, on_curve)`.
pub type RawPoint = (i16, i16, bool);

/// Encodes a simple glyph, computing the bounding box from its points.
#[derive(Clone, Debug, Default)]
pub struct GlyphBuilder {
    contours: Vec<Vec<RawPoint>>,
    instructions: Vec<u8>,
}

#[derive(Clone, Copy)]
enum CoordDelta {
    Skip,
    Short(u8),
    Long(i16),
}

impl CoordDelta {
    fn write(self, buf: BeBuffer) -> BeBuffer {
        match self {
            CoordDelta::Skip => buf,
            CoordDelta::Short(value) => buf.push(value),
            CoordDelta::Long(value) => buf.push(value),
        }
    }
}

// reused for x & y by passing in the flags
fn flag_and_delta(value: i16, short_flag: u8, same_or_pos: u8) -> (u8, CoordDelta) {
    const SHORT_MAX: i16 = u8::MAX as i16;
    const SHORT_MIN: i16 = -SHORT_MAX;
    match value {
        0 => (same_or_pos, CoordDelta::Skip),
        SHORT_MIN..=-1 => (short_flag, CoordDelta::Short(value.unsigned_abs() as u8)),
        1..=SHORT_MAX => (short_flag | same_or_pos, CoordDelta::Short(value as _)),
        _other => (0, CoordDelta::Long(value)),
    }
}

impl GlyphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a closed contour.
    pub fn contour(mut self, points: &[RawPoint]) -> Self {
        self.contours.push(points.to_vec());
        self
    }

    pub fn instructions(mut self, instructions: &[u8]) -> Self {
        self.instructions = instructions.to_vec();
        self
    }

    /// The glyph's bounding box as `(x_min, y_min, x_max, y_max)`.
    pub fn bounds(&self) -> (i16, i16, i16, i16) {
        let mut points = self.contours.iter().flatten();
        let Some(&(x, y, _)) = points.next() else {
            return (0, 0, 0, 0);
        };
        points.fold((x, y, x, y), |(x0, y0, x1, y1), &(x, y, _)| {
            (x0.min(x), y0.min(y), x1.max(x), y1.max(y))
        })
    }

    pub fn num_points(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }

    /// Encode the glyph, padded to an even length. A glyph with no contours
    /// encodes to no bytes at all.
    pub fn build(&self) -> Vec<u8> {
        if self.contours.is_empty() {
            return Vec::new();
        }
        let (x_min, y_min, x_max, y_max) = self.bounds();
        let mut buf = BeBuffer::new()
            .push(self.contours.len() as i16)
            .extend([x_min, y_min, x_max, y_max]);
        let mut end = 0usize;
        for contour in &self.contours {
            end += contour.len();
            buf = buf.push((end - 1) as u16);
        }
        buf = buf
            .push(self.instructions.len() as u16)
            .extend_bytes(&self.instructions);

        let (mut last_x, mut last_y) = (0i16, 0i16);
        let deltas: Vec<_> = self
            .contours
            .iter()
            .flatten()
            .map(|&(x, y, on_curve)| {
                let (x_flag, x_delta) =
                    flag_and_delta(x - last_x, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE);
                let (y_flag, y_delta) =
                    flag_and_delta(y - last_y, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE);
                last_x = x;
                last_y = y;
                let on_curve = if on_curve { ON_CURVE_POINT } else { 0 };
                (on_curve | x_flag | y_flag, x_delta, y_delta)
            })
            .collect();

        // runs of identical flags are written once with a repeat count
        let mut i = 0;
        while i < deltas.len() {
            let flag = deltas[i].0;
            let run = deltas[i..]
                .iter()
                .take(256)
                .take_while(|(other, _, _)| *other == flag)
                .count();
            if run > 2 {
                buf = buf.push(flag | REPEAT_FLAG).push((run - 1) as u8);
            } else {
                buf = buf.extend(std::iter::repeat(flag).take(run));
            }
            i += run;
        }
        for (_, x, _) in &deltas {
            buf = x.write(buf);
        }
        for (_, _, y) in &deltas {
            buf = y.write(buf);
        }
        buf.align_to(2).into_vec()
    }
}

/// Encodes a composite glyph.
#[derive(Clone, Debug, Default)]
pub struct ComponentBuilder {
    components: Vec<(u16, GlyphId, [i16; 2], Vec<F2Dot14>)>,
}

impl ComponentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(mut self, flags: u16, glyph: GlyphId, args: [i16; 2], scale: &[f32]) -> Self {
        let needs_words = args.iter().any(|arg| i8::try_from(*arg).is_err());
        let flags = if needs_words {
            flags | ARG_1_AND_2_ARE_WORDS
        } else {
            flags
        };
        let scale = scale.iter().map(|v| F2Dot14::from_f32(*v)).collect();
        self.components.push((flags, glyph, args, scale));
        self
    }

    /// A component translated by `(dx, dy)`.
    pub fn offset(self, glyph: GlyphId, dx: i16, dy: i16) -> Self {
        self.add(ARGS_ARE_XY_VALUES, glyph, [dx, dy], &[])
    }

    /// A component uniformly scaled, then translated.
    pub fn scaled(self, glyph: GlyphId, dx: i16, dy: i16, scale: f32) -> Self {
        self.add(ARGS_ARE_XY_VALUES | WE_HAVE_A_SCALE, glyph, [dx, dy], &[scale])
    }

    /// A component scaled on each axis, with the offset scaled as well.
    pub fn scaled_offset(self, glyph: GlyphId, dx: i16, dy: i16, scale: [f32; 2]) -> Self {
        self.add(
            ARGS_ARE_XY_VALUES | WE_HAVE_AN_X_AND_Y_SCALE | SCALED_COMPONENT_OFFSET,
            glyph,
            [dx, dy],
            &scale,
        )
    }

    /// A component transformed by `[xx, yx, xy, yy]`.
    pub fn two_by_two(self, glyph: GlyphId, matrix: [f32; 4]) -> Self {
        self.add(ARGS_ARE_XY_VALUES | WE_HAVE_A_TWO_BY_TWO, glyph, [0, 0], &matrix)
    }

    /// A component placed so that its point `component` lands on point
    /// `base` of the glyph assembled so far.
    pub fn point_anchor(self, glyph: GlyphId, base: u16, component: u16) -> Self {
        self.add(0, glyph, [base as i16, component as i16], &[])
    }

    /// Encode the glyph with an explicit bounding box.
    pub fn build(&self, bounds: (i16, i16, i16, i16)) -> Vec<u8> {
        let (x_min, y_min, x_max, y_max) = bounds;
        let mut buf = BeBuffer::new()
            .push(-1i16)
            .extend([x_min, y_min, x_max, y_max]);
        let last = self.components.len().saturating_sub(1);
        for (i, (flags, glyph, args, scale)) in self.components.iter().enumerate() {
            let flags = if i < last {
                flags | MORE_COMPONENTS
            } else {
                *flags
            };
            buf = buf.push(flags).push(*glyph);
            buf = match (
                flags & ARG_1_AND_2_ARE_WORDS != 0,
                flags & ARGS_ARE_XY_VALUES != 0,
            ) {
                (true, true) => buf.extend(*args),
                (true, false) => buf.extend(args.map(|arg| arg as u16)),
                (false, true) => buf.extend(args.map(|arg| arg as i8)),
                (false, false) => buf.extend(args.map(|arg| arg as u8)),
            };
            buf = buf.extend(scale.iter().copied());
        }
        buf.align_to(2).into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_glyph_has_no_bytes() {
        assert!(GlyphBuilder::new().build().is_empty());
    }

    #[test]
    fn simple_layout() {
        let glyph = GlyphBuilder::new()
            .contour(&[(0, 0, true), (300, 0, true), (0, 10, false)])
            .build();
        // header, one end point, no instructions
        assert_eq!(&glyph[..10], &[0, 1, 0, 0, 0, 0, 1, 44, 0, 10]);
        assert_eq!(&glyph[10..14], &[0, 2, 0, 0]);
        // flags: first point repeats x and y, second has a long x
        assert_eq!(glyph[14], ON_CURVE_POINT | X_IS_SAME_OR_POSITIVE | Y_IS_SAME_OR_POSITIVE);
        assert_eq!(glyph[15], ON_CURVE_POINT | Y_IS_SAME_OR_POSITIVE);
        assert_eq!(glyph.len() % 2, 0);
    }

    #[test]
    fn repeated_flags_are_compressed() {
        let points: Vec<_> = (0..10).map(|i| (i * 10, i * 10, true)).collect();
        let glyph = GlyphBuilder::new().contour(&points).build();
        let flags_start = 10 + 2 + 2;
        // the first point has a zero delta, the remaining nine share a flag
        assert_eq!(glyph[flags_start + 1] & REPEAT_FLAG, REPEAT_FLAG);
        assert_eq!(glyph[flags_start + 2], 8);
    }

    #[test]
    fn composite_flags() {
        let glyph = ComponentBuilder::new()
            .offset(GlyphId::new(1), 1000, 0)
            .point_anchor(GlyphId::new(2), 3, 0)
            .build((0, 0, 10, 10));
        let flags = u16::from_be_bytes([glyph[10], glyph[11]]);
        assert_eq!(
            flags,
            ARGS_ARE_XY_VALUES | ARG_1_AND_2_ARE_WORDS | MORE_COMPONENTS
        );
        // second component: byte-sized point numbers
        assert_eq!(u16::from_be_bytes([glyph[18], glyph[19]]), 0);
        assert_eq!(&glyph[22..24], &[3, 0]);
    }
}
