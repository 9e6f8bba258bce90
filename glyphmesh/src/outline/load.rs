//! Loading simple and composite glyphs into outlines.

use kurbo::{Affine, Point, Vec2};
use read_outlines::{
    tables::{
        glyf::{Anchor, CompositeGlyph, CompositeGlyphFlags, Glyf, Glyph, SimpleGlyph},
        loca::Loca,
    },
    types::{self, BoundingBox, GlyphId},
    TableProvider,
};

use super::{Contour, GlyphOutline, OutlinePoint};
use crate::{decycler::GlyphDecycler, metrics::GlyphMetrics, MeshError};

/// Access to the glyph outlines of a font.
#[derive(Clone)]
pub struct OutlineGlyphs<'a> {
    loca: Loca<'a>,
    glyf: Glyf<'a>,
    metrics: GlyphMetrics<'a>,
}

impl<'a> OutlineGlyphs<'a> {
    /// Creates outline access for a font with `loca` and `glyf` tables.
    pub fn new(font: &impl TableProvider<'a>) -> Result<Self, MeshError> {
        let loca = font.loca(None)?;
        let glyf = font.glyf()?;
        Ok(Self {
            loca,
            glyf,
            metrics: GlyphMetrics::new(font),
        })
    }

    /// Returns the number of glyphs in the font.
    pub fn glyph_count(&self) -> u32 {
        self.metrics.glyph_count()
    }

    /// Loads the outline for the given glyph.
    ///
    /// Returns `Ok(None)` for a glyph without contours, such as a space.
    pub fn get(&self, glyph_id: GlyphId) -> Result<Option<GlyphOutline>, MeshError> {
        let glyph = self.glyph(glyph_id)?;
        let mut outline = RawOutline::default();
        self.load(&glyph, glyph_id, &mut GlyphDecycler::new(), &mut outline)?;
        if outline.points.is_empty() {
            return Ok(None);
        }
        let (bounds, is_composite) = match &glyph {
            Some(Glyph::Simple(simple)) => (convert_bounds(simple.bounds()), false),
            _ => (outline.bounds(), true),
        };
        let contours = outline.into_contours();
        log::trace!(
            "glyph {glyph_id}: {} contours, {} points",
            contours.len(),
            contours.iter().map(Contour::len).sum::<usize>()
        );
        Ok(Some(GlyphOutline {
            glyph_id,
            contours,
            advance_width: self.metrics.advance_width(glyph_id).unwrap_or_default(),
            bounds,
            is_composite,
        }))
    }

    fn glyph(&self, glyph_id: GlyphId) -> Result<Option<Glyph<'a>>, MeshError> {
        if glyph_id.to_u32() >= self.metrics.glyph_count() {
            return Err(MeshError::GlyphNotFound(glyph_id));
        }
        Ok(self.loca.get_glyf(glyph_id, &self.glyf)?)
    }

    fn load(
        &self,
        glyph: &Option<Glyph>,
        glyph_id: GlyphId,
        decycler: &mut GlyphDecycler,
        outline: &mut RawOutline,
    ) -> Result<(), MeshError> {
        let mut cycle_guard = decycler
            .enter(glyph_id)
            .map_err(|_| MeshError::RecursionLimitExceeded(glyph_id))?;
        match glyph {
            Some(Glyph::Simple(simple)) => outline.push_simple(simple),
            Some(Glyph::Composite(composite)) => {
                self.load_composite(composite, glyph_id, &mut cycle_guard, outline)
            }
            None => Ok(()),
        }
    }

    fn load_composite(
        &self,
        glyph: &CompositeGlyph,
        glyph_id: GlyphId,
        decycler: &mut GlyphDecycler,
        outline: &mut RawOutline,
    ) -> Result<(), MeshError> {
        // Point anchors index the points of this composite only.
        let point_base = outline.points.len();
        for component in glyph.components() {
            let start_point = outline.points.len();
            let component_glyph = self.glyph(component.glyph)?;
            self.load(&component_glyph, component.glyph, decycler, outline)?;
            let end_point = outline.points.len();
            let xform = &component.transform;
            let [xx, yx, xy, yy] = [xform.xx, xform.yx, xform.xy, xform.yy].map(to_f64);
            let have_xform = component.flags.intersects(
                CompositeGlyphFlags::WE_HAVE_A_SCALE
                    | CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE
                    | CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO,
            );
            if have_xform {
                let affine = Affine::new([xx, yx, xy, yy, 0.0, 0.0]);
                for point in &mut outline.points[start_point..end_point] {
                    point.point = affine * point.point;
                }
            }
            let offset = match component.anchor {
                Anchor::Offset { x, y } => {
                    let mut offset = Vec2::new(x as f64, y as f64);
                    if have_xform
                        && component.flags
                            & (CompositeGlyphFlags::SCALED_COMPONENT_OFFSET
                                | CompositeGlyphFlags::UNSCALED_COMPONENT_OFFSET)
                            == CompositeGlyphFlags::SCALED_COMPONENT_OFFSET
                    {
                        // FreeType's approximation, which works better than
                        // the algorithm documented by Apple.
                        // https://github.com/freetype/freetype/blob/b1c90733ee6a04882b133101d61b12e352eeb290/src/truetype/ttgload.c#L1259
                        offset.x *= hypot(xx, xy);
                        offset.y *= hypot(yy, yx);
                    }
                    offset
                }
                Anchor::Point {
                    base,
                    component: child,
                } => {
                    let base_point = outline.points[point_base..start_point]
                        .get(base as usize)
                        .ok_or(MeshError::InvalidAnchorPoint(glyph_id, base))?;
                    let child_point = outline.points[start_point..end_point]
                        .get(child as usize)
                        .ok_or(MeshError::InvalidAnchorPoint(glyph_id, child))?;
                    base_point.point - child_point.point
                }
            };
            if offset != Vec2::ZERO {
                for point in &mut outline.points[start_point..end_point] {
                    point.point += offset;
                }
            }
        }
        Ok(())
    }
}

fn to_f64(value: types::F2Dot14) -> f64 {
    value.to_f32() as f64
}

fn hypot(a: f64, b: f64) -> f64 {
    let (a, b) = (a.abs(), b.abs());
    if a > b {
        a + (3.0 * b) / 8.0
    } else {
        b + (3.0 * a) / 8.0
    }
}

fn convert_bounds(bounds: BoundingBox<i16>) -> BoundingBox<f64> {
    BoundingBox {
        x_min: bounds.x_min as f64,
        y_min: bounds.y_min as f64,
        x_max: bounds.x_max as f64,
        y_max: bounds.y_max as f64,
    }
}

/// Points and contour end indices accumulated while loading a glyph tree.
#[derive(Default)]
struct RawOutline {
    points: Vec<OutlinePoint>,
    /// Exclusive end index of each contour in `points`.
    contour_ends: Vec<usize>,
    scratch_points: Vec<types::Point<i32>>,
    scratch_flags: Vec<u8>,
}

impl RawOutline {
    fn push_simple(&mut self, glyph: &SimpleGlyph) -> Result<(), MeshError> {
        let num_points = glyph.num_points();
        self.scratch_points.clear();
        self.scratch_points.resize(num_points, Default::default());
        self.scratch_flags.clear();
        self.scratch_flags.resize(num_points, 0);
        glyph.read_points_fast(&mut self.scratch_points, &mut self.scratch_flags)?;
        let base = self.points.len();
        self.points.extend(
            self.scratch_points
                .iter()
                .zip(&self.scratch_flags)
                .map(|(point, flags)| {
                    OutlinePoint::new(Point::new(point.x as f64, point.y as f64), flags & 1 != 0)
                }),
        );
        self.contour_ends.extend(
            glyph
                .end_pts_of_contours()
                .iter()
                .map(|end| base + end.get() as usize + 1),
        );
        Ok(())
    }

    fn bounds(&self) -> BoundingBox<f64> {
        let mut points = self.points.iter().map(|p| p.point);
        let Some(first) = points.next() else {
            return BoundingBox::default();
        };
        points.fold(
            BoundingBox {
                x_min: first.x,
                y_min: first.y,
                x_max: first.x,
                y_max: first.y,
            },
            |bounds, p| BoundingBox {
                x_min: bounds.x_min.min(p.x),
                y_min: bounds.y_min.min(p.y),
                x_max: bounds.x_max.max(p.x),
                y_max: bounds.y_max.max(p.y),
            },
        )
    }

    fn into_contours(self) -> Vec<Contour> {
        let mut start = 0;
        let mut contours = Vec::with_capacity(self.contour_ends.len());
        for end in self.contour_ends {
            if let Some(points) = self.points.get(start..end) {
                contours.push(Contour::new(points.to_vec()));
            }
            start = end;
        }
        contours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outline_test_data::{
        font::FontBuilder,
        glyph::{ComponentBuilder, GlyphBuilder},
        glyph_font::{
            glyph_font_builder, A_DIAERESIS, ADVANCES, ANCHORED, L, NUM_GLYPHS, O,
            SELF_REFERENCE, SKEWED, SMALL_O, SPACE,
        },
        glyph_font, glyph_font_long_loca,
        tables::{self, HeadFields},
    };
    use pretty_assertions::assert_eq;
    use read_outlines::{types::Tag, FontRef};

    fn outlines(data: &[u8]) -> OutlineGlyphs<'_> {
        OutlineGlyphs::new(&FontRef::new(data).unwrap()).unwrap()
    }

    /// A font with only the tables needed for outlines.
    fn font_from_glyphs(glyphs: &[Vec<u8>]) -> Vec<u8> {
        let lengths: Vec<_> = glyphs.iter().map(Vec::len).collect();
        let mut builder = FontBuilder::new();
        builder
            .add_raw(
                Tag::new(b"head"),
                tables::head(&HeadFields::default()).into_vec(),
            )
            .add_raw(
                Tag::new(b"maxp"),
                tables::maxp(glyphs.len() as u16, None).into_vec(),
            )
            .add_raw(Tag::new(b"loca"), tables::loca(&lengths, false).into_vec())
            .add_raw(Tag::new(b"glyf"), glyphs.concat());
        builder.build()
    }

    fn dot() -> Vec<u8> {
        GlyphBuilder::new()
            .contour(&[(0, 0, true), (0, 10, true), (10, 10, true)])
            .build()
    }

    fn points(contour: &Contour) -> Vec<(f64, f64)> {
        contour.points().iter().map(|p| (p.point.x, p.point.y)).collect()
    }

    #[test]
    fn simple_glyph() {
        let glyphs = outlines(glyph_font());
        let o = glyphs.get(O).unwrap().unwrap();
        assert!(!o.is_composite);
        assert_eq!(o.contours.len(), 2);
        assert_eq!(o.num_points(), 16);
        assert_eq!(o.advance_width, ADVANCES[O.to_u32() as usize]);
        assert_eq!(
            o.bounds,
            BoundingBox {
                x_min: 50.0,
                y_min: 0.0,
                x_max: 550.0,
                y_max: 700.0
            }
        );
        let first = o.contours[0].points()[0];
        assert_eq!(first, OutlinePoint::new(Point::new(50.0, 700.0), false));
    }

    #[test]
    fn empty_glyph_has_no_outline() {
        let glyphs = outlines(glyph_font());
        assert_eq!(glyphs.get(SPACE), Ok(None));
    }

    #[test]
    fn out_of_range_glyph() {
        let glyphs = outlines(glyph_font());
        let gid = GlyphId::new(NUM_GLYPHS);
        assert_eq!(glyphs.get(gid), Err(MeshError::GlyphNotFound(gid)));
    }

    #[test]
    fn scaled_component() {
        let glyphs = outlines(glyph_font());
        let small_o = glyphs.get(SMALL_O).unwrap().unwrap();
        let o = glyphs.get(O).unwrap().unwrap();
        assert!(small_o.is_composite);
        for (small, big) in small_o.contours.iter().zip(&o.contours) {
            let expected: Vec<_> = points(big).iter().map(|(x, y)| (x / 2.0, y / 2.0)).collect();
            assert_eq!(points(small), expected);
        }
        assert_eq!(
            small_o.bounds,
            BoundingBox {
                x_min: 25.0,
                y_min: 0.0,
                x_max: 275.0,
                y_max: 350.0
            }
        );
    }

    #[test]
    fn offset_components() {
        let glyphs = outlines(glyph_font());
        let outline = glyphs.get(A_DIAERESIS).unwrap().unwrap();
        assert_eq!(outline.contours.len(), 4);
        assert_eq!(points(&outline.contours[2])[0], (150.0, 760.0));
        assert_eq!(points(&outline.contours[3])[0], (390.0, 760.0));
        assert_eq!(outline.bounds.y_max, 820.0);
    }

    #[test]
    fn point_anchored_component() {
        let glyphs = outlines(glyph_font());
        let outline = glyphs.get(ANCHORED).unwrap().unwrap();
        assert_eq!(outline.contours.len(), 2);
        // point 0 of the dot lands on point 2 of the 'L'
        assert_eq!(points(&outline.contours[1])[0], (150.0, 700.0));
        assert_eq!(outline.bounds.y_max, 760.0);
    }

    #[test]
    fn two_by_two_component() {
        let glyphs = outlines(glyph_font());
        let outline = glyphs.get(SKEWED).unwrap().unwrap();
        let l = glyphs.get(L).unwrap().unwrap();
        let expected: Vec<_> = points(&l.contours[0])
            .iter()
            .map(|(x, y)| (x + 0.25 * y, *y))
            .collect();
        assert_eq!(points(&outline.contours[0]), expected);
        assert_eq!(outline.bounds.x_max, 472.5);
    }

    #[test]
    fn self_reference() {
        let glyphs = outlines(glyph_font());
        assert_eq!(
            glyphs.get(SELF_REFERENCE),
            Err(MeshError::RecursionLimitExceeded(SELF_REFERENCE))
        );
    }

    #[test]
    fn scaled_component_offset() {
        let glyphs = [
            dot(),
            ComponentBuilder::new()
                .scaled_offset(GlyphId::new(0), 100, 40, [1.5, 0.5])
                .build((0, 0, 0, 0)),
        ];
        let data = font_from_glyphs(&glyphs);
        let outline = outlines(&data).get(GlyphId::new(1)).unwrap().unwrap();
        assert_eq!(
            points(&outline.contours[0]),
            vec![(150.0, 20.0), (150.0, 25.0), (165.0, 25.0)]
        );
    }

    #[test]
    fn nesting_depth_limit() {
        // glyph i references glyph i + 1; the last one is a simple glyph
        let mut glyphs: Vec<_> = (1..10u16)
            .map(|next| {
                ComponentBuilder::new()
                    .offset(GlyphId::new(next), 1, 0)
                    .build((0, 0, 0, 0))
            })
            .collect();
        glyphs.push(dot());
        let data = font_from_glyphs(&glyphs);
        let outlines = outlines(&data);
        // eight levels of nesting are fine
        let outline = outlines.get(GlyphId::new(2)).unwrap().unwrap();
        assert_eq!(points(&outline.contours[0])[0], (7.0, 0.0));
        assert_eq!(
            outlines.get(GlyphId::new(1)),
            Err(MeshError::RecursionLimitExceeded(GlyphId::new(9)))
        );
    }

    #[test]
    fn invalid_anchor_point() {
        let glyphs = [
            dot(),
            ComponentBuilder::new()
                .offset(GlyphId::new(0), 0, 0)
                .point_anchor(GlyphId::new(0), 30, 0)
                .build((0, 0, 0, 0)),
        ];
        let data = font_from_glyphs(&glyphs);
        assert_eq!(
            outlines(&data).get(GlyphId::new(1)),
            Err(MeshError::InvalidAnchorPoint(GlyphId::new(1), 30))
        );
    }

    #[test]
    fn missing_component() {
        let glyphs = [ComponentBuilder::new()
            .offset(GlyphId::new(40), 0, 0)
            .build((0, 0, 0, 0))];
        let data = font_from_glyphs(&glyphs);
        assert_eq!(
            outlines(&data).get(GlyphId::new(0)),
            Err(MeshError::GlyphNotFound(GlyphId::new(40)))
        );
    }

    #[test]
    fn long_offsets_match_short() {
        let short = outlines(glyph_font());
        let long = outlines(glyph_font_long_loca());
        for gid in 0..NUM_GLYPHS {
            let gid = GlyphId::new(gid);
            assert_eq!(short.get(gid), long.get(gid));
        }
    }

    #[test]
    fn missing_glyf_table() {
        let mut builder = glyph_font_builder(false);
        builder.remove(Tag::new(b"glyf"));
        let data = builder.build();
        let font = FontRef::new(&data).unwrap();
        assert!(matches!(
            OutlineGlyphs::new(&font),
            Err(MeshError::TableNotFound(tag)) if tag == Tag::new(b"glyf")
        ));
    }
}
