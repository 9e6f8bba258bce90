//! A small TrueType font built from the encoders in this crate.
//!
//! The glyphs cover the cases the mesh compiler has to handle: straight and
//! curved contours, holes, disjoint outer contours, composites with offsets,
//! scales, 2x2 transforms and point anchors, and a composite that references
//! itself. All coordinates are in a 1000 unit em.

use std::sync::OnceLock;

use outline_types::{GlyphId, NameId, Tag};

use crate::cmap::{self, Segment};
use crate::font::FontBuilder;
use crate::glyph::{ComponentBuilder, GlyphBuilder};
use crate::tables::{self, HeadFields, HheaFields, NameRecord};

pub const UNITS_PER_EM: u16 = 1000;
pub const ASCENDER: i16 = 800;
pub const DESCENDER: i16 = -200;

pub const NOTDEF: GlyphId = GlyphId::new(0);
pub const SPACE: GlyphId = GlyphId::new(1);
pub const A: GlyphId = GlyphId::new(2);
pub const B: GlyphId = GlyphId::new(3);
pub const D: GlyphId = GlyphId::new(4);
pub const L: GlyphId = GlyphId::new(5);
pub const O: GlyphId = GlyphId::new(6);
pub const I: GlyphId = GlyphId::new(7);
/// `O` scaled by one half.
pub const SMALL_O: GlyphId = GlyphId::new(8);
/// `A` with two dots above.
pub const A_DIAERESIS: GlyphId = GlyphId::new(9);
pub const DOT: GlyphId = GlyphId::new(10);
/// A composite whose only component is itself.
pub const SELF_REFERENCE: GlyphId = GlyphId::new(11);
/// `L` with a dot attached by point matching.
pub const ANCHORED: GlyphId = GlyphId::new(12);
/// `L` skewed by a 2x2 transform.
pub const SKEWED: GlyphId = GlyphId::new(13);

pub const NUM_GLYPHS: u16 = 14;
/// Glyphs past this index share the last advance.
pub const NUMBER_OF_H_METRICS: u16 = 12;

/// Characters mapped only through the glyph id array of the format 4
/// subtable: `O`, `A`, the anchored composite and the skewed composite.
pub const PRIVATE_USE_START: char = '\u{E000}';

/// The self referencing composite is mapped to U+2603.
pub const SELF_REFERENCE_CHAR: char = '\u{2603}';

/// Advance widths in font units, indexed by glyph id.
pub const ADVANCES: [u16; NUM_GLYPHS as usize] = [
    500, 250, 620, 560, 620, 480, 600, 300, 300, 620, 120, 500, 500, 500,
];

/// Every `(char, glyph)` pair in the charmap.
pub fn mapped_chars() -> Vec<(char, GlyphId)> {
    let mut chars = vec![
        (' ', SPACE),
        ('.', DOT),
        ('A', A),
        ('B', B),
        ('D', D),
        ('L', L),
        ('O', O),
        ('i', I),
        ('o', SMALL_O),
        ('Ä', A_DIAERESIS),
        (SELF_REFERENCE_CHAR, SELF_REFERENCE),
    ];
    let private = [O, A, ANCHORED, SKEWED];
    for (i, gid) in private.into_iter().enumerate() {
        let ch = char::from_u32(PRIVATE_USE_START as u32 + i as u32).unwrap_or_default();
        chars.push((ch, gid));
    }
    chars
}

fn glyphs() -> Vec<Vec<u8>> {
    let notdef = GlyphBuilder::new()
        .contour(&[(50, 0, true), (50, 700, true), (450, 700, true), (450, 0, true)])
        .contour(&[(100, 50, true), (400, 50, true), (400, 650, true), (100, 650, true)]);
    let a = GlyphBuilder::new()
        .contour(&[
            (0, 0, true),
            (250, 700, true),
            (350, 700, true),
            (600, 0, true),
            (500, 0, true),
            (440, 200, true),
            (160, 200, true),
            (100, 0, true),
        ])
        .contour(&[(190, 280, true), (410, 280, true), (300, 600, true)]);
    let b = GlyphBuilder::new()
        .contour(&[
            (50, 0, true),
            (50, 700, true),
            (320, 700, true),
            (460, 700, false),
            (460, 530, true),
            (440, 390, false),
            (300, 370, true),
            (500, 350, false),
            (500, 180, true),
            (500, 0, false),
            (340, 0, true),
        ])
        .contour(&[
            (130, 440, true),
            (300, 440, true),
            (370, 520, false),
            (300, 620, true),
            (130, 620, true),
        ])
        .contour(&[
            (130, 70, true),
            (320, 70, true),
            (410, 180, false),
            (320, 290, true),
            (130, 290, true),
        ]);
    let d = GlyphBuilder::new()
        .contour(&[
            (60, 0, true),
            (60, 700, true),
            (300, 700, true),
            (560, 700, false),
            (560, 350, true),
            (560, 0, false),
            (300, 0, true),
        ])
        .contour(&[
            (140, 80, true),
            (290, 80, true),
            (470, 80, false),
            (470, 350, true),
            (470, 620, false),
            (290, 620, true),
            (140, 620, true),
        ]);
    let l = GlyphBuilder::new().contour(&[
        (60, 0, true),
        (60, 700, true),
        (150, 700, true),
        (150, 90, true),
        (450, 90, true),
        (450, 0, true),
    ]);
    // the outer contour starts on an off-curve point
    let o = GlyphBuilder::new()
        .contour(&[
            (50, 700, false),
            (300, 700, true),
            (550, 700, false),
            (550, 350, true),
            (550, 0, false),
            (300, 0, true),
            (50, 0, false),
            (50, 350, true),
        ])
        .contour(&[
            (300, 600, true),
            (150, 600, false),
            (150, 350, true),
            (150, 100, false),
            (300, 100, true),
            (450, 100, false),
            (450, 350, true),
            (450, 600, false),
        ]);
    let i = GlyphBuilder::new()
        .contour(&[(100, 0, true), (100, 500, true), (200, 500, true), (200, 0, true)])
        .contour(&[(100, 600, true), (100, 700, true), (200, 700, true), (200, 600, true)]);
    let dot = GlyphBuilder::new().contour(&[(0, 0, true), (0, 60, true), (60, 60, true), (60, 0, true)]);

    vec![
        notdef.build(),
        Vec::new(),
        a.build(),
        b.build(),
        d.build(),
        l.build(),
        o.build(),
        i.build(),
        ComponentBuilder::new()
            .scaled(O, 0, 0, 0.5)
            .build((25, 0, 275, 350)),
        ComponentBuilder::new()
            .offset(A, 0, 0)
            .offset(DOT, 150, 760)
            .offset(DOT, 390, 760)
            .build((0, 0, 600, 820)),
        dot.build(),
        ComponentBuilder::new()
            .offset(SELF_REFERENCE, 10, 0)
            .build((0, 0, 0, 0)),
        ComponentBuilder::new()
            .offset(L, 0, 0)
            .point_anchor(DOT, 2, 0)
            .build((60, 0, 450, 760)),
        ComponentBuilder::new()
            .two_by_two(L, [1.0, 0.0, 0.25, 1.0])
            .build((60, 0, 473, 700)),
    ]
}

fn charmap() -> Vec<u8> {
    let subtable = cmap::format4(&[
        Segment::delta(0x20, 0x20, 1 - 0x20),
        Segment::delta(0x2E, 0x2E, 10 - 0x2E),
        Segment::delta(0x41, 0x42, 2 - 0x41),
        Segment::delta(0x44, 0x44, 4 - 0x44),
        Segment::delta(0x4C, 0x4C, 5 - 0x4C),
        Segment::delta(0x4F, 0x4F, 6 - 0x4F),
        Segment::delta(0x69, 0x69, 7 - 0x69),
        Segment::delta(0x6F, 0x6F, 8 - 0x6F),
        Segment::delta(0xC4, 0xC4, 9 - 0xC4),
        Segment::delta(0x2603, 0x2603, 11 - 0x2603),
        Segment::glyph_ids(0xE000, &[6, 2, 12, 13]),
    ]);
    cmap::table(&[(3, 1, subtable.as_slice())]).into_vec()
}

/// Returns a builder holding every table of the test font, so tests can
/// remove or replace tables before building.
pub fn glyph_font_builder(long_loca: bool) -> FontBuilder {
    let glyphs = glyphs();
    let lengths: Vec<_> = glyphs.iter().map(Vec::len).collect();
    let metrics: Vec<(u16, i16)> = glyphs
        .iter()
        .zip(ADVANCES)
        .map(|(glyph, advance)| {
            // xMin from the glyph header, zero for empty glyphs
            let lsb = glyph
                .get(2..4)
                .map(|bytes| i16::from_be_bytes([bytes[0], bytes[1]]))
                .unwrap_or(0);
            (advance, lsb)
        })
        .collect();

    let mut builder = FontBuilder::new();
    builder
        .add_raw(
            Tag::new(b"head"),
            tables::head(&HeadFields {
                units_per_em: UNITS_PER_EM,
                bounds: (0, 0, 600, 820),
                long_loca,
                ..Default::default()
            })
            .into_vec(),
        )
        .add_raw(
            Tag::new(b"hhea"),
            tables::hhea(&HheaFields {
                ascender: ASCENDER,
                descender: DESCENDER,
                line_gap: 0,
                advance_width_max: 620,
                number_of_h_metrics: NUMBER_OF_H_METRICS,
            })
            .into_vec(),
        )
        .add_raw(
            Tag::new(b"hmtx"),
            tables::hmtx(&metrics, NUMBER_OF_H_METRICS).into_vec(),
        )
        .add_raw(
            Tag::new(b"maxp"),
            tables::maxp(
                NUM_GLYPHS,
                Some([21, 3, 30, 4, 2, 0, 0, 0, 0, 0, 0, 3, 1]),
            )
            .into_vec(),
        )
        .add_raw(
            Tag::new(b"name"),
            tables::name(&[
                NameRecord::mac(NameId::FAMILY_NAME, "Glyph Mesh Test"),
                NameRecord::windows(NameId::FAMILY_NAME, "Glyph Mesh Test"),
                NameRecord::windows(NameId::SUBFAMILY_NAME, "Regular"),
                NameRecord::windows(NameId::FULL_NAME, "Glyph Mesh Test Regular"),
                NameRecord::windows(NameId::VERSION_STRING, "Version 1.000"),
                NameRecord::windows(NameId::POSTSCRIPT_NAME, "GlyphMeshTest-Regular"),
            ])
            .into_vec(),
        )
        .add_raw(Tag::new(b"cmap"), charmap())
        .add_raw(Tag::new(b"loca"), tables::loca(&lengths, long_loca).into_vec())
        .add_raw(Tag::new(b"glyf"), glyphs.concat());
    builder
}

/// The test font with short `loca` offsets.
pub fn glyph_font() -> &'static [u8] {
    static FONT: OnceLock<Vec<u8>> = OnceLock::new();
    FONT.get_or_init(|| glyph_font_builder(false).build())
}

/// The test font with long `loca` offsets.
pub fn glyph_font_long_loca() -> &'static [u8] {
    static FONT: OnceLock<Vec<u8>> = OnceLock::new();
    FONT.get_or_init(|| glyph_font_builder(true).build())
}
