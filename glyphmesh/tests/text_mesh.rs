//! Laying out strings, end to end from font bytes.

use glyphmesh::{
    raw::{tables::cmap::CmapSubtable, types::Tag, TableProvider},
    GlyphMeshCache, MeshError, MeshFont, MeshKind, TextMesh, TextSettings,
};
use outline_test_data::glyph_font::{
    self, glyph_font_builder, ADVANCES, A, B, PRIVATE_USE_START, SELF_REFERENCE_CHAR,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn font() -> MeshFont<'static> {
    init_logging();
    MeshFont::new(outline_test_data::glyph_font()).unwrap()
}

fn advance(gid: glyphmesh::GlyphId, font_size: f32) -> f32 {
    (ADVANCES[gid.to_u16() as usize] as f64 * font_size as f64 / 1000.0) as f32
}

fn assert_valid(mesh: &TextMesh) {
    let group = match mesh.kind {
        MeshKind::Wireframe => 2,
        MeshKind::Filled => 3,
    };
    assert_eq!(mesh.indices.len() % group, 0);
    assert_eq!(mesh.vertices.len() % 3, 0);
    assert!(mesh
        .indices
        .iter()
        .all(|i| (*i as usize) < mesh.vertex_count()));
}

#[test]
fn two_letters() {
    let font = font();
    for filled in [false, true] {
        let settings = TextSettings::new(1.0)
            .with_spline_steps(4)
            .with_filled(filled);
        let mesh = font.text_mesh("AB", &settings);
        assert_valid(&mesh);
        assert_eq!(mesh.advance_width, advance(A, 1.0) + advance(B, 1.0));
        let a = font.glyph_mesh(A, &settings).unwrap();
        let b = font.glyph_mesh(B, &settings).unwrap();
        assert_eq!(mesh.vertex_count(), a.vertex_count() + b.vertex_count());
        assert_eq!(mesh.indices.len(), a.indices.len() + b.indices.len());
        // every vertex of the 'B' sits past the advance of the 'A'
        assert!(mesh.positions()[a.vertex_count()..]
            .iter()
            .all(|p| p[0] >= advance(A, 1.0)));
        assert_eq!(mesh.bounds.min, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.bounds.max[1], 0.7);
        assert_eq!(mesh.color, settings.color);
        assert_eq!(mesh.line_width, settings.line_width);
    }
}

/// Unit size, raw control points, then the same text filled.
fn check_two_letters(font: &MeshFont) {
    let settings = TextSettings::new(1.0);
    let wireframe = font.text_mesh("AB", &settings);
    assert_eq!(wireframe.kind, MeshKind::Wireframe);
    assert!(!wireframe.is_empty());
    assert_valid(&wireframe);
    assert!(wireframe.bounds.min[0] < wireframe.bounds.max[0]);
    assert!(wireframe.advance_width > 0.0);

    let filled = font.text_mesh("AB", &settings.with_filled(true));
    assert_eq!(filled.kind, MeshKind::Filled);
    assert!(!filled.is_empty());
    assert_valid(&filled);
    assert!(filled
        .indices
        .chunks_exact(3)
        .all(|t| t[0] != t[1] && t[1] != t[2] && t[0] != t[2]));
}

#[test]
fn two_letters_end_to_end() {
    check_two_letters(&font());
}

#[test]
fn real_font_two_letters() {
    let Some(data) = outline_test_data::raleway_regular() else {
        return;
    };
    init_logging();
    let font = MeshFont::new(&data).unwrap();
    assert!(font.charmap().has_map());
    check_two_letters(&font);
    let curved = font.text_mesh("AB", &TextSettings::new(24.0).with_spline_steps(8));
    assert!(!curved.is_empty());
}

#[test]
fn cmap_ends_with_terminating_segment() {
    let font = font();
    let cmap = font.font().cmap().unwrap();
    let record = &cmap.encoding_records()[0];
    let Ok(CmapSubtable::Format4(subtable)) = record.subtable(cmap.offset_data()) else {
        panic!("expected a format 4 subtable");
    };
    assert_eq!(subtable.end_code().last().map(|code| code.get()), Some(0xFFFF));
    assert_eq!(font.glyph_id('\u{FFFF}'), None);
}

#[test]
fn position_translates_everything() {
    let font = font();
    let settings = TextSettings::new(glyph_font::UNITS_PER_EM as f32).with_filled(true);
    let offset = [10.0, 20.0, 30.0];
    let base = font.text_mesh("LO D", &settings);
    let moved = font.text_mesh("LO D", &settings.with_position(offset));
    assert_eq!(base.indices, moved.indices);
    assert_eq!(base.advance_width, moved.advance_width);
    assert_eq!(moved.bounds, base.bounds.translate(offset));
    for (b, m) in base.positions().iter().zip(moved.positions()) {
        assert_eq!([b[0] + 10.0, b[1] + 20.0, b[2] + 30.0], *m);
    }
}

#[test]
fn spaces_and_missing_glyphs_advance() {
    let font = font();
    let settings = TextSettings::new(2.0);
    let with_gap = font.text_mesh("A \u{1F600}B", &settings);
    assert_eq!(
        with_gap.advance_width,
        advance(A, 2.0) + 0.5 + 1.0 + advance(B, 2.0)
    );
    let plain = font.text_mesh("AB", &settings);
    assert_eq!(with_gap.indices, plain.indices);
    // a glyph that fails to load is skipped the same way
    let broken = format!("A{SELF_REFERENCE_CHAR}");
    let mesh = font.text_mesh(&broken, &settings);
    assert_eq!(mesh.advance_width, advance(A, 2.0) + 1.0);
    assert_eq!(
        mesh.vertex_count(),
        font.glyph_mesh(A, &settings).unwrap().vertex_count()
    );
}

#[test]
fn empty_text() {
    let font = font();
    let settings = TextSettings::new(1.0).with_position([1.0, 2.0, 3.0]);
    for text in ["", "   ", "\u{FFFF}"] {
        let mesh = font.text_mesh(text, &settings);
        assert!(mesh.is_empty());
        assert_eq!(mesh.bounds.min, [1.0, 2.0, 3.0]);
        assert_eq!(mesh.bounds.max, [1.0, 2.0, 3.0]);
    }
}

#[test]
fn private_use_glyphs() {
    let font = font();
    let settings = TextSettings::new(1.0);
    let text: String = (0..4)
        .filter_map(|i| char::from_u32(PRIVATE_USE_START as u32 + i))
        .collect();
    let mesh = font.text_mesh(&text, &settings);
    let expected = font.text_mesh("OA", &settings);
    assert_eq!(mesh.positions()[..expected.vertex_count()], *expected.positions());
    assert!(mesh.vertex_count() > expected.vertex_count());
}

#[test]
fn cached_layout_matches() {
    let font = font();
    let cache = GlyphMeshCache::new();
    for filled in [false, true] {
        let settings = TextSettings::new(12.0)
            .with_spline_steps(5)
            .with_filled(filled);
        for _ in 0..2 {
            let text = "BOLD AÄ";
            assert_eq!(
                font.text_mesh_cached(text, &settings, &cache),
                font.text_mesh(text, &settings)
            );
        }
    }
    // six distinct glyphs in each fill mode
    assert_eq!(cache.len(), 12);
}

#[test]
fn cache_is_shared_across_threads() {
    let font = font();
    let cache = GlyphMeshCache::new();
    let settings = TextSettings::new(1.0).with_spline_steps(3).with_filled(true);
    let expected = font.text_mesh("BOLD", &settings);
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert_eq!(font.text_mesh_cached("BOLD", &settings, &cache), expected);
            });
        }
    });
    assert_eq!(cache.len(), 4);
}

#[test]
fn missing_cmap_is_tolerated() {
    init_logging();
    let mut builder = glyph_font_builder(false);
    builder.remove(Tag::new(b"cmap"));
    let data = builder.build();
    let font = MeshFont::new(&data).unwrap();
    assert!(!font.charmap().has_map());
    let mesh = font.text_mesh("AB", &TextSettings::new(1.0));
    assert!(mesh.is_empty());
    assert_eq!(mesh.advance_width, 1.0);
    // glyphs can still be meshed by identifier
    assert!(!font
        .glyph_mesh(A, &TextSettings::default())
        .unwrap()
        .is_empty());
}

#[test]
fn required_tables() {
    init_logging();
    for tag in [b"head", b"maxp", b"hhea", b"hmtx", b"loca", b"glyf"] {
        let tag = Tag::new(tag);
        let mut builder = glyph_font_builder(false);
        builder.remove(tag);
        let data = builder.build();
        assert_eq!(
            MeshFont::new(&data).err(),
            Some(MeshError::TableNotFound(tag))
        );
    }
}

#[test]
fn not_a_font() {
    init_logging();
    assert!(matches!(
        MeshFont::new(b"this is not a font"),
        Err(MeshError::MalformedFont(_))
    ));
    assert!(MeshFont::new(&[]).is_err());
}
