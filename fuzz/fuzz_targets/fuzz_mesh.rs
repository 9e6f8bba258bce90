#![no_main]
use std::error::Error;

use glyphmesh::{GlyphId, MeshFont, TextSettings};
use libfuzzer_sys::{
    arbitrary::{self, Arbitrary},
    fuzz_target,
};

/// Spline steps are capped to keep each run short.
const MAX_SPLINE_STEPS: u32 = 32;

/// Meshing request with the font bytes and the geometry settings.
#[derive(Arbitrary, Debug)]
struct MeshRequest<'a> {
    font_size: f32,
    spline_steps: u8,
    filled: bool,
    text: &'a str,
    font_data: &'a [u8],
}

fn do_mesh_things(request: MeshRequest) -> Result<(), Box<dyn Error>> {
    let font = MeshFont::new(request.font_data)?;
    let settings = TextSettings::new(request.font_size)
        .with_spline_steps(request.spline_steps as u32 % (MAX_SPLINE_STEPS + 1))
        .with_filled(request.filled);

    let mesh = font.text_mesh(request.text, &settings);
    assert!(mesh
        .indices
        .iter()
        .all(|i| (*i as usize) < mesh.vertex_count()));

    let glyph_count = font.glyph_metrics().glyph_count().min(64);
    for gid in 0..glyph_count {
        let _ = font.glyph_mesh(GlyphId::new(gid as u16), &settings);
    }
    Ok(())
}

fuzz_target!(|request: MeshRequest| {
    let _ = do_mesh_things(request);
});
