//! test data shared between the outline crates.

pub mod bebuffer;
pub mod cmap;
pub mod font;
pub mod glyph;
pub mod glyph_font;
pub mod tables;

pub use glyph_font::{glyph_font, glyph_font_long_loca};

/// An optional real-world font used for the end-to-end text scenario.
///
/// The file is not redistributed with the repository; tests that want it
/// skip themselves when it is missing.
pub fn raleway_regular() -> Option<Vec<u8>> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/fonts/Raleway-Regular.ttf");
    std::fs::read(path).ok()
}
