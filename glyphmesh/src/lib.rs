//! Turns TrueType glyph outlines into meshes for a 3D renderer.
//!
//! Glyphmesh sits on top of [`read-outlines`](read_outlines), which parses
//! the handful of tables involved, and produces either line wireframes or
//! filled triangle meshes for strings of text. Holes are handled by
//! containment so the stored winding of a font's contours does not matter.
//!
//! # Example
//!
//! ```no_run
//! # let font_data: Vec<u8> = Vec::new();
//! use glyphmesh::{MeshFont, TextSettings};
//!
//! let font = MeshFont::new(&font_data).expect("not a usable TrueType font");
//! let settings = TextSettings::new(24.0).with_spline_steps(8).with_filled(true);
//! let mesh = font.text_mesh("Hello", &settings);
//! println!("{} triangles", mesh.indices.len() / 3);
//! ```
//!
//! Meshing never panics on malformed input. Errors for a single glyph are
//! returned from [`MeshFont::glyph_mesh`], while [`MeshFont::text_mesh`]
//! logs them and leaves a gap in the line.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]

/// Expose our "raw" underlying parser crate.
pub extern crate read_outlines as raw;

mod cache;
mod charmap;
mod decycler;
mod error;
mod font;
mod mesh;
mod metrics;
pub mod outline;
mod settings;
pub mod triangulate;

pub use cache::GlyphMeshCache;
pub use charmap::{Charmap, MappingKind, Mappings};
pub use error::MeshError;
pub use font::MeshFont;
pub use mesh::{Bounds, GlyphMesh, MeshKind, TextMesh};
pub use metrics::{GlyphMetrics, Metrics};
pub use settings::TextSettings;
pub use triangulate::{triangulate, Triangulation};

/// Type for a glyph identifier.
pub type GlyphId = read_outlines::types::GlyphId;
