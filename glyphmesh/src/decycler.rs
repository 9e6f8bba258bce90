//! Cycle detection for composite glyph traversal.

use core::ops::{Deref, DerefMut};

use read_outlines::types::GlyphId;

/// Maximum nesting of composite glyph components.
pub(crate) const MAX_COMPONENT_DEPTH: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DecyclerError {
    DepthLimitExceeded,
    CycleDetected,
}

/// The chain of glyphs from the root of a composite down to the component
/// currently being loaded.
///
/// A glyph may appear any number of times in the tree (the same dot under
/// two accents) but never twice on one path from the root.
#[derive(Default)]
pub(crate) struct GlyphDecycler {
    chain: [GlyphId; MAX_COMPONENT_DEPTH],
    len: usize,
}

impl GlyphDecycler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a glyph onto the chain.
    ///
    /// The returned guard pops it again when dropped and derefs to the
    /// decycler so it can be handed to the traversal of the glyph's
    /// components.
    pub fn enter(&mut self, glyph_id: GlyphId) -> Result<ComponentGuard<'_>, DecyclerError> {
        if self.ancestors().contains(&glyph_id) {
            return Err(DecyclerError::CycleDetected);
        }
        let slot = self
            .chain
            .get_mut(self.len)
            .ok_or(DecyclerError::DepthLimitExceeded)?;
        *slot = glyph_id;
        self.len += 1;
        Ok(ComponentGuard { decycler: self })
    }

    fn ancestors(&self) -> &[GlyphId] {
        &self.chain[..self.len]
    }
}

pub(crate) struct ComponentGuard<'a> {
    decycler: &'a mut GlyphDecycler,
}

impl Deref for ComponentGuard<'_> {
    type Target = GlyphDecycler;

    fn deref(&self) -> &Self::Target {
        self.decycler
    }
}

impl DerefMut for ComponentGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.decycler
    }
}

impl Drop for ComponentGuard<'_> {
    fn drop(&mut self) {
        self.decycler.len -= 1;
    }
}
