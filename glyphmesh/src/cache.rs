//! Memoization of glyph meshes.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use read_outlines::types::GlyphId;

use crate::{GlyphMesh, MeshError, TextSettings};

/// Glyph identifier, font size bits, spline steps and fill mode.
type CacheKey = (GlyphId, u32, u32, bool);

/// A shared cache of glyph meshes keyed by glyph and the settings that
/// affect geometry.
///
/// Entries are never modified once inserted, so the cache can be shared
/// between threads. Meshing is deterministic, which makes it harmless for
/// two threads to compute the same entry; the last one to finish wins.
///
/// A cache must only be used with a single font.
#[derive(Default, Debug)]
pub struct GlyphMeshCache {
    entries: RwLock<HashMap<CacheKey, Arc<GlyphMesh>>>,
}

impl GlyphMeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached mesh for the glyph and settings, computing it with
    /// `make` on a miss.
    ///
    /// Errors are returned to the caller and not cached.
    pub fn get_or_insert(
        &self,
        glyph_id: GlyphId,
        settings: &TextSettings,
        make: impl FnOnce() -> Result<GlyphMesh, MeshError>,
    ) -> Result<Arc<GlyphMesh>, MeshError> {
        let key = (
            glyph_id,
            settings.font_size.to_bits(),
            settings.spline_steps,
            settings.filled,
        );
        let read = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(mesh) = read.get(&key) {
            return Ok(mesh.clone());
        }
        drop(read);
        // std's RwLock can't upgrade a read guard, so compute without
        // holding the lock and race to insert.
        let mesh = Arc::new(make()?);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, mesh.clone());
        Ok(mesh)
    }

    /// Returns the number of cached meshes.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mesh::MeshKind, MeshFont};
    use outline_test_data::glyph_font::{O, SELF_REFERENCE};

    #[test]
    fn computes_once_per_key() {
        let font = MeshFont::new(outline_test_data::glyph_font()).unwrap();
        let cache = GlyphMeshCache::new();
        let settings = TextSettings::new(1.0).with_spline_steps(4);
        let mut calls = 0;
        for _ in 0..3 {
            let mesh = cache
                .get_or_insert(O, &settings, || {
                    calls += 1;
                    font.glyph_mesh(O, &settings)
                })
                .unwrap();
            assert_eq!(mesh.glyph_id, O);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
        // each setting that changes geometry gets its own entry
        let filled = settings.with_filled(true);
        let mesh = cache
            .get_or_insert(O, &filled, || font.glyph_mesh(O, &filled))
            .unwrap();
        assert_eq!(mesh.kind, MeshKind::Filled);
        cache
            .get_or_insert(O, &settings.with_spline_steps(2), || {
                font.glyph_mesh(O, &settings.with_spline_steps(2))
            })
            .unwrap();
        // color does not
        cache
            .get_or_insert(O, &settings.with_color([1.0, 0.0, 0.0, 1.0]), || {
                panic!("should be cached")
            })
            .unwrap();
        assert_eq!(cache.len(), 3);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn errors_are_not_cached() {
        let font = MeshFont::new(outline_test_data::glyph_font()).unwrap();
        let cache = GlyphMeshCache::new();
        let settings = TextSettings::default();
        let result = cache.get_or_insert(SELF_REFERENCE, &settings, || {
            font.glyph_mesh(SELF_REFERENCE, &settings)
        });
        assert_eq!(
            result,
            Err(MeshError::RecursionLimitExceeded(SELF_REFERENCE))
        );
        assert!(cache.is_empty());
    }
}
