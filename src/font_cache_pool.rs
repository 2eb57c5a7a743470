//! Bounded, FIFO-evicting pool of `FontCache` entries.
//!
//! Port of the "multiple font instances share one manager" half of C++
//! `font_cache_manager` — each distinct font signature (face + height +
//! hinting + flip_y + scale_x) gets its own `FontCache`; once the pool is
//! full, the oldest entry is evicted to make room for a new signature.

use crate::font_cache_table::FontCache;

/// Default capacity, matching the upstream manager's default.
pub const DEFAULT_CAPACITY: usize = 32;

/// Bounded pool of `FontCache`s, indexed by insertion order.
///
/// Eviction is FIFO: when a new signature arrives and the pool is already
/// at capacity, the entry at index 0 (the oldest) is dropped and the rest
/// shift down. This matches the "evict the least-recently-added" semantics
/// the glyph-cache manager relies on for its change-of-height test scenario.
pub struct FontCachePool {
    capacity: usize,
    caches: Vec<FontCache>,
}

impl FontCachePool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            caches: Vec::new(),
        }
    }

    pub fn find(&self, signature: &str) -> Option<&FontCache> {
        self.caches.iter().find(|c| c.signature() == signature)
    }

    pub fn find_mut(&mut self, signature: &str) -> Option<&mut FontCache> {
        self.caches.iter_mut().find(|c| c.signature() == signature)
    }

    /// Return the cache for `signature`, creating (and possibly evicting
    /// the oldest entry) if it doesn't exist yet.
    pub fn get_or_create(&mut self, signature: &str) -> &mut FontCache {
        if let Some(idx) = self.caches.iter().position(|c| c.signature() == signature) {
            return &mut self.caches[idx];
        }

        if self.caches.len() >= self.capacity {
            let evicted = self.caches.remove(0);
            log::debug!(
                "FontCachePool: evicting font cache \"{}\" (pool at capacity {})",
                evicted.signature(),
                self.capacity
            );
        }

        self.caches.push(FontCache::new(signature.to_string()));
        self.caches.last_mut().unwrap()
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for FontCachePool {
    fn default() -> Self {
        Self::new()
    }
}
