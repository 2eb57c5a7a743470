//! Two-level sparse glyph table for a single font signature.
//!
//! Port of the indexing half of C++ `font_cache` (`agg_font_cache_manager.h`):
//! glyphs are addressed by `(code >> 8, code & 0xFF)` into a 256x256 sparse
//! table, with second-level pages allocated lazily. Unlike the C++ original,
//! each glyph's serialized bytes live in their own `Vec<u8>` rather than a
//! shared block allocator — dropping a `FontCache` frees every glyph buffer
//! it owns in one pass, which is the property the C++ block allocator exists
//! to provide.

use crate::font_engine::GlyphDataType;
use crate::basics::Rect;

/// A single cached, serialized glyph.
#[derive(Debug, Clone)]
pub struct GlyphCache {
    pub glyph_index: u32,
    pub data: Vec<u8>,
    pub data_type: GlyphDataType,
    pub bounds: Rect<i32>,
    pub advance_x: f64,
    pub advance_y: f64,
}

impl GlyphCache {
    pub fn data_size(&self) -> usize {
        self.data.len()
    }
}

const PAGE_SIZE: usize = 256;

type Page = Box<[Option<GlyphCache>; PAGE_SIZE]>;

fn empty_page() -> Page {
    // `Option<GlyphCache>` isn't `Copy`, so build the array without relying
    // on `[None; N]` shorthand.
    let v: Vec<Option<GlyphCache>> = (0..PAGE_SIZE).map(|_| None).collect();
    v.into_boxed_slice().try_into().unwrap_or_else(|_| unreachable!())
}

/// Glyph cache for one `(font, height, hinting, flip_y, scale_x)` combination.
///
/// Entries are addressed by splitting a `u32` char/glyph code into a high
/// byte (page index) and low byte (slot within the page). Pages are
/// allocated on first insert, so sparse codepoint ranges (e.g. a handful of
/// CJK glyphs) don't force allocation of the full 65536-slot table.
pub struct FontCache {
    signature: String,
    pages: Vec<Option<Page>>,
}

impl FontCache {
    pub fn new(signature: String) -> Self {
        let mut pages = Vec::with_capacity(PAGE_SIZE);
        pages.resize_with(PAGE_SIZE, || None);
        Self { signature, pages }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    #[inline]
    fn split(code: u32) -> (usize, usize) {
        (((code >> 8) & 0xFF) as usize, (code & 0xFF) as usize)
    }

    /// O(1) lookup; no allocation on miss.
    pub fn find_glyph(&self, code: u32) -> Option<&GlyphCache> {
        let (hi, lo) = Self::split(code);
        self.pages[hi].as_ref()?[lo].as_ref()
    }

    /// Insert a glyph at `code`'s slot. Does nothing and returns `None` if
    /// that slot is already occupied (re-caching does not overwrite);
    /// otherwise inserts and returns a reference to the stored entry.
    pub fn cache_glyph(&mut self, code: u32, glyph: GlyphCache) -> Option<&GlyphCache> {
        let (hi, lo) = Self::split(code);
        let page = self.pages[hi].get_or_insert_with(empty_page);
        if page[lo].is_some() {
            return None;
        }
        page[lo] = Some(glyph);
        page[lo].as_ref()
    }

    /// Drop all pages, freeing every glyph buffer at once.
    pub fn clear(&mut self) {
        for page in &mut self.pages {
            *page = None;
        }
    }
}
