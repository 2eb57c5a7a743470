//! Glyph cache manager and glyph-replay adaptors.
//!
//! Port of the C++ `font_cache_manager<FontEngine>` concept, generalized
//! over `FontEngineApi` and backed by [`FontCachePool`]/[`FontCache`] so
//! multiple font signatures (face/height/hinting/flip_y/scale_x
//! combinations) can be resident at once, each addressed independently and
//! evicted in FIFO order once the pool is full.
//!
//! Copyright (c) 2025. BSD-3-Clause License.

use crate::basics::{is_vertex, VertexSource, PATH_CMD_STOP};
use crate::font_cache_pool::FontCachePool;
use crate::font_cache_table::GlyphCache;
use crate::font_engine::{FontEngineApi, GlyphDataType};
use crate::scanline_storage_aa::SerializedScanlinesAdaptorAa;
use crate::scanline_storage_bin::SerializedScanlinesAdaptorBin;
use std::ops::RangeInclusive;

// ============================================================================
// GlyphPathAdaptor — VertexSource for a cached outline glyph
// ============================================================================

/// Replays a cached glyph outline as an AGG vertex source.
///
/// Equivalent of C++ `serialized_integer_path_adaptor` — decodes an
/// outline glyph's serialized vertex bytes and replays them translated to a
/// given (x, y) origin.
pub struct GlyphPathAdaptor {
    vertices: Vec<(f64, f64, u32)>,
    vertex_idx: usize,
    offset_x: f64,
    offset_y: f64,
}

impl GlyphPathAdaptor {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            vertex_idx: 0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Initialize the adaptor with a glyph's serialized outline bytes, to be
    /// replayed at (x, y). This is the Rust equivalent of C++
    /// `init_embedded_adaptors(glyph, x, y)`.
    pub fn init(&mut self, data: &[u8], x: f64, y: f64) {
        self.vertices.clear();
        self.vertices.extend(decode_outline(data));
        self.offset_x = x;
        self.offset_y = y;
        self.vertex_idx = 0;
    }
}

impl Default for GlyphPathAdaptor {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for GlyphPathAdaptor {
    fn rewind(&mut self, _path_id: u32) {
        self.vertex_idx = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.vertex_idx < self.vertices.len() {
            let (vx, vy, cmd) = self.vertices[self.vertex_idx];
            self.vertex_idx += 1;
            if is_vertex(cmd) {
                *x = vx + self.offset_x;
                *y = vy + self.offset_y;
            } else {
                *x = 0.0;
                *y = 0.0;
            }
            cmd
        } else {
            PATH_CMD_STOP
        }
    }
}

/// Serialized outline encoding written by `FontEngineApi::write_glyph_to`:
/// 9 bytes per vertex (f32 x, f32 y, u8 cmd). Crate-internal; degrades by
/// truncating at the last complete vertex rather than panicking.
fn decode_outline(data: &[u8]) -> Vec<(f64, f64, u32)> {
    let mut out = Vec::with_capacity(data.len() / 9);
    let mut chunks = data.chunks_exact(9);
    for chunk in &mut chunks {
        let x = f32::from_le_bytes(chunk[0..4].try_into().unwrap()) as f64;
        let y = f32::from_le_bytes(chunk[4..8].try_into().unwrap()) as f64;
        let cmd = chunk[8] as u32;
        out.push((x, y, cmd));
    }
    if !chunks.remainder().is_empty() {
        log::warn!("GlyphPathAdaptor: dropping {} trailing malformed bytes", chunks.remainder().len());
    }
    out
}

// ============================================================================
// GlyphCacheManager
// ============================================================================

/// Which replay adaptor the manager last prepared for a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ActiveMode {
    #[default]
    None,
    Path,
    Mono,
    Gray8,
}

/// Caches serialized glyphs keyed by font signature and character code, and
/// hands back the right replay adaptor for each glyph's data type.
///
/// Generalized port of C++ `font_cache_manager<FontEngine>` over
/// [`FontEngineApi`]. Owns its engine by value: the manager's lifetime
/// bounds the engine's lifetime, which trivially satisfies the upstream
/// contract that cache teardown never reaches back into engine teardown
/// (there is no such special case to preserve).
pub struct GlyphCacheManager<E: FontEngineApi> {
    engine: E,
    pool: FontCachePool,
    observed_stamp: u64,
    /// (char_code, glyph_index) of the glyph before the most recently
    /// looked-up one, used for kerning.
    prev_glyph: Option<(u32, u32)>,
    last_glyph: Option<(u32, u32)>,
    path_adaptor: GlyphPathAdaptor,
    mono_buf: Vec<u8>,
    gray8_buf: Vec<u8>,
    active_mode: ActiveMode,
}

impl<E: FontEngineApi> GlyphCacheManager<E> {
    pub fn new(engine: E) -> Self {
        let observed_stamp = engine.change_stamp();
        let mut pool = FontCachePool::new();
        pool.get_or_create(&engine.font_signature());
        Self {
            engine,
            pool,
            observed_stamp,
            prev_glyph: None,
            last_glyph: None,
            path_adaptor: GlyphPathAdaptor::new(),
            mono_buf: Vec::new(),
            gray8_buf: Vec::new(),
            active_mode: ActiveMode::None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the engine, for changing height/hinting/flip_y/
    /// scale_x. The next `glyph()` call notices the resulting change in
    /// `change_stamp()` and switches to (or creates) the matching cache.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Re-synchronize the active `FontCache` with the engine's current
    /// signature, recreating it if the signature changed since the last
    /// `glyph()` call.
    fn sync(&mut self) {
        let stamp = self.engine.change_stamp();
        if stamp != self.observed_stamp {
            self.pool.get_or_create(&self.engine.font_signature());
            self.prev_glyph = None;
            self.last_glyph = None;
            self.observed_stamp = stamp;
        }
    }

    /// Clear the current font's cached glyphs and kerning state, without
    /// discarding other signatures resident in the pool.
    pub fn reset_cache(&mut self) {
        self.sync();
        let signature = self.engine.font_signature();
        self.pool.get_or_create(&signature).clear();
        self.prev_glyph = None;
        self.last_glyph = None;
    }

    /// Reset kerning state only (call at the start of a new text run).
    pub fn reset_last_glyph(&mut self) {
        self.prev_glyph = None;
        self.last_glyph = None;
    }

    /// Get a cached glyph, preparing and inserting it on first access.
    /// Returns `None` if the character has no glyph in this font — the
    /// cache and kerning state are left untouched on miss.
    pub fn glyph(&mut self, char_code: u32) -> Option<&GlyphCache> {
        self.sync();
        let signature = self.engine.font_signature();
        let cache = self.pool.get_or_create(&signature);

        if cache.find_glyph(char_code).is_none() {
            if !self.engine.prepare_glyph(char_code) {
                log::trace!("GlyphCacheManager: no glyph for code {char_code}");
                return None;
            }
            let mut data = vec![0u8; self.engine.data_size()];
            self.engine.write_glyph_to(&mut data);
            let entry = GlyphCache {
                glyph_index: self.engine.glyph_index(),
                data,
                data_type: self.engine.data_type(),
                bounds: self.engine.bounds(),
                advance_x: self.engine.advance_x(),
                advance_y: self.engine.advance_y(),
            };
            cache.cache_glyph(char_code, entry);
            log::trace!("GlyphCacheManager: cached new glyph for code {char_code}");
        } else {
            log::trace!("GlyphCacheManager: cache hit for code {char_code}");
        }

        let glyph = cache.find_glyph(char_code)?;
        self.prev_glyph = self.last_glyph;
        self.last_glyph = Some((char_code, glyph.glyph_index));
        Some(glyph)
    }

    /// Accumulate kerning between the previously looked-up glyph and the
    /// current one into `(x, y)`. No-op unless both are known.
    pub fn add_kerning(&mut self, x: &mut f64, y: &mut f64) {
        if let (Some((_, prev_idx)), Some((_, cur_idx))) = (self.prev_glyph, self.last_glyph) {
            let (dx, dy) = self.engine.add_kerning(prev_idx, cur_idx);
            *x += dx;
            *y += dy;
        }
    }

    /// Prefetch every glyph in `range`, discarding the results. Useful to
    /// warm the cache before a render pass that must not stall on misses.
    pub fn precache(&mut self, range: RangeInclusive<u32>) {
        for code in range {
            self.glyph(code);
        }
    }

    /// Prepare the replay adaptor matching `char_code`'s cached glyph's
    /// data type, translated to (x, y). Does nothing if the glyph isn't
    /// cached yet (call `glyph()` first).
    pub fn init_embedded_adaptors(&mut self, char_code: u32, x: f64, y: f64) {
        let signature = self.engine.font_signature();
        let Some(cache) = self.pool.find(&signature) else {
            return;
        };
        let Some(glyph) = cache.find_glyph(char_code) else {
            return;
        };
        match glyph.data_type {
            GlyphDataType::Outline => {
                self.path_adaptor.init(&glyph.data, x, y);
                self.active_mode = ActiveMode::Path;
            }
            GlyphDataType::Mono => {
                self.mono_buf.clear();
                self.mono_buf.extend_from_slice(&glyph.data);
                self.active_mode = ActiveMode::Mono;
            }
            GlyphDataType::Gray8 => {
                self.gray8_buf.clear();
                self.gray8_buf.extend_from_slice(&glyph.data);
                self.active_mode = ActiveMode::Gray8;
            }
            GlyphDataType::Invalid => {
                self.active_mode = ActiveMode::None;
            }
        }
    }

    /// Outline vertex source for the glyph last prepared by
    /// `init_embedded_adaptors`, valid when its data type was `Outline`.
    pub fn path_adaptor(&mut self) -> &mut GlyphPathAdaptor {
        &mut self.path_adaptor
    }

    /// Binary (non-AA) scanline adaptor for the glyph last prepared by
    /// `init_embedded_adaptors`, valid when its data type was `Mono`.
    pub fn mono_adaptor(&self) -> Option<SerializedScanlinesAdaptorBin<'_>> {
        if self.active_mode != ActiveMode::Mono {
            return None;
        }
        SerializedScanlinesAdaptorBin::new(&self.mono_buf)
    }

    /// Anti-aliased scanline adaptor for the glyph last prepared by
    /// `init_embedded_adaptors`, valid when its data type was `Gray8`.
    pub fn gray8_adaptor(&self) -> Option<SerializedScanlinesAdaptorAa<'_>> {
        if self.active_mode != ActiveMode::Gray8 {
            return None;
        }
        SerializedScanlinesAdaptorAa::new(&self.gray8_buf)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{is_stop, is_vertex, Rect, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO};

    #[test]
    fn test_glyph_path_adaptor_empty() {
        let mut adaptor = GlyphPathAdaptor::new();
        adaptor.rewind(0);
        let (mut x, mut y) = (0.0, 0.0);
        assert!(is_stop(adaptor.vertex(&mut x, &mut y)));
    }

    fn encode(vertices: &[(f64, f64, u32)]) -> Vec<u8> {
        let mut buf = Vec::new();
        for &(x, y, cmd) in vertices {
            buf.extend_from_slice(&(x as f32).to_le_bytes());
            buf.extend_from_slice(&(y as f32).to_le_bytes());
            buf.push(cmd as u8);
        }
        buf
    }

    #[test]
    fn test_glyph_path_adaptor_offset() {
        let mut adaptor = GlyphPathAdaptor::new();
        let data = encode(&[
            (10.0, 20.0, PATH_CMD_MOVE_TO),
            (30.0, 40.0, PATH_CMD_LINE_TO),
        ]);
        adaptor.init(&data, 100.0, 200.0);

        let (mut x, mut y) = (0.0, 0.0);
        let cmd = adaptor.vertex(&mut x, &mut y);
        assert!(is_vertex(cmd));
        assert!((x - 110.0).abs() < 1e-4);
        assert!((y - 220.0).abs() < 1e-4);

        let cmd = adaptor.vertex(&mut x, &mut y);
        assert!(is_vertex(cmd));
        assert!((x - 130.0).abs() < 1e-4);
        assert!((y - 240.0).abs() < 1e-4);

        assert!(is_stop(adaptor.vertex(&mut x, &mut y)));
    }

    #[test]
    fn test_glyph_path_adaptor_rewind() {
        let mut adaptor = GlyphPathAdaptor::new();
        let data = encode(&[(5.0, 10.0, PATH_CMD_MOVE_TO)]);
        adaptor.init(&data, 0.0, 0.0);

        let (mut x, mut y) = (0.0, 0.0);
        adaptor.vertex(&mut x, &mut y);
        adaptor.rewind(0);
        let cmd = adaptor.vertex(&mut x, &mut y);
        assert!(is_vertex(cmd));
        assert!((x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn decode_outline_drops_trailing_garbage() {
        let mut data = encode(&[(1.0, 2.0, PATH_CMD_MOVE_TO)]);
        data.push(0xFF);
        data.push(0xFF);
        let vertices = decode_outline(&data);
        assert_eq!(vertices.len(), 1);
    }

    /// Fake engine for exercising `GlyphCacheManager` without a real font.
    struct FakeEngine {
        height: f64,
        stamp: u64,
        current_code: Option<u32>,
        known: Vec<u32>,
    }

    impl FakeEngine {
        fn new(known: Vec<u32>) -> Self {
            Self {
                height: 12.0,
                stamp: 0,
                current_code: None,
                known,
            }
        }

        fn set_height(&mut self, h: f64) {
            self.height = h;
            self.stamp += 1;
        }
    }

    impl FontEngineApi for FakeEngine {
        fn font_signature(&self) -> String {
            format!("fake-{:.1}", self.height)
        }
        fn change_stamp(&self) -> u64 {
            self.stamp
        }
        fn prepare_glyph(&mut self, code: u32) -> bool {
            if self.known.contains(&code) {
                self.current_code = Some(code);
                true
            } else {
                self.current_code = None;
                false
            }
        }
        fn glyph_index(&self) -> u32 {
            self.current_code.unwrap_or(0)
        }
        fn data_size(&self) -> usize {
            9
        }
        fn data_type(&self) -> GlyphDataType {
            GlyphDataType::Outline
        }
        fn bounds(&self) -> Rect<i32> {
            Rect::new(0, 0, 10, 10)
        }
        fn advance_x(&self) -> f64 {
            8.0
        }
        fn advance_y(&self) -> f64 {
            0.0
        }
        fn write_glyph_to(&self, buf: &mut [u8]) {
            buf[0..4].copy_from_slice(&0.0f32.to_le_bytes());
            buf[4..8].copy_from_slice(&0.0f32.to_le_bytes());
            buf[8] = PATH_CMD_MOVE_TO as u8;
        }
        fn outline_vertices(&self) -> &[(f64, f64, u32)] {
            &[]
        }
        fn add_kerning(&self, _a: u32, _b: u32) -> (f64, f64) {
            (-1.0, 0.0)
        }
    }

    #[test]
    fn glyph_caches_on_first_access_and_hits_on_second() {
        let mut mgr = GlyphCacheManager::new(FakeEngine::new(vec![65]));
        assert!(mgr.glyph(65).is_some());
        assert!(mgr.glyph(65).is_some());
    }

    #[test]
    fn glyph_miss_leaves_kerning_state_untouched() {
        let mut mgr = GlyphCacheManager::new(FakeEngine::new(vec![65]));
        mgr.glyph(65);
        assert!(mgr.glyph(999).is_none());
        // prev/last glyph state from the successful lookup survives a miss.
        let mut x = 0.0;
        let mut y = 0.0;
        mgr.add_kerning(&mut x, &mut y);
        assert_eq!(x, 0.0); // only one successful glyph so far, no pair yet
    }

    #[test]
    fn add_kerning_accumulates_between_successive_glyphs() {
        let mut mgr = GlyphCacheManager::new(FakeEngine::new(vec![65, 66]));
        mgr.glyph(65);
        mgr.glyph(66);
        let mut x = 0.0;
        let mut y = 0.0;
        mgr.add_kerning(&mut x, &mut y);
        assert_eq!(x, -1.0);
    }

    #[test]
    fn s6_changing_height_switches_cache_and_respects_pool_capacity() {
        let mut mgr = GlyphCacheManager::new(FakeEngine::new(vec![65]));
        mgr.glyph(65);
        assert_eq!(mgr.pool.len(), 1);

        mgr.engine_mut().set_height(24.0);
        mgr.glyph(65); // forces sync() to create the new-signature cache
        assert_eq!(mgr.pool.len(), 2);
    }

    #[test]
    fn reset_cache_clears_current_signature_only() {
        let mut mgr = GlyphCacheManager::new(FakeEngine::new(vec![65]));
        mgr.glyph(65);
        mgr.reset_cache();
        // Cache cleared, but glyph() must still be able to re-populate it.
        assert!(mgr.glyph(65).is_some());
    }

    #[test]
    fn init_embedded_adaptors_drives_path_adaptor() {
        let mut mgr = GlyphCacheManager::new(FakeEngine::new(vec![65]));
        mgr.glyph(65);
        mgr.init_embedded_adaptors(65, 50.0, 60.0);
        let (mut x, mut y) = (0.0, 0.0);
        let cmd = mgr.path_adaptor().vertex(&mut x, &mut y);
        assert!(is_vertex(cmd));
        assert!((x - 50.0).abs() < 1e-4);
        assert!((y - 60.0).abs() < 1e-4);
    }
}
