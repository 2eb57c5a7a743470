//! TrueType font engine using `ttf-parser`.
//!
//! Port of the C++ `font_engine_freetype_base` concept, using `ttf-parser`
//! instead of FreeType. Provides glyph outline extraction and metrics, and
//! implements `FontEngineApi`, the surface `GlyphCacheManager` drives.
//!
//! Copyright (c) 2025. BSD-3-Clause License.
//! Updated 2025 for LCD subpixel rendering support (scale_x).

use crate::basics::{
    Rect, PATH_CMD_CURVE3, PATH_CMD_CURVE4, PATH_CMD_END_POLY, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO,
    PATH_FLAGS_CLOSE,
};
use crate::error::VectorRasterError;

/// Glyph data types matching C++ `glyph_data_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphDataType {
    Invalid = 0,
    Mono = 1,
    Gray8 = 2,
    Outline = 3,
}

/// Prepared glyph data: outline vertices and metrics.
#[derive(Debug, Clone)]
pub struct GlyphData {
    /// Glyph index within the font.
    pub glyph_index: u16,
    /// Glyph data type (always Outline for this engine).
    pub data_type: GlyphDataType,
    /// Bounding box in scaled coordinates.
    pub bounds: Rect<i32>,
    /// Horizontal advance in scaled coordinates.
    pub advance_x: f64,
    /// Vertical advance in scaled coordinates (usually 0 for horizontal text).
    pub advance_y: f64,
    /// Outline vertices as (x, y, cmd) tuples.
    /// Commands use AGG path constants: PATH_CMD_MOVE_TO, PATH_CMD_LINE_TO,
    /// PATH_CMD_CURVE3, PATH_CMD_CURVE4, PATH_CMD_END_POLY|PATH_FLAGS_CLOSE.
    pub outline: Vec<(f64, f64, u32)>,
}

/// The surface `GlyphCacheManager` drives to prepare and serialize glyphs.
///
/// Separated from `FontEngine` so the manager can be tested against a fake
/// engine without a real font file, and so a future non-outline engine
/// (e.g. one that rasterizes eagerly to Mono/Gray8) can plug into the same
/// cache machinery.
pub trait FontEngineApi {
    /// Identifies the current (font, height, hinting, flip_y, scale_x)
    /// combination. Changing any rendering parameter must change this.
    fn font_signature(&self) -> String;

    /// Monotonically increasing counter, bumped by every setter that
    /// invalidates previously-prepared glyphs.
    fn change_stamp(&self) -> u64;

    /// Prepare `char_code`'s glyph. Returns `false` if the font has no
    /// mapping for it.
    fn prepare_glyph(&mut self, char_code: u32) -> bool;

    fn glyph_index(&self) -> u32;
    fn data_size(&self) -> usize;
    fn data_type(&self) -> GlyphDataType;
    fn bounds(&self) -> Rect<i32>;
    fn advance_x(&self) -> f64;
    fn advance_y(&self) -> f64;

    /// Write the last-prepared glyph's serialized form into `buf`, which
    /// must be at least `data_size()` bytes.
    fn write_glyph_to(&self, buf: &mut [u8]);

    /// Outline vertices of the last-prepared glyph, valid only when
    /// `data_type() == GlyphDataType::Outline`.
    fn outline_vertices(&self) -> &[(f64, f64, u32)];

    fn add_kerning(&self, glyph1: u32, glyph2: u32) -> (f64, f64);
}

/// TrueType font engine.
///
/// Loads a TTF/OTF font from raw bytes and extracts glyph outlines and metrics.
/// This is the Rust equivalent of C++ `font_engine_freetype_base`, using
/// `ttf-parser` instead of FreeType.
pub struct FontEngine {
    /// Owned font data bytes.
    face_data: Vec<u8>,
    /// Font face index (for font collections).
    face_index: u32,
    /// Desired em-height in pixels.
    height: f64,
    /// Horizontal scale factor applied to glyph outlines and advance values.
    ///
    /// Used for LCD subpixel rendering: set to `subpixel_scale` (3 for LCD, 1 for
    /// grayscale) to stretch glyph outlines horizontally. Matches C++
    /// `font_engine_win32_tt_base::scale_x()`.
    scale_x: f64,
    /// Whether to flip Y coordinates (for screen coordinate systems where y=0 is top).
    flip_y: bool,
    /// Whether hinting is enabled (informational; ttf-parser doesn't apply hinting).
    hinting: bool,
    /// Bumped by every setter below. Drives `GlyphCacheManager`'s cache-switch logic.
    stamp: u64,
    /// Last glyph prepared by `prepare_glyph`, if any.
    current: Option<GlyphData>,
}

impl FontEngine {
    /// Create a font engine from raw TTF/OTF data.
    ///
    /// Validates that the data contains a parseable font face.
    /// `face_index` selects the face in a font collection (use 0 for single fonts).
    pub fn from_data(data: Vec<u8>, face_index: u32) -> Result<Self, VectorRasterError> {
        ttf_parser::Face::parse(&data, face_index)
            .map_err(|e| VectorRasterError::Font(format!("{e:?}")))?;

        Ok(Self {
            face_data: data,
            face_index,
            height: 12.0,
            scale_x: 1.0,
            flip_y: false,
            hinting: false,
            stamp: 0,
            current: None,
        })
    }

    /// Set the em-height in pixels.
    pub fn set_height(&mut self, h: f64) {
        self.height = h;
        self.stamp += 1;
    }

    /// Get the current em-height in pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Set whether to flip Y coordinates.
    ///
    /// When true, Y coordinates are negated so that y increases downward
    /// (matching screen coordinate systems). When false (default), Y coordinates
    /// follow the font's native upward direction.
    pub fn set_flip_y(&mut self, flip: bool) {
        self.flip_y = flip;
        self.stamp += 1;
    }

    /// Get the flip_y setting.
    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    /// Set hinting (informational only — ttf-parser doesn't apply hinting).
    pub fn set_hinting(&mut self, h: bool) {
        self.hinting = h;
        self.stamp += 1;
    }

    /// Get hinting setting.
    pub fn hinting(&self) -> bool {
        self.hinting
    }

    /// Set horizontal scale factor for glyph outlines.
    ///
    /// This scales X coordinates and advance_x of all glyphs. Used for LCD
    /// subpixel rendering where glyphs are stretched 3x horizontally.
    /// Matches C++ `font_engine_win32_tt_base::scale_x()`.
    pub fn set_scale_x(&mut self, s: f64) {
        self.scale_x = s;
        self.stamp += 1;
    }

    /// Get the current horizontal scale factor.
    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    /// Get the ascender in scaled coordinates.
    pub fn ascender(&self) -> f64 {
        let face = self.face();
        let scale = self.scale(&face);
        face.ascender() as f64 * scale
    }

    /// Get the descender in scaled coordinates (typically negative).
    pub fn descender(&self) -> f64 {
        let face = self.face();
        let scale = self.scale(&face);
        face.descender() as f64 * scale
    }

    /// Get the units-per-em value.
    pub fn units_per_em(&self) -> u16 {
        self.face().units_per_em()
    }

    /// Prepare a glyph: extract its outline and metrics.
    ///
    /// Returns `None` only if the character code is invalid or has no mapping
    /// in this font's cmap table. Characters like spaces that have a valid
    /// glyph but no outline will return `Some(GlyphData)` with an empty
    /// outline and `data_type == GlyphDataType::Invalid`, but valid `advance_x`.
    /// This matches C++ behavior where `glyph_cache` always has advance values
    /// even for non-outline glyphs.
    pub fn prepare_glyph_data(&self, char_code: u32) -> Option<GlyphData> {
        let ch = char::from_u32(char_code)?;
        let face = self.face();
        let glyph_id = face.glyph_index(ch)?;
        let scale = self.scale(&face);

        let advance_x = face
            .glyph_hor_advance(glyph_id)
            .map(|a| a as f64 * scale * self.scale_x)
            .unwrap_or(0.0);

        let mut builder = OutlineCollector::new(scale, self.flip_y, self.scale_x);
        let bbox_opt = face.outline_glyph(glyph_id, &mut builder);

        let (data_type, bounds) = if let Some(bbox) = bbox_opt {
            let y_sign = if self.flip_y { -1.0 } else { 1.0 };
            (
                GlyphDataType::Outline,
                Rect::new(
                    (bbox.x_min as f64 * scale * self.scale_x) as i32,
                    (bbox.y_min as f64 * scale * y_sign) as i32,
                    (bbox.x_max as f64 * scale * self.scale_x) as i32,
                    (bbox.y_max as f64 * scale * y_sign) as i32,
                ),
            )
        } else {
            (GlyphDataType::Invalid, Rect::new(0, 0, 0, 0))
        };

        Some(GlyphData {
            glyph_index: glyph_id.0,
            data_type,
            bounds,
            advance_x,
            advance_y: 0.0,
            outline: builder.vertices,
        })
    }

    /// Get kerning between two glyph indices in scaled coordinates.
    ///
    /// Returns the horizontal kerning adjustment, or 0.0 if no kerning data.
    pub fn kerning(&self, first_glyph: u16, second_glyph: u16) -> f64 {
        let face = self.face();
        let scale = self.scale(&face);
        let first = ttf_parser::GlyphId(first_glyph);
        let second = ttf_parser::GlyphId(second_glyph);

        if let Some(kern) = face.tables().kern {
            for subtable in kern.subtables {
                if subtable.horizontal && !subtable.has_cross_stream {
                    if let Some(value) = subtable.glyphs_kerning(first, second) {
                        return value as f64 * scale;
                    }
                }
            }
        }

        0.0
    }

    // -- Internal helpers --

    /// Create a temporary Face from the stored data.
    fn face(&self) -> ttf_parser::Face<'_> {
        // Safe: we validated the data in from_data()
        ttf_parser::Face::parse(&self.face_data, self.face_index).unwrap()
    }

    /// Compute the scale factor: height / units_per_em.
    fn scale(&self, face: &ttf_parser::Face<'_>) -> f64 {
        self.height / face.units_per_em() as f64
    }
}

impl FontEngineApi for FontEngine {
    fn font_signature(&self) -> String {
        format!(
            "{:.3}-{}-{}-{:.3}",
            self.height, self.hinting, self.flip_y, self.scale_x
        )
    }

    fn change_stamp(&self) -> u64 {
        self.stamp
    }

    fn prepare_glyph(&mut self, char_code: u32) -> bool {
        match self.prepare_glyph_data(char_code) {
            Some(data) => {
                self.current = Some(data);
                true
            }
            None => {
                self.current = None;
                false
            }
        }
    }

    fn glyph_index(&self) -> u32 {
        self.current.as_ref().map(|g| g.glyph_index as u32).unwrap_or(0)
    }

    fn data_size(&self) -> usize {
        // 2 * i32 per outline vertex plus the command byte; see
        // `font_cache::serialize_glyph` for the exact on-disk layout.
        self.current
            .as_ref()
            .map(|g| g.outline.len() * 9)
            .unwrap_or(0)
    }

    fn data_type(&self) -> GlyphDataType {
        self.current.as_ref().map(|g| g.data_type).unwrap_or(GlyphDataType::Invalid)
    }

    fn bounds(&self) -> Rect<i32> {
        self.current.as_ref().map(|g| g.bounds).unwrap_or(Rect::new(0, 0, 0, 0))
    }

    fn advance_x(&self) -> f64 {
        self.current.as_ref().map(|g| g.advance_x).unwrap_or(0.0)
    }

    fn advance_y(&self) -> f64 {
        self.current.as_ref().map(|g| g.advance_y).unwrap_or(0.0)
    }

    fn write_glyph_to(&self, buf: &mut [u8]) {
        let Some(glyph) = self.current.as_ref() else { return };
        let mut offset = 0;
        for &(x, y, cmd) in &glyph.outline {
            buf[offset..offset + 4].copy_from_slice(&(x as f32).to_le_bytes());
            buf[offset + 4..offset + 8].copy_from_slice(&(y as f32).to_le_bytes());
            buf[offset + 8] = cmd as u8;
            offset += 9;
        }
    }

    fn outline_vertices(&self) -> &[(f64, f64, u32)] {
        self.current.as_ref().map(|g| g.outline.as_slice()).unwrap_or(&[])
    }

    fn add_kerning(&self, glyph1: u32, glyph2: u32) -> (f64, f64) {
        (self.kerning(glyph1 as u16, glyph2 as u16), 0.0)
    }
}

// ============================================================================
// OutlineCollector — implements ttf_parser::OutlineBuilder
// ============================================================================

/// Collects glyph outline commands into AGG-compatible vertex tuples.
struct OutlineCollector {
    vertices: Vec<(f64, f64, u32)>,
    scale: f64,
    scale_x: f64,
    flip_y: bool,
}

impl OutlineCollector {
    fn new(scale: f64, flip_y: bool, scale_x: f64) -> Self {
        Self {
            vertices: Vec::with_capacity(64),
            scale,
            scale_x,
            flip_y,
        }
    }

    #[inline]
    fn sx(&self, v: f32) -> f64 {
        v as f64 * self.scale * self.scale_x
    }

    #[inline]
    fn sy(&self, v: f32) -> f64 {
        let y = v as f64 * self.scale;
        if self.flip_y { -y } else { y }
    }
}

impl ttf_parser::OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.vertices.push((self.sx(x), self.sy(y), PATH_CMD_MOVE_TO));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.vertices.push((self.sx(x), self.sy(y), PATH_CMD_LINE_TO));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.vertices.push((self.sx(x1), self.sy(y1), PATH_CMD_CURVE3));
        self.vertices.push((self.sx(x), self.sy(y), PATH_CMD_CURVE3));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.vertices.push((self.sx(x1), self.sy(y1), PATH_CMD_CURVE4));
        self.vertices.push((self.sx(x2), self.sy(y2), PATH_CMD_CURVE4));
        self.vertices.push((self.sx(x), self.sy(y), PATH_CMD_CURVE4));
    }

    fn close(&mut self) {
        self.vertices
            .push((0.0, 0.0, PATH_CMD_END_POLY | PATH_FLAGS_CLOSE));
    }
}

// ============================================================================
// Tests
// ============================================================================
