//! # vectorraster
//!
//! Vector-to-raster pipeline ported from Anti-Grain Geometry (AGG) 2.6:
//! path storage (float and fixed-point integer), the vertex-source/converter
//! framework (stroke, curve, segmentator, clip-polyline), and a glyph cache
//! stack (TrueType font engine, per-signature glyph tables, a bounded
//! font-cache pool) that hands cached glyphs to a renderer as one of three
//! replay forms — outline vertices, binary scanlines, or anti-aliased
//! scanlines.
//!
//! ## Pipeline
//!
//! 1. **Vertex Source** — `PathStorage` / `IntegerPathStorage` emit path
//!    commands (move_to/line_to/curve3/curve4/end_poly/stop).
//! 2. **Conversion** — `ConvStroke`, `ConvCurve`, `ConvSegmentator`,
//!    `ConvClipPolyline` transform one vertex stream into another.
//! 3. **Glyph cache** — `FontEngine` (TrueType, via `ttf-parser`) feeds
//!    `GlyphCacheManager`, which serializes and caches glyphs per font
//!    signature and replays them through `GlyphPathAdaptor` or the
//!    serialized scanline adaptors.
//!
//! Rasterization to pixels and pixel-format blending are out of scope; see
//! `SPEC_FULL.md` / `DESIGN.md` for the module boundary and its rationale.

pub mod array;
pub mod basics;
pub mod math;

pub mod bezier_arc;
pub mod clip_liang_barsky;
pub mod curves;
pub mod math_stroke;
pub mod trans_affine;

pub mod path_storage;
pub mod path_storage_integer;

pub mod markers;

pub mod conv_adaptor_vcgen;
pub mod conv_adaptor_vpgen;
pub mod conv_clip_polyline;
pub mod conv_curve;
pub mod conv_segmentator;
pub mod conv_stroke;
pub mod vcgen_stroke;
pub mod vpgen_clip_polyline;
pub mod vpgen_segmentator;

pub mod error;

pub mod rasterizer_cells_aa;
pub mod rasterizer_scanline_aa;
pub mod rasterizer_sl_clip;
pub mod scanline_bin;
pub mod scanline_p;
pub mod scanline_storage_aa;
pub mod scanline_storage_bin;
pub mod scanline_u;

#[cfg(feature = "font")]
pub mod font_cache;
#[cfg(feature = "font")]
pub mod font_cache_pool;
#[cfg(feature = "font")]
pub mod font_cache_table;
#[cfg(feature = "font")]
pub mod font_engine;
pub mod glyph_raster_bin;

pub use basics::{Rect, VertexSource};
pub use error::VectorRasterError;
