//! Crate-level error type.
//!
//! Most of this pipeline degrades instead of failing (see `font_cache` and
//! `path_storage_integer`): a truncated glyph buffer downgrades to `Stop`,
//! a full font pool evicts its oldest entry, an unmapped character code is
//! `None`. `VectorRasterError` exists only for the few boundaries that are
//! genuinely fallible — today, parsing a font face.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorRasterError {
    #[error("failed to parse font data: {0}")]
    Font(String),

    #[error("serialized path or scanline buffer is malformed")]
    Serialization,
}
