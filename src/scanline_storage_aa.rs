//! Anti-aliased scanline storage.
//!
//! Port of `agg_scanline_storage_aa.h`.
//! Stores rasterized scanlines in memory for later boolean operations
//! or serialized replay. Each span stores per-pixel coverage data.

use crate::rasterizer_scanline_aa::Scanline;

/// Stored span data: x, len (positive=per-pixel, negative=solid), covers offset.
#[derive(Debug, Clone, Copy, Default)]
struct SpanData {
    x: i32,
    len: i32,
    covers_offset: usize,
}

/// Per-scanline metadata.
#[derive(Debug, Clone, Copy, Default)]
struct ScanlineData {
    y: i32,
    num_spans: u32,
    start_span: usize,
}

/// Anti-aliased scanline storage.
///
/// Port of C++ `scanline_storage_aa<T>`.
/// Stores rendered scanlines for later replay, boolean operations, or serialization.
pub struct ScanlineStorageAa {
    spans: Vec<SpanData>,
    covers: Vec<u8>,
    scanlines: Vec<ScanlineData>,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    cur_scanline: usize,
}

impl ScanlineStorageAa {
    pub fn new() -> Self {
        Self {
            spans: Vec::new(),
            covers: Vec::new(),
            scanlines: Vec::new(),
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            cur_scanline: 0,
        }
    }

    /// Prepare for new rendering (clear all stored data).
    pub fn prepare(&mut self) {
        self.spans.clear();
        self.covers.clear();
        self.scanlines.clear();
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
        self.cur_scanline = 0;
    }

    /// Store a scanline from a ScanlineU8 (unpacked, per-pixel covers).
    pub fn render_scanline_u8(&mut self, sl: &crate::scanline_u::ScanlineU8) {
        let y = sl.y();
        if y < self.min_y {
            self.min_y = y;
        }
        if y > self.max_y {
            self.max_y = y;
        }

        let start_span = self.spans.len();
        let mut num_spans = 0u32;

        let spans = sl.begin();
        let covers_buf = sl.covers();

        for sp in spans {
            let x = sp.x;
            let len = sp.len;
            if len > 0 {
                // Per-pixel covers
                let xe = x + len - 1;
                if x < self.min_x {
                    self.min_x = x;
                }
                if xe > self.max_x {
                    self.max_x = xe;
                }
                let covers_offset = self.covers.len();
                self.covers
                    .extend_from_slice(&covers_buf[sp.cover_offset..sp.cover_offset + len as usize]);
                self.spans.push(SpanData {
                    x,
                    len,
                    covers_offset,
                });
            }
            num_spans += 1;
        }

        self.scanlines.push(ScanlineData {
            y,
            num_spans,
            start_span,
        });
    }

    /// Store a scanline from a ScanlineP8 (packed, may have solid spans).
    pub fn render_scanline_p8(&mut self, sl: &crate::scanline_p::ScanlineP8) {
        let y = sl.y();
        if y < self.min_y {
            self.min_y = y;
        }
        if y > self.max_y {
            self.max_y = y;
        }

        let start_span = self.spans.len();
        let mut num_spans = 0u32;

        let spans = sl.begin();
        let covers_buf = sl.covers();

        for sp in spans {
            let x = sp.x;
            let len = sp.len;
            let abs_len = len.unsigned_abs() as i32;
            let xe = x + abs_len - 1;
            if x < self.min_x {
                self.min_x = x;
            }
            if xe > self.max_x {
                self.max_x = xe;
            }
            let covers_offset = self.covers.len();
            if len < 0 {
                // Solid span — store single cover value
                self.covers.push(covers_buf[sp.cover_offset]);
            } else {
                // Per-pixel covers
                self.covers
                    .extend_from_slice(&covers_buf[sp.cover_offset..sp.cover_offset + len as usize]);
            }
            self.spans.push(SpanData {
                x,
                len,
                covers_offset,
            });
            num_spans += 1;
        }

        self.scanlines.push(ScanlineData {
            y,
            num_spans,
            start_span,
        });
    }

    /// Reset the scanline iteration pointer.
    pub fn rewind_scanlines(&mut self) -> bool {
        self.cur_scanline = 0;
        !self.scanlines.is_empty()
    }

    /// Sweep the next stored scanline into an output scanline container.
    /// Returns false when all scanlines have been consumed.
    pub fn sweep_scanline<SL: Scanline>(&mut self, sl: &mut SL) -> bool {
        sl.reset_spans();
        loop {
            if self.cur_scanline >= self.scanlines.len() {
                return false;
            }
            let sld = self.scanlines[self.cur_scanline];
            let num_spans = sld.num_spans;
            self.cur_scanline += 1;

            if num_spans == 0 {
                continue;
            }

            for i in 0..num_spans as usize {
                let sp = self.spans[sld.start_span + i];
                if sp.len < 0 {
                    // Solid span
                    sl.add_span(sp.x, (-sp.len) as u32, self.covers[sp.covers_offset] as u32);
                } else if sp.len > 0 {
                    // Per-pixel spans — add cell by cell
                    for j in 0..sp.len as usize {
                        sl.add_cell(sp.x + j as i32, self.covers[sp.covers_offset + j] as u32);
                    }
                }
            }
            sl.finalize(sld.y);
            return true;
        }
    }

    pub fn min_x(&self) -> i32 {
        self.min_x
    }
    pub fn min_y(&self) -> i32 {
        self.min_y
    }
    pub fn max_x(&self) -> i32 {
        self.max_x
    }
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    pub fn num_scanlines(&self) -> usize {
        self.scanlines.len()
    }

    // ========================================================================
    // Embedded scanline access (for boolean algebra)
    // ========================================================================

    /// Get the Y coordinate for a stored scanline by index.
    pub fn scanline_y(&self, idx: usize) -> i32 {
        self.scanlines[idx].y
    }

    /// Get the number of spans for a stored scanline by index.
    pub fn scanline_num_spans(&self, idx: usize) -> u32 {
        self.scanlines[idx].num_spans
    }

    /// Get the covers slice for a span.
    fn span_covers(&self, sp: &SpanData) -> &[u8] {
        if sp.len < 0 {
            &self.covers[sp.covers_offset..sp.covers_offset + 1]
        } else {
            &self.covers[sp.covers_offset..sp.covers_offset + sp.len as usize]
        }
    }

    /// Iterate over embedded scanline spans for boolean algebra.
    /// Returns an iterator of (x, len, covers_slice) tuples.
    pub fn embedded_spans(
        &self,
        sl_idx: usize,
    ) -> impl Iterator<Item = EmbeddedSpan<'_>> + '_ {
        let sld = &self.scanlines[sl_idx];
        let spans = &self.spans[sld.start_span..sld.start_span + sld.num_spans as usize];
        spans.iter().map(move |sp| EmbeddedSpan {
            x: sp.x,
            len: sp.len,
            covers: self.span_covers(sp),
        })
    }
}

impl Default for ScanlineStorageAa {
    fn default() -> Self {
        Self::new()
    }
}

/// A span reference from embedded scanline iteration.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedSpan<'a> {
    pub x: i32,
    pub len: i32,
    pub covers: &'a [u8],
}

impl<'a> EmbeddedSpan<'a> {
    /// Get the absolute length (number of pixels).
    pub fn abs_len(&self) -> i32 {
        self.len.abs()
    }

    /// Get end X (exclusive).
    pub fn x_end(&self) -> i32 {
        self.x + self.abs_len()
    }

    /// Get the coverage at pixel offset `i` from span start.
    pub fn cover_at(&self, i: usize) -> u8 {
        if self.len < 0 {
            self.covers[0] // solid span
        } else {
            self.covers[i]
        }
    }
}

// ============================================================================
// SerializedScanlinesAdaptorAa — opaque byte stream reader
// ============================================================================

impl ScanlineStorageAa {
    /// Serialize into the byte layout [`SerializedScanlinesAdaptorAa`] reads.
    ///
    /// Header: `num_scanlines: u32`, `min_x/min_y/max_x/max_y: i32`. Then per
    /// scanline: `y: i32`, `num_spans: u32`, followed by `num_spans` records
    /// of `(x: i32, len: i32, cover bytes)` where `len < 0` means a solid run
    /// of `-len` pixels (one cover byte follows) and `len >= 0` means
    /// per-pixel covers (`len` cover bytes follow). This layout is internal
    /// to this crate — `serialize` and the adaptor are each other's only
    /// readers.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(20 + self.spans.len() * 9 + self.covers.len());
        out.extend_from_slice(&(self.scanlines.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.min_x.to_le_bytes());
        out.extend_from_slice(&self.min_y.to_le_bytes());
        out.extend_from_slice(&self.max_x.to_le_bytes());
        out.extend_from_slice(&self.max_y.to_le_bytes());
        for sld in &self.scanlines {
            out.extend_from_slice(&sld.y.to_le_bytes());
            out.extend_from_slice(&sld.num_spans.to_le_bytes());
            for i in 0..sld.num_spans as usize {
                let sp = self.spans[sld.start_span + i];
                out.extend_from_slice(&sp.x.to_le_bytes());
                out.extend_from_slice(&sp.len.to_le_bytes());
                out.extend_from_slice(self.span_covers(&sp));
            }
        }
        out
    }
}

/// Replays an anti-aliased scanline stream serialized by
/// [`ScanlineStorageAa::serialize`] from a raw byte buffer.
pub struct SerializedScanlinesAdaptorAa<'a> {
    data: &'a [u8],
    pos: usize,
    num_scanlines: u32,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    consumed: u32,
}

impl<'a> SerializedScanlinesAdaptorAa<'a> {
    /// Parse the header and position at the first scanline. Returns `None`
    /// if `data` is shorter than the 20-byte header.
    pub fn new(data: &'a [u8]) -> Option<Self> {
        if data.len() < 20 {
            log::warn!("SerializedScanlinesAdaptorAa: buffer too short for header");
            return None;
        }
        let num_scanlines = u32::from_le_bytes(data[0..4].try_into().unwrap());
        let min_x = i32::from_le_bytes(data[4..8].try_into().unwrap());
        let min_y = i32::from_le_bytes(data[8..12].try_into().unwrap());
        let max_x = i32::from_le_bytes(data[12..16].try_into().unwrap());
        let max_y = i32::from_le_bytes(data[16..20].try_into().unwrap());
        Some(Self {
            data,
            pos: 20,
            num_scanlines,
            min_x,
            min_y,
            max_x,
            max_y,
            consumed: 0,
        })
    }

    pub fn min_x(&self) -> i32 {
        self.min_x
    }
    pub fn min_y(&self) -> i32 {
        self.min_y
    }
    pub fn max_x(&self) -> i32 {
        self.max_x
    }
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Reset iteration to the first scanline.
    pub fn rewind_scanlines(&mut self) -> bool {
        self.pos = 20;
        self.consumed = 0;
        self.num_scanlines > 0
    }

    /// Read the next stored scanline into `sl`. Returns `false` at end of
    /// stream or on malformed input (logged, not panicked).
    pub fn sweep_scanline<SL: Scanline>(&mut self, sl: &mut SL) -> bool {
        sl.reset_spans();
        if self.consumed >= self.num_scanlines {
            return false;
        }
        let Some(head) = self.data.get(self.pos..self.pos + 8) else {
            log::warn!("SerializedScanlinesAdaptorAa: truncated scanline header");
            return false;
        };
        let y = i32::from_le_bytes(head[0..4].try_into().unwrap());
        let num_spans = u32::from_le_bytes(head[4..8].try_into().unwrap());
        self.pos += 8;

        for _ in 0..num_spans {
            let Some(span_head) = self.data.get(self.pos..self.pos + 8) else {
                log::warn!("SerializedScanlinesAdaptorAa: truncated span header");
                return false;
            };
            let x = i32::from_le_bytes(span_head[0..4].try_into().unwrap());
            let len = i32::from_le_bytes(span_head[4..8].try_into().unwrap());
            self.pos += 8;

            let cover_count = if len < 0 { 1 } else { len as usize };
            let Some(covers) = self.data.get(self.pos..self.pos + cover_count) else {
                log::warn!("SerializedScanlinesAdaptorAa: truncated cover data");
                return false;
            };

            if len < 0 {
                sl.add_span(x, (-len) as u32, covers[0] as u32);
            } else {
                for (i, &c) in covers.iter().enumerate() {
                    sl.add_cell(x + i as i32, c as u32);
                }
            }
            self.pos += cover_count;
        }
        sl.finalize(y);
        self.consumed += 1;
        true
    }
}
