//! Integer (fixed-point) path storage and its byte-exact serialization.
//!
//! Port of `agg_path_storage_integer.h`. Stores path vertices as scaled
//! integers instead of `f64`, which is what glyph outlines are cached as
//! (see `font_cache`): a compact, directly-serializable representation that
//! avoids re-running curve flattening every time a cached glyph is drawn.
//!
//! Coordinates are stored pre-shifted by `coord_shift` bits. On the wire
//! (`serialize`/`IntegerPathAdaptor`), the low bit of each of the shifted
//! X and Y coordinates carries one bit of a 2-bit command selector —
//! `{MoveTo=0, LineTo=1, Curve3=2, Curve4=3}`, `x` holding the low bit and
//! `y` the high bit — so all four path commands round-trip through the
//! byte format, not just MoveTo/LineTo.

use crate::basics::{
    Rect, VertexSource, PATH_CMD_CURVE3, PATH_CMD_CURVE4, PATH_CMD_END_POLY, PATH_CMD_LINE_TO,
    PATH_CMD_MOVE_TO, PATH_CMD_STOP, PATH_FLAGS_CLOSE,
};

/// Integer coordinate widths usable as `IntegerPathStorage<T>`'s backing type.
///
/// Sealed: only `i16`, `i32`, `i64` implement it, matching the three
/// instantiations upstream AGG provides (`path_storage_integer<int16>` etc).
pub trait IntCoord: Copy + private::Sealed {
    fn to_i64(self) -> i64;
    fn from_i64(v: i64) -> Self;
    const BYTES: usize;
    fn write_le(self, out: &mut Vec<u8>);
    fn read_le(buf: &[u8]) -> Option<(Self, &[u8])>;
}

mod private {
    pub trait Sealed {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
}

macro_rules! impl_int_coord {
    ($t:ty) => {
        impl IntCoord for $t {
            fn to_i64(self) -> i64 {
                self as i64
            }
            fn from_i64(v: i64) -> Self {
                v as $t
            }
            const BYTES: usize = core::mem::size_of::<$t>();
            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
            fn read_le(buf: &[u8]) -> Option<(Self, &[u8])> {
                if buf.len() < Self::BYTES {
                    return None;
                }
                let (head, tail) = buf.split_at(Self::BYTES);
                let mut arr = [0u8; 8];
                arr[..Self::BYTES].copy_from_slice(head);
                let v = match Self::BYTES {
                    2 => i16::from_le_bytes([head[0], head[1]]) as i64,
                    4 => i32::from_le_bytes([head[0], head[1], head[2], head[3]]) as i64,
                    8 => i64::from_le_bytes(arr),
                    _ => unreachable!(),
                };
                Some((<$t as IntCoord>::from_i64(v), tail))
            }
        }
    };
}
impl_int_coord!(i16);
impl_int_coord!(i32);
impl_int_coord!(i64);

/// One stored integer vertex: a shifted coordinate pair. The command tag
/// lives alongside it in `IntegerPathStorage::cmds` for in-memory storage;
/// it's only packed into the coordinates' low bits at `serialize` time.
#[derive(Debug, Clone, Copy)]
struct IntVertex<T> {
    x: T,
    y: T,
}

/// Maps a path command to the 2-bit wire selector (`{MoveTo=0, LineTo=1,
/// Curve3=2, Curve4=3}`) used by `serialize`/`IntegerPathAdaptor`.
fn cmd_to_selector(cmd: u32) -> i64 {
    match cmd {
        PATH_CMD_MOVE_TO => 0,
        PATH_CMD_LINE_TO => 1,
        PATH_CMD_CURVE3 => 2,
        PATH_CMD_CURVE4 => 3,
        _ => unreachable!("only MoveTo/LineTo/Curve3/Curve4 vertices are stored"),
    }
}

/// Inverse of `cmd_to_selector`.
fn selector_to_cmd(sel: i64) -> u32 {
    match sel & 0b11 {
        0 => PATH_CMD_MOVE_TO,
        1 => PATH_CMD_LINE_TO,
        2 => PATH_CMD_CURVE3,
        _ => PATH_CMD_CURVE4,
    }
}

/// Fixed-point path storage, generic over the integer width.
///
/// `coord_shift` is fixed at construction (spec default 6: 1/64 subpixel
/// precision) and never mutated — the Design Notes call this out
/// explicitly as a construction-time constant, not runtime state.
pub struct IntegerPathStorage<T: IntCoord> {
    coord_shift: u32,
    vertices: Vec<IntVertex<T>>,
    cmds: Vec<u32>,
    iter: usize,
    iter_needs_close: bool,
}

impl<T: IntCoord> IntegerPathStorage<T> {
    pub fn new(coord_shift: u32) -> Self {
        Self {
            coord_shift,
            vertices: Vec::new(),
            cmds: Vec::new(),
            iter: 0,
            iter_needs_close: false,
        }
    }

    pub fn coord_shift(&self) -> u32 {
        self.coord_shift
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn remove_all(&mut self) {
        self.vertices.clear();
        self.cmds.clear();
        self.iter = 0;
        self.iter_needs_close = false;
    }

    fn scale(&self) -> f64 {
        (1i64 << self.coord_shift) as f64
    }

    fn push(&mut self, x: f64, y: f64, cmd: u32) {
        let scale = self.scale();
        let xi = T::from_i64((x * scale).round() as i64);
        let yi = T::from_i64((y * scale).round() as i64);
        self.vertices.push(IntVertex { x: xi, y: yi });
        self.cmds.push(cmd);
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.push(x, y, PATH_CMD_MOVE_TO);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.push(x, y, PATH_CMD_LINE_TO);
    }

    /// Quadratic Bezier: one control point, then the end point, both
    /// tagged `Curve3` (matching `PathStorage::curve3`'s per-vertex tagging).
    pub fn curve3(&mut self, x_ctrl: f64, y_ctrl: f64, x_to: f64, y_to: f64) {
        self.push(x_ctrl, y_ctrl, PATH_CMD_CURVE3);
        self.push(x_to, y_to, PATH_CMD_CURVE3);
    }

    /// Cubic Bezier: two control points, then the end point, all tagged
    /// `Curve4`.
    pub fn curve4(
        &mut self,
        x_ctrl1: f64,
        y_ctrl1: f64,
        x_ctrl2: f64,
        y_ctrl2: f64,
        x_to: f64,
        y_to: f64,
    ) {
        self.push(x_ctrl1, y_ctrl1, PATH_CMD_CURVE4);
        self.push(x_ctrl2, y_ctrl2, PATH_CMD_CURVE4);
        self.push(x_to, y_to, PATH_CMD_CURVE4);
    }

    /// No-op: this storage's `vertex_iterate` synthesizes `EndPoly|Close`
    /// at every contour boundary unconditionally, so there is no distinct
    /// "closed" bit to set here — matching upstream `path_storage_integer`.
    pub fn close_polygon(&mut self) {}

    /// Random-access vertex lookup: unshifted `(x, y)` plus the raw command.
    pub fn vertex_at(&self, idx: usize) -> (f64, f64, u32) {
        let v = &self.vertices[idx];
        let scale = self.scale();
        (
            v.x.to_i64() as f64 / scale,
            v.y.to_i64() as f64 / scale,
            self.cmds[idx],
        )
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        if self.vertices.is_empty() {
            return None;
        }
        let scale = self.scale();
        let mut r = Rect::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for v in &self.vertices {
            let x = v.x.to_i64() as f64 / scale;
            let y = v.y.to_i64() as f64 / scale;
            if x < r.x1 {
                r.x1 = x;
            }
            if y < r.y1 {
                r.y1 = y;
            }
            if x > r.x2 {
                r.x2 = x;
            }
            if y > r.y2 {
                r.y2 = y;
            }
        }
        Some(r)
    }

    /// Number of bytes `serialize` will produce.
    pub fn byte_size(&self) -> usize {
        self.vertices.len() * 2 * T::BYTES
    }

    /// Bit-exact little-endian serialization: `(x_packed, y_packed)` pairs,
    /// `T::BYTES` bytes each, where `packed = (coord << 1) | cmd_bit` and
    /// the 2-bit command selector `{MoveTo=0, LineTo=1, Curve3=2,
    /// Curve4=3}` is split across x (low bit) and y (high bit):
    /// `cmd = ((y_packed & 1) << 1) | (x_packed & 1)`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_size());
        for (v, &cmd) in self.vertices.iter().zip(self.cmds.iter()) {
            let sel = cmd_to_selector(cmd);
            let x_bit = sel & 1;
            let y_bit = (sel >> 1) & 1;
            let xi = (v.x.to_i64() << 1) | x_bit;
            let yi = (v.y.to_i64() << 1) | y_bit;
            T::from_i64(xi).write_le(&mut out);
            T::from_i64(yi).write_le(&mut out);
        }
        out
    }
}

impl<T: IntCoord> Default for IntegerPathStorage<T> {
    fn default() -> Self {
        Self::new(6)
    }
}

impl<T: IntCoord> VertexSource for IntegerPathStorage<T> {
    fn rewind(&mut self, _path_id: u32) {
        self.iter = 0;
        self.iter_needs_close = false;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.iter_needs_close {
            self.iter_needs_close = false;
            *x = 0.0;
            *y = 0.0;
            return PATH_CMD_END_POLY | PATH_FLAGS_CLOSE;
        }
        if self.iter >= self.vertices.len() {
            return PATH_CMD_STOP;
        }
        // Synthesize end_poly|close when the *next* vertex starts a new
        // contour (a move_to), so every contour this storage emits is
        // implicitly closed — matching the glyph-outline use case this
        // type exists for.
        if self.iter > 0 && self.cmds[self.iter] == PATH_CMD_MOVE_TO {
            self.iter_needs_close = true;
            *x = 0.0;
            *y = 0.0;
            return PATH_CMD_END_POLY | PATH_FLAGS_CLOSE;
        }
        let (vx, vy, cmd) = self.vertex_at(self.iter);
        *x = vx;
        *y = vy;
        self.iter += 1;
        if self.iter == self.vertices.len() {
            self.iter_needs_close = true;
        }
        cmd
    }
}

/// Zero-copy reader over a serialized `IntegerPathStorage<T>` buffer.
///
/// Applies `(dx, dy)` translation and a uniform `scale` factor to every
/// emitted vertex, and degrades to `PATH_CMD_STOP` on the first sign of a
/// truncated or misaligned buffer rather than panicking.
pub struct IntegerPathAdaptor<'a, T: IntCoord> {
    buf: &'a [u8],
    coord_shift: u32,
    dx: f64,
    dy: f64,
    scale: f64,
    pos: usize,
    pending_close: bool,
    at_contour_start: bool,
    truncated: bool,
    _marker: core::marker::PhantomData<T>,
}

impl<'a, T: IntCoord> IntegerPathAdaptor<'a, T> {
    pub fn new(buf: &'a [u8], coord_shift: u32) -> Self {
        Self {
            buf,
            coord_shift,
            dx: 0.0,
            dy: 0.0,
            scale: 1.0,
            pos: 0,
            pending_close: false,
            at_contour_start: true,
            truncated: false,
            _marker: core::marker::PhantomData,
        }
    }

    pub fn init(&mut self, buf: &'a [u8], dx: f64, dy: f64, scale: f64) {
        self.buf = buf;
        self.dx = dx;
        self.dy = dy;
        self.scale = scale;
        self.pos = 0;
        self.pending_close = false;
        self.at_contour_start = true;
        self.truncated = false;
    }

    fn read_vertex(&mut self) -> Option<(f64, f64, u32)> {
        let remaining = &self.buf[self.pos..];
        let (xi, rest) = T::read_le(remaining)?;
        let (yi, rest) = T::read_le(rest)?;
        self.pos = self.buf.len() - rest.len();

        let raw_x = xi.to_i64();
        let raw_y = yi.to_i64();
        let sel = ((raw_y & 1) << 1) | (raw_x & 1);
        let cmd = selector_to_cmd(sel);
        let x = (raw_x >> 1) as f64 / (1i64 << self.coord_shift) as f64;
        let y = (raw_y >> 1) as f64 / (1i64 << self.coord_shift) as f64;
        Some((x, y, cmd))
    }
}

impl<T: IntCoord> VertexSource for IntegerPathAdaptor<'_, T> {
    fn rewind(&mut self, _path_id: u32) {
        self.pos = 0;
        self.pending_close = false;
        self.at_contour_start = true;
        self.truncated = false;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.truncated {
            return PATH_CMD_STOP;
        }
        if self.pending_close {
            self.pending_close = false;
            *x = 0.0;
            *y = 0.0;
            return PATH_CMD_END_POLY | PATH_FLAGS_CLOSE;
        }
        if self.pos >= self.buf.len() {
            return PATH_CMD_STOP;
        }

        match self.read_vertex() {
            Some((vx, vy, cmd)) => {
                *x = vx * self.scale + self.dx;
                *y = vy * self.scale + self.dy;
                let is_move = cmd == PATH_CMD_MOVE_TO;
                if is_move && !self.at_contour_start {
                    // Rewind the read: this vertex belongs to the *next*
                    // contour. Emit the synthetic close first.
                    self.pos -= 2 * T::BYTES;
                    self.pending_close = true;
                    self.at_contour_start = true;
                    *x = 0.0;
                    *y = 0.0;
                    return PATH_CMD_END_POLY | PATH_FLAGS_CLOSE;
                }
                self.at_contour_start = false;
                if self.pos >= self.buf.len() {
                    self.pending_close = true;
                }
                cmd
            }
            None => {
                log::warn!("integer path buffer truncated or misaligned at byte {}", self.pos);
                self.truncated = true;
                PATH_CMD_STOP
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{is_stop, is_close};

    fn drain<VS: VertexSource>(vs: &mut VS) -> Vec<(f64, f64, u32)> {
        vs.rewind(0);
        let mut out = Vec::new();
        loop {
            let (mut x, mut y) = (0.0, 0.0);
            let cmd = vs.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            out.push((x, y, cmd));
        }
        out
    }

    #[test]
    fn round_trips_a_single_contour() {
        let mut p = IntegerPathStorage::<i32>::new(6);
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 10.0);

        let verts = drain(&mut p);
        assert_eq!(verts.len(), 4);
        assert_eq!(verts[0], (0.0, 0.0, PATH_CMD_MOVE_TO));
        assert_eq!(verts[1], (10.0, 0.0, PATH_CMD_LINE_TO));
        assert_eq!(verts[2], (10.0, 10.0, PATH_CMD_LINE_TO));
        assert!(is_close(verts[3].2));
    }

    /// s3: literal serialized bytes for a single move_to at (1.0, 1.0) with
    /// coord_shift=6 (1.0 * 64 = 64). MoveTo's selector is 0, so both the
    /// x bit and the y bit are 0: x_packed = y_packed = (64 << 1) | 0 = 128.
    #[test]
    fn s3_serialize_single_vertex_exact_bytes() {
        let mut p = IntegerPathStorage::<i32>::new(6);
        p.move_to(1.0, 1.0);
        let bytes = p.serialize();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[0..4], &128i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &128i32.to_le_bytes());
    }

    /// Curve3/Curve4 round-trip through serialize + IntegerPathAdaptor,
    /// since the 2-bit selector exists precisely to carry them.
    #[test]
    fn curve3_and_curve4_round_trip_through_serialization() {
        let mut p = IntegerPathStorage::<i32>::new(6);
        p.move_to(0.0, 0.0);
        p.curve3(5.0, 10.0, 10.0, 0.0);
        p.curve4(20.0, 10.0, 30.0, -10.0, 40.0, 0.0);
        let bytes = p.serialize();

        let mut adaptor = IntegerPathAdaptor::<i32>::new(&bytes, 6);
        adaptor.init(&bytes, 0.0, 0.0, 1.0);
        let verts = drain(&mut adaptor);

        assert_eq!(verts[0].2, PATH_CMD_MOVE_TO);
        assert_eq!(verts[1].2, crate::basics::PATH_CMD_CURVE3);
        assert_eq!(verts[2].2, crate::basics::PATH_CMD_CURVE3);
        assert!((verts[2].0 - 10.0).abs() < 1e-6);
        assert_eq!(verts[3].2, crate::basics::PATH_CMD_CURVE4);
        assert_eq!(verts[4].2, crate::basics::PATH_CMD_CURVE4);
        assert_eq!(verts[5].2, crate::basics::PATH_CMD_CURVE4);
        assert!((verts[5].0 - 40.0).abs() < 1e-6);
        assert!(is_close(verts[6].2));
    }

    #[test]
    fn close_polygon_is_a_documented_no_op() {
        let mut p = IntegerPathStorage::<i32>::new(6);
        p.move_to(0.0, 0.0);
        p.line_to(1.0, 0.0);
        p.close_polygon();
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn adaptor_decodes_serialized_path_with_offset() {
        let mut p = IntegerPathStorage::<i32>::new(6);
        p.move_to(0.0, 0.0);
        p.line_to(1.0, 0.0);
        let bytes = p.serialize();

        let mut adaptor = IntegerPathAdaptor::<i32>::new(&bytes, 6);
        adaptor.init(&bytes, 100.0, 200.0, 1.0);
        let verts = drain(&mut adaptor);
        assert_eq!(verts[0], (100.0, 200.0, PATH_CMD_MOVE_TO));
        assert_eq!(verts[1], (101.0, 200.0, PATH_CMD_LINE_TO));
        assert!(is_close(verts[2].2));
    }

    #[test]
    fn adaptor_degrades_on_truncated_buffer() {
        let bytes = [0u8; 3]; // not even one full i32 coordinate
        let mut adaptor = IntegerPathAdaptor::<i32>::new(&bytes, 6);
        let (mut x, mut y) = (0.0, 0.0);
        assert!(is_stop(adaptor.vertex(&mut x, &mut y)));
    }

    #[test]
    fn adaptor_handles_multiple_contours() {
        let mut p = IntegerPathStorage::<i32>::new(6);
        p.move_to(0.0, 0.0);
        p.line_to(5.0, 0.0);
        p.move_to(20.0, 20.0);
        p.line_to(25.0, 20.0);
        let bytes = p.serialize();

        let mut adaptor = IntegerPathAdaptor::<i32>::new(&bytes, 6);
        adaptor.init(&bytes, 0.0, 0.0, 1.0);
        let verts = drain(&mut adaptor);
        // move, line, close, move, line, close
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[0].2, PATH_CMD_MOVE_TO);
        assert!(is_close(verts[2].2));
        assert_eq!(verts[3].2, PATH_CMD_MOVE_TO);
        assert!((verts[3].0 - 20.0).abs() < 1e-6);
        assert!(is_close(verts[5].2));
    }

    #[test]
    fn bounding_rect_covers_all_vertices() {
        let mut p = IntegerPathStorage::<i32>::new(6);
        p.move_to(-5.0, 2.0);
        p.line_to(10.0, -3.0);
        let r = p.bounding_rect().unwrap();
        assert!((r.x1 - -5.0).abs() < 1e-6);
        assert!((r.y1 - -3.0).abs() < 1e-6);
        assert!((r.x2 - 10.0).abs() < 1e-6);
        assert!((r.y2 - 2.0).abs() < 1e-6);
    }

    #[test]
    fn bounding_rect_empty_is_none() {
        let p = IntegerPathStorage::<i32>::new(6);
        assert!(p.bounding_rect().is_none());
    }
}
