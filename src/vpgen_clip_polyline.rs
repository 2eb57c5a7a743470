//! Vertex processor generator: polyline clipping.
//!
//! Clips a stream of line segments against a rectangular clip box using
//! Cohen-Sutherland rejection plus Liang-Barsky parametric clipping. Unlike
//! `VpgenClipPolygon` in upstream AGG (not ported here — this crate only
//! needs open-polyline clipping), a clipped re-entry into the box emits a
//! synthetic `move_to` rather than closing the contour.

use crate::basics::{Rect, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP};
use crate::clip_liang_barsky::{clip_liang_barsky_f64, clipping_flags};
use crate::conv_adaptor_vpgen::VpgenProcessor;

/// Clips an open polyline against a rectangular box.
///
/// Port of the polyline half of C++ `vpgen_clip_polyline`. Each `line_to`
/// call clips the segment `(x1, y1) -> (x2, y2)` against `clip_box` and
/// queues 0-2 output vertices. A segment that re-enters the box after
/// having left it is prefixed with a `move_to` at the entry point.
pub struct VpgenClipPolyline {
    clip_box: Rect<f64>,
    x1: f64,
    y1: f64,
    clip_flags: u32,
    x: [f64; 2],
    y: [f64; 2],
    cmd: [u32; 2],
    num_vertices: usize,
    vertex: usize,
}

impl VpgenClipPolyline {
    pub fn new() -> Self {
        Self {
            clip_box: Rect::new(0.0, 0.0, 1.0, 1.0),
            x1: 0.0,
            y1: 0.0,
            clip_flags: 0,
            x: [0.0; 2],
            y: [0.0; 2],
            cmd: [PATH_CMD_STOP; 2],
            num_vertices: 0,
            vertex: 0,
        }
    }

    pub fn clip_box(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.clip_box = Rect::new(x1, y1, x2, y2);
        self.clip_box.normalize();
    }

    pub fn x1(&self) -> f64 {
        self.clip_box.x1
    }
    pub fn y1(&self) -> f64 {
        self.clip_box.y1
    }
    pub fn x2(&self) -> f64 {
        self.clip_box.x2
    }
    pub fn y2(&self) -> f64 {
        self.clip_box.y2
    }

    pub fn auto_close() -> bool {
        false
    }

    pub fn auto_unclose() -> bool {
        true
    }

    pub fn reset(&mut self) {
        self.num_vertices = 0;
        self.vertex = 0;
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.x1 = x;
        self.y1 = y;
        self.clip_flags = clipping_flags(x, y, &self.clip_box);
        self.num_vertices = 0;
        self.vertex = 0;
        if self.clip_flags == 0 {
            self.x[0] = x;
            self.y[0] = y;
            self.cmd[0] = PATH_CMD_MOVE_TO;
            self.num_vertices = 1;
        }
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.vertex = 0;
        self.num_vertices = 0;

        let flags = clipping_flags(x, y, &self.clip_box);

        // Both endpoints on the same excluded side: segment fully outside.
        if (self.clip_flags & flags) != 0 {
            self.x1 = x;
            self.y1 = y;
            self.clip_flags = flags;
            return;
        }

        // The previous endpoint was outside the box: whatever this segment
        // emits first is a re-entry, so it needs a synthetic move_to rather
        // than a line_to joining onto nothing.
        let needs_move_to = self.clip_flags != 0;

        let mut cx = [0.0f64; 2];
        let mut cy = [0.0f64; 2];
        let np = clip_liang_barsky_f64(self.x1, self.y1, x, y, &self.clip_box, &mut cx, &mut cy);

        let mut i = 0;
        let mut idx = 0;
        while i < np as usize {
            self.x[idx] = cx[i];
            self.y[idx] = cy[i];
            self.cmd[idx] = if idx == 0 && needs_move_to {
                PATH_CMD_MOVE_TO
            } else {
                PATH_CMD_LINE_TO
            };
            idx += 1;
            i += 1;
        }
        self.num_vertices = idx;

        self.x1 = x;
        self.y1 = y;
        self.clip_flags = flags;
    }

    pub fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.vertex < self.num_vertices {
            *x = self.x[self.vertex];
            *y = self.y[self.vertex];
            let cmd = self.cmd[self.vertex];
            self.vertex += 1;
            return cmd;
        }
        PATH_CMD_STOP
    }
}

impl Default for VpgenClipPolyline {
    fn default() -> Self {
        Self::new()
    }
}

impl VpgenProcessor for VpgenClipPolyline {
    fn reset(&mut self) {
        self.reset();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.line_to(x, y);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        self.vertex(x, y)
    }

    fn auto_close() -> bool {
        VpgenClipPolyline::auto_close()
    }

    fn auto_unclose() -> bool {
        VpgenClipPolyline::auto_unclose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::is_stop;

    fn drain(vp: &mut VpgenClipPolyline) -> Vec<(f64, f64, u32)> {
        let mut out = Vec::new();
        loop {
            let (mut x, mut y) = (0.0, 0.0);
            let cmd = vp.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            out.push((x, y, cmd));
        }
        out
    }

    #[test]
    fn fully_inside_segment_passes_through() {
        let mut vp = VpgenClipPolyline::new();
        vp.clip_box(0.0, 0.0, 100.0, 100.0);
        vp.move_to(10.0, 10.0);
        let verts = drain(&mut vp);
        assert_eq!(verts, vec![(10.0, 10.0, PATH_CMD_MOVE_TO)]);

        vp.line_to(50.0, 50.0);
        let verts = drain(&mut vp);
        assert_eq!(verts, vec![(50.0, 50.0, PATH_CMD_LINE_TO)]);
    }

    #[test]
    fn segment_crossing_box_is_clipped() {
        let mut vp = VpgenClipPolyline::new();
        vp.clip_box(10.0, 10.0, 100.0, 100.0);
        vp.move_to(0.0, 50.0);
        drain(&mut vp);
        vp.line_to(150.0, 50.0);
        let verts = drain(&mut vp);
        assert_eq!(verts.len(), 2);
        assert!((verts[0].0 - 10.0).abs() < 1e-6);
        assert!((verts[1].0 - 100.0).abs() < 1e-6);
    }

    #[test]
    fn reentry_after_exit_emits_move_to() {
        let mut vp = VpgenClipPolyline::new();
        vp.clip_box(0.0, 0.0, 10.0, 10.0);
        vp.move_to(5.0, 5.0);
        drain(&mut vp);
        // Leave the box.
        vp.line_to(20.0, 5.0);
        drain(&mut vp);
        // Re-enter: a fresh segment coming back in should start with move_to.
        vp.line_to(5.0, 5.0);
        let verts = drain(&mut vp);
        assert_eq!(verts[0].2, PATH_CMD_MOVE_TO);
    }

    #[test]
    fn first_exiting_segment_from_an_interior_move_to_is_a_line_to() {
        let mut vp = VpgenClipPolyline::new();
        vp.clip_box(0.0, 0.0, 10.0, 10.0);
        vp.move_to(5.0, 5.0);
        drain(&mut vp);
        // The very first segment from an interior move_to that exits the
        // box should join onto it with a line_to, not a spurious move_to.
        vp.line_to(20.0, 5.0);
        let verts = drain(&mut vp);
        assert_eq!(verts[0].2, PATH_CMD_LINE_TO);
    }

    #[test]
    fn segment_fully_outside_is_dropped() {
        let mut vp = VpgenClipPolyline::new();
        vp.clip_box(0.0, 0.0, 10.0, 10.0);
        vp.move_to(20.0, 20.0);
        drain(&mut vp);
        vp.line_to(30.0, 30.0);
        let verts = drain(&mut vp);
        assert!(verts.is_empty());
    }

    #[test]
    fn auto_close_and_unclose_flags() {
        assert!(!VpgenClipPolyline::auto_close());
        assert!(VpgenClipPolyline::auto_unclose());
    }
}
