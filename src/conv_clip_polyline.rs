//! Clip-polyline converter for vertex sources.
//!
//! Convenience wrapper combining `ConvAdaptorVpgen` with `VpgenClipPolyline`,
//! mirroring the way `ConvSegmentator` wraps `VpgenSegmentator`.

use crate::basics::VertexSource;
use crate::conv_adaptor_vpgen::ConvAdaptorVpgen;
use crate::vpgen_clip_polyline::VpgenClipPolyline;

/// Clips an open polyline vertex source against a rectangular box.
pub struct ConvClipPolyline<VS> {
    inner: ConvAdaptorVpgen<VS, VpgenClipPolyline>,
}

impl<VS: VertexSource> ConvClipPolyline<VS> {
    pub fn new(source: VS) -> Self {
        Self {
            inner: ConvAdaptorVpgen::new(source, VpgenClipPolyline::new()),
        }
    }

    pub fn clip_box(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.inner.vpgen_mut().clip_box(x1, y1, x2, y2);
    }

    pub fn x1(&self) -> f64 {
        self.inner.vpgen().x1()
    }
    pub fn y1(&self) -> f64 {
        self.inner.vpgen().y1()
    }
    pub fn x2(&self) -> f64 {
        self.inner.vpgen().x2()
    }
    pub fn y2(&self) -> f64 {
        self.inner.vpgen().y2()
    }

    pub fn source(&self) -> &VS {
        self.inner.source()
    }

    pub fn source_mut(&mut self) -> &mut VS {
        self.inner.source_mut()
    }
}

impl<VS: VertexSource> VertexSource for ConvClipPolyline<VS> {
    fn rewind(&mut self, path_id: u32) {
        self.inner.rewind(path_id);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        self.inner.vertex(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{is_stop, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP};
    use crate::path_storage::PathStorage;

    fn collect_vertices<VS: VertexSource>(vs: &mut VS) -> Vec<(f64, f64, u32)> {
        let mut result = Vec::new();
        vs.rewind(0);
        loop {
            let (mut x, mut y) = (0.0, 0.0);
            let cmd = vs.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            result.push((x, y, cmd));
        }
        result
    }

    /// s2: literal clip-polyline stream for a path that crosses the clip box.
    #[test]
    fn s2_clip_polyline_literal_stream() {
        let mut path = PathStorage::new();
        path.move_to(-10.0, 5.0);
        path.line_to(5.0, 5.0);
        path.line_to(5.0, 20.0);

        let mut clip = ConvClipPolyline::new(path);
        clip.clip_box(0.0, 0.0, 10.0, 10.0);
        let verts = collect_vertices(&mut clip);

        assert_eq!(verts[0].2, PATH_CMD_MOVE_TO);
        assert!((verts[0].0 - 0.0).abs() < 1e-6);
        assert!((verts[0].1 - 5.0).abs() < 1e-6);

        assert_eq!(verts[1].2, PATH_CMD_LINE_TO);
        assert!((verts[1].0 - 5.0).abs() < 1e-6);
        assert!((verts[1].1 - 5.0).abs() < 1e-6);

        assert_eq!(verts[2].2, PATH_CMD_LINE_TO);
        assert!((verts[2].0 - 5.0).abs() < 1e-6);
        assert!((verts[2].1 - 10.0).abs() < 1e-6);
    }

    #[test]
    fn never_emits_close() {
        let mut path = PathStorage::new();
        path.move_to(0.0, 0.0);
        path.line_to(5.0, 0.0);
        path.line_to(5.0, 5.0);
        path.close_polygon(0);

        let mut clip = ConvClipPolyline::new(path);
        clip.clip_box(-100.0, -100.0, 100.0, 100.0);
        let verts = collect_vertices(&mut clip);
        assert!(verts.iter().all(|v| v.2 != (PATH_CMD_STOP)));
        assert!(!verts
            .iter()
            .any(|v| crate::basics::is_close(v.2)));
    }
}
