//! Markers side channel for `ConvAdaptorVcgen`.
//!
//! A marker sink receives a copy of every vertex the adaptor pulls from its
//! upstream source, in parallel with the main generator — used by consumers
//! like an arrowhead generator that need the original (unstroked) vertices.
//! `NullMarkers` is the default, zero-cost no-op sink.

/// Receives a parallel copy of the vertices fed into a `VcgenGenerator`.
pub trait Markers {
    fn remove_all(&mut self);
    fn add_vertex(&mut self, x: f64, y: f64, cmd: u32);
}

/// Default no-op marker sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMarkers;

impl Markers for NullMarkers {
    fn remove_all(&mut self) {}
    fn add_vertex(&mut self, _x: f64, _y: f64, _cmd: u32) {}
}

/// Records every vertex it's given, for tests and simple arrowhead-style consumers.
#[derive(Debug, Clone, Default)]
pub struct RecordingMarkers {
    pub vertices: Vec<(f64, f64, u32)>,
}

impl Markers for RecordingMarkers {
    fn remove_all(&mut self) {
        self.vertices.clear();
    }
    fn add_vertex(&mut self, x: f64, y: f64, cmd: u32) {
        self.vertices.push((x, y, cmd));
    }
}
