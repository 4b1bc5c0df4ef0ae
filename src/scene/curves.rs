//! Curve batch node state.

use glam::Vec3;

use crate::archive::{Archive, ObjectId};
use crate::util::{BBox3f, Chrono};

/// Resolved curve buffers: one flat position array, partitioned into strands
/// by `counts`.
#[derive(Clone, Debug, Default)]
pub struct CurvesState {
    pub positions: Vec<Vec3>,
    /// Control points per strand.
    pub counts: Vec<i32>,
    pub widths: Vec<f32>,
    pub(crate) bounds: BBox3f,
}

impl CurvesState {
    pub(crate) fn resample(&mut self, archive: &Archive, obj: ObjectId, time: Chrono) {
        let Some(entry) = archive.get(obj) else { return };
        self.positions = entry
            .property("P")
            .and_then(|p| p.vec3s_at(time))
            .map(|a| a.to_vec())
            .unwrap_or_default();
        self.counts = entry
            .property("nVertices")
            .and_then(|p| p.i32s_at(time))
            .map(|a| a.to_vec())
            .unwrap_or_default();
        self.widths = entry
            .property("width")
            .and_then(|p| p.f32s_at(time))
            .map(|a| a.to_vec())
            .unwrap_or_default();

        self.bounds = entry
            .property(".selfBnds")
            .and_then(|p| p.box3_at(time))
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| BBox3f::from_points(&self.positions));
    }

    /// Number of strands in the current sample.
    pub fn strand_count(&self) -> usize {
        self.counts.len()
    }

    /// Local-space bounds of the current sample.
    pub fn bounds(&self) -> BBox3f {
        self.bounds
    }
}
