//! Point cloud node state.

use glam::Vec3;

use crate::archive::{Archive, ObjectId};
use crate::util::{BBox3f, Chrono};

/// Resolved point-cloud buffers, all index-aligned with `positions`.
#[derive(Clone, Debug, Default)]
pub struct PointsState {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub widths: Vec<f32>,
    pub(crate) bounds: BBox3f,
}

impl PointsState {
    pub(crate) fn resample(&mut self, archive: &Archive, obj: ObjectId, time: Chrono) {
        let Some(entry) = archive.get(obj) else { return };
        self.positions = entry
            .property("P")
            .and_then(|p| p.vec3s_at(time))
            .map(|a| a.to_vec())
            .unwrap_or_default();
        self.colors = entry
            .property("Cd")
            .and_then(|p| p.vec3s_at(time))
            .map(|a| a.to_vec())
            .unwrap_or_default();
        self.normals = entry
            .property("N")
            .and_then(|p| p.vec3s_at(time))
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

    /// Local-space bounds of the current sample.
    pub fn bounds(&self) -> BBox3f {
        self.bounds
    }
}
