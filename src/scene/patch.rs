//! NURBS patch node state.
//!
//! Patches resolve their control hull only; evaluation is the renderer's
//! business.

use glam::Vec3;

use crate::archive::{Archive, ObjectId};
use crate::util::{BBox3f, Chrono};

/// Resolved patch hull: `nu` by `nv` control points, row-major in
/// `positions`.
#[derive(Clone, Debug, Default)]
pub struct PatchState {
    pub positions: Vec<Vec3>,
    pub nu: u32,
    pub nv: u32,
    pub(crate) bounds: BBox3f,
}

impl PatchState {
    pub(crate) fn resample(&mut self, archive: &Archive, obj: ObjectId, time: Chrono) {
        let Some(entry) = archive.get(obj) else { return };
        self.positions = entry
            .property("P")
            .and_then(|p| p.vec3s_at(time))
            .map(|a| a.to_vec())
            .unwrap_or_default();
        self.nu = entry
            .property("nu")
            .and_then(|p| p.f64_at(time))
            .map(|v| v.max(0.0) as u32)
            .unwrap_or(0);
        self.nv = entry
            .property("nv")
            .and_then(|p| p.f64_at(time))
            .map(|v| v.max(0.0) as u32)
            .unwrap_or(0);

        self.bounds = entry
            .property(".selfBnds")
            .and_then(|p| p.box3_at(time))
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| BBox3f::from_points(&self.positions));
    }

    /// Whether the hull dimensions cover the position array.
    pub fn is_consistent(&self) -> bool {
        (self.nu as usize) * (self.nv as usize) == self.positions.len()
    }

    /// Local-space bounds of the current sample.
    pub fn bounds(&self) -> BBox3f {
        self.bounds
    }
}
