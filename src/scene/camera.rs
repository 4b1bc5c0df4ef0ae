//! Camera node state and the renderer-facing camera.

use glam::Mat4;

use crate::archive::{Archive, ObjectId};
use crate::util::Chrono;

/// Lens values sampled from the archive.
#[derive(Clone, Debug)]
pub struct CameraState {
    pub focal_length: f64,
    pub near_clip: f64,
    pub far_clip: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            focal_length: 35.0,
            near_clip: 0.1,
            far_clip: 100000.0,
        }
    }
}

impl CameraState {
    pub(crate) fn resample(&mut self, archive: &Archive, obj: ObjectId, time: Chrono) {
        if let Some(v) = archive.property(obj, ".focalLength").and_then(|p| p.f64_at(time)) {
            self.focal_length = v;
        }
        if let Some(v) = archive.property(obj, ".nearClip").and_then(|p| p.f64_at(time)) {
            self.near_clip = v;
        }
        if let Some(v) = archive.property(obj, ".farClip").and_then(|p| p.f64_at(time)) {
            self.far_clip = v;
        }
    }
}

/// Renderer-facing camera snapshot.
///
/// Orientation comes from the transform chain above the camera node, never
/// from the camera sample itself; `view` is the inverse of `world`.
#[derive(Clone, Debug)]
pub struct RenderCamera {
    pub name: String,
    pub world: Mat4,
    pub view: Mat4,
    pub focal_length: f64,
    pub near_clip: f64,
    pub far_clip: f64,
}
