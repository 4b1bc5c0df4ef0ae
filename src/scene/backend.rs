//! Backend adapter contract.
//!
//! A scene pushes resolved geometry to a renderer through borrowed views;
//! each borrow lasts one call, so adapters copy whatever they keep.

use glam::{Mat4, Vec2, Vec3};

use crate::util::BBox3f;

use super::material::MaterialSlot;
use super::resolve::AttrBuffer;

/// Which renderer family an adapter feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Interactive preview.
    Preview,
    /// Offline export.
    Offline,
}

/// One mesh's resolved buffers.
pub struct MeshDraw<'a> {
    pub name: &'a str,
    pub world: Mat4,
    /// Flat triangle indices, three per triangle.
    pub triangles: &'a [u32],
    pub positions: &'a [Vec3],
    pub normals: &'a AttrBuffer<Vec3>,
    pub uvs: &'a AttrBuffer<Vec2>,
    /// Per-face-set slots; spans follow the triangle order.
    pub materials: &'a [MaterialSlot],
    /// Source winding flag. Emitted triangles are already normalized to one
    /// convention, the flag only records what the archive declared.
    pub clockwise: bool,
    pub bounds: BBox3f,
}

impl<'a> MeshDraw<'a> {
    /// Triangle indices as raw bytes, ready for an index-buffer upload.
    pub fn triangle_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.triangles)
    }

    /// Positions as raw bytes, ready for a vertex-buffer upload.
    pub fn position_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.positions)
    }
}

/// One point cloud's resolved buffers.
pub struct PointsDraw<'a> {
    pub name: &'a str,
    pub world: Mat4,
    pub positions: &'a [Vec3],
    pub colors: &'a [Vec3],
    pub normals: &'a [Vec3],
    pub widths: &'a [f32],
    pub bounds: BBox3f,
}

impl<'a> PointsDraw<'a> {
    pub fn position_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.positions)
    }
}

/// One curve batch's resolved buffers.
pub struct CurvesDraw<'a> {
    pub name: &'a str,
    pub world: Mat4,
    pub positions: &'a [Vec3],
    /// Control points per strand.
    pub counts: &'a [i32],
    pub widths: &'a [f32],
    pub bounds: BBox3f,
}

/// One patch hull.
pub struct PatchDraw<'a> {
    pub name: &'a str,
    pub world: Mat4,
    pub positions: &'a [Vec3],
    pub nu: u32,
    pub nv: u32,
    pub bounds: BBox3f,
}

/// Receives resolved geometry during a scene draw.
///
/// Only [`BackendAdapter::mesh`] is required; the other callbacks default to
/// ignoring their geometry so a mesh-only backend stays small.
pub trait BackendAdapter {
    /// Which renderer family this adapter feeds.
    fn kind(&self) -> BackendKind;

    /// Receive one mesh.
    fn mesh(&mut self, draw: &MeshDraw<'_>);

    /// Receive one point cloud.
    fn points(&mut self, _draw: &PointsDraw<'_>) {}

    /// Receive one curve batch.
    fn curves(&mut self, _draw: &CurvesDraw<'_>) {}

    /// Receive one patch hull.
    fn patch(&mut self, _draw: &PatchDraw<'_>) {}
}
