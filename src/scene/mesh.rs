//! Mesh node state: triangulation, attribute resolution and face-set
//! material assignment.
//!
//! Raw samples from the archive are kept from one resample to the next so
//! repeated calls can detect unchanged topology (by array lengths) and
//! unchanged positions (by allocation identity) and skip the matching work.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use tracing::{debug, trace, warn};

use crate::archive::schema::{CLOCKWISE_METADATA_KEY, FACESET_SCHEMA};
use crate::archive::{Archive, GeometryScope, ObjectId};
use crate::util::{BBox3f, Chrono};

use super::material::{Material, MaterialSlot};
use super::resolve::{self, AttrBuffer};
use super::ResamplePolicy;

/// Resolved mesh buffers plus the raw samples behind them.
#[derive(Clone, Debug, Default)]
pub struct MeshState {
    /// Flat triangle indices, three per triangle, face-set order when
    /// face-sets exist.
    pub triangles: Vec<u32>,
    /// Triangles per face-set, index-aligned with the face-set list.
    pub tri_counts: Vec<u32>,
    pub positions: Vec<Vec3>,
    pub normals: AttrBuffer<Vec3>,
    pub uvs: AttrBuffer<Vec2>,
    /// Material slots, one per face-set (or one default slot).
    pub materials: Vec<MaterialSlot>,
    /// Source winding flag; emitted triangles are normalized regardless.
    pub clockwise: bool,

    corner_map: Vec<u32>,
    face_sets: Vec<ObjectId>,
    face_set_names: Vec<String>,
    raw_positions: Option<Arc<Vec<Vec3>>>,
    raw_counts: Option<Arc<Vec<i32>>>,
    raw_indices: Option<Arc<Vec<i32>>>,
    pub(crate) bounds: BBox3f,
}

impl MeshState {
    /// Bind to the archive object: read the winding flag and collect
    /// face-set children in declared order. Resolved buffers reset.
    pub(crate) fn init(&mut self, archive: &Archive, obj: ObjectId) {
        *self = Self::default();
        self.clockwise = archive.metadata(obj, CLOCKWISE_METADATA_KEY) == Some("true");
        for &child in archive.children(obj) {
            if archive.matches_schema(child, FACESET_SCHEMA) {
                if let Some(entry) = archive.get(child) {
                    self.face_sets.push(child);
                    self.face_set_names.push(entry.name.clone());
                }
            }
        }
    }

    /// Resolve the mesh at `time`.
    ///
    /// Under [`ResamplePolicy::Incremental`], a sample whose position, index
    /// and count arrays all keep their previous lengths skips
    /// retriangulation (face-set meshes still redo the face-to-triangle
    /// resolution, the sets may reorder faces without resizing anything) and
    /// a position array unchanged by allocation identity skips the position
    /// copy. Either way normals and UVs refresh. Everything else runs the
    /// full rebuild, materials included.
    pub(crate) fn resample(
        &mut self,
        archive: &Archive,
        obj: ObjectId,
        time: Chrono,
        policy: ResamplePolicy,
    ) {
        let Some(entry) = archive.get(obj) else { return };

        let new_p = entry.property("P").and_then(|p| p.vec3s_at(time));
        let new_counts = entry.property(".faceCounts").and_then(|p| p.i32s_at(time));
        let new_indices = entry.property(".faceIndices").and_then(|p| p.i32s_at(time));
        let (Some(new_p), Some(new_counts), Some(new_indices)) = (new_p, new_counts, new_indices)
        else {
            trace!(path = %entry.path, "mesh sample incomplete, nothing resolved");
            return;
        };

        let (raw_n, n_scope) = match entry.property("N") {
            Some(p) => (p.vec3s_at(time), p.scope),
            None => (None, GeometryScope::Vertex),
        };
        let (raw_uv, uv_scope) = match entry.property("uv") {
            Some(p) => (p.vec2s_at(time), p.scope),
            None => (None, GeometryScope::FaceVarying),
        };

        let same_topology = match (&self.raw_positions, &self.raw_counts, &self.raw_indices) {
            (Some(p), Some(c), Some(i)) => {
                p.len() == new_p.len()
                    && c.len() == new_counts.len()
                    && i.len() == new_indices.len()
            }
            _ => false,
        };

        if policy == ResamplePolicy::Incremental && same_topology {
            if !self.face_sets.is_empty() {
                let faces = self.faceset_faces(archive, time);
                let refs: Vec<&[i32]> = faces.iter().map(|f| f.as_slice()).collect();
                let (tris, corner_map, set_counts) = resolve::triangulate_facesets(
                    &new_counts,
                    &new_indices,
                    new_p.len(),
                    self.clockwise,
                    &refs,
                );
                self.triangles = tris;
                self.corner_map = corner_map;
                self.tri_counts = set_counts;
            }
            let same_positions = self
                .raw_positions
                .as_ref()
                .map(|p| Arc::ptr_eq(p, &new_p))
                .unwrap_or(false);
            if !same_positions {
                self.positions.clear();
                self.positions.extend_from_slice(&new_p);
            }
            self.resolve_attrs(
                raw_n.as_ref().map(|a| a.as_slice()),
                n_scope,
                raw_uv.as_ref().map(|a| a.as_slice()),
                uv_scope,
            );
            trace!(path = %entry.path, same_positions, "mesh resolved on the fast path");
        } else {
            if self.face_sets.is_empty() {
                let (tris, corner_map) =
                    resolve::triangulate(&new_counts, &new_indices, new_p.len(), self.clockwise);
                self.triangles = tris;
                self.corner_map = corner_map;
                self.tri_counts.clear();
            } else {
                let faces = self.faceset_faces(archive, time);
                let refs: Vec<&[i32]> = faces.iter().map(|f| f.as_slice()).collect();
                let (tris, corner_map, set_counts) = resolve::triangulate_facesets(
                    &new_counts,
                    &new_indices,
                    new_p.len(),
                    self.clockwise,
                    &refs,
                );
                self.triangles = tris;
                self.corner_map = corner_map;
                self.tri_counts = set_counts;
            }
            self.positions.clear();
            self.positions.extend_from_slice(&new_p);
            self.resolve_attrs(
                raw_n.as_ref().map(|a| a.as_slice()),
                n_scope,
                raw_uv.as_ref().map(|a| a.as_slice()),
                uv_scope,
            );
            self.refresh_materials();
            debug!(
                path = %entry.path,
                tris = self.triangles.len() / 3,
                verts = self.positions.len(),
                "mesh rebuilt"
            );
        }

        self.raw_positions = Some(new_p);
        self.raw_counts = Some(new_counts);
        self.raw_indices = Some(new_indices);

        self.bounds = entry
            .property(".selfBnds")
            .and_then(|p| p.box3_at(time))
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| BBox3f::from_points(&self.positions));
    }

    fn resolve_attrs(
        &mut self,
        raw_n: Option<&[Vec3]>,
        n_scope: GeometryScope,
        raw_uv: Option<&[Vec2]>,
        uv_scope: GeometryScope,
    ) {
        self.normals = match raw_n {
            Some(raw) => {
                let resolved =
                    resolve::resolve_attr(raw, n_scope, self.positions.len(), &self.corner_map);
                if resolved.is_empty() {
                    AttrBuffer::Vertex(resolve::smooth_vertex_normals(
                        &self.positions,
                        &self.triangles,
                    ))
                } else {
                    resolved
                }
            }
            None => AttrBuffer::Vertex(resolve::smooth_vertex_normals(
                &self.positions,
                &self.triangles,
            )),
        };
        self.uvs = match raw_uv {
            Some(raw) => {
                resolve::resolve_attr(raw, uv_scope, self.positions.len(), &self.corner_map)
            }
            None => AttrBuffer::Empty,
        };
    }

    /// Face lists of every face-set child at `time`, in declared order.
    fn faceset_faces(&self, archive: &Archive, time: Chrono) -> Vec<Arc<Vec<i32>>> {
        self.face_sets
            .iter()
            .map(|&fs| {
                archive
                    .property(fs, ".faces")
                    .and_then(|p| p.i32s_at(time))
                    .unwrap_or_default()
            })
            .collect()
    }

    fn refresh_materials(&mut self) {
        if self.materials.is_empty() {
            self.seed_materials();
        } else {
            self.update_material();
        }
    }

    /// Fresh default slots: one per face-set, or a single slot spanning the
    /// whole mesh.
    fn seed_materials(&mut self) {
        if self.face_sets.is_empty() {
            self.materials = vec![MaterialSlot {
                name: "default".to_string(),
                material: Material::default(),
                tri_count: (self.triangles.len() / 3) as u32,
            }];
        } else {
            self.materials = self
                .face_set_names
                .iter()
                .zip(&self.tri_counts)
                .map(|(name, &count)| MaterialSlot {
                    name: name.clone(),
                    material: Material::default(),
                    tri_count: count,
                })
                .collect();
        }
    }

    /// Rebuild the slot list by matching face-sets against same-named
    /// entries in the existing list.
    ///
    /// A slot whose recorded triangle count no longer matches is reported
    /// and reassigned with the fresh count. The list is replaced only when
    /// it comes back at the same length; a partial rebuild keeps the
    /// previous assignment intact.
    pub fn update_material(&mut self) {
        if self.face_sets.is_empty() {
            let total = (self.triangles.len() / 3) as u32;
            if self.materials.len() == 1 {
                self.materials[0].tri_count = total;
            } else {
                self.seed_materials();
            }
            return;
        }

        let mut rebuilt = Vec::with_capacity(self.face_set_names.len());
        for (i, name) in self.face_set_names.iter().enumerate() {
            let fresh = self.tri_counts.get(i).copied().unwrap_or(0);
            if let Some(slot) = self.materials.iter().find(|m| &m.name == name) {
                if slot.tri_count != fresh {
                    warn!(
                        face_set = %name,
                        recorded = slot.tri_count,
                        fresh,
                        "face-set triangle count changed"
                    );
                }
                rebuilt.push(MaterialSlot {
                    name: name.clone(),
                    material: slot.material.clone(),
                    tri_count: fresh,
                });
            }
        }
        if rebuilt.len() == self.materials.len() {
            self.materials = rebuilt;
        } else {
            warn!(
                rebuilt = rebuilt.len(),
                existing = self.materials.len(),
                "material slot mismatch, keeping previous assignment"
            );
        }
    }

    /// Material slot covering the given triangle index.
    pub fn material_from_face_index(&self, face_index: u32) -> Option<&MaterialSlot> {
        let mut offset = 0u32;
        for slot in &self.materials {
            if face_index < offset + slot.tri_count {
                return Some(slot);
            }
            offset += slot.tri_count;
        }
        None
    }

    /// Face-set children this mesh was bound to.
    pub(crate) fn face_sets(&self) -> &[ObjectId] {
        &self.face_sets
    }

    /// Resolved triangle count.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Local-space bounds of the current sample.
    pub fn bounds(&self) -> BBox3f {
        self.bounds
    }
}
