//! Pure resampling helpers: triangulation, attribute resolution, normal
//! synthesis.
//!
//! Everything here is a plain function over slices so the mesh node can run
//! the same code on both its full and incremental paths.

use glam::Vec3;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::archive::GeometryScope;

/// Resolved attribute storage.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrBuffer<T> {
    /// Attribute absent or unusable.
    Empty,
    /// One value per vertex, indexed by the triangle array.
    Vertex(Vec<T>),
    /// One value per emitted triangle corner (three per triangle).
    Corner(Vec<T>),
}

impl<T> AttrBuffer<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Vertex(v) | Self::Corner(v) => v.len(),
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Empty => &[],
            Self::Vertex(v) | Self::Corner(v) => v.as_slice(),
        }
    }

    /// True when values attach to emitted corners rather than vertices.
    pub fn is_corner(&self) -> bool {
        matches!(self, Self::Corner(_))
    }
}

impl<T> Default for AttrBuffer<T> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Offset of each face's first corner in the flat index array.
pub fn face_offsets(counts: &[i32]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(counts.len());
    let mut off = 0usize;
    for &c in counts {
        offsets.push(off);
        off += c.max(0) as usize;
    }
    offsets
}

/// Emit a triangle fan for one face.
///
/// The fan is anchored at the face's first corner: (c0, c1, c2), then
/// (c0, c[i], c[i+1]) for each further corner. When `clockwise` is false the
/// second and third corners of every triangle are swapped, normalizing the
/// output to one winding convention. `corner_map` receives the source corner
/// index behind each emitted index.
///
/// Returns false when the face references data outside the arrays; the
/// caller stops its traversal there.
fn emit_face_fan(
    face: usize,
    counts: &[i32],
    indices: &[i32],
    offsets: &[usize],
    vert_count: usize,
    clockwise: bool,
    tris: &mut Vec<u32>,
    corner_map: &mut Vec<u32>,
) -> bool {
    let count = counts[face].max(0) as usize;
    let off = offsets[face];
    if count < 3 {
        // Degenerate faces contribute nothing but do not stop the traversal.
        return true;
    }
    if off + count > indices.len() {
        return false;
    }

    // Negative indices wrap to large values and fail the range check.
    let corners: SmallVec<[u32; 8]> = indices[off..off + count]
        .iter()
        .map(|&i| i as u32)
        .collect();
    if corners.iter().any(|&v| (v as usize) >= vert_count) {
        return false;
    }

    for i in 1..count - 1 {
        if clockwise {
            tris.extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
            corner_map.extend_from_slice(&[off as u32, (off + i) as u32, (off + i + 1) as u32]);
        } else {
            tris.extend_from_slice(&[corners[0], corners[i + 1], corners[i]]);
            corner_map.extend_from_slice(&[off as u32, (off + i + 1) as u32, (off + i) as u32]);
        }
    }
    true
}

/// Fan-triangulate every face in order.
///
/// Returns the flat triangle index array (three per triangle) and the
/// emitted-corner to source-corner map. A face referencing a vertex outside
/// the position array stops the traversal; faces before it stay resolved.
pub fn triangulate(
    counts: &[i32],
    indices: &[i32],
    vert_count: usize,
    clockwise: bool,
) -> (Vec<u32>, Vec<u32>) {
    let estimate: usize = counts
        .iter()
        .map(|&c| (c.max(0) as usize).saturating_sub(2))
        .sum();
    let offsets = face_offsets(counts);
    let mut tris = Vec::with_capacity(estimate * 3);
    let mut corner_map = Vec::with_capacity(estimate * 3);

    for face in 0..counts.len() {
        if !emit_face_fan(
            face, counts, indices, &offsets, vert_count, clockwise, &mut tris, &mut corner_map,
        ) {
            warn!(face, "face references out-of-range data, truncating mesh");
            break;
        }
    }
    (tris, corner_map)
}

/// Fan-triangulate face-set by face-set.
///
/// Triangles of each face-set are appended contiguously and the returned
/// counts record how many triangles each produced, so material assignment is
/// a running-offset slice. An out-of-range vertex stops only that face-set's
/// traversal; later face-sets still resolve.
pub fn triangulate_facesets(
    counts: &[i32],
    indices: &[i32],
    vert_count: usize,
    clockwise: bool,
    face_sets: &[&[i32]],
) -> (Vec<u32>, Vec<u32>, Vec<u32>) {
    let offsets = face_offsets(counts);
    let mut tris = Vec::new();
    let mut corner_map = Vec::new();
    let mut set_counts = Vec::with_capacity(face_sets.len());

    for faces in face_sets {
        let before = tris.len();
        for &face in *faces {
            let face = face as u32 as usize;
            if face >= counts.len() {
                debug!(face, "face-set references a missing face, skipping");
                continue;
            }
            if !emit_face_fan(
                face, counts, indices, &offsets, vert_count, clockwise, &mut tris, &mut corner_map,
            ) {
                warn!(face, "face references out-of-range data, truncating face-set");
                break;
            }
        }
        set_counts.push(((tris.len() - before) / 3) as u32);
    }
    (tris, corner_map, set_counts)
}

/// Resolve a raw attribute array against the triangulated mesh.
///
/// The declared scope decides the granularity; when the scope is ambiguous
/// the lengths decide. Arrays that fit neither granularity resolve to
/// [`AttrBuffer::Empty`].
pub fn resolve_attr<T: Copy>(
    raw: &[T],
    scope: GeometryScope,
    vert_count: usize,
    corner_map: &[u32],
) -> AttrBuffer<T> {
    if raw.is_empty() {
        return AttrBuffer::Empty;
    }
    match scope {
        GeometryScope::FaceVarying => remap_corners(raw, corner_map),
        s if s.is_vertex_like() => {
            if raw.len() == vert_count {
                AttrBuffer::Vertex(raw.to_vec())
            } else {
                AttrBuffer::Empty
            }
        }
        _ => {
            if raw.len() == vert_count {
                AttrBuffer::Vertex(raw.to_vec())
            } else {
                remap_corners(raw, corner_map)
            }
        }
    }
}

fn remap_corners<T: Copy>(raw: &[T], corner_map: &[u32]) -> AttrBuffer<T> {
    if corner_map.iter().any(|&c| (c as usize) >= raw.len()) {
        return AttrBuffer::Empty;
    }
    AttrBuffer::Corner(corner_map.iter().map(|&c| raw[c as usize]).collect())
}

/// Synthesize smooth per-vertex normals from the triangulated result.
///
/// The raw cross product of each triangle's edges is accumulated at all
/// three corners and normalized per vertex; the sum is unweighted, which
/// gives an implicit area weighting.
pub fn smooth_vertex_normals(positions: &[Vec3], tris: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in tris.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}
