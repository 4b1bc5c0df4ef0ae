//! Typed properties with per-sample payloads.
//!
//! Array samples are shared behind `Arc` so repeated reads of the same sample
//! return the same allocation. Callers can compare sample identity with
//! `Arc::ptr_eq` to detect that nothing changed between two reads.

use std::sync::Arc;

use glam::{DMat4, Vec2, Vec3};

use super::time_sampling::TimeSampling;
use crate::util::{BBox3f, Chrono, TimeRange};

/// Scope/extent of data in a geometry sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeometryScope {
    /// Constant for entire object.
    #[default]
    Constant,
    /// Per-face varying.
    Uniform,
    /// Per-vertex.
    Varying,
    /// Per-vertex.
    Vertex,
    /// Per-face-corner.
    FaceVarying,
}

impl GeometryScope {
    /// Parse from string (as stored in metadata).
    pub fn from_str(s: &str) -> Self {
        match s {
            "con" | "constant" => Self::Constant,
            "uni" | "uniform" => Self::Uniform,
            "var" | "varying" => Self::Varying,
            "vtx" | "vertex" => Self::Vertex,
            "fvr" | "facevarying" => Self::FaceVarying,
            _ => Self::Constant,
        }
    }

    /// Convert to short string for metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "con",
            Self::Uniform => "uni",
            Self::Varying => "var",
            Self::Vertex => "vtx",
            Self::FaceVarying => "fvr",
        }
    }

    /// True for the per-vertex granularities.
    pub fn is_vertex_like(&self) -> bool {
        matches!(self, Self::Varying | Self::Vertex)
    }
}

/// Per-sample payloads for one property. All samples share one variant.
#[derive(Clone, Debug)]
pub enum PropertyData {
    Bool(Vec<bool>),
    F64(Vec<f64>),
    Mat4(Vec<DMat4>),
    Box3(Vec<BBox3f>),
    F32Array(Vec<Arc<Vec<f32>>>),
    I32Array(Vec<Arc<Vec<i32>>>),
    Vec2Array(Vec<Arc<Vec<Vec2>>>),
    Vec3Array(Vec<Arc<Vec<Vec3>>>),
}

impl PropertyData {
    /// Number of recorded samples.
    pub fn sample_count(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Mat4(v) => v.len(),
            Self::Box3(v) => v.len(),
            Self::F32Array(v) => v.len(),
            Self::I32Array(v) => v.len(),
            Self::Vec2Array(v) => v.len(),
            Self::Vec3Array(v) => v.len(),
        }
    }
}

/// A named, time-sampled property of an archive object.
#[derive(Clone, Debug)]
pub struct Property {
    pub name: String,
    pub scope: GeometryScope,
    pub time_sampling: TimeSampling,
    pub data: PropertyData,
}

impl Property {
    /// Number of recorded samples.
    pub fn sample_count(&self) -> usize {
        self.data.sample_count()
    }

    /// True when the property never changes over time.
    pub fn is_constant(&self) -> bool {
        self.sample_count() <= 1 || self.time_sampling.is_identity()
    }

    /// Time range covered by the recorded samples (empty when static).
    pub fn time_range(&self) -> TimeRange {
        self.time_sampling.range(self.sample_count())
    }

    /// Nearest sample index for a requested time.
    pub fn index_at(&self, time: Chrono) -> usize {
        self.time_sampling.near_index(time, self.sample_count()).0
    }

    /// Bool scalar at an explicit sample index.
    pub fn bool_sample(&self, index: usize) -> Option<bool> {
        match &self.data {
            PropertyData::Bool(v) => v.get(index).copied(),
            _ => None,
        }
    }

    /// 4x4 matrix at an explicit sample index.
    pub fn mat4_sample(&self, index: usize) -> Option<DMat4> {
        match &self.data {
            PropertyData::Mat4(v) => v.get(index).copied(),
            _ => None,
        }
    }

    /// Bool scalar at the nearest sample.
    pub fn bool_at(&self, time: Chrono) -> Option<bool> {
        match &self.data {
            PropertyData::Bool(v) => v.get(self.index_at(time)).copied(),
            _ => None,
        }
    }

    /// F64 scalar at the nearest sample.
    pub fn f64_at(&self, time: Chrono) -> Option<f64> {
        match &self.data {
            PropertyData::F64(v) => v.get(self.index_at(time)).copied(),
            _ => None,
        }
    }

    /// 4x4 matrix at the nearest sample.
    pub fn mat4_at(&self, time: Chrono) -> Option<DMat4> {
        match &self.data {
            PropertyData::Mat4(v) => v.get(self.index_at(time)).copied(),
            _ => None,
        }
    }

    /// Bounding box at the nearest sample.
    pub fn box3_at(&self, time: Chrono) -> Option<BBox3f> {
        match &self.data {
            PropertyData::Box3(v) => v.get(self.index_at(time)).copied(),
            _ => None,
        }
    }

    /// F32 array at the nearest sample (shared, identity-comparable).
    pub fn f32s_at(&self, time: Chrono) -> Option<Arc<Vec<f32>>> {
        match &self.data {
            PropertyData::F32Array(v) => v.get(self.index_at(time)).cloned(),
            _ => None,
        }
    }

    /// I32 array at the nearest sample (shared, identity-comparable).
    pub fn i32s_at(&self, time: Chrono) -> Option<Arc<Vec<i32>>> {
        match &self.data {
            PropertyData::I32Array(v) => v.get(self.index_at(time)).cloned(),
            _ => None,
        }
    }

    /// Vec2 array at the nearest sample (shared, identity-comparable).
    pub fn vec2s_at(&self, time: Chrono) -> Option<Arc<Vec<Vec2>>> {
        match &self.data {
            PropertyData::Vec2Array(v) => v.get(self.index_at(time)).cloned(),
            _ => None,
        }
    }

    /// Vec3 array at the nearest sample (shared, identity-comparable).
    pub fn vec3s_at(&self, time: Chrono) -> Option<Arc<Vec<Vec3>>> {
        match &self.data {
            PropertyData::Vec3Array(v) => v.get(self.index_at(time)).cloned(),
            _ => None,
        }
    }
}
