//! On-disk document format and programmatic archive construction.
//!
//! The document is plain JSON (optionally gzip-compressed): one object tree,
//! a shared time-sampling table, and per-property sample payloads. The format
//! is an input-layer detail; [`Archive::open`] and [`ArchiveBuilder`] are the
//! only entry points that touch it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;
use glam::{DMat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::property::{GeometryScope, Property, PropertyData};
use super::time_sampling::TimeSampling;
use super::{Archive, ObjectEntry, ObjectId};
use crate::util::{BBox3f, Chrono, Error, Result};

/// Current document version.
const DOC_VERSION: u32 = 1;

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct ArchiveDoc {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_samplings: Vec<TimeSamplingDoc>,
    pub root: ObjectDoc,
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct ObjectDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schema: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ObjectDoc>,
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct PropertyDoc {
    pub name: String,
    /// Geometry scope token (`con`/`uni`/`var`/`vtx`/`fvr`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Index into the time-sampling table; `None` means identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<usize>,
    #[serde(flatten)]
    pub data: PropertyDataDoc,
}

/// Sample payloads, one entry per sample. Vector-valued arrays are stored
/// flat (2 or 3 floats per element) and validated on load.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "samples", rename_all = "snake_case")]
pub(crate) enum PropertyDataDoc {
    Bool(Vec<bool>),
    F64(Vec<f64>),
    /// Column-major 4x4 matrices.
    Mat4(Vec<[f64; 16]>),
    /// min xyz followed by max xyz.
    Box3(Vec<[f32; 6]>),
    F32Array(Vec<Vec<f32>>),
    I32Array(Vec<Vec<i32>>),
    Vec2Array(Vec<Vec<f32>>),
    Vec3Array(Vec<Vec<f32>>),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum TimeSamplingDoc {
    Identity,
    Uniform { start: Chrono, step: Chrono },
    Acyclic { times: Vec<Chrono> },
}

impl From<&TimeSamplingDoc> for TimeSampling {
    fn from(doc: &TimeSamplingDoc) -> Self {
        match doc {
            TimeSamplingDoc::Identity => TimeSampling::Identity,
            TimeSamplingDoc::Uniform { start, step } => TimeSampling::Uniform {
                start: *start,
                step: *step,
            },
            TimeSamplingDoc::Acyclic { times } => TimeSampling::Acyclic {
                times: times.clone(),
            },
        }
    }
}

impl ArchiveDoc {
    /// Convert the document tree into a flat archive table.
    pub(crate) fn into_archive(self) -> Result<Archive> {
        if self.version != DOC_VERSION {
            return Err(Error::invalid(format!(
                "unsupported document version {}",
                self.version
            )));
        }

        let samplings: Vec<TimeSampling> =
            self.time_samplings.iter().map(TimeSampling::from).collect();

        let mut objects = Vec::new();
        let root = flatten_object(self.root, None, "", &samplings, &mut objects)?;
        Ok(Archive {
            objects,
            root,
            path: Default::default(),
        })
    }
}

fn flatten_object(
    doc: ObjectDoc,
    parent: Option<ObjectId>,
    parent_path: &str,
    samplings: &[TimeSampling],
    objects: &mut Vec<ObjectEntry>,
) -> Result<ObjectId> {
    let path = if parent.is_none() {
        "/".to_string()
    } else if parent_path == "/" {
        format!("/{}", doc.name)
    } else {
        format!("{}/{}", parent_path, doc.name)
    };

    let id = ObjectId(objects.len() as u32);
    let mut properties = Vec::with_capacity(doc.properties.len());
    for prop in doc.properties {
        properties.push(convert_property(prop, samplings)?);
    }
    objects.push(ObjectEntry {
        name: doc.name,
        path: path.clone(),
        schema: doc.schema,
        metadata: doc.metadata.into_iter().collect(),
        properties,
        children: Vec::new(),
        parent,
    });

    let mut child_ids = Vec::with_capacity(doc.children.len());
    for child in doc.children {
        child_ids.push(flatten_object(child, Some(id), &path, samplings, objects)?);
    }
    objects[id.index()].children = child_ids;
    Ok(id)
}

fn convert_property(doc: PropertyDoc, samplings: &[TimeSampling]) -> Result<Property> {
    let time_sampling = match doc.sampling {
        None => TimeSampling::Identity,
        Some(i) => samplings.get(i).cloned().ok_or_else(|| {
            Error::invalid(format!(
                "property '{}' references missing time sampling {}",
                doc.name, i
            ))
        })?,
    };
    let scope = doc
        .scope
        .as_deref()
        .map(GeometryScope::from_str)
        .unwrap_or_default();

    let data = match doc.data {
        PropertyDataDoc::Bool(v) => PropertyData::Bool(v),
        PropertyDataDoc::F64(v) => PropertyData::F64(v),
        PropertyDataDoc::Mat4(v) => {
            PropertyData::Mat4(v.iter().map(DMat4::from_cols_array).collect())
        }
        PropertyDataDoc::Box3(v) => PropertyData::Box3(
            v.iter()
                .map(|b| {
                    BBox3f::new(Vec3::new(b[0], b[1], b[2]), Vec3::new(b[3], b[4], b[5]))
                })
                .collect(),
        ),
        PropertyDataDoc::F32Array(v) => {
            PropertyData::F32Array(v.into_iter().map(Arc::new).collect())
        }
        PropertyDataDoc::I32Array(v) => {
            PropertyData::I32Array(v.into_iter().map(Arc::new).collect())
        }
        PropertyDataDoc::Vec2Array(v) => {
            let mut samples = Vec::with_capacity(v.len());
            for flat in v {
                if flat.len() % 2 != 0 {
                    return Err(Error::invalid(format!(
                        "property '{}' has a vec2 sample of {} floats",
                        doc.name,
                        flat.len()
                    )));
                }
                samples.push(Arc::new(
                    flat.chunks_exact(2).map(|c| Vec2::new(c[0], c[1])).collect(),
                ));
            }
            PropertyData::Vec2Array(samples)
        }
        PropertyDataDoc::Vec3Array(v) => {
            let mut samples = Vec::with_capacity(v.len());
            for flat in v {
                if flat.len() % 3 != 0 {
                    return Err(Error::invalid(format!(
                        "property '{}' has a vec3 sample of {} floats",
                        doc.name,
                        flat.len()
                    )));
                }
                samples.push(Arc::new(
                    flat.chunks_exact(3)
                        .map(|c| Vec3::new(c[0], c[1], c[2]))
                        .collect(),
                ));
            }
            PropertyData::Vec3Array(samples)
        }
    };

    Ok(Property {
        name: doc.name,
        scope,
        time_sampling,
        data,
    })
}

/// Declarative object description consumed by [`ArchiveBuilder`].
///
/// ```ignore
/// let mesh = ObjectSpec::new("tri", POLYMESH_SCHEMA)
///     .prop_vec3_array("P", GeometryScope::Vertex, None, vec![positions])
///     .prop_i32_array(".faceCounts", None, vec![vec![3]])
///     .prop_i32_array(".faceIndices", None, vec![vec![0, 1, 2]]);
/// ```
#[derive(Clone)]
pub struct ObjectSpec {
    doc: ObjectDoc,
}

impl ObjectSpec {
    /// New object with a schema title.
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            doc: ObjectDoc {
                name: name.into(),
                schema: schema.into(),
                metadata: BTreeMap::new(),
                properties: Vec::new(),
                children: Vec::new(),
            },
        }
    }

    /// New plain container object (no schema).
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    /// Attach a metadata key/value pair.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.doc.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach a child object.
    pub fn child(mut self, spec: ObjectSpec) -> Self {
        self.doc.children.push(spec.doc);
        self
    }

    fn prop(mut self, name: impl Into<String>, scope: Option<GeometryScope>, sampling: Option<usize>, data: PropertyDataDoc) -> Self {
        self.doc.properties.push(PropertyDoc {
            name: name.into(),
            scope: scope.map(|s| s.as_str().to_string()),
            sampling,
            data,
        });
        self
    }

    /// Bool scalar property.
    pub fn prop_bool(self, name: impl Into<String>, sampling: Option<usize>, samples: Vec<bool>) -> Self {
        self.prop(name, None, sampling, PropertyDataDoc::Bool(samples))
    }

    /// F64 scalar property.
    pub fn prop_f64(self, name: impl Into<String>, sampling: Option<usize>, samples: Vec<f64>) -> Self {
        self.prop(name, None, sampling, PropertyDataDoc::F64(samples))
    }

    /// 4x4 matrix property.
    pub fn prop_mat4(self, name: impl Into<String>, sampling: Option<usize>, samples: Vec<DMat4>) -> Self {
        let flat = samples.iter().map(|m| m.to_cols_array()).collect();
        self.prop(name, None, sampling, PropertyDataDoc::Mat4(flat))
    }

    /// Bounding box property.
    pub fn prop_box3(self, name: impl Into<String>, sampling: Option<usize>, samples: Vec<BBox3f>) -> Self {
        let flat = samples
            .iter()
            .map(|b| [b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z])
            .collect();
        self.prop(name, None, sampling, PropertyDataDoc::Box3(flat))
    }

    /// F32 array property.
    pub fn prop_f32_array(self, name: impl Into<String>, sampling: Option<usize>, samples: Vec<Vec<f32>>) -> Self {
        self.prop(name, None, sampling, PropertyDataDoc::F32Array(samples))
    }

    /// I32 array property.
    pub fn prop_i32_array(self, name: impl Into<String>, sampling: Option<usize>, samples: Vec<Vec<i32>>) -> Self {
        self.prop(name, None, sampling, PropertyDataDoc::I32Array(samples))
    }

    /// Vec2 array property with an attribute scope.
    pub fn prop_vec2_array(self, name: impl Into<String>, scope: GeometryScope, sampling: Option<usize>, samples: Vec<Vec<Vec2>>) -> Self {
        let flat = samples
            .into_iter()
            .map(|s| s.into_iter().flat_map(|v| [v.x, v.y]).collect())
            .collect();
        self.prop(name, Some(scope), sampling, PropertyDataDoc::Vec2Array(flat))
    }

    /// Vec3 array property with an attribute scope.
    pub fn prop_vec3_array(self, name: impl Into<String>, scope: GeometryScope, sampling: Option<usize>, samples: Vec<Vec<Vec3>>) -> Self {
        let flat = samples
            .into_iter()
            .map(|s| s.into_iter().flat_map(|v| [v.x, v.y, v.z]).collect())
            .collect();
        self.prop(name, Some(scope), sampling, PropertyDataDoc::Vec3Array(flat))
    }
}

/// Programmatic archive construction.
///
/// Collects time samplings and an object tree, then either materializes an
/// in-memory [`Archive`] or writes the document to disk.
#[derive(Default)]
pub struct ArchiveBuilder {
    time_samplings: Vec<TimeSamplingDoc>,
    children: Vec<ObjectDoc>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a uniform time sampling; returns its table index.
    pub fn uniform_sampling(&mut self, start: Chrono, step: Chrono) -> usize {
        self.time_samplings.push(TimeSamplingDoc::Uniform { start, step });
        self.time_samplings.len() - 1
    }

    /// Register an acyclic time sampling; returns its table index.
    pub fn acyclic_sampling(&mut self, times: Vec<Chrono>) -> usize {
        self.time_samplings.push(TimeSamplingDoc::Acyclic { times });
        self.time_samplings.len() - 1
    }

    /// Add a top-level object under the root.
    pub fn add(&mut self, spec: ObjectSpec) -> &mut Self {
        self.children.push(spec.doc);
        self
    }

    fn to_doc(&self) -> ArchiveDoc {
        ArchiveDoc {
            version: DOC_VERSION,
            time_samplings: self.time_samplings.clone(),
            root: ObjectDoc {
                name: String::new(),
                schema: String::new(),
                metadata: BTreeMap::new(),
                properties: Vec::new(),
                children: self.children.clone(),
            },
        }
    }

    /// Materialize an in-memory archive.
    pub fn build(&self) -> Result<Archive> {
        self.to_doc().into_archive()
    }

    /// Write the document as plain JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &self.to_doc())?;
        Ok(())
    }

    /// Write the document gzip-compressed.
    pub fn save_compressed<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        serde_json::to_writer(&mut encoder, &self.to_doc())?;
        encoder.finish()?;
        Ok(())
    }
}
