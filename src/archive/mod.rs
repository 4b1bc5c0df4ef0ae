//! Read-only animated-geometry archives.
//!
//! An [`Archive`] holds a flat table of objects forming a named hierarchy.
//! Objects carry a schema title, string metadata, and named time-sampled
//! properties. The scene layer keeps [`ObjectId`] handles into the table;
//! handles are plain indices and never own archive data.
//!
//! On disk an archive is a JSON document, optionally gzip-compressed
//! (detected by magic bytes). [`ArchiveBuilder`] produces the same documents
//! programmatically.

pub mod doc;
pub mod property;
pub mod schema;
pub mod time_sampling;

pub use doc::{ArchiveBuilder, ObjectSpec};
pub use property::{GeometryScope, Property, PropertyData};
pub use schema::SchemaKind;
pub use time_sampling::TimeSampling;

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;

use crate::util::{Error, Result};

/// Gzip magic bytes used to sniff compressed documents.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Index of an object in its archive. Copyable; never owns the object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One object in the archive hierarchy.
#[derive(Clone, Debug)]
pub struct ObjectEntry {
    /// Object name, unique among its siblings.
    pub name: String,
    /// Full path from the root, e.g. `/group/mesh`.
    pub path: String,
    /// Schema title string; empty for plain containers.
    pub schema: String,
    /// String metadata from the object header.
    pub metadata: HashMap<String, String>,
    /// Named properties in declared order.
    pub properties: Vec<Property>,
    /// Children in declared order.
    pub children: Vec<ObjectId>,
    /// Parent object; `None` for the root.
    pub parent: Option<ObjectId>,
}

impl ObjectEntry {
    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A loaded, read-only archive.
#[derive(Debug)]
pub struct Archive {
    pub(crate) objects: Vec<ObjectEntry>,
    pub(crate) root: ObjectId,
    pub(crate) path: PathBuf,
}

impl Archive {
    /// Open an archive document from disk.
    ///
    /// Fails when the path does not exist or the document cannot be decoded.
    /// Gzip-compressed documents are detected by their magic bytes.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        let doc: doc::ArchiveDoc = if bytes.starts_with(&GZIP_MAGIC) {
            let mut plain = Vec::new();
            GzDecoder::new(&bytes[..]).read_to_end(&mut plain)?;
            serde_json::from_slice(&plain)?
        } else {
            serde_json::from_slice(&bytes)?
        };

        let mut archive = doc.into_archive()?;
        archive.path = path.to_path_buf();
        debug!(
            path = %path.display(),
            objects = archive.objects.len(),
            "opened archive"
        );
        Ok(archive)
    }

    /// Root object of the hierarchy.
    #[inline]
    pub fn root(&self) -> ObjectId {
        self.root
    }

    /// Look up an object entry; `None` for a stale or foreign id.
    #[inline]
    pub fn get(&self, id: ObjectId) -> Option<&ObjectEntry> {
        self.objects.get(id.index())
    }

    /// Children of an object, empty for invalid ids.
    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.get(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Find a direct child by name.
    pub fn child_by_name(&self, id: ObjectId, name: &str) -> Option<ObjectId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.get(c).is_some_and(|e| e.name == name))
    }

    /// Find an object by full path like `/parent/child`.
    pub fn find(&self, path: &str) -> Option<ObjectId> {
        let mut cur = self.root;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            cur = self.child_by_name(cur, part)?;
        }
        Some(cur)
    }

    /// Look up a property on an object.
    pub fn property(&self, id: ObjectId, name: &str) -> Option<&Property> {
        self.get(id).and_then(|e| e.property(name))
    }

    /// Look up a metadata value on an object.
    pub fn metadata(&self, id: ObjectId, key: &str) -> Option<&str> {
        self.get(id).and_then(|e| e.metadata.get(key)).map(|s| s.as_str())
    }

    /// Check an object's schema title.
    pub fn matches_schema(&self, id: ObjectId, schema: &str) -> bool {
        self.get(id).is_some_and(|e| e.schema == schema)
    }

    /// Recognized schema kind of an object, `None` for containers and
    /// unknown titles.
    pub fn schema_kind(&self, id: ObjectId) -> Option<SchemaKind> {
        self.get(id).and_then(|e| SchemaKind::from_title(&e.schema))
    }

    /// Total number of objects, root included.
    #[inline]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Source path, empty for archives built in memory.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let err = Archive::open("/nonexistent/archive.gsa").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_find_by_path() {
        let mut builder = ArchiveBuilder::new();
        builder.add(
            ObjectSpec::group("group").child(ObjectSpec::new("mesh", schema::POLYMESH_SCHEMA)),
        );
        let archive = builder.build().unwrap();

        let mesh = archive.find("/group/mesh").unwrap();
        let entry = archive.get(mesh).unwrap();
        assert_eq!(entry.path, "/group/mesh");
        assert!(archive.matches_schema(mesh, schema::POLYMESH_SCHEMA));
        assert_eq!(archive.schema_kind(mesh), Some(SchemaKind::PolyMesh));
        assert!(archive.find("/group/other").is_none());

        let group = archive.find("/group").unwrap();
        assert_eq!(archive.children(group).len(), 1);
        assert_eq!(archive.get(mesh).unwrap().parent, Some(group));
    }
}
