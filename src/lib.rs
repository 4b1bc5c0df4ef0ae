//! # geostage
//!
//! Archive-backed animated scene graph and geometry resampling engine.
//!
//! Opens a hierarchical animated-geometry archive, mirrors its schema types
//! as a typed node tree, and resolves per-frame samples into renderer-ready
//! triangle/vertex/attribute buffers. Tracks enough identity state between
//! frames to skip redundant work as time advances.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (bounding boxes, time ranges, errors)
//! - [`archive`] - Read-only archive access (objects, properties, time sampling)
//! - [`scene`] - Node tree, per-frame resampling, materials, backend adapters
//!
//! ## Example
//!
//! ```ignore
//! use geostage::scene::Scene;
//!
//! let mut scene = Scene::load("shot.gsa")?;
//! scene.update(1000.0);
//! println!("{} indices resolved", scene.total_index_count());
//! ```

pub mod util;
pub mod archive;
pub mod scene;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{BBox3f, Chrono, Error, Result, TimeRange};
    pub use crate::archive::{
        Archive, ArchiveBuilder, GeometryScope, ObjectId, ObjectSpec, TimeSampling,
    };
    pub use crate::scene::{
        BackendAdapter, BackendKind, Material, MaterialSlot, NodeId, NodeKind, RenderCamera,
        ResamplePolicy, Scene, SceneLink,
    };
    pub use crate::scene::worker::{LoadCommand, LoadResult, LoaderHandle};
}
