//! Animated scene graph over an archive.
//!
//! [`Scene::load`] opens an archive, mirrors its hierarchy as typed nodes
//! and resolves the first frame. [`Scene::update`] advances time within the
//! scene's window and [`Scene::draw`] hands the resolved buffers to a
//! [`BackendAdapter`].

pub mod backend;
pub mod camera;
pub mod curves;
pub mod material;
pub mod mesh;
pub mod node;
pub mod patch;
pub mod points;
pub mod resolve;
pub mod worker;
pub mod xform;

pub use backend::{BackendAdapter, BackendKind, CurvesDraw, MeshDraw, PatchDraw, PointsDraw};
pub use camera::{CameraState, RenderCamera};
pub use curves::CurvesState;
pub use material::{Material, MaterialSlot};
pub use mesh::MeshState;
pub use node::{Node, NodeId, NodeKind};
pub use patch::PatchState;
pub use points::PointsState;
pub use resolve::AttrBuffer;
pub use xform::XformState;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Weak};

use tracing::{debug, info, trace};

use crate::archive::Archive;
use crate::util::{BBox3f, Chrono, Result, TimeRange};

/// How mesh nodes treat repeated resampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResamplePolicy {
    /// Skip retriangulation when topology sizes match and skip the position
    /// copy when the source array is unchanged by identity.
    #[default]
    Incremental,
    /// Rebuild everything on every call.
    Full,
}

/// Renderer-side counterpart a scene cross-registers its assets into.
///
/// Held weakly; the renderer owns its own lifetime and a scene never keeps
/// it alive.
pub trait SceneLink: Send + Sync {
    /// A named material became available.
    fn register_material(&self, name: &str, material: &Material);

    /// A camera node exists under this name.
    fn register_camera(&self, _name: &str) {}
}

/// Counts over the live tree's resolved geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub node_count: usize,
    pub mesh_count: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
}

/// A loaded scene: archive, node tree and sidecar materials.
pub struct Scene {
    pub(crate) archive: Archive,
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) policy: ResamplePolicy,
    pub(crate) materials: HashMap<String, Material>,
    pub(crate) link: Option<Weak<dyn SceneLink>>,
    animated: bool,
}

impl Scene {
    /// Open the archive at `path` and resolve the first frame.
    ///
    /// Also reads the sidecar material description next to the archive
    /// (same stem, `mtl` extension) and binds its entries to mesh face-sets
    /// by name.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let archive = Archive::open(path)?;
        let mut scene = Self::from_archive(archive);

        scene.materials = material::load_sidecar(&path.with_extension("mtl"));
        scene.bind_materials();

        info!(
            path = %path.display(),
            nodes = scene.nodes.len(),
            window = ?scene.window(),
            materials = scene.materials.len(),
            "scene loaded"
        );
        Ok(scene)
    }

    /// Build a scene over an already-open archive: initialize the tree,
    /// aggregate the time window and resolve the initial frame. Same
    /// pipeline as [`Scene::load`] minus the sidecar lookup.
    pub fn from_archive(archive: Archive) -> Self {
        let root_obj = archive.root();
        let root_name = archive
            .get(root_obj)
            .map(|e| e.name.clone())
            .unwrap_or_default();
        let mut scene = Self {
            archive,
            nodes: Vec::new(),
            root: NodeId(0),
            policy: ResamplePolicy::default(),
            materials: HashMap::new(),
            link: None,
            animated: false,
        };
        scene.root = scene.add_node(root_name, Some(root_obj), NodeKind::Group, None);
        scene.init_node(scene.root, true);

        // A fully static tree reads as the degenerate [0,0] window.
        let window = scene.nodes[scene.root.index()].window;
        scene.animated = !window.is_empty();
        if !scene.animated {
            scene.nodes[scene.root.index()].window = TimeRange::new(0.0, 0.0);
        }

        let start = scene.window().min;
        let root = scene.root;
        scene.set_time(root, start, true);
        scene.update_box(root, true);
        scene
    }

    /// Advance the scene to `time`.
    ///
    /// A fully static scene accepts any time as a no-op. A time outside the
    /// window is rejected and nothing changes. Otherwise every node
    /// resamples and bounds recompute.
    pub fn update(&mut self, time: Chrono) -> bool {
        if !self.animated {
            return true;
        }
        let window = self.window();
        if time < window.min || time > window.max {
            debug!(time, ?window, "update time outside scene window");
            return false;
        }
        let root = self.root;
        self.set_time(root, time, true);
        self.update_box(root, true);
        true
    }

    /// Walk the whole tree and hand resolved buffers to the adapter.
    pub fn draw(&self, adapter: &mut dyn BackendAdapter) {
        trace!(backend = ?adapter.kind(), "drawing scene");
        self.draw_node(self.root, true, adapter);
    }

    /// Root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Backing archive.
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Archive path this scene was loaded from.
    pub fn path(&self) -> &Path {
        self.archive.path()
    }

    /// Aggregated time window; `[0,0]` for a fully static scene.
    pub fn window(&self) -> TimeRange {
        self.nodes[self.root.index()].window
    }

    /// Start of the window.
    pub fn min_time(&self) -> Chrono {
        self.window().min
    }

    /// End of the window.
    pub fn max_time(&self) -> Chrono {
        self.window().max
    }

    /// Whether any node carries more than one sample.
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Current resample policy.
    pub fn policy(&self) -> ResamplePolicy {
        self.policy
    }

    /// Switch the resample policy for subsequent updates.
    pub fn set_policy(&mut self, policy: ResamplePolicy) {
        self.policy = policy;
    }

    /// Combined scene bounds, quarantined subtrees included.
    pub fn bounds(&self) -> BBox3f {
        let root = &self.nodes[self.root.index()];
        let mut b = root.bounds;
        b.expand_by_box(&root.bounds_no_inherit);
        b
    }

    /// Names of the root's direct children.
    pub fn object_names(&self) -> Vec<String> {
        self.nodes[self.root.index()]
            .children
            .iter()
            .filter_map(|c| self.node(*c))
            .map(|n| n.name.clone())
            .collect()
    }

    /// Named materials read from the sidecar description.
    pub fn materials(&self) -> &HashMap<String, Material> {
        &self.materials
    }

    /// Depth-first visit over the live tree.
    pub fn walk(&self, id: NodeId, f: &mut impl FnMut(&Node)) {
        let Some(node) = self.node(id) else { return };
        f(node);
        for &child in &node.children {
            self.walk(child, f);
        }
    }

    /// Total resolved triangle-index count over every mesh in the live tree.
    pub fn total_index_count(&self) -> usize {
        let mut total = 0;
        self.walk(self.root, &mut |node| {
            if let NodeKind::Mesh(m) = &node.kind {
                total += m.triangles.len();
            }
        });
        total
    }

    /// Geometry counts over the live tree.
    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats::default();
        self.walk(self.root, &mut |node| {
            stats.node_count += 1;
            if let NodeKind::Mesh(m) = &node.kind {
                stats.mesh_count += 1;
                stats.vertex_count += m.positions.len();
                stats.triangle_count += m.triangles.len() / 3;
            }
        });
        stats
    }

    /// Find a camera node by name and snapshot a renderer-facing camera,
    /// with orientation taken from the transform chain above it.
    pub fn camera(&self, name: &str) -> Option<RenderCamera> {
        let id = self.find_camera(self.root, name)?;
        let node = self.node(id)?;
        let NodeKind::Camera(state) = &node.kind else {
            return None;
        };
        let world = self.world_matrix(id);
        Some(RenderCamera {
            name: node.name.clone(),
            world,
            view: world.inverse(),
            focal_length: state.focal_length,
            near_clip: state.near_clip,
            far_clip: state.far_clip,
        })
    }

    /// Depth-first search for a node by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.find_node_from(self.root, name)
    }

    fn find_node_from(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let node = self.node(id)?;
        if node.name == name {
            return Some(id);
        }
        for &child in &node.children {
            if let Some(found) = self.find_node_from(child, name) {
                return Some(found);
            }
        }
        None
    }

    fn find_camera(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let node = self.node(id)?;
        if matches!(node.kind, NodeKind::Camera(_)) && node.name == name {
            return Some(id);
        }
        for &child in &node.children {
            if let Some(found) = self.find_camera(child, name) {
                return Some(found);
            }
        }
        None
    }

    /// Attach the renderer-side counterpart and cross-register everything
    /// this scene already loaded.
    pub fn attach_link(&mut self, link: &Arc<dyn SceneLink>) {
        self.link = Some(Arc::downgrade(link));
        for (name, mat) in &self.materials {
            link.register_material(name, mat);
        }
        let mut cameras = Vec::new();
        self.walk(self.root, &mut |node| {
            if matches!(node.kind, NodeKind::Camera(_)) {
                cameras.push(node.name.clone());
            }
        });
        for name in cameras {
            link.register_camera(&name);
        }
    }

    /// The attached renderer counterpart, when still alive.
    pub fn link(&self) -> Option<Arc<dyn SceneLink>> {
        self.link.as_ref().and_then(|w| w.upgrade())
    }

    /// Assign sidecar materials into mesh slots by face-set name.
    fn bind_materials(&mut self) {
        if self.materials.is_empty() {
            return;
        }
        let materials = &self.materials;
        for node in &mut self.nodes {
            if let NodeKind::Mesh(mesh) = &mut node.kind {
                for slot in &mut mesh.materials {
                    if let Some(m) = materials.get(&slot.name) {
                        slot.material = m.clone();
                    }
                }
            }
        }
    }
}
