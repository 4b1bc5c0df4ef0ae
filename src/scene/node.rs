//! Scene tree nodes and the shared lifecycle operations.
//!
//! Nodes live in an arena owned by the [`Scene`]; identifiers are plain
//! indices into it. The arena is append-only: re-initializing a subtree
//! orphans its previous entries instead of freeing them, the slots go away
//! with the scene.

use glam::Mat4;
use tracing::trace;

use crate::archive::schema::{
    SchemaKind, VISIBILITY_PROPERTY_NAME,
};
use crate::archive::ObjectId;
use crate::util::{BBox3f, Chrono, TimeRange};

use super::backend::{BackendAdapter, CurvesDraw, MeshDraw, PatchDraw, PointsDraw};
use super::camera::CameraState;
use super::curves::CurvesState;
use super::mesh::MeshState;
use super::patch::PatchState;
use super::points::PointsState;
use super::xform::XformState;
use super::Scene;

/// Index of a node in its scene. Copyable; never owns the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Schema-specific node state.
#[derive(Debug)]
pub enum NodeKind {
    /// Plain container, the root typically.
    Group,
    Mesh(MeshState),
    Points(PointsState),
    Curves(CurvesState),
    Patch(PatchState),
    Xform(XformState),
    Camera(CameraState),
}

impl NodeKind {
    fn for_schema(kind: SchemaKind) -> Option<Self> {
        match kind {
            SchemaKind::PolyMesh => Some(Self::Mesh(MeshState::default())),
            SchemaKind::Points => Some(Self::Points(PointsState::default())),
            SchemaKind::Curves => Some(Self::Curves(CurvesState::default())),
            SchemaKind::NuPatch => Some(Self::Patch(PatchState::default())),
            SchemaKind::Xform => Some(Self::Xform(XformState::default())),
            SchemaKind::Camera => Some(Self::Camera(CameraState::default())),
            SchemaKind::FaceSet => None,
        }
    }

    /// Short tag for logs and listings.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Mesh(_) => "mesh",
            Self::Points(_) => "points",
            Self::Curves(_) => "curves",
            Self::Patch(_) => "patch",
            Self::Xform(_) => "xform",
            Self::Camera(_) => "camera",
        }
    }
}

/// One node of the scene tree.
#[derive(Debug)]
pub struct Node {
    /// Object name from the archive.
    pub name: String,
    pub kind: NodeKind,
    /// Union of this node's and its descendants' animated sample ranges.
    pub window: TimeRange,
    /// Last time handed to this node.
    pub current_time: Chrono,
    /// Bounds following transform inheritance.
    pub bounds: BBox3f,
    /// World-space bounds quarantined by non-inheriting transforms below.
    pub bounds_no_inherit: BBox3f,
    pub(crate) object: Option<ObjectId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) valid: bool,
}

impl Node {
    pub(crate) fn new(
        name: String,
        object: Option<ObjectId>,
        kind: NodeKind,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            name,
            kind,
            window: TimeRange::EMPTY,
            current_time: 0.0,
            bounds: BBox3f::EMPTY,
            bounds_no_inherit: BBox3f::EMPTY,
            object,
            parent,
            children: Vec::new(),
            valid: false,
        }
    }

    /// Child nodes in archive order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent node, `None` at the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Whether the backing archive object resolved during init.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl Scene {
    /// Look up a node; `None` for ids from another scene.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn add_node(
        &mut self,
        name: String,
        object: Option<ObjectId>,
        kind: NodeKind,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(name, object, kind, parent));
        id
    }

    /// Bind a node to its archive object: per-kind state, fresh child nodes
    /// for recognized schemas and the aggregated time window.
    ///
    /// Existing children are detached first, so re-running this on a subtree
    /// rebuilds it from the archive. Returns false when the backing object
    /// is gone; the node is then marked invalid and keeps no children.
    pub fn init_node(&mut self, id: NodeId, recursive: bool) -> bool {
        if id.index() >= self.nodes.len() {
            return false;
        }
        let Some(obj) = self.nodes[id.index()].object else {
            self.nodes[id.index()].valid = false;
            return false;
        };
        if self.archive.get(obj).is_none() {
            self.nodes[id.index()].valid = false;
            return false;
        }

        // Own window: every sampled property of the backing object counts.
        let mut window = TimeRange::EMPTY;
        if let Some(entry) = self.archive.get(obj) {
            for prop in &entry.properties {
                window.expand_by_range(&prop.time_range());
            }
        }

        {
            let node = &mut self.nodes[id.index()];
            node.children.clear();
            node.valid = true;
            match &mut node.kind {
                NodeKind::Mesh(mesh) => {
                    mesh.init(&self.archive, obj);
                    // Animated face-sets animate the mesh as well.
                    for &fs in mesh.face_sets() {
                        if let Some(p) = self.archive.property(fs, ".faces") {
                            window.expand_by_range(&p.time_range());
                        }
                    }
                }
                NodeKind::Xform(x) => x.init(&self.archive, obj),
                _ => {}
            }
        }

        // Child dispatch in archive order; first matching schema wins.
        // Plain containers become groups, unrecognized titles are skipped.
        let mut specs = Vec::new();
        for &child in self.archive.children(obj) {
            let Some(entry) = self.archive.get(child) else { continue };
            let kind = if entry.schema.is_empty() {
                NodeKind::Group
            } else {
                match SchemaKind::from_title(&entry.schema).and_then(NodeKind::for_schema) {
                    Some(kind) => kind,
                    None => {
                        // Face-sets belong to their mesh, not the tree;
                        // anything else is an unrecognized title.
                        trace!(path = %entry.path, schema = %entry.schema, "not a tree node");
                        continue;
                    }
                }
            };
            specs.push((entry.name.clone(), child, kind));
        }
        for (name, child_obj, kind) in specs {
            let child_id = self.add_node(name, Some(child_obj), kind, Some(id));
            self.nodes[id.index()].children.push(child_id);
            if recursive {
                self.init_node(child_id, true);
            }
        }

        // Fold initialized children into the window.
        for i in 0..self.nodes[id.index()].children.len() {
            let child_id = self.nodes[id.index()].children[i];
            let child = &self.nodes[child_id.index()];
            if child.valid {
                let child_window = child.window;
                window.expand_by_range(&child_window);
            }
        }
        self.nodes[id.index()].window = window;
        true
    }

    /// Store `time` on the node and resample its state.
    ///
    /// Recursion is unconditional: children whose own windows exclude the
    /// time still resample and clamp to their nearest samples.
    pub fn set_time(&mut self, id: NodeId, time: Chrono, recursive: bool) {
        if id.index() >= self.nodes.len() {
            return;
        }
        {
            let node = &mut self.nodes[id.index()];
            node.current_time = time;
            match node.object {
                Some(obj) if node.valid => {
                    let window = node.window;
                    match &mut node.kind {
                        NodeKind::Group => {}
                        NodeKind::Mesh(m) => m.resample(&self.archive, obj, time, self.policy),
                        NodeKind::Points(p) => p.resample(&self.archive, obj, time),
                        NodeKind::Curves(c) => c.resample(&self.archive, obj, time),
                        NodeKind::Patch(p) => p.resample(&self.archive, obj, time),
                        NodeKind::Xform(x) => x.resample(&self.archive, obj, time, window),
                        NodeKind::Camera(c) => c.resample(&self.archive, obj, time),
                    }
                }
                _ => {
                    // A transform that never bound its object contributes
                    // the identity.
                    if let NodeKind::Xform(x) = &mut node.kind {
                        x.local = Mat4::IDENTITY;
                    }
                }
            }
        }
        if recursive {
            let children = self.nodes[id.index()].children.clone();
            for child in children {
                self.set_time(child, time, true);
            }
        }
    }

    /// Recompute bounds bottom-up.
    ///
    /// Transform nodes route each child's inheriting box through their local
    /// matrix, into `bounds` when the transform inherits and into
    /// `bounds_no_inherit` otherwise; a child's already-quarantined box is
    /// folded in untransformed since it is world-space by then. Other nodes
    /// fold both boxes plainly and add their own geometry.
    pub fn update_box(&mut self, id: NodeId, recursive: bool) {
        if id.index() >= self.nodes.len() {
            return;
        }
        let children = self.nodes[id.index()].children.clone();
        if recursive {
            for &child in &children {
                self.update_box(child, true);
            }
        }

        let child_boxes: Vec<(BBox3f, BBox3f)> = children
            .iter()
            .filter_map(|c| self.node(*c))
            .map(|n| (n.bounds, n.bounds_no_inherit))
            .collect();

        let node = &mut self.nodes[id.index()];
        node.bounds = BBox3f::EMPTY;
        node.bounds_no_inherit = BBox3f::EMPTY;

        match &node.kind {
            NodeKind::Xform(x) => {
                let local = x.local;
                let inherits = x.inherits;
                for (b, nb) in &child_boxes {
                    let routed = b.transformed(&local);
                    if inherits {
                        node.bounds.expand_by_box(&routed);
                    } else {
                        node.bounds_no_inherit.expand_by_box(&routed);
                    }
                    node.bounds_no_inherit.expand_by_box(nb);
                }
            }
            _ => {
                for (b, nb) in &child_boxes {
                    node.bounds.expand_by_box(b);
                    node.bounds_no_inherit.expand_by_box(nb);
                }
                let own = match &node.kind {
                    NodeKind::Mesh(m) => Some(m.bounds()),
                    NodeKind::Points(p) => Some(p.bounds()),
                    NodeKind::Curves(c) => Some(c.bounds()),
                    NodeKind::Patch(p) => Some(p.bounds()),
                    _ => None,
                };
                if let Some(own) = own {
                    node.bounds.expand_by_box(&own);
                }
            }
        }
    }

    /// Hand one node's (and optionally its subtree's) resolved buffers to a
    /// backend adapter, composing world matrices on the way down.
    pub fn draw_node(&self, id: NodeId, recursive: bool, adapter: &mut dyn BackendAdapter) {
        let parent_world = self
            .node(id)
            .and_then(|n| n.parent)
            .map(|p| self.world_matrix(p))
            .unwrap_or(Mat4::IDENTITY);
        self.draw_walk(id, recursive, parent_world, adapter);
    }

    fn draw_walk(
        &self,
        id: NodeId,
        recursive: bool,
        parent_world: Mat4,
        adapter: &mut dyn BackendAdapter,
    ) {
        let Some(node) = self.node(id) else { return };

        let world = match &node.kind {
            NodeKind::Xform(x) => {
                if x.inherits {
                    parent_world * x.local
                } else {
                    x.local
                }
            }
            _ => parent_world,
        };

        match &node.kind {
            NodeKind::Mesh(m) if !m.triangles.is_empty() => {
                adapter.mesh(&MeshDraw {
                    name: &node.name,
                    world,
                    triangles: &m.triangles,
                    positions: &m.positions,
                    normals: &m.normals,
                    uvs: &m.uvs,
                    materials: &m.materials,
                    clockwise: m.clockwise,
                    bounds: m.bounds(),
                });
            }
            NodeKind::Points(p) if !p.positions.is_empty() => {
                adapter.points(&PointsDraw {
                    name: &node.name,
                    world,
                    positions: &p.positions,
                    colors: &p.colors,
                    normals: &p.normals,
                    widths: &p.widths,
                    bounds: p.bounds(),
                });
            }
            NodeKind::Curves(c) if !c.positions.is_empty() => {
                adapter.curves(&CurvesDraw {
                    name: &node.name,
                    world,
                    positions: &c.positions,
                    counts: &c.counts,
                    widths: &c.widths,
                    bounds: c.bounds(),
                });
            }
            NodeKind::Patch(p) if !p.positions.is_empty() => {
                adapter.patch(&PatchDraw {
                    name: &node.name,
                    world,
                    positions: &p.positions,
                    nu: p.nu,
                    nv: p.nv,
                    bounds: p.bounds(),
                });
            }
            _ => {}
        }

        if recursive {
            for &child in &node.children {
                self.draw_walk(child, true, world, adapter);
            }
        }
    }

    /// World matrix of a node, composed from the transform chain above it.
    ///
    /// The walk ascends until the root or until it crosses a non-inheriting
    /// transform, which roots its subtree in world space; matrices then
    /// compose outermost-first.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut chain = Vec::new();
        let mut cur = Some(id);
        while let Some(nid) = cur {
            let Some(node) = self.node(nid) else { break };
            if let NodeKind::Xform(x) = &node.kind {
                chain.push(x.local);
                if !x.inherits {
                    break;
                }
            }
            cur = node.parent;
        }
        let mut world = Mat4::IDENTITY;
        for local in chain.iter().rev() {
            world *= *local;
        }
        world
    }

    /// Read the node's optional visibility property at its current time.
    /// A node without the property reads as hidden.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else { return false };
        if !node.valid {
            return false;
        }
        let Some(obj) = node.object else { return false };
        self.archive
            .property(obj, VISIBILITY_PROPERTY_NAME)
            .and_then(|p| p.bool_at(node.current_time))
            .unwrap_or(false)
    }
}
