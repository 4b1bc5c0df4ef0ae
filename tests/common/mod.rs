#![allow(dead_code)]

//! Shared archive fixtures for the integration tests.

use geostage::archive::schema::{CAMERA_SCHEMA, FACESET_SCHEMA, POLYMESH_SCHEMA, XFORM_SCHEMA};
use geostage::prelude::*;
use geostage::scene::{MeshDraw, MeshState, PointsDraw};
use glam::{DMat4, DVec3, Mat4, Vec2, Vec3};

pub fn triangle_positions() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ]
}

/// One static triangle mesh, already wound clockwise.
pub fn triangle_mesh(name: &str) -> ObjectSpec {
    ObjectSpec::new(name, POLYMESH_SCHEMA)
        .metadata("clockWise", "true")
        .prop_vec3_array("P", GeometryScope::Vertex, None, vec![triangle_positions()])
        .prop_i32_array(".faceCounts", None, vec![vec![3]])
        .prop_i32_array(".faceIndices", None, vec![vec![0, 1, 2]])
}

pub fn static_triangle_archive() -> Archive {
    let mut builder = ArchiveBuilder::new();
    builder.add(triangle_mesh("tri"));
    builder.build().unwrap()
}

pub fn pair_positions() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(3.0, 1.0, 0.0),
        Vec3::new(2.0, 1.0, 0.0),
    ]
}

/// Two unit quads side by side with one face-set per quad, plus per-vertex
/// normals and per-corner UVs.
pub fn faceset_mesh() -> ObjectSpec {
    let uvs: Vec<Vec2> = (0..8).map(|i| Vec2::new(i as f32 * 0.125, 0.0)).collect();
    ObjectSpec::new("pair", POLYMESH_SCHEMA)
        .metadata("clockWise", "true")
        .prop_vec3_array("P", GeometryScope::Vertex, None, vec![pair_positions()])
        .prop_i32_array(".faceCounts", None, vec![vec![4, 4]])
        .prop_i32_array(".faceIndices", None, vec![vec![0, 1, 2, 3, 4, 5, 6, 7]])
        .prop_vec3_array("N", GeometryScope::Vertex, None, vec![vec![Vec3::Z; 8]])
        .prop_vec2_array("uv", GeometryScope::FaceVarying, None, vec![uvs])
        .child(
            ObjectSpec::new("front", FACESET_SCHEMA).prop_i32_array(".faces", None, vec![vec![0]]),
        )
        .child(
            ObjectSpec::new("back", FACESET_SCHEMA).prop_i32_array(".faces", None, vec![vec![1]]),
        )
}

pub fn faceset_archive() -> Archive {
    let mut builder = ArchiveBuilder::new();
    builder.add(faceset_mesh());
    builder.build().unwrap()
}

/// The face-set pair with three deforming samples on the given sampling:
/// one corner of the first quad lifts out of plane per frame and the UVs
/// drift, while topology and the face-sets stay constant.
pub fn animated_faceset_mesh(sampling: usize) -> ObjectSpec {
    let frames: Vec<Vec<Vec3>> = (0..3)
        .map(|f| {
            let mut p = pair_positions();
            p[2].z = f as f32;
            p
        })
        .collect();
    let uvs: Vec<Vec<Vec2>> = (0..3)
        .map(|f| {
            (0..8)
                .map(|i| Vec2::new(i as f32 * 0.125 + f as f32 * 0.01, 0.0))
                .collect()
        })
        .collect();
    ObjectSpec::new("pair", POLYMESH_SCHEMA)
        .metadata("clockWise", "true")
        .prop_vec3_array("P", GeometryScope::Vertex, Some(sampling), frames)
        .prop_i32_array(".faceCounts", None, vec![vec![4, 4]])
        .prop_i32_array(".faceIndices", None, vec![vec![0, 1, 2, 3, 4, 5, 6, 7]])
        .prop_vec2_array("uv", GeometryScope::FaceVarying, Some(sampling), uvs)
        .child(
            ObjectSpec::new("front", FACESET_SCHEMA).prop_i32_array(".faces", None, vec![vec![0]]),
        )
        .child(
            ObjectSpec::new("back", FACESET_SCHEMA).prop_i32_array(".faces", None, vec![vec![1]]),
        )
}

/// Triangle whose positions animate over three uniform samples starting at
/// 1000ms, 100ms apart; topology stays constant.
pub fn animated_archive() -> Archive {
    let mut builder = ArchiveBuilder::new();
    let sampling = builder.uniform_sampling(1000.0, 100.0);
    let frames: Vec<Vec<Vec3>> = (0..3)
        .map(|f| {
            triangle_positions()
                .into_iter()
                .map(|v| v + Vec3::Y * f as f32)
                .collect()
        })
        .collect();
    builder.add(
        ObjectSpec::new("anim", POLYMESH_SCHEMA)
            .metadata("clockWise", "true")
            .prop_vec3_array("P", GeometryScope::Vertex, Some(sampling), frames)
            .prop_i32_array(".faceCounts", None, vec![vec![3]])
            .prop_i32_array(".faceIndices", None, vec![vec![0, 1, 2]]),
    );
    builder.build().unwrap()
}

pub fn translation(x: f64, y: f64, z: f64) -> DMat4 {
    DMat4::from_translation(DVec3::new(x, y, z))
}

/// A transform above a triangle; `inherits` drives the flag property.
pub fn xform_tree_archive(inherits: bool) -> Archive {
    let mut builder = ArchiveBuilder::new();
    builder.add(
        ObjectSpec::new("move", XFORM_SCHEMA)
            .prop_mat4(".vals", None, vec![translation(10.0, 0.0, 0.0)])
            .prop_bool(".inherits", None, vec![inherits])
            .child(triangle_mesh("tri")),
    );
    builder.build().unwrap()
}

/// An inheriting transform above a non-inheriting one above a triangle.
pub fn nested_no_inherit_archive() -> Archive {
    let mut builder = ArchiveBuilder::new();
    builder.add(
        ObjectSpec::new("outer", XFORM_SCHEMA)
            .prop_mat4(".vals", None, vec![translation(0.0, 5.0, 0.0)])
            .prop_bool(".inherits", None, vec![true])
            .child(
                ObjectSpec::new("inner", XFORM_SCHEMA)
                    .prop_mat4(".vals", None, vec![translation(10.0, 0.0, 0.0)])
                    .prop_bool(".inherits", None, vec![false])
                    .child(triangle_mesh("tri")),
            ),
    );
    builder.build().unwrap()
}

/// A camera under a transform rig.
pub fn camera_rig_spec() -> ObjectSpec {
    ObjectSpec::new("rig", XFORM_SCHEMA)
        .prop_mat4(".vals", None, vec![translation(0.0, 0.0, 5.0)])
        .prop_bool(".inherits", None, vec![true])
        .child(
            ObjectSpec::new("shotCam", CAMERA_SCHEMA)
                .prop_f64(".focalLength", None, vec![50.0])
                .prop_f64(".nearClip", None, vec![0.5])
                .prop_f64(".farClip", None, vec![5000.0]),
        )
}

pub fn camera_rig_archive() -> Archive {
    let mut builder = ArchiveBuilder::new();
    builder.add(camera_rig_spec());
    builder.build().unwrap()
}

/// Mesh state of a named node, for buffer assertions.
pub fn mesh_state<'a>(scene: &'a Scene, name: &str) -> &'a MeshState {
    let id = scene.find_node(name).unwrap();
    match &scene.node(id).unwrap().kind {
        NodeKind::Mesh(m) => m,
        other => panic!("node '{name}' is a {}", other.tag()),
    }
}

/// Adapter that records everything it is handed.
#[derive(Default)]
pub struct CollectAdapter {
    pub mesh_names: Vec<String>,
    pub worlds: Vec<Mat4>,
    pub triangles: Vec<Vec<u32>>,
    pub point_clouds: usize,
}

impl BackendAdapter for CollectAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Preview
    }

    fn mesh(&mut self, draw: &MeshDraw<'_>) {
        self.mesh_names.push(draw.name.to_string());
        self.worlds.push(draw.world);
        self.triangles.push(draw.triangles.to_vec());
    }

    fn points(&mut self, _draw: &PointsDraw<'_>) {
        self.point_clouds += 1;
    }
}
