//! Archive document round trips and decode failures.

mod common;

use std::sync::Arc;

use common::*;
use geostage::prelude::*;

#[test]
fn test_save_and_open_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.gsa");

    let mut builder = ArchiveBuilder::new();
    let sampling = builder.uniform_sampling(1000.0, 100.0);
    builder.add(
        ObjectSpec::group("geo")
            .child(triangle_mesh("tri").prop_f64("weight", Some(sampling), vec![0.5, 1.5])),
    );
    builder.save(&path).unwrap();

    let archive = Archive::open(&path).unwrap();
    assert_eq!(archive.object_count(), 3);
    assert_eq!(archive.path(), path.as_path());

    let tri = archive.find("/geo/tri").unwrap();
    assert_eq!(archive.metadata(tri, "clockWise"), Some("true"));

    let p = archive.property(tri, "P").unwrap();
    assert_eq!(p.scope, GeometryScope::Vertex);
    assert!(p.is_constant());
    let positions = p.vec3s_at(0.0).unwrap();
    assert_eq!(positions.as_slice(), triangle_positions().as_slice());

    let w = archive.property(tri, "weight").unwrap();
    assert_eq!(w.sample_count(), 2);
    assert!(!w.is_constant());
    assert_eq!(w.f64_at(1000.0), Some(0.5));
    assert_eq!(w.f64_at(1100.0), Some(1.5));
    assert_eq!(w.time_range(), TimeRange::new(1000.0, 1100.0));
}

#[test]
fn test_compressed_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.gsa");

    let mut builder = ArchiveBuilder::new();
    builder.add(triangle_mesh("tri"));
    builder.save_compressed(&path).unwrap();

    // Compression is sniffed from magic bytes, not the extension.
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

    let archive = Archive::open(&path).unwrap();
    assert_eq!(archive.object_count(), 2);
    assert!(archive.find("/tri").is_some());
}

#[test]
fn test_missing_file() {
    let err = Archive::open("/does/not/exist.gsa").unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}

#[test]
fn test_unsupported_version_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.gsa");
    std::fs::write(&path, r#"{"version": 99, "root": {"name": ""}}"#).unwrap();

    let err = Archive::open(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidDocument(_)));
}

#[test]
fn test_corrupt_document_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.gsa");
    std::fs::write(&path, "{not json").unwrap();

    let err = Archive::open(&path).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_ragged_vector_sample_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ragged.gsa");
    let doc = r#"{
  "version": 1,
  "root": {
    "name": "",
    "children": [
      {
        "name": "m",
        "properties": [
          {"name": "P", "type": "vec3_array", "samples": [[0.0, 1.0, 2.0, 3.0]]}
        ]
      }
    ]
  }
}"#;
    std::fs::write(&path, doc).unwrap();

    let err = Archive::open(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidDocument(_)));
}

#[test]
fn test_missing_sampling_reference_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dangling.gsa");
    let doc = r#"{
  "version": 1,
  "root": {
    "name": "",
    "children": [
      {
        "name": "m",
        "properties": [
          {"name": "value", "sampling": 5, "type": "f64", "samples": [1.0]}
        ]
      }
    ]
  }
}"#;
    std::fs::write(&path, doc).unwrap();

    let err = Archive::open(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidDocument(_)));
}

#[test]
fn test_repeated_reads_share_samples() {
    let archive = static_triangle_archive();
    let tri = archive.find("/tri").unwrap();
    let p = archive.property(tri, "P").unwrap();

    let a = p.vec3s_at(0.0).unwrap();
    let b = p.vec3s_at(50.0).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_out_of_range_times_clamp() {
    let archive = animated_archive();
    let mesh = archive.find("/anim").unwrap();
    let p = archive.property(mesh, "P").unwrap();

    let before = p.vec3s_at(-5000.0).unwrap();
    let first = p.vec3s_at(1000.0).unwrap();
    assert!(Arc::ptr_eq(&before, &first));

    let after = p.vec3s_at(99999.0).unwrap();
    let last = p.vec3s_at(1200.0).unwrap();
    assert!(Arc::ptr_eq(&after, &last));
}

#[test]
fn test_acyclic_sampling_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("acyclic.gsa");

    let mut builder = ArchiveBuilder::new();
    let sampling = builder.acyclic_sampling(vec![0.0, 40.0, 1000.0]);
    builder.add(
        ObjectSpec::group("g").child(
            ObjectSpec::new("v", "").prop_f64("value", Some(sampling), vec![1.0, 2.0, 3.0]),
        ),
    );
    builder.save(&path).unwrap();

    let archive = Archive::open(&path).unwrap();
    let v = archive.find("/g/v").unwrap();
    let p = archive.property(v, "value").unwrap();
    assert_eq!(p.time_range(), TimeRange::new(0.0, 1000.0));
    // 30 is closer to 40 than to 0; 400 closer to 40 than to 1000.
    assert_eq!(p.f64_at(30.0), Some(2.0));
    assert_eq!(p.f64_at(400.0), Some(2.0));
    assert_eq!(p.f64_at(900.0), Some(3.0));
}
