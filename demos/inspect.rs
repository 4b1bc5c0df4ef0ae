//! Scene inspector.
//!
//! Loads an archive into a scene, prints the node tree and resolve
//! statistics, and optionally steps through the animation window counting
//! the buffers a backend would receive per frame.
//!
//! ```text
//! cargo run --example inspect -- tree shot.gsa
//! cargo run --example inspect -- play shot.gsa 24
//! ```

use std::env;
use std::process;

use geostage::prelude::*;
use geostage::scene::{MeshDraw, PointsDraw};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        print_usage(&args[0]);
        process::exit(1);
    }

    match args[1].as_str() {
        "info" | "i" => cmd_info(&args[2]),
        "tree" | "t" => cmd_tree(&args[2]),
        "play" | "p" => {
            let steps = args
                .get(3)
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(10);
            cmd_play(&args[2], steps);
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage(&args[0]);
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    println!("Usage: {prog} <command> <file.gsa> [args]");
    println!();
    println!("Commands:");
    println!("  i, info          Scene summary and material bindings");
    println!("  t, tree          Node hierarchy with windows and bounds");
    println!("  p, play [steps]  Resample across the window, counting draws");
}

fn load(path: &str) -> Scene {
    match Scene::load(path) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            process::exit(1);
        }
    }
}

fn cmd_info(path: &str) {
    let scene = load(path);
    let stats = scene.stats();

    println!("Scene: {}", scene.path().display());
    if scene.is_animated() {
        println!(
            "Window: {:.1}..{:.1} ms",
            scene.min_time(),
            scene.max_time()
        );
    } else {
        println!("Window: static");
    }
    println!();
    println!("Nodes:     {}", stats.node_count);
    println!("Meshes:    {}", stats.mesh_count);
    println!("Vertices:  {}", stats.vertex_count);
    println!("Triangles: {}", stats.triangle_count);
    println!("Indices:   {}", scene.total_index_count());

    let bounds = scene.bounds();
    if !bounds.is_empty() {
        println!(
            "Bounds:    ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
            bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
        );
    }

    if !scene.materials().is_empty() {
        println!();
        println!("Sidecar materials:");
        let mut names: Vec<&String> = scene.materials().keys().collect();
        names.sort();
        for name in names {
            println!("  {name}");
        }
    }
}

fn cmd_tree(path: &str) {
    let scene = load(path);
    println!("Scene: {}", scene.path().display());
    println!();
    print_node(&scene, scene.root(), 0);
}

fn print_node(scene: &Scene, id: NodeId, depth: usize) {
    let Some(node) = scene.node(id) else { return };
    let indent = "  ".repeat(depth);
    let window = if node.window.is_empty() {
        "static".to_string()
    } else {
        format!("{:.0}..{:.0}", node.window.min, node.window.max)
    };
    let mut extra = String::new();
    if let NodeKind::Mesh(mesh) = &node.kind {
        extra = format!(
            ", {} tris, {} slots",
            mesh.triangle_count(),
            mesh.materials.len()
        );
    }
    println!(
        "{indent}{} [{}] ({window}{extra})",
        node.name,
        node.kind.tag()
    );
    for &child in node.children() {
        print_node(scene, child, depth + 1);
    }
}

/// Counts per-frame backend traffic without rendering anything.
#[derive(Default)]
struct CountingAdapter {
    meshes: usize,
    triangles: usize,
    point_sets: usize,
}

impl BackendAdapter for CountingAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Preview
    }

    fn mesh(&mut self, draw: &MeshDraw<'_>) {
        self.meshes += 1;
        self.triangles += draw.triangles.len() / 3;
    }

    fn points(&mut self, _draw: &PointsDraw<'_>) {
        self.point_sets += 1;
    }
}

fn cmd_play(path: &str, steps: usize) {
    let mut scene = load(path);
    if !scene.is_animated() {
        println!("Scene is static; nothing to play.");
        return;
    }

    let (start, end) = (scene.min_time(), scene.max_time());
    let step = (end - start) / steps.max(1) as f64;
    println!(
        "Playing {}..{} ms in {} steps",
        start,
        end,
        steps.max(1)
    );

    for i in 0..=steps.max(1) {
        let time = start + step * i as f64;
        if !scene.update(time) {
            println!("{time:>10.1}  (out of window)");
            continue;
        }
        let mut adapter = CountingAdapter::default();
        scene.draw(&mut adapter);
        println!(
            "{time:>10.1}  {} meshes, {} triangles, {} point sets",
            adapter.meshes, adapter.triangles, adapter.point_sets
        );
    }
}
