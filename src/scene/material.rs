//! Materials and the sidecar material description.
//!
//! Scenes look for a description file next to the archive (same stem, `mtl`
//! extension) and bind its entries to mesh face-sets by name.

use std::collections::HashMap;
use std::path::Path;

use glam::Vec3;
use tracing::{debug, trace};

/// Shading parameters for one named material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
    /// Relative path of a diffuse texture, when the description names one.
    pub diffuse_map: Option<String>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.7),
            specular: Vec3::splat(0.2),
            shininess: 16.0,
            diffuse_map: None,
        }
    }
}

/// One material bound to a contiguous run of triangles.
///
/// `name` is the face-set the slot belongs to (`"default"` when the mesh has
/// none); slots are index-aligned with the mesh's face-set order, and
/// `tri_count` is the span width in triangles.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialSlot {
    pub name: String,
    pub material: Material,
    pub tri_count: u32,
}

/// Parse the sidecar material description next to an archive.
///
/// A missing or unreadable file yields an empty map; the scene then keeps
/// its defaults.
pub fn load_sidecar(path: &Path) -> HashMap<String, Material> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            debug!(path = %path.display(), "no sidecar material description");
            return HashMap::new();
        }
    };
    parse_sidecar(&content)
}

/// Line-oriented parse: `newmtl` opens a material, `Ka`/`Kd`/`Ks`/`Ns` and
/// `map_Kd` fill it in. Unknown tokens and unparsable lines are skipped.
pub(crate) fn parse_sidecar(content: &str) -> HashMap<String, Material> {
    let mut materials = HashMap::new();
    let mut current: Option<Material> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(token) = parts.next() else { continue };

        match token {
            "newmtl" => {
                if let Some(m) = current.take() {
                    materials.insert(m.name.clone(), m);
                }
                if let Some(name) = parts.next() {
                    current = Some(Material {
                        name: name.to_string(),
                        ..Material::default()
                    });
                }
            }
            "Ka" | "Kd" | "Ks" => {
                let Some(m) = current.as_mut() else { continue };
                let Some(v) = parse_vec3(&mut parts) else {
                    trace!(line, "skipping unparsable color line");
                    continue;
                };
                match token {
                    "Ka" => m.ambient = v,
                    "Kd" => m.diffuse = v,
                    _ => m.specular = v,
                }
            }
            "Ns" => {
                let Some(m) = current.as_mut() else { continue };
                if let Some(ns) = parts.next().and_then(|s| s.parse::<f32>().ok()) {
                    m.shininess = ns;
                }
            }
            "map_Kd" => {
                let Some(m) = current.as_mut() else { continue };
                let rest: Vec<&str> = parts.collect();
                if !rest.is_empty() {
                    // Texture paths may contain spaces.
                    m.diffuse_map = Some(rest.join(" "));
                }
            }
            _ => {}
        }
    }
    if let Some(m) = current.take() {
        materials.insert(m.name.clone(), m);
    }
    materials
}

fn parse_vec3<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<Vec3> {
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let z = parts.next()?.parse().ok()?;
    Some(Vec3::new(x, y, z))
}
