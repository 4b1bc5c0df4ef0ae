//! Schema identification for archive objects.
//!
//! Every object carries a schema title string in its header; the scene layer
//! dispatches node construction on the recognized kind. Unknown titles are
//! skipped by callers, never treated as errors.

/// PolyMesh schema identifier.
pub const POLYMESH_SCHEMA: &str = "AbcGeom_PolyMesh_v1";
/// Points schema identifier.
pub const POINTS_SCHEMA: &str = "AbcGeom_Points_v1";
/// Curves schema identifier.
pub const CURVES_SCHEMA: &str = "AbcGeom_Curve_v2";
/// NuPatch schema identifier.
pub const NUPATCH_SCHEMA: &str = "AbcGeom_NuPatch_v2";
/// Xform schema identifier.
pub const XFORM_SCHEMA: &str = "AbcGeom_Xform_v3";
/// Camera schema identifier.
pub const CAMERA_SCHEMA: &str = "AbcGeom_Camera_v1";
/// FaceSet schema identifier.
pub const FACESET_SCHEMA: &str = "AbcGeom_FaceSet_v1";

/// Name of the optional per-object visibility property.
pub const VISIBILITY_PROPERTY_NAME: &str = "visible";

/// Object metadata key marking sources whose faces are already wound
/// clockwise ("true" means no winding flip is needed).
pub const CLOCKWISE_METADATA_KEY: &str = "clockWise";

/// Kind of schema an object carries.
///
/// `FaceSet` never forms a node of its own; face-set objects are consumed by
/// the mesh that owns them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    PolyMesh,
    Points,
    Curves,
    NuPatch,
    Xform,
    Camera,
    FaceSet,
}

impl SchemaKind {
    /// Identify a schema title.
    ///
    /// Matches are attempted in the engine's fixed dispatch order: mesh,
    /// points, curves, patch, transform, camera, face-set. First match wins.
    pub fn from_title(title: &str) -> Option<Self> {
        if title == POLYMESH_SCHEMA {
            Some(Self::PolyMesh)
        } else if title == POINTS_SCHEMA {
            Some(Self::Points)
        } else if title == CURVES_SCHEMA {
            Some(Self::Curves)
        } else if title == NUPATCH_SCHEMA {
            Some(Self::NuPatch)
        } else if title == XFORM_SCHEMA {
            Some(Self::Xform)
        } else if title == CAMERA_SCHEMA {
            Some(Self::Camera)
        } else if title == FACESET_SCHEMA {
            Some(Self::FaceSet)
        } else {
            None
        }
    }

    /// The schema title string for this kind.
    pub fn title(&self) -> &'static str {
        match self {
            Self::PolyMesh => POLYMESH_SCHEMA,
            Self::Points => POINTS_SCHEMA,
            Self::Curves => CURVES_SCHEMA,
            Self::NuPatch => NUPATCH_SCHEMA,
            Self::Xform => XFORM_SCHEMA,
            Self::Camera => CAMERA_SCHEMA,
            Self::FaceSet => FACESET_SCHEMA,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_title() {
        assert_eq!(
            SchemaKind::from_title("AbcGeom_PolyMesh_v1"),
            Some(SchemaKind::PolyMesh)
        );
        assert_eq!(
            SchemaKind::from_title("AbcGeom_Xform_v3"),
            Some(SchemaKind::Xform)
        );
        assert_eq!(SchemaKind::from_title(""), None);
        assert_eq!(SchemaKind::from_title("AbcGeom_Subdiv_v1"), None);
    }

    #[test]
    fn test_title_round_trip() {
        for kind in [
            SchemaKind::PolyMesh,
            SchemaKind::Points,
            SchemaKind::Curves,
            SchemaKind::NuPatch,
            SchemaKind::Xform,
            SchemaKind::Camera,
            SchemaKind::FaceSet,
        ] {
            assert_eq!(SchemaKind::from_title(kind.title()), Some(kind));
        }
    }
}
