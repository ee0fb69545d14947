//! Wire types for the JSON API and their conversions.

use std::collections::HashMap;

use arbor_attrs::{AttrValue, Attribute};
use arbor_bridge::GenerationResult;
use arbor_materials::Material;
use arbor_mesh::{Mesh, SubMesh};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

// ---------------------------------------------------------------------------
// Rule discovery
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
pub struct RuleInfoResponse {
    pub rules: Vec<RuleDto>,
    pub attributes: Vec<AttrInfoDto>,
}

#[derive(Serialize, Deserialize)]
pub struct RuleDto {
    pub name: String,
    /// Always empty: the boundary reports start rules by name only. The
    /// field keeps the wire shape stable for clients that expect it.
    pub parameters: Vec<ParamDto>,
}

/// Typed parameter of a start rule, for clients of the rule-info shape.
/// See [`RuleDto::parameters`] for why none are populated.
#[derive(Serialize, Deserialize)]
pub struct ParamDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

#[derive(Serialize, Deserialize)]
pub struct AttrInfoDto {
    pub name: String,
    #[serde(rename = "returnType")]
    pub return_type: String,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Engine-space vertex triples of the input shape.
    pub vertices: Vec<f32>,
    /// CCW triangle index list over `vertices`.
    pub indices: Vec<u32>,
    /// Attribute overrides applied by name before generating.
    #[serde(default)]
    pub attributes: Option<HashMap<String, Value>>,
    /// Caller-chosen shape identifier echoed back in the result.
    #[serde(default)]
    pub uid: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ShapeResultDto {
    pub uids: Vec<String>,
    pub data: ShapeDataDto,
}

#[derive(Serialize, Deserialize)]
pub struct ShapeDataDto {
    pub meshes: Vec<MeshDto>,
    pub materials: Vec<MaterialDto>,
}

#[derive(Serialize, Deserialize)]
pub struct MeshDto {
    pub name: String,
    /// Flattened xyz triples.
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texcoords: Option<Vec<f32>>,
    pub submeshes: Vec<SubMeshDto>,
}

#[derive(Serialize, Deserialize)]
pub struct SubMeshDto {
    pub indices: Vec<u32>,
    pub material: usize,
}

#[derive(Serialize, Deserialize)]
pub struct MaterialDto {
    pub name: String,
    pub color: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diffuse_texture: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: f64,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<&Mesh> for MeshDto {
    fn from(mesh: &Mesh) -> Self {
        Self {
            name: mesh.name.clone(),
            vertices: mesh.positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect(),
            normals: mesh.normals.iter().flat_map(|n| [n.x, n.y, n.z]).collect(),
            texcoords: mesh
                .texcoords
                .as_ref()
                .map(|uv| uv.iter().flat_map(|t| [t.x, t.y]).collect()),
            submeshes: mesh.submeshes.iter().map(SubMeshDto::from).collect(),
        }
    }
}

impl From<&SubMesh> for SubMeshDto {
    fn from(sub: &SubMesh) -> Self {
        Self {
            indices: sub.indices.clone(),
            material: sub.material,
        }
    }
}

impl From<&Material> for MaterialDto {
    fn from(material: &Material) -> Self {
        Self {
            name: material.name.clone(),
            color: material.color,
            diffuse_texture: material
                .diffuse_texture
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}

impl From<&GenerationResult> for ShapeDataDto {
    fn from(result: &GenerationResult) -> Self {
        Self {
            meshes: result.meshes.iter().map(MeshDto::from).collect(),
            materials: result.materials.iter().map(MaterialDto::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Attribute overrides
// ---------------------------------------------------------------------------

/// Apply a name-to-value override map onto an attribute snapshot.
///
/// Unknown names and values of the wrong shape are skipped with a warning;
/// everything else updates the snapshot in place.
pub fn apply_attribute_overrides(attrs: &mut [Attribute], overrides: &HashMap<String, Value>) {
    for (name, raw) in overrides {
        match attrs.iter_mut().find(|a| a.name == *name) {
            Some(attr) => {
                if !apply_override(attr, raw) {
                    warn!(
                        attribute = %name,
                        kind = attr.kind().as_str(),
                        "override value has the wrong shape, ignored"
                    );
                }
            }
            None => warn!(attribute = %name, "unknown attribute override, ignored"),
        }
    }
}

fn apply_override(attr: &mut Attribute, raw: &Value) -> bool {
    match &mut attr.value {
        AttrValue::Bool(value) => match raw.as_bool() {
            Some(b) => {
                *value = b;
                true
            }
            None => false,
        },
        AttrValue::Float { value, .. } => match raw.as_f64() {
            Some(f) => {
                *value = f;
                true
            }
            None => false,
        },
        AttrValue::String(value)
        | AttrValue::Directory(value)
        | AttrValue::Color(value)
        | AttrValue::File { value, .. } => match raw.as_str() {
            Some(s) => {
                value.clear();
                value.push_str(s);
                true
            }
            None => false,
        },
        AttrValue::Enum { selection, fields } => {
            // Accept either a selection index or a field name.
            if let Some(index) = raw.as_u64() {
                let index = index as usize;
                if fields.is_empty() || index < fields.len() {
                    *selection = index;
                    return true;
                }
                false
            } else if let Some(name) = raw.as_str() {
                match fields.iter().position(|f| f == name) {
                    Some(index) => {
                        *selection = index;
                        true
                    }
                    None => false,
                }
            } else {
                false
            }
        }
    }
}
