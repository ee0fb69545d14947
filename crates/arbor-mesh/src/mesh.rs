//! Owned mesh data as reconstructed from a generation result.

use glam::{Vec2, Vec3};

/// A reconstructed mesh in the caller's reference frame.
///
/// `normals` always has the same length as `positions`; `texcoords`, when
/// present, does too. A mesh without `texcoords` has no UVs.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords: Option<Vec<Vec2>>,
    pub submeshes: Vec<SubMesh>,
}

/// A triangle-list index range of the owning mesh, bound to one material.
///
/// `material` indexes into the material sequence of the same generation
/// result; every index is `< positions.len()` of the owning mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct SubMesh {
    pub indices: Vec<u32>,
    pub material: usize,
}

impl Mesh {
    /// Total triangle count across all submeshes.
    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.indices.len() / 3).sum()
    }
}
