//! Copy-out of generated mesh buffers into owned [`Mesh`] records.

use arbor_engine::{MeshView, SubMeshView};
use glam::{Affine3A, Vec2, Vec3};
use thiserror::Error;

use crate::mesh::{Mesh, SubMesh};

/// Validation failures while copying a mesh out of the boundary.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// A required buffer holds fewer elements than the vertex count implies.
    #[error("{buffer} buffer of mesh '{mesh}' holds {actual} floats, expected {expected}")]
    ShortBuffer {
        mesh: String,
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A submesh index points past the owning mesh's vertex sequence.
    #[error("index {index} out of range for mesh '{mesh}' with {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },

    /// A submesh references a material outside the assembled material set.
    #[error("material index {index} out of range ({material_count} materials) in mesh '{mesh}'")]
    MaterialOutOfRange {
        mesh: String,
        index: usize,
        material_count: usize,
    },
}

/// Copy one generated mesh and its submeshes into an owned [`Mesh`].
///
/// `local_to_engine` is the forward transform the caller applied to the input
/// shape. Positions come back through its inverse; normals have their
/// engine-side Z component sign-inverted first, which corrects for the
/// generator's opposite handedness, and then take the forward transform's
/// rotational component. The asymmetry is deliberate and load-bearing.
///
/// `material_count` is the size of the material sequence assembled from the
/// same generation result; every submesh material index is validated against
/// it, so materials must be assembled first.
pub fn assemble_mesh(
    view: &MeshView<'_>,
    submeshes: &[SubMeshView<'_>],
    local_to_engine: &Affine3A,
    material_count: usize,
) -> Result<Mesh, AssembleError> {
    let count = view.vertex_count;
    check_buffer(view, "position", view.positions.len(), 3 * count)?;
    check_buffer(view, "normal", view.normals.len(), 3 * count)?;
    if let Some(texcoords) = view.texcoords {
        check_buffer(view, "texcoord", texcoords.len(), 2 * count)?;
    }

    let engine_to_local = local_to_engine.inverse();

    let positions: Vec<Vec3> = view.positions[..3 * count]
        .chunks_exact(3)
        .map(|p| engine_to_local.transform_point3(Vec3::new(p[0], p[1], p[2])))
        .collect();

    let normals: Vec<Vec3> = view.normals[..3 * count]
        .chunks_exact(3)
        .map(|n| local_to_engine.transform_vector3(Vec3::new(n[0], n[1], -n[2])))
        .collect();

    let texcoords: Option<Vec<Vec2>> = view.texcoords.map(|uv| {
        uv[..2 * count]
            .chunks_exact(2)
            .map(|t| Vec2::new(t[0], t[1]))
            .collect()
    });

    let mut out_submeshes = Vec::with_capacity(submeshes.len());
    for sub in submeshes {
        for &index in sub.indices {
            if index as usize >= count {
                return Err(AssembleError::IndexOutOfRange {
                    mesh: view.name.to_owned(),
                    index,
                    vertex_count: count,
                });
            }
        }
        if sub.material_index >= material_count {
            return Err(AssembleError::MaterialOutOfRange {
                mesh: view.name.to_owned(),
                index: sub.material_index,
                material_count,
            });
        }
        out_submeshes.push(SubMesh {
            indices: sub.indices.to_vec(),
            material: sub.material_index,
        });
    }

    Ok(Mesh {
        name: view.name.to_owned(),
        positions,
        normals,
        texcoords,
        submeshes: out_submeshes,
    })
}

fn check_buffer(
    view: &MeshView<'_>,
    buffer: &'static str,
    actual: usize,
    expected: usize,
) -> Result<(), AssembleError> {
    if actual < expected {
        Err(AssembleError::ShortBuffer {
            mesh: view.name.to_owned(),
            buffer,
            expected,
            actual,
        })
    } else {
        Ok(())
    }
}
