//! Borrowed views over boundary-owned result buffers.
//!
//! A view is valid only until the next call into the engine. Callers copy the
//! data into host-owned storage immediately and never retain a view.

/// One generated mesh as flat float buffers.
///
/// `positions` and `normals` hold `3 * vertex_count` floats; `texcoords`,
/// when present, holds `2 * vertex_count`. A missing texcoord buffer means
/// the mesh has no UVs, not that an error occurred.
#[derive(Clone, Copy, Debug)]
pub struct MeshView<'a> {
    pub name: &'a str,
    pub vertex_count: usize,
    pub positions: &'a [f32],
    pub normals: &'a [f32],
    pub texcoords: Option<&'a [f32]>,
}

/// One submesh: a triangle index list plus the material it is bound to.
///
/// `material_index` points into the material sequence of the same generation
/// result.
#[derive(Clone, Copy, Debug)]
pub struct SubMeshView<'a> {
    pub indices: &'a [u32],
    pub material_index: usize,
}

/// One generated material record.
#[derive(Clone, Copy, Debug)]
pub struct MaterialView<'a> {
    pub name: &'a str,
    pub color: [f32; 3],
    /// Absolute engine-side path of the diffuse texture, if any.
    pub diffuse_texture: Option<&'a str>,
}
