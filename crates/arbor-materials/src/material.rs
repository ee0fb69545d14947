//! Owned material data as reconstructed from a generation result.

use std::path::PathBuf;

/// A reconstructed material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    /// RGB, each component in `[0, 1]`.
    pub color: [f32; 3],
    /// Resolved host-side diffuse texture path; `None` means untextured.
    pub diffuse_texture: Option<PathBuf>,
}

impl Material {
    pub fn is_textured(&self) -> bool {
        self.diffuse_texture.is_some()
    }
}
