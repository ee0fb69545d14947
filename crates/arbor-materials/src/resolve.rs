//! Texture path resolution and material copy-out.

use std::path::PathBuf;

use arbor_engine::MaterialView;
use tracing::warn;

use crate::material::Material;

/// Maps absolute engine-side texture paths into the host asset space.
///
/// The generator reports textures by the absolute path it unpacked them to;
/// the host only knows them relative to its asset root. Resolution locates a
/// fixed marker segment (e.g. `Assets`) in the reported path and rebases the
/// remainder onto the host root.
#[derive(Clone, Debug)]
pub struct TextureResolver {
    asset_root: PathBuf,
    marker: String,
}

impl TextureResolver {
    pub fn new(asset_root: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            asset_root: asset_root.into(),
            marker: marker.into(),
        }
    }

    /// Rebase `raw` into the host asset space.
    ///
    /// Returns `None`, with one diagnostic, when the marker segment is
    /// missing or no file exists at the rebased location.
    pub fn resolve(&self, raw: &str) -> Option<PathBuf> {
        let normalized = raw.replace('\\', "/");

        let prefix = format!("{}/", self.marker);
        let needle = format!("/{}/", self.marker);
        let relative = if let Some(rest) = normalized.strip_prefix(&prefix) {
            rest
        } else if let Some(pos) = normalized.find(&needle) {
            &normalized[pos + needle.len()..]
        } else {
            warn!(
                texture = raw,
                marker = %self.marker,
                "texture path has no marker segment, leaving material untextured"
            );
            return None;
        };

        let candidate = self.asset_root.join(relative);
        if candidate.is_file() {
            Some(candidate)
        } else {
            warn!(
                texture = raw,
                candidate = %candidate.display(),
                "cannot resolve diffuse texture, leaving material untextured"
            );
            None
        }
    }
}

/// Copy one generated material record into an owned [`Material`].
///
/// Color components are clamped to `[0, 1]`; an absent, empty, or
/// unresolvable texture reference yields an untextured material.
pub fn assemble_material(view: &MaterialView<'_>, resolver: &TextureResolver) -> Material {
    let diffuse_texture = view
        .diffuse_texture
        .filter(|t| !t.is_empty())
        .and_then(|t| resolver.resolve(t));

    let mut color = view.color;
    for c in &mut color {
        *c = c.clamp(0.0, 1.0);
    }

    Material {
        name: view.name.to_owned(),
        color,
        diffuse_texture,
    }
}
