//! The generation context and its protocol sequencing.

use std::path::{Path, PathBuf};

use arbor_attrs::{Attribute, AttributeCache, SelectionKey, read_all, write_attribute};
use arbor_engine::{EngineError, GenerationEngine, SubMeshView};
use arbor_materials::{Material, TextureResolver, assemble_material};
use arbor_mesh::{AssembleError, Mesh, assemble_mesh};
use glam::Affine3A;
use thiserror::Error;
use tracing::{debug, info};

/// Failures surfaced by the context.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    /// The operation needs a bound package with a rule file and start rule
    /// selected.
    #[error("no complete rule selection")]
    NotBound,
}

/// The owned output of one successful generation.
///
/// Submesh material indices in `meshes` index into `materials`.
#[derive(Clone, Debug, Default)]
pub struct GenerationResult {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

/// One independent generation session over an engine.
///
/// The context owns its engine and tracks the current selection alongside it,
/// so host callers never hand the engine indices it has not advertised.
/// Attribute snapshots are cached per selection; host edits to the snapshot
/// are written back to the engine immediately before each generation.
pub struct GenerationContext<E: GenerationEngine> {
    engine: E,
    unpack_dir: PathBuf,
    resolver: TextureResolver,
    special_material: Option<String>,
    rule_package: Option<PathBuf>,
    rule_files: Vec<String>,
    rule_file: Option<usize>,
    start_rules: Vec<String>,
    start_rule: Option<usize>,
    cache: AttributeCache,
    results: Option<GenerationResult>,
}

impl<E: GenerationEngine> GenerationContext<E> {
    pub fn new(
        engine: E,
        unpack_dir: impl Into<PathBuf>,
        resolver: TextureResolver,
        special_material: Option<String>,
    ) -> Self {
        Self {
            engine,
            unpack_dir: unpack_dir.into(),
            resolver,
            special_material,
            rule_package: None,
            rule_files: Vec::new(),
            rule_file: None,
            start_rules: Vec::new(),
            start_rule: None,
            cache: AttributeCache::new(),
            results: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Direct engine access, e.g. for log sink registration.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    // -----------------------------------------------------------------------
    // Selection protocol
    // -----------------------------------------------------------------------

    /// Bind a rule package, replacing any previous binding.
    ///
    /// A failed bind leaves the context unbound; the previous selection and
    /// attribute snapshot are gone either way.
    pub fn bind_rule_package(&mut self, rule_package: &Path) -> Result<(), BridgeError> {
        self.rule_package = None;
        self.rule_files.clear();
        self.rule_file = None;
        self.start_rules.clear();
        self.start_rule = None;
        self.cache.invalidate();

        self.engine.bind(rule_package, &self.unpack_dir)?;

        self.rule_package = Some(rule_package.to_path_buf());
        self.rule_files = self.engine.rule_files();
        info!(
            package = %rule_package.display(),
            rule_files = self.rule_files.len(),
            "bound rule package"
        );
        Ok(())
    }

    /// Rule files of the bound package. Empty when unbound.
    pub fn rule_files(&self) -> &[String] {
        &self.rule_files
    }

    /// Select a rule file by index into [`rule_files`](Self::rule_files).
    ///
    /// A failed selection leaves the previous one in place.
    pub fn select_rule_file(&mut self, index: usize) -> Result<(), BridgeError> {
        if self.rule_package.is_none() {
            return Err(BridgeError::NotBound);
        }
        self.engine.select_rule_file(index)?;

        self.rule_file = Some(index);
        self.start_rules = self.engine.start_rules();
        self.start_rule = None;
        self.cache.invalidate();
        Ok(())
    }

    /// Start rules of the selected rule file. Empty when none is selected.
    pub fn start_rules(&self) -> &[String] {
        &self.start_rules
    }

    /// Select a start rule by index into [`start_rules`](Self::start_rules).
    pub fn select_start_rule(&mut self, index: usize) -> Result<(), BridgeError> {
        if self.rule_file.is_none() {
            return Err(BridgeError::NotBound);
        }
        self.engine.select_start_rule(index)?;

        self.start_rule = Some(index);
        self.cache.invalidate();
        Ok(())
    }

    fn selection_key(&self) -> Option<SelectionKey> {
        Some(SelectionKey {
            rule_package: self.rule_package.clone()?,
            rule_file: self.rule_file?,
            start_rule: self.start_rule?,
        })
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    /// The attribute snapshot for the current selection.
    ///
    /// Enumerated from the engine on first access and cached until the
    /// selection changes. Empty while no complete selection exists.
    pub fn attributes(&mut self) -> &[Attribute] {
        let Some(key) = self.selection_key() else {
            return &[];
        };
        if self.cache.get(&key).is_none() {
            let attrs = read_all(&self.engine);
            debug!(count = attrs.len(), "enumerated attribute snapshot");
            self.cache.store(key.clone(), attrs);
        }
        self.cache.get(&key).unwrap_or(&[])
    }

    /// Mutable access to the attribute snapshot, for host edits.
    ///
    /// Edits take effect on the next [`generate`](Self::generate) call.
    pub fn attributes_mut(&mut self) -> Option<&mut Vec<Attribute>> {
        let key = self.selection_key()?;
        if self.cache.get(&key).is_none() {
            let attrs = read_all(&self.engine);
            self.cache.store(key.clone(), attrs);
        }
        self.cache.get_mut(&key)
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Run one generation for the given input shape.
    ///
    /// `positions` are engine-space vertex triples, `indices` a CCW triangle
    /// list. `local_to_engine` is the forward transform from the caller's
    /// reference frame into engine space; assembled output is mapped back
    /// through it. On success the previous result set is replaced; on failure
    /// it is kept as-is.
    pub fn generate(
        &mut self,
        positions: &[f32],
        indices: &[u32],
        local_to_engine: &Affine3A,
    ) -> Result<&GenerationResult, BridgeError> {
        let key = self.selection_key().ok_or(BridgeError::NotBound)?;

        // Flush host edits to the engine before generating.
        if let Some(attrs) = self.cache.get(&key) {
            for attr in attrs {
                write_attribute(&mut self.engine, attr);
            }
        }

        self.engine
            .generate(positions, indices, self.special_material.as_deref())?;

        // Copy everything out of the boundary buffers, materials first so
        // submesh material indices can be validated, then release them.
        let assembled = self.copy_out(local_to_engine);
        self.engine.release_results();

        let result = assembled?;
        info!(
            meshes = result.meshes.len(),
            materials = result.materials.len(),
            "generation complete"
        );
        Ok(self.results.insert(result))
    }

    fn copy_out(&self, local_to_engine: &Affine3A) -> Result<GenerationResult, BridgeError> {
        let materials: Vec<Material> = (0..self.engine.material_count())
            .filter_map(|i| self.engine.material(i))
            .map(|view| assemble_material(&view, &self.resolver))
            .collect();

        let mut meshes = Vec::with_capacity(self.engine.mesh_count());
        for m in 0..self.engine.mesh_count() {
            let Some(view) = self.engine.mesh(m) else {
                continue;
            };
            let submeshes: Vec<SubMeshView<'_>> = (0..self.engine.submesh_count(m))
                .filter_map(|s| self.engine.submesh(m, s))
                .collect();
            meshes.push(assemble_mesh(
                &view,
                &submeshes,
                local_to_engine,
                materials.len(),
            )?);
        }

        Ok(GenerationResult { meshes, materials })
    }

    /// The owned output of the last successful generation.
    pub fn results(&self) -> Option<&GenerationResult> {
        self.results.as_ref()
    }

    /// Drop the held result set. Releasing twice is a no-op.
    pub fn release(&mut self) {
        self.results = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_attrs::AttrValue;
    use arbor_engine::stub::{
        StubAttr, StubEngine, StubMaterial, StubMesh, StubOutput, StubPackage, StubSubMesh,
    };
    use glam::{Affine3A, Vec3};

    const RPK: &str = "/rules/building.rpk";

    fn package() -> StubPackage {
        StubPackage {
            rule_files: vec!["bin/building.cgb".into()],
            start_rules: vec!["Default$Lot".into(), "Default$Street".into()],
            attributes: vec![
                StubAttr::Bool {
                    name: "hasRoof".into(),
                    value: true,
                },
                StubAttr::Float {
                    name: "height".into(),
                    value: 10.0,
                    min: 0.0,
                    max: 30.0,
                },
            ],
            output: StubOutput {
                materials: vec![StubMaterial {
                    name: "wall".into(),
                    color: [0.8, 0.8, 0.7],
                    diffuse_texture: None,
                }],
                meshes: vec![StubMesh {
                    name: "building".into(),
                    positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                    normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
                    texcoords: None,
                    submeshes: vec![StubSubMesh {
                        indices: vec![0, 1, 2],
                        material_index: 0,
                    }],
                }],
            },
        }
    }

    fn context() -> GenerationContext<StubEngine> {
        let engine = StubEngine::new().with_package(RPK, package());
        let resolver = TextureResolver::new("/nonexistent", "Assets");
        GenerationContext::new(engine, "/tmp/unpack", resolver, None)
    }

    fn selected_context() -> GenerationContext<StubEngine> {
        let mut ctx = context();
        ctx.bind_rule_package(Path::new(RPK)).unwrap();
        ctx.select_rule_file(0).unwrap();
        ctx.select_start_rule(0).unwrap();
        ctx
    }

    fn triangle() -> (Vec<f32>, Vec<u32>) {
        (
            vec![0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0, 10.0],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_bind_populates_rule_files() {
        let mut ctx = context();
        ctx.bind_rule_package(Path::new(RPK)).unwrap();
        assert_eq!(ctx.rule_files(), ["bin/building.cgb"]);
        assert!(ctx.start_rules().is_empty());
    }

    #[test]
    fn test_failed_bind_leaves_context_unbound() {
        let mut ctx = selected_context();
        let err = ctx.bind_rule_package(Path::new("/missing.rpk")).unwrap_err();
        assert!(matches!(err, BridgeError::Engine(EngineError::Bind(_))));
        assert!(ctx.rule_files().is_empty());
        assert!(ctx.attributes().is_empty());
    }

    #[test]
    fn test_selection_before_bind_is_rejected() {
        let mut ctx = context();
        assert!(matches!(ctx.select_rule_file(0), Err(BridgeError::NotBound)));
        assert!(matches!(
            ctx.select_start_rule(0),
            Err(BridgeError::NotBound)
        ));
    }

    #[test]
    fn test_attributes_empty_without_full_selection() {
        let mut ctx = context();
        ctx.bind_rule_package(Path::new(RPK)).unwrap();
        ctx.select_rule_file(0).unwrap();
        assert!(ctx.attributes().is_empty());
    }

    #[test]
    fn test_attributes_reflect_selection() {
        let mut ctx = selected_context();
        let attrs = ctx.attributes();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name, "hasRoof");
        assert_eq!(
            attrs[1].value,
            AttrValue::Float {
                value: 10.0,
                min: Some(0.0),
                max: Some(30.0),
            }
        );
    }

    #[test]
    fn test_selection_change_invalidates_snapshot() {
        let mut ctx = selected_context();
        ctx.attributes_mut().unwrap()[1].value = AttrValue::Float {
            value: 25.0,
            min: Some(0.0),
            max: Some(30.0),
        };

        ctx.select_start_rule(1).unwrap();
        // Fresh snapshot from the engine, the edit never reached it.
        assert_eq!(
            ctx.attributes()[1].value,
            AttrValue::Float {
                value: 10.0,
                min: Some(0.0),
                max: Some(30.0),
            }
        );
    }

    #[test]
    fn test_generate_flushes_host_edits() {
        let mut ctx = selected_context();
        ctx.attributes_mut().unwrap()[1].value = AttrValue::Float {
            value: 25.0,
            min: Some(0.0),
            max: Some(30.0),
        };

        let (positions, indices) = triangle();
        ctx.generate(&positions, &indices, &Affine3A::IDENTITY)
            .unwrap();
        assert_eq!(ctx.engine().float_value(1).map(|b| b.value), Some(25.0));
    }

    #[test]
    fn test_generate_copies_out_and_releases_boundary_buffers() {
        let mut ctx = selected_context();
        let (positions, indices) = triangle();
        let result = ctx
            .generate(&positions, &indices, &Affine3A::IDENTITY)
            .unwrap();

        assert_eq!(result.meshes.len(), 1);
        assert_eq!(result.materials.len(), 1);
        assert_eq!(result.meshes[0].submeshes[0].material, 0);
        assert_eq!(result.meshes[0].positions[1], Vec3::new(1.0, 0.0, 0.0));

        // Boundary buffers were released right after the copy-out.
        assert_eq!(ctx.engine().mesh_count(), 0);
        assert!(ctx.results().is_some());
    }

    #[test]
    fn test_generate_before_selection_is_rejected() {
        let mut ctx = context();
        let (positions, indices) = triangle();
        let err = ctx
            .generate(&positions, &indices, &Affine3A::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, BridgeError::NotBound));
    }

    #[test]
    fn test_failed_generation_keeps_previous_results() {
        let mut ctx = selected_context();
        let (positions, indices) = triangle();
        ctx.generate(&positions, &indices, &Affine3A::IDENTITY)
            .unwrap();

        // An empty input shape fails inside the engine.
        let err = ctx.generate(&[], &[], &Affine3A::IDENTITY).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Engine(EngineError::Generation(_))
        ));
        assert_eq!(ctx.results().map(|r| r.meshes.len()), Some(1));
    }

    #[test]
    fn test_sequential_generations_replace_results() {
        let mut ctx = selected_context();
        let (positions, indices) = triangle();
        ctx.generate(&positions, &indices, &Affine3A::IDENTITY)
            .unwrap();
        ctx.generate(&positions, &indices, &Affine3A::IDENTITY)
            .unwrap();
        assert_eq!(ctx.results().map(|r| r.meshes.len()), Some(1));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut ctx = selected_context();
        let (positions, indices) = triangle();
        ctx.generate(&positions, &indices, &Affine3A::IDENTITY)
            .unwrap();

        ctx.release();
        assert!(ctx.results().is_none());
        ctx.release();
        assert!(ctx.results().is_none());
    }

    #[test]
    fn test_special_material_is_forwarded() {
        let engine = StubEngine::new().with_package(RPK, package());
        let resolver = TextureResolver::new("/nonexistent", "Assets");
        let mut ctx = GenerationContext::new(
            engine,
            "/tmp/unpack",
            resolver,
            Some("CollisionMat".to_string()),
        );
        ctx.bind_rule_package(Path::new(RPK)).unwrap();
        ctx.select_rule_file(0).unwrap();
        ctx.select_start_rule(0).unwrap();

        let (positions, indices) = triangle();
        ctx.generate(&positions, &indices, &Affine3A::IDENTITY)
            .unwrap();
        assert_eq!(ctx.engine().last_special_material(), Some("CollisionMat"));
    }
}
