//! In-memory scripted engine.
//!
//! `StubEngine` implements the full capability contract against scripted
//! packages: rule files, start rules, attribute descriptors with defaults,
//! and a canned generation output. It backs the bridge and service tests and
//! lets the demo service run without a native generator installed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::engine::{EngineError, EngineLogLevel, FloatBounds, GenerationEngine, LogSink};
use crate::tag::RawAttrTag;
use crate::views::{MaterialView, MeshView, SubMeshView};

// ---------------------------------------------------------------------------
// Scripted package description
// ---------------------------------------------------------------------------

/// One scripted attribute descriptor with its default value.
#[derive(Clone, Debug)]
pub enum StubAttr {
    Bool {
        name: String,
        value: bool,
    },
    Float {
        name: String,
        value: f64,
        /// NaN encodes an absent bound, matching the boundary convention.
        min: f64,
        max: f64,
    },
    String {
        name: String,
        value: String,
    },
    Directory {
        name: String,
        value: String,
    },
    File {
        name: String,
        value: String,
        ext: String,
    },
    Color {
        name: String,
        value: String,
    },
    Enum {
        name: String,
        selection: usize,
        fields: Vec<String>,
        /// Underlying scalar tag of the enum (BOOL, FLOAT, or STRING).
        underlying: RawAttrTag,
    },
}

impl StubAttr {
    fn name(&self) -> &str {
        match self {
            Self::Bool { name, .. }
            | Self::Float { name, .. }
            | Self::String { name, .. }
            | Self::Directory { name, .. }
            | Self::File { name, .. }
            | Self::Color { name, .. }
            | Self::Enum { name, .. } => name,
        }
    }

    fn tag(&self) -> RawAttrTag {
        match self {
            Self::Bool { .. } => RawAttrTag::BOOL,
            Self::Float { .. } => RawAttrTag::FLOAT,
            Self::String { .. } => RawAttrTag::STRING,
            Self::Directory { .. } => RawAttrTag::directory(),
            Self::File { .. } => RawAttrTag::file(),
            Self::Color { .. } => RawAttrTag::color(),
            Self::Enum { underlying, .. } => RawAttrTag::enum_over(*underlying),
        }
    }
}

/// One scripted output material.
#[derive(Clone, Debug)]
pub struct StubMaterial {
    pub name: String,
    pub color: [f32; 3],
    pub diffuse_texture: Option<String>,
}

/// One scripted output submesh.
#[derive(Clone, Debug)]
pub struct StubSubMesh {
    pub indices: Vec<u32>,
    pub material_index: usize,
}

/// One scripted output mesh as flat buffers.
#[derive(Clone, Debug)]
pub struct StubMesh {
    pub name: String,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub texcoords: Option<Vec<f32>>,
    pub submeshes: Vec<StubSubMesh>,
}

impl StubMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// The canned result of a successful generation.
#[derive(Clone, Debug, Default)]
pub struct StubOutput {
    pub materials: Vec<StubMaterial>,
    pub meshes: Vec<StubMesh>,
}

/// A scripted rule package the stub engine can bind to.
#[derive(Clone, Debug, Default)]
pub struct StubPackage {
    pub rule_files: Vec<String>,
    pub start_rules: Vec<String>,
    pub attributes: Vec<StubAttr>,
    pub output: StubOutput,
}

// ---------------------------------------------------------------------------
// StubEngine
// ---------------------------------------------------------------------------

/// In-memory implementation of [`GenerationEngine`].
pub struct StubEngine {
    packages: HashMap<PathBuf, StubPackage>,
    bound: Option<PathBuf>,
    rule_file: Option<usize>,
    start_rule: Option<usize>,
    attrs: Vec<StubAttr>,
    results: Option<StubOutput>,
    log_sink: Option<Arc<dyn LogSink>>,
    last_special_material: Option<String>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            packages: HashMap::new(),
            bound: None,
            rule_file: None,
            start_rule: None,
            attrs: Vec::new(),
            results: None,
            log_sink: None,
            last_special_material: None,
        }
    }

    /// Register a scripted package under the given path.
    pub fn with_package(mut self, path: impl Into<PathBuf>, package: StubPackage) -> Self {
        self.packages.insert(path.into(), package);
        self
    }

    /// The special-material name passed to the last `generate` call.
    pub fn last_special_material(&self) -> Option<&str> {
        self.last_special_material.as_deref()
    }

    fn package(&self) -> Option<&StubPackage> {
        self.bound.as_ref().and_then(|p| self.packages.get(p))
    }

    fn attr(&self, index: usize) -> Option<&StubAttr> {
        self.attrs.get(index)
    }

    fn emit(&self, level: EngineLogLevel, message: &str) {
        if let Some(sink) = &self.log_sink {
            sink.log(level, message);
        }
    }
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationEngine for StubEngine {
    fn bind(&mut self, rule_package: &Path, _unpack_dir: &Path) -> Result<(), EngineError> {
        self.rule_file = None;
        self.start_rule = None;
        self.attrs.clear();
        self.results = None;

        if self.packages.contains_key(rule_package) {
            self.bound = Some(rule_package.to_path_buf());
            Ok(())
        } else {
            self.bound = None;
            Err(EngineError::Bind(format!(
                "no such rule package: {}",
                rule_package.display()
            )))
        }
    }

    fn rule_files(&self) -> Vec<String> {
        self.package()
            .map(|p| p.rule_files.clone())
            .unwrap_or_default()
    }

    fn select_rule_file(&mut self, index: usize) -> Result<(), EngineError> {
        let available = self.package().map(|p| p.rule_files.len()).unwrap_or(0);
        if index >= available {
            return Err(EngineError::RuleFileSelection { index, available });
        }
        self.rule_file = Some(index);
        self.start_rule = None;
        self.attrs.clear();
        self.results = None;
        Ok(())
    }

    fn start_rules(&self) -> Vec<String> {
        if self.rule_file.is_none() {
            return Vec::new();
        }
        self.package()
            .map(|p| p.start_rules.clone())
            .unwrap_or_default()
    }

    fn select_start_rule(&mut self, index: usize) -> Result<(), EngineError> {
        if self.rule_file.is_none() {
            return Err(EngineError::StartRuleSelection {
                index,
                available: 0,
            });
        }
        let package = match self.package() {
            Some(p) => p,
            None => {
                return Err(EngineError::StartRuleSelection {
                    index,
                    available: 0,
                });
            }
        };
        let available = package.start_rules.len();
        if index >= available {
            return Err(EngineError::StartRuleSelection { index, available });
        }
        self.attrs = package.attributes.clone();
        self.start_rule = Some(index);
        self.results = None;
        Ok(())
    }

    fn attribute_count(&self) -> usize {
        self.attrs.len()
    }

    fn attribute_tag(&self, index: usize) -> RawAttrTag {
        self.attr(index).map(StubAttr::tag).unwrap_or_else(RawAttrTag::empty)
    }

    fn attribute_name(&self, index: usize) -> Option<&str> {
        self.attr(index).map(StubAttr::name)
    }

    fn bool_value(&self, index: usize) -> Option<bool> {
        match self.attr(index)? {
            StubAttr::Bool { value, .. } => Some(*value),
            _ => None,
        }
    }

    fn float_value(&self, index: usize) -> Option<FloatBounds> {
        match self.attr(index)? {
            StubAttr::Float {
                value, min, max, ..
            } => Some(FloatBounds {
                value: *value,
                min: *min,
                max: *max,
            }),
            _ => None,
        }
    }

    fn string_value(&self, index: usize) -> Option<&str> {
        match self.attr(index)? {
            StubAttr::String { value, .. } => Some(value),
            _ => None,
        }
    }

    fn directory_value(&self, index: usize) -> Option<&str> {
        match self.attr(index)? {
            StubAttr::Directory { value, .. } => Some(value),
            _ => None,
        }
    }

    fn file_value(&self, index: usize) -> Option<(&str, &str)> {
        match self.attr(index)? {
            StubAttr::File { value, ext, .. } => Some((value, ext)),
            _ => None,
        }
    }

    fn color_value(&self, index: usize) -> Option<&str> {
        match self.attr(index)? {
            StubAttr::Color { value, .. } => Some(value),
            _ => None,
        }
    }

    fn enum_selection(&self, index: usize) -> Option<usize> {
        match self.attr(index)? {
            StubAttr::Enum { selection, .. } => Some(*selection),
            _ => None,
        }
    }

    fn enum_field_count(&self, index: usize) -> usize {
        match self.attr(index) {
            Some(StubAttr::Enum { fields, .. }) => fields.len(),
            _ => 0,
        }
    }

    fn enum_field(&self, index: usize, field: usize) -> Option<&str> {
        match self.attr(index)? {
            StubAttr::Enum { fields, .. } => fields.get(field).map(String::as_str),
            _ => None,
        }
    }

    fn set_bool_value(&mut self, index: usize, new: bool) -> bool {
        match self.attrs.get_mut(index) {
            Some(StubAttr::Bool { value, .. }) => {
                *value = new;
                true
            }
            _ => false,
        }
    }

    fn set_float_value(&mut self, index: usize, new: f64) -> bool {
        match self.attrs.get_mut(index) {
            Some(StubAttr::Float { value, .. }) => {
                *value = new;
                true
            }
            _ => false,
        }
    }

    fn set_string_value(&mut self, index: usize, new: &str) -> bool {
        match self.attrs.get_mut(index) {
            Some(StubAttr::String { value, .. }) => {
                value.clear();
                value.push_str(new);
                true
            }
            _ => false,
        }
    }

    fn set_directory_value(&mut self, index: usize, new: &str) -> bool {
        match self.attrs.get_mut(index) {
            Some(StubAttr::Directory { value, .. }) => {
                value.clear();
                value.push_str(new);
                true
            }
            _ => false,
        }
    }

    fn set_file_value(&mut self, index: usize, new: &str) -> bool {
        match self.attrs.get_mut(index) {
            Some(StubAttr::File { value, .. }) => {
                value.clear();
                value.push_str(new);
                true
            }
            _ => false,
        }
    }

    fn set_color_value(&mut self, index: usize, new: &str) -> bool {
        match self.attrs.get_mut(index) {
            Some(StubAttr::Color { value, .. }) => {
                value.clear();
                value.push_str(new);
                true
            }
            _ => false,
        }
    }

    fn set_enum_selection(&mut self, index: usize, new: usize) -> bool {
        match self.attrs.get_mut(index) {
            Some(StubAttr::Enum {
                selection, fields, ..
            }) => {
                if !fields.is_empty() && new >= fields.len() {
                    return false;
                }
                *selection = new;
                true
            }
            _ => false,
        }
    }

    fn generate(
        &mut self,
        positions: &[f32],
        indices: &[u32],
        special_material: Option<&str>,
    ) -> Result<(), EngineError> {
        self.last_special_material = special_material.map(str::to_owned);

        if self.start_rule.is_none() {
            self.emit(EngineLogLevel::Error, "generate called without a start rule");
            return Err(EngineError::Generation("no start rule selected".into()));
        }
        if positions.len() % 3 != 0 {
            return Err(EngineError::Generation(
                "input positions are not xyz triples".into(),
            ));
        }
        // The start rules scripted here all require at least one input face.
        if indices.len() < 3 {
            self.emit(EngineLogLevel::Error, "input shape has no faces");
            return Err(EngineError::Generation("input shape has no faces".into()));
        }

        let output = match self.package() {
            Some(p) => p.output.clone(),
            None => return Err(EngineError::Generation("no package bound".into())),
        };

        self.emit(
            EngineLogLevel::Info,
            &format!(
                "generated {} meshes, {} materials",
                output.meshes.len(),
                output.materials.len()
            ),
        );
        self.results = Some(output);
        Ok(())
    }

    fn material_count(&self) -> usize {
        self.results.as_ref().map(|r| r.materials.len()).unwrap_or(0)
    }

    fn material(&self, index: usize) -> Option<MaterialView<'_>> {
        let material = self.results.as_ref()?.materials.get(index)?;
        Some(MaterialView {
            name: &material.name,
            color: material.color,
            diffuse_texture: material.diffuse_texture.as_deref(),
        })
    }

    fn mesh_count(&self) -> usize {
        self.results.as_ref().map(|r| r.meshes.len()).unwrap_or(0)
    }

    fn mesh(&self, index: usize) -> Option<MeshView<'_>> {
        let mesh = self.results.as_ref()?.meshes.get(index)?;
        Some(MeshView {
            name: &mesh.name,
            vertex_count: mesh.vertex_count(),
            positions: &mesh.positions,
            normals: &mesh.normals,
            texcoords: mesh.texcoords.as_deref(),
        })
    }

    fn submesh_count(&self, mesh: usize) -> usize {
        self.results
            .as_ref()
            .and_then(|r| r.meshes.get(mesh))
            .map(|m| m.submeshes.len())
            .unwrap_or(0)
    }

    fn submesh(&self, mesh: usize, sub: usize) -> Option<SubMeshView<'_>> {
        let submesh = self.results.as_ref()?.meshes.get(mesh)?.submeshes.get(sub)?;
        Some(SubMeshView {
            indices: &submesh.indices,
            material_index: submesh.material_index,
        })
    }

    fn release_results(&mut self) {
        self.results = None;
    }

    fn register_log_sink(&mut self, sink: Arc<dyn LogSink>) {
        if self.log_sink.is_none() {
            self.log_sink = Some(sink);
        }
    }
}
