//! Scripted demo package so the service can run without a native generator.

use std::path::Path;

use arbor_bridge::{BridgeError, GenerationContext};
use arbor_config::Config;
use arbor_engine::stub::{
    StubAttr, StubEngine, StubMaterial, StubMesh, StubOutput, StubPackage, StubSubMesh,
};
use arbor_engine::RawAttrTag;
use arbor_materials::TextureResolver;

/// Path the demo package is registered under.
pub const DEMO_PACKAGE: &str = "demo://building.rpk";

/// A small scripted building package: one rule file, two start rules, a
/// handful of typed attributes, and a one-mesh output.
pub fn demo_package() -> StubPackage {
    StubPackage {
        rule_files: vec!["bin/building.cgb".into()],
        start_rules: vec!["Default$Lot".into(), "Default$Footprint".into()],
        attributes: vec![
            StubAttr::Bool {
                name: "hasRoof".into(),
                value: true,
            },
            StubAttr::Float {
                name: "height".into(),
                value: 12.0,
                min: 3.0,
                max: 60.0,
            },
            StubAttr::Color {
                name: "wallColor".into(),
                value: "#d4cbb3".into(),
            },
            StubAttr::Enum {
                name: "roofStyle".into(),
                selection: 0,
                fields: vec!["flat".into(), "gable".into(), "hip".into()],
                underlying: RawAttrTag::STRING,
            },
        ],
        output: StubOutput {
            materials: vec![StubMaterial {
                name: "wall".into(),
                color: [0.83, 0.8, 0.7],
                diffuse_texture: None,
            }],
            meshes: vec![StubMesh {
                name: "building".into(),
                positions: vec![
                    0.0, 0.0, 0.0, //
                    10.0, 0.0, 0.0, //
                    10.0, 0.0, 10.0, //
                    0.0, 0.0, 10.0,
                ],
                normals: vec![
                    0.0, 1.0, 0.0, //
                    0.0, 1.0, 0.0, //
                    0.0, 1.0, 0.0, //
                    0.0, 1.0, 0.0,
                ],
                texcoords: Some(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]),
                submeshes: vec![StubSubMesh {
                    indices: vec![0, 1, 2, 0, 2, 3],
                    material_index: 0,
                }],
            }],
        },
    }
}

/// Build a context over the stub engine, bound and selected onto the demo
/// package (or `config.engine.rule_package` when set).
pub fn demo_context(config: &Config) -> Result<GenerationContext<StubEngine>, BridgeError> {
    let engine = StubEngine::new().with_package(DEMO_PACKAGE, demo_package());
    let resolver = TextureResolver::new(
        config.assets.asset_root.clone(),
        config.assets.texture_marker.clone(),
    );

    let mut context = GenerationContext::new(
        engine,
        config.engine.unpack_dir.clone(),
        resolver,
        config.engine.special_material.clone(),
    );

    let package = config
        .engine
        .rule_package
        .clone()
        .unwrap_or_else(|| DEMO_PACKAGE.into());
    context.bind_rule_package(Path::new(&package))?;
    context.select_rule_file(0)?;
    context.select_start_rule(0)?;
    Ok(context)
}
