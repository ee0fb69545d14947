//! Boundary capability contract for the Arbor generation bridge.
//!
//! Defines what the bridge requires from an external rule-driven content
//! generator: binding a rule package, selecting rule files and start rules,
//! typed attribute access, one blocking generation call, and borrowed views
//! over the flat result buffers. The engine behind this trait is a black box;
//! everything host-facing lives in the `arbor-attrs`, `arbor-mesh`,
//! `arbor-materials` and `arbor-bridge` crates.

mod engine;
mod tag;
mod views;

pub mod stub;

pub use engine::{EngineError, EngineLogLevel, FloatBounds, GenerationEngine, LogSink};
pub use tag::RawAttrTag;
pub use views::{MaterialView, MeshView, SubMeshView};
