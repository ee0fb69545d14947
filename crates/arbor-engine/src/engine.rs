//! The `GenerationEngine` trait and its error/logging surface.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::tag::RawAttrTag;
use crate::views::{MaterialView, MeshView, SubMeshView};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures surfaced by the boundary.
///
/// All of these are non-fatal to the process: a failed bind leaves the engine
/// unbound, a failed selection leaves the previous selection untouched, and a
/// failed generation leaves no new result set.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected the rule package.
    #[error("rule package bind rejected: {0}")]
    Bind(String),

    /// Rule file selection index out of range or rejected.
    #[error("rule file selection rejected: index {index} of {available}")]
    RuleFileSelection { index: usize, available: usize },

    /// Start rule selection index out of range or rejected.
    #[error("start rule selection rejected: index {index} of {available}")]
    StartRuleSelection { index: usize, available: usize },

    /// The generation call failed; no result set is available.
    #[error("generation failed: {0}")]
    Generation(String),
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Severity of a log event emitted by the engine during generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EngineLogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    /// Logging disabled; events at this level carry no severity.
    None,
}

impl EngineLogLevel {
    /// Decode the engine's numeric level encoding.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Trace,
            1 => Self::Debug,
            2 => Self::Info,
            3 => Self::Warning,
            4 => Self::Error,
            5 => Self::Fatal,
            _ => Self::None,
        }
    }

    /// The engine's numeric level encoding.
    pub fn as_raw(self) -> u32 {
        match self {
            Self::Trace => 0,
            Self::Debug => 1,
            Self::Info => 2,
            Self::Warning => 3,
            Self::Error => 4,
            Self::Fatal => 5,
            Self::None => 1000,
        }
    }
}

/// Receiver for leveled log events emitted by the engine.
///
/// Exactly one sink registration exists process-wide; registrations after the
/// first are no-ops. See `arbor_log::install_log_bridge`.
pub trait LogSink: Send + Sync {
    fn log(&self, level: EngineLogLevel, message: &str);
}

// ---------------------------------------------------------------------------
// FloatBounds
// ---------------------------------------------------------------------------

/// A float attribute value with its optional range, as reported by the
/// boundary. Absent bounds are encoded as NaN.
#[derive(Clone, Copy, Debug)]
pub struct FloatBounds {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl FloatBounds {
    /// A value with no declared range.
    pub fn unbounded(value: f64) -> Self {
        Self {
            value,
            min: f64::NAN,
            max: f64::NAN,
        }
    }

    /// Lower bound, if the attribute declares one.
    pub fn min_bound(&self) -> Option<f64> {
        (!self.min.is_nan()).then_some(self.min)
    }

    /// Upper bound, if the attribute declares one.
    pub fn max_bound(&self) -> Option<f64> {
        (!self.max.is_nan()).then_some(self.max)
    }
}

// ---------------------------------------------------------------------------
// GenerationEngine
// ---------------------------------------------------------------------------

/// Capability contract the bridge requires from the external generator.
///
/// The contract is synchronous: `generate` blocks until the engine returns,
/// and there is no cancellation. An implementation owns all boundary-side
/// state for one context; independent engine instances may be used
/// concurrently by independent callers.
///
/// Per-kind getters return `None` when the index is out of range or the
/// attribute is not of the requested kind; setters likewise return `false`
/// and leave the attribute untouched. String getters return borrows that are
/// only valid until the next engine call.
pub trait GenerationEngine: Send {
    /// Bind a rule package, unpacking it under `unpack_dir`. Discards any
    /// previous selection, attributes, and results.
    fn bind(&mut self, rule_package: &Path, unpack_dir: &Path) -> Result<(), EngineError>;

    /// Names of the rule files in the bound package. Empty when unbound.
    fn rule_files(&self) -> Vec<String>;

    /// Select a rule file by index into `rule_files`.
    fn select_rule_file(&mut self, index: usize) -> Result<(), EngineError>;

    /// Names of the start rules in the selected rule file. Empty when no rule
    /// file is selected.
    fn start_rules(&self) -> Vec<String>;

    /// Select a start rule by index into `start_rules`.
    fn select_start_rule(&mut self, index: usize) -> Result<(), EngineError>;

    /// Number of generator-visible attributes for the current selection.
    fn attribute_count(&self) -> usize;

    /// Compound type tag of the attribute at `index`. Empty when out of range.
    fn attribute_tag(&self, index: usize) -> RawAttrTag;

    /// Name of the attribute at `index` (possibly namespaced, e.g.
    /// `Style$Param`).
    fn attribute_name(&self, index: usize) -> Option<&str>;

    fn bool_value(&self, index: usize) -> Option<bool>;
    fn float_value(&self, index: usize) -> Option<FloatBounds>;
    fn string_value(&self, index: usize) -> Option<&str>;
    fn directory_value(&self, index: usize) -> Option<&str>;
    /// Value plus extension filter string (presentation only).
    fn file_value(&self, index: usize) -> Option<(&str, &str)>;
    fn color_value(&self, index: usize) -> Option<&str>;
    fn enum_selection(&self, index: usize) -> Option<usize>;
    fn enum_field_count(&self, index: usize) -> usize;
    fn enum_field(&self, index: usize, field: usize) -> Option<&str>;

    fn set_bool_value(&mut self, index: usize, value: bool) -> bool;
    fn set_float_value(&mut self, index: usize, value: f64) -> bool;
    fn set_string_value(&mut self, index: usize, value: &str) -> bool;
    fn set_directory_value(&mut self, index: usize, value: &str) -> bool;
    fn set_file_value(&mut self, index: usize, value: &str) -> bool;
    fn set_color_value(&mut self, index: usize, value: &str) -> bool;
    fn set_enum_selection(&mut self, index: usize, selection: usize) -> bool;

    /// Run one generation for the given input shape (engine-space vertex
    /// triples plus a CCW triangle index list) and the current attribute
    /// values. `special_material` names a material the engine may use to tag
    /// certain output submeshes (e.g. collision geometry).
    ///
    /// On success the result buffers stay owned by the engine until
    /// `release_results`; on failure no new result set exists.
    fn generate(
        &mut self,
        positions: &[f32],
        indices: &[u32],
        special_material: Option<&str>,
    ) -> Result<(), EngineError>;

    fn material_count(&self) -> usize;
    fn material(&self, index: usize) -> Option<MaterialView<'_>>;
    fn mesh_count(&self) -> usize;
    fn mesh(&self, index: usize) -> Option<MeshView<'_>>;
    fn submesh_count(&self, mesh: usize) -> usize;
    fn submesh(&self, mesh: usize, sub: usize) -> Option<SubMeshView<'_>>;

    /// Release the result buffers of the last generation. Calling this twice
    /// without an intervening generation is a no-op.
    fn release_results(&mut self);

    /// Register the process-wide log sink. Registrations after the first are
    /// ignored.
    fn register_log_sink(&mut self, sink: Arc<dyn LogSink>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_raw_round_trip() {
        for level in [
            EngineLogLevel::Trace,
            EngineLogLevel::Debug,
            EngineLogLevel::Info,
            EngineLogLevel::Warning,
            EngineLogLevel::Error,
            EngineLogLevel::Fatal,
            EngineLogLevel::None,
        ] {
            assert_eq!(EngineLogLevel::from_raw(level.as_raw()), level);
        }
    }

    #[test]
    fn test_unknown_raw_level_maps_to_none() {
        assert_eq!(EngineLogLevel::from_raw(42), EngineLogLevel::None);
    }

    #[test]
    fn test_float_bounds_nan_means_absent() {
        let unbounded = FloatBounds::unbounded(0.5);
        assert!(unbounded.min_bound().is_none());
        assert!(unbounded.max_bound().is_none());

        let ranged = FloatBounds {
            value: 0.5,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(ranged.min_bound(), Some(0.0));
        assert_eq!(ranged.max_bound(), Some(1.0));
    }
}
