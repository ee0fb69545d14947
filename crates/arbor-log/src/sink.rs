//! Forwarding of generator-side log callbacks into `tracing`.

use std::sync::{Arc, OnceLock};

use arbor_engine::{EngineLogLevel, GenerationEngine, LogSink};
use tracing::{error, info, warn};

/// A [`LogSink`] that forwards generator log messages to `tracing`.
///
/// Severity maps onto the host's three working levels: warnings stay
/// warnings, errors and fatals become errors, everything else is info.
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: EngineLogLevel, message: &str) {
        match level {
            EngineLogLevel::Warning => warn!(target: "generator", "{message}"),
            EngineLogLevel::Error | EngineLogLevel::Fatal => {
                error!(target: "generator", "{message}")
            }
            _ => info!(target: "generator", "{message}"),
        }
    }
}

static BRIDGE: OnceLock<Arc<TracingSink>> = OnceLock::new();

/// Register the process-wide log bridge with `engine`.
///
/// The bridge is installed at most once per process; later calls are
/// no-ops, so the engine never sees a second registration.
pub fn install_log_bridge<E: GenerationEngine + ?Sized>(engine: &mut E) {
    let sink = Arc::new(TracingSink);
    if BRIDGE.set(sink.clone()).is_ok() {
        engine.register_log_sink(sink);
    }
}
