//! Structured logging for the Arbor bridge.
//!
//! Provides structured, filterable logging via the `tracing` ecosystem, plus
//! the bridge that forwards generator-side log callbacks into the host's
//! logging pipeline. Integrates with the configuration system to allow
//! runtime log level control.

mod sink;

pub use sink::{TracingSink, install_log_bridge};

use arbor_config::Config;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for the Arbor service.
///
/// Sets up structured logging with:
/// - Console output with timestamps, module paths, and severity levels
/// - JSON file logging in debug builds (optional)
/// - Environment-based filtering (respects RUST_LOG)
/// - Integration with config system log_level setting
///
/// # Arguments
///
/// * `log_dir` - Optional directory for JSON log files (debug builds only)
/// * `debug_build` - Whether this is a debug build (enables file logging)
/// * `config` - Optional configuration to use for log level override
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    // Base filter: info by default, overridable via RUST_LOG env var
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    // Console layer: human-readable format with timestamps
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    // In debug builds, also log to a file for post-mortem analysis
    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("arbor.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Filter directives to fall back to when `RUST_LOG` is unset: the config's
/// log level when one is set, `info` otherwise.
fn filter_directives(config: Option<&Config>) -> &str {
    match config {
        Some(config) if !config.debug.log_level.is_empty() => &config.debug.log_level,
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_log_level_overrides_default() {
        let mut config = Config::default();
        config.debug.log_level = "debug,arbor_service=trace".to_string();
        assert_eq!(
            filter_directives(Some(&config)),
            "debug,arbor_service=trace"
        );
    }

    #[test]
    fn test_missing_log_level_falls_back_to_info() {
        let mut config = Config::default();
        config.debug.log_level.clear();
        assert_eq!(filter_directives(Some(&config)), "info");
        assert_eq!(filter_directives(None), "info");
    }

    #[test]
    fn test_directives_parse_as_env_filters() {
        let mut config = Config::default();
        config.debug.log_level = "warn,arbor_attrs=debug,arbor_mesh=trace".to_string();
        for directives in [filter_directives(Some(&config)), filter_directives(None)] {
            assert!(
                EnvFilter::try_from(directives).is_ok(),
                "failed to parse: {directives}"
            );
        }
    }
}
