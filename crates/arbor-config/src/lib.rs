//! Configuration for the Arbor bridge and its service wrapper.
//!
//! Runtime-configurable settings persisted to disk as RON, with CLI
//! overrides, hot-reload detection, and forward/backward compatible
//! serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{AssetConfig, Config, DebugConfig, EngineConfig, ServiceConfig};
pub use error::ConfigError;

use std::path::PathBuf;

/// Default config directory: `$XDG_CONFIG_HOME/arbor` (or the platform
/// equivalent), falling back to `./config`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("arbor"))
        .unwrap_or_else(|| PathBuf::from("./config"))
}
