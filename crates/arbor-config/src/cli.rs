//! Command-line argument parsing for the Arbor service.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Arbor service command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "arbor", about = "Arbor generation bridge service")]
pub struct CliArgs {
    /// Address to bind the service to.
    #[arg(long)]
    pub address: Option<String>,

    /// Port to bind the service to.
    #[arg(long)]
    pub port: Option<u16>,

    /// Root directory textures are resolved against.
    #[arg(long)]
    pub asset_root: Option<PathBuf>,

    /// Rule package to bind at startup.
    #[arg(long)]
    pub rule_package: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref addr) = args.address {
            self.service.address = addr.clone();
        }
        if let Some(port) = args.port {
            self.service.port = port;
        }
        if let Some(ref root) = args.asset_root {
            self.assets.asset_root = root.clone();
        }
        if let Some(ref rpk) = args.rule_package {
            self.engine.rule_package = Some(rpk.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            address: Some("0.0.0.0".to_string()),
            port: Some(9000),
            asset_root: None,
            rule_package: Some(PathBuf::from("rules/towers.pkg")),
            log_level: None,
            config: None,
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.service.address, "0.0.0.0");
        assert_eq!(config.service.port, 9000);
        assert_eq!(
            config.engine.rule_package,
            Some(PathBuf::from("rules/towers.pkg"))
        );
        // Non-overridden fields retain defaults
        assert_eq!(config.assets.texture_marker, "Assets");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        let args = CliArgs {
            address: None,
            port: None,
            asset_root: None,
            rule_package: None,
            log_level: None,
            config: None,
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config, original);
    }
}
