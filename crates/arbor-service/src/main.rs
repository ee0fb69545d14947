//! Service entry point: config, logging, demo context, HTTP server.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use arbor_log::install_log_bridge;
use arbor_service::BridgeServer;
use clap::Parser;

fn main() {
    let args = arbor_config::CliArgs::parse();
    let config_dir = args
        .config
        .clone()
        .unwrap_or_else(arbor_config::default_config_dir);

    let mut config = match arbor_config::Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load config: {e}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    arbor_log::init_logging(None, cfg!(debug_assertions), Some(&config));

    let mut context = match arbor_service::demo::demo_context(&config) {
        Ok(context) => context,
        Err(e) => {
            tracing::error!("failed to set up generation context: {e}");
            std::process::exit(1);
        }
    };
    install_log_bridge(context.engine_mut());

    let mut server = BridgeServer::new(config.service.address.clone(), config.service.port);
    if let Err(e) = server.start(Arc::new(Mutex::new(context))) {
        tracing::error!("{e}");
        std::process::exit(1);
    }

    loop {
        thread::sleep(Duration::from_secs(1));
        // Pick up on-disk config edits; the bound address and port only
        // change on restart.
        match config.reload(&config_dir) {
            Ok(Some(new_config)) => {
                tracing::info!("config file changed, restart to apply service settings");
                config = new_config;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("config reload failed: {e}"),
        }
    }
}
