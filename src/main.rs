// src/main.rs

//! The main entry point for the IDS2 agent.

use ids2_agent::agent;
use ids2_agent::config::ConfigStore;
use std::env;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let args: Vec<String> = env::args().collect();

    // Handle the --version flag.
    if args.contains(&"--version".to_string()) {
        println!("ids2-agent version {VERSION}");
        return;
    }

    // One optional positional argument: the configuration file path.
    let config_path = args.get(1).map(|s| s.as_str()).unwrap_or("config.yaml");

    // Load the configuration first; without a valid one there is nothing to run.
    let config_store = match ConfigStore::load(config_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to load configuration from \"{config_path}\": {e}");
            std::process::exit(1);
        }
    };

    // Logging level comes from the environment or, failing that, the config.
    let log_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| config_store.get().log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .compact()
        .with_ansi(true)
        .init();

    info!("IDS2 SOC pipeline agent v{VERSION} starting");

    if let Err(e) = agent::run(config_store).await {
        error!("Agent runtime error: {e}");
        std::process::exit(1);
    }
}
