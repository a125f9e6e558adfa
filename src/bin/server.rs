//! yamlstore Server Binary
//!
//! Starts the TCP server for yamlstore.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use yamlstore::network::Server;
use yamlstore::{Config, Dispatcher, DocumentStore};

/// yamlstore Server
#[derive(Parser, Debug)]
#[command(name = "yamlstore-server")]
#[command(about = "Networked key/field store over YAML documents")]
#[command(version)]
struct Args {
    /// Storage directory (one <key>.yaml file per key)
    #[arg(short, long, default_value = "./data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:9999")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,yamlstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("yamlstore Server v{}", yamlstore::VERSION);
    tracing::info!("Storage directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .build();

    // Open the store
    let store = match DocumentStore::open(&config.data_dir) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    let dispatcher = Arc::new(Dispatcher::new(store));

    // Bind and serve
    let server = match Server::bind(&config, dispatcher) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
