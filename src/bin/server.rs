//! FlatFS Server Binary
//!
//! Opens the store and serves it over TCP.

use std::sync::Arc;

use clap::Parser;
use flatfs::network::Server;
use flatfs::{Config, Engine, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// FlatFS Server
#[derive(Parser, Debug)]
#[command(name = "flatfs-server")]
#[command(about = "Single-file blob store server")]
#[command(version)]
struct Args {
    /// Backing store file
    #[arg(short, long, default_value = "./flatfs.store")]
    store: String,

    /// Store capacity in bytes (only used when the store is created)
    #[arg(short, long, default_value = "16777216")]
    capacity: u32,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "64")]
    max_connections: usize,

    /// fsync after every write instead of every 64 writes
    #[arg(long)]
    sync_every_write: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,flatfs=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("FlatFS Server v{}", flatfs::VERSION);
    tracing::info!("Store: {}", args.store);
    tracing::info!("Listen address: {}", args.listen);

    let sync_strategy = if args.sync_every_write {
        SyncStrategy::EveryWrite
    } else {
        SyncStrategy::EveryNWrites { count: 64 }
    };

    // Build config from args
    let config = Config::builder()
        .store_path(&args.store)
        .capacity(args.capacity)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .sync_strategy(sync_strategy)
        .build();

    // Open engine
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Engine initialized: {} entries, {} bytes free",
        engine.len(),
        engine.available_space()
    );

    // Start server
    let mut server = Server::new(config, engine);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
