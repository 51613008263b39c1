//! Real-time room and presence hub server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin yoriai-server
//! cargo run --bin yoriai-server -- --host 0.0.0.0 --port 3001 --heartbeat-secs 30
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use yoriai_server::{
    infrastructure::{InMemoryConnectionRegistry, InMemoryDurableStore},
    ui::{Server, ServerConfig},
    usecase::{ChatHub, RoomCoordinator},
};
use yoriai_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "yoriai-server")]
#[command(about = "Real-time room and presence hub over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "3001")]
    port: u16,

    /// Seconds between heartbeat sweeps
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    heartbeat_secs: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Connection registry and durable store
    // 2. ChatHub and RoomCoordinator
    // 3. Server
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let store = Arc::new(InMemoryDurableStore::new());

    let hub = Arc::new(ChatHub::new(registry));
    let coordinator = Arc::new(RoomCoordinator::new(hub, store));

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        heartbeat_interval: Duration::from_secs(args.heartbeat_secs),
    };
    tracing::info!("Starting with {:?}", config);

    if let Err(e) = Server::new(coordinator, config).run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
