//! Heya chat relay server.
//!
//! Clients join a room over WebSocket; messages are persisted and broadcast to
//! everyone in that room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin heya-server -- --port 8080
//! ```

use clap::Parser;
use heya_server::ServerConfig;
use heya_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    // Run the server
    if let Err(e) = heya_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
