//! HTTP daemon for the calculus engine
//!
//! Configured from `FUNCALC_ADDR`, `FUNCALC_MAX_DEPTH` and `FUNCALC_MAX_NODES`;
//! log level from `RUST_LOG` (default `info`).

use funcalc::server::{ServerConfig, serve};
use log::{error, info};

#[tokio::main]
async fn main() {
    funcalc::init_logger();

    let config = ServerConfig::from_env();
    info!(
        "starting funcalcd {} (max depth {}, max nodes {})",
        env!("CARGO_PKG_VERSION"),
        config.max_depth,
        config.max_nodes
    );

    if let Err(e) = serve(config).await {
        error!("server stopped: {}", e);
        std::process::exit(1);
    }
}
