//! mmchat Development Backend
//!
//! Run with: cargo run --bin mmchat-backend
//!
//! # Configuration
//!
//! Read from `~/.config/mmchat/config.toml` or `./mmchat.toml`, then
//! environment variables:
//! - `MMCHAT_HOST`: Host to bind to (default: 0.0.0.0)
//! - `MMCHAT_PORT`: Port to listen on (default: 8000)
//! - `MMCHAT_STATIC_DIR`: Directory with index.html and the web bundle (default: ./interface)
//! - `MODEL1`, `MODEL2`: Models of single and comparison rooms
//! - `RUST_LOG`: Log filter (default: mmchat=info,tower_http=info)

use mmchat::backend::{serve, BackendState, EchoResponder};
use mmchat::config::Config;
use mmchat::logging::init_logging;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_logging(&config.logging);

    tracing::info!("Starting mmchat backend v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Static directory: {}", config.backend.static_dir);
    tracing::info!(
        model1 = %config.backend.model1,
        model2 = %config.backend.model2,
        "Models configured"
    );

    let backend = config.backend.clone();
    let state = BackendState::new(config.backend, Arc::new(EchoResponder));
    serve(state, &backend).await?;

    tracing::info!("mmchat backend stopped");
    Ok(())
}
