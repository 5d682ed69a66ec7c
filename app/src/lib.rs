//! Smart order router server library

use anyhow::Context;
use router_api::AppState;
use router_core::ServerConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; `RUST_LOG` adds to the defaults.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sor=debug".parse()?)
                .add_directive("smart_order_router=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();
    Ok(())
}

/// Load configuration and the pool snapshot, then serve until shutdown
pub async fn run() -> anyhow::Result<()> {
    let config = ServerConfig::load_from_env().context("loading server config")?;
    tracing::info!(
        chain = %config.chain,
        port = config.api_port,
        snapshot = ?config.snapshot_path,
        "Starting smart order router"
    );

    let state = AppState::from_config(&config).context("loading pool snapshot")?;
    tracing::info!(
        block = state.snapshot().block_number(),
        v3_pools = state.snapshot().v3_pool_count(),
        v2_pairs = state.snapshot().v2_pair_count(),
        "Snapshot ready"
    );

    router_api::start_server(state, config.api_port)
        .await
        .context("serving HTTP API")?;
    Ok(())
}
