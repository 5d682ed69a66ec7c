//! Application state shared across API handlers

use std::path::Path;
use std::sync::Arc;

use router_core::{ChainId, ConfigError, ServerConfig};
use smart_order_router::{AlphaRouter, AlphaRouterParams, PoolSnapshot, SnapshotProvider};
use thiserror::Error;

/// Errors that can occur while building the API state
#[derive(Debug, Error)]
pub enum StateError {
    /// The pool snapshot could not be read or failed validation
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] ConfigError),

    /// The snapshot belongs to a different chain than configured
    #[error("Snapshot is for {found}, server is configured for {expected}")]
    ChainMismatch { expected: ChainId, found: ChainId },
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    snapshot: Arc<SnapshotProvider>,
    router: AlphaRouter,
}

impl AppState {
    /// Route over an already loaded snapshot
    pub fn new(snapshot: Arc<SnapshotProvider>) -> Self {
        let router = AlphaRouter::new(AlphaRouterParams::from_snapshot(snapshot.clone()));
        Self {
            inner: Arc::new(AppStateInner { snapshot, router }),
        }
    }

    /// Load the configured snapshot, or start empty when none is configured.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StateError> {
        let snapshot = match &config.snapshot_path {
            Some(path) => load_snapshot(path, config)?,
            None => {
                tracing::warn!("No snapshot configured, serving an empty pool set");
                SnapshotProvider::new(PoolSnapshot::new(config.chain, 0), config.gas_price_wei)?
            }
        };
        Ok(Self::new(Arc::new(snapshot)))
    }

    pub fn snapshot(&self) -> &SnapshotProvider {
        &self.inner.snapshot
    }

    pub fn router(&self) -> &AlphaRouter {
        &self.inner.router
    }
}

fn load_snapshot(path: &Path, config: &ServerConfig) -> Result<SnapshotProvider, StateError> {
    let snapshot = SnapshotProvider::load(path, config.gas_price_wei)?;
    if snapshot.chain() != config.chain {
        return Err(StateError::ChainMismatch {
            expected: config.chain,
            found: snapshot.chain(),
        });
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_without_snapshot() {
        let config = ServerConfig {
            chain: ChainId::Optimism,
            ..Default::default()
        };
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.snapshot().chain(), ChainId::Optimism);
        assert_eq!(state.snapshot().v3_pool_count(), 0);
        assert_eq!(state.router().chain(), ChainId::Optimism);
    }

    #[test]
    fn test_missing_snapshot_file() {
        let config = ServerConfig {
            snapshot_path: Some("/nonexistent/snapshot.json".into()),
            ..Default::default()
        };
        assert!(matches!(
            AppState::from_config(&config),
            Err(StateError::Snapshot(ConfigError::Unreadable { .. }))
        ));
    }
}
