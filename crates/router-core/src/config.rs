//! Configuration types for the router

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::amounts::Fraction;
use crate::chains::ChainId;
use crate::errors::ConfigError;
use crate::types::{constants, Address, BlockNumber, Protocol};

/// Candidate pool selection caps for one protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolPoolSelection {
    /// Pools taken from the overall TVL ranking
    pub top_n: usize,
    /// Pools pairing tokenIn directly with tokenOut
    pub top_n_direct_swaps: usize,
    /// Pools containing tokenIn, and separately tokenOut
    pub top_n_token_in_out: usize,
    /// Pools extending each first-hop token
    pub top_n_second_hop: usize,
    /// Per-token override of `top_n_second_hop`
    #[serde(default)]
    pub top_n_second_hop_for_token_address: HashMap<Address, usize>,
    /// Tokens never used as second-hop pivots
    #[serde(default)]
    pub tokens_to_avoid_on_second_hops: Vec<Address>,
    /// Pools pairing tokenIn/tokenOut with each base token
    pub top_n_with_each_base_token: usize,
    /// Overall cap for base token pools
    pub top_n_with_base_token: usize,
}

impl ProtocolPoolSelection {
    fn with_caps(caps: [usize; 6]) -> Self {
        Self {
            top_n: caps[0],
            top_n_direct_swaps: caps[1],
            top_n_token_in_out: caps[2],
            top_n_second_hop: caps[3],
            top_n_second_hop_for_token_address: HashMap::new(),
            tokens_to_avoid_on_second_hops: Vec::new(),
            top_n_with_each_base_token: caps[4],
            top_n_with_base_token: caps[5],
        }
    }

    /// Second-hop cap for a specific pivot token.
    pub fn second_hop_cap(&self, token: &Address) -> usize {
        self.top_n_second_hop_for_token_address
            .get(token)
            .copied()
            .unwrap_or(self.top_n_second_hop)
    }
}

/// Effective routing configuration for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Pin the computation to a block instead of fetching the latest
    #[serde(default)]
    pub block_number: Option<BlockNumber>,
    /// Protocols to query, empty means all supported
    #[serde(default)]
    pub protocols: Vec<Protocol>,
    pub v2_pool_selection: ProtocolPoolSelection,
    pub v3_pool_selection: ProtocolPoolSelection,
    pub max_swaps_per_path: usize,
    pub min_splits: usize,
    pub max_splits: usize,
    /// Granularity of amount slicing in percent, must divide 100
    pub distribution_percent: u32,
    /// Test-only: every split must use a different protocol
    #[serde(default)]
    pub force_cross_protocol: bool,
    /// Test-only: only mixed routes are considered
    #[serde(default)]
    pub force_mixed_routes: bool,
    /// Pool addresses never used as candidates
    #[serde(default)]
    pub blocked_pools: Vec<Address>,
    /// The amount currency is the native asset and gets wrapped first
    #[serde(default)]
    pub native_in: bool,
    /// The quote currency is the native asset and gets unwrapped last
    #[serde(default)]
    pub native_out: bool,
}

impl RoutingConfig {
    /// Per-chain defaults.
    pub fn for_chain(chain: ChainId) -> Self {
        let v2 = ProtocolPoolSelection::with_caps([3, 1, 5, 2, 2, 6]);
        match chain {
            ChainId::Optimism | ChainId::Arbitrum | ChainId::Base => Self {
                block_number: None,
                protocols: Vec::new(),
                v2_pool_selection: v2,
                v3_pool_selection: ProtocolPoolSelection::with_caps([2, 2, 2, 1, 3, 3]),
                max_swaps_per_path: 3,
                min_splits: 1,
                max_splits: 3,
                distribution_percent: 25,
                force_cross_protocol: false,
                force_mixed_routes: false,
                blocked_pools: Vec::new(),
                native_in: false,
                native_out: false,
            },
            _ => Self {
                block_number: None,
                protocols: Vec::new(),
                v2_pool_selection: v2,
                v3_pool_selection: ProtocolPoolSelection::with_caps([2, 2, 3, 1, 3, 5]),
                max_swaps_per_path: 3,
                min_splits: 1,
                max_splits: 7,
                distribution_percent: 5,
                force_cross_protocol: false,
                force_mixed_routes: false,
                blocked_pools: Vec::new(),
                native_in: false,
                native_out: false,
            },
        }
    }

    /// Apply caller overrides field by field.
    pub fn merge(mut self, overrides: RoutingConfigOverrides) -> Self {
        if let Some(v) = overrides.block_number {
            self.block_number = Some(v);
        }
        if let Some(v) = overrides.protocols {
            self.protocols = v;
        }
        if let Some(v) = overrides.v2_pool_selection {
            self.v2_pool_selection = v;
        }
        if let Some(v) = overrides.v3_pool_selection {
            self.v3_pool_selection = v;
        }
        if let Some(v) = overrides.max_swaps_per_path {
            self.max_swaps_per_path = v;
        }
        if let Some(v) = overrides.min_splits {
            self.min_splits = v;
        }
        if let Some(v) = overrides.max_splits {
            self.max_splits = v;
        }
        if let Some(v) = overrides.distribution_percent {
            self.distribution_percent = v;
        }
        if let Some(v) = overrides.force_cross_protocol {
            self.force_cross_protocol = v;
        }
        if let Some(v) = overrides.force_mixed_routes {
            self.force_mixed_routes = v;
        }
        if let Some(v) = overrides.blocked_pools {
            self.blocked_pools = v;
        }
        if let Some(v) = overrides.native_in {
            self.native_in = v;
        }
        if let Some(v) = overrides.native_out {
            self.native_out = v;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::InvalidRoutingConfig { message });
        if self.distribution_percent == 0 || self.distribution_percent > 100 {
            return invalid(format!(
                "distribution_percent must be in 1..=100, got {}",
                self.distribution_percent
            ));
        }
        if 100 % self.distribution_percent != 0 {
            return invalid(format!(
                "distribution_percent {} does not divide 100",
                self.distribution_percent
            ));
        }
        if self.max_swaps_per_path == 0 {
            return invalid("max_swaps_per_path must be at least 1".to_string());
        }
        if self.max_splits == 0 || self.min_splits > self.max_splits {
            return invalid(format!(
                "split bounds [{}, {}] are empty",
                self.min_splits, self.max_splits
            ));
        }
        Ok(())
    }
}

/// Caller overrides; every field replaces its default when present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfigOverrides {
    pub block_number: Option<BlockNumber>,
    pub protocols: Option<Vec<Protocol>>,
    pub v2_pool_selection: Option<ProtocolPoolSelection>,
    pub v3_pool_selection: Option<ProtocolPoolSelection>,
    pub max_swaps_per_path: Option<usize>,
    pub min_splits: Option<usize>,
    pub max_splits: Option<usize>,
    pub distribution_percent: Option<u32>,
    pub force_cross_protocol: Option<bool>,
    pub force_mixed_routes: Option<bool>,
    pub blocked_pools: Option<Vec<Address>>,
    pub native_in: Option<bool>,
    pub native_out: Option<bool>,
}

/// Convergence settings for route-to-ratio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteToRatioConfig {
    /// Accept when `|achieved / optimal - 1|` is below this
    pub ratio_error_tolerance: Fraction,
    pub max_iterations: usize,
}

impl Default for RouteToRatioConfig {
    fn default() -> Self {
        Self {
            ratio_error_tolerance: Fraction::new(
                constants::DEFAULT_RATIO_TOLERANCE_BIPS,
                constants::BIPS_BASE,
            ),
            max_iterations: constants::DEFAULT_RATIO_MAX_ITERATIONS,
        }
    }
}

/// Backoff settings for retrying failed quote chunks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRetryOptions {
    pub retries: usize,
    pub min_timeout_ms: u64,
    pub max_timeout_ms: u64,
}

/// Batching limits for the on-chain quoter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchParams {
    pub multicall_chunk: usize,
    pub gas_limit_per_call: u64,
    pub quote_min_success_rate: f64,
}

/// Replacement batch parameters applied after a class of failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureOverrides {
    pub gas_limit_override: u64,
    pub multicall_chunk: usize,
}

/// Everything the batched quoter needs for one chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteProviderConfig {
    pub retry: QuoteRetryOptions,
    pub batch: BatchParams,
    pub gas_error_override: FailureOverrides,
    pub success_rate_override: FailureOverrides,
}

impl QuoteProviderConfig {
    pub fn for_chain(chain: ChainId) -> Self {
        match chain {
            ChainId::Arbitrum => Self {
                retry: QuoteRetryOptions {
                    retries: 2,
                    min_timeout_ms: 100,
                    max_timeout_ms: 1000,
                },
                batch: BatchParams {
                    multicall_chunk: 10,
                    gas_limit_per_call: 12_000_000,
                    quote_min_success_rate: 0.1,
                },
                gas_error_override: FailureOverrides {
                    gas_limit_override: 30_000_000,
                    multicall_chunk: 6,
                },
                success_rate_override: FailureOverrides {
                    gas_limit_override: 30_000_000,
                    multicall_chunk: 6,
                },
            },
            ChainId::Optimism | ChainId::Base => Self {
                retry: QuoteRetryOptions {
                    retries: 2,
                    min_timeout_ms: 100,
                    max_timeout_ms: 1000,
                },
                batch: BatchParams {
                    multicall_chunk: 110,
                    gas_limit_per_call: 1_200_000,
                    quote_min_success_rate: 0.1,
                },
                gas_error_override: FailureOverrides {
                    gas_limit_override: 3_000_000,
                    multicall_chunk: 45,
                },
                success_rate_override: FailureOverrides {
                    gas_limit_override: 3_000_000,
                    multicall_chunk: 45,
                },
            },
            _ => Self::default(),
        }
    }
}

impl Default for QuoteProviderConfig {
    fn default() -> Self {
        Self {
            retry: QuoteRetryOptions {
                retries: 2,
                min_timeout_ms: 25,
                max_timeout_ms: 250,
            },
            batch: BatchParams {
                multicall_chunk: 150,
                gas_limit_per_call: 1_000_000,
                quote_min_success_rate: 0.2,
            },
            gas_error_override: FailureOverrides {
                gas_limit_override: 1_500_000,
                multicall_chunk: 100,
            },
            success_rate_override: FailureOverrides {
                gas_limit_override: 1_300_000,
                multicall_chunk: 110,
            },
        }
    }
}

/// Server binary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Chain the loaded snapshot belongs to
    pub chain: ChainId,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// JSON pool snapshot to route over
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Gas price in wei used when the snapshot carries none
    #[serde(default = "default_gas_price_wei")]
    pub gas_price_wei: u64,
}

fn default_api_port() -> u16 {
    19090
}

fn default_gas_price_wei() -> u64 {
    20_000_000_000
}

/// Environment variable naming the server config file
pub const CONFIG_ENV_VAR: &str = "SOR_CONFIG";

impl ServerConfig {
    /// Load from the file named by `SOR_CONFIG`, or defaults when unset.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::load(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Unreadable {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            chain: ChainId::Mainnet,
            api_port: default_api_port(),
            snapshot_path: None,
            gas_price_wei: default_gas_price_wei(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_defaults() {
        let config = RoutingConfig::for_chain(ChainId::Mainnet);
        assert_eq!(config.v2_pool_selection.top_n, 3);
        assert_eq!(config.v2_pool_selection.top_n_with_base_token, 6);
        assert_eq!(config.v3_pool_selection.top_n_token_in_out, 3);
        assert_eq!(config.max_splits, 7);
        assert_eq!(config.distribution_percent, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_l1_chain_defaults() {
        let config = RoutingConfig::for_chain(ChainId::Arbitrum);
        assert_eq!(config.distribution_percent, 25);
        assert_eq!(config.max_splits, 3);
        assert_eq!(config.v3_pool_selection.top_n_with_base_token, 3);
    }

    #[test]
    fn test_merge_overrides_field_by_field() {
        let overrides = RoutingConfigOverrides {
            max_splits: Some(2),
            protocols: Some(vec![Protocol::V3]),
            ..Default::default()
        };
        let config = RoutingConfig::for_chain(ChainId::Mainnet).merge(overrides);
        assert_eq!(config.max_splits, 2);
        assert_eq!(config.protocols, vec![Protocol::V3]);
        // untouched fields keep their defaults
        assert_eq!(config.distribution_percent, 5);
        assert_eq!(config.min_splits, 1);
    }

    #[test]
    fn test_validate_rejects_bad_distribution() {
        let mut config = RoutingConfig::for_chain(ChainId::Mainnet);
        config.distribution_percent = 7;
        assert!(config.validate().is_err());
        config.distribution_percent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_splits() {
        let mut config = RoutingConfig::for_chain(ChainId::Mainnet);
        config.min_splits = 4;
        config.max_splits = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_second_hop_cap_override() {
        let mut sel = RoutingConfig::for_chain(ChainId::Mainnet).v3_pool_selection;
        let token = Address::new("0x01");
        sel.top_n_second_hop_for_token_address.insert(token.clone(), 4);
        assert_eq!(sel.second_hop_cap(&token), 4);
        assert_eq!(sel.second_hop_cap(&Address::new("0x02")), 1);
    }

    #[test]
    fn test_overrides_deserialize_partial() {
        let overrides: RoutingConfigOverrides =
            serde_json::from_str(r#"{"min_splits": 2}"#).unwrap();
        assert_eq!(overrides.min_splits, Some(2));
        assert!(overrides.max_splits.is_none());
    }

    #[test]
    fn test_server_config_defaults() {
        let config: ServerConfig = serde_json::from_str(r#"{"chain": 1}"#).unwrap();
        assert_eq!(config.chain, ChainId::Mainnet);
        assert_eq!(config.api_port, 19090);
        assert!(config.snapshot_path.is_none());
    }
}
