//! Error types for the router

use thiserror::Error;

/// Core errors that can occur while routing
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures of the data collaborators (pools, quotes, blocks, gas prices)
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider unreachable: {name}")]
    Unreachable { name: String },

    #[error("Provider timed out: {message}")]
    Timeout { message: String },

    #[error("Quote chunks returned conflicting block numbers: {blocks:?}")]
    BlockConflict { blocks: Vec<u64> },

    #[error("Quote success rate {rate:.2} below minimum {minimum:.2}")]
    SuccessRate { rate: f64, minimum: f64 },

    #[error("Quote call ran out of gas: {message}")]
    OutOfGas { message: String },

    #[error("Block header unavailable: {message}")]
    BlockHeader { message: String },

    #[error("Upstream failure: {message}")]
    Upstream { message: String },
}

/// Precondition and configuration failures raised by the routing core
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("Can't compute L1 gas fees: no gas model provided for chain {chain_id}")]
    L1GasModelMissing { chain_id: u64 },

    #[error("Can't compute L1 gas fees: route set on chain {chain_id} is not purely V3")]
    L1FeeRequiresV3 { chain_id: u64 },

    #[error("Could not find a USD token for computing gas costs on {chain_id}")]
    NoUsdGasToken { chain_id: u64 },

    #[error("Could not find a USD/native pool for computing gas costs on {chain_id}")]
    NoUsdPool { chain_id: u64 },

    #[error("Simulator not initialized")]
    SimulatorNotInitialized,

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Unsupported chain id {chain_id}")]
    UnsupportedChain { chain_id: u64 },

    #[error("Invalid route: {message}")]
    InvalidRoute { message: String },

    #[error("Pool math failed: {message}")]
    PoolMath { message: String },
}

/// Configuration loading and validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid routing config: {message}")]
    InvalidRoutingConfig { message: String },

    #[error("Failed to read {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("Invalid pool snapshot: {message}")]
    InvalidSnapshot { message: String },
}

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Provider(e) => e.error_code(),
            Self::Routing(e) => e.error_code(),
            Self::Config(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Provider(_) => 503,
            Self::Routing(e) => e.status_code(),
            Self::Config(_) | Self::Serialization(_) => 500,
        }
    }
}

impl ProviderError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "provider_unreachable",
            Self::Timeout { .. } => "provider_timeout",
            Self::BlockConflict { .. } => "block_conflict",
            Self::SuccessRate { .. } => "success_rate",
            Self::OutOfGas { .. } => "out_of_gas",
            Self::BlockHeader { .. } => "block_header",
            Self::Upstream { .. } => "upstream_failure",
        }
    }

    /// Errors the batched quoter retries on
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Unreachable { .. })
    }
}

impl RoutingError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::L1GasModelMissing { .. } | Self::L1FeeRequiresV3 { .. } => "l1_fee_unavailable",
            Self::NoUsdGasToken { .. } => "no_usd_gas_token",
            Self::NoUsdPool { .. } => "no_usd_pool",
            Self::SimulatorNotInitialized => "simulator_not_initialized",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::UnsupportedChain { .. } => "unsupported_chain",
            Self::InvalidRoute { .. } => "invalid_route",
            Self::PoolMath { .. } => "pool_math",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. } | Self::UnsupportedChain { .. } => 400,
            Self::InvalidRoute { .. } | Self::PoolMath { .. } => 422,
            _ => 500,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
