//! Chain state: blocks, gas prices, L2 fee parameters, balances, simulation

use async_trait::async_trait;
use num_bigint::BigInt;
use router_core::amounts::bigint_string;
use router_core::{Address, BlockNumber, Result, Token};
use serde::{Deserialize, Serialize};

use crate::alpha_router::SwapRoute;

#[async_trait]
pub trait BlockNumberProvider: Send + Sync {
    async fn get_block_number(&self) -> Result<BlockNumber>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPrice {
    #[serde(with = "bigint_string")]
    pub gas_price_wei: BigInt,
}

#[async_trait]
pub trait GasPriceProvider: Send + Sync {
    async fn get_gas_price(&self) -> Result<GasPrice>;
}

/// OP-stack L1 fee oracle parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimismGasData {
    #[serde(with = "bigint_string")]
    pub l1_base_fee: BigInt,
    #[serde(with = "bigint_string")]
    pub scalar: BigInt,
    #[serde(with = "bigint_string")]
    pub decimals: BigInt,
    #[serde(with = "bigint_string")]
    pub overhead: BigInt,
}

/// Arbitrum gas-info precompile parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrumGasData {
    #[serde(with = "bigint_string")]
    pub per_l2_tx_fee: BigInt,
    #[serde(with = "bigint_string")]
    pub per_l1_calldata_fee: BigInt,
    #[serde(with = "bigint_string")]
    pub per_arb_gas_total: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum L2GasData {
    Optimism(OptimismGasData),
    Arbitrum(ArbitrumGasData),
}

#[async_trait]
pub trait L2GasDataProvider: Send + Sync {
    async fn get_gas_data(&self) -> Result<L2GasData>;
}

#[async_trait]
pub trait BalanceProvider: Send + Sync {
    async fn get_balance(&self, owner: &Address, token: &Token) -> Result<BigInt>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    NotSupported,
    Failed,
    Succeeded,
    InsufficientBalance,
    NotApproved,
}

/// Executes a built swap against chain state without broadcasting it.
#[async_trait]
pub trait Simulator: Send + Sync {
    async fn simulate(&self, from: &Address, route: &SwapRoute) -> Result<SimulationStatus>;
}
