//! Indexed pool metadata used to rank candidate pools

use async_trait::async_trait;
use router_core::{Address, BlockNumber, Result, Token};
use serde::{Deserialize, Serialize};

/// Common view over indexed pools of either protocol
pub trait SubgraphPool: Clone + Send + Sync {
    fn id(&self) -> &Address;
    fn token0(&self) -> &Address;
    fn token1(&self) -> &Address;
    /// Liquidity proxy the candidate ranking sorts by
    fn liquidity_usd(&self) -> f64;

    fn involves(&self, token: &Address) -> bool {
        self.token0() == token || self.token1() == token
    }

    fn connects(&self, a: &Address, b: &Address) -> bool {
        (self.token0() == a && self.token1() == b) || (self.token0() == b && self.token1() == a)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V3SubgraphPool {
    pub id: Address,
    /// Fee tier in pips as reported by the indexer
    pub fee_tier: String,
    pub liquidity: String,
    pub token0: Address,
    pub token1: Address,
    pub tvl_eth: f64,
    pub tvl_usd: f64,
}

impl SubgraphPool for V3SubgraphPool {
    fn id(&self) -> &Address {
        &self.id
    }
    fn token0(&self) -> &Address {
        &self.token0
    }
    fn token1(&self) -> &Address {
        &self.token1
    }
    fn liquidity_usd(&self) -> f64 {
        self.tvl_usd
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V2SubgraphPool {
    pub id: Address,
    pub token0: Address,
    pub token1: Address,
    pub supply: f64,
    pub reserve: f64,
    pub reserve_usd: f64,
    #[serde(default)]
    pub stable: bool,
}

impl SubgraphPool for V2SubgraphPool {
    fn id(&self) -> &Address {
        &self.id
    }
    fn token0(&self) -> &Address {
        &self.token0
    }
    fn token1(&self) -> &Address {
        &self.token1
    }
    fn liquidity_usd(&self) -> f64 {
        self.reserve_usd
    }
}

/// Indexed concentrated-liquidity pools; results must be stable per block.
#[async_trait]
pub trait V3SubgraphProvider: Send + Sync {
    async fn get_pools(
        &self,
        token_in: Option<&Token>,
        token_out: Option<&Token>,
        block_number: Option<BlockNumber>,
    ) -> Result<Vec<V3SubgraphPool>>;
}

/// Indexed constant-product pairs; results must be stable per block.
#[async_trait]
pub trait V2SubgraphProvider: Send + Sync {
    async fn get_pools(
        &self,
        token_in: Option<&Token>,
        token_out: Option<&Token>,
        block_number: Option<BlockNumber>,
    ) -> Result<Vec<V2SubgraphPool>>;
}
