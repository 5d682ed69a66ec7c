//! Live pool state lookups

use std::collections::HashMap;

use amm::{compute_pair_address, compute_pool_address, FeeAmount, Pair, V3Pool};
use async_trait::async_trait;
use router_core::{Address, BlockNumber, Result, Token};

/// Hydrated concentrated-liquidity pools keyed by address
#[derive(Debug, Clone, Default)]
pub struct V3PoolAccessor {
    pools: HashMap<Address, V3Pool>,
}

impl V3PoolAccessor {
    pub fn new(pools: Vec<V3Pool>) -> Self {
        Self {
            pools: pools.into_iter().map(|p| (p.address(), p)).collect(),
        }
    }

    pub fn get_pool(&self, token_a: &Token, token_b: &Token, fee: FeeAmount) -> Option<&V3Pool> {
        self.pools.get(&compute_pool_address(token_a, token_b, fee))
    }

    /// All pools, ordered by address for deterministic downstream iteration.
    pub fn get_all_pools(&self) -> Vec<V3Pool> {
        let mut pools: Vec<V3Pool> = self.pools.values().cloned().collect();
        pools.sort_by_key(|p| p.address());
        pools
    }
}

/// Hydrated constant-product pairs keyed by address
#[derive(Debug, Clone, Default)]
pub struct V2PoolAccessor {
    pairs: HashMap<Address, Pair>,
}

impl V2PoolAccessor {
    pub fn new(pairs: Vec<Pair>) -> Self {
        Self {
            pairs: pairs.into_iter().map(|p| (p.address(), p)).collect(),
        }
    }

    pub fn get_pool(&self, token_a: &Token, token_b: &Token, stable: bool) -> Option<&Pair> {
        self.pairs.get(&compute_pair_address(token_a, token_b, stable))
    }

    pub fn get_all_pools(&self) -> Vec<Pair> {
        let mut pairs: Vec<Pair> = self.pairs.values().cloned().collect();
        pairs.sort_by_key(|p| p.address());
        pairs
    }
}

/// Resolves on-chain state for concentrated-liquidity pools.
///
/// Requested pools that do not exist are silently absent from the accessor.
#[async_trait]
pub trait V3PoolProvider: Send + Sync {
    async fn get_pools(
        &self,
        pools: &[(Token, Token, FeeAmount)],
        block_number: Option<BlockNumber>,
    ) -> Result<V3PoolAccessor>;

    fn get_pool_address(&self, token_a: &Token, token_b: &Token, fee: FeeAmount) -> Address {
        compute_pool_address(token_a, token_b, fee)
    }
}

/// Resolves on-chain state for constant-product pairs.
#[async_trait]
pub trait V2PoolProvider: Send + Sync {
    async fn get_pools(
        &self,
        pairs: &[(Token, Token, bool)],
        block_number: Option<BlockNumber>,
    ) -> Result<V2PoolAccessor>;

    fn get_pool_address(&self, token_a: &Token, token_b: &Token, stable: bool) -> Address {
        compute_pair_address(token_a, token_b, stable)
    }
}
