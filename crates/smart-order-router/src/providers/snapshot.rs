//! In-memory providers backed by a JSON pool snapshot
//!
//! A snapshot pins every collaborator to one block: indexed pool metadata,
//! hydrated pool state, token metadata and validation, gas prices and L2
//! fee parameters. The HTTP server and the scenario tests route over it.

use std::collections::HashMap;
use std::path::Path;

use amm::{FeeAmount, Pair, V3Pool};
use async_trait::async_trait;
use num_bigint::BigInt;
use router_core::amounts::bigint_string;
use router_core::{Address, BlockNumber, ChainId, ConfigError, ProviderError, Result, Token};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::providers::chain::{
    BalanceProvider, BlockNumberProvider, GasPrice, GasPriceProvider, L2GasData, L2GasDataProvider,
};
use crate::providers::pool::{V2PoolAccessor, V2PoolProvider, V3PoolAccessor, V3PoolProvider};
use crate::providers::subgraph::{V2SubgraphPool, V2SubgraphProvider, V3SubgraphPool, V3SubgraphProvider};
use crate::providers::token::{
    TokenAccessor, TokenListProvider, TokenProvider, TokenValidationResult, TokenValidationResults,
    TokenValidatorProvider,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V3PoolRecord {
    pub pool: V3Pool,
    pub tvl_usd: f64,
    #[serde(default)]
    pub tvl_eth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V2PairRecord {
    pub pair: Pair,
    pub reserve_usd: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub owner: Address,
    pub token: Address,
    #[serde(with = "bigint_string")]
    pub amount: BigInt,
}

/// Serialized chain state for one block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub chain: ChainId,
    pub block_number: BlockNumber,
    #[serde(default)]
    pub gas_price_wei: Option<u64>,
    /// Tokens beyond those appearing in pools
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub v3_pools: Vec<V3PoolRecord>,
    #[serde(default)]
    pub v2_pools: Vec<V2PairRecord>,
    #[serde(default)]
    pub token_validation: HashMap<Address, TokenValidationResult>,
    #[serde(default)]
    pub blocked_tokens: Vec<Address>,
    #[serde(default)]
    pub l2_gas_data: Option<L2GasData>,
    #[serde(default)]
    pub balances: Vec<BalanceRecord>,
}

impl PoolSnapshot {
    pub fn new(chain: ChainId, block_number: BlockNumber) -> Self {
        Self {
            chain,
            block_number,
            gas_price_wei: None,
            tokens: Vec::new(),
            v3_pools: Vec::new(),
            v2_pools: Vec::new(),
            token_validation: HashMap::new(),
            blocked_tokens: Vec::new(),
            l2_gas_data: None,
            balances: Vec::new(),
        }
    }
}

/// Serves every read-side collaborator from a [`PoolSnapshot`]
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    snapshot: PoolSnapshot,
    gas_price_wei: BigInt,
    tokens: HashMap<Address, Token>,
    v3_pools: HashMap<Address, V3Pool>,
    v2_pairs: HashMap<Address, Pair>,
}

impl SnapshotProvider {
    /// Index a snapshot, rejecting pools from another chain, malformed token
    /// addresses or bad pool state.
    pub fn new(snapshot: PoolSnapshot, default_gas_price_wei: u64) -> std::result::Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidSnapshot { message };
        let check_address = |token: &Token| match token.address.to_bytes() {
            Some(_) => Ok(()),
            None => Err(invalid(format!("token {} is not a 20-byte address", token.address))),
        };
        let mut tokens: HashMap<Address, Token> = HashMap::new();
        let mut v3_pools = HashMap::new();
        let mut v2_pairs = HashMap::new();

        for token in &snapshot.tokens {
            check_address(token)?;
            tokens.insert(token.address.clone(), token.clone());
        }
        for record in &snapshot.v3_pools {
            let pool = &record.pool;
            check_address(&pool.token0)?;
            check_address(&pool.token1)?;
            if pool.chain_id() != snapshot.chain || pool.token1.chain_id != snapshot.chain {
                return Err(invalid(format!("pool {} is not on {}", pool.address(), snapshot.chain)));
            }
            pool.validate()
                .map_err(|e| invalid(format!("pool {}: {}", pool.address(), e)))?;
            tokens.entry(pool.token0.address.clone()).or_insert_with(|| pool.token0.clone());
            tokens.entry(pool.token1.address.clone()).or_insert_with(|| pool.token1.clone());
            v3_pools.insert(pool.address(), pool.clone());
        }
        for record in &snapshot.v2_pools {
            let pair = &record.pair;
            check_address(&pair.token0)?;
            check_address(&pair.token1)?;
            if pair.chain_id() != snapshot.chain || pair.token1.chain_id != snapshot.chain {
                return Err(invalid(format!("pair {} is not on {}", pair.address(), snapshot.chain)));
            }
            if !pair.token0.sorts_before(&pair.token1) {
                return Err(invalid(format!("pair {} tokens are not sorted", pair.address())));
            }
            tokens.entry(pair.token0.address.clone()).or_insert_with(|| pair.token0.clone());
            tokens.entry(pair.token1.address.clone()).or_insert_with(|| pair.token1.clone());
            v2_pairs.insert(pair.address(), pair.clone());
        }

        info!(
            chain = %snapshot.chain,
            block = snapshot.block_number,
            v3_pools = v3_pools.len(),
            v2_pairs = v2_pairs.len(),
            tokens = tokens.len(),
            "Loaded pool snapshot"
        );

        Ok(Self {
            gas_price_wei: BigInt::from(snapshot.gas_price_wei.unwrap_or(default_gas_price_wei)),
            snapshot,
            tokens,
            v3_pools,
            v2_pairs,
        })
    }

    pub fn load(path: &Path, default_gas_price_wei: u64) -> std::result::Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let snapshot: PoolSnapshot = serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidSnapshot {
            message: e.to_string(),
        })?;
        Self::new(snapshot, default_gas_price_wei)
    }

    pub fn chain(&self) -> ChainId {
        self.snapshot.chain
    }

    pub fn block_number(&self) -> BlockNumber {
        self.snapshot.block_number
    }

    pub fn v3_pool_count(&self) -> usize {
        self.v3_pools.len()
    }

    pub fn v2_pair_count(&self) -> usize {
        self.v2_pairs.len()
    }

    pub fn token(&self, address: &Address) -> Option<&Token> {
        self.tokens.get(address)
    }

    pub fn v3_pool(&self, address: &Address) -> Option<&V3Pool> {
        self.v3_pools.get(address)
    }
}

#[async_trait]
impl V3SubgraphProvider for SnapshotProvider {
    async fn get_pools(
        &self,
        _token_in: Option<&Token>,
        _token_out: Option<&Token>,
        _block_number: Option<BlockNumber>,
    ) -> Result<Vec<V3SubgraphPool>> {
        Ok(self
            .snapshot
            .v3_pools
            .iter()
            .map(|r| V3SubgraphPool {
                id: r.pool.address(),
                fee_tier: r.pool.fee.pips().to_string(),
                liquidity: r.pool.liquidity.to_string(),
                token0: r.pool.token0.address.clone(),
                token1: r.pool.token1.address.clone(),
                tvl_eth: r.tvl_eth,
                tvl_usd: r.tvl_usd,
            })
            .collect())
    }
}

#[async_trait]
impl V2SubgraphProvider for SnapshotProvider {
    async fn get_pools(
        &self,
        _token_in: Option<&Token>,
        _token_out: Option<&Token>,
        _block_number: Option<BlockNumber>,
    ) -> Result<Vec<V2SubgraphPool>> {
        Ok(self
            .snapshot
            .v2_pools
            .iter()
            .map(|r| V2SubgraphPool {
                id: r.pair.address(),
                token0: r.pair.token0.address.clone(),
                token1: r.pair.token1.address.clone(),
                supply: 0.0,
                reserve: r.reserve_usd,
                reserve_usd: r.reserve_usd,
                stable: r.pair.stable,
            })
            .collect())
    }
}

#[async_trait]
impl V3PoolProvider for SnapshotProvider {
    async fn get_pools(
        &self,
        pools: &[(Token, Token, FeeAmount)],
        _block_number: Option<BlockNumber>,
    ) -> Result<V3PoolAccessor> {
        let found: Vec<V3Pool> = pools
            .iter()
            .filter_map(|(a, b, fee)| self.v3_pools.get(&V3PoolProvider::get_pool_address(self, a, b, *fee)).cloned())
            .collect();
        debug!("Resolved {} of {} requested V3 pools", found.len(), pools.len());
        Ok(V3PoolAccessor::new(found))
    }
}

#[async_trait]
impl V2PoolProvider for SnapshotProvider {
    async fn get_pools(
        &self,
        pairs: &[(Token, Token, bool)],
        _block_number: Option<BlockNumber>,
    ) -> Result<V2PoolAccessor> {
        let found: Vec<Pair> = pairs
            .iter()
            .filter_map(|(a, b, stable)| self.v2_pairs.get(&V2PoolProvider::get_pool_address(self, a, b, *stable)).cloned())
            .collect();
        debug!("Resolved {} of {} requested V2 pairs", found.len(), pairs.len());
        Ok(V2PoolAccessor::new(found))
    }
}

#[async_trait]
impl TokenProvider for SnapshotProvider {
    async fn get_tokens(&self, addresses: &[Address], _block_number: Option<BlockNumber>) -> Result<TokenAccessor> {
        Ok(TokenAccessor::new(
            addresses
                .iter()
                .filter_map(|a| self.tokens.get(a).cloned())
                .collect(),
        ))
    }
}

/// Blocklist view: a token is "listed" when it is blocked.
#[async_trait]
impl TokenListProvider for SnapshotProvider {
    async fn get_token_by_address(&self, address: &Address) -> Result<Option<Token>> {
        if !self.snapshot.blocked_tokens.contains(address) {
            return Ok(None);
        }
        Ok(Some(self.tokens.get(address).cloned().unwrap_or_else(|| {
            Token::new(self.snapshot.chain, address.clone(), 18, None, None)
        })))
    }
}

#[async_trait]
impl TokenValidatorProvider for SnapshotProvider {
    async fn validate_tokens(&self, tokens: &[Token]) -> Result<TokenValidationResults> {
        Ok(TokenValidationResults::new(
            tokens
                .iter()
                .filter_map(|t| {
                    self.snapshot
                        .token_validation
                        .get(&t.address)
                        .map(|r| (t.address.clone(), *r))
                })
                .collect(),
        ))
    }
}

#[async_trait]
impl BlockNumberProvider for SnapshotProvider {
    async fn get_block_number(&self) -> Result<BlockNumber> {
        Ok(self.snapshot.block_number)
    }
}

#[async_trait]
impl GasPriceProvider for SnapshotProvider {
    async fn get_gas_price(&self) -> Result<GasPrice> {
        Ok(GasPrice {
            gas_price_wei: self.gas_price_wei.clone(),
        })
    }
}

#[async_trait]
impl L2GasDataProvider for SnapshotProvider {
    async fn get_gas_data(&self) -> Result<L2GasData> {
        self.snapshot.l2_gas_data.clone().ok_or_else(|| {
            ProviderError::Upstream {
                message: format!("snapshot for {} carries no L2 gas data", self.snapshot.chain),
            }
            .into()
        })
    }
}

#[async_trait]
impl BalanceProvider for SnapshotProvider {
    async fn get_balance(&self, owner: &Address, token: &Token) -> Result<BigInt> {
        Ok(self
            .snapshot
            .balances
            .iter()
            .find(|b| &b.owner == owner && b.token == token.address)
            .map(|b| b.amount.clone())
            .unwrap_or_default())
    }
}
