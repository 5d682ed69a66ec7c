//! Candidate pool selection
//!
//! Narrows the indexed pool universe down to a few dozen pools per protocol
//! using TVL-ranked heuristics. Each category excludes pools picked by an
//! earlier one, so category order encodes priority. The per-category
//! breakdown is kept for logging only.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use amm::{FeeAmount, Pair, Pool, V3Pool};
use router_core::{
    base_tokens, prices_gas_via_wrapped_native, wrapped_native, Address, BlockNumber, ChainId,
    Protocol, ProtocolPoolSelection, Result, RoutingConfig, Token, TradeType,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::providers::{
    SubgraphPool, TokenAccessor, TokenListProvider, TokenProvider, TokenValidatorProvider,
    V2PoolAccessor, V2PoolProvider, V2SubgraphPool, V2SubgraphProvider, V3PoolAccessor,
    V3PoolProvider, V3SubgraphPool, V3SubgraphProvider,
};

/// TVL (ETH and USD) and raw liquidity given to a synthesized direct V3 pool
const SYNTHETIC_V3_TVL: f64 = 10_000.0;
const SYNTHETIC_V3_LIQUIDITY: &str = "10000";

/// Supply and reserve figures given to a synthesized direct V2 pair
const SYNTHETIC_V2_RESERVE: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// Selection breakdown
// ---------------------------------------------------------------------------

/// A selected pool, rendered for logs as `SYM0/SYM1/fee`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolSummary {
    pub id: Address,
    pub label: String,
}

/// Pools picked by each heuristic, in priority order
#[derive(Debug, Clone, PartialEq)]
pub struct Selections<P> {
    pub top_by_base_with_token_in: Vec<P>,
    pub top_by_base_with_token_out: Vec<P>,
    pub top_by_direct_swap_pool: Vec<P>,
    pub top_by_eth_quote_token_pool: Vec<P>,
    pub top_by_tvl: Vec<P>,
    pub top_by_tvl_using_token_in: Vec<P>,
    pub top_by_tvl_using_token_out: Vec<P>,
    pub top_by_tvl_using_token_in_second_hops: Vec<P>,
    pub top_by_tvl_using_token_out_second_hops: Vec<P>,
}

impl<P> Default for Selections<P> {
    fn default() -> Self {
        Selections {
            top_by_base_with_token_in: Vec::new(),
            top_by_base_with_token_out: Vec::new(),
            top_by_direct_swap_pool: Vec::new(),
            top_by_eth_quote_token_pool: Vec::new(),
            top_by_tvl: Vec::new(),
            top_by_tvl_using_token_in: Vec::new(),
            top_by_tvl_using_token_out: Vec::new(),
            top_by_tvl_using_token_in_second_hops: Vec::new(),
            top_by_tvl_using_token_out_second_hops: Vec::new(),
        }
    }
}

impl<P> Selections<P> {
    /// Categories with their log names, in priority order.
    pub fn categories(&self) -> [(&'static str, &Vec<P>); 9] {
        [
            ("top_by_base_with_token_in", &self.top_by_base_with_token_in),
            ("top_by_base_with_token_out", &self.top_by_base_with_token_out),
            ("top_by_direct_swap_pool", &self.top_by_direct_swap_pool),
            ("top_by_eth_quote_token_pool", &self.top_by_eth_quote_token_pool),
            ("top_by_tvl", &self.top_by_tvl),
            ("top_by_tvl_using_token_in", &self.top_by_tvl_using_token_in),
            ("top_by_tvl_using_token_out", &self.top_by_tvl_using_token_out),
            ("top_by_tvl_using_token_in_second_hops", &self.top_by_tvl_using_token_in_second_hops),
            ("top_by_tvl_using_token_out_second_hops", &self.top_by_tvl_using_token_out_second_hops),
        ]
    }

    fn map<Q>(&self, f: impl Fn(&P) -> Q) -> Selections<Q> {
        let m = |v: &Vec<P>| v.iter().map(&f).collect();
        Selections {
            top_by_base_with_token_in: m(&self.top_by_base_with_token_in),
            top_by_base_with_token_out: m(&self.top_by_base_with_token_out),
            top_by_direct_swap_pool: m(&self.top_by_direct_swap_pool),
            top_by_eth_quote_token_pool: m(&self.top_by_eth_quote_token_pool),
            top_by_tvl: m(&self.top_by_tvl),
            top_by_tvl_using_token_in: m(&self.top_by_tvl_using_token_in),
            top_by_tvl_using_token_out: m(&self.top_by_tvl_using_token_out),
            top_by_tvl_using_token_in_second_hops: m(&self.top_by_tvl_using_token_in_second_hops),
            top_by_tvl_using_token_out_second_hops: m(&self.top_by_tvl_using_token_out_second_hops),
        }
    }
}

impl<P: SubgraphPool> Selections<P> {
    /// Deduplicated union of every category, first occurrence wins.
    pub fn union(&self) -> Vec<P> {
        let mut seen = HashSet::new();
        self.categories()
            .into_iter()
            .flat_map(|(_, pools)| pools.iter())
            .filter(|p| seen.insert(p.id().clone()))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePoolsBySelectionCriteria {
    pub protocol: Protocol,
    pub selections: Selections<PoolSummary>,
}

impl CandidatePoolsBySelectionCriteria {
    fn log(&self) {
        for (name, pools) in self.selections.categories() {
            let labels: Vec<&str> = pools.iter().map(|p| p.label.as_str()).collect();
            info!(protocol = %self.protocol, category = name, pools = ?labels, "Candidate pools");
        }
    }
}

// ---------------------------------------------------------------------------
// Heuristics
// ---------------------------------------------------------------------------

/// Inputs shared by every protocol's selection
pub struct CandidatePoolsParams<'a> {
    pub token_in: &'a Token,
    pub token_out: &'a Token,
    pub trade_type: TradeType,
    pub chain: ChainId,
    pub config: &'a RoutingConfig,
    pub block_number: Option<BlockNumber>,
    pub token_provider: &'a dyn TokenProvider,
    pub blocked_token_list_provider: Option<&'a dyn TokenListProvider>,
}

fn top_by_tvl<P: SubgraphPool>(pools: impl Iterator<Item = P>, n: usize) -> Vec<P> {
    let mut pools: Vec<P> = pools.collect();
    pools.sort_by(|a, b| b.liquidity_usd().total_cmp(&a.liquidity_usd()));
    pools.truncate(n);
    pools
}

/// Run the selection heuristics over `sorted` (descending liquidity).
///
/// `synthesize_direct` is called when the index has no direct pool, so new
/// pools are routable before the indexer catches up.
fn select_pools<P: SubgraphPool>(
    sorted: &[P],
    token_in: &Address,
    token_out: &Address,
    base_tokens: &[Address],
    eth_quote_pair: Option<(&Address, &Address)>,
    caps: &ProtocolPoolSelection,
    synthesize_direct: impl FnOnce() -> Vec<P>,
) -> Selections<P> {
    let mut seen: HashSet<Address> = HashSet::new();
    let mut selections = Selections::default();

    let base_with = |token: &Address| -> Vec<P> {
        let per_base = base_tokens.iter().flat_map(|base| {
            top_by_tvl(
                sorted.iter().filter(|p| p.connects(base, token)).cloned(),
                caps.top_n_with_each_base_token,
            )
        });
        top_by_tvl(per_base, caps.top_n_with_base_token)
    };
    selections.top_by_base_with_token_in = base_with(token_in);
    selections.top_by_base_with_token_out = base_with(token_out);
    for p in selections
        .top_by_base_with_token_in
        .iter()
        .chain(&selections.top_by_base_with_token_out)
    {
        seen.insert(p.id().clone());
    }

    let mut direct: Vec<P> = sorted
        .iter()
        .filter(|p| !seen.contains(p.id()) && p.connects(token_in, token_out))
        .take(caps.top_n_direct_swaps)
        .cloned()
        .collect();
    let already_selected = sorted
        .iter()
        .any(|p| seen.contains(p.id()) && p.connects(token_in, token_out));
    if direct.is_empty() && !already_selected && caps.top_n_direct_swaps > 0 {
        direct = synthesize_direct();
        debug!("No indexed direct pool, synthesized {} candidates", direct.len());
    }
    seen.extend(direct.iter().map(|p| p.id().clone()));
    selections.top_by_direct_swap_pool = direct;

    if let Some((native, quote_side)) = eth_quote_pair {
        selections.top_by_eth_quote_token_pool = sorted
            .iter()
            .filter(|p| p.connects(native, quote_side))
            .take(1)
            .cloned()
            .collect();
        seen.extend(
            selections
                .top_by_eth_quote_token_pool
                .iter()
                .map(|p| p.id().clone()),
        );
    }

    selections.top_by_tvl = sorted
        .iter()
        .filter(|p| !seen.contains(p.id()))
        .take(caps.top_n)
        .cloned()
        .collect();
    seen.extend(selections.top_by_tvl.iter().map(|p| p.id().clone()));

    selections.top_by_tvl_using_token_in = sorted
        .iter()
        .filter(|p| !seen.contains(p.id()) && p.involves(token_in))
        .take(caps.top_n_token_in_out)
        .cloned()
        .collect();
    seen.extend(selections.top_by_tvl_using_token_in.iter().map(|p| p.id().clone()));

    selections.top_by_tvl_using_token_out = sorted
        .iter()
        .filter(|p| !seen.contains(p.id()) && p.involves(token_out))
        .take(caps.top_n_token_in_out)
        .cloned()
        .collect();
    seen.extend(selections.top_by_tvl_using_token_out.iter().map(|p| p.id().clone()));

    let second_hops = |first_hops: &[P], from: &Address, seen: &HashSet<Address>| -> Vec<P> {
        let mut picked: Vec<P> = Vec::new();
        let mut picked_ids: HashSet<Address> = HashSet::new();
        for pool in first_hops {
            let hop = if pool.token0() == from { pool.token1() } else { pool.token0() };
            if caps.tokens_to_avoid_on_second_hops.contains(hop) {
                continue;
            }
            let extension = sorted
                .iter()
                .filter(|p| !seen.contains(p.id()) && p.involves(hop))
                .take(caps.second_hop_cap(hop));
            for p in extension {
                if picked_ids.insert(p.id().clone()) {
                    picked.push(p.clone());
                }
            }
        }
        picked
    };
    selections.top_by_tvl_using_token_in_second_hops =
        second_hops(&selections.top_by_tvl_using_token_in, token_in, &seen);
    seen.extend(
        selections
            .top_by_tvl_using_token_in_second_hops
            .iter()
            .map(|p| p.id().clone()),
    );
    selections.top_by_tvl_using_token_out_second_hops =
        second_hops(&selections.top_by_tvl_using_token_out, token_out, &seen);

    selections
}

/// Drop blocked pools and tokens, dedupe by id and sort by liquidity.
async fn filter_and_sort<P: SubgraphPool>(
    pools: Vec<P>,
    params: &CandidatePoolsParams<'_>,
) -> Result<Vec<P>> {
    let total = pools.len();
    let mut blocked_tokens: HashMap<Address, bool> = HashMap::new();
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(pools.len());

    for pool in pools {
        if params.config.blocked_pools.contains(pool.id()) || !seen.insert(pool.id().clone()) {
            continue;
        }
        if let Some(list) = params.blocked_token_list_provider {
            let mut blocked = false;
            for token in [pool.token0(), pool.token1()] {
                let hit = match blocked_tokens.get(token) {
                    Some(hit) => *hit,
                    None => {
                        let hit = list.get_token_by_address(token).await?.is_some();
                        blocked_tokens.insert(token.clone(), hit);
                        hit
                    }
                };
                blocked |= hit;
            }
            if blocked {
                continue;
            }
        }
        kept.push(pool);
    }

    kept.sort_by(|a, b| b.liquidity_usd().total_cmp(&a.liquidity_usd()));
    info!("After filtering blocked pools and tokens went from {} to {}", total, kept.len());
    Ok(kept)
}

/// The native/quote-side pair used to price gas, when the chain needs one.
fn eth_quote_pair(params: &CandidatePoolsParams<'_>) -> Option<(Address, Address)> {
    let native = wrapped_native(params.chain);
    let quote_side = match params.trade_type {
        TradeType::ExactInput => params.token_out,
        TradeType::ExactOutput => params.token_in,
    };
    if !prices_gas_via_wrapped_native(params.chain) || *quote_side == native {
        return None;
    }
    Some((native.address, quote_side.address.clone()))
}

fn base_token_addresses(chain: ChainId) -> Vec<Address> {
    base_tokens(chain).into_iter().map(|t| t.address).collect()
}

async fn resolve_tokens<P: SubgraphPool>(
    pools: &[P],
    params: &CandidatePoolsParams<'_>,
) -> Result<TokenAccessor> {
    let mut addresses: Vec<Address> = pools
        .iter()
        .flat_map(|p| [p.token0().clone(), p.token1().clone()])
        .collect();
    addresses.sort();
    addresses.dedup();
    info!(
        "Getting the {} tokens within the {} pools we are considering",
        addresses.len(),
        pools.len()
    );
    params
        .token_provider
        .get_tokens(&addresses, params.block_number)
        .await
}

fn symbol_or_address(tokens: &TokenAccessor, address: &Address) -> String {
    tokens
        .get_token_by_address(address)
        .and_then(|t| t.symbol.clone())
        .unwrap_or_else(|| address.to_string())
}

// ---------------------------------------------------------------------------
// Per-protocol entry points
// ---------------------------------------------------------------------------

pub struct V3CandidatePools {
    pub pool_accessor: V3PoolAccessor,
    pub candidate_pools: CandidatePoolsBySelectionCriteria,
    pub subgraph_pools: Vec<V3SubgraphPool>,
}

pub async fn get_v3_candidate_pools(
    params: &CandidatePoolsParams<'_>,
    subgraph_provider: &dyn V3SubgraphProvider,
    pool_provider: &dyn V3PoolProvider,
) -> Result<V3CandidatePools> {
    let (token_in, token_out) = (params.token_in, params.token_out);
    let all = subgraph_provider
        .get_pools(Some(token_in), Some(token_out), params.block_number)
        .await?;
    info!("Got {} pools from V3 subgraph provider", all.len());
    let sorted = filter_and_sort(all, params).await?;

    let eth_pair = eth_quote_pair(params);
    let selections = select_pools(
        &sorted,
        &token_in.address,
        &token_out.address,
        &base_token_addresses(params.chain),
        eth_pair.as_ref().map(|(a, b)| (a, b)),
        &params.config.v3_pool_selection,
        || {
            FeeAmount::ALL
                .iter()
                .map(|fee| {
                    let (t0, t1) = if token_in.sorts_before(token_out) {
                        (token_in, token_out)
                    } else {
                        (token_out, token_in)
                    };
                    V3SubgraphPool {
                        id: pool_provider.get_pool_address(token_in, token_out, *fee),
                        fee_tier: fee.pips().to_string(),
                        liquidity: SYNTHETIC_V3_LIQUIDITY.to_string(),
                        token0: t0.address.clone(),
                        token1: t1.address.clone(),
                        tvl_eth: SYNTHETIC_V3_TVL,
                        tvl_usd: SYNTHETIC_V3_TVL,
                    }
                })
                .collect()
        },
    );

    let subgraph_pools = selections.union();
    let tokens = resolve_tokens(&subgraph_pools, params).await?;
    let candidate_pools = CandidatePoolsBySelectionCriteria {
        protocol: Protocol::V3,
        selections: selections.map(|p| PoolSummary {
            id: p.id.clone(),
            label: format!(
                "{}/{}/{}",
                symbol_or_address(&tokens, &p.token0),
                symbol_or_address(&tokens, &p.token1),
                p.fee_tier
            ),
        }),
    };
    candidate_pools.log();

    let pairs = v3_token_pairs(&subgraph_pools, &tokens);
    let pool_accessor = pool_provider.get_pools(&pairs, params.block_number).await?;

    Ok(V3CandidatePools {
        pool_accessor,
        candidate_pools,
        subgraph_pools,
    })
}

/// Resolve indexed pools to token pairs, dropping unparseable fee tiers
/// and unknown tokens.
fn v3_token_pairs(pools: &[V3SubgraphPool], tokens: &TokenAccessor) -> Vec<(Token, Token, FeeAmount)> {
    pools
        .iter()
        .filter_map(|p| {
            let fee = match FeeAmount::from_str(&p.fee_tier) {
                Ok(fee) => fee,
                Err(_) => {
                    info!(
                        "Dropping candidate pool for {}/{}/{} because fee tier not supported",
                        p.token0, p.token1, p.fee_tier
                    );
                    return None;
                }
            };
            match (
                tokens.get_token_by_address(&p.token0),
                tokens.get_token_by_address(&p.token1),
            ) {
                (Some(a), Some(b)) => Some((a.clone(), b.clone(), fee)),
                (a, _) => {
                    info!(
                        "Dropping candidate pool for {}/{}/{} because {} not found by token provider",
                        p.token0,
                        p.token1,
                        fee,
                        if a.is_some() { &p.token1 } else { &p.token0 }
                    );
                    None
                }
            }
        })
        .collect()
}

fn v2_token_pairs(pools: &[V2SubgraphPool], tokens: &TokenAccessor) -> Vec<(Token, Token, bool)> {
    pools
        .iter()
        .filter_map(|p| {
            match (
                tokens.get_token_by_address(&p.token0),
                tokens.get_token_by_address(&p.token1),
            ) {
                (Some(a), Some(b)) => Some((a.clone(), b.clone(), p.stable)),
                _ => {
                    info!("Dropping candidate pool for {}/{}", p.token0, p.token1);
                    None
                }
            }
        })
        .collect()
}

pub struct V2CandidatePools {
    pub pool_accessor: V2PoolAccessor,
    pub candidate_pools: CandidatePoolsBySelectionCriteria,
    pub subgraph_pools: Vec<V2SubgraphPool>,
}

pub async fn get_v2_candidate_pools(
    params: &CandidatePoolsParams<'_>,
    subgraph_provider: &dyn V2SubgraphProvider,
    pool_provider: &dyn V2PoolProvider,
) -> Result<V2CandidatePools> {
    let (token_in, token_out) = (params.token_in, params.token_out);
    let all = subgraph_provider
        .get_pools(Some(token_in), Some(token_out), params.block_number)
        .await?;
    info!("Got {} pools from V2 subgraph provider", all.len());
    let sorted = filter_and_sort(all, params).await?;

    let eth_pair = eth_quote_pair(params);
    let selections = select_pools(
        &sorted,
        &token_in.address,
        &token_out.address,
        &base_token_addresses(params.chain),
        eth_pair.as_ref().map(|(a, b)| (a, b)),
        &params.config.v2_pool_selection,
        || {
            let (t0, t1) = if token_in.sorts_before(token_out) {
                (token_in, token_out)
            } else {
                (token_out, token_in)
            };
            [false, true]
                .into_iter()
                .map(|stable| V2SubgraphPool {
                    id: pool_provider.get_pool_address(token_in, token_out, stable),
                    token0: t0.address.clone(),
                    token1: t1.address.clone(),
                    supply: SYNTHETIC_V2_RESERVE,
                    reserve: SYNTHETIC_V2_RESERVE,
                    reserve_usd: SYNTHETIC_V2_RESERVE,
                    stable,
                })
                .collect()
        },
    );

    let subgraph_pools = selections.union();
    let tokens = resolve_tokens(&subgraph_pools, params).await?;
    let candidate_pools = CandidatePoolsBySelectionCriteria {
        protocol: Protocol::V2,
        selections: selections.map(|p| PoolSummary {
            id: p.id.clone(),
            label: format!(
                "{}/{}{}",
                symbol_or_address(&tokens, &p.token0),
                symbol_or_address(&tokens, &p.token1),
                if p.stable { "/stable" } else { "" }
            ),
        }),
    };
    candidate_pools.log();

    let pairs = v2_token_pairs(&subgraph_pools, &tokens);
    let pool_accessor = pool_provider.get_pools(&pairs, params.block_number).await?;

    Ok(V2CandidatePools {
        pool_accessor,
        candidate_pools,
        subgraph_pools,
    })
}

pub struct MixedCandidatePools {
    pub v3_pool_accessor: V3PoolAccessor,
    pub v2_pool_accessor: V2PoolAccessor,
    pub candidate_pools: CandidatePoolsBySelectionCriteria,
}

/// Combine V3 candidates with the V2 pairs around tokenIn/tokenOut that
/// carry more liquidity than their V3 counterpart (or have none).
pub async fn get_mixed_route_candidate_pools(
    params: &CandidatePoolsParams<'_>,
    v3: &V3CandidatePools,
    v2: &V2CandidatePools,
    v3_pool_provider: &dyn V3PoolProvider,
    v2_pool_provider: &dyn V2PoolProvider,
) -> Result<MixedCandidatePools> {
    let v2_sel = &v2.candidate_pools.selections;
    let anchored: HashSet<&Address> = v2_sel
        .top_by_tvl_using_token_in
        .iter()
        .chain(&v2_sel.top_by_base_with_token_in)
        .chain(&v2_sel.top_by_tvl_using_token_out)
        .chain(&v2_sel.top_by_base_with_token_out)
        .chain(&v2_sel.top_by_direct_swap_pool)
        .map(|p| &p.id)
        .collect();

    let v2_sorted = top_by_tvl(
        v2.subgraph_pools.iter().filter(|p| anchored.contains(&p.id)).cloned(),
        usize::MAX,
    );
    let v3_sorted = top_by_tvl(v3.subgraph_pools.iter().cloned(), usize::MAX);

    let mut v2_pools = Vec::new();
    for pair in v2_sorted {
        match v3_sorted.iter().find(|p| p.connects(&pair.token0, &pair.token1)) {
            Some(pool) if pair.reserve_usd > pool.tvl_usd => {
                info!(
                    token0 = %pair.token0,
                    token1 = %pair.token1,
                    v2_reserve_usd = pair.reserve_usd,
                    v3_tvl_usd = pool.tvl_usd,
                    "Mixed route heuristic, found a V2 pool with higher liquidity than its V3 counterpart"
                );
                v2_pools.push(pair);
            }
            Some(_) => {}
            None => {
                info!(
                    token0 = %pair.token0,
                    token1 = %pair.token1,
                    v2_reserve_usd = pair.reserve_usd,
                    "Mixed route heuristic, found a V2 pool with no V3 counterpart"
                );
                v2_pools.push(pair);
            }
        }
    }
    info!("{} V2 candidate pools fit the mixed route heuristic", v2_pools.len());

    let mut addresses: Vec<Address> = v2_pools
        .iter()
        .flat_map(|p| [p.token0.clone(), p.token1.clone()])
        .chain(v3_sorted.iter().flat_map(|p| [p.token0.clone(), p.token1.clone()]))
        .collect();
    addresses.sort();
    addresses.dedup();
    let tokens = params
        .token_provider
        .get_tokens(&addresses, params.block_number)
        .await?;

    let v3_pairs = v3_token_pairs(&v3_sorted, &tokens);
    let v2_pairs = v2_token_pairs(&v2_pools, &tokens);
    let (v3_pool_accessor, v2_pool_accessor) = futures::try_join!(
        v3_pool_provider.get_pools(&v3_pairs, params.block_number),
        v2_pool_provider.get_pools(&v2_pairs, params.block_number),
    )?;

    Ok(MixedCandidatePools {
        v3_pool_accessor,
        v2_pool_accessor,
        candidate_pools: CandidatePoolsBySelectionCriteria {
            protocol: Protocol::Mixed,
            selections: v3.candidate_pools.selections.clone(),
        },
    })
}

// ---------------------------------------------------------------------------
// Token validation
// ---------------------------------------------------------------------------

/// Drop pools routing *through* fee-on-transfer or transfer-restricted
/// tokens. Such tokens remain usable as the trade's own input or output.
pub async fn apply_token_validator<P: Clone>(
    pools: Vec<P>,
    tokens_of: impl Fn(&P) -> [&Token; 2],
    token_in: &Token,
    token_out: &Token,
    validator: Option<&dyn TokenValidatorProvider>,
) -> Result<Vec<P>> {
    let Some(validator) = validator else {
        return Ok(pools);
    };
    let mut tokens: Vec<Token> = pools.iter().flat_map(|p| tokens_of(p).map(Token::clone)).collect();
    tokens.sort();
    tokens.dedup();
    let results = validator.validate_tokens(&tokens).await?;

    let before = pools.len();
    let kept: Vec<P> = pools
        .into_iter()
        .filter(|p| {
            tokens_of(p).iter().all(|t| {
                let explicit = *t == token_in || *t == token_out;
                let restricted = results.is_restricted(&t.address);
                if restricted && !explicit {
                    info!("Dropping pool through {} ({:?})", t, results.get(&t.address));
                }
                explicit || !restricted
            })
        })
        .collect();
    if kept.len() != before {
        debug!("Token validation dropped {} of {} pools", before - kept.len(), before);
    }
    Ok(kept)
}

pub fn v3_pool_tokens(pool: &V3Pool) -> [&Token; 2] {
    [&pool.token0, &pool.token1]
}

pub fn v2_pair_tokens(pair: &Pair) -> [&Token; 2] {
    [&pair.token0, &pair.token1]
}

pub fn pool_tokens(pool: &Pool) -> [&Token; 2] {
    [pool.token0(), pool.token1()]
}
