//! Constant-product gas heuristic

use amm::Pair;
use num_bigint::BigInt;
use router_core::{usd_gas_tokens, wrapped_native, BlockNumber, ChainId, Result, RoutingError, Token};
use tracing::debug;

use crate::entities::RouteWithValidQuote;
use crate::gas_models::gas_costs::{V2_BASE_SWAP_COST, V2_COST_PER_EXTRA_HOP};
use crate::gas_models::{GasCost, GasModel, GasPricing};
use crate::providers::V2PoolProvider;

/// Pairs the V2 gas model prices gas through
#[derive(Debug, Clone)]
pub struct V2GasModelPools {
    pub usd_pair: Pair,
    pub native_quote_pair: Option<Pair>,
}

fn native_reserve(pair: &Pair, native: &Token) -> BigInt {
    pair.reserve_of(native).cloned().unwrap_or_default()
}

impl V2GasModelPools {
    /// The native/USD pair and native/quote pair holding the most native.
    pub async fn fetch(
        chain: ChainId,
        quote_token: &Token,
        provider: &dyn V2PoolProvider,
        block_number: Option<BlockNumber>,
    ) -> Result<Self> {
        let native = wrapped_native(chain);
        let usd_tokens = usd_gas_tokens(chain);
        if usd_tokens.is_empty() {
            return Err(RoutingError::NoUsdGasToken { chain_id: chain.id() }.into());
        }

        let mut requests: Vec<(Token, Token, bool)> = usd_tokens
            .iter()
            .filter(|t| **t != native)
            .map(|t| (native.clone(), t.clone(), false))
            .collect();
        if *quote_token != native {
            requests.push((native.clone(), quote_token.clone(), false));
        }
        let accessor = provider.get_pools(&requests, block_number).await?;

        let usd_pair = usd_tokens
            .iter()
            .filter_map(|t| accessor.get_pool(&native, t, false))
            .max_by_key(|p| native_reserve(p, &native))
            .cloned()
            .ok_or(RoutingError::NoUsdPool { chain_id: chain.id() })?;
        let native_quote_pair = accessor
            .get_pool(&native, quote_token, false)
            .filter(|p| native_reserve(p, &native) > BigInt::from(0u8))
            .cloned();

        debug!(usd_pair = %usd_pair.address(), native_quote = native_quote_pair.is_some(), "Resolved V2 gas model pairs");
        Ok(Self {
            usd_pair,
            native_quote_pair,
        })
    }

    pub fn pricing(&self, chain: ChainId, gas_price_wei: BigInt, quote_token: Token) -> Result<GasPricing> {
        let native = wrapped_native(chain);
        let native_usd = self.usd_pair.price_of(&native)?;
        let native_quote = self.native_quote_pair.as_ref().and_then(|p| p.price_of(&native).ok());
        Ok(GasPricing::new(chain, gas_price_wei, quote_token, native_usd, native_quote, None))
    }
}

/// `115,000 + 20,000` per extra hop, priced through pairs
#[derive(Debug, Clone)]
pub struct V2HeuristicGasModel {
    pricing: GasPricing,
    additional_gas_overhead: u64,
}

impl V2HeuristicGasModel {
    pub fn new(pricing: GasPricing, additional_gas_overhead: u64) -> Self {
        Self {
            pricing,
            additional_gas_overhead,
        }
    }

    pub fn estimate_gas(&self, route: &RouteWithValidQuote) -> u64 {
        let hops = route.route.hops().max(1) as u64;
        V2_BASE_SWAP_COST + V2_COST_PER_EXTRA_HOP * (hops - 1) + self.additional_gas_overhead
    }
}

impl GasModel for V2HeuristicGasModel {
    fn estimate_gas_cost(&self, route: &RouteWithValidQuote) -> GasCost {
        self.pricing.cost(self.estimate_gas(route), route)
    }
}
