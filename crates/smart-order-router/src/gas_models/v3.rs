//! Concentrated-liquidity gas heuristic

use amm::{FeeAmount, V3Pool};
use num_bigint::BigInt;
use router_core::{usd_gas_tokens, wrapped_native, BlockNumber, ChainId, Result, RoutingError, Token};
use tracing::{debug, info};

use crate::entities::RouteWithValidQuote;
use crate::gas_models::gas_costs::{
    base_swap_cost, cost_per_hop, cost_per_init_tick, single_hop_overhead, token_overhead,
};
use crate::gas_models::{l1, GasCost, GasModel, GasPricing, L1GasCost};
use crate::providers::{L2GasData, V3PoolProvider};

/// Pools the V3 and mixed gas models price gas through
#[derive(Debug, Clone)]
pub struct V3GasModelPools {
    pub usd_pool: V3Pool,
    pub native_quote_pool: Option<V3Pool>,
    pub native_amount_pool: Option<V3Pool>,
}

fn deepest(pools: impl Iterator<Item = V3Pool>) -> Option<V3Pool> {
    pools.filter(|p| p.liquidity > 0).max_by_key(|p| p.liquidity)
}

impl V3GasModelPools {
    /// Highest-liquidity native/USD, native/quote and native/amount pools.
    pub async fn fetch(
        chain: ChainId,
        amount_token: &Token,
        quote_token: &Token,
        provider: &dyn V3PoolProvider,
        block_number: Option<BlockNumber>,
    ) -> Result<Self> {
        let native = wrapped_native(chain);
        let usd_tokens = usd_gas_tokens(chain);
        if usd_tokens.is_empty() {
            return Err(RoutingError::NoUsdGasToken { chain_id: chain.id() }.into());
        }

        let mut requests = Vec::new();
        for token in usd_tokens.iter().chain([quote_token, amount_token]) {
            if *token == native {
                continue;
            }
            for fee in FeeAmount::ALL {
                requests.push((native.clone(), token.clone(), fee));
            }
        }
        let accessor = provider.get_pools(&requests, block_number).await?;

        let pools_with = |token: &Token| {
            let mut found = Vec::new();
            for fee in FeeAmount::ALL {
                if let Some(pool) = accessor.get_pool(&native, token, fee) {
                    found.push(pool.clone());
                }
            }
            found
        };

        let usd_pool = deepest(usd_tokens.iter().flat_map(|t| pools_with(t)))
            .ok_or(RoutingError::NoUsdPool { chain_id: chain.id() })?;
        let native_quote_pool = if *quote_token == native {
            None
        } else {
            deepest(pools_with(quote_token).into_iter())
        };
        let native_amount_pool = if *amount_token == native {
            None
        } else {
            deepest(pools_with(amount_token).into_iter())
        };

        debug!(
            usd_pool = %usd_pool.address(),
            native_quote = native_quote_pool.is_some(),
            native_amount = native_amount_pool.is_some(),
            "Resolved gas model pools"
        );
        Ok(Self {
            usd_pool,
            native_quote_pool,
            native_amount_pool,
        })
    }

    pub fn pricing(&self, chain: ChainId, gas_price_wei: BigInt, quote_token: Token) -> Result<GasPricing> {
        let native = wrapped_native(chain);
        let native_usd = self.usd_pool.price_of(&native)?;
        let native_quote = self.native_quote_pool.as_ref().and_then(|p| p.price_of(&native).ok());
        let native_amount = self.native_amount_pool.as_ref().and_then(|p| p.price_of(&native).ok());
        if native_quote.is_none() && quote_token != native {
            info!(
                "Unable to find {} pool with the quote token {}, using the amount token to price gas",
                native, quote_token
            );
        }
        Ok(GasPricing::new(chain, gas_price_wei, quote_token, native_usd, native_quote, native_amount))
    }
}

/// Estimates gas from hop count and initialized ticks crossed
#[derive(Debug, Clone)]
pub struct V3HeuristicGasModel {
    chain: ChainId,
    pricing: GasPricing,
    l2_gas_data: Option<L2GasData>,
    additional_gas_overhead: u64,
}

impl V3HeuristicGasModel {
    pub fn new(
        chain: ChainId,
        pricing: GasPricing,
        l2_gas_data: Option<L2GasData>,
        additional_gas_overhead: u64,
    ) -> Self {
        Self {
            chain,
            pricing,
            l2_gas_data,
            additional_gas_overhead,
        }
    }

    pub fn pricing(&self) -> &GasPricing {
        &self.pricing
    }

    pub fn estimate_gas(&self, route: &RouteWithValidQuote) -> u64 {
        let ticks = u64::from(route.ticks_crossed().max(1));
        let hops = route.route.hops() as u64;
        let mut hops_gas = cost_per_hop(self.chain) * hops;
        if hops == 1 {
            hops_gas += single_hop_overhead(self.chain);
        }
        base_swap_cost(self.chain)
            + hops_gas
            + token_overhead(self.chain, &route.route)
            + cost_per_init_tick(self.chain) * ticks
            + self.additional_gas_overhead
    }
}

impl GasModel for V3HeuristicGasModel {
    fn estimate_gas_cost(&self, route: &RouteWithValidQuote) -> GasCost {
        self.pricing.cost(self.estimate_gas(route), route)
    }

    fn calculate_l1_gas_fees(&self, routes: &[RouteWithValidQuote]) -> Option<Result<L1GasCost>> {
        Some(l1::l1_gas_cost(self.chain, &self.pricing, routes, self.l2_gas_data.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Route, RouteQuoteParams, V3Route};
    use crate::gas_models::test_support::make_pricing;
    use crate::providers::V3PoolAccessor;
    use async_trait::async_trait;
    use router_core::{tokens, CurrencyAmount, TradeType};

    struct FixedPools(Vec<V3Pool>);

    #[async_trait]
    impl V3PoolProvider for FixedPools {
        async fn get_pools(
            &self,
            _pools: &[(Token, Token, FeeAmount)],
            _block_number: Option<BlockNumber>,
        ) -> Result<crate::providers::V3PoolAccessor> {
            Ok(V3PoolAccessor::new(self.0.clone()))
        }
    }

    fn make_pool(a: &Token, b: &Token, fee: FeeAmount, liquidity: u128) -> V3Pool {
        V3Pool::new(a.clone(), b.clone(), fee, BigInt::from(1u8) << 96, liquidity, 0, vec![]).unwrap()
    }

    fn make_route_quote(hops: usize, ticks: Vec<u32>) -> RouteWithValidQuote {
        let (usdc, dai, weth) = (tokens::usdc_mainnet(), tokens::dai_mainnet(), tokens::weth_mainnet());
        let (pools, output) = if hops == 1 {
            (vec![make_pool(&usdc, &dai, FeeAmount::Low, 1)], dai.clone())
        } else {
            (
                vec![make_pool(&usdc, &weth, FeeAmount::Low, 1), make_pool(&weth, &dai, FeeAmount::Low, 1)],
                dai.clone(),
            )
        };
        let route = Route::V3(V3Route::new(pools, usdc.clone(), output).unwrap());
        RouteWithValidQuote::new(
            RouteQuoteParams {
                route,
                amount: CurrencyAmount::from_raw(usdc, 1_000u64),
                raw_quote: BigInt::from(1_000u64),
                percent: 100,
                trade_type: TradeType::ExactInput,
                quote_token: dai,
                sqrt_price_x96_after_list: vec![],
                initialized_ticks_crossed_list: ticks,
                quoter_gas_estimate: 0,
            },
            &V3HeuristicGasModel::new(
                ChainId::Mainnet,
                make_pricing(ChainId::Mainnet, tokens::dai_mainnet(), 1, tokens::usdc_mainnet(), 1),
                None,
                0,
            ),
        )
    }

    #[test]
    fn test_single_hop_heuristic() {
        let rwq = make_route_quote(1, vec![0]);
        // 2000 + 80000 + 15000 + 31000 * max(1, 0)
        assert_eq!(rwq.gas_estimate, 128_000);
        // 128000 gas * 10 wei * 1
        assert_eq!(rwq.gas_cost_in_token.raw, BigInt::from(1_280_000));
    }

    #[test]
    fn test_multi_hop_counts_ticks() {
        let rwq = make_route_quote(2, vec![2, 1]);
        assert_eq!(rwq.gas_estimate, 2_000 + 160_000 + 93_000);
    }

    #[test]
    fn test_l1_fees_require_gas_data() {
        let model = V3HeuristicGasModel::new(
            ChainId::Optimism,
            make_pricing(ChainId::Optimism, tokens::dai_optimism(), 1, tokens::usdc_optimism(), 1),
            None,
            0,
        );
        let err = model.calculate_l1_gas_fees(&[]).unwrap().unwrap_err();
        assert_eq!(err.error_code(), "l1_fee_unavailable");
    }

    #[tokio::test]
    async fn test_fetch_picks_deepest_pools() {
        let (weth, usdc, dai) = (tokens::weth_mainnet(), tokens::usdc_mainnet(), tokens::dai_mainnet());
        let provider = FixedPools(vec![
            make_pool(&weth, &usdc, FeeAmount::Low, 10),
            make_pool(&weth, &usdc, FeeAmount::Medium, 50),
            make_pool(&weth, &dai, FeeAmount::Low, 0),
        ]);
        let pools = V3GasModelPools::fetch(ChainId::Mainnet, &usdc, &dai, &provider, None)
            .await
            .unwrap();
        assert_eq!(pools.usd_pool.fee, FeeAmount::Medium);
        // zero-liquidity pools never price gas
        assert!(pools.native_quote_pool.is_none());
        assert_eq!(pools.native_amount_pool.as_ref().map(|p| p.liquidity), Some(50));
    }

    #[tokio::test]
    async fn test_fetch_without_usd_pool_fails() {
        let (usdc, dai) = (tokens::usdc_mainnet(), tokens::dai_mainnet());
        let err = V3GasModelPools::fetch(ChainId::Mainnet, &usdc, &dai, &FixedPools(vec![]), None)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "no_usd_pool");
    }
}
