//! Gas heuristic for routes combining pairs and concentrated-liquidity pools

use amm::Pool;
use router_core::ChainId;

use crate::entities::RouteWithValidQuote;
use crate::gas_models::gas_costs::{
    base_swap_cost, cost_per_hop, cost_per_init_tick, token_overhead, V2_BASE_SWAP_COST, V2_COST_PER_EXTRA_HOP,
};
use crate::gas_models::{GasCost, GasModel, GasPricing};

/// Charges each run of same-kind pools with that kind's heuristic
#[derive(Debug, Clone)]
pub struct MixedRouteHeuristicGasModel {
    chain: ChainId,
    pricing: GasPricing,
    additional_gas_overhead: u64,
}

impl MixedRouteHeuristicGasModel {
    pub fn new(chain: ChainId, pricing: GasPricing, additional_gas_overhead: u64) -> Self {
        Self {
            chain,
            pricing,
            additional_gas_overhead,
        }
    }

    pub fn estimate_gas(&self, route: &RouteWithValidQuote) -> u64 {
        let pools = route.route.pools();
        let mut gas = base_swap_cost(self.chain) + token_overhead(self.chain, &route.route);

        let mut start = 0;
        while start < pools.len() {
            let is_v3 = matches!(pools[start], Pool::V3(_));
            let len = pools[start..]
                .iter()
                .take_while(|p| matches!(p, Pool::V3(_)) == is_v3)
                .count() as u64;
            gas += if is_v3 {
                cost_per_hop(self.chain) * len
            } else {
                V2_BASE_SWAP_COST + V2_COST_PER_EXTRA_HOP * (len - 1)
            };
            start += len as usize;
        }

        let ticks = u64::from(route.ticks_crossed().max(1));
        gas + cost_per_init_tick(self.chain) * ticks + self.additional_gas_overhead
    }
}

impl GasModel for MixedRouteHeuristicGasModel {
    fn estimate_gas_cost(&self, route: &RouteWithValidQuote) -> GasCost {
        self.pricing.cost(self.estimate_gas(route), route)
    }
}
