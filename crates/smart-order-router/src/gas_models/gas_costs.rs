//! Heuristic gas constants per chain

use router_core::{Address, ChainId};

use crate::entities::Route;

/// Fixed cost of entering the swap router
pub fn base_swap_cost(chain: ChainId) -> u64 {
    match chain {
        ChainId::Arbitrum => 5_000,
        _ => 2_000,
    }
}

pub fn cost_per_init_tick(_chain: ChainId) -> u64 {
    31_000
}

pub fn cost_per_hop(_chain: ChainId) -> u64 {
    80_000
}

/// Single-hop swaps are consistently underestimated by the per-hop cost.
pub fn single_hop_overhead(_chain: ChainId) -> u64 {
    15_000
}

pub const V2_BASE_SWAP_COST: u64 = 115_000;
pub const V2_COST_PER_EXTRA_HOP: u64 = 20_000;

/// Wrapping the native currency before the swap
pub const NATIVE_WRAP_OVERHEAD: u64 = 27_938;
/// Unwrapping the native currency after the swap
pub const NATIVE_UNWRAP_OVERHEAD: u64 = 36_000;

const BNB_MAINNET: &str = "0xB8c77482e45F1F44dE1745F52C74426C631bDD52";
const STETH_MAINNET: &str = "0xae7ab96520DE3A18E5e111B5EaAb095312D7fE84";

/// Extra gas for tokens whose transfer functions are unusually expensive.
pub fn token_overhead(chain: ChainId, route: &Route) -> u64 {
    if chain != ChainId::Mainnet {
        return 0;
    }
    let bnb = Address::from(BNB_MAINNET);
    let steth = Address::from(STETH_MAINNET);
    let mut overhead = 0;
    if route.path().iter().any(|t| t.address == bnb) {
        overhead += 20_000;
    }
    if route.path().iter().any(|t| t.address == steth) {
        overhead += 130_000;
    }
    overhead
}

/// Additional gas when the trade starts or ends in the native currency.
pub fn native_overhead(native_in: bool, native_out: bool) -> u64 {
    let mut overhead = 0;
    if native_in {
        overhead += NATIVE_WRAP_OVERHEAD;
    }
    if native_out {
        overhead += NATIVE_UNWRAP_OVERHEAD;
    }
    overhead
}
