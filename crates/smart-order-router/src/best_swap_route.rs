//! Split-route search
//!
//! Combines quoted route slices into a set of pool-disjoint routes that
//! covers 100% of the trade with the best gas-adjusted total. The search
//! runs breadth first, one round per split count.

use std::collections::{BTreeMap, HashSet, VecDeque};

use num_bigint::BigInt;
use num_traits::Signed;
use router_core::{
    usd_gas_tokens, Address, ChainId, CurrencyAmount, Protocol, Result, RoutingConfig, RoutingError, TradeType,
};
use tracing::{debug, info};

use crate::entities::RouteWithValidQuote;
use crate::gas_models::{GasModel, L1GasCost};
use crate::util::{rescale_decimals, TopK};

/// Single-route candidates kept for the diagnostic top list
const TOP_SINGLE_ROUTES: usize = 5;
const TOP_K: usize = 3;

/// Winning combination and its aggregate figures
#[derive(Debug, Clone)]
pub struct BestSwapRoute {
    pub quote: CurrencyAmount,
    pub quote_gas_adjusted: CurrencyAmount,
    pub estimated_gas_used: u64,
    pub estimated_gas_used_usd: CurrencyAmount,
    pub estimated_gas_used_quote_token: CurrencyAmount,
    pub routes: Vec<RouteWithValidQuote>,
}

/// A partial combination waiting to be extended
struct Partial<'a> {
    routes: Vec<&'a RouteWithValidQuote>,
    remaining_percent: u32,
    percent_index: usize,
    special: bool,
}

/// Pick the best split of `amount` among `routes`.
///
/// `Ok(None)` when no combination covers the whole amount.
pub fn get_best_swap_route(
    amount: &CurrencyAmount,
    percents: &[u32],
    routes: &[RouteWithValidQuote],
    trade_type: TradeType,
    chain: ChainId,
    config: &RoutingConfig,
    gas_model: Option<&dyn GasModel>,
) -> Result<Option<BestSwapRoute>> {
    let Some(mut best) = get_best_swap_route_by(percents, routes, trade_type, chain, config, gas_model)? else {
        return Ok(None);
    };

    // slices are truncated, so the total can fall short by a few units
    let total: BigInt = best.routes.iter().map(|r| &r.amount.raw).sum();
    let missing = &amount.raw - total;
    if missing.is_positive() {
        if let Some(last) = best.routes.last_mut() {
            debug!(missing = %missing, "Adding missing amount to last route");
            last.amount = CurrencyAmount::from_raw(last.amount.currency.clone(), &last.amount.raw + &missing);
        }
    }
    best.routes.sort_by(|a, b| b.amount.raw.cmp(&a.amount.raw));

    info!(
        splits = best.routes.len(),
        quote = %best.quote.to_exact(),
        quote_gas_adjusted = %best.quote_gas_adjusted.to_exact(),
        gas_used = best.estimated_gas_used,
        gas_used_usd = %best.estimated_gas_used_usd.to_fixed(2),
        "Found best swap route. {} split.",
        best.routes.len()
    );
    for route in &best.routes {
        debug!("  {}% = {} via {}", route.percent, route.quote.to_exact(), route.route);
    }
    Ok(Some(best))
}

fn is_better(trade_type: TradeType, a: &BigInt, b: &BigInt) -> bool {
    match trade_type {
        TradeType::ExactInput => a > b,
        TradeType::ExactOutput => a < b,
    }
}

fn sum_adjusted(routes: &[&RouteWithValidQuote]) -> BigInt {
    routes.iter().map(|r| &r.quote_adjusted_for_gas.raw).sum()
}

fn describe(routes: &[&RouteWithValidQuote]) -> String {
    routes
        .iter()
        .map(|r| format!("{}% {}", r.percent, r.route))
        .collect::<Vec<_>>()
        .join(", ")
}

/// L1 data fee for a complete route set, `None` on chains without one.
fn l1_cost(
    chain: ChainId,
    routes: &[&RouteWithValidQuote],
    gas_model: Option<&dyn GasModel>,
) -> Result<Option<L1GasCost>> {
    if !chain.has_l1_fee() {
        return Ok(None);
    }
    if routes.iter().any(|r| r.protocol() != Protocol::V3) {
        return Err(RoutingError::L1FeeRequiresV3 { chain_id: chain.id() }.into());
    }
    let model = gas_model.ok_or(RoutingError::L1GasModelMissing { chain_id: chain.id() })?;
    let owned: Vec<RouteWithValidQuote> = routes.iter().map(|r| (*r).clone()).collect();
    match model.calculate_l1_gas_fees(&owned) {
        Some(cost) => cost.map(Some),
        None => Err(RoutingError::L1GasModelMissing { chain_id: chain.id() }.into()),
    }
}

fn apply_l1(trade_type: TradeType, quote: BigInt, l1: Option<&L1GasCost>) -> BigInt {
    match (l1, trade_type) {
        (None, _) => quote,
        (Some(l1), TradeType::ExactInput) => quote - &l1.gas_cost_l1_quote_token.raw,
        (Some(l1), TradeType::ExactOutput) => quote + &l1.gas_cost_l1_quote_token.raw,
    }
}

/// First route in `candidates` sharing no pool with `used`.
///
/// With `force_cross_protocol`, a set using a single protocol must be
/// extended with a different one.
fn find_first_route_not_using_used_pools<'a>(
    used: &[&'a RouteWithValidQuote],
    candidates: &'a [RouteWithValidQuote],
    force_cross_protocol: bool,
) -> Option<&'a RouteWithValidQuote> {
    let used_pools: HashSet<&Address> = used.iter().flat_map(|r| r.pool_addresses.iter()).collect();
    let used_protocols: HashSet<Protocol> = used.iter().map(|r| r.protocol()).collect();
    let need_other_protocol = force_cross_protocol && used_protocols.len() == 1;

    candidates.iter().find(|candidate| {
        if candidate.pool_addresses.iter().any(|p| used_pools.contains(p)) {
            return false;
        }
        !(need_other_protocol && used_protocols.contains(&candidate.protocol()))
    })
}

fn get_best_swap_route_by(
    percents: &[u32],
    routes: &[RouteWithValidQuote],
    trade_type: TradeType,
    chain: ChainId,
    config: &RoutingConfig,
    gas_model: Option<&dyn GasModel>,
) -> Result<Option<BestSwapRoute>> {
    let mut by_percent: BTreeMap<u32, Vec<RouteWithValidQuote>> = BTreeMap::new();
    for route in routes {
        if config.force_mixed_routes && route.protocol() != Protocol::Mixed {
            continue;
        }
        by_percent.entry(route.percent).or_default().push(route.clone());
    }
    for bucket in by_percent.values_mut() {
        bucket.sort_by(|a, b| match trade_type {
            TradeType::ExactInput => b.quote_adjusted_for_gas.raw.cmp(&a.quote_adjusted_for_gas.raw),
            TradeType::ExactOutput => a.quote_adjusted_for_gas.raw.cmp(&b.quote_adjusted_for_gas.raw),
        });
    }

    let prefer_larger = trade_type == TradeType::ExactInput;
    let mut top: TopK<Vec<&RouteWithValidQuote>> = TopK::new(TOP_K, prefer_larger);
    let mut best_quote: Option<BigInt> = None;
    let mut best_swap: Option<Vec<&RouteWithValidQuote>> = None;

    match by_percent.get(&100) {
        Some(full) if config.min_splits <= 1 && !config.force_cross_protocol => {
            if let Some(first) = full.first() {
                best_quote = Some(first.quote_adjusted_for_gas.raw.clone());
                best_swap = Some(vec![first]);
            }
            for route in full.iter().take(TOP_SINGLE_ROUTES) {
                top.push(route.quote_adjusted_for_gas.raw.clone(), vec![route]);
            }
        }
        _ => {
            info!(
                min_splits = config.min_splits,
                force_cross_protocol = config.force_cross_protocol,
                "Not considering single route candidates"
            );
        }
    }

    let mut queue: VecDeque<Partial<'_>> = VecDeque::new();
    for i in (0..percents.len()).rev() {
        let percent = percents[i];
        let Some(bucket) = by_percent.get(&percent) else {
            continue;
        };
        if let Some(first) = bucket.first() {
            queue.push_back(Partial {
                routes: vec![first],
                remaining_percent: 100u32.saturating_sub(percent),
                percent_index: i,
                special: false,
            });
        }
        if let Some(second) = bucket.get(1) {
            queue.push_back(Partial {
                routes: vec![second],
                remaining_percent: 100u32.saturating_sub(percent),
                percent_index: i,
                special: true,
            });
        }
    }

    let mut splits: usize = 1;
    while !queue.is_empty() {
        info!(
            on_queue = queue.len(),
            "Top {} with {} splits: {}",
            top.len(),
            splits,
            top.iter()
                .map(|(q, r)| format!("{} [{}]", q, describe(r)))
                .collect::<Vec<_>>()
                .join(" | ")
        );
        top.clear();

        let mut layer = queue.len();
        splits += 1;

        if splits >= 3 && best_swap.as_ref().is_some_and(|b| b.len() < splits - 1) {
            break;
        }
        if splits > config.max_splits {
            info!("Max splits reached. Stopping search.");
            break;
        }

        while layer > 0 {
            layer -= 1;
            let Some(partial) = queue.pop_front() else {
                break;
            };

            for i in (0..=partial.percent_index).rev() {
                let percent = percents[i];
                if percent > partial.remaining_percent {
                    continue;
                }
                let Some(candidates) = by_percent.get(&percent) else {
                    continue;
                };
                let Some(next) =
                    find_first_route_not_using_used_pools(&partial.routes, candidates, config.force_cross_protocol)
                else {
                    continue;
                };

                let remaining = partial.remaining_percent - percent;
                let mut extended = partial.routes.clone();
                extended.push(next);

                if remaining == 0 && splits >= config.min_splits {
                    let l1 = l1_cost(chain, &extended, gas_model)?;
                    let quote = apply_l1(trade_type, sum_adjusted(&extended), l1.as_ref());
                    top.push(quote.clone(), extended.clone());
                    if best_quote.as_ref().map_or(true, |b| is_better(trade_type, &quote, b)) {
                        debug!(splits, special = partial.special, quote = %quote, "New best combination");
                        best_quote = Some(quote);
                        best_swap = Some(extended);
                    }
                } else {
                    queue.push_back(Partial {
                        routes: extended,
                        remaining_percent: remaining,
                        percent_index: i,
                        special: partial.special,
                    });
                }
            }
        }
    }

    let Some(best_swap) = best_swap else {
        info!("Could not find a valid swap");
        return Ok(None);
    };
    build_result(best_swap, trade_type, chain, gas_model).map(Some)
}

fn build_result(
    chosen: Vec<&RouteWithValidQuote>,
    trade_type: TradeType,
    chain: ChainId,
    gas_model: Option<&dyn GasModel>,
) -> Result<BestSwapRoute> {
    let Some(first) = chosen.first() else {
        return Err(RoutingError::InvalidRoute {
            message: "empty route set".to_string(),
        }
        .into());
    };
    let quote_token = first.quote_token.clone();

    let l1 = l1_cost(chain, &chosen, gas_model)?;
    let quote_gas_adjusted = CurrencyAmount::from_raw(
        quote_token.clone(),
        apply_l1(trade_type, sum_adjusted(&chosen), l1.as_ref()),
    );
    let estimated_gas_used: u64 = chosen.iter().map(|r| r.gas_estimate).sum();

    let usd_token = usd_gas_tokens(chain)
        .into_iter()
        .next()
        .ok_or(RoutingError::NoUsdGasToken { chain_id: chain.id() })?;
    let mut usd_raw: BigInt = chosen
        .iter()
        .map(|r| rescale_decimals(&r.gas_cost_in_usd.raw, r.gas_cost_in_usd.currency.decimals, usd_token.decimals))
        .sum();
    let mut gas_quote_raw: BigInt = chosen.iter().map(|r| &r.gas_cost_in_token.raw).sum();
    if let Some(l1) = &l1 {
        usd_raw += rescale_decimals(
            &l1.gas_cost_l1_usd.raw,
            l1.gas_cost_l1_usd.currency.decimals,
            usd_token.decimals,
        );
        gas_quote_raw += &l1.gas_cost_l1_quote_token.raw;
    }

    let quote_raw: BigInt = chosen.iter().map(|r| &r.quote.raw).sum();
    let mut routes: Vec<RouteWithValidQuote> = chosen.into_iter().cloned().collect();
    routes.sort_by(|a, b| b.amount.raw.cmp(&a.amount.raw));

    Ok(BestSwapRoute {
        quote: CurrencyAmount::from_raw(quote_token.clone(), quote_raw),
        quote_gas_adjusted,
        estimated_gas_used,
        estimated_gas_used_usd: CurrencyAmount::from_raw(usd_token, usd_raw),
        estimated_gas_used_quote_token: CurrencyAmount::from_raw(quote_token, gas_quote_raw),
        routes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MixedRoute, Route, RouteQuoteParams, V2Route};
    use crate::gas_models::GasCost;
    use amm::{FeeAmount, Pair, Pool, V3Pool};
    use router_core::Token;

    struct FlatGas;

    impl GasModel for FlatGas {
        fn estimate_gas_cost(&self, route: &RouteWithValidQuote) -> GasCost {
            GasCost {
                gas_estimate: 100_000,
                gas_cost_in_token: CurrencyAmount::from_raw(route.quote_token.clone(), 10u64),
                gas_cost_in_usd: CurrencyAmount::from_raw(route.quote_token.clone(), 10u64),
            }
        }
    }

    fn make_token(chain: ChainId, suffix: &str, symbol: &str) -> Token {
        Token::new(chain, format!("0x00000000000000000000000000000000000000{}", suffix).as_str(), 18, Some(symbol), None)
    }

    fn make_pair(a: &Token, b: &Token) -> Pair {
        Pair::new(a.clone(), b.clone(), 1_000_000u64, 1_000_000u64, false)
    }

    /// Direct route plus three routes through distinct intermediates
    fn make_routes(chain: ChainId) -> (Token, Token, Vec<Route>) {
        let a = make_token(chain, "0a", "A");
        let b = make_token(chain, "0b", "B");
        let c = make_token(chain, "0c", "C");
        let d = make_token(chain, "0d", "D");
        let e = make_token(chain, "0e", "E");
        let routes = vec![
            Route::V2(V2Route::new(vec![make_pair(&a, &b)], a.clone(), b.clone()).unwrap()),
            Route::V2(V2Route::new(vec![make_pair(&a, &c), make_pair(&c, &b)], a.clone(), b.clone()).unwrap()),
            Route::V2(V2Route::new(vec![make_pair(&a, &d), make_pair(&d, &b)], a.clone(), b.clone()).unwrap()),
            Route::V2(V2Route::new(vec![make_pair(&a, &e), make_pair(&e, &b)], a.clone(), b.clone()).unwrap()),
        ];
        (a, b, routes)
    }

    fn make_quote(route: &Route, percent: u32, amount: u64, quote: u64, trade_type: TradeType) -> RouteWithValidQuote {
        RouteWithValidQuote::new(
            RouteQuoteParams {
                route: route.clone(),
                amount: CurrencyAmount::from_raw(route.input().clone(), amount),
                raw_quote: BigInt::from(quote),
                percent,
                trade_type,
                quote_token: route.output().clone(),
                sqrt_price_x96_after_list: vec![],
                initialized_ticks_crossed_list: vec![],
                quoter_gas_estimate: 0,
            },
            &FlatGas,
        )
    }

    /// Exact-output slice: `amount` of the output token costs `quote` of the input token
    fn make_exact_out_quote(route: &Route, percent: u32, amount: u64, quote: u64) -> RouteWithValidQuote {
        RouteWithValidQuote::new(
            RouteQuoteParams {
                route: route.clone(),
                amount: CurrencyAmount::from_raw(route.output().clone(), amount),
                raw_quote: BigInt::from(quote),
                percent,
                trade_type: TradeType::ExactOutput,
                quote_token: route.input().clone(),
                sqrt_price_x96_after_list: vec![],
                initialized_ticks_crossed_list: vec![],
                quoter_gas_estimate: 0,
            },
            &FlatGas,
        )
    }

    /// 50% on the direct route with the two 25% slices beats every 2-way split
    fn make_three_way_quotes(routes: &[Route]) -> Vec<RouteWithValidQuote> {
        vec![
            make_quote(&routes[0], 100, 1_000, 1_000, TradeType::ExactInput),
            make_quote(&routes[0], 50, 500, 600, TradeType::ExactInput),
            make_quote(&routes[1], 50, 500, 550, TradeType::ExactInput),
            make_quote(&routes[2], 25, 250, 320, TradeType::ExactInput),
            make_quote(&routes[3], 25, 250, 310, TradeType::ExactInput),
        ]
    }

    fn pool_sets(best: &BestSwapRoute) -> Vec<(u32, Vec<Address>)> {
        best.routes.iter().map(|r| (r.percent, r.pool_addresses.clone())).collect()
    }

    fn make_config(min_splits: usize, max_splits: usize) -> RoutingConfig {
        let mut config = RoutingConfig::for_chain(ChainId::Mainnet);
        config.min_splits = min_splits;
        config.max_splits = max_splits;
        config
    }

    fn assert_disjoint(routes: &[RouteWithValidQuote]) {
        let mut seen = HashSet::new();
        for route in routes {
            for pool in &route.pool_addresses {
                assert!(seen.insert(pool.clone()), "pool {} reused", pool);
            }
        }
    }

    #[test]
    fn test_prefers_single_route_when_not_worse() {
        let (a, _, routes) = make_routes(ChainId::Mainnet);
        let quotes = vec![
            make_quote(&routes[0], 50, 500, 505, TradeType::ExactInput),
            make_quote(&routes[1], 50, 500, 505, TradeType::ExactInput),
            make_quote(&routes[0], 100, 1_000, 1_020, TradeType::ExactInput),
            make_quote(&routes[1], 100, 1_000, 1_000, TradeType::ExactInput),
        ];
        let amount = CurrencyAmount::from_raw(a, 1_000u64);
        let best = get_best_swap_route(
            &amount,
            &[50, 100],
            &quotes,
            TradeType::ExactInput,
            ChainId::Mainnet,
            &make_config(1, 3),
            Some(&FlatGas),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.routes.len(), 1);
        assert_eq!(best.routes[0].percent, 100);
        assert_eq!(best.quote.raw, BigInt::from(1_020));
        assert_eq!(best.quote_gas_adjusted.raw, BigInt::from(1_010));
    }

    #[test]
    fn test_split_beats_single_and_never_reuses_pools() {
        let (a, _, routes) = make_routes(ChainId::Mainnet);
        let quotes = vec![
            // the direct route is best at every slice, but can only be used once
            make_quote(&routes[0], 50, 500, 700, TradeType::ExactInput),
            make_quote(&routes[1], 50, 500, 600, TradeType::ExactInput),
            make_quote(&routes[2], 50, 500, 550, TradeType::ExactInput),
            make_quote(&routes[0], 100, 1_000, 1_100, TradeType::ExactInput),
        ];
        let amount = CurrencyAmount::from_raw(a, 1_000u64);
        let best = get_best_swap_route(
            &amount,
            &[50, 100],
            &quotes,
            TradeType::ExactInput,
            ChainId::Mainnet,
            &make_config(1, 3),
            Some(&FlatGas),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.routes.len(), 2);
        assert_disjoint(&best.routes);
        assert_eq!(best.quote.raw, BigInt::from(1_300));
        assert_eq!(best.quote_gas_adjusted.raw, BigInt::from(1_280));
        assert_eq!(best.estimated_gas_used, 200_000);
        assert_eq!(best.estimated_gas_used_quote_token.raw, BigInt::from(20));
    }

    #[test]
    fn test_exact_output_minimizes() {
        let (_, b, routes) = make_routes(ChainId::Mainnet);
        let quotes = vec![
            make_quote(&routes[0], 100, 1_000, 1_200, TradeType::ExactOutput),
            make_quote(&routes[1], 100, 1_000, 1_100, TradeType::ExactOutput),
        ];
        let amount = CurrencyAmount::from_raw(b, 1_000u64);
        let best = get_best_swap_route(
            &amount,
            &[100],
            &quotes,
            TradeType::ExactOutput,
            ChainId::Mainnet,
            &make_config(1, 3),
            Some(&FlatGas),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.quote.raw, BigInt::from(1_100));
        assert_eq!(best.quote_gas_adjusted.raw, BigInt::from(1_110));
    }

    #[test]
    fn test_max_splits_one_with_only_split_quotes() {
        let (a, _, routes) = make_routes(ChainId::Mainnet);
        let quotes = vec![
            make_quote(&routes[0], 50, 500, 600, TradeType::ExactInput),
            make_quote(&routes[1], 50, 500, 600, TradeType::ExactInput),
        ];
        let amount = CurrencyAmount::from_raw(a, 1_000u64);
        let best = get_best_swap_route(
            &amount,
            &[50, 100],
            &quotes,
            TradeType::ExactInput,
            ChainId::Mainnet,
            &make_config(1, 1),
            Some(&FlatGas),
        )
        .unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn test_min_splits_skips_single_route() {
        let (a, _, routes) = make_routes(ChainId::Mainnet);
        let quotes = vec![
            make_quote(&routes[0], 50, 500, 500, TradeType::ExactInput),
            make_quote(&routes[1], 50, 500, 500, TradeType::ExactInput),
            make_quote(&routes[0], 100, 1_000, 5_000, TradeType::ExactInput),
        ];
        let amount = CurrencyAmount::from_raw(a, 1_000u64);
        let best = get_best_swap_route(
            &amount,
            &[50, 100],
            &quotes,
            TradeType::ExactInput,
            ChainId::Mainnet,
            &make_config(2, 3),
            Some(&FlatGas),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.routes.len(), 2);
    }

    #[test]
    fn test_missing_amount_goes_to_last_route() {
        let (a, _, routes) = make_routes(ChainId::Mainnet);
        let quotes = vec![
            make_quote(&routes[0], 50, 500, 700, TradeType::ExactInput),
            make_quote(&routes[1], 50, 500, 600, TradeType::ExactInput),
        ];
        let amount = CurrencyAmount::from_raw(a, 1_001u64);
        let best = get_best_swap_route(
            &amount,
            &[50, 100],
            &quotes,
            TradeType::ExactInput,
            ChainId::Mainnet,
            &make_config(1, 3),
            Some(&FlatGas),
        )
        .unwrap()
        .unwrap();
        let total: BigInt = best.routes.iter().map(|r| &r.amount.raw).sum();
        assert_eq!(total, BigInt::from(1_001));
        assert_eq!(best.routes[0].amount.raw, BigInt::from(501));
    }

    #[test]
    fn test_l1_chain_rejects_mixed_route_sets() {
        let chain = ChainId::Optimism;
        let a = make_token(chain, "0a", "A");
        let b = make_token(chain, "0b", "B");
        let c = make_token(chain, "0c", "C");
        let v3 = V3Pool::new(a.clone(), c.clone(), FeeAmount::Medium, BigInt::from(1u8) << 96, 1, 0, vec![]).unwrap();
        let mixed = Route::Mixed(
            MixedRoute::new(vec![Pool::V3(v3), Pool::V2(make_pair(&c, &b))], a.clone(), b.clone()).unwrap(),
        );
        let quotes = vec![make_quote(&mixed, 100, 1_000, 990, TradeType::ExactInput)];
        let amount = CurrencyAmount::from_raw(a, 1_000u64);
        let err = get_best_swap_route(
            &amount,
            &[100],
            &quotes,
            TradeType::ExactInput,
            chain,
            &RoutingConfig::for_chain(chain),
            Some(&FlatGas),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "l1_fee_unavailable");
    }

    #[test]
    fn test_no_quotes_is_not_found() {
        let (a, _, _) = make_routes(ChainId::Mainnet);
        let amount = CurrencyAmount::from_raw(a, 1_000u64);
        let best = get_best_swap_route(
            &amount,
            &[25, 50, 75, 100],
            &[],
            TradeType::ExactInput,
            ChainId::Mainnet,
            &make_config(1, 3),
            None,
        )
        .unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn test_find_first_route_respects_cross_protocol() {
        let (_, _, routes) = make_routes(ChainId::Mainnet);
        let used = make_quote(&routes[0], 50, 500, 500, TradeType::ExactInput);
        let candidates = vec![make_quote(&routes[1], 50, 500, 500, TradeType::ExactInput)];
        assert!(find_first_route_not_using_used_pools(&[&used], &candidates, false).is_some());
        assert!(find_first_route_not_using_used_pools(&[&used], &candidates, true).is_none());
        let same = vec![used.clone()];
        assert!(find_first_route_not_using_used_pools(&[&used], &same, false).is_none());
    }

    #[test]
    fn test_three_way_split_within_max_splits() {
        let (a, _, routes) = make_routes(ChainId::Mainnet);
        let quotes = make_three_way_quotes(&routes);
        let amount = CurrencyAmount::from_raw(a, 1_000u64);
        let best = get_best_swap_route(
            &amount,
            &[25, 50, 75, 100],
            &quotes,
            TradeType::ExactInput,
            ChainId::Mainnet,
            &make_config(1, 3),
            Some(&FlatGas),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.routes.len(), 3);
        assert_disjoint(&best.routes);
        assert_eq!(best.quote.raw, BigInt::from(1_230));
        assert_eq!(best.quote_gas_adjusted.raw, BigInt::from(1_200));
        let percents: Vec<u32> = best.routes.iter().map(|r| r.percent).collect();
        assert_eq!(percents, vec![50, 25, 25]);
    }

    #[test]
    fn test_max_splits_caps_three_way_split() {
        let (a, _, routes) = make_routes(ChainId::Mainnet);
        let quotes = make_three_way_quotes(&routes);
        let amount = CurrencyAmount::from_raw(a, 1_000u64);
        let best = get_best_swap_route(
            &amount,
            &[25, 50, 75, 100],
            &quotes,
            TradeType::ExactInput,
            ChainId::Mainnet,
            &make_config(1, 2),
            Some(&FlatGas),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.routes.len(), 2);
        assert_disjoint(&best.routes);
        assert_eq!(best.quote_gas_adjusted.raw, BigInt::from(1_130));
    }

    #[test]
    fn test_search_stops_when_best_lags_two_splits() {
        let (a, _, routes) = make_routes(ChainId::Mainnet);
        // no 2-way split completes, so round 3 is never searched even though
        // 50% direct + two 25% slices would beat the single route
        let quotes = vec![
            make_quote(&routes[0], 100, 1_000, 1_000, TradeType::ExactInput),
            make_quote(&routes[0], 50, 500, 300, TradeType::ExactInput),
            make_quote(&routes[1], 25, 250, 400, TradeType::ExactInput),
            make_quote(&routes[2], 25, 250, 400, TradeType::ExactInput),
            make_quote(&routes[3], 25, 250, 400, TradeType::ExactInput),
        ];
        let amount = CurrencyAmount::from_raw(a, 1_000u64);
        let best = get_best_swap_route(
            &amount,
            &[25, 50, 75, 100],
            &quotes,
            TradeType::ExactInput,
            ChainId::Mainnet,
            &make_config(1, 7),
            Some(&FlatGas),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.routes.len(), 1);
        assert_eq!(best.routes[0].percent, 100);
        assert_eq!(best.quote.raw, BigInt::from(1_000));
    }

    #[test]
    fn test_same_quotes_same_choice() {
        let (a, _, routes) = make_routes(ChainId::Mainnet);
        let quotes = make_three_way_quotes(&routes);
        let amount = CurrencyAmount::from_raw(a, 1_000u64);
        let run = || {
            get_best_swap_route(
                &amount,
                &[25, 50, 75, 100],
                &quotes,
                TradeType::ExactInput,
                ChainId::Mainnet,
                &make_config(1, 7),
                Some(&FlatGas),
            )
            .unwrap()
            .unwrap()
        };
        let first = run();
        let second = run();
        assert_eq!(pool_sets(&first), pool_sets(&second));
        assert_eq!(first.quote_gas_adjusted.raw, second.quote_gas_adjusted.raw);
    }

    #[test]
    fn test_exact_output_missing_amount_goes_to_last_route() {
        let (_, b, routes) = make_routes(ChainId::Mainnet);
        let quotes = vec![
            make_exact_out_quote(&routes[0], 50, 500, 400),
            make_exact_out_quote(&routes[1], 50, 500, 450),
        ];
        let amount = CurrencyAmount::from_raw(b.clone(), 1_001u64);
        let best = get_best_swap_route(
            &amount,
            &[50, 100],
            &quotes,
            TradeType::ExactOutput,
            ChainId::Mainnet,
            &make_config(1, 3),
            Some(&FlatGas),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.routes.len(), 2);
        let total: BigInt = best.routes.iter().map(|r| &r.amount.raw).sum();
        assert_eq!(total, BigInt::from(1_001));
        assert_eq!(best.routes[0].amount.raw, BigInt::from(501));
        assert_eq!(best.routes[0].amount.currency, b);
        assert_eq!(best.quote_gas_adjusted.raw, BigInt::from(870));
    }
}
