//! Route enumeration over a candidate pool set

use std::collections::HashSet;

use amm::{Pair, Pool, V3Pool};
use router_core::Token;
use tracing::info;

use crate::entities::{MixedRoute, RoutablePool, Route, V2Route, V3Route};

/// Every simple path of at most `max_hops` pools from `token_in` to `token_out`.
///
/// Depth-first with backtracking: no pool and no token is visited twice on
/// one path, and a path is emitted as soon as it reaches `token_out`.
pub fn compute_all_paths<P: RoutablePool>(
    token_in: &Token,
    token_out: &Token,
    pools: &[P],
    max_hops: usize,
) -> Vec<Vec<P>> {
    let mut paths = Vec::new();
    let mut current: Vec<P> = Vec::new();
    let mut used = vec![false; pools.len()];
    let mut visited: HashSet<Token> = HashSet::from([token_in.clone()]);

    #[allow(clippy::too_many_arguments)]
    fn walk<P: RoutablePool>(
        pools: &[P],
        token_out: &Token,
        max_hops: usize,
        frontier: &Token,
        current: &mut Vec<P>,
        used: &mut [bool],
        visited: &mut HashSet<Token>,
        paths: &mut Vec<Vec<P>>,
    ) {
        if current.len() >= max_hops {
            return;
        }
        for (i, pool) in pools.iter().enumerate() {
            if used[i] {
                continue;
            }
            let Some(next) = pool.counterpart(frontier) else {
                continue;
            };
            if visited.contains(next) {
                continue;
            }

            current.push(pool.clone());
            if next == token_out {
                paths.push(current.clone());
            } else {
                used[i] = true;
                visited.insert(next.clone());
                walk(pools, token_out, max_hops, next, current, used, visited, paths);
                visited.remove(next);
                used[i] = false;
            }
            current.pop();
        }
    }

    walk(
        pools,
        token_out,
        max_hops,
        token_in,
        &mut current,
        &mut used,
        &mut visited,
        &mut paths,
    );
    paths
}

pub fn compute_all_v3_routes(token_in: &Token, token_out: &Token, pools: &[V3Pool], max_hops: usize) -> Vec<Route> {
    let routes: Vec<Route> = compute_all_paths(token_in, token_out, pools, max_hops)
        .into_iter()
        .filter_map(|path| V3Route::new(path, token_in.clone(), token_out.clone()).ok())
        .map(Route::V3)
        .collect();
    info!("Computed {} possible V3 routes", routes.len());
    routes
}

pub fn compute_all_v2_routes(token_in: &Token, token_out: &Token, pairs: &[Pair], max_hops: usize) -> Vec<Route> {
    let routes: Vec<Route> = compute_all_paths(token_in, token_out, pairs, max_hops)
        .into_iter()
        .filter_map(|path| V2Route::new(path, token_in.clone(), token_out.clone()).ok())
        .map(Route::V2)
        .collect();
    info!("Computed {} possible V2 routes", routes.len());
    routes
}

/// Mixed routes that genuinely combine both pool kinds; single-protocol
/// paths are already covered by the dedicated searches.
pub fn compute_all_mixed_routes(token_in: &Token, token_out: &Token, pools: &[Pool], max_hops: usize) -> Vec<Route> {
    let routes: Vec<Route> = compute_all_paths(token_in, token_out, pools, max_hops)
        .into_iter()
        .filter_map(|path| MixedRoute::new(path, token_in.clone(), token_out.clone()).ok())
        .filter(MixedRoute::is_mixed)
        .map(Route::Mixed)
        .collect();
    info!("Computed {} possible mixed routes", routes.len());
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm::FeeAmount;
    use num_bigint::BigInt;
    use router_core::ChainId;

    fn make_token(addr: &str, symbol: &str) -> Token {
        Token::new(ChainId::Mainnet, addr, 18, Some(symbol), None)
    }

    fn make_pair(a: &Token, b: &Token) -> Pair {
        Pair::new(a.clone(), b.clone(), 1_000_000u64, 1_000_000u64, false)
    }

    fn make_v3(a: &Token, b: &Token, fee: FeeAmount) -> V3Pool {
        V3Pool::new(a.clone(), b.clone(), fee, BigInt::from(1u8) << 96, 10u128.pow(18), 0, vec![]).unwrap()
    }

    #[test]
    fn test_direct_and_two_hop_paths() {
        let (a, b, c) = (make_token("0x0a", "A"), make_token("0x0b", "B"), make_token("0x0c", "C"));
        let pairs = vec![make_pair(&a, &b), make_pair(&a, &c), make_pair(&c, &b)];
        let routes = compute_all_v2_routes(&a, &b, &pairs, 3);
        assert_eq!(routes.len(), 2);
        assert!(routes.iter().any(|r| r.hops() == 1));
        assert!(routes.iter().any(|r| r.hops() == 2));
    }

    #[test]
    fn test_max_hops_bound() {
        let (a, b, c, d) = (
            make_token("0x0a", "A"),
            make_token("0x0b", "B"),
            make_token("0x0c", "C"),
            make_token("0x0d", "D"),
        );
        let pairs = vec![make_pair(&a, &c), make_pair(&c, &d), make_pair(&d, &b)];
        assert_eq!(compute_all_v2_routes(&a, &b, &pairs, 3).len(), 1);
        assert!(compute_all_v2_routes(&a, &b, &pairs, 2).is_empty());
    }

    #[test]
    fn test_no_token_revisited() {
        let (a, b, c) = (make_token("0x0a", "A"), make_token("0x0b", "B"), make_token("0x0c", "C"));
        // two A/C pools: A -> C -> A -> ... must never happen
        let pools = vec![
            make_v3(&a, &c, FeeAmount::Medium),
            make_v3(&a, &c, FeeAmount::Low),
            make_v3(&c, &b, FeeAmount::Medium),
        ];
        let routes = compute_all_v3_routes(&a, &b, &pools, 4);
        assert_eq!(routes.len(), 2);
        for route in &routes {
            let path = route.path();
            let unique: HashSet<&Token> = path.iter().collect();
            assert_eq!(unique.len(), path.len());
            let addresses = route.pool_addresses();
            let unique: HashSet<_> = addresses.iter().collect();
            assert_eq!(unique.len(), addresses.len());
        }
    }

    #[test]
    fn test_mixed_routes_exclude_single_protocol_paths() {
        let (a, b, c) = (make_token("0x0a", "A"), make_token("0x0b", "B"), make_token("0x0c", "C"));
        let pools = vec![
            Pool::V3(make_v3(&a, &b, FeeAmount::Medium)),
            Pool::V3(make_v3(&a, &c, FeeAmount::Medium)),
            Pool::V2(make_pair(&c, &b)),
            Pool::V2(make_pair(&a, &c)),
        ];
        let routes = compute_all_mixed_routes(&a, &b, &pools, 3);
        // A-v3-C-v2-B is mixed; A-v2-C-v2-B and direct A-v3-B are not
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].protocol(), router_core::Protocol::Mixed);
    }
}
