//! Routes: ordered pool sequences connecting an input token to an output token

use std::fmt;

use amm::{Pair, Pool, V3Pool};
use router_core::{Address, Protocol, RoutingError, Token};
use serde::Serialize;

/// A pool the route enumerator can walk through
pub trait RoutablePool: Clone {
    fn pool_address(&self) -> Address;
    fn contains(&self, token: &Token) -> bool;
    fn token0(&self) -> &Token;
    fn token1(&self) -> &Token;

    /// The token across the pool from `token`.
    fn counterpart(&self, token: &Token) -> Option<&Token> {
        if token == self.token0() {
            Some(self.token1())
        } else if token == self.token1() {
            Some(self.token0())
        } else {
            None
        }
    }
}

impl RoutablePool for Pair {
    fn pool_address(&self) -> Address {
        self.address()
    }
    fn contains(&self, token: &Token) -> bool {
        self.involves_token(token)
    }
    fn token0(&self) -> &Token {
        &self.token0
    }
    fn token1(&self) -> &Token {
        &self.token1
    }
}

impl RoutablePool for V3Pool {
    fn pool_address(&self) -> Address {
        self.address()
    }
    fn contains(&self, token: &Token) -> bool {
        self.involves_token(token)
    }
    fn token0(&self) -> &Token {
        &self.token0
    }
    fn token1(&self) -> &Token {
        &self.token1
    }
}

impl RoutablePool for Pool {
    fn pool_address(&self) -> Address {
        self.address()
    }
    fn contains(&self, token: &Token) -> bool {
        self.involves_token(token)
    }
    fn token0(&self) -> &Token {
        Pool::token0(self)
    }
    fn token1(&self) -> &Token {
        Pool::token1(self)
    }
}

/// Walk `pools` from `input`, returning the token path, or an error if a
/// pool does not continue from the previous token or the walk ends elsewhere.
fn token_path<P: RoutablePool>(pools: &[P], input: &Token, output: &Token) -> Result<Vec<Token>, RoutingError> {
    if pools.is_empty() {
        return Err(RoutingError::InvalidRoute {
            message: "route has no pools".to_string(),
        });
    }
    let mut path = vec![input.clone()];
    let mut current = input.clone();
    for pool in pools {
        let next = pool.counterpart(&current).ok_or_else(|| RoutingError::InvalidRoute {
            message: format!("pool {} does not contain {}", pool.pool_address(), current),
        })?;
        current = next.clone();
        path.push(current.clone());
    }
    if current != *output {
        return Err(RoutingError::InvalidRoute {
            message: format!("route ends at {} instead of {}", current, output),
        });
    }
    Ok(path)
}

/// Route through constant-product pairs only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct V2Route {
    pub pairs: Vec<Pair>,
    pub path: Vec<Token>,
    pub input: Token,
    pub output: Token,
}

impl V2Route {
    pub fn new(pairs: Vec<Pair>, input: Token, output: Token) -> Result<Self, RoutingError> {
        let path = token_path(&pairs, &input, &output)?;
        Ok(Self {
            pairs,
            path,
            input,
            output,
        })
    }
}

/// Route through concentrated-liquidity pools only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct V3Route {
    pub pools: Vec<V3Pool>,
    pub path: Vec<Token>,
    pub input: Token,
    pub output: Token,
}

impl V3Route {
    pub fn new(pools: Vec<V3Pool>, input: Token, output: Token) -> Result<Self, RoutingError> {
        let path = token_path(&pools, &input, &output)?;
        Ok(Self {
            pools,
            path,
            input,
            output,
        })
    }
}

/// Route mixing pairs and concentrated-liquidity pools (exact input only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixedRoute {
    pub pools: Vec<Pool>,
    pub path: Vec<Token>,
    pub input: Token,
    pub output: Token,
}

impl MixedRoute {
    pub fn new(pools: Vec<Pool>, input: Token, output: Token) -> Result<Self, RoutingError> {
        let path = token_path(&pools, &input, &output)?;
        Ok(Self {
            pools,
            path,
            input,
            output,
        })
    }

    /// Whether the pools actually combine both kinds.
    pub fn is_mixed(&self) -> bool {
        let v3 = self.pools.iter().filter(|p| matches!(p, Pool::V3(_))).count();
        v3 > 0 && v3 < self.pools.len()
    }

    /// Consecutive runs of same-kind pools, in route order.
    pub fn sections(&self) -> Vec<&[Pool]> {
        let mut sections = Vec::new();
        let mut start = 0;
        for i in 1..=self.pools.len() {
            let boundary = i == self.pools.len()
                || self.pools[i].protocol() != self.pools[start].protocol();
            if boundary {
                sections.push(&self.pools[start..i]);
                start = i;
            }
        }
        sections
    }
}

/// A route tagged by the kind of pools it passes through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "protocol")]
pub enum Route {
    V2(V2Route),
    V3(V3Route),
    Mixed(MixedRoute),
}

impl Route {
    pub fn protocol(&self) -> Protocol {
        match self {
            Route::V2(_) => Protocol::V2,
            Route::V3(_) => Protocol::V3,
            Route::Mixed(_) => Protocol::Mixed,
        }
    }

    pub fn input(&self) -> &Token {
        match self {
            Route::V2(r) => &r.input,
            Route::V3(r) => &r.input,
            Route::Mixed(r) => &r.input,
        }
    }

    pub fn output(&self) -> &Token {
        match self {
            Route::V2(r) => &r.output,
            Route::V3(r) => &r.output,
            Route::Mixed(r) => &r.output,
        }
    }

    pub fn path(&self) -> &[Token] {
        match self {
            Route::V2(r) => &r.path,
            Route::V3(r) => &r.path,
            Route::Mixed(r) => &r.path,
        }
    }

    pub fn hops(&self) -> usize {
        match self {
            Route::V2(r) => r.pairs.len(),
            Route::V3(r) => r.pools.len(),
            Route::Mixed(r) => r.pools.len(),
        }
    }

    pub fn pool_addresses(&self) -> Vec<Address> {
        match self {
            Route::V2(r) => r.pairs.iter().map(Pair::address).collect(),
            Route::V3(r) => r.pools.iter().map(V3Pool::address).collect(),
            Route::Mixed(r) => r.pools.iter().map(Pool::address).collect(),
        }
    }

    /// Pools as the protocol-agnostic enum, in route order.
    pub fn pools(&self) -> Vec<Pool> {
        match self {
            Route::V2(r) => r.pairs.iter().cloned().map(Pool::V2).collect(),
            Route::V3(r) => r.pools.iter().cloned().map(Pool::V3).collect(),
            Route::Mixed(r) => r.pools.clone(),
        }
    }
}

/// Renders `USDC -- [0x12ab..] 0.3% --> WETH -- [V2] --> DAI`.
impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path();
        write!(f, "[{}] {}", self.protocol(), path[0])?;
        for (pool, token) in self.pools().iter().zip(path.iter().skip(1)) {
            let label = match pool {
                Pool::V3(p) => format!("{}%", p.fee.pips() as f64 / 10_000.0),
                Pool::V2(p) if p.stable => "V2 stable".to_string(),
                Pool::V2(_) => "V2".to_string(),
            };
            write!(f, " -- {} --> {}", label, token)?;
        }
        Ok(())
    }
}

/// Comma-separated rendering of several routes for logs.
pub fn routes_to_string(routes: &[Route]) -> String {
    routes
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
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

    fn make_v3(a: &Token, b: &Token) -> V3Pool {
        V3Pool::new(
            a.clone(),
            b.clone(),
            FeeAmount::Medium,
            BigInt::from(1u8) << 96,
            10u128.pow(18),
            0,
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_v2_route_path() {
        let (a, b, c) = (make_token("0x0a", "A"), make_token("0x0b", "B"), make_token("0x0c", "C"));
        let route = V2Route::new(vec![make_pair(&a, &b), make_pair(&b, &c)], a.clone(), c.clone()).unwrap();
        assert_eq!(route.path, vec![a, b, c]);
    }

    #[test]
    fn test_disconnected_route_rejected() {
        let (a, b, c, d) = (
            make_token("0x0a", "A"),
            make_token("0x0b", "B"),
            make_token("0x0c", "C"),
            make_token("0x0d", "D"),
        );
        assert!(V2Route::new(vec![make_pair(&a, &b), make_pair(&c, &d)], a.clone(), d).is_err());
        assert!(V2Route::new(vec![make_pair(&a, &b)], a, c).is_err());
    }

    #[test]
    fn test_mixed_sections() {
        let (a, b, c, d) = (
            make_token("0x0a", "A"),
            make_token("0x0b", "B"),
            make_token("0x0c", "C"),
            make_token("0x0d", "D"),
        );
        let route = MixedRoute::new(
            vec![
                Pool::V3(make_v3(&a, &b)),
                Pool::V3(make_v3(&b, &c)),
                Pool::V2(make_pair(&c, &d)),
            ],
            a,
            d,
        )
        .unwrap();
        assert!(route.is_mixed());
        let sections = route.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].len(), 2);
        assert_eq!(sections[1].len(), 1);
    }

    #[test]
    fn test_route_display() {
        let (a, b) = (make_token("0x0a", "A"), make_token("0x0b", "B"));
        let route = Route::V3(V3Route::new(vec![make_v3(&a, &b)], a, b).unwrap());
        assert_eq!(route.to_string(), "[V3] A -- 0.3% --> B");
        assert_eq!(route.hops(), 1);
    }
}
