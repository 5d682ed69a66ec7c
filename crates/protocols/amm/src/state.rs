//! AMM State Types
//!
//! Pool snapshots for constant-product pairs and concentrated-liquidity pools,
//! and the quoting entry points the router calls on them.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use router_core::amounts::bigint_string;
use router_core::{Address, ChainId, CurrencyAmount, Fraction, Price, Protocol, Token};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::address::{compute_pair_address, compute_pool_address};
use crate::calculator;
use crate::v3::swap::{simulate_swap, SwapState};
use crate::v3::tick_list;

/// Concentrated-liquidity fee tier in hundredths of a bip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FeeAmount {
    Lowest,
    Low,
    Medium,
    High,
}

impl FeeAmount {
    /// Tiers in the order speculative direct pools are synthesised.
    pub const ALL: [FeeAmount; 4] = [
        FeeAmount::High,
        FeeAmount::Medium,
        FeeAmount::Low,
        FeeAmount::Lowest,
    ];

    pub fn pips(&self) -> u32 {
        match self {
            FeeAmount::Lowest => 100,
            FeeAmount::Low => 500,
            FeeAmount::Medium => 3000,
            FeeAmount::High => 10_000,
        }
    }

    pub fn tick_spacing(&self) -> i32 {
        match self {
            FeeAmount::Lowest => 1,
            FeeAmount::Low => 10,
            FeeAmount::Medium => 60,
            FeeAmount::High => 200,
        }
    }
}

impl TryFrom<u32> for FeeAmount {
    type Error = AmmError;

    fn try_from(pips: u32) -> Result<Self, Self::Error> {
        match pips {
            100 => Ok(FeeAmount::Lowest),
            500 => Ok(FeeAmount::Low),
            3000 => Ok(FeeAmount::Medium),
            10_000 => Ok(FeeAmount::High),
            other => Err(AmmError::InvalidFee { fee: other.to_string() }),
        }
    }
}

impl From<FeeAmount> for u32 {
    fn from(f: FeeAmount) -> u32 {
        f.pips()
    }
}

impl FromStr for FeeAmount {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pips: u32 = s
            .trim()
            .parse()
            .map_err(|_| AmmError::InvalidFee { fee: s.to_string() })?;
        FeeAmount::try_from(pips)
    }
}

impl fmt::Display for FeeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pips())
    }
}

/// Initialized tick of a concentrated-liquidity pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub index: i32,
    pub liquidity_gross: u128,
    pub liquidity_net: i128,
}

/// Constant-product pair (volatile `x*y=k` or stable `x³y+y³x=k`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub token0: Token,
    pub token1: Token,
    #[serde(with = "bigint_string")]
    pub reserve0: BigInt,
    #[serde(with = "bigint_string")]
    pub reserve1: BigInt,
    #[serde(default)]
    pub stable: bool,
}

impl Pair {
    /// Build a pair, ordering tokens by address.
    pub fn new(
        token_a: Token,
        token_b: Token,
        reserve_a: impl Into<BigInt>,
        reserve_b: impl Into<BigInt>,
        stable: bool,
    ) -> Self {
        let (reserve_a, reserve_b) = (reserve_a.into(), reserve_b.into());
        if token_a.sorts_before(&token_b) {
            Self {
                token0: token_a,
                token1: token_b,
                reserve0: reserve_a,
                reserve1: reserve_b,
                stable,
            }
        } else {
            Self {
                token0: token_b,
                token1: token_a,
                reserve0: reserve_b,
                reserve1: reserve_a,
                stable,
            }
        }
    }

    pub fn address(&self) -> Address {
        compute_pair_address(&self.token0, &self.token1, self.stable)
    }

    pub fn chain_id(&self) -> ChainId {
        self.token0.chain_id
    }

    pub fn involves_token(&self, token: &Token) -> bool {
        *token == self.token0 || *token == self.token1
    }

    pub fn reserve_of(&self, token: &Token) -> Result<&BigInt, AmmError> {
        if *token == self.token0 {
            Ok(&self.reserve0)
        } else if *token == self.token1 {
            Ok(&self.reserve1)
        } else {
            Err(AmmError::TokenNotInPool {
                token: token.address.to_string(),
            })
        }
    }

    /// Mid price of `token` in the other token.
    pub fn price_of(&self, token: &Token) -> Result<Price, AmmError> {
        if self.reserve0.is_zero() || self.reserve1.is_zero() {
            return Err(AmmError::InsufficientReserves);
        }
        if *token == self.token0 {
            Ok(Price::new(
                self.token0.clone(),
                self.token1.clone(),
                self.reserve0.clone(),
                self.reserve1.clone(),
            ))
        } else if *token == self.token1 {
            Ok(Price::new(
                self.token1.clone(),
                self.token0.clone(),
                self.reserve1.clone(),
                self.reserve0.clone(),
            ))
        } else {
            Err(AmmError::TokenNotInPool {
                token: token.address.to_string(),
            })
        }
    }

    fn sides(&self, input: &Token) -> Result<(&Token, &BigInt, &Token, &BigInt), AmmError> {
        if *input == self.token0 {
            Ok((&self.token0, &self.reserve0, &self.token1, &self.reserve1))
        } else if *input == self.token1 {
            Ok((&self.token1, &self.reserve1, &self.token0, &self.reserve0))
        } else {
            Err(AmmError::TokenNotInPool {
                token: input.address.to_string(),
            })
        }
    }

    /// Output for an exact input, and the pair state after the trade.
    pub fn get_output_amount(&self, input: &CurrencyAmount) -> Result<(CurrencyAmount, Pair), AmmError> {
        let (token_in, reserve_in, token_out, reserve_out) = self.sides(&input.currency)?;
        let output = if self.stable {
            calculator::stable_output(
                reserve_in,
                reserve_out,
                &input.raw,
                token_in.decimals,
                token_out.decimals,
            )?
        } else {
            calculator::calculate_output(reserve_in, reserve_out, &input.raw)?
        };
        let next = Pair::new(
            token_in.clone(),
            token_out.clone(),
            reserve_in + &input.raw,
            reserve_out - &output,
            self.stable,
        );
        Ok((CurrencyAmount::from_raw(token_out.clone(), output), next))
    }

    /// Input required for an exact output, and the pair state after the trade.
    pub fn get_input_amount(&self, output: &CurrencyAmount) -> Result<(CurrencyAmount, Pair), AmmError> {
        let (token_out, reserve_out, token_in, reserve_in) = self.sides(&output.currency)?;
        let input = if self.stable {
            calculator::stable_input(
                reserve_in,
                reserve_out,
                &output.raw,
                token_in.decimals,
                token_out.decimals,
            )?
        } else {
            calculator::calculate_input(reserve_in, reserve_out, &output.raw)?
        };
        let next = Pair::new(
            token_in.clone(),
            token_out.clone(),
            reserve_in + &input,
            reserve_out - &output.raw,
            self.stable,
        );
        Ok((CurrencyAmount::from_raw(token_in.clone(), input), next))
    }
}

/// Result of simulating a trade through a concentrated-liquidity pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3SwapResult {
    /// Output (exact input) or input (exact output) amount
    pub amount: CurrencyAmount,
    pub sqrt_price_x96_after: BigInt,
    pub tick_after: i32,
    pub liquidity_after: u128,
    pub initialized_ticks_crossed: u32,
}

/// Concentrated-liquidity pool snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V3Pool {
    pub token0: Token,
    pub token1: Token,
    pub fee: FeeAmount,
    #[serde(with = "bigint_string")]
    pub sqrt_price_x96: BigInt,
    pub liquidity: u128,
    pub tick_current: i32,
    /// Initialized ticks, sorted by index
    #[serde(default)]
    pub ticks: Vec<Tick>,
}

impl V3Pool {
    /// Build a pool, ordering tokens by address and validating state.
    pub fn new(
        token_a: Token,
        token_b: Token,
        fee: FeeAmount,
        sqrt_price_x96: BigInt,
        liquidity: u128,
        tick_current: i32,
        ticks: Vec<Tick>,
    ) -> Result<Self, AmmError> {
        let (token0, token1) = if token_a.sorts_before(&token_b) {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        let pool = Self {
            token0,
            token1,
            fee,
            sqrt_price_x96,
            liquidity,
            tick_current,
            ticks,
        };
        pool.validate()?;
        Ok(pool)
    }

    /// Check the current tick matches the price and the tick list is well formed.
    pub fn validate(&self) -> Result<(), AmmError> {
        let lower = crate::v3::tick_math::get_sqrt_ratio_at_tick(self.tick_current)?;
        let upper = crate::v3::tick_math::get_sqrt_ratio_at_tick(self.tick_current + 1)?;
        if self.sqrt_price_x96 < lower || self.sqrt_price_x96 >= upper {
            return Err(AmmError::InvalidTickData {
                message: format!(
                    "tick {} does not contain sqrt price {}",
                    self.tick_current, self.sqrt_price_x96
                ),
            });
        }
        tick_list::validate(&self.ticks, self.fee.tick_spacing())
    }

    pub fn address(&self) -> Address {
        compute_pool_address(&self.token0, &self.token1, self.fee)
    }

    pub fn chain_id(&self) -> ChainId {
        self.token0.chain_id
    }

    pub fn involves_token(&self, token: &Token) -> bool {
        *token == self.token0 || *token == self.token1
    }

    /// Raw price of token0 in token1: `sqrtP² / 2^192`.
    pub fn token0_price(&self) -> Price {
        let q192 = BigInt::from(1u8) << 192;
        Price::from_rate(
            self.token0.clone(),
            self.token1.clone(),
            Fraction::new(&self.sqrt_price_x96 * &self.sqrt_price_x96, q192),
        )
    }

    pub fn price_of(&self, token: &Token) -> Result<Price, AmmError> {
        if *token == self.token0 {
            Ok(self.token0_price())
        } else if *token == self.token1 {
            self.token0_price().invert().ok_or(AmmError::InsufficientLiquidity)
        } else {
            Err(AmmError::TokenNotInPool {
                token: token.address.to_string(),
            })
        }
    }

    fn result(&self, token: Token, raw: BigInt, state: SwapState) -> V3SwapResult {
        V3SwapResult {
            amount: CurrencyAmount::from_raw(token, raw),
            sqrt_price_x96_after: state.sqrt_price_x96,
            tick_after: state.tick,
            liquidity_after: state.liquidity,
            initialized_ticks_crossed: state.initialized_ticks_crossed,
        }
    }

    /// Output for an exact input, walking initialized ticks.
    pub fn get_output_amount(
        &self,
        input: &CurrencyAmount,
        sqrt_price_limit_x96: Option<BigInt>,
    ) -> Result<V3SwapResult, AmmError> {
        if !self.involves_token(&input.currency) {
            return Err(AmmError::TokenNotInPool {
                token: input.currency.address.to_string(),
            });
        }
        let zero_for_one = input.currency == self.token0;
        let state = simulate_swap(self, zero_for_one, input.raw.clone(), sqrt_price_limit_x96)?;
        let output = -&state.amount_calculated;
        if !output.is_positive() {
            debug!(pool = %self.address(), amount_in = %input.raw, "Input too small for any output");
            return Err(AmmError::InsufficientInputAmount);
        }
        let token_out = if zero_for_one { &self.token1 } else { &self.token0 };
        Ok(self.result(token_out.clone(), output, state))
    }

    /// Input required for an exact output, walking initialized ticks.
    pub fn get_input_amount(
        &self,
        output: &CurrencyAmount,
        sqrt_price_limit_x96: Option<BigInt>,
    ) -> Result<V3SwapResult, AmmError> {
        if !self.involves_token(&output.currency) {
            return Err(AmmError::TokenNotInPool {
                token: output.currency.address.to_string(),
            });
        }
        let zero_for_one = output.currency == self.token1;
        let state = simulate_swap(self, zero_for_one, -&output.raw, sqrt_price_limit_x96)?;
        if !state.amount_specified_remaining.is_zero() {
            debug!(
                pool = %self.address(),
                remaining = %state.amount_specified_remaining,
                "Ran out of liquidity before filling output"
            );
            return Err(AmmError::InsufficientLiquidity);
        }
        let token_in = if zero_for_one { &self.token0 } else { &self.token1 };
        Ok(self.result(token_in.clone(), state.amount_calculated.clone(), state))
    }
}

/// Any pool the router can swap through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol")]
pub enum Pool {
    V2(Pair),
    V3(V3Pool),
}

impl Pool {
    pub fn address(&self) -> Address {
        match self {
            Pool::V2(p) => p.address(),
            Pool::V3(p) => p.address(),
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Pool::V2(_) => Protocol::V2,
            Pool::V3(_) => Protocol::V3,
        }
    }

    pub fn token0(&self) -> &Token {
        match self {
            Pool::V2(p) => &p.token0,
            Pool::V3(p) => &p.token0,
        }
    }

    pub fn token1(&self) -> &Token {
        match self {
            Pool::V2(p) => &p.token1,
            Pool::V3(p) => &p.token1,
        }
    }

    pub fn involves_token(&self, token: &Token) -> bool {
        token == self.token0() || token == self.token1()
    }

    pub fn price_of(&self, token: &Token) -> Result<Price, AmmError> {
        match self {
            Pool::V2(p) => p.price_of(token),
            Pool::V3(p) => p.price_of(token),
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::V2(p) => write!(
                f,
                "{}/{}{}",
                p.token0,
                p.token1,
                if p.stable { "/stable" } else { "" }
            ),
            Pool::V3(p) => write!(f, "{}/{}/{}", p.token0, p.token1, p.fee),
        }
    }
}

/// AMM protocol errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    #[error("Insufficient input amount")]
    InsufficientInputAmount,

    #[error("Insufficient reserves")]
    InsufficientReserves,

    #[error("Insufficient liquidity for swap")]
    InsufficientLiquidity,

    #[error("Tick {tick} out of range")]
    InvalidTick { tick: i32 },

    #[error("Sqrt price {sqrt_price_x96} out of range")]
    InvalidSqrtPrice { sqrt_price_x96: String },

    #[error("Price moved out of range")]
    PriceOutOfRange,

    #[error("Invalid price limit: {message}")]
    PriceLimit { message: String },

    #[error("Token not in pool: {token}")]
    TokenNotInPool { token: String },

    #[error("Invalid tick data: {message}")]
    InvalidTickData { message: String },

    #[error("Unknown fee tier: {fee}")]
    InvalidFee { fee: String },

    #[error("Stable curve did not converge")]
    StableCurveDiverged,

    #[error("Division by zero")]
    DivisionByZero,
}

impl AmmError {
    /// Expected no-quote outcomes that the router swallows.
    pub fn is_no_quote(&self) -> bool {
        matches!(
            self,
            AmmError::InsufficientInputAmount
                | AmmError::InsufficientReserves
                | AmmError::InsufficientLiquidity
                | AmmError::PriceOutOfRange
        )
    }
}

impl From<AmmError> for router_core::Error {
    fn from(e: AmmError) -> Self {
        router_core::RoutingError::PoolMath {
            message: e.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v3::full_math::q96;

    fn make_token(addr: &str, symbol: &str) -> Token {
        Token::new(ChainId::Mainnet, addr, 18, Some(symbol), None)
    }

    #[test]
    fn test_fee_amount_parsing() {
        assert_eq!("3000".parse::<FeeAmount>().unwrap(), FeeAmount::Medium);
        assert_eq!(FeeAmount::try_from(100).unwrap().tick_spacing(), 1);
        assert!("abc".parse::<FeeAmount>().is_err());
        assert!(FeeAmount::try_from(42).is_err());
    }

    #[test]
    fn test_pair_sorts_tokens() {
        let a = make_token("0x02", "A");
        let b = make_token("0x01", "B");
        let pair = Pair::new(a.clone(), b.clone(), 100, 200, false);
        assert_eq!(pair.token0, b);
        assert_eq!(pair.reserve0, BigInt::from(200));
        assert_eq!(pair.reserve_of(&a).unwrap(), &BigInt::from(100));
    }

    #[test]
    fn test_pair_output_updates_reserves() {
        let a = make_token("0x01", "A");
        let b = make_token("0x02", "B");
        let pair = Pair::new(a.clone(), b.clone(), 1_000_000, 1_000_000, false);
        let (out, next) = pair
            .get_output_amount(&CurrencyAmount::from_raw(a.clone(), 1000))
            .unwrap();
        assert_eq!(out.currency, b);
        assert_eq!(out.raw, BigInt::from(996));
        assert_eq!(next.reserve_of(&a).unwrap(), &BigInt::from(1_001_000));
        assert_eq!(next.reserve_of(&b).unwrap(), &BigInt::from(999_004));
    }

    #[test]
    fn test_pair_input_amount() {
        let a = make_token("0x01", "A");
        let b = make_token("0x02", "B");
        let pair = Pair::new(a.clone(), b.clone(), 1_000_000, 1_000_000, false);
        let (input, _) = pair
            .get_input_amount(&CurrencyAmount::from_raw(b, 996))
            .unwrap();
        assert_eq!(input.currency, a);
        // 1_000_000 * 996 * 1000 / (999_004 * 997) + 1
        assert_eq!(input.raw, BigInt::from(1000));
    }

    #[test]
    fn test_pair_rejects_foreign_token() {
        let a = make_token("0x01", "A");
        let b = make_token("0x02", "B");
        let c = make_token("0x03", "C");
        let pair = Pair::new(a, b, 100, 100, false);
        let err = pair
            .get_output_amount(&CurrencyAmount::from_raw(c, 1))
            .unwrap_err();
        assert!(matches!(err, AmmError::TokenNotInPool { .. }));
    }

    #[test]
    fn test_v3_pool_validates_tick() {
        let a = make_token("0x01", "A");
        let b = make_token("0x02", "B");
        assert!(V3Pool::new(a.clone(), b.clone(), FeeAmount::Medium, q96(), 1, 0, vec![]).is_ok());
        assert!(V3Pool::new(a, b, FeeAmount::Medium, q96(), 1, 5, vec![]).is_err());
    }

    #[test]
    fn test_v3_token0_price_at_parity() {
        let a = make_token("0x01", "A");
        let b = make_token("0x02", "B");
        let pool = V3Pool::new(a.clone(), b, FeeAmount::Low, q96(), 1, 0, vec![]).unwrap();
        assert_eq!(pool.price_of(&a).unwrap().rate, Fraction::one());
    }

    #[test]
    fn test_pool_display() {
        let a = make_token("0x01", "A");
        let b = make_token("0x02", "B");
        let pool = Pool::V3(V3Pool::new(a, b, FeeAmount::Medium, q96(), 1, 0, vec![]).unwrap());
        assert_eq!(pool.to_string(), "A/B/3000");
    }

    #[test]
    fn test_no_quote_classification() {
        assert!(AmmError::InsufficientReserves.is_no_quote());
        assert!(AmmError::InsufficientInputAmount.is_no_quote());
        assert!(!AmmError::InvalidTick { tick: 1 }.is_no_quote());
    }
}
