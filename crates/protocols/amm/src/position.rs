//! Liquidity positions and the swap-to-ratio arithmetic built on them

use num_bigint::BigInt;
use num_traits::Zero;
use router_core::{CurrencyAmount, Fraction};
use serde::{Deserialize, Serialize};

use crate::constants::v3::{MAX_TICK, MIN_TICK};
use crate::state::{AmmError, V3Pool};
use crate::v3::{get_amount0_delta, get_amount1_delta, get_sqrt_ratio_at_tick};

/// A tick range on a concentrated-liquidity pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub pool: V3Pool,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl Position {
    pub fn new(pool: V3Pool, tick_lower: i32, tick_upper: i32) -> Result<Self, AmmError> {
        let spacing = pool.fee.tick_spacing();
        if tick_lower >= tick_upper {
            return Err(AmmError::InvalidTick { tick: tick_lower });
        }
        for tick in [tick_lower, tick_upper] {
            if tick < MIN_TICK || tick > MAX_TICK || tick % spacing != 0 {
                return Err(AmmError::InvalidTick { tick });
            }
        }
        Ok(Self {
            pool,
            tick_lower,
            tick_upper,
        })
    }

    /// Deposit ratio the position needs at `sqrt_price_x96`, as token0 per
    /// token1 when `zero_for_one`, token1 per token0 otherwise.
    ///
    /// Zero when the price sits outside the range (strictly inside is required,
    /// since a boundary price needs only one of the two tokens).
    pub fn optimal_ratio(&self, sqrt_price_x96: &BigInt, zero_for_one: bool) -> Result<Fraction, AmmError> {
        let upper = get_sqrt_ratio_at_tick(self.tick_upper)?;
        let lower = get_sqrt_ratio_at_tick(self.tick_lower)?;
        if *sqrt_price_x96 >= upper || *sqrt_price_x96 <= lower {
            return Ok(Fraction::zero());
        }

        let precision = BigInt::from(10u64.pow(18));
        let amount0 = get_amount0_delta(sqrt_price_x96, &upper, &precision, true)?;
        let amount1 = get_amount1_delta(sqrt_price_x96, &lower, &precision, true)?;
        if amount0.is_zero() || amount1.is_zero() {
            return Ok(Fraction::zero());
        }
        let ratio = Fraction::new(amount0, amount1);
        if zero_for_one {
            Ok(ratio)
        } else {
            ratio.invert().ok_or(AmmError::DivisionByZero)
        }
    }
}

/// Amount of the input token to swap so the remaining balances match
/// `optimal_ratio` (output per input) after receiving output at `input_price`.
///
/// `amount = (input - ratio * output) / (ratio * price + 1)`; negative means
/// the input balance is already short and is reported as an error.
pub fn calculate_ratio_amount_in(
    optimal_ratio: &Fraction,
    input_token_price: &Fraction,
    input_balance: &CurrencyAmount,
    output_balance: &CurrencyAmount,
) -> Result<CurrencyAmount, AmmError> {
    let numerator = input_balance
        .as_fraction()
        .sub(&optimal_ratio.mul(&output_balance.as_fraction()));
    let denominator = optimal_ratio.mul(input_token_price).add(&Fraction::one());
    let amount = numerator
        .checked_div(&denominator)
        .ok_or(AmmError::DivisionByZero)?;
    if amount.is_negative() {
        return Err(AmmError::InsufficientInputAmount);
    }
    Ok(CurrencyAmount::from_raw(
        input_balance.currency.clone(),
        amount.quotient(),
    ))
}
