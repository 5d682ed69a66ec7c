//! Token amount deltas and next-price computation for Q64.96 sqrt prices

use num_bigint::BigInt;
use num_traits::Zero;

use crate::constants::v3::RESOLUTION;
use crate::state::AmmError;
use crate::v3::full_math::{div_rounding_up, max_u160, max_u256, mul_div, mul_div_rounding_up, q96};

fn sorted<'a>(a: &'a BigInt, b: &'a BigInt) -> (&'a BigInt, &'a BigInt) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// Amount of token0 between two prices for a liquidity.
pub fn get_amount0_delta(
    sqrt_ratio_a: &BigInt,
    sqrt_ratio_b: &BigInt,
    liquidity: &BigInt,
    round_up: bool,
) -> Result<BigInt, AmmError> {
    let (lower, upper) = sorted(sqrt_ratio_a, sqrt_ratio_b);
    if lower.is_zero() {
        return Err(AmmError::InvalidSqrtPrice {
            sqrt_price_x96: lower.to_string(),
        });
    }
    let numerator1 = liquidity << RESOLUTION;
    let numerator2 = upper - lower;

    if round_up {
        let inner = mul_div_rounding_up(&numerator1, &numerator2, upper)?;
        div_rounding_up(&inner, lower)
    } else {
        Ok(mul_div(&numerator1, &numerator2, upper)? / lower)
    }
}

/// Amount of token1 between two prices for a liquidity.
pub fn get_amount1_delta(
    sqrt_ratio_a: &BigInt,
    sqrt_ratio_b: &BigInt,
    liquidity: &BigInt,
    round_up: bool,
) -> Result<BigInt, AmmError> {
    let (lower, upper) = sorted(sqrt_ratio_a, sqrt_ratio_b);
    let diff = upper - lower;
    if round_up {
        mul_div_rounding_up(liquidity, &diff, &q96())
    } else {
        mul_div(liquidity, &diff, &q96())
    }
}

/// Price after adding (or removing) `amount` of token0.
fn next_from_amount0_rounding_up(
    sqrt_price: &BigInt,
    liquidity: &BigInt,
    amount: &BigInt,
    add: bool,
) -> Result<BigInt, AmmError> {
    if amount.is_zero() {
        return Ok(sqrt_price.clone());
    }
    let numerator1 = liquidity << RESOLUTION;
    let product = amount * sqrt_price;

    if add {
        let denominator = &numerator1 + &product;
        if product <= max_u256() && denominator <= max_u256() {
            return mul_div_rounding_up(&numerator1, sqrt_price, &denominator);
        }
        let fallback = &numerator1 / sqrt_price + amount;
        div_rounding_up(&numerator1, &fallback)
    } else {
        if product > max_u256() || numerator1 <= product {
            return Err(AmmError::PriceOutOfRange);
        }
        let denominator = &numerator1 - &product;
        mul_div_rounding_up(&numerator1, sqrt_price, &denominator)
    }
}

/// Price after adding (or removing) `amount` of token1.
fn next_from_amount1_rounding_down(
    sqrt_price: &BigInt,
    liquidity: &BigInt,
    amount: &BigInt,
    add: bool,
) -> Result<BigInt, AmmError> {
    if add {
        let quotient = if *amount <= max_u160() {
            (amount << RESOLUTION) / liquidity
        } else {
            mul_div(amount, &q96(), liquidity)?
        };
        Ok(sqrt_price + quotient)
    } else {
        let quotient = mul_div_rounding_up(amount, &q96(), liquidity)?;
        if *sqrt_price <= quotient {
            return Err(AmmError::PriceOutOfRange);
        }
        Ok(sqrt_price - quotient)
    }
}

/// Price reached after swapping `amount_in` into the pool.
pub fn get_next_sqrt_price_from_input(
    sqrt_price: &BigInt,
    liquidity: &BigInt,
    amount_in: &BigInt,
    zero_for_one: bool,
) -> Result<BigInt, AmmError> {
    if sqrt_price.is_zero() || liquidity.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    if zero_for_one {
        next_from_amount0_rounding_up(sqrt_price, liquidity, amount_in, true)
    } else {
        next_from_amount1_rounding_down(sqrt_price, liquidity, amount_in, true)
    }
}

/// Price reached after taking `amount_out` out of the pool.
pub fn get_next_sqrt_price_from_output(
    sqrt_price: &BigInt,
    liquidity: &BigInt,
    amount_out: &BigInt,
    zero_for_one: bool,
) -> Result<BigInt, AmmError> {
    if sqrt_price.is_zero() || liquidity.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    if zero_for_one {
        next_from_amount1_rounding_down(sqrt_price, liquidity, amount_out, false)
    } else {
        next_from_amount0_rounding_up(sqrt_price, liquidity, amount_out, false)
    }
}
