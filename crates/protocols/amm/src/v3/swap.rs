//! Tick-walk swap simulation over a pool snapshot

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::constants::v3::{MAX_TICK, MIN_TICK};
use crate::state::{AmmError, V3Pool};
use crate::v3::swap_math::compute_swap_step;
use crate::v3::tick_list::{get_tick, next_initialized_tick_within_one_word};
use crate::v3::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, max_sqrt_ratio, min_sqrt_ratio};

/// Pool state at the end of a simulated swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapState {
    /// Unfilled part of the specified amount
    pub amount_specified_remaining: BigInt,
    /// Negative output for exact input, positive input for exact output
    pub amount_calculated: BigInt,
    pub sqrt_price_x96: BigInt,
    pub tick: i32,
    pub liquidity: u128,
    pub initialized_ticks_crossed: u32,
}

/// Swap `amount_specified` (positive: exact input, negative: exact output)
/// through the pool until filled or the price limit is reached.
pub fn simulate_swap(
    pool: &V3Pool,
    zero_for_one: bool,
    amount_specified: BigInt,
    sqrt_price_limit_x96: Option<BigInt>,
) -> Result<SwapState, AmmError> {
    let limit = match sqrt_price_limit_x96 {
        Some(limit) => limit,
        None if zero_for_one => min_sqrt_ratio() + 1,
        None => max_sqrt_ratio() - 1,
    };
    if zero_for_one {
        if limit <= min_sqrt_ratio() || limit >= pool.sqrt_price_x96 {
            return Err(AmmError::PriceLimit {
                message: "limit must be below the current price".to_string(),
            });
        }
    } else if limit >= max_sqrt_ratio() || limit <= pool.sqrt_price_x96 {
        return Err(AmmError::PriceLimit {
            message: "limit must be above the current price".to_string(),
        });
    }

    let exact_input = !amount_specified.is_negative();
    let spacing = pool.fee.tick_spacing();
    let mut state = SwapState {
        amount_specified_remaining: amount_specified,
        amount_calculated: BigInt::zero(),
        sqrt_price_x96: pool.sqrt_price_x96.clone(),
        tick: pool.tick_current,
        liquidity: pool.liquidity,
        initialized_ticks_crossed: 0,
    };

    while !state.amount_specified_remaining.is_zero() && state.sqrt_price_x96 != limit {
        let sqrt_price_start = state.sqrt_price_x96.clone();
        let (tick_next, initialized) =
            next_initialized_tick_within_one_word(&pool.ticks, state.tick, zero_for_one, spacing);
        let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
        let sqrt_price_next = get_sqrt_ratio_at_tick(tick_next)?;

        let target = if (zero_for_one && sqrt_price_next < limit)
            || (!zero_for_one && sqrt_price_next > limit)
        {
            limit.clone()
        } else {
            sqrt_price_next.clone()
        };

        let step = compute_swap_step(
            &state.sqrt_price_x96,
            &target,
            &BigInt::from(state.liquidity),
            &state.amount_specified_remaining,
            pool.fee.pips(),
        )?;
        state.sqrt_price_x96 = step.sqrt_ratio_next_x96;

        if exact_input {
            state.amount_specified_remaining -= &step.amount_in + &step.fee_amount;
            state.amount_calculated -= &step.amount_out;
        } else {
            state.amount_specified_remaining += &step.amount_out;
            state.amount_calculated += &step.amount_in + &step.fee_amount;
        }

        if state.sqrt_price_x96 == sqrt_price_next {
            if initialized {
                let mut net = get_tick(&pool.ticks, tick_next)?.liquidity_net;
                if zero_for_one {
                    net = -net;
                }
                state.liquidity = apply_liquidity_delta(state.liquidity, net)?;
                state.initialized_ticks_crossed += 1;
            }
            state.tick = if zero_for_one { tick_next - 1 } else { tick_next };
        } else if state.sqrt_price_x96 != sqrt_price_start {
            state.tick = get_tick_at_sqrt_ratio(&state.sqrt_price_x96)?;
        }
    }

    Ok(state)
}

fn apply_liquidity_delta(liquidity: u128, delta: i128) -> Result<u128, AmmError> {
    let next = BigInt::from(liquidity) + BigInt::from(delta);
    next.to_u128().ok_or_else(|| AmmError::InvalidTickData {
        message: "liquidity underflow while crossing tick".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FeeAmount, Tick};
    use crate::v3::full_math::q96;
    use router_core::{ChainId, Token};

    fn make_pool(liquidity: u128, ticks: Vec<Tick>) -> V3Pool {
        let a = Token::new(ChainId::Mainnet, "0x01", 18, Some("A"), None);
        let b = Token::new(ChainId::Mainnet, "0x02", 18, Some("B"), None);
        V3Pool::new(a, b, FeeAmount::Medium, q96(), liquidity, 0, ticks).unwrap()
    }

    fn make_ranged_pool() -> V3Pool {
        let l: u128 = 10u128.pow(20);
        make_pool(
            l,
            vec![
                Tick { index: -600, liquidity_gross: l, liquidity_net: l as i128 },
                Tick { index: 600, liquidity_gross: l, liquidity_net: -(l as i128) },
            ],
        )
    }

    #[test]
    fn test_small_exact_input_stays_in_range() {
        let pool = make_ranged_pool();
        let state = simulate_swap(&pool, true, BigInt::from(10u64.pow(15)), None).unwrap();
        assert!(state.amount_specified_remaining.is_zero());
        assert!(state.amount_calculated.is_negative());
        assert_eq!(state.initialized_ticks_crossed, 0);
        assert!(state.sqrt_price_x96 < pool.sqrt_price_x96);
    }

    #[test]
    fn test_large_exact_input_exhausts_liquidity() {
        let pool = make_ranged_pool();
        // far beyond the range's depth: crosses -600 and runs out of liquidity
        let state = simulate_swap(&pool, true, BigInt::from(10u64).pow(24), None).unwrap();
        assert_eq!(state.initialized_ticks_crossed, 1);
        assert_eq!(state.liquidity, 0);
        assert!(!state.amount_specified_remaining.is_zero());
    }

    #[test]
    fn test_exact_output_filled() {
        let pool = make_ranged_pool();
        let want = BigInt::from(10u64.pow(15));
        let state = simulate_swap(&pool, false, -want.clone(), None).unwrap();
        assert!(state.amount_specified_remaining.is_zero());
        assert!(state.amount_calculated > want);
    }

    #[test]
    fn test_price_limit_direction_checked() {
        let pool = make_ranged_pool();
        let above = &pool.sqrt_price_x96 + 1;
        assert!(simulate_swap(&pool, true, BigInt::from(1000), Some(above)).is_err());
    }

    #[test]
    fn test_quote_through_pool_api() {
        let pool = make_ranged_pool();
        let input = router_core::CurrencyAmount::from_raw(pool.token0.clone(), 10u64.pow(15));
        let out = pool.get_output_amount(&input, None).unwrap();
        assert_eq!(out.amount.currency, pool.token1);
        // parity price minus the 0.3% fee
        assert!(out.amount.raw < BigInt::from(10u64.pow(15)));
        assert!(out.amount.raw > BigInt::from(996u64 * 10u64.pow(12)));

        let back = pool.get_input_amount(&out.amount, None).unwrap();
        assert_eq!(back.amount.currency, pool.token0);
        assert!(back.amount.raw <= BigInt::from(10u64.pow(15) + 10));
    }

    #[test]
    fn test_exact_output_beyond_liquidity_fails() {
        let pool = make_ranged_pool();
        let huge = router_core::CurrencyAmount::from_raw(pool.token1.clone(), 10u128.pow(24));
        assert_eq!(
            pool.get_input_amount(&huge, None).unwrap_err(),
            AmmError::InsufficientLiquidity
        );
    }
}
