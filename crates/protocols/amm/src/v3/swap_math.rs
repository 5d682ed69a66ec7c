//! Single swap step within one initialized-tick range

use num_bigint::BigInt;
use num_traits::Signed;

use crate::constants::fees::PIPS_DENOM;
use crate::state::AmmError;
use crate::v3::full_math::{mul_div, mul_div_rounding_up};
use crate::v3::sqrt_price_math::{
    get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};

/// Outcome of swapping toward a target price
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapStep {
    pub sqrt_ratio_next_x96: BigInt,
    pub amount_in: BigInt,
    pub amount_out: BigInt,
    pub fee_amount: BigInt,
}

/// Swap as far toward `sqrt_ratio_target` as `amount_remaining` allows.
///
/// A non-negative `amount_remaining` is an exact input, a negative one an
/// exact output. `fee_pips` is in hundredths of a bip.
pub fn compute_swap_step(
    sqrt_ratio_current: &BigInt,
    sqrt_ratio_target: &BigInt,
    liquidity: &BigInt,
    amount_remaining: &BigInt,
    fee_pips: u32,
) -> Result<SwapStep, AmmError> {
    let zero_for_one = sqrt_ratio_current >= sqrt_ratio_target;
    let exact_in = !amount_remaining.is_negative();
    let pips = BigInt::from(PIPS_DENOM);
    let fee = BigInt::from(fee_pips);
    let pips_less_fee = &pips - &fee;

    let mut amount_in = BigInt::from(0);
    let mut amount_out = BigInt::from(0);
    let sqrt_ratio_next;

    if exact_in {
        let remaining_less_fee = mul_div(amount_remaining, &pips_less_fee, &pips)?;
        amount_in = if zero_for_one {
            get_amount0_delta(sqrt_ratio_target, sqrt_ratio_current, liquidity, true)?
        } else {
            get_amount1_delta(sqrt_ratio_current, sqrt_ratio_target, liquidity, true)?
        };
        sqrt_ratio_next = if remaining_less_fee >= amount_in {
            sqrt_ratio_target.clone()
        } else {
            get_next_sqrt_price_from_input(
                sqrt_ratio_current,
                liquidity,
                &remaining_less_fee,
                zero_for_one,
            )?
        };
    } else {
        amount_out = if zero_for_one {
            get_amount1_delta(sqrt_ratio_target, sqrt_ratio_current, liquidity, false)?
        } else {
            get_amount0_delta(sqrt_ratio_current, sqrt_ratio_target, liquidity, false)?
        };
        let wanted = -amount_remaining;
        sqrt_ratio_next = if wanted >= amount_out {
            sqrt_ratio_target.clone()
        } else {
            get_next_sqrt_price_from_output(sqrt_ratio_current, liquidity, &wanted, zero_for_one)?
        };
    }

    let reached_target = *sqrt_ratio_target == sqrt_ratio_next;

    if zero_for_one {
        if !(reached_target && exact_in) {
            amount_in = get_amount0_delta(&sqrt_ratio_next, sqrt_ratio_current, liquidity, true)?;
        }
        if !(reached_target && !exact_in) {
            amount_out = get_amount1_delta(&sqrt_ratio_next, sqrt_ratio_current, liquidity, false)?;
        }
    } else {
        if !(reached_target && exact_in) {
            amount_in = get_amount1_delta(sqrt_ratio_current, &sqrt_ratio_next, liquidity, true)?;
        }
        if !(reached_target && !exact_in) {
            amount_out = get_amount0_delta(sqrt_ratio_current, &sqrt_ratio_next, liquidity, false)?;
        }
    }

    if !exact_in && amount_out > -amount_remaining {
        amount_out = -amount_remaining;
    }

    let fee_amount = if exact_in && sqrt_ratio_next != *sqrt_ratio_target {
        amount_remaining - &amount_in
    } else {
        mul_div_rounding_up(&amount_in, &fee, &pips_less_fee)?
    };

    Ok(SwapStep {
        sqrt_ratio_next_x96: sqrt_ratio_next,
        amount_in,
        amount_out,
        fee_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v3::full_math::q96;
    use crate::v3::tick_math::get_sqrt_ratio_at_tick;

    fn e18() -> BigInt {
        BigInt::from(10u64.pow(18))
    }

    #[test]
    fn test_exact_in_capped_at_target() {
        let current = q96();
        let target = get_sqrt_ratio_at_tick(-10).unwrap();
        // far more input than the range can absorb
        let step = compute_swap_step(&current, &target, &e18(), &e18(), 3000).unwrap();
        assert_eq!(step.sqrt_ratio_next_x96, target);
        assert!(&step.amount_in + &step.fee_amount < e18());
        assert!(step.amount_out > BigInt::from(0));
    }

    #[test]
    fn test_exact_in_fully_consumed() {
        let current = q96();
        let target = get_sqrt_ratio_at_tick(-60_000).unwrap();
        let amount = BigInt::from(1_000_000u64);
        let step = compute_swap_step(&current, &target, &e18(), &amount, 3000).unwrap();
        assert!(step.sqrt_ratio_next_x96 > target);
        // input plus fee spends the whole remaining amount
        assert_eq!(&step.amount_in + &step.fee_amount, amount);
        assert!(step.amount_out < amount);
    }

    #[test]
    fn test_exact_out_capped_at_request() {
        let current = q96();
        let target = get_sqrt_ratio_at_tick(60_000).unwrap();
        let wanted = BigInt::from(1_000_000u64);
        let step = compute_swap_step(&current, &target, &e18(), &-wanted.clone(), 500).unwrap();
        assert_eq!(step.amount_out, wanted);
        assert!(step.amount_in > wanted);
    }
}
