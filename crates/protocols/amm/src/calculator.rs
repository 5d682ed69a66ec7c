//! AMM Calculator
//!
//! Pair swap math: the volatile constant product formula (x * y = k) and the
//! stable curve (x³y + y³x = k) solved with Newton's method.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::constants::fees::{BIPS_DENOM, STABLE_FEE_BIPS, V2_FEE_DENOM, V2_FEE_NUM};
use crate::constants::stable::{MAX_NEWTON_ITERATIONS, PRECISION_DECIMALS};
use crate::state::AmmError;

/// Calculate swap output using constant product formula
///
/// Formula: output = (reserves_out * input * fee_num) / (reserves_in * fee_denom + input * fee_num)
pub fn calculate_output(
    reserves_in: &BigInt,
    reserves_out: &BigInt,
    input_amount: &BigInt,
) -> Result<BigInt, AmmError> {
    if reserves_in.is_zero() || reserves_out.is_zero() {
        return Err(AmmError::InsufficientReserves);
    }
    let input_with_fee = input_amount * V2_FEE_NUM;
    let numerator = &input_with_fee * reserves_out;
    let denominator = reserves_in * V2_FEE_DENOM + &input_with_fee;

    let output = numerator / denominator;
    if !output.is_positive() {
        return Err(AmmError::InsufficientInputAmount);
    }
    Ok(output)
}

/// Calculate required input for desired output (reverse calculation)
///
/// Formula: input = (reserves_in * output * fee_denom) / ((reserves_out - output) * fee_num) + 1
pub fn calculate_input(
    reserves_in: &BigInt,
    reserves_out: &BigInt,
    output_amount: &BigInt,
) -> Result<BigInt, AmmError> {
    if reserves_in.is_zero() || reserves_out.is_zero() || output_amount >= reserves_out {
        return Err(AmmError::InsufficientReserves);
    }
    let numerator = reserves_in * output_amount * V2_FEE_DENOM;
    let denominator = (reserves_out - output_amount) * V2_FEE_NUM;
    Ok(numerator / denominator + 1)
}

fn precision() -> BigInt {
    BigInt::from(10u8).pow(PRECISION_DECIMALS)
}

fn scale(decimals: u8) -> BigInt {
    BigInt::from(10u8).pow(decimals as u32)
}

/// `x0 * y³ + x0³ * y`, all values at 18 decimals
fn curve(x0: &BigInt, y: &BigInt) -> BigInt {
    let p = precision();
    let y3 = y * y / &p * y / &p;
    let x3 = x0 * x0 / &p * x0 / &p;
    x0 * y3 / &p + x3 * y / &p
}

/// Derivative of `curve` in `y`
fn curve_slope(x0: &BigInt, y: &BigInt) -> BigInt {
    let p = precision();
    let x3 = x0 * x0 / &p * x0 / &p;
    BigInt::from(3) * x0 * (y * y / &p) / &p + x3
}

/// Invariant of a stable pair at 18 decimals
fn stable_k(x: &BigInt, y: &BigInt) -> BigInt {
    let p = precision();
    let a = x * y / &p;
    let b = x * x / &p + y * y / &p;
    a * b / &p
}

/// Solve `curve(x0, y) = k` for y starting from `y`.
fn solve_y(x0: &BigInt, k: &BigInt, mut y: BigInt) -> Result<BigInt, AmmError> {
    let p = precision();
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let y_prev = y.clone();
        let value = curve(x0, &y);
        let slope = curve_slope(x0, &y);
        if slope.is_zero() {
            return Err(AmmError::StableCurveDiverged);
        }
        if value < *k {
            y += (k - &value) * &p / &slope;
        } else {
            y -= (&value - k) * &p / &slope;
        }
        if (&y - &y_prev).abs() <= BigInt::from(1) {
            return Ok(y);
        }
    }
    Err(AmmError::StableCurveDiverged)
}

/// Output of a stable pair for an exact input (0.05% fee on input).
pub fn stable_output(
    reserves_in: &BigInt,
    reserves_out: &BigInt,
    input_amount: &BigInt,
    decimals_in: u8,
    decimals_out: u8,
) -> Result<BigInt, AmmError> {
    if reserves_in.is_zero() || reserves_out.is_zero() {
        return Err(AmmError::InsufficientReserves);
    }
    let p = precision();
    let input_after_fee = input_amount - input_amount * STABLE_FEE_BIPS / BIPS_DENOM;

    let x = reserves_in * &p / scale(decimals_in);
    let y = reserves_out * &p / scale(decimals_out);
    let k = stable_k(&x, &y);
    let dx = input_after_fee * &p / scale(decimals_in);

    let y_new = solve_y(&(&x + &dx), &k, y.clone())?;
    let dy = &y - &y_new;
    let output = dy * scale(decimals_out) / &p;
    if !output.is_positive() {
        return Err(AmmError::InsufficientInputAmount);
    }
    if output >= *reserves_out {
        return Err(AmmError::InsufficientReserves);
    }
    Ok(output)
}

/// Input a stable pair needs for an exact output, grossed up for the fee.
pub fn stable_input(
    reserves_in: &BigInt,
    reserves_out: &BigInt,
    output_amount: &BigInt,
    decimals_in: u8,
    decimals_out: u8,
) -> Result<BigInt, AmmError> {
    if reserves_in.is_zero() || reserves_out.is_zero() || output_amount >= reserves_out {
        return Err(AmmError::InsufficientReserves);
    }
    let p = precision();
    let x = reserves_in * &p / scale(decimals_in);
    let y = reserves_out * &p / scale(decimals_out);
    let k = stable_k(&x, &y);
    let dy = output_amount * &p / scale(decimals_out);

    // the curve is symmetric, so solving for x given y reuses the same solver
    let x_new = solve_y(&(&y - &dy), &k, x.clone())?;
    let dx = &x_new - &x;
    let net_input = dx * scale(decimals_in) / &p + 1;

    let fee_denom = BigInt::from(BIPS_DENOM - STABLE_FEE_BIPS);
    let gross: BigInt = &net_input * BIPS_DENOM;
    let mut input = &gross / &fee_denom;
    if !(&gross % &fee_denom).is_zero() {
        input += 1;
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigInt {
        BigInt::from(v)
    }

    #[test]
    fn test_calculate_output() {
        // 1000 WETH vs 2,000,000 USDC-like reserves, swap 1 unit
        let output = calculate_output(&big(1_000_000_000), &big(2_000_000_000), &big(1_000_000)).unwrap();
        assert!(output > big(0));
        // less than the spot rate of 2x because of fee and impact
        assert!(output < big(2_000_000));
    }

    #[test]
    fn test_calculate_output_zero_reserves() {
        let err = calculate_output(&big(0), &big(1000), &big(10)).unwrap_err();
        assert_eq!(err, AmmError::InsufficientReserves);
    }

    #[test]
    fn test_calculate_output_dust_input() {
        let err = calculate_output(&big(1_000_000), &big(10), &big(1)).unwrap_err();
        assert_eq!(err, AmmError::InsufficientInputAmount);
    }

    #[test]
    fn test_calculate_input_rejects_draining_reserves() {
        assert!(calculate_input(&big(1000), &big(1000), &big(1000)).is_err());
        assert!(calculate_input(&big(1000), &big(1000), &big(2000)).is_err());
    }

    #[test]
    fn test_input_covers_output() {
        let r_in = big(5_000_000);
        let r_out = big(7_000_000);
        let want = big(12_345);
        let input = calculate_input(&r_in, &r_out, &want).unwrap();
        let got = calculate_output(&r_in, &r_out, &input).unwrap();
        assert!(got >= want);
    }

    #[test]
    fn test_stable_output_near_parity() {
        let reserve = BigInt::from(10u64).pow(24); // 1M tokens at 18 decimals
        let input = BigInt::from(10u64).pow(21); // 1000 tokens
        let output = stable_output(&reserve, &reserve, &input, 18, 18).unwrap();
        // a balanced stable pool trades almost 1:1 after the 0.05% fee
        let floor = &input * 9990u32 / 10_000u32;
        assert!(output < input);
        assert!(output > floor);
    }

    #[test]
    fn test_stable_beats_volatile_on_balanced_pool() {
        let reserve = BigInt::from(10u64).pow(24);
        let input = BigInt::from(10u64).pow(22);
        let stable = stable_output(&reserve, &reserve, &input, 18, 18).unwrap();
        let volatile = calculate_output(&reserve, &reserve, &input).unwrap();
        assert!(stable > volatile);
    }

    #[test]
    fn test_stable_mixed_decimals() {
        let r_in = BigInt::from(10u64).pow(12); // 1M at 6 decimals
        let r_out = BigInt::from(10u64).pow(24); // 1M at 18 decimals
        let input = BigInt::from(1_000_000_000u64); // 1000 at 6 decimals
        let output = stable_output(&r_in, &r_out, &input, 6, 18).unwrap();
        let expected = BigInt::from(10u64).pow(21);
        assert!(output < expected);
        assert!(output > &expected * 9990u32 / 10_000u32);
    }

    #[test]
    fn test_stable_input_covers_output() {
        let reserve = BigInt::from(10u64).pow(24);
        let want = BigInt::from(10u64).pow(21);
        let input = stable_input(&reserve, &reserve, &want, 18, 18).unwrap();
        let got = stable_output(&reserve, &reserve, &input, 18, 18).unwrap();
        assert!(got >= &want - 2u32);
        assert!(input > want);
    }
}
