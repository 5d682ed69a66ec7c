//! 256-bit fixed-point helpers over big integers

use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::state::AmmError;

/// `2^96`
pub fn q96() -> BigInt {
    BigInt::one() << 96
}

/// `2^256 - 1`
pub fn max_u256() -> BigInt {
    (BigInt::one() << 256) - 1
}

/// `2^160 - 1`
pub fn max_u160() -> BigInt {
    (BigInt::one() << 160) - 1
}

/// `floor(a * b / denominator)`
pub fn mul_div(a: &BigInt, b: &BigInt, denominator: &BigInt) -> Result<BigInt, AmmError> {
    if denominator.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    Ok(a * b / denominator)
}

/// `ceil(a * b / denominator)`
pub fn mul_div_rounding_up(a: &BigInt, b: &BigInt, denominator: &BigInt) -> Result<BigInt, AmmError> {
    if denominator.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let product = a * b;
    let mut result = &product / denominator;
    if !(&product % denominator).is_zero() {
        result += 1;
    }
    Ok(result)
}

/// `ceil(a / b)`
pub fn div_rounding_up(a: &BigInt, b: &BigInt) -> Result<BigInt, AmmError> {
    if b.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let mut result = a / b;
    if !(a % b).is_zero() {
        result += 1;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floors() {
        let r = mul_div(&BigInt::from(7), &BigInt::from(3), &BigInt::from(2)).unwrap();
        assert_eq!(r, BigInt::from(10));
    }

    #[test]
    fn test_mul_div_rounding_up() {
        let r = mul_div_rounding_up(&BigInt::from(7), &BigInt::from(3), &BigInt::from(2)).unwrap();
        assert_eq!(r, BigInt::from(11));
        let exact = mul_div_rounding_up(&BigInt::from(4), &BigInt::from(3), &BigInt::from(2)).unwrap();
        assert_eq!(exact, BigInt::from(6));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(mul_div(&BigInt::from(1), &BigInt::from(1), &BigInt::zero()).is_err());
        assert!(div_rounding_up(&BigInt::from(1), &BigInt::zero()).is_err());
    }
}
