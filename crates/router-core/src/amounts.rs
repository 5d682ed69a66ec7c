//! Arbitrary-precision fractions, token amounts, percents and prices
//!
//! All arithmetic is exact over big integers. Floating point is never used
//! for quotes; `to_fixed` exists only for human-readable output.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::types::Token;

/// Serde helper: big integers as decimal strings.
pub mod bigint_string {
    use num_bigint::BigInt;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigInt, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse::<BigInt>().map_err(D::Error::custom)
    }
}

/// Rational number with a big-integer numerator and a positive denominator.
///
/// Comparisons use cross-multiplication, so `1/2 == 2/4`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fraction {
    #[serde(with = "bigint_string")]
    numerator: BigInt,
    #[serde(with = "bigint_string")]
    denominator: BigInt,
}

impl Fraction {
    /// The denominator must be non-zero; the sign is carried by the numerator.
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Self {
        let numerator = numerator.into();
        let denominator = denominator.into();
        debug_assert!(!denominator.is_zero(), "fraction with zero denominator");
        if denominator.is_negative() {
            Self {
                numerator: -numerator,
                denominator: -denominator,
            }
        } else {
            Self {
                numerator,
                denominator,
            }
        }
    }

    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self::new(value, 1)
    }

    pub fn zero() -> Self {
        Self::new(0, 1)
    }

    pub fn one() -> Self {
        Self::new(1, 1)
    }

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    /// Integer part, truncated toward zero.
    pub fn quotient(&self) -> BigInt {
        &self.numerator / &self.denominator
    }

    pub fn remainder(&self) -> Fraction {
        Fraction::new(&self.numerator % &self.denominator, self.denominator.clone())
    }

    /// Reciprocal, `None` for zero.
    pub fn invert(&self) -> Option<Fraction> {
        if self.numerator.is_zero() {
            return None;
        }
        Some(Fraction::new(self.denominator.clone(), self.numerator.clone()))
    }

    pub fn abs(&self) -> Fraction {
        Fraction::new(self.numerator.abs(), self.denominator.clone())
    }

    pub fn add(&self, other: &Fraction) -> Fraction {
        if self.denominator == other.denominator {
            return Fraction::new(&self.numerator + &other.numerator, self.denominator.clone());
        }
        Fraction::new(
            &self.numerator * &other.denominator + &other.numerator * &self.denominator,
            &self.denominator * &other.denominator,
        )
    }

    pub fn sub(&self, other: &Fraction) -> Fraction {
        if self.denominator == other.denominator {
            return Fraction::new(&self.numerator - &other.numerator, self.denominator.clone());
        }
        Fraction::new(
            &self.numerator * &other.denominator - &other.numerator * &self.denominator,
            &self.denominator * &other.denominator,
        )
    }

    pub fn mul(&self, other: &Fraction) -> Fraction {
        Fraction::new(
            &self.numerator * &other.numerator,
            &self.denominator * &other.denominator,
        )
    }

    /// Division, `None` when dividing by zero.
    pub fn checked_div(&self, other: &Fraction) -> Option<Fraction> {
        if other.numerator.is_zero() {
            return None;
        }
        Some(Fraction::new(
            &self.numerator * &other.denominator,
            &self.denominator * &other.numerator,
        ))
    }

    /// Decimal rendering with `places` digits after the point, rounded half up.
    pub fn to_fixed(&self, places: u32) -> String {
        let scale = BigInt::from(10u8).pow(places);
        let scaled = &self.numerator.abs() * &scale;
        let two = BigInt::from(2u8);
        let rounded = (&scaled * &two + &self.denominator) / (&self.denominator * &two);
        let int_part = &rounded / &scale;
        let frac_part = &rounded % &scale;
        let sign = if self.numerator.is_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        if places == 0 {
            format!("{}{}", sign, int_part)
        } else {
            format!(
                "{}{}.{:0>width$}",
                sign,
                int_part,
                frac_part.to_string(),
                width = places as usize
            )
        }
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl From<u64> for Fraction {
    fn from(v: u64) -> Self {
        Fraction::from_integer(v)
    }
}

impl From<BigInt> for Fraction {
    fn from(v: BigInt) -> Self {
        Fraction::from_integer(v)
    }
}

/// Percentage as a fraction of one (`Percent::new(5, 100)` is 5%)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(Fraction);

impl Percent {
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Self {
        Self(Fraction::new(numerator, denominator))
    }

    pub fn from_bips(bips: u64) -> Self {
        Self::new(bips, crate::types::constants::BIPS_BASE)
    }

    pub fn as_fraction(&self) -> &Fraction {
        &self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.mul(&Fraction::from(100)).to_fixed(2))
    }
}

/// Integer amount of a token in its smallest unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub currency: Token,
    #[serde(with = "bigint_string")]
    pub raw: BigInt,
}

impl CurrencyAmount {
    pub fn from_raw(currency: Token, raw: impl Into<BigInt>) -> Self {
        Self {
            currency,
            raw: raw.into(),
        }
    }

    pub fn zero(currency: Token) -> Self {
        Self::from_raw(currency, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Same-token addition. Mixing tokens is a programming error.
    pub fn add(&self, other: &CurrencyAmount) -> CurrencyAmount {
        debug_assert_eq!(self.currency, other.currency, "adding different tokens");
        Self::from_raw(self.currency.clone(), &self.raw + &other.raw)
    }

    /// Same-token subtraction. Mixing tokens is a programming error.
    pub fn sub(&self, other: &CurrencyAmount) -> CurrencyAmount {
        debug_assert_eq!(self.currency, other.currency, "subtracting different tokens");
        Self::from_raw(self.currency.clone(), &self.raw - &other.raw)
    }

    /// Multiply by a fraction, truncating toward zero.
    pub fn multiply(&self, by: &Fraction) -> CurrencyAmount {
        Self::from_raw(
            self.currency.clone(),
            Fraction::from_integer(self.raw.clone()).mul(by).quotient(),
        )
    }

    pub fn as_fraction(&self) -> Fraction {
        Fraction::from_integer(self.raw.clone())
    }

    /// Amount in whole token units, e.g. `1.5` for 1.5 WETH.
    pub fn to_exact(&self) -> String {
        let scale = BigInt::from(10u8).pow(self.currency.decimals as u32);
        Fraction::new(self.raw.clone(), scale).to_fixed(self.currency.decimals as u32)
    }

    /// Whole token units rounded to `places` decimals.
    pub fn to_fixed(&self, places: u32) -> String {
        let scale = BigInt::from(10u8).pow(self.currency.decimals as u32);
        Fraction::new(self.raw.clone(), scale).to_fixed(places)
    }
}

impl PartialOrd for CurrencyAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        Some(self.raw.cmp(&other.raw))
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_fixed(6), self.currency)
    }
}

/// Exchange rate between two tokens over raw units: `quote_raw = base_raw * rate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub base: Token,
    pub quote: Token,
    pub rate: Fraction,
}

impl Price {
    /// Price of `base` in `quote`, given `base_raw` units trade for `quote_raw` units.
    pub fn new(base: Token, quote: Token, base_raw: impl Into<BigInt>, quote_raw: impl Into<BigInt>) -> Self {
        Self {
            base,
            quote,
            rate: Fraction::new(quote_raw, base_raw),
        }
    }

    pub fn from_rate(base: Token, quote: Token, rate: Fraction) -> Self {
        Self { base, quote, rate }
    }

    pub fn invert(&self) -> Option<Price> {
        Some(Price {
            base: self.quote.clone(),
            quote: self.base.clone(),
            rate: self.rate.invert()?,
        })
    }

    /// Chain two prices: `self.quote` must equal `other.base`.
    pub fn multiply(&self, other: &Price) -> Price {
        debug_assert_eq!(self.quote, other.base, "price chain mismatch");
        Price {
            base: self.base.clone(),
            quote: other.quote.clone(),
            rate: self.rate.mul(&other.rate),
        }
    }

    /// Convert an amount of the base token into the quote token, truncating.
    pub fn quote(&self, amount: &CurrencyAmount) -> CurrencyAmount {
        debug_assert_eq!(amount.currency, self.base, "quoting wrong token");
        CurrencyAmount::from_raw(
            self.quote.clone(),
            amount.as_fraction().mul(&self.rate).quotient(),
        )
    }

    /// Rate between whole units, adjusted for decimals.
    pub fn adjusted(&self) -> Fraction {
        let base_scale = BigInt::from(10u8).pow(self.base.decimals as u32);
        let quote_scale = BigInt::from(10u8).pow(self.quote.decimals as u32);
        self.rate.mul(&Fraction::new(base_scale, quote_scale))
    }
}

/// `10^exp` as a big integer.
pub fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u8).pow(exp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::ChainId;

    fn make_token(addr: &str, decimals: u8) -> Token {
        Token::new(ChainId::Mainnet, addr, decimals, Some("TKN"), None)
    }

    #[test]
    fn test_fraction_normalises_sign() {
        let f = Fraction::new(3, -4);
        assert!(f.is_negative());
        assert_eq!(f.denominator(), &BigInt::from(4));
    }

    #[test]
    fn test_fraction_comparison_cross_multiplies() {
        assert_eq!(Fraction::new(1, 2), Fraction::new(2, 4));
        assert!(Fraction::new(1, 3) < Fraction::new(1, 2));
        assert!(Fraction::new(-1, 2) < Fraction::zero());
    }

    #[test]
    fn test_fraction_arithmetic() {
        let a = Fraction::new(1, 3);
        let b = Fraction::new(1, 6);
        assert_eq!(a.add(&b), Fraction::new(1, 2));
        assert_eq!(a.sub(&b), Fraction::new(1, 6));
        assert_eq!(a.mul(&b), Fraction::new(1, 18));
        assert_eq!(a.checked_div(&b).unwrap(), Fraction::from(2));
        assert!(a.checked_div(&Fraction::zero()).is_none());
    }

    #[test]
    fn test_fraction_quotient_truncates() {
        assert_eq!(Fraction::new(7, 2).quotient(), BigInt::from(3));
        assert_eq!(Fraction::new(-7, 2).quotient(), BigInt::from(-3));
        assert_eq!(Fraction::new(7, 2).remainder(), Fraction::new(1, 2));
    }

    #[test]
    fn test_fraction_to_fixed() {
        assert_eq!(Fraction::new(1, 3).to_fixed(4), "0.3333");
        assert_eq!(Fraction::new(2, 3).to_fixed(2), "0.67");
        assert_eq!(Fraction::new(5, 1).to_fixed(0), "5");
        assert_eq!(Fraction::new(-1, 4).to_fixed(2), "-0.25");
    }

    #[test]
    fn test_invert_zero() {
        assert!(Fraction::zero().invert().is_none());
        assert_eq!(Fraction::new(2, 5).invert().unwrap(), Fraction::new(5, 2));
    }

    #[test]
    fn test_currency_amount_multiply_truncates() {
        let t = make_token("0x01", 6);
        let amount = CurrencyAmount::from_raw(t, 1001);
        let half = amount.multiply(&Fraction::new(1, 2));
        assert_eq!(half.raw, BigInt::from(500));
    }

    #[test]
    fn test_currency_amount_to_exact() {
        let t = make_token("0x01", 6);
        let amount = CurrencyAmount::from_raw(t, 1_500_000);
        assert_eq!(amount.to_exact(), "1.500000");
        assert_eq!(amount.to_fixed(2), "1.50");
    }

    #[test]
    fn test_price_quote_and_invert() {
        let a = make_token("0x01", 18);
        let b = make_token("0x02", 6);
        // 1e18 raw A trades for 2000e6 raw B
        let price = Price::new(a.clone(), b.clone(), 1_000_000_000_000_000_000u64, 2_000_000_000u64);
        let one_a = CurrencyAmount::from_raw(a.clone(), 1_000_000_000_000_000_000u64);
        assert_eq!(price.quote(&one_a).raw, BigInt::from(2_000_000_000u64));
        assert_eq!(price.adjusted(), Fraction::from(2000));

        let inv = price.invert().unwrap();
        let b_amt = CurrencyAmount::from_raw(b, 4_000_000_000u64);
        assert_eq!(inv.quote(&b_amt).raw, BigInt::from(2_000_000_000_000_000_000u64));
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(Percent::from_bips(50).to_string(), "0.50%");
        assert_eq!(Percent::new(25, 100).to_string(), "25.00%");
    }

    #[test]
    fn test_fraction_serde_as_strings() {
        let f = Fraction::new(1, 200);
        let json = serde_json::to_string(&f).unwrap();
        assert_eq!(json, r#"{"numerator":"1","denominator":"200"}"#);
        let back: Fraction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }
}
