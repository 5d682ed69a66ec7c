//! Tick <-> sqrt price conversion
//!
//! `get_sqrt_ratio_at_tick` reproduces the on-chain fixed-point ladder bit for
//! bit. `get_tick_at_sqrt_ratio` returns the greatest tick whose sqrt ratio is
//! at or below the given price, found by bisection over that ladder.

use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::constants::v3::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use crate::state::AmmError;
use crate::v3::full_math::max_u256;

const LADDER: [(u32, &str); 19] = [
    (0x2, "fff97272373d413259a46990580e213a"),
    (0x4, "fff2e50f5f656932ef12357cf3c7fdcc"),
    (0x8, "ffe5caca7e10e4e61c3624eaa0941cd0"),
    (0x10, "ffcb9843d60f6159c9db58835c926644"),
    (0x20, "ff973b41fa98c081472e6896dfb254c0"),
    (0x40, "ff2ea16466c96a3843ec78b326b52861"),
    (0x80, "fe5dee046a99a2a811c461f1969c3053"),
    (0x100, "fcbe86c7900a88aedcffc83b479aa3a4"),
    (0x200, "f987a7253ac413176f2b074cf7815e54"),
    (0x400, "f3392b0822b70005940c7a398e4b70f3"),
    (0x800, "e7159475a2c29b7443b29c7fa6e889d9"),
    (0x1000, "d097f3bdfd2022b8845ad8f792aa5825"),
    (0x2000, "a9f746462d870fdf8a65dc1f90e061e5"),
    (0x4000, "70d869a156d2a1b890bb3df62baf32f7"),
    (0x8000, "31be135f97d08fd981231505542fcfa6"),
    (0x10000, "9aa508b5b7a84e1c677de54f3e99bc9"),
    (0x20000, "5d6af8dedb81196699c329225ee604"),
    (0x40000, "2216e584f5fa1ea926041bedfe98"),
    (0x80000, "48a170391f7dc42444e8fa2"),
];

const TICK_ONE_FACTOR: &str = "fffcb933bd6fad37aa2d162d1a594001";

fn hex(s: &str) -> BigInt {
    BigInt::parse_bytes(s.as_bytes(), 16).unwrap_or_default()
}

fn dec(s: &str) -> BigInt {
    BigInt::parse_bytes(s.as_bytes(), 10).unwrap_or_default()
}

pub fn min_sqrt_ratio() -> BigInt {
    dec(MIN_SQRT_RATIO)
}

pub fn max_sqrt_ratio() -> BigInt {
    dec(MAX_SQRT_RATIO)
}

/// Q64.96 sqrt of `1.0001^tick`.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<BigInt, AmmError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(AmmError::InvalidTick { tick });
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 {
        hex(TICK_ONE_FACTOR)
    } else {
        BigInt::one() << 128
    };
    for (bit, factor) in LADDER {
        if abs_tick & bit != 0 {
            ratio = (ratio * hex(factor)) >> 128;
        }
    }
    if tick > 0 {
        ratio = max_u256() / ratio;
    }

    let low_mask = (BigInt::one() << 32) - 1;
    let round_up = if (&ratio & &low_mask).is_zero() { 0 } else { 1 };
    Ok((ratio >> 32) + round_up)
}

/// Greatest tick such that `get_sqrt_ratio_at_tick(tick) <= sqrt_price_x96`.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: &BigInt) -> Result<i32, AmmError> {
    if *sqrt_price_x96 < min_sqrt_ratio() || *sqrt_price_x96 >= max_sqrt_ratio() {
        return Err(AmmError::InvalidSqrtPrice {
            sqrt_price_x96: sqrt_price_x96.to_string(),
        });
    }
    let (mut lo, mut hi) = (MIN_TICK, MAX_TICK);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= *sqrt_price_x96 {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}
