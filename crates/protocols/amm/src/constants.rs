//! AMM Constants
//!
//! Fee parameters and fixed-point bounds for pair and concentrated-liquidity pools.

/// Constant-product fee constants
pub mod fees {
    /// Volatile pair fee numerator (0.3% fee = 997/1000)
    pub const V2_FEE_NUM: u32 = 997;

    /// Volatile pair fee denominator
    pub const V2_FEE_DENOM: u32 = 1000;

    /// Stable pair fee in basis points (0.05%)
    pub const STABLE_FEE_BIPS: u32 = 5;

    /// Basis point denominator
    pub const BIPS_DENOM: u32 = 10_000;

    /// Concentrated-liquidity fees are expressed in hundredths of a bip
    pub const PIPS_DENOM: u32 = 1_000_000;
}

/// Concentrated-liquidity fixed-point bounds
pub mod v3 {
    /// Lowest tick representable by the tick math
    pub const MIN_TICK: i32 = -887_272;

    /// Highest tick representable by the tick math
    pub const MAX_TICK: i32 = 887_272;

    /// `get_sqrt_ratio_at_tick(MIN_TICK)`
    pub const MIN_SQRT_RATIO: &str = "4295128739";

    /// `get_sqrt_ratio_at_tick(MAX_TICK)`
    pub const MAX_SQRT_RATIO: &str = "1461446703485210103287273052203988822378723970342";

    /// Fractional bits of a Q64.96 sqrt price
    pub const RESOLUTION: u32 = 96;
}

/// Stable curve solver settings
pub mod stable {
    /// Newton iterations before giving up on convergence
    pub const MAX_NEWTON_ITERATIONS: usize = 255;

    /// Stable math normalises every reserve to 18 decimals
    pub const PRECISION_DECIMALS: u32 = 18;
}

/// Leading byte of the pool address preimage
pub mod pool_kind {
    pub const PAIR: u8 = 0x02;
    pub const CONCENTRATED: u8 = 0x03;
}
