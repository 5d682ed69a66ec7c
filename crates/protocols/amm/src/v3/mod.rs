//! Concentrated-liquidity math
//!
//! Fixed-point helpers, tick/price conversion, swap steps and the tick-walk
//! simulation used to quote against a pool snapshot.

pub mod full_math;
pub mod sqrt_price_math;
pub mod swap;
pub mod swap_math;
pub mod tick_list;
pub mod tick_math;

pub use sqrt_price_math::{get_amount0_delta, get_amount1_delta};
pub use swap::{simulate_swap, SwapState};
pub use tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};
