//! AMM Pool Math
//!
//! This crate implements the pool arithmetic the router quotes against:
//! constant-product pairs (volatile and stable curves) and
//! concentrated-liquidity pools with a full tick-walk swap simulation.

pub mod address;
pub mod calculator;
pub mod constants;
pub mod position;
pub mod state;
pub mod v3;

// Re-exports
pub use address::{compute_pair_address, compute_pool_address};
pub use calculator::{calculate_input, calculate_output, stable_input, stable_output};
pub use constants::{fees, pool_kind};
pub use position::{calculate_ratio_amount_in, Position};
pub use state::{AmmError, FeeAmount, Pair, Pool, Tick, V3Pool, V3SwapResult};
