//! Smart Order Router
//!
//! Finds the best way to fill a swap across constant-product pairs and
//! concentrated-liquidity pools: candidate pool selection, route
//! enumeration, batched quoting, gas modelling and the split-route search.
//! [`AlphaRouter`] ties the stages together.

pub mod alpha_router;
pub mod best_swap_route;
pub mod candidate_pools;
pub mod compute_routes;
pub mod encoding;
pub mod entities;
pub mod gas_models;
pub mod method_parameters;
pub mod providers;
pub mod quoters;
pub mod route_to_ratio;
pub mod util;

// Re-exports
pub use alpha_router::{get_amount_distribution, AlphaRouter, AlphaRouterParams, SwapRoute};
pub use best_swap_route::{get_best_swap_route, BestSwapRoute};
pub use entities::{Route, RouteWithValidQuote};
pub use method_parameters::{MethodParameters, SimulationOptions, SwapOptions};
pub use providers::{PoolSnapshot, SnapshotProvider};
pub use route_to_ratio::{SwapToRatioResponse, SwapToRatioStatus};
