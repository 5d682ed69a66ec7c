//! API route handlers

pub mod health;
pub mod pools;
pub mod quote;
pub mod ratio;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/pools", get(pools::get_pools))
        .route("/quote", post(quote::get_quote))
        .route("/route-to-ratio", post(ratio::route_to_ratio))
        .with_state(state)
}
