//! router-api: HTTP API for the smart order router
//!
//! Serves quotes and route-to-ratio answers over a loaded pool snapshot.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::{AppState, StateError};
