//! router-core: Shared types, amounts, errors, and configuration
//!
//! This crate provides the foundational types used across the router workspace.

pub mod amounts;
pub mod chains;
pub mod config;
pub mod errors;
pub mod types;

pub use amounts::*;
pub use chains::*;
pub use config::*;
pub use errors::*;
pub use types::*;
