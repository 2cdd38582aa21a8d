//! # Convene Shared
//!
//! Runtime configuration structures shared across all crates.
//!
//! ## Architecture
//! - No dependencies on other Convene crates
//! - Only external dependencies allowed
//! - Pure data structures; loading lives in the infra crate

pub mod config;

// Re-export commonly used items
pub use config::*;
