//! # Convene Domain
//!
//! Business domain types and models for Convene.
//!
//! This crate contains:
//! - Domain data types (Event, User, registration projections)
//! - Domain error types and Result definitions
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Convene crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
