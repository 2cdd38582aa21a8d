//! # Convene API
//!
//! HTTP application layer - routes and main entry point.
//!
//! This crate contains:
//! - Axum route handlers (HTTP → service bridge)
//! - Application context (dependency injection)
//! - Main entry point and setup
//!
//! ## Architecture
//! - Depends on `shared`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Exposes the REST surface consumed by clients

pub mod context;
pub mod error;
pub mod extract;
pub mod routes;
pub mod utils;

// Re-export for convenience
pub use context::AppContext;
pub use error::ApiError;
pub use extract::CurrentUser;
