//! # Convene Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite-backed repositories for events, users and reporting
//! - The background status sweep scheduler
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Implements traits defined in `convene-core`
//! - Depends on `convene-shared` and `convene-core`
//! - Contains all "impure" code (I/O, clocks, database)

pub mod config;
pub mod database;
pub mod errors;
pub mod scheduling;

// Re-export commonly used items
pub use database::{
    DbManager, SqliteEventRepository, SqliteReportingRepository, SqliteUserRepository,
};
pub use errors::InfraError;
pub use scheduling::{
    SchedulerError, SchedulerResult, StatusSweepScheduler, StatusSweepSchedulerConfig,
};
