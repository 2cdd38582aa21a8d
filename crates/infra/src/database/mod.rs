//! Database implementations

pub(crate) mod columns;
pub mod event_repository;
pub mod manager;
pub mod reporting_repository;
pub mod user_repository;

pub use event_repository::*;
pub use manager::*;
pub use reporting_repository::*;
pub use user_repository::*;
