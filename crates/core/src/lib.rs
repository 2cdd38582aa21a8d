//! # Convene Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) over the event and user stores
//! - The status engine (pure computation plus the sweep use case)
//! - Registration, event lifecycle, user and reporting services
//!
//! ## Architecture Principles
//! - Only depends on `convene-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod clock;
pub mod events;
pub mod registration;
pub mod reporting;
pub mod status;
pub mod users;

// Re-export specific items to avoid ambiguity
pub use clock::{Clock, MockClock, SystemClock};
pub use events::ports::EventStore;
pub use events::EventService;
pub use registration::RegistrationService;
pub use reporting::ports::ReportingStore;
pub use reporting::ReportingService;
pub use status::{compute_status, StatusService, SweepSummary};
pub use users::ports::UserStore;
pub use users::UserService;
