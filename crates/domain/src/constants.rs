//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Input validation limits
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_VENUE_LENGTH: usize = 100;
pub const MIN_PASSWORD_LENGTH: usize = 6;

// Listing defaults
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const RECENT_EVENTS_LIMIT: u32 = 5;
pub const DEFAULT_ANALYTICS_WINDOW_DAYS: u32 = 30;

// Status sweep configuration
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
