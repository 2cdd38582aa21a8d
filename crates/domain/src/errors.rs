//! Domain error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every failure the service reports, business and infrastructure alike.
///
/// Business outcomes (`NotFound`, `InvalidState`, `CapacityExceeded`, ...)
/// are expected results the HTTP layer maps to user-facing responses.
/// `Database`, `Config` and `Internal` cover infrastructure faults.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ConveneError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Event has reached maximum capacity")]
    CapacityExceeded,

    #[error("Already registered for this event")]
    AlreadyRegistered,

    #[error("Not registered for this event")]
    NotRegistered,

    #[error("End time must be after start time")]
    InvalidTimeRange,

    #[error("Cannot create events in the past")]
    PastEvent,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already in use: {0}")]
    EmailTaken(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Convene operations
pub type Result<T> = std::result::Result<T, ConveneError>;

impl ConveneError {
    /// True when the error is an expected business outcome rather than an
    /// infrastructure fault.
    pub fn is_business_outcome(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Config(_) | Self::Internal(_))
    }
}
