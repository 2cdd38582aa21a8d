//! HTTP error mapping
//!
//! Handlers return `Result<_, ApiError>`; the wrapper maps the domain error
//! taxonomy onto status codes and a stable JSON body of the form
//! `{"type": ..., "message": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use convene_domain::ConveneError;
use serde::Serialize;
use tracing::{debug, error};

/// Result alias for route handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Wrapper turning a [`ConveneError`] into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ConveneError);

impl From<ConveneError> for ApiError {
    fn from(err: ConveneError) -> Self {
        Self(err)
    }
}

/// JSON body sent with every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            ConveneError::NotFound(_) => StatusCode::NOT_FOUND,
            ConveneError::InvalidState(_)
            | ConveneError::InvalidTimeRange
            | ConveneError::PastEvent
            | ConveneError::Validation(_) => StatusCode::BAD_REQUEST,
            ConveneError::CapacityExceeded
            | ConveneError::AlreadyRegistered
            | ConveneError::NotRegistered
            | ConveneError::EmailTaken(_) => StatusCode::CONFLICT,
            ConveneError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ConveneError::Forbidden(_) => StatusCode::FORBIDDEN,
            ConveneError::Database(_) | ConveneError::Config(_) | ConveneError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable label matching the error's serialized tag.
    fn label(&self) -> &'static str {
        match &self.0 {
            ConveneError::NotFound(_) => "NotFound",
            ConveneError::InvalidState(_) => "InvalidState",
            ConveneError::CapacityExceeded => "CapacityExceeded",
            ConveneError::AlreadyRegistered => "AlreadyRegistered",
            ConveneError::NotRegistered => "NotRegistered",
            ConveneError::InvalidTimeRange => "InvalidTimeRange",
            ConveneError::PastEvent => "PastEvent",
            ConveneError::Validation(_) => "Validation",
            ConveneError::EmailTaken(_) => "EmailTaken",
            ConveneError::Unauthorized(_) => "Unauthorized",
            ConveneError::Forbidden(_) => "Forbidden",
            ConveneError::Database(_) => "Database",
            ConveneError::Config(_) => "Config",
            ConveneError::Internal(_) => "Internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Business outcomes are expected; only infrastructure faults get
        // error-level logs.
        if self.0.is_business_outcome() {
            debug!(error = %self.0, status = %status, "request rejected");
        } else {
            error!(error = %self.0, status = %status, "request failed");
        }

        // Infrastructure details stay out of response bodies.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorBody { kind: self.label(), message })).into_response()
    }
}
