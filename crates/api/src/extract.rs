//! Request identity extraction
//!
//! Authentication happens upstream; requests arrive with the acting user's
//! id in the `x-user-id` header. The extractor resolves that id against the
//! user store and rejects requests without a known identity. Role checks
//! stay with the handlers via [`CurrentUser::require_teacher`] and
//! [`CurrentUser::require_admin`].

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use convene_domain::{ConveneError, Role, User};
use uuid::Uuid;

use crate::context::AppContext;
use crate::error::ApiError;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The acting user, resolved from the `x-user-id` request header.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Allow teachers and admins; reject students.
    pub fn require_teacher(&self) -> Result<&User, ApiError> {
        match self.0.role {
            Role::Teacher | Role::Admin => Ok(&self.0),
            Role::Student => {
                Err(ConveneError::Forbidden("Teacher or admin role required".to_string()).into())
            }
        }
    }

    /// Allow admins only.
    pub fn require_admin(&self) -> Result<&User, ApiError> {
        if self.0.role == Role::Admin {
            Ok(&self.0)
        } else {
            Err(ConveneError::Forbidden("Admin role required".to_string()).into())
        }
    }
}

impl FromRequestParts<Arc<AppContext>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ConveneError::Unauthorized(format!("Missing {USER_ID_HEADER} header"))
            })?;

        let id = Uuid::parse_str(header).map_err(|_| {
            ConveneError::Unauthorized(format!("Invalid {USER_ID_HEADER} header"))
        })?;

        let user = state
            .users
            .find_user(id)
            .await?
            .ok_or_else(|| ConveneError::Unauthorized("Unknown user".to_string()))?;

        Ok(Self(user))
    }
}
