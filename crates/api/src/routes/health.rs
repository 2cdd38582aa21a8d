//! Liveness endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::context::AppContext;
use crate::utils::health::HealthStatus;

pub fn build_health_routes() -> Router<Arc<AppContext>> {
    Router::new().route("/health", get(health))
}

/// Liveness plus a database round trip; 503 when degraded.
async fn health(State(context): State<Arc<AppContext>>) -> (StatusCode, Json<HealthStatus>) {
    let status = context.health_check().await;
    let code = if status.is_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(status))
}
