//! Admin analytics and report routes

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use convene_domain::{AttendanceRow, DashboardStats, EventAnalytics};
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::extract::CurrentUser;

pub fn build_analytics_routes() -> Router<Arc<AppContext>> {
    let analytics = Router::new()
        .route("/dashboard", get(dashboard_stats))
        .route("/events", get(event_analytics));
    let reports = Router::new().route("/attendance", get(attendance_report));

    Router::new().nest("/analytics", analytics).nest("/reports", reports)
}

#[derive(Debug, Deserialize)]
struct AnalyticsQuery {
    /// Window length in days; the service default applies when absent.
    days: Option<u32>,
}

/// Site-wide snapshot: users by role, events by computed status, activity
/// today.
async fn dashboard_stats(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
) -> ApiResult<Json<DashboardStats>> {
    user.require_admin()?;
    let stats = context.reporting_service.dashboard_stats().await?;
    Ok(Json(stats))
}

/// Windowed activity stats over the last `days` days.
async fn event_analytics(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<EventAnalytics>> {
    user.require_admin()?;
    let analytics = context.reporting_service.event_analytics(query.days).await?;
    Ok(Json(analytics))
}

/// One row per event with attendee count and fill rate.
async fn attendance_report(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
) -> ApiResult<Json<Vec<AttendanceRow>>> {
    user.require_admin()?;
    let rows = context.reporting_service.attendance_report().await?;
    Ok(Json(rows))
}
