//! Teacher dashboard routes

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use convene_domain::constants::MAX_PAGE_SIZE;
use convene_domain::{Event, EventFilter, Page, TeacherDashboard};

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::extract::CurrentUser;

pub fn build_teacher_routes() -> Router<Arc<AppContext>> {
    let routes =
        Router::new().route("/dashboard", get(dashboard)).route("/events", get(own_events));

    Router::new().nest("/teacher", routes)
}

/// Status totals, attendee count and recent events for the acting teacher.
async fn dashboard(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
) -> ApiResult<Json<TeacherDashboard>> {
    let teacher = user.require_teacher()?;
    let dashboard = context.reporting_service.teacher_dashboard(teacher.id).await?;
    Ok(Json(dashboard))
}

/// The acting teacher's own events; the creator scope is forced server side.
async fn own_events(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Query(mut filter): Query<EventFilter>,
) -> ApiResult<Json<Page<Event>>> {
    let teacher = user.require_teacher()?;
    filter.created_by = Some(teacher.id);
    filter.per_page = filter.per_page.map(|per_page| per_page.min(MAX_PAGE_SIZE));
    let page = context.event_service.list_events(&filter).await?;
    Ok(Json(page))
}
