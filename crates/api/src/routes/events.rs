//! Event routes: CRUD, listing, registration and attendee access

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use convene_domain::constants::MAX_PAGE_SIZE;
use convene_domain::{Event, EventDetails, EventFilter, EventPatch, NewEvent, Page, PublicUser};
use uuid::Uuid;

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::extract::CurrentUser;

pub fn build_event_routes() -> Router<Arc<AppContext>> {
    let routes = Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{id}", get(get_event).put(update_event).delete(delete_event))
        .route("/{id}/register", post(register))
        .route("/{id}/unregister", post(unregister))
        .route("/{id}/attendees", get(list_attendees));

    Router::new().nest("/events", routes)
}

fn clamp_page_size(mut filter: EventFilter) -> EventFilter {
    filter.per_page = filter.per_page.map(|per_page| per_page.min(MAX_PAGE_SIZE));
    filter
}

/// List events; every returned event carries its computed status.
async fn list_events(
    _user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Query(filter): Query<EventFilter>,
) -> ApiResult<Json<Page<Event>>> {
    let filter = clamp_page_size(filter);
    let page = context.event_service.list_events(&filter).await?;
    Ok(Json(page))
}

/// Create an event; teachers and admins only.
async fn create_event(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Json(input): Json<NewEvent>,
) -> ApiResult<(StatusCode, Json<EventDetails>)> {
    let creator = user.require_teacher()?;
    let details = context.event_service.create_event(creator.id, input).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

/// One event, fully resolved.
async fn get_event(
    _user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventDetails>> {
    let details = context.event_service.get_event(id).await?;
    Ok(Json(details))
}

/// Patch an event; teachers and admins only.
async fn update_event(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<EventPatch>,
) -> ApiResult<Json<EventDetails>> {
    user.require_teacher()?;
    let details = context.event_service.update_event(id, patch).await?;
    Ok(Json(details))
}

/// Delete an event with cascading cleanup.
///
/// The ownership rule lives in the service: admins delete anything,
/// teachers only their own events.
async fn delete_event(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require_teacher()?;
    context.event_service.delete_event(id, &user.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register the acting user for an event.
async fn register(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventDetails>> {
    let details = context.registration_service.register(id, user.0.id).await?;
    Ok(Json(details))
}

/// Withdraw the acting user from an event.
async fn unregister(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventDetails>> {
    let details = context.registration_service.unregister(id, user.0.id).await?;
    Ok(Json(details))
}

/// Attendee list; restricted to the event owner or an admin by the service.
async fn list_attendees(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let attendees = context.event_service.event_attendees(id, &user.0).await?;
    Ok(Json(attendees))
}
