//! Admin user management routes

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use convene_domain::constants::MAX_PAGE_SIZE;
use convene_domain::{NewUser, Page, User, UserFilter, UserPatch};
use uuid::Uuid;

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::extract::CurrentUser;

pub fn build_admin_user_routes() -> Router<Arc<AppContext>> {
    let routes = Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", put(update_user).delete(delete_user));

    Router::new().nest("/admin/users", routes)
}

fn clamp_page_size(mut filter: UserFilter) -> UserFilter {
    filter.per_page = filter.per_page.map(|per_page| per_page.min(MAX_PAGE_SIZE));
    filter
}

/// List users with role filter, search and paging.
///
/// `User` never serializes its password hash, so the page is safe to
/// return as is.
async fn list_users(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Json<Page<User>>> {
    user.require_admin()?;
    let filter = clamp_page_size(filter);
    let page = context.user_service.list_users(&filter).await?;
    Ok(Json(page))
}

/// Create a user account.
async fn create_user(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Json(input): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    user.require_admin()?;
    let created = context.user_service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Patch a user's name, role or password.
async fn update_user(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UserPatch>,
) -> ApiResult<Json<User>> {
    user.require_admin()?;
    let updated = context.user_service.update_user(id, patch).await?;
    Ok(Json(updated))
}

/// Delete a user together with their registrations.
async fn delete_user(
    user: CurrentUser,
    State(context): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require_admin()?;
    context.user_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
