//! Route assembly
//!
//! Each module contributes one router; everything shares the application
//! context as axum state.

pub mod analytics;
pub mod events;
pub mod health;
pub mod teacher;
pub mod users;

use std::sync::Arc;

use axum::Router;

use crate::context::AppContext;

/// Assemble the full application router.
pub fn router(context: Arc<AppContext>) -> Router {
    Router::new()
        .merge(health::build_health_routes())
        .merge(events::build_event_routes())
        .merge(users::build_admin_user_routes())
        .merge(teacher::build_teacher_routes())
        .merge(analytics::build_analytics_routes())
        .with_state(context)
}
