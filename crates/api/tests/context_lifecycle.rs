//! Application context wiring: scheduler lifecycle and health reporting.

#[path = "support.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, Request, StatusCode};
use chrono::Utc;
use convene_api::AppContext;
use convene_core::{EventStore, UserStore};
use convene_domain::{Event, EventStatus, Role, User};
use convene_infra::{DbManager, SqliteEventRepository, SqliteUserRepository};
use convene_shared::{Config, DatabaseConfig, SweepConfig};
use support::{json_body, TestApp};
use tempfile::TempDir;
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread")]
async fn disabled_sweep_leaves_no_scheduler() {
    let app = TestApp::new().await;
    assert!(app.context.status_scheduler.is_none());

    // Disabled still counts as healthy.
    let health = app.context.health_check().await;
    assert!(health.is_healthy);
}

#[tokio::test(flavor = "multi_thread")]
async fn health_endpoint_reports_component_breakdown() {
    let app = TestApp::new().await;

    // Health is reachable without an identity header.
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(axum::body::Body::empty())
        .expect("request should build");
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["is_healthy"], true);
    assert_eq!(body["score"], 1.0);

    let names: Vec<&str> = body["components"]
        .as_array()
        .expect("components is an array")
        .iter()
        .filter_map(|component| component["name"].as_str())
        .collect();
    assert_eq!(names, vec!["database", "status_sweep"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn enabled_sweep_repairs_stale_rows_at_startup() {
    let temp_dir = TempDir::new().expect("temp dir should be created");
    let db_path = temp_dir.path().join("convene-test.db");

    // Seed a drifted row before the application comes up.
    let event_id = {
        let db = Arc::new(
            DbManager::new(&db_path, 2).expect("bootstrap pool should open"),
        );
        db.run_migrations().expect("migrations apply");
        let events = SqliteEventRepository::new(Arc::clone(&db));
        let users = SqliteUserRepository::new(Arc::clone(&db));

        let now = Utc::now();
        let teacher = User {
            id: Uuid::now_v7(),
            name: "Priya Raman".to_string(),
            email: "priya.raman@example.edu".to_string(),
            password_hash: "irrelevant".to_string(),
            role: Role::Teacher,
            events_attended: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        users.insert_user(&teacher).await.expect("teacher inserted");

        let event = Event {
            id: Uuid::now_v7(),
            title: "Finished long ago".to_string(),
            description: "Stored status never caught up".to_string(),
            venue: "Hall B".to_string(),
            start_time: now - chrono::Duration::hours(4),
            end_time: now - chrono::Duration::hours(2),
            capacity: None,
            status: EventStatus::Upcoming,
            created_by: teacher.id,
            attendees: Vec::new(),
            created_at: now - chrono::Duration::hours(6),
            updated_at: now - chrono::Duration::hours(6),
        };
        events.insert_event(&event).await.expect("event inserted");
        event.id
    };

    // Long interval: only the startup sweep can fix the row.
    let config = Config {
        database: DatabaseConfig { path: db_path.to_string_lossy().to_string(), pool_size: 4 },
        sweep: SweepConfig { interval_seconds: 3600, enabled: true },
        ..Config::default()
    };
    let context =
        Arc::new(AppContext::new_with_config(config).await.expect("context should build"));

    let scheduler = context.status_scheduler.as_ref().expect("scheduler should be present");
    assert!(scheduler.is_running());

    let mut repaired = false;
    for _ in 0..40 {
        let stored = context
            .events
            .find_event(event_id)
            .await
            .expect("event loads")
            .expect("event exists");
        if stored.status == EventStatus::Completed {
            repaired = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(repaired, "startup sweep should persist the computed status");

    let health = context.health_check().await;
    assert!(health.is_healthy);

    context.shutdown().await.expect("shutdown succeeds");
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_paths_fall_through_to_404() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/nope")
        .body(axum::body::Body::empty())
        .expect("request should build");
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
