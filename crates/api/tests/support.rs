//! Shared fixtures for HTTP API tests.

// Each test binary compiles this module separately and uses its own subset.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use convene_api::extract::USER_ID_HEADER;
use convene_api::{routes, AppContext};
use convene_domain::{NewUser, Role, User};
use convene_shared::{Config, DatabaseConfig, SweepConfig};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Full application wired against a temporary database, with one seeded
/// identity per role. The background sweep stays disabled so tests control
/// every write.
pub struct TestApp {
    pub router: Router,
    pub context: Arc<AppContext>,
    pub admin: User,
    pub teacher: User,
    pub student: User,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("convene-test.db");

        let config = Config {
            database: DatabaseConfig {
                path: db_path.to_string_lossy().to_string(),
                pool_size: 4,
            },
            sweep: SweepConfig { interval_seconds: 3600, enabled: false },
            ..Config::default()
        };

        let context =
            Arc::new(AppContext::new_with_config(config).await.expect("context should build"));
        let router = routes::router(Arc::clone(&context));

        let admin = seed_user(&context, "Site Admin", Role::Admin).await;
        let teacher = seed_user(&context, "Priya Raman", Role::Teacher).await;
        let student = seed_user(&context, "Jonah Lindqvist", Role::Student).await;

        Self { router, context, admin, teacher, student, _temp_dir: temp_dir }
    }

    /// Dispatch one request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("request should be handled")
    }

    /// Convenience wrapper asserting the response status before decoding.
    pub async fn send_expect(
        &self,
        request: Request<Body>,
        expected: StatusCode,
    ) -> Value {
        let response = self.send(request).await;
        let status = response.status();
        let body = json_body(response).await;
        assert_eq!(status, expected, "unexpected status, body: {body}");
        body
    }

    /// Create another account through the service layer.
    pub async fn seed_user(&self, name: &str, role: Role) -> User {
        seed_user(&self.context, name, role).await
    }
}

async fn seed_user(context: &Arc<AppContext>, name: &str, role: Role) -> User {
    let email = format!("{}@example.edu", name.to_lowercase().replace(' ', "."));
    let input =
        NewUser { name: name.to_string(), email, password: "changeme!".to_string(), role };
    context.user_service.create_user(input).await.expect("user should be created")
}

/// Build a request with the acting user's identity header.
pub fn request(
    method: Method,
    path: &str,
    acting: Option<&User>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(user) = acting {
        builder = builder.header(USER_ID_HEADER, user.id.to_string());
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

/// Build a request carrying a raw identity header value, valid or not.
pub fn request_with_identity(method: Method, path: &str, raw_id: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(USER_ID_HEADER, raw_id)
        .body(Body::empty())
        .expect("request should build")
}

/// Collect a response body as JSON.
pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be json")
    }
}
