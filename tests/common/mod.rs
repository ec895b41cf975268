//! Test helpers for integration testing.
//!
//! Builds an in-memory application with a recording mailer, seeds rows
//! directly and drives the router with `oneshot` requests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::util::ServiceExt;

use curio::endpoints::create_router;
use curio::migrations::Migrator;
use curio::models::{group, organisation, organisation_admin, user, Cadence, GroupType, UserRole};
use curio::services::mail::RecordingMailer;
use curio::state::AppState;

pub const TEST_PASSWORD: &str = "password123";

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Application state over a fresh database, plus the mailer it sends through
pub async fn create_test_state() -> (AppState, Arc<RecordingMailer>) {
    let db = create_test_db().await;
    let mailer = Arc::new(RecordingMailer::default());
    (AppState::new(db, mailer.clone()), mailer)
}

pub fn app(state: &AppState) -> Router {
    create_router(state.clone())
}

/// Insert an active user whose password is [`TEST_PASSWORD`]
pub async fn create_test_user(db: &DatabaseConnection, email: &str, role: UserRole) -> user::Model {
    let now = chrono::Utc::now();
    user::ActiveModel {
        email: Set(email.to_lowercase()),
        full_name: Set(email.split('@').next().unwrap_or(email).to_string()),
        role: Set(role),
        hashed_password: Set(Some(bcrypt::hash(TEST_PASSWORD, 4).unwrap())),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        last_login_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_test_org(db: &DatabaseConnection, name: &str) -> organisation::Model {
    let now = chrono::Utc::now();
    organisation::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(name.to_lowercase().replace(' ', "-")),
        description: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_test_group(
    db: &DatabaseConnection,
    organisation_id: i64,
    name: &str,
) -> group::Model {
    let now = chrono::Utc::now();
    group::ActiveModel {
        organisation_id: Set(organisation_id),
        name: Set(name.to_string()),
        description: Set(None),
        group_type: Set(GroupType::default()),
        audience_description: Set(None),
        cadence: Set(Cadence::default()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn make_org_admin(db: &DatabaseConnection, organisation_id: i64, user_id: i64) {
    organisation_admin::ActiveModel {
        organisation_id: Set(organisation_id),
        user_id: Set(user_id),
        assigned_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

/// Log in through the password endpoint and return the `Cookie` header value
pub async fn login(state: &AppState, email: &str) -> String {
    let response = app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "email": email, "password": TEST_PASSWORD }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "login failed for {email}");
    cookie_from(&response).expect("login did not set a session cookie")
}

/// `name=value` part of the response's `Set-Cookie` header
pub fn cookie_from<B>(response: &axum::http::Response<B>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: Value,
}

pub async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let set_cookie = cookie_from(&response);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        location,
        set_cookie,
        body,
    }
}

pub async fn get(state: &AppState, uri: &str, cookie: Option<&str>) -> TestResponse {
    send(state, "GET", uri, cookie, None).await
}

pub async fn post(state: &AppState, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
    send(state, "POST", uri, cookie, Some(body)).await
}
