//! Shared helpers for route tests: an in-memory app, auth bootstrap, and a
//! hand-rolled multipart body for bill uploads.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::memory::MemoryStorage;

pub(crate) const BOUNDARY: &str = "greenstay-test-boundary";

pub(crate) async fn test_app() -> (axum::Router, Arc<MemoryStorage>) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrate");

    let storage = Arc::new(MemoryStorage::new());
    let state = AppState::new(pool, storage.clone(), 24);
    (build_router(state), storage)
}

pub(crate) async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub(crate) fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub(crate) fn get_authed(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

pub(crate) async fn register_and_login(
    app: &axum::Router,
    name: &str,
    email: &str,
    account_type: &str,
) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/register",
            None,
            json!({
                "name": name,
                "email": email,
                "password": "securepassword123",
                "account_type": account_type
            }),
        ))
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            None,
            json!({"email": email, "password": "securepassword123"}),
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::OK);

    let login = body_json(response).await;
    login["token"].as_str().expect("token").to_string()
}

pub(crate) fn upload_request(
    token: Option<&str>,
    fields: &[(&str, &str)],
    with_file: bool,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if with_file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"march_bill.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"%PDF-1.4 fake bill");
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/bills")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).expect("request")
}

pub(crate) fn bill_fields<'a>(
    bill_type: &'a str,
    month: &'a str,
    year: &'a str,
    amount: &'a str,
    unit: &'a str,
) -> Vec<(&'a str, &'a str)> {
    vec![
        ("bill_type", bill_type),
        ("bill_month", month),
        ("bill_year", year),
        ("bill_amount", amount),
        ("unit", unit),
    ]
}

pub(crate) fn electricity_fields<'a>() -> Vec<(&'a str, &'a str)> {
    bill_fields("electricity", "3", "2024", "1450.75", "kWh")
}

pub(crate) async fn upload_ok(app: &axum::Router, token: &str, fields: &[(&str, &str)]) -> Value {
    let response = app
        .clone()
        .oneshot(upload_request(Some(token), fields, true))
        .await
        .expect("upload");
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}
