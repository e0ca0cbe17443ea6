pub mod auth;
pub mod bills;
pub mod health;
pub mod reports;
pub mod trips;

use axum::http::StatusCode;
use axum::{Json, Router};
use gs_common::api::ApiErrorResponse;
use gs_common::error::AppError;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health::health))
        .route("/api/v1/auth/register", axum::routing::post(auth::register))
        .route("/api/v1/auth/login", axum::routing::post(auth::login))
        .route("/api/v1/auth/logout", axum::routing::post(auth::logout))
        .route(
            "/api/v1/bills",
            axum::routing::post(bills::upload).get(bills::list),
        )
        .route(
            "/api/v1/reports/footprint",
            axum::routing::get(reports::footprint),
        )
        .route(
            "/api/v1/trips",
            axum::routing::post(trips::create).get(trips::list),
        )
        .route(
            "/api/v1/trips/{trip_id}/carbon",
            axum::routing::get(trips::carbon_detail),
        )
        .with_state(state)
}

/// Every error leaves the API as a machine-distinguishable code plus a
/// human-readable message.
pub(crate) fn error_response(err: &AppError) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        err.status_code(),
        Json(ApiErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
        }),
    )
}
