use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Datelike, Utc};
use gs_common::api::{ApiErrorResponse, FootprintResponse};
use serde::Deserialize;

use crate::auth::identity::require_hotel;
use crate::report::build_footprint;
use crate::routes::error_response;
use crate::state::AppState;
use crate::stores::bill::BillStore;

#[derive(Debug, Deserialize)]
pub struct FootprintParams {
    pub year: Option<i32>,
}

/// Yearly carbon footprint for the authenticated hotel. Missing `year`
/// defaults to the current year; a year without bills reports zeroes.
pub async fn footprint(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<FootprintParams>,
) -> Result<Json<FootprintResponse>, (StatusCode, Json<ApiErrorResponse>)> {
    let account = require_hotel(&headers, &state.db_pool)
        .await
        .map_err(|e| error_response(&e))?;

    let year = params.year.unwrap_or_else(|| Utc::now().year());
    let bills = BillStore::new(state.db_pool.clone())
        .list_for_account(account.account_id, Some(year))
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(build_footprint(&account.name, year, &bills)))
}
