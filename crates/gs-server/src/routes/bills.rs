use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Datelike, Utc};
use gs_common::api::{ApiErrorResponse, BillUploadResponse};
use gs_common::emissions::{co2_kg, parse_amount, UtilityType};
use gs_common::error::{AppError, AppResult};
use serde::Deserialize;

use crate::auth::identity::require_hotel;
use crate::routes::error_response;
use crate::state::AppState;
use crate::storage::bill_file_key;
use crate::stores::bill::{BillRecord, BillStore, NewBill};

#[derive(Debug, Deserialize)]
pub struct BillListParams {
    pub year: Option<i32>,
}

/// Upload one utility bill: multipart fields bill_type, bill_month,
/// bill_year, bill_amount, unit plus the bill file itself. The token is
/// checked before anything else so an unauthenticated request can never
/// leave an orphaned file; validation runs before the blob write so an
/// invalid bill can't either.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<BillUploadResponse>, (StatusCode, Json<ApiErrorResponse>)> {
    let account = require_hotel(&headers, &state.db_pool)
        .await
        .map_err(|e| error_response(&e))?;

    let fields = collect_fields(multipart)
        .await
        .map_err(|e| error_response(&e))?;
    let upload = validate_upload(fields).map_err(|e| error_response(&e))?;

    let derived_co2_kg =
        co2_kg(upload.bill_type, upload.bill_amount).map_err(|e| error_response(&e))?;

    let key = bill_file_key(
        account.account_id,
        upload.bill_year,
        upload.bill_month,
        &upload.file_name,
    );
    let file_url = state
        .storage
        .store(&key, upload.file_bytes)
        .await
        .map_err(|e| error_response(&e))?;

    let record = BillStore::new(state.db_pool.clone())
        .append(NewBill {
            account_id: account.account_id,
            bill_type: upload.bill_type,
            bill_month: upload.bill_month,
            bill_year: upload.bill_year,
            bill_amount: upload.bill_amount,
            unit: upload.unit,
            co2_kg: derived_co2_kg,
            file_url,
        })
        .await
        .map_err(|e| {
            // The blob write already succeeded; the orphaned file is
            // accepted rather than compensated.
            tracing::warn!(key = %key, error = %e, "ledger write failed after blob write");
            error_response(&e)
        })?;

    tracing::info!(
        bill_id = %record.bill_id,
        account_id = %record.account_id,
        bill_type = %record.bill_type.as_str(),
        co2_kg = record.co2_kg,
        "bill uploaded"
    );

    Ok(Json(BillUploadResponse {
        bill_id: record.bill_id,
        bill_type: record.bill_type,
        bill_month: record.bill_month,
        bill_year: record.bill_year,
        bill_amount: record.bill_amount,
        unit: record.unit,
        co2_kg: record.co2_kg,
        file_url: record.file_url,
        message: "bill uploaded successfully".to_string(),
    }))
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<BillListParams>,
) -> Result<Json<Vec<BillRecord>>, (StatusCode, Json<ApiErrorResponse>)> {
    let account = require_hotel(&headers, &state.db_pool)
        .await
        .map_err(|e| error_response(&e))?;

    let bills = BillStore::new(state.db_pool.clone())
        .list_for_account(account.account_id, params.year)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(bills))
}

#[derive(Debug, Default)]
struct UploadFields {
    bill_type: Option<String>,
    bill_month: Option<String>,
    bill_year: Option<String>,
    bill_amount: Option<String>,
    unit: Option<String>,
    file: Option<(String, Vec<u8>)>,
}

struct ValidatedUpload {
    bill_type: UtilityType,
    bill_month: u32,
    bill_year: i32,
    bill_amount: f64,
    unit: String,
    file_name: String,
    file_bytes: Vec<u8>,
}

async fn collect_fields(mut multipart: Multipart) -> AppResult<UploadFields> {
    let mut fields = UploadFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("malformed multipart payload: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("bill").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("failed to read file: {e}")))?;
                fields.file = Some((file_name, bytes.to_vec()));
            }
            Some(text_field) => {
                let text_field = text_field.to_string();
                let value = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("failed to read field {text_field}: {e}"))
                })?;
                match text_field.as_str() {
                    "bill_type" => fields.bill_type = Some(value),
                    "bill_month" => fields.bill_month = Some(value),
                    "bill_year" => fields.bill_year = Some(value),
                    "bill_amount" => fields.bill_amount = Some(value),
                    "unit" => fields.unit = Some(value),
                    _ => {}
                }
            }
            None => {}
        }
    }

    Ok(fields)
}

fn validate_upload(fields: UploadFields) -> AppResult<ValidatedUpload> {
    let raw_type = fields
        .bill_type
        .ok_or_else(|| missing_field("bill_type"))?;
    let bill_type = UtilityType::parse(raw_type.trim()).ok_or_else(|| {
        AppError::InvalidInput("bill_type must be 'electricity' or 'water'".to_string())
    })?;

    let bill_month: u32 = fields
        .bill_month
        .ok_or_else(|| missing_field("bill_month"))?
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput("bill_month must be an integer".to_string()))?;
    if !(1..=12).contains(&bill_month) {
        return Err(AppError::InvalidInput(
            "bill_month must be between 1 and 12".to_string(),
        ));
    }

    let bill_year: i32 = fields
        .bill_year
        .ok_or_else(|| missing_field("bill_year"))?
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput("bill_year must be an integer".to_string()))?;
    let max_year = Utc::now().year() + 1;
    if bill_year < 2020 || bill_year > max_year {
        return Err(AppError::InvalidInput(format!(
            "bill_year must be between 2020 and {max_year}"
        )));
    }

    let bill_amount = parse_amount(
        &fields
            .bill_amount
            .ok_or_else(|| missing_field("bill_amount"))?,
    )?;

    let unit = fields
        .unit
        .ok_or_else(|| missing_field("unit"))?
        .trim()
        .to_string();
    if !bill_type.accepts_unit(&unit) {
        return Err(AppError::InvalidInput(format!(
            "invalid unit for {}: accepted units are {}",
            bill_type.as_str(),
            bill_type.accepted_units().join(", ")
        )));
    }

    let (file_name, file_bytes) = fields.file.ok_or_else(|| missing_field("file"))?;

    Ok(ValidatedUpload {
        bill_type,
        bill_month,
        bill_year,
        bill_amount,
        unit,
        file_name,
        file_bytes,
    })
}

fn missing_field(name: &str) -> AppError {
    AppError::InvalidInput(format!("missing required field {name}"))
}
