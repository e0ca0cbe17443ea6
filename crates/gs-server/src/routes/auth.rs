use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use gs_common::api::{
    ApiErrorResponse, LoginRequest, LoginResponse, RegisterAccountRequest, RegisterAccountResponse,
};
use gs_common::error::AppError;
use gs_common::types::AccountType;

use crate::auth::identity::bearer_token;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::{issue_session_token, token_prefix_from_raw, verify_session_token};
use crate::routes::error_response;
use crate::state::AppState;
use crate::stores::account::AccountStore;
use crate::stores::session::SessionStore;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAccountRequest>,
) -> Result<Json<RegisterAccountResponse>, (StatusCode, Json<ApiErrorResponse>)> {
    let account_type = parse_account_type(&payload.account_type).ok_or_else(|| {
        error_response(&AppError::InvalidInput(
            "account_type must be hotel|travel_agent".to_string(),
        ))
    })?;
    validate_registration(&payload).map_err(|e| error_response(&e))?;

    let password_hash = hash_password(&payload.password).map_err(|e| error_response(&e))?;

    let store = AccountStore::new(state.db_pool.clone());
    let account = store
        .create(
            payload.name.trim(),
            payload.email.trim(),
            &password_hash,
            account_type,
        )
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE") {
                error_response(&AppError::Conflict("email already registered".to_string()))
            } else {
                error_response(&e)
            }
        })?;

    tracing::info!(account_id = %account.account_id, account_type = ?account.account_type, "account registered");

    Ok(Json(RegisterAccountResponse {
        account_id: account.account_id,
        message: "account registered successfully".to_string(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ApiErrorResponse>)> {
    let store = AccountStore::new(state.db_pool.clone());

    let credentials = store
        .credentials_by_email(payload.email.trim())
        .await
        .map_err(|e| error_response(&e))?;

    // Same rejection for unknown email and wrong password.
    let (account_id, stored_hash) =
        credentials.ok_or_else(|| error_response(&AppError::Unauthorized))?;
    let verified =
        verify_password(&stored_hash, &payload.password).map_err(|e| error_response(&e))?;
    if !verified {
        return Err(error_response(&AppError::Unauthorized));
    }

    let account = store
        .get(account_id)
        .await
        .map_err(|e| error_response(&e))?
        .ok_or_else(|| error_response(&AppError::Unauthorized))?;

    let issued = issue_session_token().map_err(|e| error_response(&e))?;
    let session = SessionStore::new(state.db_pool.clone())
        .create(
            account.account_id,
            &issued.token_hash,
            &issued.token_prefix,
            state.session_ttl,
        )
        .await
        .map_err(|e| error_response(&e))?;

    tracing::info!(account_id = %account.account_id, "login succeeded");

    Ok(Json(LoginResponse {
        token: issued.raw_token,
        expires_at: session.expires_at,
        account_id: account.account_id,
        account_name: account.name,
    }))
}

pub async fn logout(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<StatusCode, StatusCode> {
    let token = bearer_token(&headers).ok_or(StatusCode::UNAUTHORIZED)?;
    let token_prefix = token_prefix_from_raw(token).ok_or(StatusCode::UNAUTHORIZED)?;

    let store = SessionStore::new(state.db_pool.clone());
    let session = store
        .lookup_by_prefix(&token_prefix)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let verified =
        verify_session_token(&session.token_hash, token).map_err(|_| StatusCode::UNAUTHORIZED)?;
    if !verified {
        return Err(StatusCode::UNAUTHORIZED);
    }

    store
        .delete_by_prefix(&token_prefix)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_account_type(raw: &str) -> Option<AccountType> {
    match raw {
        "hotel" => Some(AccountType::Hotel),
        "travel_agent" => Some(AccountType::TravelAgent),
        _ => None,
    }
}

fn validate_registration(payload: &RegisterAccountRequest) -> Result<(), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name must not be empty".to_string()));
    }
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidInput(
            "email must be a valid address".to_string(),
        ));
    }
    if payload.password.len() < 8 {
        return Err(AppError::InvalidInput(
            "password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}
