use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use gs_common::error::{AppError, AppResult};
use gs_common::types::AccountType;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::session::{token_prefix_from_raw, verify_session_token};
use crate::stores::account::AccountStore;
use crate::stores::session::SessionStore;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedAccount {
    pub account_id: Uuid,
    pub name: String,
    pub account_type: AccountType,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ")
}

/// Resolve a bearer token to its account, or fail with Unauthorized. This
/// runs at the entry of every protected operation, before any read or write
/// of protected data.
pub async fn authenticate(headers: &HeaderMap, pool: &SqlitePool) -> AppResult<AuthenticatedAccount> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    let token_prefix = token_prefix_from_raw(token).ok_or(AppError::Unauthorized)?;

    let sessions = SessionStore::new(pool.clone());
    let session = sessions
        .lookup_by_prefix(&token_prefix)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let verified =
        verify_session_token(&session.token_hash, token).map_err(|_| AppError::Unauthorized)?;
    if !verified {
        return Err(AppError::Unauthorized);
    }

    let expires_at = DateTime::parse_from_rfc3339(&session.expires_at)
        .map_err(|e| AppError::Upstream(format!("invalid session expiry: {e}")))?;
    if expires_at < Utc::now() {
        return Err(AppError::Unauthorized);
    }

    let account = AccountStore::new(pool.clone())
        .get(session.account_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(AuthenticatedAccount {
        account_id: account.account_id,
        name: account.name,
        account_type: account.account_type,
    })
}

/// Bill endpoints are hotel-only.
pub async fn require_hotel(headers: &HeaderMap, pool: &SqlitePool) -> AppResult<AuthenticatedAccount> {
    let account = authenticate(headers, pool).await?;
    if account.account_type != AccountType::Hotel {
        return Err(AppError::Forbidden);
    }
    Ok(account)
}

/// Trip endpoints are travel-agent-only.
pub async fn require_travel_agent(
    headers: &HeaderMap,
    pool: &SqlitePool,
) -> AppResult<AuthenticatedAccount> {
    let account = authenticate(headers, pool).await?;
    if account.account_type != AccountType::TravelAgent {
        return Err(AppError::Forbidden);
    }
    Ok(account)
}
