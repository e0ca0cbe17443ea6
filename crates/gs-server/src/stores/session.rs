use chrono::{Duration, Utc};
use gs_common::error::{AppError, AppResult};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub account_id: Uuid,
    pub token_hash: String,
    pub token_prefix: String,
    pub expires_at: String,
}

#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        account_id: Uuid,
        token_hash: &str,
        token_prefix: &str,
        ttl: Duration,
    ) -> AppResult<SessionRecord> {
        let session_id = Uuid::new_v4();
        let expires_at = (Utc::now() + ttl).to_rfc3339();

        sqlx::query(
            "INSERT INTO sessions (session_id, account_id, token_hash, token_prefix, expires_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(session_id.to_string())
        .bind(account_id.to_string())
        .bind(token_hash)
        .bind(token_prefix)
        .bind(&expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to create session: {e}")))?;

        self.lookup_by_prefix(token_prefix)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn lookup_by_prefix(&self, prefix: &str) -> AppResult<Option<SessionRecord>> {
        let row = sqlx::query(
            "SELECT session_id, account_id, token_hash, token_prefix, expires_at \
             FROM sessions WHERE token_prefix = ?1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(prefix)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to lookup session: {e}")))?;

        row.map(row_to_session).transpose()
    }

    pub async fn delete_by_prefix(&self, prefix: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token_prefix = ?1")
            .bind(prefix)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Upstream(format!("failed to delete session: {e}")))?;
        Ok(())
    }
}

fn row_to_session(row: sqlx::sqlite::SqliteRow) -> AppResult<SessionRecord> {
    let session_id: String = row
        .try_get("session_id")
        .map_err(|e| AppError::Upstream(format!("read session_id failed: {e}")))?;
    let account_id: String = row
        .try_get("account_id")
        .map_err(|e| AppError::Upstream(format!("read account_id failed: {e}")))?;
    let token_hash: String = row
        .try_get("token_hash")
        .map_err(|e| AppError::Upstream(format!("read token_hash failed: {e}")))?;
    let token_prefix: String = row
        .try_get("token_prefix")
        .map_err(|e| AppError::Upstream(format!("read token_prefix failed: {e}")))?;
    let expires_at: String = row
        .try_get("expires_at")
        .map_err(|e| AppError::Upstream(format!("read expires_at failed: {e}")))?;

    Ok(SessionRecord {
        session_id: Uuid::parse_str(&session_id)
            .map_err(|e| AppError::Upstream(format!("invalid session_id uuid: {e}")))?,
        account_id: Uuid::parse_str(&account_id)
            .map_err(|e| AppError::Upstream(format!("invalid account_id uuid: {e}")))?,
        token_hash,
        token_prefix,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use gs_common::types::AccountType;
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::stores::account::AccountStore;

    use super::SessionStore;

    #[tokio::test]
    async fn create_lookup_delete_session() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("pool");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrate");

        let account = AccountStore::new(pool.clone())
            .create("Hotel", "h@example.com", "hash", AccountType::Hotel)
            .await
            .expect("account");

        let store = SessionStore::new(pool);
        let created = store
            .create(account.account_id, "hash", "gst_abcdef12", Duration::hours(24))
            .await
            .expect("create");
        assert_eq!(created.token_prefix, "gst_abcdef12");
        assert_eq!(created.account_id, account.account_id);

        let found = store
            .lookup_by_prefix("gst_abcdef12")
            .await
            .expect("lookup")
            .expect("exists");
        assert_eq!(found.session_id, created.session_id);

        store.delete_by_prefix("gst_abcdef12").await.expect("delete");
        let missing = store.lookup_by_prefix("gst_abcdef12").await.expect("lookup");
        assert!(missing.is_none());
    }
}
