use gs_common::error::{AppError, AppResult};
use gs_common::types::AccountType;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRecord {
    pub account_id: Uuid,
    pub name: String,
    pub email: String,
    pub account_type: AccountType,
    pub created_at: String,
}

#[derive(Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        account_type: AccountType,
    ) -> AppResult<AccountRecord> {
        let account_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO accounts (account_id, name, email, password_hash, account_type) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(account_id.to_string())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(account_type_to_db(account_type))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to create account: {e}")))?;

        self.get(account_id).await?.ok_or(AppError::NotFound)
    }

    pub async fn get(&self, account_id: Uuid) -> AppResult<Option<AccountRecord>> {
        let row = sqlx::query(
            "SELECT account_id, name, email, account_type, created_at \
             FROM accounts WHERE account_id = ?1",
        )
        .bind(account_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to fetch account: {e}")))?;

        row.map(row_to_account).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<AccountRecord>> {
        let row = sqlx::query(
            "SELECT account_id, name, email, account_type, created_at \
             FROM accounts WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to fetch account by email: {e}")))?;

        row.map(row_to_account).transpose()
    }

    /// Credential lookup for login: account id plus the stored argon2 hash.
    pub async fn credentials_by_email(&self, email: &str) -> AppResult<Option<(Uuid, String)>> {
        let row = sqlx::query("SELECT account_id, password_hash FROM accounts WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Upstream(format!("failed to lookup credentials: {e}")))?;

        row.map(|r| {
            let account_id: String = r
                .try_get("account_id")
                .map_err(|e| AppError::Upstream(format!("read account_id failed: {e}")))?;
            let password_hash: String = r
                .try_get("password_hash")
                .map_err(|e| AppError::Upstream(format!("read password_hash failed: {e}")))?;
            let parsed = Uuid::parse_str(&account_id)
                .map_err(|e| AppError::Upstream(format!("invalid account_id uuid: {e}")))?;
            Ok((parsed, password_hash))
        })
        .transpose()
    }
}

fn row_to_account(row: sqlx::sqlite::SqliteRow) -> AppResult<AccountRecord> {
    let account_id: String = row
        .try_get("account_id")
        .map_err(|e| AppError::Upstream(format!("read account_id failed: {e}")))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| AppError::Upstream(format!("read name failed: {e}")))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| AppError::Upstream(format!("read email failed: {e}")))?;
    let account_type: String = row
        .try_get("account_type")
        .map_err(|e| AppError::Upstream(format!("read account_type failed: {e}")))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| AppError::Upstream(format!("read created_at failed: {e}")))?;

    Ok(AccountRecord {
        account_id: Uuid::parse_str(&account_id)
            .map_err(|e| AppError::Upstream(format!("invalid account_id uuid: {e}")))?,
        name,
        email,
        account_type: account_type_from_db(&account_type)?,
        created_at,
    })
}

fn account_type_to_db(account_type: AccountType) -> &'static str {
    match account_type {
        AccountType::Hotel => "hotel",
        AccountType::TravelAgent => "travel_agent",
    }
}

fn account_type_from_db(raw: &str) -> AppResult<AccountType> {
    match raw {
        "hotel" => Ok(AccountType::Hotel),
        "travel_agent" => Ok(AccountType::TravelAgent),
        _ => Err(AppError::Upstream(format!("invalid account type: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use gs_common::types::AccountType;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::AccountStore;

    async fn test_pool() -> sqlx::SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("pool");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrate");
        pool
    }

    #[tokio::test]
    async fn create_and_fetch_account() {
        let store = AccountStore::new(test_pool().await);

        let created = store
            .create(
                "Grand Resort",
                "admin@grandresort.example",
                "$argon2id$fake",
                AccountType::Hotel,
            )
            .await
            .expect("create");
        assert_eq!(created.account_type, AccountType::Hotel);

        let fetched = store
            .get(created.account_id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(fetched.name, "Grand Resort");

        let by_email = store
            .find_by_email("admin@grandresort.example")
            .await
            .expect("find")
            .expect("exists");
        assert_eq!(by_email.account_id, created.account_id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = AccountStore::new(test_pool().await);

        store
            .create("One", "dup@example.com", "hash", AccountType::Hotel)
            .await
            .expect("first create");

        let err = store
            .create("Two", "dup@example.com", "hash", AccountType::TravelAgent)
            .await
            .expect_err("duplicate should fail");
        assert!(err.to_string().contains("UNIQUE"));
    }

    #[tokio::test]
    async fn credentials_lookup_returns_hash() {
        let store = AccountStore::new(test_pool().await);
        let created = store
            .create(
                "Tours Inc",
                "sarah@tours.example",
                "stored-hash",
                AccountType::TravelAgent,
            )
            .await
            .expect("create");

        let (account_id, hash) = store
            .credentials_by_email("sarah@tours.example")
            .await
            .expect("lookup")
            .expect("exists");
        assert_eq!(account_id, created.account_id);
        assert_eq!(hash, "stored-hash");

        let missing = store
            .credentials_by_email("nobody@tours.example")
            .await
            .expect("lookup");
        assert!(missing.is_none());
    }
}
