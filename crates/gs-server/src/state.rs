use std::sync::Arc;

use chrono::Duration;
use sqlx::SqlitePool;

use crate::storage::BillStorage;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub storage: Arc<dyn BillStorage>,
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, storage: Arc<dyn BillStorage>, session_ttl_hours: i64) -> Self {
        Self {
            db_pool,
            storage,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }
}
