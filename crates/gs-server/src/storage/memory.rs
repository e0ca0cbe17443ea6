use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use gs_common::error::AppResult;
use tokio::sync::RwLock;

use super::BillStorage;

/// In-memory bill store for development and tests.
#[derive(Default)]
pub struct MemoryStorage {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn file_count(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.files.read().await.contains_key(key)
    }
}

#[async_trait]
impl BillStorage for MemoryStorage {
    async fn store(&self, key: &str, bytes: Vec<u8>) -> AppResult<String> {
        self.files.write().await.insert(key.to_string(), bytes);
        Ok(format!("memory://{key}"))
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::BillStorage;

    use super::MemoryStorage;

    #[tokio::test]
    async fn stores_and_counts_files() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.file_count().await, 0);

        let uri = storage
            .store("acct/2024-03/bill.pdf", vec![1, 2, 3])
            .await
            .expect("store");
        assert_eq!(uri, "memory://acct/2024-03/bill.pdf");
        assert_eq!(storage.file_count().await, 1);
        assert!(storage.contains("acct/2024-03/bill.pdf").await);
    }
}
