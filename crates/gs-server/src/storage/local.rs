use std::path::PathBuf;

use async_trait::async_trait;
use gs_common::error::{AppError, AppResult};

use super::BillStorage;

/// Filesystem-backed bill store. Files land under `root`, and the returned
/// URI is `public_base` + key so the ledger stays storage-agnostic.
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }
}

#[async_trait]
impl BillStorage for LocalStorage {
    async fn store(&self, key: &str, bytes: Vec<u8>) -> AppResult<String> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Upstream(format!("blob store mkdir failed: {e}")))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Upstream(format!("blob store write failed: {e}")))?;

        Ok(format!(
            "{}/{}",
            self.public_base.trim_end_matches('/'),
            key
        ))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::storage::{bill_file_key, BillStorage};

    use super::LocalStorage;

    #[tokio::test]
    async fn stores_bytes_and_returns_uri() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = LocalStorage::new(dir.path(), "https://files.example.com");

        let key = bill_file_key(Uuid::new_v4(), 2024, 3, "bill.pdf");
        let uri = storage
            .store(&key, b"%PDF-1.4 fake".to_vec())
            .await
            .expect("store");

        assert_eq!(uri, format!("https://files.example.com/{key}"));
        let on_disk = std::fs::read(dir.path().join(&key)).expect("read back");
        assert_eq!(on_disk, b"%PDF-1.4 fake");
    }
}
