//! Blob storage for uploaded bill files. The ledger only keeps the URI;
//! the bytes live behind this trait.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use gs_common::error::AppResult;
use uuid::Uuid;

/// Abstraction over the bill file store: accepts a key and a byte payload,
/// returns a retrievable URI.
#[async_trait]
pub trait BillStorage: Send + Sync {
    async fn store(&self, key: &str, bytes: Vec<u8>) -> AppResult<String>;
}

/// Key for an uploaded bill file. Scoped by account so concurrent uploads
/// from different hotels can never collide, unique per upload.
pub fn bill_file_key(account_id: Uuid, year: i32, month: u32, file_name: &str) -> String {
    let file_name = sanitize_file_name(file_name);
    format!(
        "{}/{}-{:02}/{}_{}",
        account_id,
        year,
        month,
        Uuid::new_v4().simple(),
        file_name
    )
}

fn sanitize_file_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "bill".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::bill_file_key;

    #[test]
    fn keys_are_account_scoped_and_unique() {
        let account = Uuid::new_v4();
        let first = bill_file_key(account, 2024, 3, "march bill.pdf");
        let second = bill_file_key(account, 2024, 3, "march bill.pdf");

        assert!(first.starts_with(&format!("{account}/2024-03/")));
        assert!(first.ends_with("march_bill.pdf"));
        assert_ne!(first, second);
    }

    #[test]
    fn hostile_file_names_cannot_add_path_segments() {
        let account = Uuid::new_v4();
        let key = bill_file_key(account, 2024, 1, "../../etc/passwd");

        let segments: Vec<&str> = key.split('/').collect();
        assert_eq!(segments.len(), 3); // account / period / file, nothing injected
        assert!(segments[2].ends_with("etc_passwd"));
    }
}
