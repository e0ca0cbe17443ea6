use gs_common::emissions::UtilityType;
use gs_common::error::{AppError, AppResult};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillRecord {
    pub bill_id: Uuid,
    pub account_id: Uuid,
    pub bill_type: UtilityType,
    pub bill_month: u32,
    pub bill_year: i32,
    pub bill_amount: f64,
    pub unit: String,
    pub co2_kg: f64,
    pub file_url: String,
    pub uploaded_at: String,
}

#[derive(Debug, Clone)]
pub struct NewBill {
    pub account_id: Uuid,
    pub bill_type: UtilityType,
    pub bill_month: u32,
    pub bill_year: i32,
    pub bill_amount: f64,
    pub unit: String,
    pub co2_kg: f64,
    pub file_url: String,
}

#[derive(Clone)]
pub struct BillStore {
    pool: SqlitePool,
}

impl BillStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one validated bill row. Bills are immutable after this point.
    pub async fn append(&self, input: NewBill) -> AppResult<BillRecord> {
        let bill_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO bills (bill_id, account_id, bill_type, bill_month, bill_year, bill_amount, unit, co2_kg, file_url) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(bill_id.to_string())
        .bind(input.account_id.to_string())
        .bind(input.bill_type.as_str())
        .bind(input.bill_month as i64)
        .bind(input.bill_year as i64)
        .bind(input.bill_amount)
        .bind(&input.unit)
        .bind(input.co2_kg)
        .bind(&input.file_url)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to append bill: {e}")))?;

        self.get(bill_id).await?.ok_or(AppError::NotFound)
    }

    pub async fn get(&self, bill_id: Uuid) -> AppResult<Option<BillRecord>> {
        let row = sqlx::query(
            "SELECT bill_id, account_id, bill_type, bill_month, bill_year, bill_amount, unit, co2_kg, file_url, uploaded_at \
             FROM bills WHERE bill_id = ?1",
        )
        .bind(bill_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to fetch bill: {e}")))?;

        row.map(row_to_bill).transpose()
    }

    /// Every read is scoped to the owning account; the owner filter is the
    /// access-control boundary for bill data.
    pub async fn list_for_account(
        &self,
        account_id: Uuid,
        year: Option<i32>,
    ) -> AppResult<Vec<BillRecord>> {
        let rows = if let Some(year) = year {
            sqlx::query(
                "SELECT bill_id, account_id, bill_type, bill_month, bill_year, bill_amount, unit, co2_kg, file_url, uploaded_at \
                 FROM bills WHERE account_id = ?1 AND bill_year = ?2 \
                 ORDER BY bill_year, bill_month, uploaded_at",
            )
            .bind(account_id.to_string())
            .bind(year as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Upstream(format!("failed to list bills: {e}")))?
        } else {
            sqlx::query(
                "SELECT bill_id, account_id, bill_type, bill_month, bill_year, bill_amount, unit, co2_kg, file_url, uploaded_at \
                 FROM bills WHERE account_id = ?1 \
                 ORDER BY bill_year, bill_month, uploaded_at",
            )
            .bind(account_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Upstream(format!("failed to list bills: {e}")))?
        };

        rows.into_iter().map(row_to_bill).collect()
    }
}

fn row_to_bill(row: sqlx::sqlite::SqliteRow) -> AppResult<BillRecord> {
    let bill_id: String = row
        .try_get("bill_id")
        .map_err(|e| AppError::Upstream(format!("read bill_id failed: {e}")))?;
    let account_id: String = row
        .try_get("account_id")
        .map_err(|e| AppError::Upstream(format!("read account_id failed: {e}")))?;
    let bill_type: String = row
        .try_get("bill_type")
        .map_err(|e| AppError::Upstream(format!("read bill_type failed: {e}")))?;
    let bill_month: i64 = row
        .try_get("bill_month")
        .map_err(|e| AppError::Upstream(format!("read bill_month failed: {e}")))?;
    let bill_year: i64 = row
        .try_get("bill_year")
        .map_err(|e| AppError::Upstream(format!("read bill_year failed: {e}")))?;
    let bill_amount: f64 = row
        .try_get("bill_amount")
        .map_err(|e| AppError::Upstream(format!("read bill_amount failed: {e}")))?;
    let unit: String = row
        .try_get("unit")
        .map_err(|e| AppError::Upstream(format!("read unit failed: {e}")))?;
    let co2_kg: f64 = row
        .try_get("co2_kg")
        .map_err(|e| AppError::Upstream(format!("read co2_kg failed: {e}")))?;
    let file_url: String = row
        .try_get("file_url")
        .map_err(|e| AppError::Upstream(format!("read file_url failed: {e}")))?;
    let uploaded_at: String = row
        .try_get("uploaded_at")
        .map_err(|e| AppError::Upstream(format!("read uploaded_at failed: {e}")))?;

    Ok(BillRecord {
        bill_id: Uuid::parse_str(&bill_id)
            .map_err(|e| AppError::Upstream(format!("invalid bill_id uuid: {e}")))?,
        account_id: Uuid::parse_str(&account_id)
            .map_err(|e| AppError::Upstream(format!("invalid account_id uuid: {e}")))?,
        bill_type: UtilityType::parse(&bill_type)
            .ok_or_else(|| AppError::Upstream(format!("invalid bill type: {bill_type}")))?,
        bill_month: bill_month as u32,
        bill_year: bill_year as i32,
        bill_amount,
        unit,
        co2_kg,
        file_url,
        uploaded_at,
    })
}
