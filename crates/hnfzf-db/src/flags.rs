//! Database operations for the `product_flags` table.
//!
//! A flag is an operator annotation on a retailer SKU (e.g. "clearance",
//! "recalled"). Each SKU carries at most one flag per flag type.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `product_flags` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FlagRow {
    pub id: i64,
    pub sku: String,
    pub flag_type: String,
    pub flag_value: Option<String>,
    /// Free-form JSON attached by whoever set the flag.
    pub additional_data: Option<Value>,
    /// `NULL` means the flag never expires.
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`upsert_flag`].
#[derive(Debug, Clone, Copy)]
pub struct NewFlag<'a> {
    pub sku: &'a str,
    pub flag_type: &'a str,
    pub flag_value: Option<&'a str>,
    pub additional_data: Option<&'a Value>,
    pub expiry_date: Option<DateTime<Utc>>,
}

const FLAG_COLUMNS: &str = "id, sku, flag_type, flag_value, additional_data, expiry_date, \
                            created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every flag on `sku`, expired ones included, ordered by flag type.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_flags_for_sku(pool: &PgPool, sku: &str) -> Result<Vec<FlagRow>, DbError> {
    let rows = sqlx::query_as::<_, FlagRow>(&format!(
        "SELECT {FLAG_COLUMNS} FROM product_flags WHERE sku = $1 ORDER BY flag_type"
    ))
    .bind(sku)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the unexpired flags for any of `skus`, ordered by SKU then flag
/// type. An empty `skus` slice returns an empty vec without a round trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_flags_for_skus(
    pool: &PgPool,
    skus: &[String],
) -> Result<Vec<FlagRow>, DbError> {
    if skus.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, FlagRow>(&format!(
        "SELECT {FLAG_COLUMNS} FROM product_flags \
         WHERE sku = ANY($1) \
           AND (expiry_date IS NULL OR expiry_date > NOW()) \
         ORDER BY sku, flag_type"
    ))
    .bind(skus)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts a flag, or replaces value, data and expiry of the existing flag
/// with the same `(sku, flag_type)`. Returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_flag(pool: &PgPool, flag: &NewFlag<'_>) -> Result<FlagRow, DbError> {
    let row = sqlx::query_as::<_, FlagRow>(&format!(
        "INSERT INTO product_flags \
           (sku, flag_type, flag_value, additional_data, expiry_date) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (sku, flag_type) DO UPDATE SET \
           flag_value = EXCLUDED.flag_value, \
           additional_data = EXCLUDED.additional_data, \
           expiry_date = EXCLUDED.expiry_date, \
           updated_at = NOW() \
         RETURNING {FLAG_COLUMNS}"
    ))
    .bind(flag.sku)
    .bind(flag.flag_type)
    .bind(flag.flag_value)
    .bind(flag.additional_data)
    .bind(flag.expiry_date)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Deletes the `flag_type` flag on `sku`. Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_flag(pool: &PgPool, sku: &str, flag_type: &str) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM product_flags WHERE sku = $1 AND flag_type = $2")
        .bind(sku)
        .bind(flag_type)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
