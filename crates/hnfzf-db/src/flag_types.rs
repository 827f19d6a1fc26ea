//! Database operations for the `flag_types` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{is_unique_violation, DbError};

/// A row from the `flag_types` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FlagTypeRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Returns all registered flag types, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_flag_types(pool: &PgPool) -> Result<Vec<FlagTypeRow>, DbError> {
    let rows = sqlx::query_as::<_, FlagTypeRow>(
        "SELECT id, name, created_at FROM flag_types ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Registers a new flag type and returns the inserted row.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if a flag type with this name already
/// exists, or [`DbError::Sqlx`] if the query otherwise fails.
pub async fn create_flag_type(pool: &PgPool, name: &str) -> Result<FlagTypeRow, DbError> {
    sqlx::query_as::<_, FlagTypeRow>(
        "INSERT INTO flag_types (name) VALUES ($1) RETURNING id, name, created_at",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            DbError::Duplicate {
                entity: "flag type",
                key: name.to_string(),
            }
        } else {
            DbError::Sqlx(e)
        }
    })
}
