//! Row-level access to the `appearance_settings` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::error::{DataError, Result};

fn map_query_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> DataError {
    move |source| DataError::QueryFailed { operation, source }
}

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns an error when migration execution fails.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|source| DataError::MigrationFailed { source })
}

/// Raw projection of one `appearance_settings` row.
#[derive(Debug, Clone, FromRow)]
pub struct SettingRow {
    /// Stored domain document.
    pub payload: Json<Value>,
    /// Content revision, starting at 1.
    pub revision: i64,
    /// When the current content was written.
    pub stored_at: DateTime<Utc>,
}

/// Fetch the stored document for one domain.
///
/// # Errors
///
/// Returns an error if the select fails.
pub async fn fetch_setting<'e, E>(
    executor: E,
    portfolio_id: Uuid,
    domain: &str,
) -> Result<Option<SettingRow>>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, SettingRow>(
        "SELECT payload, revision, stored_at
         FROM appearance_settings
         WHERE portfolio_id = $1 AND domain = $2",
    )
    .bind(portfolio_id)
    .bind(domain)
    .fetch_optional(executor)
    .await
    .map_err(map_query_err("fetch appearance setting"))
}

/// Insert or replace a domain document.
///
/// The revision and timestamp only move when the payload differs; `None` means
/// the stored payload was already identical.
///
/// # Errors
///
/// Returns an error if the upsert fails.
pub async fn upsert_setting<'e, E>(
    executor: E,
    portfolio_id: Uuid,
    domain: &str,
    payload: &Value,
) -> Result<Option<SettingRow>>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, SettingRow>(
        "INSERT INTO appearance_settings (portfolio_id, domain, payload)
         VALUES ($1, $2, $3)
         ON CONFLICT (portfolio_id, domain) DO UPDATE
         SET payload = EXCLUDED.payload,
             revision = appearance_settings.revision + 1,
             stored_at = now()
         WHERE appearance_settings.payload IS DISTINCT FROM EXCLUDED.payload
         RETURNING payload, revision, stored_at",
    )
    .bind(portfolio_id)
    .bind(domain)
    .bind(Json(payload))
    .fetch_optional(executor)
    .await
    .map_err(map_query_err("upsert appearance setting"))
}

/// Remove every stored domain for a portfolio. Returns the number of rows removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn delete_settings<'e, E>(executor: E, portfolio_id: Uuid) -> Result<u64>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("DELETE FROM appearance_settings WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .execute(executor)
        .await
        .map(|result| result.rows_affected())
        .map_err(map_query_err("delete appearance settings"))
}
