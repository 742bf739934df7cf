//! Persistence Gateway backed by PostgreSQL.

use std::time::Duration;

use async_trait::async_trait;
use folio_appearance::{DomainKind, PersistResult, PersistenceGateway, StoredConfig};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{DataError, Result};
use crate::settings::{self, SettingRow};

/// Stores each domain as a JSONB row keyed by `(portfolio_id, domain)`.
#[derive(Debug, Clone)]
pub struct PgGateway {
    pool: PgPool,
    portfolio_id: Uuid,
}

impl PgGateway {
    /// Connect, apply migrations and scope the gateway to one portfolio.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or
    /// migrations fail.
    #[instrument(name = "pg_gateway.connect", skip(database_url))]
    pub async fn connect(database_url: &str, portfolio_id: Uuid) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(|source| DataError::ConnectFailed { source })?;
        settings::run_migrations(&pool).await?;
        Ok(Self::from_pool(pool, portfolio_id))
    }

    /// Wrap an existing pool; migrations are the caller's responsibility.
    #[must_use]
    pub const fn from_pool(pool: PgPool, portfolio_id: Uuid) -> Self {
        Self { pool, portfolio_id }
    }

    /// Underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Portfolio whose settings this gateway reads and writes.
    #[must_use]
    pub const fn portfolio_id(&self) -> Uuid {
        self.portfolio_id
    }

    async fn store(&self, domain: DomainKind, config: &Value) -> Result<SettingRow> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "begin transaction",
                source,
            })?;
        let row = match settings::upsert_setting(&mut *tx, self.portfolio_id, domain.as_str(), config)
            .await?
        {
            Some(row) => row,
            None => {
                debug!(domain = %domain, "stored payload unchanged");
                settings::fetch_setting(&mut *tx, self.portfolio_id, domain.as_str())
                    .await?
                    .ok_or_else(|| DataError::QueryFailed {
                        operation: "fetch appearance setting",
                        source: sqlx::Error::RowNotFound,
                    })?
            }
        };
        tx.commit().await.map_err(|source| DataError::QueryFailed {
            operation: "commit transaction",
            source,
        })?;
        Ok(row)
    }
}

fn stored(domain: DomainKind, row: SettingRow) -> StoredConfig {
    StoredConfig {
        domain,
        config: row.payload.0,
        revision: row.revision,
        stored_at: row.stored_at,
    }
}

#[async_trait]
impl PersistenceGateway for PgGateway {
    async fn save(&self, domain: DomainKind, config: Value) -> PersistResult<StoredConfig> {
        let row = self.store(domain, &config).await?;
        Ok(stored(domain, row))
    }

    async fn load(&self, domain: DomainKind) -> PersistResult<Option<StoredConfig>> {
        let row = settings::fetch_setting(&self.pool, self.portfolio_id, domain.as_str()).await?;
        Ok(row.map(|row| stored(domain, row)))
    }
}
