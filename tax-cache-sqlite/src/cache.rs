use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tax_core::{CacheError, TaxRateCache, TaxRateSnapshot};
use tracing::debug;

/// Tax rate cache stored in a single SQLite table.
///
/// Snapshots are kept as JSON text next to an absolute UTC expiry. Expired
/// rows are deleted when they are next read.
pub struct SqliteCache {
    pool: SqlitePool,
}

impl SqliteCache {
    /// Opens the database behind `connection_string`.
    ///
    /// Accepted values:
    /// * `":memory:"` — a private in-memory database.
    /// * a `sqlite:` URL, passed to sqlx unchanged.
    /// * a bare file path, created if it does not exist.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let in_memory = is_in_memory(connection_string);
        let options = SqliteConnectOptions::from_str(&database_url(connection_string))
            .with_context(|| format!("Invalid SQLite connection string: {connection_string}"))?
            .create_if_missing(true);

        // Every connection to `:memory:` opens a distinct database.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to cache database: {connection_string}"))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run cache migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Removes every expired row, returning how many were dropped.
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM tax_rate_cache WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_if_expired(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM tax_rate_cache WHERE cache_key = ? AND expires_at <= ?")
            .bind(key)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}

#[async_trait]
impl TaxRateCache for SqliteCache {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<TaxRateSnapshot>, CacheError> {
        let Some(row) =
            sqlx::query("SELECT payload, expires_at FROM tax_rate_cache WHERE cache_key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend_error)?
        else {
            return Ok(None);
        };

        let expires_at: DateTime<Utc> = row
            .try_get("expires_at")
            .map_err(|e| CacheError::Backend(format!("Failed to read expires_at: {e}")))?;
        let now = Utc::now();
        if expires_at <= now {
            debug!(key, %expires_at, "dropping expired cache entry");
            self.delete_if_expired(key, now).await?;
            return Ok(None);
        }

        let payload: String = row
            .try_get("payload")
            .map_err(|e| CacheError::Backend(format!("Failed to read payload: {e}")))?;
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|e| CacheError::Codec(format!("Failed to decode '{key}': {e}")))
    }

    async fn set(
        &self,
        key: &str,
        value: &TaxRateSnapshot,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value)
            .map_err(|e| CacheError::Codec(format!("Failed to encode '{key}': {e}")))?;
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| CacheError::Backend(format!("ttl {ttl:?} out of range")))?;

        sqlx::query(
            "INSERT INTO tax_rate_cache (cache_key, payload, expires_at) VALUES (?, ?, ?)
             ON CONFLICT (cache_key) DO UPDATE
             SET payload = excluded.payload, expires_at = excluded.expires_at",
        )
        .bind(key)
        .bind(payload)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;
        Ok(())
    }
}

fn is_in_memory(connection_string: &str) -> bool {
    matches!(connection_string, ":memory:" | "sqlite::memory:" | "sqlite://:memory:")
}

fn database_url(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        "sqlite::memory:".to_string()
    } else if connection_string.starts_with("sqlite:") {
        connection_string.to_string()
    } else {
        format!("sqlite:{connection_string}")
    }
}

fn backend_error(err: sqlx::Error) -> CacheError {
    CacheError::Backend(err.to_string())
}
