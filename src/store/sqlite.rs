// src/store/sqlite.rs
// SQLite-backed DurableStore

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use tracing::info;

use super::{DurableStore, StoreError};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Create an SQLite connection pool sized for a single bot process
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        // SQLite is single-writer, but can have multiple readers
        .max_connections(max_connections.max(1))
        // Don't wait too long for a connection
        .acquire_timeout(Duration::from_secs(10))
        // Close idle connections after a while
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database {}", database_url))
}

/// Apply embedded migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("Migration failed")?;

    info!("Migrations complete");
    Ok(())
}

#[derive(Clone)]
pub struct SqliteStore {
    pub pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect, migrate and wrap the pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = create_pool(database_url, max_connections).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Single-connection in-memory database; every connection to `:memory:`
    /// is a separate database, so the pool must not grow.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to create in-memory database")?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl DurableStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn save(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
