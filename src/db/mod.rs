//! Database module for gavel.
//!
//! This module provides SQLite database connectivity and migration management.

mod schema;
mod user;

pub use schema::MIGRATIONS;
pub use user::{NewUser, User, UserRepository};

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{SqlitePool, Transaction};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::Result;

/// Connection pool type used by all repositories.
pub type DbPool = SqlitePool;

/// `datetime('now')` / `NOW()` depending on the backend.
#[cfg(feature = "sqlite")]
pub(crate) const SQL_NOW: &str = "datetime('now')";
#[cfg(feature = "postgres")]
pub(crate) const SQL_NOW: &str = "NOW()";

/// Database wrapper for managing connections and migrations.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a database at the specified path.
    ///
    /// If the database file doesn't exist, it will be created.
    /// Migrations are automatically applied.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening database at {:?}", path);

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Open a database using the given configuration.
    pub async fn open_with_config(config: &DatabaseConfig) -> Result<Self> {
        let path = Path::new(&config.path);
        info!("Opening database at {:?}", path);

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory database");

        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        // A single connection that is never reaped, so every handle sees the
        // same in-memory database for the lifetime of the pool
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a new transaction.
    pub async fn begin(&self) -> Result<Transaction<'static, sqlx::Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Get the current schema version.
    pub async fn schema_version(&self) -> Result<i64> {
        let table_exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        )
        .fetch_one(&self.pool)
        .await?;

        if !table_exists.0 {
            return Ok(0);
        }

        let version: (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                .fetch_one(&self.pool)
                .await?;

        Ok(version.0)
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        let current_version = self.schema_version().await?;
        let migrations = MIGRATIONS;

        if current_version as usize >= migrations.len() {
            debug!("Database is up to date (version {})", current_version);
            return Ok(());
        }

        info!(
            "Migrating database from version {} to {}",
            current_version,
            migrations.len()
        );

        // Ensure schema_version table exists
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version     INTEGER PRIMARY KEY,
                applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await?;

        // Apply each pending migration in a transaction
        for (i, migration) in migrations.iter().enumerate().skip(current_version as usize) {
            let version = (i + 1) as i64;
            info!("Applying migration v{}", version);

            let mut tx = self.pool.begin().await?;

            sqlx::raw_sql(migration).execute(&mut *tx).await?;

            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(version)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            debug!("Migration v{} applied successfully", version);
        }

        info!(
            "Database migration complete (now at version {})",
            migrations.len()
        );
        Ok(())
    }

    /// Check if a table exists.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=$1)",
        )
        .bind(table_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists.0)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
