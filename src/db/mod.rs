mod bookings;
mod models;
mod users;

pub use bookings::BookingStore;
pub use models::*;
pub use users::UserStore;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    // Strip SQL comment lines (lines starting with --) before splitting, so a
    // `;` inside a comment never ends a statement
    let cleaned: String = sql
        .lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    for statement in cleaned.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

/// Open the connection pool and bring the schema up to date. The pool is
/// owned by the caller, which closes it on shutdown.
pub async fn init(config: &DatabaseConfig) -> Result<DbPool> {
    if config.url.is_none() {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("Failed to create data directory: {}", config.data_dir.display())
        })?;
        info!("Initializing database at {}", config.file_path().display());
    } else {
        info!("Initializing database from configured URL");
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.connection_url())
        .await
        .context("Failed to connect to database")?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: Users and bookings tables
    execute_sql(pool, include_str!("../../migrations/001_initial.sql")).await?;

    // Migration 002: Unique username and email
    execute_sql(pool, include_str!("../../migrations/002_unique_identity.sql")).await?;

    // Migration 003: Tag credentials as hashed or legacy plaintext
    let has_password_kind: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM pragma_table_info('users') WHERE name = 'password_kind'"
    )
    .fetch_optional(pool)
    .await?;
    if has_password_kind.is_none() {
        execute_sql(pool, include_str!("../../migrations/003_credential_kind.sql")).await?;
    }

    info!("Migrations completed");
    Ok(())
}

/// Single-connection in-memory database with the schema applied
#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    let pool = memory_pool().await;
    run_migrations(&pool).await.unwrap();
    pool
}

#[cfg(test)]
async fn memory_pool() -> DbPool {
    // One connection that never expires, otherwise the in-memory database
    // is lost between queries.
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}
