//! Database module: pool construction, models and schema for persistent
//! storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)

pub mod models;
pub mod schema;

pub use models::{DbTodo, DbUser};
pub use schema::SQLITE_INIT;

use crate::error::ApiError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

/// Builds the process-wide pool and applies the schema.
///
/// The pool is the only resource shared across requests; every statement
/// acquires a connection from it and returns it on completion, including
/// error paths.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, ApiError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| ApiError::Internal(format!("invalid database url: {e}")))?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(connect_opts)
        .await?;

    apply_schema(&pool).await?;

    info!(database_url, max_connections, "database ready");
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), ApiError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
