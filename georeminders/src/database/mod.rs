//! Database module
//!
//! This module provides reminder persistence:
//! - Schema and migrations
//! - Model definitions
//! - The `ReminderStore` contract with SQLite and in-memory implementations

pub mod memory;
pub mod models;
pub mod repository;
pub mod schema;

pub use memory::InMemoryReminderStore;
pub use models::*;
pub use repository::{ReminderStore, SqliteReminderStore};
pub use schema::initialize_database;

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

fn connect_options(db_path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal)
}

/// Create and initialize a database connection pool.
///
/// Migrations run on a dedicated single-connection pool that is closed
/// before the application pool opens, so every pooled connection sees the
/// final schema.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::info!("Opening reminder database at: {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let migration_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options(db_path))
        .await?;

    initialize_database(&migration_pool).await?;
    migration_pool.close().await;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options(db_path))
        .await?;

    tracing::info!("Database pool created successfully");

    Ok(pool)
}
