//! Database schema and migrations
//!
//! Versioned migrations are embedded at compile time and applied in order,
//! each inside its own transaction.

use crate::error::Result;
use sqlx::sqlite::SqlitePool;

const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("migrations/001_initial_schema.sql"))];

/// Create the migrations table and apply anything newer than the
/// recorded version
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Initializing reminder database schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current_version: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
            .fetch_one(pool)
            .await?;

    tracing::debug!("Current schema version: {}", current_version);

    for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current_version) {
        tracing::info!("Applying migration version {}", version);

        let mut tx = pool.begin().await?;

        for statement in sql.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query("INSERT INTO schema_migrations (version) VALUES (?)")
            .bind(*version)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_creates_reminders_table() {
        let pool = memory_pool().await;

        initialize_database(&pool).await.unwrap();

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'reminders'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(tables, 1);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let pool = memory_pool().await;

        initialize_database(&pool).await.unwrap();
        initialize_database(&pool).await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(applied, MIGRATIONS.len() as i64);
    }
}
