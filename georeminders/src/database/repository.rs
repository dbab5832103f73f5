//! Reminder store contract and SQLite implementation
//!
//! `ReminderStore` is the persistence boundary: keyed upsert, list, lookup
//! and bulk clear. Each operation is atomic for a single record; there are
//! no multi-record transactions.

use super::models::Reminder;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Durable keyed storage for reminders
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Insert or fully replace the record with the same ID
    async fn save(&self, reminder: &Reminder) -> Result<()>;

    /// All reminders, in no particular order
    async fn get_all(&self) -> Result<Vec<Reminder>>;

    /// `Ok(None)` when the ID is unknown
    async fn get_by_id(&self, id: &str) -> Result<Option<Reminder>>;

    async fn clear_all(&self) -> Result<()>;
}

/// SQLite-backed reminder store
#[derive(Clone)]
pub struct SqliteReminderStore {
    pool: SqlitePool,
}

impl SqliteReminderStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderStore for SqliteReminderStore {
    async fn save(&self, reminder: &Reminder) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders (id, title, description, location, latitude, longitude)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                location = excluded.location,
                latitude = excluded.latitude,
                longitude = excluded.longitude
            "#,
        )
        .bind(&reminder.id)
        .bind(&reminder.title)
        .bind(&reminder.description)
        .bind(&reminder.location)
        .bind(reminder.latitude)
        .bind(reminder.longitude)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Saved reminder: {}", reminder.id);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, Reminder>(
            "SELECT id, title, description, location, latitude, longitude FROM reminders",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Reminder>> {
        let reminder = sqlx::query_as::<_, Reminder>(
            r#"
            SELECT id, title, description, location, latitude, longitude
            FROM reminders WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reminder)
    }

    async fn clear_all(&self) -> Result<()> {
        let rows = sqlx::query("DELETE FROM reminders")
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Cleared {} reminders", rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::initialize_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_store() -> SqliteReminderStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        SqliteReminderStore::new(pool)
    }

    fn sample(n: u32) -> Reminder {
        Reminder::new(
            Some(format!("TITLE{}", n)),
            Some(format!("DESCRIPTION{}", n)),
            Some(format!("LOCATION{}", n)),
            Some(0.0),
            Some(0.0),
        )
    }

    #[tokio::test]
    async fn test_save_and_get_by_id() {
        let store = create_test_store().await;
        let reminder = sample(1);

        store.save(&reminder).await.unwrap();

        let fetched = store.get_by_id(&reminder.id).await.unwrap();
        assert_eq!(fetched, Some(reminder));
    }

    #[tokio::test]
    async fn test_get_by_id_unknown_returns_none() {
        let store = create_test_store().await;
        assert_eq!(store.get_by_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_record() {
        let store = create_test_store().await;
        let mut reminder = sample(1);
        store.save(&reminder).await.unwrap();

        reminder.title = Some("Renamed".to_string());
        reminder.latitude = None;
        store.save(&reminder).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], reminder);
    }

    #[tokio::test]
    async fn test_optional_fields_round_trip_as_null() {
        let store = create_test_store().await;
        let reminder = Reminder::new(None, None, None, None, None);

        store.save(&reminder).await.unwrap();

        let fetched = store.get_by_id(&reminder.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, None);
        assert_eq!(fetched.latitude, None);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let store = create_test_store().await;
        store.save(&sample(1)).await.unwrap();
        store.save(&sample(2)).await.unwrap();

        store.clear_all().await.unwrap();

        assert!(store.get_all().await.unwrap().is_empty());
    }
}
