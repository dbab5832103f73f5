//! Reminder repository
//!
//! Fault-isolating facade over a `ReminderStore`. Storage failures never
//! cross this boundary as infrastructure errors: reads return a tagged
//! `RepoResult`, writes are fire-and-forget and only logged. There is no
//! caching; every read goes to the store.

use crate::database::{Reminder, ReminderStore};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Failure outcome of a repository read
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RepositoryError {
    #[error("Could not get reminders")]
    ListFailed,

    #[error("Could not find reminder: {0}")]
    NotFound(String),

    #[error("Could not get reminder {0}")]
    LookupFailed(String),
}

pub type RepoResult<T> = std::result::Result<T, RepositoryError>;

/// Single access point to reminder storage
#[derive(Clone)]
pub struct ReminderRepository {
    store: Arc<dyn ReminderStore>,
}

impl ReminderRepository {
    pub fn new(store: Arc<dyn ReminderStore>) -> Self {
        Self { store }
    }

    pub async fn get_reminders(&self) -> RepoResult<Vec<Reminder>> {
        self.store.get_all().await.map_err(|e| {
            tracing::error!("Failed to load reminders: {}", e);
            RepositoryError::ListFailed
        })
    }

    pub async fn get_reminder(&self, id: &str) -> RepoResult<Reminder> {
        match self.store.get_by_id(id).await {
            Ok(Some(reminder)) => Ok(reminder),
            Ok(None) => Err(RepositoryError::NotFound(id.to_string())),
            Err(e) => {
                tracing::error!("Failed to load reminder {}: {}", id, e);
                Err(RepositoryError::LookupFailed(id.to_string()))
            }
        }
    }

    /// Persist a reminder. Failures are logged and not reported back.
    pub async fn save_reminder(&self, reminder: &Reminder) {
        match self.store.save(reminder).await {
            Ok(()) => tracing::debug!("Reminder persisted: {}", reminder.id),
            Err(e) => tracing::error!("Failed to save reminder {}: {}", reminder.id, e),
        }
    }

    pub async fn delete_all_reminders(&self) {
        match self.store.clear_all().await {
            Ok(()) => tracing::info!("All reminders deleted"),
            Err(e) => tracing::error!("Failed to delete reminders: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryReminderStore;

    fn create_test_repo() -> (ReminderRepository, InMemoryReminderStore) {
        let store = InMemoryReminderStore::new();
        (ReminderRepository::new(Arc::new(store.clone())), store)
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
    async fn test_save_then_get_returns_equal_reminder() {
        let (repo, _store) = create_test_repo();
        let reminder = sample(1);

        repo.save_reminder(&reminder).await;

        assert_eq!(repo.get_reminder(&reminder.id).await, Ok(reminder));
    }

    #[tokio::test]
    async fn test_get_reminders_returns_every_saved_record() {
        let (repo, _store) = create_test_repo();
        let saved: Vec<_> = (1..=3).map(sample).collect();
        for reminder in &saved {
            repo.save_reminder(reminder).await;
        }

        let mut loaded = repo.get_reminders().await.unwrap();
        loaded.sort_by(|a, b| a.title.cmp(&b.title));
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn test_not_found_and_failure_are_distinguished() {
        let (repo, store) = create_test_repo();

        assert_eq!(
            repo.get_reminder("missing").await,
            Err(RepositoryError::NotFound("missing".to_string()))
        );
        assert_eq!(
            repo.get_reminder("missing").await.unwrap_err().to_string(),
            "Could not find reminder: missing"
        );

        store.set_should_fail(true);
        let err = repo.get_reminder("missing").await.unwrap_err();
        assert_eq!(err, RepositoryError::LookupFailed("missing".to_string()));
        assert_eq!(err.to_string(), "Could not get reminder missing");
    }

    #[tokio::test]
    async fn test_failing_store_list_error() {
        let (repo, store) = create_test_repo();
        store.set_should_fail(true);

        let err = repo.get_reminders().await.unwrap_err();
        assert_eq!(err.to_string(), "Could not get reminders");
    }

    #[tokio::test]
    async fn test_save_failure_is_swallowed() {
        let (repo, store) = create_test_repo();
        store.set_should_fail(true);

        repo.save_reminder(&sample(1)).await;
        repo.delete_all_reminders().await;

        store.set_should_fail(false);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let (repo, _store) = create_test_repo();
        repo.save_reminder(&sample(1)).await;
        repo.save_reminder(&sample(2)).await;

        repo.delete_all_reminders().await;

        assert_eq!(repo.get_reminders().await, Ok(Vec::new()));
    }
}
