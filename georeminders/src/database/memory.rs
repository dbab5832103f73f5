//! In-memory reminder store
//!
//! Map-backed `ReminderStore` with a failure switch, used by tests and by
//! callers that do not need durability.

use super::models::Reminder;
use super::repository::ReminderStore;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryReminderStore {
    reminders: Arc<RwLock<HashMap<String, Reminder>>>,
    should_fail: Arc<AtomicBool>,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every operation fails with a storage error
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self, op: &str) -> Result<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("{} failed: store unavailable", op)));
        }
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.reminders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reminders.read().await.is_empty()
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    async fn save(&self, reminder: &Reminder) -> Result<()> {
        self.check("save")?;
        self.reminders
            .write()
            .await
            .insert(reminder.id.clone(), reminder.clone());
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Reminder>> {
        self.check("get_all")?;
        Ok(self.reminders.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Reminder>> {
        self.check("get_by_id")?;
        Ok(self.reminders.read().await.get(id).cloned())
    }

    async fn clear_all(&self) -> Result<()> {
        self.check("clear_all")?;
        self.reminders.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_switch() {
        let store = InMemoryReminderStore::new();
        let reminder = Reminder::new(Some("T".into()), None, Some("L".into()), None, None);
        store.save(&reminder).await.unwrap();

        store.set_should_fail(true);
        assert!(matches!(store.get_all().await, Err(AppError::Storage(_))));
        assert!(store.get_by_id(&reminder.id).await.is_err());

        store.set_should_fail(false);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }
}
