//! Reminder list controller
//!
//! Loads the reminder list into an observable `ListState` and implements
//! "clear all". Clearing removes the geofences first; the stored reminders
//! are wiped only after the location service confirms the removal.

use super::geofence::{GeofenceRegistry, RegistrationError};
use super::reminders::{ReminderRepository, RepositoryError};
use super::ui::{UiMessage, UiScope, MESSAGE_CHANNEL_CAPACITY};
use crate::config;
use crate::database::Reminder;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Observable list screen state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListState {
    pub reminders: Vec<Reminder>,
    pub loading: bool,
    pub error: Option<String>,
    pub show_no_data: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClearOutcome {
    Cleared { count: usize },
    NothingToClear,
    LoadFailed(RepositoryError),
    /// Geofences are still registered, so the reminders were kept
    UnregisterFailed(RegistrationError),
}

#[derive(Clone)]
pub struct ReminderListController {
    repo: ReminderRepository,
    registry: GeofenceRegistry,
    state: Arc<watch::Sender<ListState>>,
    messages: broadcast::Sender<UiMessage>,
    scope: UiScope,
}

impl ReminderListController {
    pub fn new(repo: ReminderRepository, registry: GeofenceRegistry, scope: UiScope) -> Self {
        let (state, _) = watch::channel(ListState::default());
        let (messages, _) = broadcast::channel(MESSAGE_CHANNEL_CAPACITY);

        Self {
            repo,
            registry,
            state: Arc::new(state),
            messages,
            scope,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    pub fn messages(&self) -> broadcast::Receiver<UiMessage> {
        self.messages.subscribe()
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    fn publish(&self, message: UiMessage) {
        // No subscribers is fine
        let _ = self.messages.send(message);
    }

    /// Load every reminder, ending in either a populated list or an error
    /// message, never in a loading state
    pub async fn load_reminders(&self) {
        self.state.send_modify(|s| s.loading = true);

        let result = self.repo.get_reminders().await;

        self.state.send_modify(|s| {
            s.loading = false;
            match result {
                Ok(reminders) => {
                    s.reminders = reminders;
                    s.error = None;
                }
                Err(e) => s.error = Some(e.to_string()),
            }
            s.show_no_data = s.reminders.is_empty();
        });
    }

    /// `load_reminders` on the UI scope
    pub fn spawn_load(&self) {
        let controller = self.clone();
        self.scope
            .spawn(async move { controller.load_reminders().await });
    }

    /// Unregister every stored reminder's geofence, then wipe the store.
    ///
    /// Saves wait until the wipe is done, so a reminder saved meanwhile is
    /// never deleted while its region stays registered.
    pub async fn clear_all_reminders(&self) -> ClearOutcome {
        let changes = self.registry.lock_changes().await;

        let reminders = match self.repo.get_reminders().await {
            Ok(reminders) => reminders,
            Err(e) => {
                tracing::warn!("Failed to remove reminder geofences: {}", e);
                return ClearOutcome::LoadFailed(e);
            }
        };

        let ids: Vec<String> = reminders.into_iter().map(|r| r.id).collect();
        if ids.is_empty() {
            return ClearOutcome::NothingToClear;
        }

        if let Err(e) = self.registry.unregister_all(&ids).await {
            return ClearOutcome::UnregisterFailed(e);
        }

        self.state.send_modify(|s| s.loading = true);
        self.repo.delete_all_reminders().await;
        self.state.send_modify(|s| s.loading = false);
        drop(changes);

        self.publish(UiMessage::Toast(config::MSG_REMINDERS_CLEARED.to_string()));
        self.load_reminders().await;

        ClearOutcome::Cleared { count: ids.len() }
    }

    /// `clear_all_reminders` on the UI scope
    pub fn spawn_clear(&self) {
        let controller = self.clone();
        self.scope.spawn(async move {
            let outcome = controller.clear_all_reminders().await;
            tracing::debug!("Clear all finished: {:?}", outcome);
        });
    }
}
