//! Reminder edit controller
//!
//! Holds the draft being edited, validates it, persists the reminder and
//! then registers its geofence. A failed registration never rolls back the
//! saved reminder.

use super::geofence::{GeofenceRegistry, RegistrationError};
use super::reminders::ReminderRepository;
use super::ui::{UiMessage, UiScope, MESSAGE_CHANNEL_CAPACITY};
use crate::config;
use crate::database::{PointOfInterest, Reminder, ValidationError};
use crate::platform::LocationError;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Fields entered on the edit screen
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReminderDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditState {
    pub draft: ReminderDraft,
    pub saving: bool,
}

/// Result of a save: the reminder is always persisted, the registration
/// may have failed
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub reminder_id: String,
    pub registration: Result<(), RegistrationError>,
}

#[derive(Clone)]
pub struct ReminderEditController {
    repo: ReminderRepository,
    registry: GeofenceRegistry,
    state: Arc<watch::Sender<EditState>>,
    messages: broadcast::Sender<UiMessage>,
    scope: UiScope,
}

impl ReminderEditController {
    pub fn new(repo: ReminderRepository, registry: GeofenceRegistry, scope: UiScope) -> Self {
        let (state, _) = watch::channel(EditState::default());
        let (messages, _) = broadcast::channel(MESSAGE_CHANNEL_CAPACITY);

        Self {
            repo,
            registry,
            state: Arc::new(state),
            messages,
            scope,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<EditState> {
        self.state.subscribe()
    }

    pub fn messages(&self) -> broadcast::Receiver<UiMessage> {
        self.messages.subscribe()
    }

    pub fn state(&self) -> EditState {
        self.state.borrow().clone()
    }

    fn publish(&self, message: UiMessage) {
        let _ = self.messages.send(message);
    }

    pub fn set_title(&self, title: Option<String>) {
        self.state.send_modify(|s| s.draft.title = title);
    }

    pub fn set_description(&self, description: Option<String>) {
        self.state.send_modify(|s| s.draft.description = description);
    }

    /// Take the location label and coordinates from a picked place
    pub fn set_selected_poi(&self, poi: PointOfInterest) {
        self.state.send_modify(|s| {
            s.draft.location = Some(poi.name);
            s.draft.latitude = Some(poi.latitude);
            s.draft.longitude = Some(poi.longitude);
        });
    }

    /// Reset the draft so the next edit starts fresh
    pub fn clear(&self) {
        self.state.send_modify(|s| s.draft = ReminderDraft::default());
    }

    /// Build a reminder with a new ID from the current draft
    pub fn draft_reminder(&self) -> Reminder {
        let draft = self.state.borrow().draft.clone();
        Reminder::new(
            draft.title,
            draft.description,
            draft.location,
            draft.latitude,
            draft.longitude,
        )
    }

    /// Check title and location, publishing a snackbar on failure
    pub fn validate_entered_data(&self, reminder: &Reminder) -> Result<(), ValidationError> {
        reminder.validate().map_err(|e| {
            self.publish(UiMessage::Snackbar(e.message().to_string()));
            e
        })
    }

    /// Persist the reminder, then register its geofence
    pub async fn save_reminder(&self, reminder: &Reminder) -> SaveOutcome {
        self.state.send_modify(|s| s.saving = true);

        let registration = {
            let _changes = self.registry.lock_changes().await;
            self.repo.save_reminder(reminder).await;
            self.registry.register_reminder(reminder).await
        };

        match &registration {
            Ok(()) => {}
            Err(RegistrationError::Location(LocationError::SettingsNotSatisfied {
                resolvable: true,
            })) => {
                self.publish(UiMessage::LocationResolutionRequired(reminder.id.clone()));
            }
            Err(RegistrationError::Location(LocationError::SettingsNotSatisfied {
                resolvable: false,
            })) => {
                self.publish(UiMessage::Snackbar(config::MSG_LOCATION_REQUIRED.to_string()));
            }
            Err(e) => tracing::warn!("Reminder {} saved without a geofence: {}", reminder.id, e),
        }

        self.state.send_modify(|s| s.saving = false);

        let location = reminder.location.as_deref().unwrap_or_default();
        self.publish(UiMessage::Toast(config::geofence_added_message(location)));

        SaveOutcome {
            reminder_id: reminder.id.clone(),
            registration,
        }
    }

    pub async fn validate_and_save(
        &self,
        reminder: &Reminder,
    ) -> Result<SaveOutcome, ValidationError> {
        self.validate_entered_data(reminder)?;
        Ok(self.save_reminder(reminder).await)
    }

    /// `validate_and_save` on the UI scope
    pub fn spawn_save(&self, reminder: Reminder) {
        let controller = self.clone();
        self.scope.spawn(async move {
            if let Ok(outcome) = controller.validate_and_save(&reminder).await {
                tracing::debug!("Save finished: {:?}", outcome);
            }
        });
    }

    /// Register again once the user has turned device location on
    pub async fn retry_registration(&self, reminder_id: &str) -> Result<(), RegistrationError> {
        let _changes = self.registry.lock_changes().await;
        match self.repo.get_reminder(reminder_id).await {
            Ok(reminder) => self.registry.register_reminder(&reminder).await,
            Err(e) => {
                tracing::warn!("Cannot retry registration: {}", e);
                Err(RegistrationError::Ineligible(reminder_id.to_string()))
            }
        }
    }
}
