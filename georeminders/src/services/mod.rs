//! Services module
//!
//! The reminder engine: repository facade, geofence registry, transition
//! handling, and the thin list/edit controllers that drive them.

pub mod geofence;
pub mod reminder_edit;
pub mod reminder_list;
pub mod reminders;
pub mod transitions;
pub mod ui;

pub use geofence::{GeofenceRegistry, RegistrationError, RegistrationReport};
pub use reminder_edit::{EditState, ReminderDraft, ReminderEditController, SaveOutcome};
pub use reminder_list::{ClearOutcome, ListState, ReminderListController};
pub use reminders::{RepoResult, ReminderRepository, RepositoryError};
pub use transitions::{DropReason, TransitionHandler, TransitionOutcome, TransitionState};
pub use ui::{UiMessage, UiScope};
