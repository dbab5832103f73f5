//! Reminder commands
//!
//! Save, list, clear, revoke and registration retry. Routed through the
//! edit and list controllers so the caller sees the messages a UI would.

use super::{drain, CommandResponse};
use crate::app::AppState;
use crate::database::Reminder;
use crate::services::ClearOutcome;

pub async fn save(
    state: &AppState,
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> CommandResponse {
    let mut rx = state.edit.messages();
    let reminder = Reminder::new(title, description, location, latitude, longitude);

    match state.edit.validate_and_save(&reminder).await {
        Ok(outcome) => {
            state.edit.clear();
            CommandResponse::Saved {
                reminder_id: outcome.reminder_id,
                geofence_registered: outcome.registration.is_ok(),
                messages: drain(&mut rx),
            }
        }
        Err(e) => CommandResponse::Invalid {
            message: e.message().to_string(),
        },
    }
}

pub async fn list(state: &AppState) -> CommandResponse {
    state.list.load_reminders().await;
    CommandResponse::Reminders {
        list: state.list.state(),
    }
}

pub async fn clear(state: &AppState) -> CommandResponse {
    let mut rx = state.list.messages();

    match state.list.clear_all_reminders().await {
        ClearOutcome::Cleared { count } => CommandResponse::Cleared {
            removed: count,
            messages: drain(&mut rx),
        },
        ClearOutcome::NothingToClear => CommandResponse::Cleared {
            removed: 0,
            messages: drain(&mut rx),
        },
        ClearOutcome::LoadFailed(e) => CommandResponse::error(e.to_string()),
        ClearOutcome::UnregisterFailed(e) => CommandResponse::error(e.to_string()),
    }
}

pub async fn revoke(state: &AppState, id: String) -> CommandResponse {
    match state.registry.revoke(&id).await {
        Ok(()) => CommandResponse::Revoked { id },
        Err(e) => CommandResponse::error(e.to_string()),
    }
}

/// Answer to `UiMessage::LocationResolutionRequired`: once location is on,
/// register the named reminder again
pub async fn retry(state: &AppState, id: String) -> CommandResponse {
    match state.edit.retry_registration(&id).await {
        Ok(()) => CommandResponse::Registered { id },
        Err(e) => CommandResponse::error(e.to_string()),
    }
}
