//! Line-oriented command surface
//!
//! Each stdin line is one JSON `Command`, tagged by `"command"`. Every
//! command produces exactly one `CommandResponse` line.
//!
//! - `reminders`: save, list, clear, revoke and registration retry
//! - `device`: simulated device movement, raw transition events and the
//!   location toggle

pub mod device;
pub mod reminders;

use crate::app::AppState;
use crate::platform::{SimulatedLocationService, TransitionEvent};
use crate::services::{ListState, TransitionOutcome, UiMessage};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Save {
        title: Option<String>,
        description: Option<String>,
        location: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    },
    List,
    Clear,
    /// Move the simulated device
    Move { latitude: f64, longitude: f64 },
    /// Feed a transition event as the platform would deliver it
    Event(TransitionEvent),
    Revoke { id: String },
    /// Register again after the user turned location on when asked to
    Retry { id: String },
    Location { enabled: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandResponse {
    Saved {
        reminder_id: String,
        geofence_registered: bool,
        messages: Vec<UiMessage>,
    },
    Invalid {
        message: String,
    },
    Reminders {
        #[serde(flatten)]
        list: ListState,
    },
    Cleared {
        removed: usize,
        messages: Vec<UiMessage>,
    },
    Transitions {
        outcomes: Vec<TransitionOutcome>,
    },
    Revoked {
        id: String,
    },
    Registered {
        id: String,
    },
    Location {
        enabled: bool,
        restored: usize,
    },
    Error {
        message: String,
    },
}

impl CommandResponse {
    pub fn error(message: impl Into<String>) -> Self {
        CommandResponse::Error {
            message: message.into(),
        }
    }
}

/// Run one command against the application state
pub async fn execute(
    state: &AppState,
    device: &SimulatedLocationService,
    command: Command,
) -> CommandResponse {
    tracing::debug!("Executing command: {:?}", command);

    match command {
        Command::Save {
            title,
            description,
            location,
            latitude,
            longitude,
        } => reminders::save(state, title, description, location, latitude, longitude).await,
        Command::List => reminders::list(state).await,
        Command::Clear => reminders::clear(state).await,
        Command::Revoke { id } => reminders::revoke(state, id).await,
        Command::Retry { id } => reminders::retry(state, id).await,
        Command::Move {
            latitude,
            longitude,
        } => device::move_to(state, device, latitude, longitude).await,
        Command::Event(event) => device::deliver(state, vec![event]).await,
        Command::Location { enabled } => device::set_location(state, device, enabled).await,
    }
}

/// Collect the messages published while a command ran
fn drain(rx: &mut broadcast::Receiver<UiMessage>) -> Vec<UiMessage> {
    let mut messages = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(message) => messages.push(message),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!("Dropped {} UI message(s)", skipped);
            }
            Err(_) => break,
        }
    }
    messages
}
