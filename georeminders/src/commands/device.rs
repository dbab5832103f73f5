//! Device commands
//!
//! Drive the simulated location service and hand the resulting transition
//! events to the transition handler.

use super::CommandResponse;
use crate::app::AppState;
use crate::platform::{SimulatedLocationService, TransitionEvent};

pub async fn move_to(
    state: &AppState,
    device: &SimulatedLocationService,
    latitude: f64,
    longitude: f64,
) -> CommandResponse {
    let events = device.update_position(latitude, longitude).await;
    deliver(state, events).await
}

/// Dispatch every event and wait for all of them to finish
pub async fn deliver(state: &AppState, events: Vec<TransitionEvent>) -> CommandResponse {
    let handles: Vec<_> = events
        .into_iter()
        .map(|event| state.transitions.dispatch(event))
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => tracing::error!("Transition task failed: {}", e),
        }
    }

    CommandResponse::Transitions { outcomes }
}

/// Toggle device location. Turning it back on registers every stored
/// reminder again, replacing regions that were already active.
pub async fn set_location(
    state: &AppState,
    device: &SimulatedLocationService,
    enabled: bool,
) -> CommandResponse {
    device.set_location_enabled(enabled).await;

    let restored = if enabled {
        let report = state.restore_registrations().await;
        for (id, e) in &report.failed {
            tracing::warn!("Reminder {} still has no geofence: {}", id, e);
        }
        report.registered.len()
    } else {
        0
    };

    CommandResponse::Location { enabled, restored }
}
