//! Simulated location service
//!
//! In-process stand-in for the platform geofencing API. Regions are kept in
//! memory and device position updates are turned into transition events,
//! batching every region crossed by one update into a single event.

use super::location::{
    Geofence, GeofenceErrorKind, GeofencingRequest, LocationError, LocationService,
    TransitionEvent, TransitionType,
};
use crate::config;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

struct SimState {
    /// Registration order is preserved so batched events are deterministic
    geofences: Vec<Geofence>,
    inside: HashSet<String>,
    position: Option<(f64, f64)>,
    location_enabled: bool,
    settings_resolvable: bool,
    add_failure: Option<i32>,
    remove_failure: Option<i32>,
    pending: Vec<TransitionEvent>,
    max_geofences: usize,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            geofences: Vec::new(),
            inside: HashSet::new(),
            position: None,
            location_enabled: true,
            settings_resolvable: true,
            add_failure: None,
            remove_failure: None,
            pending: Vec::new(),
            max_geofences: config::MAX_GEOFENCES_PER_APP,
        }
    }
}

#[derive(Clone, Default)]
pub struct SimulatedLocationService {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedLocationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_geofences(max_geofences: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                max_geofences,
                ..SimState::default()
            })),
        }
    }

    /// Turn device location on or off
    pub async fn set_location_enabled(&self, enabled: bool) {
        self.state.lock().await.location_enabled = enabled;
    }

    /// Whether a settings failure can be resolved by prompting the user
    pub async fn set_settings_resolvable(&self, resolvable: bool) {
        self.state.lock().await.settings_resolvable = resolvable;
    }

    /// Make every following add fail with the given status code
    pub async fn fail_adds_with(&self, code: Option<i32>) {
        self.state.lock().await.add_failure = code;
    }

    /// Make every following remove fail with the given status code
    pub async fn fail_removes_with(&self, code: Option<i32>) {
        self.state.lock().await.remove_failure = code;
    }

    pub async fn registered_ids(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .geofences
            .iter()
            .map(|g| g.request_id.clone())
            .collect()
    }

    /// Move the device and collect the resulting transitions, including
    /// initial-trigger events queued when regions were added
    pub async fn update_position(&self, latitude: f64, longitude: f64) -> Vec<TransitionEvent> {
        let mut state = self.state.lock().await;
        state.position = Some((latitude, longitude));

        let mut events = std::mem::take(&mut state.pending);
        let mut entered = Vec::new();
        let mut exited = Vec::new();

        let crossings: Vec<(String, bool, bool, bool)> = state
            .geofences
            .iter()
            .map(|g| {
                (
                    g.request_id.clone(),
                    g.contains(latitude, longitude),
                    g.triggers_on(TransitionType::Enter),
                    g.triggers_on(TransitionType::Exit),
                )
            })
            .collect();

        for (id, now_inside, on_enter, on_exit) in crossings {
            let was_inside = state.inside.contains(&id);
            if now_inside && !was_inside {
                state.inside.insert(id.clone());
                if on_enter {
                    entered.push(id);
                }
            } else if !now_inside && was_inside {
                state.inside.remove(&id);
                if on_exit {
                    exited.push(id);
                }
            }
        }

        if !entered.is_empty() {
            events.push(TransitionEvent::enter(entered));
        }
        if !exited.is_empty() {
            events.push(TransitionEvent::new(TransitionType::Exit, exited));
        }

        tracing::debug!(
            "Device moved to ({}, {}): {} transition event(s)",
            latitude,
            longitude,
            events.len()
        );

        events
    }
}

#[async_trait]
impl LocationService for SimulatedLocationService {
    async fn check_location_settings(&self) -> Result<(), LocationError> {
        let state = self.state.lock().await;
        if state.location_enabled {
            Ok(())
        } else {
            Err(LocationError::SettingsNotSatisfied {
                resolvable: state.settings_resolvable,
            })
        }
    }

    async fn add_geofences(&self, request: &GeofencingRequest) -> Result<(), LocationError> {
        let mut state = self.state.lock().await;

        if !state.location_enabled {
            return Err(LocationError::Geofence(GeofenceErrorKind::NotAvailable));
        }
        if let Some(code) = state.add_failure {
            return Err(LocationError::Geofence(GeofenceErrorKind::from_code(code)));
        }

        let new_ids: HashSet<&str> = request
            .geofences
            .iter()
            .map(|g| g.request_id.as_str())
            .collect();
        let kept = state
            .geofences
            .iter()
            .filter(|g| !new_ids.contains(g.request_id.as_str()))
            .count();
        if kept + new_ids.len() > state.max_geofences {
            return Err(LocationError::Geofence(GeofenceErrorKind::TooManyGeofences));
        }

        let mut initially_inside = Vec::new();
        for geofence in &request.geofences {
            state
                .geofences
                .retain(|g| g.request_id != geofence.request_id);
            state.inside.remove(&geofence.request_id);

            if let Some((lat, lon)) = state.position {
                if geofence.contains(lat, lon) {
                    state.inside.insert(geofence.request_id.clone());
                    if request.initial_trigger == Some(TransitionType::Enter)
                        && geofence.triggers_on(TransitionType::Enter)
                    {
                        initially_inside.push(geofence.request_id.clone());
                    }
                }
            }

            state.geofences.push(geofence.clone());
        }

        if !initially_inside.is_empty() {
            state.pending.push(TransitionEvent::enter(initially_inside));
        }

        Ok(())
    }

    async fn remove_geofences(&self, ids: &[String]) -> Result<(), LocationError> {
        let mut state = self.state.lock().await;

        if let Some(code) = state.remove_failure {
            return Err(LocationError::Geofence(GeofenceErrorKind::from_code(code)));
        }

        state.geofences.retain(|g| !ids.contains(&g.request_id));
        for id in ids {
            state.inside.remove(id);
        }
        state
            .pending
            .retain(|event| !event.triggered_ids.iter().any(|id| ids.contains(id)));

        Ok(())
    }
}
