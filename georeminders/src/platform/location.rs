//! Location-service boundary
//!
//! Capability interface for registering circular regions with the
//! platform, plus the region and transition-event types that cross it.
//! Every call completes with exactly one of two terminal signals: `Ok` or
//! `Err(LocationError)`.

use crate::config;
use crate::database::Reminder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Direction of a region crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransitionType {
    Enter,
    Exit,
    Dwell,
}

/// A circular region registered under a reminder's ID
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geofence {
    pub request_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f32,
    pub transition_types: Vec<TransitionType>,
    /// `None` never expires
    pub expiration: Option<Duration>,
}

impl Geofence {
    /// Enter-only, never-expiring region centered on the reminder.
    /// Returns `None` for reminders that are not eligible.
    pub fn for_reminder(reminder: &Reminder, radius_meters: f32) -> Option<Self> {
        if !reminder.is_geofence_eligible() {
            return None;
        }
        let (latitude, longitude) = reminder.coordinates()?;

        Some(Self {
            request_id: reminder.id.clone(),
            latitude,
            longitude,
            radius_meters,
            transition_types: vec![TransitionType::Enter],
            expiration: None,
        })
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        distance_meters(self.latitude, self.longitude, latitude, longitude)
            <= f64::from(self.radius_meters)
    }

    pub fn triggers_on(&self, transition: TransitionType) -> bool {
        self.transition_types.contains(&transition)
    }
}

/// Great-circle distance between two coordinates (haversine)
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
}

/// A batch of regions submitted in one call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeofencingRequest {
    pub geofences: Vec<Geofence>,
    /// Transition to fire immediately when the device is already inside
    pub initial_trigger: Option<TransitionType>,
}

impl GeofencingRequest {
    pub fn single(geofence: Geofence) -> Self {
        Self {
            geofences: vec![geofence],
            initial_trigger: Some(TransitionType::Enter),
        }
    }
}

/// Platform signal that the device crossed one or more registered regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    #[serde(default)]
    pub triggered_ids: Vec<String>,
    pub transition_type: TransitionType,
    #[serde(default)]
    pub error_code: Option<i32>,
}

impl TransitionEvent {
    pub fn new(transition_type: TransitionType, triggered_ids: Vec<String>) -> Self {
        Self {
            triggered_ids,
            transition_type,
            error_code: None,
        }
    }

    pub fn enter(triggered_ids: Vec<String>) -> Self {
        Self::new(TransitionType::Enter, triggered_ids)
    }

    pub fn error(error_code: i32) -> Self {
        Self {
            triggered_ids: Vec::new(),
            transition_type: TransitionType::Enter,
            error_code: Some(error_code),
        }
    }
}

/// Known geofencing status codes reported by the location service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeofenceErrorKind {
    NotAvailable,
    TooManyGeofences,
    TooManyPendingIntents,
    Unknown(i32),
}

impl GeofenceErrorKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            config::GEOFENCE_NOT_AVAILABLE => GeofenceErrorKind::NotAvailable,
            config::GEOFENCE_TOO_MANY_GEOFENCES => GeofenceErrorKind::TooManyGeofences,
            config::GEOFENCE_TOO_MANY_PENDING_INTENTS => GeofenceErrorKind::TooManyPendingIntents,
            other => GeofenceErrorKind::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            GeofenceErrorKind::NotAvailable => config::GEOFENCE_NOT_AVAILABLE,
            GeofenceErrorKind::TooManyGeofences => config::GEOFENCE_TOO_MANY_GEOFENCES,
            GeofenceErrorKind::TooManyPendingIntents => config::GEOFENCE_TOO_MANY_PENDING_INTENTS,
            GeofenceErrorKind::Unknown(code) => code,
        }
    }

    /// User-facing text for the status code
    pub fn message(self) -> &'static str {
        match self {
            GeofenceErrorKind::NotAvailable => config::MSG_GEOFENCE_NOT_AVAILABLE,
            GeofenceErrorKind::TooManyGeofences => config::MSG_GEOFENCE_TOO_MANY_GEOFENCES,
            GeofenceErrorKind::TooManyPendingIntents => {
                config::MSG_GEOFENCE_TOO_MANY_PENDING_INTENTS
            }
            GeofenceErrorKind::Unknown(_) => config::MSG_GEOFENCE_UNKNOWN,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Device location is turned off")]
    SettingsNotSatisfied {
        /// The user can be prompted to turn location on
        resolvable: bool,
    },

    #[error("{} (code {})", .0.message(), .0.code())]
    Geofence(GeofenceErrorKind),
}

/// Platform location service
#[async_trait]
pub trait LocationService: Send + Sync {
    async fn check_location_settings(&self) -> Result<(), LocationError>;

    async fn add_geofences(&self, request: &GeofencingRequest) -> Result<(), LocationError>;

    async fn remove_geofences(&self, ids: &[String]) -> Result<(), LocationError>;
}
