//! Database models
//!
//! Rust structs representing persisted entities.
//! All models use serde for serialization to the UI layer.

use crate::config;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// A location-anchored reminder.
///
/// The `id` is generated once on creation and never changes; updates are
/// full replacements keyed by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Reminder {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Human-readable label of the selected place
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Reasons a reminder cannot be saved
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", config::MSG_ENTER_TITLE)]
    MissingTitle,

    #[error("{}", config::MSG_SELECT_LOCATION)]
    MissingLocation,
}

impl ValidationError {
    pub fn message(self) -> &'static str {
        match self {
            ValidationError::MissingTitle => config::MSG_ENTER_TITLE,
            ValidationError::MissingLocation => config::MSG_SELECT_LOCATION,
        }
    }
}

impl Reminder {
    /// Create a reminder with a freshly generated ID
    pub fn new(
        title: Option<String>,
        description: Option<String>,
        location: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            location,
            latitude,
            longitude,
        }
    }

    /// Title and location label must both be present and non-empty
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.title) {
            return Err(ValidationError::MissingTitle);
        }
        if is_blank(&self.location) {
            return Err(ValidationError::MissingLocation);
        }
        Ok(())
    }

    /// Both coordinates, when present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Only valid reminders with coordinates may get a region
    pub fn is_geofence_eligible(&self) -> bool {
        self.validate().is_ok() && self.coordinates().is_some()
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// A picked point of interest on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}
