//! Application configuration
//!
//! Constants for geofence registration, platform status codes and
//! user-facing messages, plus the environment-driven `AppConfig`.

use crate::error::{AppError, Result};
use std::path::PathBuf;

// ===== Geofencing =====

/// Radius of every registered region in meters
pub const GEOFENCE_RADIUS_METERS: f32 = 100.0;

/// Maximum number of regions the location service accepts per app.
/// Adding beyond this fails with `GEOFENCE_TOO_MANY_GEOFENCES`.
pub const MAX_GEOFENCES_PER_APP: usize = 100;

// ===== Location service status codes =====

/// Geofence service is not available (location turned off or restricted)
pub const GEOFENCE_NOT_AVAILABLE: i32 = 1000;
/// The app has registered more than `MAX_GEOFENCES_PER_APP` regions
pub const GEOFENCE_TOO_MANY_GEOFENCES: i32 = 1001;
/// Too many distinct callback targets were handed to the service
pub const GEOFENCE_TOO_MANY_PENDING_INTENTS: i32 = 1002;

// ===== Storage =====

/// SQLite database file name inside the data directory
pub const DATABASE_FILE_NAME: &str = "reminders.db";

/// Default data directory when `GEOREMINDERS_DATA_DIR` is unset
pub const DEFAULT_DATA_DIR: &str = "./georeminders-data";

// ===== Logging =====

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "georeminders=debug,info";

// ===== User-facing messages =====

pub const MSG_GEOFENCE_NOT_AVAILABLE: &str =
    "Geofence service is not available now. Go to Settings>Location>Mode and choose High accuracy.";
pub const MSG_GEOFENCE_TOO_MANY_GEOFENCES: &str = "Your app has registered too many geofences.";
pub const MSG_GEOFENCE_TOO_MANY_PENDING_INTENTS: &str =
    "You have provided too many PendingIntents to the addGeofences() call.";
pub const MSG_GEOFENCE_UNKNOWN: &str = "Error adding geofence";

pub const MSG_ENTER_TITLE: &str = "Please enter title";
pub const MSG_SELECT_LOCATION: &str = "Please select location";
pub const MSG_LOCATION_REQUIRED: &str = "Location services must be enabled to use the app";
pub const MSG_REMINDERS_CLEARED: &str = "Reminders cleared";

/// Toast shown after a reminder has been saved
pub fn geofence_added_message(location: &str) -> String {
    format!("Geofence added for {}", location)
}

/// Runtime configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub geofence_radius_meters: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            geofence_radius_meters: GEOFENCE_RADIUS_METERS,
        }
    }
}

impl AppConfig {
    /// Read `GEOREMINDERS_DATA_DIR` and `GEOREMINDERS_GEOFENCE_RADIUS_M`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("GEOREMINDERS_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        if let Ok(raw) = std::env::var("GEOREMINDERS_GEOFENCE_RADIUS_M") {
            config.geofence_radius_meters = parse_radius(&raw)?;
        }

        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }
}

fn parse_radius(raw: &str) -> Result<f32> {
    let radius: f32 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("Invalid geofence radius: {}", raw)))?;

    if !radius.is_finite() || radius <= 0.0 {
        return Err(AppError::Config(format!(
            "Geofence radius must be positive, got {}",
            raw
        )));
    }

    Ok(radius)
}
