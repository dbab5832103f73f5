//! Geofence registry
//!
//! Keeps the 1:1 mapping between reminders and regions accepted by the
//! location service. The service may reject any call independently; a
//! rejected add leaves the reminder stored without a region, and a
//! rejected remove leaves the registrations in place.

use crate::database::Reminder;
use crate::platform::{Geofence, GeofencingRequest, LocationError, LocationService};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard, RwLock};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("Reminder {0} needs a title, a location and coordinates before it can be registered")]
    Ineligible(String),

    #[error(transparent)]
    Location(#[from] LocationError),
}

/// Per-ID outcome of a bulk registration
#[derive(Debug, Default)]
pub struct RegistrationReport {
    pub registered: Vec<String>,
    pub failed: Vec<(String, RegistrationError)>,
}

#[derive(Clone)]
pub struct GeofenceRegistry {
    location: Arc<dyn LocationService>,
    radius_meters: f32,
    active: Arc<RwLock<HashSet<String>>>,
    /// Serializes store+registration sequences across controllers
    changes: Arc<Mutex<()>>,
}

impl GeofenceRegistry {
    pub fn new(location: Arc<dyn LocationService>, radius_meters: f32) -> Self {
        Self {
            location,
            radius_meters,
            active: Arc::new(RwLock::new(HashSet::new())),
            changes: Arc::new(Mutex::new(())),
        }
    }

    /// Exclusive access for a sequence that touches both the store and the
    /// registrations ("persist then register", "read IDs, unregister, wipe").
    /// The registry's own methods never take it, so they are safe to call
    /// while holding the guard.
    pub async fn lock_changes(&self) -> MutexGuard<'_, ()> {
        self.changes.lock().await
    }

    /// Register an enter-only, never-expiring region for the reminder.
    ///
    /// The device location settings are checked first. Any failure is
    /// logged and returned; the stored reminder is left untouched.
    pub async fn register_reminder(&self, reminder: &Reminder) -> Result<(), RegistrationError> {
        let geofence = Geofence::for_reminder(reminder, self.radius_meters)
            .ok_or_else(|| RegistrationError::Ineligible(reminder.id.clone()))?;

        if let Err(e) = self.location.check_location_settings().await {
            tracing::warn!("Location settings check failed for {}: {}", reminder.id, e);
            return Err(e.into());
        }

        if let Err(e) = self
            .location
            .add_geofences(&GeofencingRequest::single(geofence))
            .await
        {
            tracing::warn!("Failed to add geofence for {}: {}", reminder.id, e);
            return Err(e.into());
        }

        self.active.write().await.insert(reminder.id.clone());
        tracing::info!("Geofence registered for reminder {}", reminder.id);

        Ok(())
    }

    /// Register every reminder independently. Failed IDs stay inactive.
    pub async fn register_all(&self, reminders: &[Reminder]) -> RegistrationReport {
        let mut report = RegistrationReport::default();

        for reminder in reminders {
            match self.register_reminder(reminder).await {
                Ok(()) => report.registered.push(reminder.id.clone()),
                Err(e) => report.failed.push((reminder.id.clone(), e)),
            }
        }

        tracing::info!(
            "Registered {} geofence(s), {} failed",
            report.registered.len(),
            report.failed.len()
        );

        report
    }

    /// Remove the regions for `ids`. Only an `Ok` here permits dependent
    /// cleanup of the reminders themselves.
    pub async fn unregister_all(&self, ids: &[String]) -> Result<(), RegistrationError> {
        if ids.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.location.remove_geofences(ids).await {
            tracing::warn!("Failed to remove {} reminder geofence(s): {}", ids.len(), e);
            return Err(e.into());
        }

        let mut active = self.active.write().await;
        for id in ids {
            active.remove(id);
        }

        tracing::info!("Removed {} reminder geofence(s)", ids.len());
        Ok(())
    }

    /// Revoke a single registration without touching the stored reminder
    pub async fn revoke(&self, id: &str) -> Result<(), RegistrationError> {
        self.unregister_all(&[id.to_string()]).await
    }

    pub async fn is_registered(&self, id: &str) -> bool {
        self.active.read().await.contains(id)
    }

    pub async fn active_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.active.read().await.iter().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{GeofenceErrorKind, SimulatedLocationService};

    fn create_test_registry() -> (GeofenceRegistry, SimulatedLocationService) {
        let location = SimulatedLocationService::new();
        let registry = GeofenceRegistry::new(Arc::new(location.clone()), 100.0);
        (registry, location)
    }

    fn valid_reminder() -> Reminder {
        Reminder::new(
            Some("TITLE".into()),
            Some("DESCRIPTION".into()),
            Some("LOCATION".into()),
            Some(0.0),
            Some(0.0),
        )
    }

    #[tokio::test]
    async fn test_register_reminder() {
        let (registry, location) = create_test_registry();
        let reminder = valid_reminder();

        registry.register_reminder(&reminder).await.unwrap();

        assert!(registry.is_registered(&reminder.id).await);
        assert_eq!(location.registered_ids().await, vec![reminder.id.clone()]);
    }

    #[tokio::test]
    async fn test_register_rejects_ineligible_reminder() {
        let (registry, location) = create_test_registry();
        let mut reminder = valid_reminder();
        reminder.latitude = None;

        let err = registry.register_reminder(&reminder).await.unwrap_err();

        assert_eq!(err, RegistrationError::Ineligible(reminder.id.clone()));
        assert!(location.registered_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_with_location_off() {
        let (registry, location) = create_test_registry();
        location.set_location_enabled(false).await;
        let reminder = valid_reminder();

        let err = registry.register_reminder(&reminder).await.unwrap_err();

        assert_eq!(
            err,
            RegistrationError::Location(LocationError::SettingsNotSatisfied { resolvable: true })
        );
        assert!(!registry.is_registered(&reminder.id).await);
    }

    #[tokio::test]
    async fn test_register_all_reports_partial_failure() {
        let location = SimulatedLocationService::with_max_geofences(1);
        let registry = GeofenceRegistry::new(Arc::new(location.clone()), 100.0);
        let first = valid_reminder();
        let second = valid_reminder();

        let report = registry
            .register_all(&[first.clone(), second.clone()])
            .await;

        assert_eq!(report.registered, vec![first.id.clone()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, second.id);
        assert_eq!(
            report.failed[0].1,
            RegistrationError::Location(LocationError::Geofence(
                GeofenceErrorKind::TooManyGeofences
            ))
        );
        assert_eq!(registry.active_ids().await, vec![first.id]);
    }

    #[tokio::test]
    async fn test_unregister_failure_keeps_registrations() {
        let (registry, location) = create_test_registry();
        let reminder = valid_reminder();
        registry.register_reminder(&reminder).await.unwrap();
        location.fail_removes_with(Some(1000)).await;

        assert!(registry
            .unregister_all(&[reminder.id.clone()])
            .await
            .is_err());
        assert!(registry.is_registered(&reminder.id).await);
    }

    #[tokio::test]
    async fn test_revoke() {
        let (registry, location) = create_test_registry();
        let reminder = valid_reminder();
        registry.register_reminder(&reminder).await.unwrap();

        registry.revoke(&reminder.id).await.unwrap();

        assert!(!registry.is_registered(&reminder.id).await);
        assert!(location.registered_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_nothing_is_ok() {
        let (registry, location) = create_test_registry();
        location.fail_removes_with(Some(1000)).await;

        assert_eq!(registry.unregister_all(&[]).await, Ok(()));
    }
}
