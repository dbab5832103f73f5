//! Application state and initialization
//!
//! Wires the store, repository, registry, transition handler and
//! controllers together. All components are created here and made
//! available through `AppState`.

use crate::config::AppConfig;
use crate::database::{create_pool, ReminderStore, SqliteReminderStore};
use crate::error::Result;
use crate::platform::{LocationService, Notifier};
use crate::services::{
    GeofenceRegistry, ReminderEditController, ReminderListController, ReminderRepository,
    RegistrationReport, TransitionHandler, UiScope,
};
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub repository: ReminderRepository,
    pub registry: GeofenceRegistry,
    pub transitions: TransitionHandler,
    pub list: ReminderListController,
    pub edit: ReminderEditController,
    /// Scope shared by the controllers; transition handling is not part of it
    pub ui_scope: UiScope,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn ReminderStore>,
        location: Arc<dyn LocationService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let repository = ReminderRepository::new(store);
        let registry = GeofenceRegistry::new(location, config.geofence_radius_meters);
        let transitions = TransitionHandler::new(repository.clone(), notifier);
        let ui_scope = UiScope::new();
        let list = ReminderListController::new(repository.clone(), registry.clone(), ui_scope.clone());
        let edit = ReminderEditController::new(repository.clone(), registry.clone(), ui_scope.clone());

        Self {
            config,
            repository,
            registry,
            transitions,
            list,
            edit,
            ui_scope,
        }
    }

    /// Re-register every stored reminder that is eligible for a region
    pub async fn restore_registrations(&self) -> RegistrationReport {
        let _changes = self.registry.lock_changes().await;
        match self.repository.get_reminders().await {
            Ok(reminders) => {
                let eligible: Vec<_> = reminders
                    .into_iter()
                    .filter(|r| r.is_geofence_eligible())
                    .collect();
                self.registry.register_all(&eligible).await
            }
            Err(e) => {
                tracing::warn!("Skipping geofence restore: {}", e);
                RegistrationReport::default()
            }
        }
    }

    /// Tear down the UI scope, cancelling any list/save work in flight
    pub fn shutdown_ui(&self) {
        self.ui_scope.cancel();
    }
}

/// Application setup - called once on startup
pub async fn setup(
    config: AppConfig,
    location: Arc<dyn LocationService>,
    notifier: Arc<dyn Notifier>,
) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("Data directory: {:?}", config.data_dir);

    std::fs::create_dir_all(&config.data_dir)?;

    let pool = create_pool(&config.database_path()).await?;
    let store = Arc::new(SqliteReminderStore::new(pool));

    let state = AppState::new(config, store, location, notifier);

    let report = state.restore_registrations().await;
    for (id, e) in &report.failed {
        tracing::warn!("Reminder {} has no active geofence: {}", id, e);
    }

    tracing::info!("Application initialized successfully");

    Ok(state)
}
