//! Transition handling
//!
//! Turns a platform region-entry event into a delivered notification.
//!
//! ```text
//! Received -> Validated -> Resolved -> Notified
//!     |           |            |
//!     +-> Rejected (platform error code)
//!     +-> Dropped  (not an enter, no triggered IDs, reminder unavailable)
//! ```
//!
//! Only the first triggered ID of an event is processed. Overlapping
//! deliveries for the same reminder are not deduplicated, so a reminder may
//! be notified more than once.

use super::reminders::{ReminderRepository, RepositoryError};
use crate::platform::{GeofenceErrorKind, Notification, Notifier, TransitionEvent, TransitionType};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Received,
    Validated,
    Resolved,
    Notified,
    Rejected,
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DropReason {
    NotEnterTransition(TransitionType),
    NoTriggeringGeofences,
    /// The reminder was deleted after its region was registered, or the
    /// store could not be read
    ReminderUnavailable(RepositoryError),
}

/// Terminal result of handling one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum TransitionOutcome {
    Notified { reminder_id: String },
    Rejected(GeofenceErrorKind),
    Dropped(DropReason),
}

impl TransitionOutcome {
    pub fn state(&self) -> TransitionState {
        match self {
            TransitionOutcome::Notified { .. } => TransitionState::Notified,
            TransitionOutcome::Rejected(_) => TransitionState::Rejected,
            TransitionOutcome::Dropped(_) => TransitionState::Dropped,
        }
    }
}

#[derive(Clone)]
pub struct TransitionHandler {
    repo: ReminderRepository,
    notifier: Arc<dyn Notifier>,
}

impl TransitionHandler {
    pub fn new(repo: ReminderRepository, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    /// Process the event on its own task.
    ///
    /// The task is spawned on the runtime rather than any UI scope, so it
    /// runs to completion even when no UI is alive.
    pub fn dispatch(&self, event: TransitionEvent) -> JoinHandle<TransitionOutcome> {
        let handler = self.clone();
        tokio::spawn(async move { handler.handle(event).await })
    }

    pub async fn handle(&self, event: TransitionEvent) -> TransitionOutcome {
        tracing::debug!(?event, "Transition received");

        if let Some(code) = event.error_code {
            let kind = GeofenceErrorKind::from_code(code);
            tracing::warn!("Transition rejected, error {}: {}", code, kind.message());
            self.notifier.show_message(kind.message());
            return TransitionOutcome::Rejected(kind);
        }

        if event.transition_type != TransitionType::Enter {
            tracing::debug!("Transition dropped: {:?} is not an enter", event.transition_type);
            return TransitionOutcome::Dropped(DropReason::NotEnterTransition(
                event.transition_type,
            ));
        }

        let Some(request_id) = event.triggered_ids.first() else {
            tracing::debug!("Transition dropped: no triggering geofences");
            return TransitionOutcome::Dropped(DropReason::NoTriggeringGeofences);
        };

        if event.triggered_ids.len() > 1 {
            tracing::debug!(
                "Processing {} only, ignoring {} other triggered geofence(s)",
                request_id,
                event.triggered_ids.len() - 1
            );
        }

        tracing::debug!("Transition validated, resolving reminder {}", request_id);

        let reminder = match self.repo.get_reminder(request_id).await {
            Ok(reminder) => reminder,
            Err(e) => {
                tracing::debug!("Transition dropped for {}: {}", request_id, e);
                return TransitionOutcome::Dropped(DropReason::ReminderUnavailable(e));
            }
        };

        tracing::debug!("Reminder {} resolved, notifying", reminder.id);

        self.notifier.deliver(Notification::for_reminder(&reminder));
        tracing::info!("Notification dispatched for reminder {}", reminder.id);

        TransitionOutcome::Notified {
            reminder_id: reminder.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{InMemoryReminderStore, Reminder, ReminderStore};
    use crate::error::Result;
    use crate::platform::{ChannelNotifier, NotifierEvent};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Counts lookups so tests can assert the repository was never hit
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryReminderStore,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl ReminderStore for CountingStore {
        async fn save(&self, reminder: &Reminder) -> Result<()> {
            self.inner.save(reminder).await
        }

        async fn get_all(&self) -> Result<Vec<Reminder>> {
            self.inner.get_all().await
        }

        async fn get_by_id(&self, id: &str) -> Result<Option<Reminder>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get_by_id(id).await
        }

        async fn clear_all(&self) -> Result<()> {
            self.inner.clear_all().await
        }
    }

    struct Fixture {
        handler: TransitionHandler,
        repo: ReminderRepository,
        store: Arc<CountingStore>,
        rx: UnboundedReceiver<NotifierEvent>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(CountingStore::default());
        let repo = ReminderRepository::new(store.clone());
        let (notifier, rx) = ChannelNotifier::new();
        let handler = TransitionHandler::new(repo.clone(), Arc::new(notifier));
        Fixture {
            handler,
            repo,
            store,
            rx,
        }
    }

    fn reminder(title: &str) -> Reminder {
        Reminder::new(
            Some(title.to_string()),
            Some("DESCRIPTION".to_string()),
            Some("LOCATION".to_string()),
            Some(0.0),
            Some(0.0),
        )
    }

    fn notifications(rx: &mut UnboundedReceiver<NotifierEvent>) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let NotifierEvent::Notification(n) = event {
                out.push(n);
            }
        }
        out
    }

    #[tokio::test]
    async fn test_enter_event_notifies() {
        let mut f = fixture();
        let r = reminder("TITLE");
        f.repo.save_reminder(&r).await;

        let outcome = f.handler.handle(TransitionEvent::enter(vec![r.id.clone()])).await;

        assert_eq!(
            outcome,
            TransitionOutcome::Notified {
                reminder_id: r.id.clone()
            }
        );
        let sent = notifications(&mut f.rx);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "TITLE");
        assert_eq!(sent[0].body, "DESCRIPTION");
    }

    #[tokio::test]
    async fn test_error_code_short_circuits() {
        let mut f = fixture();
        let r = reminder("TITLE");
        f.repo.save_reminder(&r).await;

        let mut event = TransitionEvent::enter(vec![r.id.clone()]);
        event.error_code = Some(1001);
        let outcome = f.handler.handle(event).await;

        assert_eq!(
            outcome,
            TransitionOutcome::Rejected(GeofenceErrorKind::TooManyGeofences)
        );
        assert_eq!(outcome.state(), TransitionState::Rejected);
        assert_eq!(f.store.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(
            f.rx.try_recv().unwrap(),
            NotifierEvent::Message {
                text: GeofenceErrorKind::TooManyGeofences.message().to_string()
            }
        );
        assert!(notifications(&mut f.rx).is_empty());
    }

    #[tokio::test]
    async fn test_exit_and_dwell_are_dropped() {
        let mut f = fixture();
        let r = reminder("TITLE");
        f.repo.save_reminder(&r).await;

        for kind in [TransitionType::Exit, TransitionType::Dwell] {
            let outcome = f
                .handler
                .handle(TransitionEvent::new(kind, vec![r.id.clone()]))
                .await;
            assert_eq!(
                outcome,
                TransitionOutcome::Dropped(DropReason::NotEnterTransition(kind))
            );
        }

        assert!(notifications(&mut f.rx).is_empty());
        assert_eq!(f.store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_trigger_list_is_dropped() {
        let mut f = fixture();

        let outcome = f.handler.handle(TransitionEvent::enter(Vec::new())).await;

        assert_eq!(
            outcome,
            TransitionOutcome::Dropped(DropReason::NoTriggeringGeofences)
        );
        assert!(notifications(&mut f.rx).is_empty());
    }

    #[tokio::test]
    async fn test_only_first_triggered_id_is_processed() {
        let mut f = fixture();
        let a = reminder("A");
        let b = reminder("B");
        f.repo.save_reminder(&a).await;
        f.repo.save_reminder(&b).await;

        f.handler
            .handle(TransitionEvent::enter(vec![a.id.clone(), b.id.clone()]))
            .await;

        let sent = notifications(&mut f.rx);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].reminder_id, a.id);
        assert_eq!(f.store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_first_id_is_dropped_without_fallback() {
        let mut f = fixture();
        let b = reminder("B");
        f.repo.save_reminder(&b).await;

        let outcome = f
            .handler
            .handle(TransitionEvent::enter(vec!["gone".to_string(), b.id.clone()]))
            .await;

        assert_eq!(
            outcome,
            TransitionOutcome::Dropped(DropReason::ReminderUnavailable(
                RepositoryError::NotFound("gone".to_string())
            ))
        );
        assert!(notifications(&mut f.rx).is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_dispatches_are_not_deduplicated() {
        let mut f = fixture();
        let r = reminder("TITLE");
        f.repo.save_reminder(&r).await;

        let first = f.handler.dispatch(TransitionEvent::enter(vec![r.id.clone()]));
        let second = f.handler.dispatch(TransitionEvent::enter(vec![r.id.clone()]));

        assert_eq!(first.await.unwrap().state(), TransitionState::Notified);
        assert_eq!(second.await.unwrap().state(), TransitionState::Notified);
        assert_eq!(notifications(&mut f.rx).len(), 2);
    }
}
