//! Notification boundary
//!
//! Delivery is fire-and-forget: implementations must not block and the
//! engine never observes whether the notification was shown.

use crate::database::Reminder;
use serde::Serialize;
use tokio::sync::mpsc;

/// User-visible notification for a reminder whose region was entered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    /// Reminder ID, used as the notification identity
    pub reminder_id: String,
    pub title: String,
    pub body: String,
    pub location: Option<String>,
}

impl Notification {
    pub fn for_reminder(reminder: &Reminder) -> Self {
        Self {
            reminder_id: reminder.id.clone(),
            title: reminder.title.clone().unwrap_or_default(),
            body: reminder.description.clone().unwrap_or_default(),
            location: reminder.location.clone(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn deliver(&self, notification: Notification);

    /// Short-lived message, e.g. a platform error during transition handling
    fn show_message(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Writes notifications to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, notification: Notification) {
        tracing::info!(
            reminder_id = %notification.reminder_id,
            location = notification.location.as_deref().unwrap_or(""),
            "Reminder notification: {} - {}",
            notification.title,
            notification.body
        );
    }
}

/// What a `ChannelNotifier` forwards
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifierEvent {
    Notification(Notification),
    Message { text: String },
}

/// Forwards everything to an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<NotifierEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NotifierEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn deliver(&self, notification: Notification) {
        if self.tx.send(NotifierEvent::Notification(notification)).is_err() {
            tracing::debug!("Notification receiver dropped");
        }
    }

    fn show_message(&self, message: &str) {
        let event = NotifierEvent::Message {
            text: message.to_string(),
        };
        if self.tx.send(event).is_err() {
            tracing::debug!("Notification receiver dropped");
        }
    }
}
