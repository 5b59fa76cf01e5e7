//! Notification collaborators.
//!
//! Notifications are fire-and-forget: the cart hands over a message and a
//! kind and never hears back. Toast presentation and timing live in the
//! front end's implementation of [`Notifier`].

use chrono::{DateTime, Utc};
use panier_core::NotificationKind;
use tracing::{info, warn};

/// Receives shopper-facing notifications.
pub trait Notifier {
    /// Show `message`. Must not fail.
    fn notify(&mut self, message: &str, kind: NotificationKind);
}

/// Notifier that writes to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Success => info!(%kind, "{message}"),
            NotificationKind::Error => warn!(%kind, "{message}"),
        }
    }
}

/// A notification as recorded by [`NotificationLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub issued_at: DateTime<Utc>,
}

/// Notifier that records every notification in order.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Most recent notification.
    #[must_use]
    pub fn last(&self) -> Option<&Notification> {
        self.entries.last()
    }
}

impl Notifier for NotificationLog {
    fn notify(&mut self, message: &str, kind: NotificationKind) {
        self.entries.push(Notification {
            message: message.to_owned(),
            kind,
            issued_at: Utc::now(),
        });
    }
}
