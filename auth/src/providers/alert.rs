//! Alert sink trait.

use crate::messages::AuthMessage;
use std::time::Duration;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Informational.
    Info,
    /// Needs attention but nothing is broken.
    Warning,
    /// Something failed.
    Danger,
}

impl Severity {
    /// Get the severity as a stable string key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// A user-facing notification.
///
/// `ttl` of `Some(Duration::ZERO)` marks a persistent notification that
/// never auto-dismisses; `None` leaves the display duration to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Severity level.
    pub severity: Severity,

    /// Message key, resolved by the embedding application.
    pub message: AuthMessage,

    /// Diagnostic payload attached to the notification.
    pub payload: Option<String>,

    /// Display duration; `Some(ZERO)` means persistent.
    pub ttl: Option<Duration>,
}

impl Alert {
    /// Create a notification.
    #[must_use]
    pub const fn new(severity: Severity, message: AuthMessage) -> Self {
        Self {
            severity,
            message,
            payload: None,
            ttl: None,
        }
    }

    /// Create a danger-severity notification.
    #[must_use]
    pub const fn danger(message: AuthMessage) -> Self {
        Self::new(Severity::Danger, message)
    }

    /// Attach a diagnostic payload.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Mark the notification persistent (never auto-dismissed).
    #[must_use]
    pub const fn persistent(mut self) -> Self {
        self.ttl = Some(Duration::ZERO);
        self
    }

    /// Whether the notification is persistent.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.ttl == Some(Duration::ZERO)
    }
}

/// Receiver of user-facing error notifications.
pub trait AlertSink: Send + Sync {
    /// Deliver a notification. Fire-and-forget; must not block.
    fn notify(&self, alert: Alert);
}
