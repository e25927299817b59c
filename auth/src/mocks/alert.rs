//! Recording alert sink.

use crate::messages::AuthMessage;
use crate::providers::{Alert, AlertSink};
use std::sync::{Arc, Mutex, PoisonError};

/// An [`AlertSink`] that records every notification for assertions.
#[derive(Clone, Default)]
pub struct MockAlertSink {
    recorded: Arc<Mutex<Vec<Alert>>>,
}

impl MockAlertSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification delivered so far, in order.
    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Message keys delivered so far, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<AuthMessage> {
        self.alerts().into_iter().map(|a| a.message).collect()
    }

    /// Notifications carrying the given message key.
    #[must_use]
    pub fn with_message(&self, message: AuthMessage) -> Vec<Alert> {
        self.alerts()
            .into_iter()
            .filter(|a| a.message == message)
            .collect()
    }

    /// Total number of notifications delivered.
    #[must_use]
    pub fn count(&self) -> usize {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl AlertSink for MockAlertSink {
    fn notify(&self, alert: Alert) {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(alert);
    }
}
