//! Scriptable locale source.

use crate::providers::LocaleSource;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

struct LocaleInner {
    ready: watch::Sender<bool>,
    locale: Mutex<String>,
}

/// A [`LocaleSource`] whose readiness can be flipped mid-test.
#[derive(Clone)]
pub struct MockLocaleSource {
    inner: Arc<LocaleInner>,
}

impl MockLocaleSource {
    /// Create a source that is ready from the start.
    #[must_use]
    pub fn ready(locale: impl Into<String>) -> Self {
        Self::with_readiness(locale, true)
    }

    /// Create a source that is not ready yet.
    #[must_use]
    pub fn not_ready(locale: impl Into<String>) -> Self {
        Self::with_readiness(locale, false)
    }

    fn with_readiness(locale: impl Into<String>, ready: bool) -> Self {
        let (tx, _) = watch::channel(ready);
        Self {
            inner: Arc::new(LocaleInner {
                ready: tx,
                locale: Mutex::new(locale.into()),
            }),
        }
    }

    /// Flip readiness, waking subscribers.
    pub fn set_ready(&self, ready: bool) {
        self.inner.ready.send_replace(ready);
    }

    /// Change the current locale.
    pub fn set_locale(&self, locale: impl Into<String>) {
        *self
            .inner
            .locale
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = locale.into();
    }
}

impl LocaleSource for MockLocaleSource {
    fn ready(&self) -> bool {
        *self.inner.ready.borrow()
    }

    fn current_locale(&self) -> String {
        self.inner
            .locale
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.ready.subscribe()
    }
}
