//! Locale dependency trait.

use tokio::sync::watch;

/// The application locale dependency.
///
/// The coordinator defers initialization until the locale is ready, and
/// stamps the current locale onto the hosted OAuth page URL.
pub trait LocaleSource: Send + Sync {
    /// Whether the locale catalog is loaded.
    fn ready(&self) -> bool;

    /// The current locale identifier (for example `en-US`).
    fn current_locale(&self) -> String;

    /// Subscribe to readiness changes.
    fn subscribe(&self) -> watch::Receiver<bool>;
}
