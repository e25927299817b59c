//! User-facing notification keys.
//!
//! The coordinator never renders text; it emits stable message keys that
//! the embedding application resolves against its locale catalog.

use serde::{Deserialize, Serialize};

/// Notification key delivered through the alert sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthMessage {
    /// An interactive login failed.
    LoginError,
    /// A logout call failed.
    LogoutError,
    /// The session expired and could not be refreshed.
    SessionExpired,
    /// A before-logout hook failed (non-fatally).
    BeforeLogoutError,
    /// The OAuth provider denied the authorization request.
    AccessDenied,
    /// An unclassified failure in the OAuth callback flow.
    InternalError,
}

impl AuthMessage {
    /// Get the message as a stable string key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoginError => "login-error",
            Self::LogoutError => "logout-error",
            Self::SessionExpired => "session-expired",
            Self::BeforeLogoutError => "before-logout-error",
            Self::AccessDenied => "access-denied",
            Self::InternalError => "internal-error",
        }
    }
}

impl std::fmt::Display for AuthMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
