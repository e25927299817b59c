//! Error types for session coordination.

use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias for session coordination operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for the session coordinator.
///
/// Errors with a clear caller (`login`, `logout`, `parse_callback_uri`)
/// propagate as `Err`; errors arising in background event handling are
/// converted to alert-sink notifications instead (see the coordinator).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The OAuth redirect came back with an `error` query parameter.
    ///
    /// Every query parameter of the callback URI is preserved in `params`
    /// (including `error` itself and vendor-defined auxiliary fields such
    /// as `error_description`). Never retried.
    #[error("{error}")]
    OAuthCallback {
        /// The `error` query parameter value.
        error: String,
        /// All query parameters of the callback URI.
        params: BTreeMap<String, String>,
    },

    /// The callback URI could not be parsed at all.
    #[error("malformed callback uri: {message}")]
    InvalidCallbackUri {
        /// Parser message.
        message: String,
    },

    /// A platform client call failed (login, logout, status probe).
    ///
    /// Propagated to the caller unswallowed.
    #[error("platform request failed: {message}")]
    Platform {
        /// The platform client's own error rendering.
        message: String,
    },

    /// A before-logout hook vetoed the logout.
    #[error("logout cancelled: {reason}")]
    LogoutCancelled {
        /// The hook's veto reason, propagated as the rejection value.
        reason: String,
    },

    /// The proxy channel host refused to open or relay.
    #[error("proxy channel unavailable: {message}")]
    ChannelUnavailable {
        /// Host-provided detail.
        message: String,
    },
}

impl AuthError {
    /// Shorthand for a platform call failure.
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }

    /// The preserved callback query parameter for `key`, when this is an
    /// [`AuthError::OAuthCallback`].
    #[must_use]
    pub fn callback_param(&self, key: &str) -> Option<&str> {
        match self {
            Self::OAuthCallback { params, .. } => params.get(key).map(String::as_str),
            _ => None,
        }
    }

    /// Returns `true` if this error means the user (or the provider on the
    /// user's behalf) denied the authorization request.
    ///
    /// ```
    /// # use softphone_auth::error::AuthError;
    /// # use std::collections::BTreeMap;
    /// let err = AuthError::OAuthCallback {
    ///     error: "access_denied".into(),
    ///     params: BTreeMap::new(),
    /// };
    /// assert!(err.is_access_denied());
    /// ```
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            Self::OAuthCallback { error, .. } if matches!(
                error.as_str(),
                "invalid_request"
                    | "unauthorized_client"
                    | "access_denied"
                    | "unsupported_response_type"
                    | "invalid_scope"
            )
        )
    }
}
