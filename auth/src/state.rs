//! Session state types.
//!
//! This module defines the session state owned by the Auth coordinator's
//! store. All types are `Clone` so the store can hand out snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// Lifecycle Enums
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle of the coordinator itself, independent of login state.
///
/// Transitions monotonically: `Pending` → `Initializing` → `Ready`.
/// It never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModuleStatus {
    /// Constructed, waiting for its dependencies (locale) to become ready.
    #[default]
    Pending,
    /// Querying the platform for the restored login state.
    Initializing,
    /// Operational. Stays `Ready` for the process lifetime.
    Ready,
}

impl ModuleStatus {
    /// Get the status as a stable string key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
        }
    }
}

/// Current authentication outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoginStatus {
    /// No login or logout outcome observed yet.
    #[default]
    Unknown,
    /// The user is not authenticated.
    LoggedOut,
    /// The user holds a valid session token.
    LoggedIn,
}

impl LoginStatus {
    /// Get the status as a stable string key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::LoggedOut => "logged-out",
            Self::LoggedIn => "logged-in",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Token
// ═══════════════════════════════════════════════════════════════════════

/// Opaque credential payload held while logged in.
///
/// Mirrors the platform client's token data; the coordinator never
/// interprets it beyond `owner_id` and the emptiness of `access_token`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    /// Access token. Empty when no session is established.
    pub access_token: String,

    /// Refresh token, if the grant produced one.
    pub refresh_token: Option<String>,

    /// Access token expiry.
    pub expires_at: Option<DateTime<Utc>>,

    /// Identifier of the authenticated principal.
    pub owner_id: Option<String>,

    /// Granted scopes.
    pub scope: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Session State
// ═══════════════════════════════════════════════════════════════════════

/// Root session state.
///
/// Owned exclusively by the coordinator's store and mutated only through
/// [`AuthAction`] transition events. Created empty at coordinator
/// construction and kept for the process lifetime; logout transitions clear
/// the credential fields but leave `status` at `Ready`.
///
/// [`AuthAction`]: crate::actions::AuthAction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    /// Coordinator lifecycle status.
    pub status: ModuleStatus,

    /// Current authentication outcome.
    pub login_status: LoginStatus,

    /// Credential payload, present iff logged in.
    pub token: Option<TokenData>,

    /// Authenticated principal, derived from the token.
    pub owner_id: Option<String>,

    /// True only following an interactive login, as opposed to a session
    /// restored from a persisted token.
    pub fresh_login: bool,

    /// True between `BeforeLogout` and the logout outcome (or its
    /// cancellation). The three-value [`LoginStatus`] cannot express this
    /// transitional condition, so it is tracked separately.
    pub pending_logout: bool,

    /// Last transition-triggering error, kept for diagnostics.
    pub last_error: Option<String>,
}
