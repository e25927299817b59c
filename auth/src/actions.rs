//! Session transition events.
//!
//! This module defines every transition event the session store accepts.
//! Events are the **only** way session state changes; the reducer applies
//! each one synchronously and atomically.

use crate::state::TokenData;
use serde::{Deserialize, Serialize};

/// Session transition event.
///
/// Events fall into two groups:
///
/// - **Intents** dispatched by coordinator operations before the underlying
///   platform call starts (`Login`, `BeforeLogout`, `Logout`, ...)
/// - **Outcomes** translated from platform client events
///   (`LoginSuccess`, `RefreshError`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuthAction {
    // ═══════════════════════════════════════════════════════════════════
    // Initialization
    // ═══════════════════════════════════════════════════════════════════
    /// The locale dependency became ready; restoration of a persisted
    /// session is underway.
    Init,

    /// Restoration finished.
    InitSuccess {
        /// Whether the platform reported an existing session.
        logged_in: bool,
        /// The restored token, when logged in.
        token: Option<TokenData>,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Login
    // ═══════════════════════════════════════════════════════════════════
    /// An interactive login call started.
    Login,

    /// The platform reported a successful login.
    LoginSuccess {
        /// Token snapshot taken at the success event.
        token: TokenData,
    },

    /// The platform reported a failed login.
    LoginError {
        /// The platform error, when one was attached to the event.
        error: Option<String>,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Logout
    // ═══════════════════════════════════════════════════════════════════
    /// The before-logout hook chain started.
    BeforeLogout,

    /// A hook vetoed the logout; the session continues.
    CancelLogout,

    /// All hooks passed; the platform logout call started.
    Logout,

    /// The platform reported a completed logout.
    LogoutSuccess,

    /// The platform reported a failed logout. The session is still treated
    /// as terminated.
    LogoutError {
        /// The platform error, when one was attached to the event.
        error: Option<String>,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Token refresh
    // ═══════════════════════════════════════════════════════════════════
    /// The platform refreshed the token in the background.
    RefreshSuccess {
        /// The refreshed token.
        token: TokenData,
    },

    /// A background refresh failed.
    RefreshError {
        /// The platform error.
        error: String,
        /// Whether the refresh token itself is still valid. When it is,
        /// the failure is recoverable and login state is untouched.
        refresh_token_valid: bool,
    },
}
