//! Platform auth client trait.

use crate::config::{LoginCredentials, LoginUrlOptions};
use crate::error::Result;
use crate::state::TokenData;
use tokio::sync::broadcast;

/// Event classes emitted by the platform auth client.
///
/// Delivered through the broadcast channel returned by
/// [`PlatformAuthClient::events`]; the coordinator applies them to the
/// session store in delivery order, with no coalescing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    /// A login call completed successfully.
    LoginSuccess,
    /// A login call failed.
    LoginError {
        /// The platform's error rendering, when one was attached.
        error: Option<String>,
    },
    /// A logout call completed successfully.
    LogoutSuccess,
    /// A logout call failed.
    LogoutError {
        /// The platform's error rendering, when one was attached.
        error: Option<String>,
    },
    /// A background token refresh succeeded.
    RefreshSuccess,
    /// A background token refresh failed.
    RefreshError {
        /// The platform's error rendering.
        error: String,
    },
}

/// The vendor communications platform's auth surface.
///
/// Not reimplemented here - the coordinator depends only on this contract.
/// Login/logout results must be reported twice: as the call's own return
/// value *and* as a [`PlatformEvent`] on the event stream (the stream is
/// what drives session state; the return value is what callers observe).
pub trait PlatformAuthClient: Send + Sync {
    /// Perform a login with the given credentials.
    ///
    /// # Errors
    ///
    /// Returns the platform's own error; the coordinator propagates it to
    /// the `login` caller unswallowed.
    fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Terminate the platform session.
    ///
    /// # Errors
    ///
    /// Returns the platform's own error, propagated to the `logout` caller.
    fn logout(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Probe whether a session currently exists.
    ///
    /// May consult cached token state and refresh under the hood.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure. Callers that only need a
    /// freshness side effect may ignore both the error and the flag.
    fn logged_in(&self) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Current token data, when a session exists.
    fn token(&self) -> Option<TokenData>;

    /// Whether the refresh token is still valid.
    fn refresh_token_valid(&self) -> bool;

    /// Build the interactive OAuth authorization URL.
    ///
    /// Implementations ignore [`LoginUrlOptions::force`]; the coordinator
    /// appends the force flag itself.
    fn login_url(&self, options: &LoginUrlOptions) -> String;

    /// Purge cached session artifacts.
    ///
    /// Called on unrecoverable refresh failure so the expiry error does not
    /// resurface on the next start.
    fn purge_cache(&self);

    /// Subscribe to the platform event stream.
    ///
    /// Dropping the receiver unsubscribes.
    fn events(&self) -> broadcast::Receiver<PlatformEvent>;
}
