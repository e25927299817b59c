//! Isolated execution channel traits.
//!
//! The OAuth redirect must be captured outside the main application
//! context. In a browser that context is a hidden frame plus
//! `postMessage`; other hosts may back it with a subprocess and a pipe, a
//! `WebSocket`, or an embedded browser view. The coordinator only depends
//! on this generic capability.

use crate::error::Result;
use tokio::sync::mpsc;

/// Message received from the proxy context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyMessage {
    /// Origin of the sender, as reported by the host.
    pub origin: String,

    /// The captured OAuth callback URI, when the message carries one.
    pub callback_uri: Option<String>,
}

/// Message posted to the proxy context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthPageRequest {
    /// Fully constructed forced-interactive OAuth URL the proxy context
    /// should navigate to.
    pub oauth_uri: String,
}

/// A live isolated channel.
pub trait ProxyChannel: Send + Sync {
    /// Post a message into the isolated context.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ChannelUnavailable`] when the context is gone.
    ///
    /// [`AuthError::ChannelUnavailable`]: crate::error::AuthError::ChannelUnavailable
    fn post(&self, request: &OAuthPageRequest) -> Result<()>;

    /// Tear the context down. Idempotent.
    fn close(&self);
}

/// Factory for isolated channels.
pub trait ProxyChannelHost: Send + Sync {
    /// Whether a host context exists at all (a headless embedding returns
    /// `false` and the proxy flow is disabled).
    fn is_available(&self) -> bool;

    /// Base URI of the host context, used to resolve the default
    /// `./redirect.html` / `./proxy.html` URIs.
    fn base_uri(&self) -> Option<String>;

    /// Open an isolated context at `url`.
    ///
    /// Returns the channel handle and the inbound message stream. The
    /// stream ends when the channel is closed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ChannelUnavailable`] when the context cannot be
    /// created.
    ///
    /// [`AuthError::ChannelUnavailable`]: crate::error::AuthError::ChannelUnavailable
    fn open(
        &self,
        url: &str,
    ) -> Result<(Box<dyn ProxyChannel>, mpsc::UnboundedReceiver<ProxyMessage>)>;
}
