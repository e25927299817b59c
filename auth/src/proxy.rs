//! Proxy channel management.
//!
//! The redirect flow needs an isolated context (a hidden frame in a
//! browser, a subprocess elsewhere) that loads the hosted proxy page,
//! captures the OAuth callback, and relays it back over the channel. This
//! module owns that channel's lifecycle and turns captured callbacks into
//! logins.

use crate::config::{LoginCredentials, LoginUrlOptions};
use crate::coordinator::AuthCoordinator;
use crate::error::{AuthError, Result};
use crate::messages::AuthMessage;
use crate::providers::{
    Alert, AlertSink, LocaleSource, OAuthPageRequest, PlatformAuthClient, ProxyChannel,
    ProxyChannelHost, ProxyMessage,
};
use std::sync::{Arc, PoisonError};
use tokio::sync::mpsc;

type OnLogin = Arc<dyn Fn() + Send + Sync>;

/// A live proxy channel plus its inbound message listener.
pub(crate) struct ProxyFrame {
    channel: Box<dyn ProxyChannel>,
    listener: tokio::task::JoinHandle<()>,
}

impl<C, A, L, H> AuthCoordinator<C, A, L, H>
where
    C: PlatformAuthClient + 'static,
    A: AlertSink + 'static,
    L: LocaleSource + 'static,
    H: ProxyChannelHost + 'static,
{
    /// Open the background callback-capture channel.
    ///
    /// `on_login` runs after every login completed from a captured
    /// callback. No-op when the host has no context, when no proxy URI is
    /// configured, or when a channel is already open (at most one exists
    /// per coordinator).
    ///
    /// # Errors
    ///
    /// Propagates [`AuthError::ChannelUnavailable`] from the host.
    pub fn setup_proxy_frame<F>(&self, on_login: F) -> Result<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        if !self.inner.host.is_available() {
            return Ok(());
        }
        let Some(proxy_uri) = self.inner.proxy_uri.clone() else {
            return Ok(());
        };
        let mut slot = self
            .inner
            .proxy
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Ok(());
        }
        let (channel, rx) = self.inner.host.open(&proxy_uri)?;
        let listener = self.spawn_proxy_listener(rx, Arc::new(on_login));
        *slot = Some(ProxyFrame { channel, listener });
        Ok(())
    }

    fn spawn_proxy_listener(
        &self,
        mut rx: mpsc::UnboundedReceiver<ProxyMessage>,
        on_login: OnLogin,
    ) -> tokio::task::JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                this.handle_proxy_message(message, &on_login).await;
            }
        })
    }

    /// Messages are accepted from any origin; the origin is recorded for
    /// diagnosis but not checked against an allow-list.
    async fn handle_proxy_message(&self, message: ProxyMessage, on_login: &OnLogin) {
        tracing::debug!(origin = %message.origin, "proxy message");
        let Some(callback_uri) = message.callback_uri else {
            return;
        };
        match self.parse_callback_uri(&callback_uri) {
            Ok(Some(code)) if !code.is_empty() => {
                let redirect_uri = self.inner.redirect_uri.clone().unwrap_or_default();
                match self
                    .login(LoginCredentials::AuthorizationCode { code, redirect_uri })
                    .await
                {
                    Ok(()) => on_login(),
                    Err(error) => self.notify_callback_error(&error),
                }
            }
            Ok(_) => {
                tracing::debug!("callback carried no authorization code");
            }
            Err(error) => self.notify_callback_error(&error),
        }
    }

    fn notify_callback_error(&self, error: &AuthError) {
        tracing::warn!(%error, "oauth callback failed");
        let message = if error.is_access_denied() {
            AuthMessage::AccessDenied
        } else {
            AuthMessage::InternalError
        };
        self.inner
            .alert
            .notify(Alert::danger(message).with_payload(error.to_string()));
    }

    /// Tear the proxy channel down. Idempotent.
    pub fn clear_proxy_frame(&self) {
        let frame = self
            .inner
            .proxy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(frame) = frame {
            frame.channel.close();
            frame.listener.abort();
        }
    }

    /// Whether the callback-capture channel is currently open.
    #[must_use]
    pub fn proxy_frame_open(&self) -> bool {
        self.inner
            .proxy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Ask the proxy context to navigate to the hosted OAuth page.
    ///
    /// The posted URL is the forced-interactive authorization URL for the
    /// effective redirect URI, branded, with the current locale stamped as
    /// a `localeId` query parameter. No-op when no channel is open.
    ///
    /// # Errors
    ///
    /// Returns the channel's own post error.
    pub fn open_oauth_page(&self) -> Result<()> {
        let slot = self
            .inner
            .proxy
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(frame) = slot.as_ref() else {
            tracing::debug!("open_oauth_page without a proxy frame, ignoring");
            return Ok(());
        };
        let redirect_uri = self.inner.redirect_uri.clone().unwrap_or_default();
        let options = LoginUrlOptions::new(redirect_uri)
            .with_brand_id(self.inner.brand.id.clone())
            .with_force(true);
        let oauth_uri = format!(
            "{}&localeId={}",
            self.get_login_url(&options),
            urlencoding::encode(&self.inner.locale.current_locale())
        );
        frame.channel.post(&OAuthPageRequest { oauth_uri })
    }
}
