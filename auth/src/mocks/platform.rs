//! Scriptable platform auth client.

use crate::config::{LoginCredentials, LoginUrlOptions};
use crate::error::{AuthError, Result};
use crate::providers::{PlatformAuthClient, PlatformEvent};
use crate::state::TokenData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

struct ClientInner {
    events: broadcast::Sender<PlatformEvent>,
    token: Mutex<Option<TokenData>>,
    logged_in: AtomicBool,
    refresh_token_valid: AtomicBool,
    fail_login: AtomicBool,
    fail_logout: AtomicBool,
    fail_logged_in: AtomicBool,
    login_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    logged_in_calls: AtomicUsize,
    purge_calls: AtomicUsize,
}

/// In-memory [`PlatformAuthClient`].
///
/// Successful calls mirror the real client's dual reporting: the call
/// returns `Ok` *and* the matching [`PlatformEvent`] is emitted on the
/// event stream. Failures return `Err` and emit the error event.
#[derive(Clone)]
pub struct MockPlatformClient {
    inner: Arc<ClientInner>,
}

impl MockPlatformClient {
    /// Create a client with no session and a valid refresh token.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(ClientInner {
                events,
                token: Mutex::new(None),
                logged_in: AtomicBool::new(false),
                refresh_token_valid: AtomicBool::new(true),
                fail_login: AtomicBool::new(false),
                fail_logout: AtomicBool::new(false),
                fail_logged_in: AtomicBool::new(false),
                login_calls: AtomicUsize::new(0),
                logout_calls: AtomicUsize::new(0),
                logged_in_calls: AtomicUsize::new(0),
                purge_calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Seed an existing session (restored-token startup scenarios).
    #[must_use]
    pub fn with_session(self, token: TokenData) -> Self {
        *self
            .inner
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
        self.inner.logged_in.store(true, Ordering::SeqCst);
        self
    }

    /// Script the next `login` call to fail.
    pub fn fail_next_login(&self) {
        self.inner.fail_login.store(true, Ordering::SeqCst);
    }

    /// Script the next `logout` call to fail.
    pub fn fail_next_logout(&self) {
        self.inner.fail_logout.store(true, Ordering::SeqCst);
    }

    /// Script `logged_in` probes to fail.
    pub fn fail_logged_in(&self, fail: bool) {
        self.inner.fail_logged_in.store(fail, Ordering::SeqCst);
    }

    /// Script the refresh-token validity flag.
    pub fn set_refresh_token_valid(&self, valid: bool) {
        self.inner
            .refresh_token_valid
            .store(valid, Ordering::SeqCst);
    }

    /// Replace the cached token.
    pub fn set_token(&self, token: Option<TokenData>) {
        *self
            .inner
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Emit an event on the stream, as the platform would.
    pub fn emit(&self, event: PlatformEvent) {
        let _ = self.inner.events.send(event);
    }

    /// Number of `login` calls observed.
    #[must_use]
    pub fn login_calls(&self) -> usize {
        self.inner.login_calls.load(Ordering::SeqCst)
    }

    /// Number of `logout` calls observed.
    #[must_use]
    pub fn logout_calls(&self) -> usize {
        self.inner.logout_calls.load(Ordering::SeqCst)
    }

    /// Number of `logged_in` probes observed.
    #[must_use]
    pub fn logged_in_calls(&self) -> usize {
        self.inner.logged_in_calls.load(Ordering::SeqCst)
    }

    /// Number of `purge_cache` calls observed.
    #[must_use]
    pub fn purge_calls(&self) -> usize {
        self.inner.purge_calls.load(Ordering::SeqCst)
    }

    fn default_token() -> TokenData {
        TokenData {
            access_token: "mock-access-token".into(),
            owner_id: Some("mock-owner".into()),
            ..TokenData::default()
        }
    }
}

impl Default for MockPlatformClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformAuthClient for MockPlatformClient {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<()> {
        self.inner.login_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_login.swap(false, Ordering::SeqCst) {
            self.emit(PlatformEvent::LoginError {
                error: Some("mock login failure".into()),
            });
            return Err(AuthError::platform("mock login failure"));
        }
        let mut token = self
            .inner
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if token.is_none() {
            *token = Some(Self::default_token());
        }
        drop(token);
        self.inner.logged_in.store(true, Ordering::SeqCst);
        self.emit(PlatformEvent::LoginSuccess);
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.inner.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_logout.swap(false, Ordering::SeqCst) {
            self.emit(PlatformEvent::LogoutError {
                error: Some("mock logout failure".into()),
            });
            return Err(AuthError::platform("mock logout failure"));
        }
        self.set_token(None);
        self.inner.logged_in.store(false, Ordering::SeqCst);
        self.emit(PlatformEvent::LogoutSuccess);
        Ok(())
    }

    async fn logged_in(&self) -> Result<bool> {
        self.inner.logged_in_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_logged_in.load(Ordering::SeqCst) {
            return Err(AuthError::platform("mock status probe failure"));
        }
        Ok(self.inner.logged_in.load(Ordering::SeqCst))
    }

    fn token(&self) -> Option<TokenData> {
        self.inner
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn refresh_token_valid(&self) -> bool {
        self.inner.refresh_token_valid.load(Ordering::SeqCst)
    }

    fn login_url(&self, options: &LoginUrlOptions) -> String {
        let mut url = format!(
            "https://platform.example.com/oauth/authorize?redirectUri={}",
            urlencoding::encode(&options.redirect_uri)
        );
        if let Some(brand_id) = &options.brand_id {
            url.push_str("&brandId=");
            url.push_str(&urlencoding::encode(brand_id));
        }
        if let Some(state) = &options.state {
            url.push_str("&state=");
            url.push_str(&urlencoding::encode(state));
        }
        if let Some(display) = &options.display {
            url.push_str("&display=");
            url.push_str(&urlencoding::encode(display));
        }
        if let Some(prompt) = &options.prompt {
            url.push_str("&prompt=");
            url.push_str(&urlencoding::encode(prompt));
        }
        url
    }

    fn purge_cache(&self) {
        self.inner.purge_calls.fetch_add(1, Ordering::SeqCst);
        self.set_token(None);
    }

    fn events(&self) -> broadcast::Receiver<PlatformEvent> {
        self.inner.events.subscribe()
    }
}
