//! The Auth coordinator.
//!
//! Binds the platform auth client's event stream to the session store,
//! exposes the login/logout/status API, runs the cancellable before-logout
//! hook chain, and owns the proxy channel used by the redirect flow
//! (see [`crate::proxy`]).

use crate::actions::AuthAction;
use crate::config::{AuthConfig, BrandConfig, LoginCredentials, LoginUrlOptions};
use crate::error::{AuthError, Result};
use crate::messages::AuthMessage;
use crate::providers::{
    Alert, AlertSink, LocaleSource, PlatformAuthClient, PlatformEvent, ProxyChannelHost,
};
use crate::proxy::ProxyFrame;
use crate::reducer::AuthReducer;
use crate::state::{AuthState, LoginStatus, ModuleStatus};
use futures::future::BoxFuture;
use softphone_core::store::Store;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{broadcast, watch};
use url::Url;

/// Identity of a registered before-logout hook.
///
/// Minted by [`AuthCoordinator::add_before_logout_handler`]; ids are unique
/// per coordinator and encode nothing but identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// A registered before-logout hook.
///
/// `Ok(Some(reason))` vetoes the logout, `Ok(None)` lets it proceed, and
/// `Err(_)` is reported non-fatally without vetoing. The typed `Option`
/// replaces the source platform's truthiness convention.
pub type BeforeLogoutHandler =
    Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Option<String>>> + Send + Sync>;

type HandlerRegistry = Arc<Mutex<Vec<(HandlerId, BeforeLogoutHandler)>>>;

/// Unregistration token returned by
/// [`AuthCoordinator::add_before_logout_handler`].
///
/// `unregister` is idempotent and holds only a weak reference, so a token
/// outliving its coordinator is harmless.
#[derive(Clone)]
pub struct BeforeLogoutRegistration {
    id: HandlerId,
    registry: Weak<Mutex<Vec<(HandlerId, BeforeLogoutHandler)>>>,
}

impl BeforeLogoutRegistration {
    /// The registered hook's identity.
    #[must_use]
    pub const fn id(&self) -> HandlerId {
        self.id
    }

    /// Remove the hook. Calling this more than once is a no-op.
    pub fn unregister(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for BeforeLogoutRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeforeLogoutRegistration")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

pub(crate) struct Inner<C, A, L, H> {
    pub(crate) client: C,
    pub(crate) alert: A,
    pub(crate) locale: L,
    pub(crate) host: H,
    pub(crate) store: Store<AuthReducer>,
    pub(crate) redirect_uri: Option<String>,
    pub(crate) proxy_uri: Option<String>,
    pub(crate) brand: BrandConfig,
    handlers: HandlerRegistry,
    next_handler_id: AtomicU64,
    initialized: AtomicBool,
    tasks: Mutex<Vec<tokio::task::JoinHandle<()>>>,
    pub(crate) proxy: Mutex<Option<ProxyFrame>>,
}

/// The session lifecycle coordinator.
///
/// Cheap to clone (all clones share one state). Construction wires nothing;
/// call [`initialize`] once to bind the platform event stream and arm the
/// one-shot init sequence.
///
/// # Type Parameters
///
/// - `C`: platform auth client
/// - `A`: alert sink
/// - `L`: locale source
/// - `H`: proxy channel host
///
/// [`initialize`]: AuthCoordinator::initialize
pub struct AuthCoordinator<C, A, L, H> {
    pub(crate) inner: Arc<Inner<C, A, L, H>>,
}

impl<C, A, L, H> Clone for AuthCoordinator<C, A, L, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn resolve_against(base: Option<&String>, relative: &str) -> Option<String> {
    let base = Url::parse(base?.as_str()).ok()?;
    base.join(relative).ok().map(Into::into)
}

impl<C, A, L, H> AuthCoordinator<C, A, L, H>
where
    C: PlatformAuthClient + 'static,
    A: AlertSink + 'static,
    L: LocaleSource + 'static,
    H: ProxyChannelHost + 'static,
{
    /// Create a coordinator from its providers and configuration.
    ///
    /// Session state starts empty (`Pending` / `Unknown`); nothing runs
    /// until [`initialize`](Self::initialize).
    #[must_use]
    pub fn new(client: C, alert: A, locale: L, host: H, config: AuthConfig) -> Self {
        let base = host.base_uri();
        let redirect_uri = config
            .redirect_uri
            .or_else(|| resolve_against(base.as_ref(), "./redirect.html"));
        let proxy_uri = config
            .proxy_uri
            .or_else(|| resolve_against(base.as_ref(), "./proxy.html"));

        Self {
            inner: Arc::new(Inner {
                client,
                alert,
                locale,
                host,
                store: Store::new(AuthState::default(), AuthReducer),
                redirect_uri,
                proxy_uri,
                brand: config.brand,
                handlers: Arc::new(Mutex::new(Vec::new())),
                next_handler_id: AtomicU64::new(0),
                initialized: AtomicBool::new(false),
                tasks: Mutex::new(Vec::new()),
                proxy: Mutex::new(None),
            }),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Initialization
    // ═══════════════════════════════════════════════════════════════════

    /// Bind the platform event stream and arm the init sequence.
    ///
    /// Runs once; subsequent calls are no-ops. Event binding is established
    /// before the init watcher so no externally driven transition can be
    /// missed.
    pub fn initialize(&self) {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            return;
        }
        self.bind_events();
        self.spawn_init_watcher();
    }

    fn bind_events(&self) {
        let this = self.clone();
        // Subscribing here, not inside the task, guarantees no event
        // emitted after initialize() returns can be missed.
        let mut events = self.inner.client.events();
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => this.handle_platform_event(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "platform event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.push_task(handle);
    }

    fn handle_platform_event(&self, event: PlatformEvent) {
        tracing::debug!(?event, "platform event");
        match event {
            PlatformEvent::LoginSuccess => {
                let token = self.inner.client.token().unwrap_or_default();
                self.inner.store.dispatch(AuthAction::LoginSuccess { token });
            }
            PlatformEvent::LoginError { error } => {
                self.inner
                    .store
                    .dispatch(AuthAction::LoginError {
                        error: error.clone(),
                    });
                if let Some(error) = error {
                    self.inner
                        .alert
                        .notify(Alert::danger(AuthMessage::LoginError).with_payload(error));
                }
            }
            PlatformEvent::LogoutSuccess => {
                self.inner.store.dispatch(AuthAction::LogoutSuccess);
            }
            PlatformEvent::LogoutError { error } => {
                self.inner
                    .store
                    .dispatch(AuthAction::LogoutError {
                        error: error.clone(),
                    });
                if let Some(error) = error {
                    self.inner
                        .alert
                        .notify(Alert::danger(AuthMessage::LogoutError).with_payload(error));
                }
            }
            PlatformEvent::RefreshSuccess => {
                let token = self.inner.client.token().unwrap_or_default();
                self.inner
                    .store
                    .dispatch(AuthAction::RefreshSuccess { token });
            }
            PlatformEvent::RefreshError { error } => self.handle_refresh_error(error),
        }
    }

    /// A refresh error is recoverable while the refresh token itself is
    /// still valid. Only the unrecoverable case - invalid refresh token
    /// *and* a previously established access token - is session expiry.
    fn handle_refresh_error(&self, error: String) {
        let refresh_token_valid = self.inner.client.refresh_token_valid();
        let had_access_token = self
            .inner
            .client
            .token()
            .is_some_and(|t| !t.access_token.is_empty());
        self.inner.store.dispatch(AuthAction::RefreshError {
            error: error.clone(),
            refresh_token_valid,
        });
        if !refresh_token_valid && had_access_token {
            self.inner.alert.notify(
                Alert::danger(AuthMessage::SessionExpired)
                    .with_payload(error)
                    .persistent(),
            );
            // Purge so the expiry error does not resurface on next start.
            self.inner.client.purge_cache();
        }
    }

    fn spawn_init_watcher(&self) {
        let this = self.clone();
        let mut state_rx = self.inner.store.subscribe();
        let mut locale_rx = self.inner.locale.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                let pending = this
                    .inner
                    .store
                    .with_state(|s| s.status == ModuleStatus::Pending);
                if !pending {
                    break;
                }
                if this.inner.locale.ready() {
                    this.run_init().await;
                    break;
                }
                tokio::select! {
                    changed = state_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = locale_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        });
        self.push_task(handle);
    }

    async fn run_init(&self) {
        self.inner.store.dispatch(AuthAction::Init);
        // A failed probe at startup is treated as "no restored session";
        // login state will correct itself through platform events.
        let logged_in = self.inner.client.logged_in().await.unwrap_or(false);
        let token = if logged_in {
            self.inner.client.token()
        } else {
            None
        };
        self.inner
            .store
            .dispatch(AuthAction::InitSuccess { logged_in, token });
    }

    fn push_task(&self, handle: tokio::task::JoinHandle<()>) {
        self.inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Abort the spawned tasks and tear down the proxy channel.
    ///
    /// Aborting the event task drops its broadcast receiver, which is the
    /// unsubscribe. A torn-down coordinator stays readable but no longer
    /// reacts to platform events.
    pub fn shutdown(&self) {
        for task in self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
        {
            task.abort();
        }
        self.clear_proxy_frame();
    }

    // ═══════════════════════════════════════════════════════════════════
    // Login
    // ═══════════════════════════════════════════════════════════════════

    /// Log in, either with username/password or with an authorization code.
    ///
    /// Dispatches the `Login` intent transition strictly before the
    /// platform call starts, then awaits the call.
    ///
    /// # Errors
    ///
    /// Propagates the platform client's own error unswallowed.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<()> {
        self.inner.store.dispatch(AuthAction::Login);
        self.inner.client.login(&credentials).await
    }

    /// Build the interactive OAuth authorization URL.
    ///
    /// Pure: delegates to the platform client's URL builder and appends a
    /// literal `&force` suffix when `options.force` is set.
    #[must_use]
    pub fn get_login_url(&self, options: &LoginUrlOptions) -> String {
        let base = self.inner.client.login_url(options);
        if options.force {
            format!("{base}&force")
        } else {
            base
        }
    }

    /// Parse an OAuth redirect URI's query string.
    ///
    /// Returns the `code` parameter (`None` when the callback carried
    /// none).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::OAuthCallback`] when an `error` query parameter
    /// is present, preserving every query parameter on the error. Terminal;
    /// never retried.
    pub fn parse_callback_uri(&self, callback_uri: &str) -> Result<Option<String>> {
        let url = Url::parse(callback_uri).map_err(|e| AuthError::InvalidCallbackUri {
            message: e.to_string(),
        })?;
        let params: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        if let Some(error) = params.get("error") {
            return Err(AuthError::OAuthCallback {
                error: error.clone(),
                params,
            });
        }
        Ok(params.get("code").cloned())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Logout & hooks
    // ═══════════════════════════════════════════════════════════════════

    /// Run the before-logout hook chain, then log out of the platform.
    ///
    /// Hooks run strictly sequentially in registration order, each awaited
    /// to completion before the next starts. A hook returning
    /// `Ok(Some(reason))` vetoes: `CancelLogout` is dispatched, no further
    /// hook runs, the platform logout is never invoked, and this call
    /// fails with the reason. A hook returning `Err` is reported to the
    /// alert sink non-fatally; the chain is abandoned and the logout
    /// proceeds.
    ///
    /// # Errors
    ///
    /// [`AuthError::LogoutCancelled`] on veto, or the platform client's
    /// logout error.
    pub async fn logout(&self) -> Result<()> {
        self.inner.store.dispatch(AuthAction::BeforeLogout);
        let handlers: Vec<(HandlerId, BeforeLogoutHandler)> = self
            .inner
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for (id, handler) in handlers {
            match handler().await {
                Ok(Some(reason)) => {
                    tracing::debug!(handler = id.0, %reason, "logout vetoed");
                    self.inner.store.dispatch(AuthAction::CancelLogout);
                    return Err(AuthError::LogoutCancelled { reason });
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(handler = id.0, %error, "before-logout hook failed");
                    self.inner.alert.notify(
                        Alert::danger(AuthMessage::BeforeLogoutError)
                            .with_payload(error.to_string()),
                    );
                    break;
                }
            }
        }
        self.inner.store.dispatch(AuthAction::Logout);
        self.inner.client.logout().await
    }

    /// Register a before-logout hook.
    ///
    /// Hooks are iterated in registration order. The returned token's
    /// `unregister` is idempotent.
    pub fn add_before_logout_handler<F, Fut>(&self, handler: F) -> BeforeLogoutRegistration
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<Option<String>>> + Send + 'static,
    {
        let id = HandlerId(self.inner.next_handler_id.fetch_add(1, Ordering::Relaxed));
        let boxed: BeforeLogoutHandler = Arc::new(move || {
            let fut: BoxFuture<'static, anyhow::Result<Option<String>>> = Box::pin(handler());
            fut
        });
        self.inner
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, boxed));
        BeforeLogoutRegistration {
            id,
            registry: Arc::downgrade(&self.inner.handlers),
        }
    }

    /// Remove a previously registered hook. No-op if not registered.
    pub fn remove_before_logout_handler(&self, id: HandlerId) {
        self.inner
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(registered, _)| *registered != id);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Status
    // ═══════════════════════════════════════════════════════════════════

    /// Force a freshness check against the platform, then report the
    /// current login status.
    ///
    /// Deliberately tolerant of probe failure: a failed or negative check
    /// does not flip the status to logged-out - only an unrecoverable
    /// refresh-error event does that.
    pub async fn check_is_logged_in(&self) -> bool {
        let _ = self.inner.client.logged_in().await;
        self.login_status() == LoginStatus::LoggedIn
    }

    /// The OAuth redirect URI in effect.
    #[must_use]
    pub fn redirect_uri(&self) -> Option<&str> {
        self.inner.redirect_uri.as_deref()
    }

    /// The proxy page URI in effect.
    #[must_use]
    pub fn proxy_uri(&self) -> Option<&str> {
        self.inner.proxy_uri.as_deref()
    }

    /// Identifier of the authenticated principal, when logged in.
    #[must_use]
    pub fn owner_id(&self) -> Option<String> {
        self.inner.store.with_state(|s| s.owner_id.clone())
    }

    /// Coordinator lifecycle status.
    #[must_use]
    pub fn status(&self) -> ModuleStatus {
        self.inner.store.with_state(|s| s.status)
    }

    /// Whether the coordinator finished initializing.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.status() == ModuleStatus::Ready
    }

    /// Current authentication outcome.
    #[must_use]
    pub fn login_status(&self) -> LoginStatus {
        self.inner.store.with_state(|s| s.login_status)
    }

    /// Whether the current session came from an interactive login.
    #[must_use]
    pub fn is_fresh_login(&self) -> bool {
        self.inner.store.with_state(|s| s.fresh_login)
    }

    /// Snapshot of the full session state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.inner.store.state()
    }

    /// Subscribe to session state snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.store.subscribe()
    }
}

impl<C, A, L, H> std::fmt::Debug for AuthCoordinator<C, A, L, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCoordinator")
            .field("redirect_uri", &self.inner.redirect_uri)
            .field("proxy_uri", &self.inner.proxy_uri)
            .field("brand", &self.inner.brand.id)
            .finish_non_exhaustive()
    }
}
