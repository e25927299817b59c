//! In-memory proxy channel host.

use crate::error::{AuthError, Result};
use crate::providers::{OAuthPageRequest, ProxyChannel, ProxyChannelHost, ProxyMessage};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// Shared state of one opened channel.
struct ChannelState {
    posted: Mutex<Vec<OAuthPageRequest>>,
    close_calls: AtomicUsize,
    fail_post: AtomicBool,
}

/// A [`ProxyChannel`] backed by an in-process queue.
#[derive(Clone)]
pub struct MockProxyChannel {
    state: Arc<ChannelState>,
}

impl ProxyChannel for MockProxyChannel {
    fn post(&self, request: &OAuthPageRequest) -> Result<()> {
        if self.state.fail_post.load(Ordering::SeqCst) {
            return Err(AuthError::ChannelUnavailable {
                message: "mock post failure".into(),
            });
        }
        self.state
            .posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        Ok(())
    }

    fn close(&self) {
        self.state.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

struct HostInner {
    available: AtomicBool,
    base_uri: Option<String>,
    fail_open: AtomicBool,
    open_calls: AtomicUsize,
    opened_urls: Mutex<Vec<String>>,
    last: Mutex<Option<(Arc<ChannelState>, mpsc::UnboundedSender<ProxyMessage>)>>,
}

/// A [`ProxyChannelHost`] whose opened channels can be driven from the
/// test: inject inbound messages with [`send`](Self::send) and inspect
/// outbound posts with [`posted`](Self::posted).
#[derive(Clone)]
pub struct MockChannelHost {
    inner: Arc<HostInner>,
}

impl MockChannelHost {
    /// Create an available host with base URI `https://app.example.com/`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_uri(Some("https://app.example.com/".into()))
    }

    /// Create a host that reports no context at all.
    #[must_use]
    pub fn unavailable() -> Self {
        let host = Self::with_base_uri(None);
        host.inner.available.store(false, Ordering::SeqCst);
        host
    }

    /// Create an available host with the given base URI.
    #[must_use]
    pub fn with_base_uri(base_uri: Option<String>) -> Self {
        Self {
            inner: Arc::new(HostInner {
                available: AtomicBool::new(true),
                base_uri,
                fail_open: AtomicBool::new(false),
                open_calls: AtomicUsize::new(0),
                opened_urls: Mutex::new(Vec::new()),
                last: Mutex::new(None),
            }),
        }
    }

    /// Script the next `open` call to fail.
    pub fn fail_next_open(&self) {
        self.inner.fail_open.store(true, Ordering::SeqCst);
    }

    /// Number of `open` calls observed.
    #[must_use]
    pub fn open_calls(&self) -> usize {
        self.inner.open_calls.load(Ordering::SeqCst)
    }

    /// URLs the channels were opened at, in order.
    #[must_use]
    pub fn opened_urls(&self) -> Vec<String> {
        self.inner
            .opened_urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Inject an inbound message into the most recently opened channel.
    ///
    /// # Panics
    ///
    /// Panics if no channel has been opened.
    #[allow(clippy::expect_used)] // Test mock: sending before open is a test bug
    pub fn send(&self, message: ProxyMessage) {
        let last = self
            .inner
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (_, tx) = last.as_ref().expect("no channel opened");
        let _ = tx.send(message);
    }

    /// Requests posted to the most recently opened channel.
    #[must_use]
    pub fn posted(&self) -> Vec<OAuthPageRequest> {
        self.inner
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(state, _)| {
                state
                    .posted
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            })
            .unwrap_or_default()
    }

    /// Number of `close` calls on the most recently opened channel.
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.inner
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |(state, _)| state.close_calls.load(Ordering::SeqCst))
    }
}

impl Default for MockChannelHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyChannelHost for MockChannelHost {
    fn is_available(&self) -> bool {
        self.inner.available.load(Ordering::SeqCst)
    }

    fn base_uri(&self) -> Option<String> {
        self.inner.base_uri.clone()
    }

    fn open(
        &self,
        url: &str,
    ) -> Result<(Box<dyn ProxyChannel>, mpsc::UnboundedReceiver<ProxyMessage>)> {
        self.inner.open_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_open.swap(false, Ordering::SeqCst) {
            return Err(AuthError::ChannelUnavailable {
                message: "mock open failure".into(),
            });
        }
        self.inner
            .opened_urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        let state = Arc::new(ChannelState {
            posted: Mutex::new(Vec::new()),
            close_calls: AtomicUsize::new(0),
            fail_post: AtomicBool::new(false),
        });
        let (tx, rx) = mpsc::unbounded_channel();
        *self
            .inner
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some((Arc::clone(&state), tx));
        Ok((Box::new(MockProxyChannel { state }), rx))
    }
}
