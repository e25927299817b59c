//! Generic polling data-fetcher with subscription-triggered invalidation.
//!
//! Data-backed SDK modules (extension info, contact lists, ...) share the
//! same fetch discipline: pull once, keep the result until its time-to-live
//! elapses, refresh in the background while polling is enabled, retry on a
//! shorter interval after a failure, and refetch immediately when a push
//! notification invalidates the cached value. `DataFetcher` packages that
//! discipline once so modules only supply a [`DataSource`].

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Errors produced by a [`DataSource`] fetch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The underlying transport failed.
    #[error("fetch transport error: {0}")]
    Transport(String),

    /// The response could not be interpreted.
    #[error("fetch returned malformed data: {0}")]
    Malformed(String),
}

/// A source of remote data for a [`DataFetcher`].
pub trait DataSource: Send + Sync + 'static {
    /// The data produced by a successful fetch.
    type Data: Clone + Send + Sync + 'static;

    /// Fetch a fresh copy of the data.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the data could not be retrieved.
    fn fetch(&self) -> impl std::future::Future<Output = Result<Self::Data, FetchError>> + Send;
}

/// Fetcher timing configuration.
///
/// Defaults match the production polling discipline: refresh every half
/// hour, retry 62 seconds after a failure.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// How long a fetched value stays fresh.
    pub ttl: Duration,

    /// Delay before retrying after a failed fetch.
    pub time_to_retry: Duration,

    /// Whether the background polling loop runs at all.
    pub polling: bool,
}

impl FetcherConfig {
    /// Create a config with the default timing values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ttl: Duration::from_secs(30 * 60),
            time_to_retry: Duration::from_secs(62),
            polling: true,
        }
    }

    /// Set the time-to-live.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the retry delay.
    #[must_use]
    pub const fn with_time_to_retry(mut self, time_to_retry: Duration) -> Self {
        self.time_to_retry = time_to_retry;
        self
    }

    /// Enable or disable background polling.
    #[must_use]
    pub const fn with_polling(mut self, polling: bool) -> Self {
        self.polling = polling;
        self
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of a fetcher's cached data.
#[derive(Debug, Clone)]
pub struct FetchState<T> {
    /// Last successfully fetched value, if any.
    pub data: Option<T>,

    /// When `data` was fetched. Cleared by invalidation.
    pub fetched_at: Option<DateTime<Utc>>,

    /// Message of the last failed fetch, cleared on success.
    pub last_error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            fetched_at: None,
            last_error: None,
        }
    }
}

/// Polling data-fetcher.
///
/// A failed fetch never clears previously fetched data: readers keep the
/// last-known-good value while the fetcher retries in the background.
///
/// # Example
///
/// ```no_run
/// # use softphone_core::fetcher::{DataFetcher, DataSource, FetchError, FetcherConfig};
/// # struct ExtensionSource;
/// # impl DataSource for ExtensionSource {
/// #     type Data = String;
/// #     async fn fetch(&self) -> Result<String, FetchError> { Ok("ext".into()) }
/// # }
/// # async fn demo() {
/// let fetcher = DataFetcher::new(ExtensionSource, FetcherConfig::default());
/// fetcher.start();
/// let info = fetcher.fetch_data().await;
/// # }
/// ```
pub struct DataFetcher<S: DataSource> {
    source: Arc<S>,
    config: FetcherConfig,
    tx: Arc<watch::Sender<FetchState<S::Data>>>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: DataSource> DataFetcher<S> {
    /// Create a fetcher over `source` with the given timing config.
    #[must_use]
    pub fn new(source: S, config: FetcherConfig) -> Self {
        let (tx, _) = watch::channel(FetchState::default());
        Self {
            source: Arc::new(source),
            config,
            tx: Arc::new(tx),
            poll_task: Mutex::new(None),
        }
    }

    /// Snapshot of the cached data.
    #[must_use]
    pub fn data(&self) -> Option<S::Data> {
        self.tx.borrow().data.clone()
    }

    /// Message of the last failed fetch, if the most recent fetch failed.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.tx.borrow().last_error.clone()
    }

    /// Subscribe to cache snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchState<S::Data>> {
        self.tx.subscribe()
    }

    /// Force a refresh now, regardless of freshness.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] from the source. The cached value is left
    /// untouched on failure.
    pub async fn fetch_data(&self) -> Result<S::Data, FetchError> {
        Self::run_fetch(&self.source, &self.tx).await
    }

    /// Drop the cached value's freshness and refetch.
    ///
    /// Subscription handlers call this when a push notification reports the
    /// remote resource changed. Fetch failures are swallowed here; the
    /// polling loop retries on its own schedule.
    pub async fn invalidate(&self) {
        self.tx.send_modify(|state| state.fetched_at = None);
        if let Err(error) = Self::run_fetch(&self.source, &self.tx).await {
            tracing::warn!(%error, "refetch after invalidation failed");
        }
    }

    /// Start the background polling loop.
    ///
    /// No-op when polling is disabled in the config or a loop is already
    /// running. The loop refreshes whenever the cached value is older than
    /// `ttl`, and retries after `time_to_retry` when a fetch fails.
    pub fn start(&self) {
        if !self.config.polling {
            return;
        }
        let mut guard = match self.poll_task.try_lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if guard.is_some() {
            return;
        }

        let source = Arc::clone(&self.source);
        let tx = Arc::clone(&self.tx);
        let ttl = self.config.ttl;
        let time_to_retry = self.config.time_to_retry;

        *guard = Some(tokio::spawn(async move {
            loop {
                match Self::run_fetch(&source, &tx).await {
                    Ok(_) => tokio::time::sleep(ttl).await,
                    Err(error) => {
                        tracing::warn!(%error, "polling fetch failed, will retry");
                        tokio::time::sleep(time_to_retry).await;
                    }
                }
            }
        }));
    }

    /// Stop the background polling loop. Idempotent.
    pub fn stop(&self) {
        if let Ok(mut guard) = self.poll_task.try_lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
    }

    async fn run_fetch(
        source: &Arc<S>,
        tx: &watch::Sender<FetchState<S::Data>>,
    ) -> Result<S::Data, FetchError> {
        match source.fetch().await {
            Ok(data) => {
                tx.send_modify(|state| {
                    state.data = Some(data.clone());
                    state.fetched_at = Some(Utc::now());
                    state.last_error = None;
                });
                Ok(data)
            }
            Err(error) => {
                tx.send_modify(|state| {
                    state.last_error = Some(error.to_string());
                });
                Err(error)
            }
        }
    }
}

impl<S: DataSource> Drop for DataFetcher<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct CountingSource {
        calls: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
    }

    impl DataSource for CountingSource {
        type Data = usize;

        async fn fetch(&self) -> Result<usize, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                Err(FetchError::Transport("boom".into()))
            } else {
                Ok(call)
            }
        }
    }

    fn counting_fetcher(config: FetcherConfig) -> (DataFetcher<CountingSource>, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fail = Arc::new(AtomicBool::new(false));
        let source = CountingSource {
            calls: Arc::clone(&calls),
            fail: Arc::clone(&fail),
        };
        (DataFetcher::new(source, config), calls, fail)
    }

    #[tokio::test]
    async fn fetch_data_populates_cache() {
        let (fetcher, calls, _) = counting_fetcher(FetcherConfig::default().with_polling(false));
        assert!(fetcher.data().is_none());

        let value = fetcher.fetch_data().await.unwrap();
        assert_eq!(value, 1);
        assert_eq!(fetcher.data(), Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_last_known_good() {
        let (fetcher, _, fail) = counting_fetcher(FetcherConfig::default().with_polling(false));
        fetcher.fetch_data().await.unwrap();

        fail.store(true, Ordering::SeqCst);
        let err = fetcher.fetch_data().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));

        // Data survives; the error is recorded.
        assert_eq!(fetcher.data(), Some(1));
        assert!(fetcher.last_error().is_some());

        fail.store(false, Ordering::SeqCst);
        fetcher.fetch_data().await.unwrap();
        assert!(fetcher.last_error().is_none());
    }

    #[tokio::test]
    async fn invalidate_triggers_immediate_refetch() {
        let (fetcher, calls, _) = counting_fetcher(FetcherConfig::default().with_polling(false));
        fetcher.fetch_data().await.unwrap();
        fetcher.invalidate().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(fetcher.data(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn polling_refreshes_after_ttl() {
        let config = FetcherConfig::default()
            .with_ttl(Duration::from_secs(60))
            .with_time_to_retry(Duration::from_secs(5));
        let (fetcher, calls, _) = counting_fetcher(config);

        fetcher.start();
        // Initial fetch happens immediately.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Nothing new before the ttl elapses.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        fetcher.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn polling_retries_after_failure() {
        let config = FetcherConfig::default()
            .with_ttl(Duration::from_secs(600))
            .with_time_to_retry(Duration::from_secs(5));
        let (fetcher, calls, fail) = counting_fetcher(config);
        fail.store(true, Ordering::SeqCst);

        fetcher.start();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(fetcher.data().is_none());

        fail.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(fetcher.data().is_some());

        fetcher.stop();
    }

    #[tokio::test]
    async fn start_is_noop_when_polling_disabled() {
        let (fetcher, calls, _) = counting_fetcher(FetcherConfig::default().with_polling(false));
        fetcher.start();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
