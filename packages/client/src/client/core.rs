//! Core HTTP client implementation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::Method;
use tokio::runtime;
use tokio::sync::oneshot;

use crate::body::Body;
use crate::bridge::{Outcome, RequestLifecycleBridge};
use crate::client::cancel::CancelToken;
use crate::client::stats::{ClientStats, ClientStatsSnapshot};
use crate::config::ClientConfig;
use crate::engine::{RequestCallbacks, RequestParameters, UploadDataProvider, UrlEngine};
use crate::error::{self, Result};
use crate::http::request::OrderedRequest;
use crate::http::response::HttpResponse;
use crate::upload::UploadStreamer;

/// What the deadline race produced first.
enum Waited {
    Outcome(Outcome),
    TimedOut,
    Closed,
}

/// An HTTP client bound to one engine and one single-worker executor.
///
/// One client serves one logical caller flow at a time; for real concurrency
/// instantiate independent clients. The blocking [`send`](Self::send) runs on
/// the client's own executor and must not be called from inside an async
/// context — the `*_async` variants exist for that.
pub struct HttpClient {
    engine: Arc<dyn UrlEngine>,
    config: ClientConfig,
    stats: Arc<ClientStats>,
    handle: runtime::Handle,
    runtime: Mutex<Option<runtime::Runtime>>,
    disposed: AtomicBool,
}

impl HttpClient {
    /// Create a client over `engine` with default configuration.
    pub fn new(engine: Arc<dyn UrlEngine>) -> Result<Self> {
        Self::with_config(engine, ClientConfig::default())
    }

    /// Create a client over `engine` with custom configuration.
    pub fn with_config(engine: Arc<dyn UrlEngine>, config: ClientConfig) -> Result<Self> {
        config.validate().map_err(error::builder)?;

        let rt = runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("courier-client")
            .enable_all()
            .build()
            .map_err(error::builder)?;
        let handle = rt.handle().clone();

        Ok(Self {
            engine,
            config,
            stats: Arc::new(ClientStats::new()),
            handle,
            runtime: Mutex::new(Some(rt)),
            disposed: AtomicBool::new(false),
        })
    }

    /// Current configuration.
    #[inline]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared statistics handle.
    #[inline]
    pub fn stats(&self) -> Arc<ClientStats> {
        self.stats.clone()
    }

    /// Point-in-time statistics copy.
    #[inline]
    pub fn stats_snapshot(&self) -> ClientStatsSnapshot {
        self.stats.snapshot()
    }

    /// Whether `close` has run.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_closed() {
            return Err(error::disposed());
        }
        Ok(())
    }

    /// Execute a request, blocking the calling thread until it resolves or
    /// the configured timeout elapses.
    pub fn send(
        &self,
        url: &str,
        method: Method,
        body: Option<Body>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse> {
        self.ensure_live()?;
        self.handle
            .block_on(self.dispatch(url, method, body, headers, None))
    }

    /// Non-blocking equivalent of [`send`](Self::send), with optional
    /// cooperative cancellation. A triggered token makes this stop waiting
    /// and return a cancellation error even before the engine acknowledges;
    /// the network operation may continue briefly in the background.
    pub async fn send_async(
        &self,
        url: &str,
        method: Method,
        body: Option<Body>,
        headers: &[(String, String)],
        cancel: Option<CancelToken>,
    ) -> Result<HttpResponse> {
        self.ensure_live()?;
        self.dispatch(url, method, body, headers, cancel).await
    }

    /// Execute a built [`OrderedRequest`], blocking until resolution.
    pub fn send_request(&self, mut request: OrderedRequest) -> Result<HttpResponse> {
        self.ensure_live()?;
        let body = request.take_body();
        let method = request.method().clone();
        self.handle
            .block_on(self.dispatch(request.uri(), method, body, request.headers(), None))
    }

    /// Non-blocking equivalent of [`send_request`](Self::send_request).
    pub async fn send_request_async(
        &self,
        mut request: OrderedRequest,
        cancel: Option<CancelToken>,
    ) -> Result<HttpResponse> {
        self.ensure_live()?;
        let body = request.take_body();
        let method = request.method().clone();
        self.dispatch(request.uri(), method, body, request.headers(), cancel)
            .await
    }

    /// `send` with method fixed to GET and no body.
    pub fn get(&self, url: &str) -> Result<HttpResponse> {
        self.send(url, Method::GET, None, &[])
    }

    /// `send` with method fixed to POST.
    pub fn post(&self, url: &str, body: Body) -> Result<HttpResponse> {
        self.send(url, Method::POST, Some(body), &[])
    }

    /// `send_async` with method fixed to GET and no body.
    pub async fn get_async(&self, url: &str) -> Result<HttpResponse> {
        self.send_async(url, Method::GET, None, &[], None).await
    }

    /// `send_async` with method fixed to POST.
    pub async fn post_async(&self, url: &str, body: Body) -> Result<HttpResponse> {
        self.send_async(url, Method::POST, Some(body), &[], None)
            .await
    }

    async fn dispatch(
        &self,
        url: &str,
        method: Method,
        body: Option<Body>,
        headers: &[(String, String)],
        cancel: Option<CancelToken>,
    ) -> Result<HttpResponse> {
        if url.is_empty() {
            return Err(error::invalid_argument("url must not be empty"));
        }

        self.stats.record_started();

        let params = RequestParameters {
            url: url.to_string(),
            method,
            headers: headers.to_vec(),
        };

        let upload = build_upload(body)?;

        let (bridge, mut rx) =
            RequestLifecycleBridge::new(self.config.redirect.clone(), self.config.read_chunk_size);
        let callbacks: Arc<dyn RequestCallbacks> = bridge;

        let request = self
            .engine
            .open_request(&params, callbacks, upload)
            .map_err(|status| {
                self.stats.record_failure();
                error::engine(status)
            })?;

        tracing::debug!(target: "courier::client", url = %params.url, method = %params.method, "starting request");

        // A non-success start means the request never ran; this is distinct
        // from failures the bridge reports asynchronously.
        if let Err(status) = request.start() {
            self.stats.record_failure();
            return Err(error::engine(status));
        }

        let deadline = self.config.request_timeout;
        let waited = match cancel {
            Some(token) => {
                tokio::select! {
                    waited = wait_with_deadline(deadline, &mut rx) => waited,
                    () = token.canceled() => {
                        request.cancel();
                        self.stats.record_canceled();
                        tracing::debug!(target: "courier::client", url = %params.url, "request canceled by token");
                        return Err(error::canceled());
                    }
                }
            }
            None => wait_with_deadline(deadline, &mut rx).await,
        };

        match waited {
            Waited::Outcome(Outcome::Success(response)) => {
                self.stats.record_success(response.content_length() as u64);
                Ok(response)
            }
            Waited::Outcome(Outcome::Canceled) => {
                self.stats.record_canceled();
                Err(error::canceled())
            }
            Waited::Outcome(Outcome::Failed(e)) => {
                self.stats.record_failure();
                Err(e)
            }
            Waited::TimedOut => {
                request.cancel();
                // Bounded wait for the engine to acknowledge; once the
                // deadline has passed the timeout error is authoritative
                // whether or not the acknowledgement lands in time.
                let _ = tokio::time::timeout(self.config.cancel_ack_timeout, &mut rx).await;
                self.stats.record_timeout();
                tracing::debug!(target: "courier::client", url = %params.url, "request timed out");
                Err(error::timeout())
            }
            Waited::Closed => {
                self.stats.record_failure();
                Err(error::protocol_violation(
                    "request dropped without a terminal outcome",
                ))
            }
        }
    }

    /// Tear the client down. The engine is asked to shut down gracefully;
    /// whether or not that succeeds, the owned executor is released and the
    /// client is marked disposed, so later calls fail fast instead of
    /// misbehaving.
    pub fn close(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let shutdown = self.engine.shutdown();

        if let Ok(mut slot) = self.runtime.lock() {
            if let Some(rt) = slot.take() {
                rt.shutdown_background();
            }
        }

        shutdown.map_err(|status| {
            tracing::warn!(target: "courier::client", code = status.code, "engine shutdown failed; engine force-disposed");
            error::engine(status)
        })
    }
}

impl Drop for HttpClient {
    fn drop(&mut self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            let _ = self.engine.shutdown();
        }
        if let Ok(mut slot) = self.runtime.lock() {
            if let Some(rt) = slot.take() {
                rt.shutdown_background();
            }
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("disposed", &self.is_closed())
            .finish()
    }
}

/// Attach an upload source when the body warrants one: buffered bodies with
/// a known positive length. Zero-length bodies dispatch without an upload;
/// unknown-length streams are rejected here rather than silently dropped.
fn build_upload(body: Option<Body>) -> Result<Option<Arc<dyn UploadDataProvider>>> {
    let Some(body) = body else {
        return Ok(None);
    };
    match body.length() {
        None => Err(error::invalid_argument(
            "request bodies must have a known length",
        )),
        Some(0) => Ok(None),
        Some(_) => {
            let provider: Arc<dyn UploadDataProvider> = match body.try_clone() {
                // A replayable snapshot enables rewind for engines that
                // retry or replay the body across redirects.
                Some(snapshot) => Arc::new(UploadStreamer::with_rewind(body, move || {
                    snapshot.try_clone().unwrap_or_else(Body::empty)
                })),
                None => Arc::new(UploadStreamer::new(body)),
            };
            Ok(Some(provider))
        }
    }
}

async fn wait_with_deadline(
    deadline: Option<Duration>,
    rx: &mut oneshot::Receiver<Outcome>,
) -> Waited {
    match deadline {
        Some(limit) => match tokio::time::timeout(limit, &mut *rx).await {
            Ok(Ok(outcome)) => Waited::Outcome(outcome),
            Ok(Err(_)) => Waited::Closed,
            Err(_) => Waited::TimedOut,
        },
        None => match (&mut *rx).await {
            Ok(outcome) => Waited::Outcome(outcome),
            Err(_) => Waited::Closed,
        },
    }
}
