//! The opaque URL-request engine boundary
//!
//! Everything network-shaped (DNS, TLS, HTTP framing, pooling) lives behind
//! these traits. The core never implements them against a real wire; it only
//! consumes them. An engine drives the six lifecycle callbacks on its own
//! internal threads, one event at a time per request, but potentially a
//! different thread per event — implementations of [`RequestCallbacks`] must
//! be callable from an arbitrary thread.

use std::sync::Arc;

use http::Method;

/// Result code carried by synchronous engine operations and asynchronous
/// failure callbacks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct EngineStatus {
    /// Engine-defined result code. Zero is never used for failures.
    pub code: i32,
    /// Human-readable description of the failure.
    pub message: String,
}

impl EngineStatus {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Engine-agnostic parameters for one request.
///
/// Headers are an ordered sequence; duplicate names are legal and must be
/// transmitted in the order given.
#[derive(Debug, Clone)]
pub struct RequestParameters {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
}

/// Response metadata as reported by the engine.
///
/// `headers` preserves wire arrival order, including duplicate names.
#[derive(Debug, Clone, Default)]
pub struct ResponseInfo {
    pub status_code: u16,
    pub status_text: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub was_cached: bool,
    pub negotiated_protocol: String,
}

/// The six lifecycle hooks an engine drives for one request.
///
/// Per-request event order is `[on_redirect_received]* →
/// [on_response_started] → [on_read_completed]* → exactly one of
/// {on_succeeded, on_failed, on_canceled}`. Implementations must tolerate
/// events arriving after they have produced their terminal result, and must
/// never unwind into the engine's dispatch thread.
pub trait RequestCallbacks: Send + Sync {
    /// The engine received a redirect. The implementation either calls
    /// `request.follow_redirect()` or treats the current response as final.
    fn on_redirect_received(&self, request: &dyn UrlRequest, info: &ResponseInfo, new_url: &str);

    /// Response headers are available. Reads must be issued from here on to
    /// keep the pipeline flowing.
    fn on_response_started(&self, request: &dyn UrlRequest, info: &ResponseInfo);

    /// A previously issued read finished. `bytes_read` counts the valid
    /// prefix of `buffer`; the rest of the buffer is stale.
    fn on_read_completed(&self, request: &dyn UrlRequest, buffer: Vec<u8>, bytes_read: usize);

    /// Terminal: the request completed successfully.
    fn on_succeeded(&self, info: &ResponseInfo);

    /// Terminal: the engine reported a failure.
    fn on_failed(&self, info: Option<&ResponseInfo>, status: EngineStatus);

    /// Terminal: a cancellation was acknowledged.
    fn on_canceled(&self, info: Option<&ResponseInfo>);
}

/// A live request held by the engine.
pub trait UrlRequest: Send + Sync {
    /// Begin executing the request. A non-success result means the request
    /// never started and no callbacks will fire.
    fn start(&self) -> std::result::Result<(), EngineStatus>;

    /// Follow the redirect announced by the last `on_redirect_received`.
    fn follow_redirect(&self);

    /// Issue an asynchronous read into `buffer`; the engine hands the buffer
    /// back through `on_read_completed`.
    fn read(&self, buffer: Vec<u8>);

    /// Request cancellation. Acknowledged asynchronously via `on_canceled`.
    fn cancel(&self);
}

/// Factory side of the engine.
pub trait UrlEngine: Send + Sync {
    /// Construct a request bound to `callbacks` and an optional outbound
    /// data source. The request does not run until `start` is called.
    fn open_request(
        &self,
        params: &RequestParameters,
        callbacks: Arc<dyn RequestCallbacks>,
        upload: Option<Arc<dyn UploadDataProvider>>,
    ) -> std::result::Result<Arc<dyn UrlRequest>, EngineStatus>;

    /// Graceful engine teardown.
    fn shutdown(&self) -> std::result::Result<(), EngineStatus>;
}

/// Receiver for the results of [`UploadDataProvider`] operations.
///
/// Exactly one method is invoked per `read`/`rewind` call, before or after
/// the provider call returns, at the engine's discretion.
pub trait UploadDataSink: Send + Sync {
    /// `read` produced `bytes_read` bytes. `final_chunk` marks the end of
    /// the body; a zero-byte final signal is the normal termination shape.
    fn on_read_succeeded(&self, bytes_read: usize, final_chunk: bool);

    /// `read` failed; the request will be aborted.
    fn on_read_error(&self, message: &str);

    /// `rewind` reset the body to its start.
    fn on_rewind_succeeded(&self);

    /// `rewind` is not possible for this body.
    fn on_rewind_error(&self, message: &str);
}

/// Pull-based outbound body source, invoked from engine-managed threads.
pub trait UploadDataProvider: Send + Sync {
    /// Total body length in bytes, or `-1` when unknown (chunked upload).
    fn length(&self) -> i64;

    /// Supply the next chunk into `buffer`, reporting through `sink`.
    fn read(&self, sink: &dyn UploadDataSink, buffer: &mut [u8]);

    /// Reset to the start of the body for a retried or replayed request.
    fn rewind(&self, sink: &dyn UploadDataSink);

    /// Release body resources. No further calls follow.
    fn close(&self);
}
