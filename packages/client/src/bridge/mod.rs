//! Callback-to-future request lifecycle bridge
//!
//! [`RequestLifecycleBridge`] is the component that turns the engine's
//! push-callback model into one awaitable [`Outcome`]. It implements the six
//! [`RequestCallbacks`] hooks, drives the read loop, applies the redirect
//! policy, accumulates the downloaded body, and resolves a one-shot result
//! cell exactly once.
//!
//! Resolution uses try-set semantics: the first terminal event wins, every
//! later one is silently dropped. Engine callbacks may race with bridge
//! disposal, so the cell tolerates late writers without panicking. Faults
//! inside a handler (including a panicking redirect predicate) are caught at
//! the callback boundary and converted into a `Failed` resolution — nothing
//! unwinds into the engine's dispatch thread.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use bytes::BytesMut;
use tokio::sync::oneshot;
use url::Url;

use crate::body::Body;
use crate::engine::{EngineStatus, RequestCallbacks, ResponseInfo, UrlRequest};
use crate::error::{self, Error};
use crate::http::headers::HeaderMultimap;
use crate::http::response::HttpResponse;
use crate::redirect::Policy;

/// Terminal result of one request lifecycle. Exactly one is produced.
#[derive(Debug)]
pub enum Outcome {
    Success(HttpResponse),
    Canceled,
    Failed(Error),
}

/// Response metadata captured at `on_response_started` (or at a blocked
/// redirect, where the 3xx metadata is the final answer).
struct ResponseSnapshot {
    status_code: u16,
    status_text: String,
    url: String,
    headers: HeaderMultimap,
    was_cached: bool,
    negotiated_protocol: String,
}

impl ResponseSnapshot {
    fn capture(info: &ResponseInfo) -> Self {
        let mut headers = HeaderMultimap::new();
        for (name, value) in &info.headers {
            headers.append(name.clone(), value.clone());
        }
        Self {
            status_code: info.status_code,
            status_text: info.status_text.clone(),
            url: info.url.clone(),
            headers,
            was_cached: info.was_cached,
            negotiated_protocol: info.negotiated_protocol.clone(),
        }
    }

    fn into_response(self, body: Body) -> HttpResponse {
        HttpResponse::new(
            self.status_code,
            self.status_text,
            self.headers,
            self.url,
            body,
            self.was_cached,
            self.negotiated_protocol,
        )
    }
}

/// Adapts the engine's lifecycle callbacks into a single awaited result.
pub struct RequestLifecycleBridge {
    policy: Policy,
    chunk_size: usize,
    accumulated: Mutex<BytesMut>,
    snapshot: Mutex<Option<ResponseSnapshot>>,
    resolved: AtomicBool,
    tx: Mutex<Option<oneshot::Sender<Outcome>>>,
}

impl RequestLifecycleBridge {
    /// Creates a bridge and the receiver its terminal outcome arrives on.
    /// The receiver is awaited exactly once by the dispatching client.
    pub fn new(policy: Policy, chunk_size: usize) -> (std::sync::Arc<Self>, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let bridge = std::sync::Arc::new(Self {
            policy,
            chunk_size: chunk_size.max(1),
            accumulated: Mutex::new(BytesMut::new()),
            snapshot: Mutex::new(None),
            resolved: AtomicBool::new(false),
            tx: Mutex::new(Some(tx)),
        });
        (bridge, rx)
    }

    /// First writer wins; later attempts are dropped without effect.
    fn try_resolve(&self, outcome: Outcome) -> bool {
        if self.resolved.swap(true, Ordering::AcqRel) {
            tracing::debug!(target: "courier::bridge", "terminal event after resolution ignored");
            return false;
        }
        let sender = match self.tx.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match sender {
            // A dropped receiver means the waiter gave up (timeout path);
            // the outcome is discarded, which is fine — the waiter's error
            // is already authoritative.
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    fn fail(&self, err: Error) {
        self.try_resolve(Outcome::Failed(err));
    }

    fn issue_read(&self, request: &dyn UrlRequest) {
        // A fresh buffer per read keeps per-request memory at one chunk.
        request.read(vec![0u8; self.chunk_size]);
    }
}

impl RequestCallbacks for RequestLifecycleBridge {
    fn on_redirect_received(&self, request: &dyn UrlRequest, info: &ResponseInfo, new_url: &str) {
        if self.resolved.load(Ordering::Acquire) {
            return;
        }

        let target = match Url::parse(new_url) {
            Ok(url) => url,
            Err(e) => {
                // Cannot consult the policy on a malformed target, and
                // following it blindly is worse.
                self.fail(match Url::parse(&info.url) {
                    Ok(original) => error::redirect(e, original),
                    Err(_) => error::protocol_violation("redirect to unparseable URL"),
                });
                return;
            }
        };

        let follow = match catch_unwind(AssertUnwindSafe(|| self.policy.should_follow(&target))) {
            Ok(follow) => follow,
            Err(_) => {
                self.fail(error::redirect("redirect policy panicked", target));
                return;
            }
        };

        if follow {
            tracing::debug!(target: "courier::bridge", url = %target, "following redirect");
            request.follow_redirect();
        } else {
            // A blocked redirect is the final answer: resolve with the 3xx
            // itself, no body.
            tracing::debug!(target: "courier::bridge", url = %target, "redirect blocked by policy");
            let snapshot = ResponseSnapshot::capture(info);
            self.try_resolve(Outcome::Success(snapshot.into_response(Body::empty())));
        }
    }

    fn on_response_started(&self, request: &dyn UrlRequest, info: &ResponseInfo) {
        if self.resolved.load(Ordering::Acquire) {
            return;
        }

        match self.snapshot.lock() {
            Ok(mut slot) => *slot = Some(ResponseSnapshot::capture(info)),
            Err(_) => {
                self.fail(error::protocol_violation("response metadata lock poisoned"));
                return;
            }
        }

        // Kick off the read loop immediately; the engine will not push body
        // bytes without an outstanding read.
        self.issue_read(request);
    }

    fn on_read_completed(&self, request: &dyn UrlRequest, buffer: Vec<u8>, bytes_read: usize) {
        if self.resolved.load(Ordering::Acquire) {
            return;
        }

        if bytes_read > 0 {
            if bytes_read > buffer.len() {
                self.fail(error::protocol_violation(
                    "engine reported more bytes than the read buffer holds",
                ));
                return;
            }
            match self.accumulated.lock() {
                // Only the valid prefix; the buffer tail is stale.
                Ok(mut acc) => acc.extend_from_slice(&buffer[..bytes_read]),
                Err(_) => {
                    self.fail(error::protocol_violation("body accumulator lock poisoned"));
                    return;
                }
            }
        }
        // A zero-byte read is a continuation, not completion; the engine
        // alone decides when the terminal event fires.

        self.issue_read(request);
    }

    fn on_succeeded(&self, info: &ResponseInfo) {
        let snapshot = match self.snapshot.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        // Fall back to the terminal event's own metadata if the engine
        // skipped on_response_started (bodyless responses on some engines).
        let snapshot = snapshot.unwrap_or_else(|| ResponseSnapshot::capture(info));

        let body = match self.accumulated.lock() {
            Ok(mut acc) => std::mem::take(&mut *acc).freeze(),
            Err(_) => {
                self.fail(error::protocol_violation("body accumulator lock poisoned"));
                return;
            }
        };

        tracing::debug!(
            target: "courier::bridge",
            status = snapshot.status_code,
            bytes = body.len(),
            "request succeeded"
        );
        self.try_resolve(Outcome::Success(snapshot.into_response(Body::from_bytes(body))));
    }

    fn on_failed(&self, _info: Option<&ResponseInfo>, status: EngineStatus) {
        tracing::debug!(target: "courier::bridge", code = status.code, "request failed");
        self.fail(error::transport(status));
    }

    fn on_canceled(&self, _info: Option<&ResponseInfo>) {
        tracing::debug!(target: "courier::bridge", "request canceled");
        self.try_resolve(Outcome::Canceled);
    }
}
