//! Core `OrderedRequestBuilder` structure and `build`

use std::fmt;

use http::Method;

use courier_client::error;
use courier_client::{Body, OrderedRequest};

/// Entry point for the fluent request-construction chain.
pub struct OrderedRequestFactory;

impl OrderedRequestFactory {
    /// Start building a request. Defaults: `GET`, uri `/`, `HTTP/1.1`.
    #[must_use]
    pub fn builder() -> OrderedRequestBuilder {
        OrderedRequestBuilder::new()
    }
}

/// Order-preserving fluent request builder.
///
/// Headers keep their exact submission sequence, duplicate names included.
/// The first validation failure is recorded and every later setter becomes a
/// no-op, so a chain can run to `build` without per-step checks; `build`
/// then reports the recorded error.
pub struct OrderedRequestBuilder {
    pub(crate) method: Method,
    pub(crate) uri: String,
    pub(crate) version: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<Body>,
    pub(crate) error: Option<String>,
}

impl OrderedRequestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            uri: "/".to_string(),
            version: courier_client::DEFAULT_HTTP_VERSION.to_string(),
            headers: Vec::new(),
            body: None,
            error: None,
        }
    }

    /// Whether a validation error has been recorded.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn poisoned(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn record_error(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            let message = message.into();
            tracing::debug!(target: "courier::builder", %message, "builder validation failed");
            self.error = Some(message);
        }
    }

    /// Finish the chain.
    ///
    /// # Errors
    ///
    /// Returns a builder error if any setter recorded a validation failure.
    pub fn build(self) -> courier_client::Result<OrderedRequest> {
        if let Some(message) = self.error {
            return Err(error::builder(message));
        }
        Ok(OrderedRequest::from_parts(
            self.method,
            self.uri,
            self.version,
            self.headers,
            self.body,
        ))
    }
}

impl Default for OrderedRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderedRequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedRequestBuilder")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("version", &self.version)
            .field("headers", &self.headers.len())
            .field("body", &self.body.is_some())
            .field("error", &self.error)
            .finish()
    }
}
