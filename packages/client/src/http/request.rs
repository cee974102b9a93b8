//! Immutable request representation with verbatim header ordering

use http::Method;

use crate::body::Body;
use crate::engine::RequestParameters;

/// Version string applied when a builder leaves it unset.
pub const DEFAULT_HTTP_VERSION: &str = "HTTP/1.1";

/// An assembled request.
///
/// The header sequence is exactly what the builder received: duplicates by
/// name are permitted and keep their insertion positions — `A, B, A` stays
/// `A, B, A`, never coalesced or reordered. This is what distinguishes it
/// from a map-backed request type.
#[derive(Debug)]
pub struct OrderedRequest {
    method: Method,
    uri: String,
    version: String,
    headers: Vec<(String, String)>,
    body: Option<Body>,
}

impl OrderedRequest {
    /// Assemble a request from already-validated parts. The fluent builder
    /// in the api package is the validated path to this constructor.
    #[must_use]
    pub fn from_parts(
        method: Method,
        uri: String,
        version: String,
        headers: Vec<(String, String)>,
        body: Option<Body>,
    ) -> Self {
        Self {
            method,
            uri,
            version,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The ordered header sequence, duplicates and all.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Detach the body for dispatch; it is consumed once per request.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    /// Engine-native parameters for this request.
    #[must_use]
    pub fn to_parameters(&self) -> RequestParameters {
        RequestParameters {
            url: self.uri.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
        }
    }
}
