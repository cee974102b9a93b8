//! Materialized HTTP response

use http::StatusCode;

use crate::body::Body;
use crate::error;
use crate::http::headers::HeaderMultimap;

/// A fully received response. Immutable after construction.
///
/// `url` is the final URL — post-redirect when redirects were followed, the
/// original request URL when a redirect was blocked by policy and the 3xx
/// itself became the answer.
#[derive(Debug)]
pub struct HttpResponse {
    status_code: u16,
    status_text: String,
    headers: HeaderMultimap,
    url: String,
    body: Body,
    was_cached: bool,
    negotiated_protocol: String,
}

impl HttpResponse {
    pub(crate) fn new(
        status_code: u16,
        status_text: String,
        headers: HeaderMultimap,
        url: String,
        body: Body,
        was_cached: bool,
        negotiated_protocol: String,
    ) -> Self {
        Self {
            status_code,
            status_text,
            headers,
            url,
            body,
            was_cached,
            negotiated_protocol,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Typed status code when the engine reported a standard value.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status_code).ok()
    }

    #[must_use]
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMultimap {
        &self.headers
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn was_cached(&self) -> bool {
        self.was_cached
    }

    #[must_use]
    pub fn negotiated_protocol(&self) -> &str {
        &self.negotiated_protocol
    }

    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Consumes the response, yielding its body.
    #[must_use]
    pub fn into_body(self) -> Body {
        self.body
    }

    /// Response payload bytes. Responses are materialized on resolution, so
    /// this never blocks.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.body.as_bytes().unwrap_or(&[])
    }

    /// Body length in bytes.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.bytes().len()
    }

    /// Response body decoded as UTF-8, lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(self.bytes()).into_owned()
    }

    /// Deserialize the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        serde_json::from_slice(self.bytes()).map_err(error::decode)
    }

    /// First `content-type` header value, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    #[must_use]
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }
}
