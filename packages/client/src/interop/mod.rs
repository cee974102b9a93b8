//! Cross-language façade support
//!
//! Marshaling layers cannot hold Rust objects, so clients are parked in a
//! [`ClientRegistry`] and addressed by opaque integer handles — an explicit
//! arena with create/lookup/release, nothing runtime-magical. [`perform`]
//! is the flat-data entry such a façade calls: text in (optionally base64),
//! one serializable [`DebugRecord`] out, with the request echoed back
//! alongside the response for cross-language inspection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use dashmap::DashMap;
use http::Method;
use serde::Serialize;

use crate::body::Body;
use crate::client::core::HttpClient;
use crate::error::{self, Result};

/// Soft ceiling on live registered clients. Each client owns native-grade
/// resources (an engine, an executor thread), so unbounded growth is a leak
/// in waiting; crossing the cap logs a warning but does not fail.
pub const SOFT_CLIENT_CAP: usize = 50;

/// Arena mapping opaque `u64` handles to owned clients.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: DashMap<u64, Arc<HttpClient>>,
    next_handle: AtomicU64,
}

impl ClientRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a client, returning its handle. Handles are never reused.
    pub fn register(&self, client: Arc<HttpClient>) -> u64 {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed) + 1;
        self.clients.insert(handle, client);
        let live = self.clients.len();
        if live > SOFT_CLIENT_CAP {
            tracing::warn!(
                target: "courier::interop",
                live,
                cap = SOFT_CLIENT_CAP,
                "live client count exceeds the soft cap"
            );
        }
        handle
    }

    /// Look up a parked client.
    #[must_use]
    pub fn get(&self, handle: u64) -> Option<Arc<HttpClient>> {
        self.clients.get(&handle).map(|entry| Arc::clone(entry.value()))
    }

    /// Drop a handle's ownership of its client. Returns whether the handle
    /// was live.
    pub fn release(&self, handle: u64) -> bool {
        self.clients.remove(&handle).is_some()
    }

    /// Number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Flat request/response record for cross-language inspection.
#[derive(Debug, Clone, Serialize)]
pub struct DebugRecord {
    pub url: String,
    pub method: String,
    pub request_headers: Vec<(String, String)>,
    pub request_body_base64: String,
    pub status_code: u16,
    pub status_text: String,
    pub final_url: String,
    pub was_cached: bool,
    pub negotiated_protocol: String,
    pub response_headers: Vec<(String, String)>,
    pub response_body_base64: String,
}

/// Execute one request from flat façade inputs.
///
/// `headers` is a newline-separated `Name: value` block; `body` is optional
/// text. The two flags mark either input as base64-encoded — decoding
/// happens here, so the core only ever sees plain bytes and text.
pub fn perform(
    client: &HttpClient,
    url: &str,
    method: &str,
    headers: &str,
    body: Option<&str>,
    headers_are_base64: bool,
    body_is_base64: bool,
) -> Result<DebugRecord> {
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| error::invalid_argument("unrecognized HTTP method"))?;

    let header_text = if headers_are_base64 {
        decode_base64_text(headers)?
    } else {
        headers.to_string()
    };
    let header_pairs = parse_header_block(&header_text)?;

    let body_bytes = match body {
        None => None,
        Some(text) if body_is_base64 => Some(
            BASE64
                .decode(text.trim())
                .map_err(|_| error::invalid_argument("body is not valid base64"))?,
        ),
        Some(text) => Some(text.as_bytes().to_vec()),
    };

    let response = client.send(
        url,
        method.clone(),
        body_bytes.clone().map(Body::from),
        &header_pairs,
    )?;

    Ok(DebugRecord {
        url: url.to_string(),
        method: method.to_string(),
        request_headers: header_pairs,
        request_body_base64: BASE64.encode(body_bytes.unwrap_or_default()),
        status_code: response.status_code(),
        status_text: response.status_text().to_string(),
        final_url: response.url().to_string(),
        was_cached: response.was_cached(),
        negotiated_protocol: response.negotiated_protocol().to_string(),
        response_headers: response.headers().to_pairs(),
        response_body_base64: BASE64.encode(response.bytes()),
    })
}

fn decode_base64_text(input: &str) -> Result<String> {
    let bytes = BASE64
        .decode(input.trim())
        .map_err(|_| error::invalid_argument("headers are not valid base64"))?;
    String::from_utf8(bytes).map_err(|_| error::invalid_argument("headers are not valid UTF-8"))
}

/// Parse `Name: value` lines, preserving order and duplicates. Blank lines
/// are skipped; a line without a colon is rejected.
fn parse_header_block(text: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(error::invalid_argument("header line is missing a colon"));
        };
        pairs.push((name.trim().to_string(), value.trim().to_string()));
    }
    Ok(pairs)
}
