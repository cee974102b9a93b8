//! # Courier HTTP client core
//!
//! A high-level request/response API layered over a low-level asynchronous
//! URL-request engine. The engine — DNS, TLS, HTTP framing, pooling — is an
//! opaque collaborator behind the traits in [`engine`]; this crate owns the
//! request lifecycle around it:
//!
//! - [`body::Body`] — buffered or streamed payloads, immutable once built
//! - [`upload::UploadStreamer`] — pull-based outbound body adapter
//! - [`bridge::RequestLifecycleBridge`] — the callback-to-future bridge that
//!   turns engine push events into one awaited terminal outcome
//! - [`client::HttpClient`] — end-to-end orchestration with timeout racing,
//!   cooperative cancellation, and redirect policy
//! - [`interop`] — flat-data façade support for cross-language callers
//!
//! Request construction lives in the companion `courier` facade crate,
//! whose `OrderedRequestBuilder` produces the [`http::request::OrderedRequest`]
//! consumed here.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod body;
pub mod bridge;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod interop;
pub mod redirect;
pub mod upload;

pub mod prelude;

pub use crate::error::{Error, Result};
pub use crate::prelude::*;
