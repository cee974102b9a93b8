//! Courier public API
//!
//! Fluent, order-preserving request construction over the `courier_client`
//! core. [`OrderedRequestFactory::builder`] starts a chain whose header
//! sequence survives verbatim into the dispatched request; the heavy
//! lifting — engine bridging, upload streaming, timeout racing — lives in
//! the client crate and is re-exported here.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod builder;

pub use builder::{OrderedRequestBuilder, OrderedRequestFactory};

// Re-export the client core surface so most callers need one dependency.
pub use courier_client::{
    Body, CancelToken, ClientConfig, ClientRegistry, ClientStats, ClientStatsSnapshot, DebugRecord,
    EngineStatus, Error, HeaderMultimap, HttpClient, HttpResponse, Kind, Method, OrderedRequest,
    Policy, Result, UploadStreamer, UrlEngine,
};
