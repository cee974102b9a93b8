//! Canonical public types, re-exported in one place.

pub use crate::body::{Body, BodySource};
pub use crate::bridge::{Outcome, RequestLifecycleBridge};
pub use crate::client::cancel::CancelToken;
pub use crate::client::core::HttpClient;
pub use crate::client::stats::{ClientStats, ClientStatsSnapshot};
pub use crate::config::{ClientConfig, DEFAULT_READ_CHUNK_SIZE};
pub use crate::engine::{
    EngineStatus, RequestCallbacks, RequestParameters, ResponseInfo, UploadDataProvider,
    UploadDataSink, UrlEngine, UrlRequest,
};
pub use crate::error::{Error, Kind, Result};
pub use crate::http::headers::HeaderMultimap;
pub use crate::http::request::{OrderedRequest, DEFAULT_HTTP_VERSION};
pub use crate::http::response::HttpResponse;
pub use crate::interop::{ClientRegistry, DebugRecord};
pub use crate::redirect::Policy;
pub use crate::upload::UploadStreamer;

pub use http::Method;
