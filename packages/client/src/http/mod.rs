//! HTTP request and response data model
//!
//! Order-preserving header storage, the immutable [`OrderedRequest`] a
//! builder produces, and the fully materialized [`HttpResponse`] a resolved
//! request yields.

pub mod headers;
pub mod request;
pub mod response;

pub use headers::HeaderMultimap;
pub use request::{OrderedRequest, DEFAULT_HTTP_VERSION};
pub use response::HttpResponse;
