use super::types::{BoxError, Error, Kind};
use crate::engine::EngineStatus;

/// Creates an `Error` from a transport failure the engine reported
/// asynchronously through the request lifecycle.
pub fn transport(status: EngineStatus) -> Error {
    Error::new(Kind::Transport(status))
}

/// Creates an `Error` from a non-success synchronous engine result.
pub fn engine(status: EngineStatus) -> Error {
    Error::new(Kind::Engine(status))
}

/// Creates an `Error` for an elapsed request deadline.
pub fn timeout() -> Error {
    Error::new(Kind::Timeout)
}

/// Creates an `Error` for a canceled request.
pub fn canceled() -> Error {
    Error::new(Kind::Canceled)
}

/// Creates an `Error` for a request-construction validation failure.
pub fn builder<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

/// Creates an `Error` for a rejected caller argument.
pub fn invalid_argument(message: &str) -> Error {
    Error::new(Kind::InvalidArgument).with(message.to_string())
}

/// Creates an `Error` for a call made on an already-closed client.
pub fn disposed() -> Error {
    Error::new(Kind::Disposed)
}

/// Creates an `Error` for a redirect-handling failure.
pub fn redirect<E: Into<BoxError>>(e: E, url: url::Url) -> Error {
    Error::new(Kind::Redirect).with(e.into()).with_url(url)
}

/// Creates an `Error` for a body I/O failure.
pub fn body<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Body).with(e.into())
}

/// Creates an `Error` for a response-decoding failure.
pub fn decode<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Decode).with(e.into())
}

/// Creates a transport-kind `Error` for an engine that violated the
/// lifecycle contract (no result code exists for these, so a synthetic
/// negative code carries the description).
pub fn protocol_violation(message: &str) -> Error {
    Error::new(Kind::Transport(EngineStatus {
        code: -1,
        message: message.to_string(),
    }))
}
