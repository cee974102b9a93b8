use std::error::Error as StdError;
use std::fmt;

use crate::engine::EngineStatus;

/// A `Result` alias where the `Err` case is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The error type produced by request dispatch and lifecycle resolution.
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
    url: Option<url::Url>,
}

/// Classification of an [`Error`].
///
/// Exactly one variant applies to any error instance. `Transport` carries a
/// failure the engine reported asynchronously through the request lifecycle;
/// `Engine` carries a non-success result code from a synchronous engine
/// operation (start, open, shutdown).
#[derive(Debug, Clone)]
pub enum Kind {
    /// Transport or protocol failure reported by the engine mid-request.
    Transport(EngineStatus),
    /// Synchronous engine start/dispatch failure.
    Engine(EngineStatus),
    /// The configured deadline elapsed before the request resolved.
    Timeout,
    /// The request was canceled, cooperatively or by the engine.
    Canceled,
    /// Request construction failed validation.
    Builder,
    /// A caller-supplied argument was rejected before dispatch.
    InvalidArgument,
    /// The client was already closed when the call was made.
    Disposed,
    /// Redirect handling failed.
    Redirect,
    /// Request or response body I/O error.
    Body,
    /// Error decoding the response body.
    Decode,
}

impl Error {
    pub(crate) fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner {
                kind,
                source: None,
                url: None,
            }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub(crate) fn with<E: Into<BoxError>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub(crate) fn with_url(mut self, url: url::Url) -> Error {
        self.inner.url = Some(url);
        self
    }

    /// The classification of this error.
    pub fn kind(&self) -> &Kind {
        &self.inner.kind
    }

    /// The URL associated with this error, if any.
    #[must_use]
    pub fn url(&self) -> Option<&url::Url> {
        self.inner.url.as_ref()
    }

    /// The engine result code carried by `Transport` and `Engine` errors.
    #[must_use]
    pub fn engine_status(&self) -> Option<&EngineStatus> {
        match &self.inner.kind {
            Kind::Transport(status) | Kind::Engine(status) => Some(status),
            _ => None,
        }
    }

    /// True for transport/protocol failures the engine reported mid-request.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self.inner.kind, Kind::Transport(_))
    }

    /// True for synchronous engine start/dispatch failures.
    #[must_use]
    pub fn is_engine(&self) -> bool {
        matches!(self.inner.kind, Kind::Engine(_))
    }

    /// True when the configured deadline elapsed first.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.inner.kind, Kind::Timeout)
    }

    /// True for cooperative or engine-acknowledged cancellation.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self.inner.kind, Kind::Canceled)
    }

    /// True when request construction failed validation.
    #[must_use]
    pub fn is_builder(&self) -> bool {
        matches!(self.inner.kind, Kind::Builder)
    }

    /// True when the client had already been closed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        matches!(self.inner.kind, Kind::Disposed)
    }

    /// True when a caller-supplied argument was rejected before dispatch.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.inner.kind, Kind::InvalidArgument)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("courier::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        if let Some(ref url) = self.inner.url {
            f.field("url", url);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            Kind::Transport(status) => write!(f, "engine transport error ({status})")?,
            Kind::Engine(status) => write!(f, "engine dispatch error ({status})")?,
            Kind::Timeout => f.write_str("request timed out")?,
            Kind::Canceled => f.write_str("request canceled")?,
            Kind::Builder => f.write_str("builder error")?,
            Kind::InvalidArgument => f.write_str("invalid argument")?,
            Kind::Disposed => f.write_str("client already closed")?,
            Kind::Redirect => f.write_str("error handling redirect")?,
            Kind::Body => f.write_str("request or response body error")?,
            Kind::Decode => f.write_str("error decoding response body")?,
        }

        if let Some(ref url) = self.inner.url {
            write!(f, " for url ({url})")?;
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
