//! Request and response payload abstraction
//!
//! A [`Body`] is either an in-memory buffer or a readable stream with an
//! optionally known length. Bodies are immutable once constructed and are
//! consumed exactly once by whichever request owns them.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;

use crate::error;

/// A readable source backing the `Stream` variant of [`Body`].
///
/// `rewind_to_start` returns `Ok(true)` when the source repositioned to its
/// beginning, `Ok(false)` when it is not seekable; non-seekable sources are
/// simply read from their current position.
pub trait BodySource: Read + Send + Sync {
    fn rewind_to_start(&mut self) -> io::Result<bool> {
        Ok(false)
    }
}

impl BodySource for File {
    fn rewind_to_start(&mut self) -> io::Result<bool> {
        self.seek(SeekFrom::Start(0))?;
        Ok(true)
    }
}

impl<T: AsRef<[u8]> + Send + Sync> BodySource for io::Cursor<T> {
    fn rewind_to_start(&mut self) -> io::Result<bool> {
        self.set_position(0);
        Ok(true)
    }
}

/// A request or response payload.
pub struct Body {
    inner: Inner,
}

enum Inner {
    Bytes(Bytes),
    Stream {
        reader: Box<dyn BodySource>,
        length: Option<u64>,
    },
}

impl Body {
    /// An empty in-memory body.
    #[must_use]
    pub fn empty() -> Body {
        Body {
            inner: Inner::Bytes(Bytes::new()),
        }
    }

    /// A body over an owned byte buffer.
    pub fn from_bytes(buf: impl Into<Bytes>) -> Body {
        Body {
            inner: Inner::Bytes(buf.into()),
        }
    }

    /// A body over the UTF-8 encoding of `text`.
    pub fn from_text(text: impl Into<String>) -> Body {
        Body {
            inner: Inner::Bytes(Bytes::from(text.into().into_bytes())),
        }
    }

    /// A body over a readable stream of unknown length.
    pub fn from_stream(source: impl BodySource + 'static) -> Body {
        Body {
            inner: Inner::Stream {
                reader: Box::new(source),
                length: None,
            },
        }
    }

    /// A body over a readable stream whose total length is known up front.
    pub fn from_stream_with_length(source: impl BodySource + 'static, length: u64) -> Body {
        Body {
            inner: Inner::Stream {
                reader: Box::new(source),
                length: Some(length),
            },
        }
    }

    /// A body streaming a file opened read-only; the reported length is the
    /// file size at open time. The handle is released when the body drops,
    /// including when length lookup fails here.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Body> {
        let file = File::open(path.as_ref()).map_err(error::body)?;
        let length = file.metadata().map_err(error::body)?.len();
        Ok(Body {
            inner: Inner::Stream {
                reader: Box::new(file),
                length: Some(length),
            },
        })
    }

    /// The in-memory buffer, for buffered bodies only. Stream bodies return
    /// `None` — they are deliberately never buffered by this accessor.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.inner {
            Inner::Bytes(bytes) => Some(bytes),
            Inner::Stream { .. } => None,
        }
    }

    /// Total length in bytes, when known.
    #[must_use]
    pub fn length(&self) -> Option<u64> {
        match &self.inner {
            Inner::Bytes(bytes) => Some(bytes.len() as u64),
            Inner::Stream { length, .. } => *length,
        }
    }

    /// Reads the entire body into one buffer. Buffered bodies return their
    /// buffer directly; stream bodies are repositioned to the start when
    /// seekable and read to completion. This is the only operation that
    /// materializes a stream body.
    pub fn read_all(&mut self) -> crate::Result<Bytes> {
        match &mut self.inner {
            Inner::Bytes(bytes) => Ok(bytes.clone()),
            Inner::Stream { reader, length } => {
                reader.rewind_to_start().map_err(error::body)?;
                let mut buf = match length {
                    Some(len) => Vec::with_capacity(usize::try_from(*len).unwrap_or(0)),
                    None => Vec::new(),
                };
                reader.read_to_end(&mut buf).map_err(error::body)?;
                Ok(Bytes::from(buf))
            }
        }
    }

    /// Fill `buffer` from the body, for the upload cursor path. Buffered
    /// bodies copy from `offset` with strict bounds checks; stream bodies
    /// read sequentially from their current position (`offset` equals the
    /// stream position by the upload cursor invariant). Returns the byte
    /// count actually produced.
    pub(crate) fn read_chunk_at(
        &mut self,
        offset: u64,
        buffer: &mut [u8],
    ) -> std::result::Result<usize, String> {
        match &mut self.inner {
            Inner::Bytes(data) => {
                let start = usize::try_from(offset).map_err(|_| "read offset out of range".to_string())?;
                let end = start
                    .checked_add(buffer.len())
                    .ok_or_else(|| "read range out of range".to_string())?;
                if start > data.len() || end > data.len() {
                    return Err("read past end of body".to_string());
                }
                buffer.copy_from_slice(&data[start..end]);
                Ok(buffer.len())
            }
            Inner::Stream { reader, .. } => reader
                .read(buffer)
                .map_err(|e| format!("body read failed: {e}")),
        }
    }

    /// Deep-copies a buffered body. Stream bodies are not generally
    /// replayable and return `None`.
    #[must_use]
    pub fn try_clone(&self) -> Option<Body> {
        match &self.inner {
            Inner::Bytes(bytes) => Some(Body {
                inner: Inner::Bytes(bytes.clone()),
            }),
            Inner::Stream { .. } => None,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Bytes(bytes) => f
                .debug_tuple("Bytes")
                .field(&format!("{} bytes", bytes.len()))
                .finish(),
            Inner::Stream { length, .. } => f.debug_struct("Stream").field("length", length).finish(),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Body {
        Body::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(vec: Vec<u8>) -> Body {
        Body::from_bytes(vec)
    }
}

impl From<&'static [u8]> for Body {
    fn from(slice: &'static [u8]) -> Body {
        Body::from_bytes(Bytes::from_static(slice))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Body {
        Body::from_text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Body {
        Body::from_text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_body_reports_definite_length() {
        let body = Body::from_bytes(vec![1u8, 2, 3]);
        assert_eq!(body.length(), Some(3));
        assert_eq!(body.as_bytes(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn stream_body_hides_buffer() {
        let body = Body::from_stream(io::Cursor::new(vec![1u8, 2, 3]));
        assert_eq!(body.length(), None);
        assert!(body.as_bytes().is_none());
        assert!(body.try_clone().is_none());
    }
}
