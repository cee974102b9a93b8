//! Pull-based outbound body adapter
//!
//! [`UploadStreamer`] exposes one [`Body`] through the engine's
//! [`UploadDataProvider`] pull contract. The engine calls `read`/`rewind`
//! from its own threads, so the cursor state is atomic and the body sits
//! behind a mutex.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::body::Body;
use crate::engine::{UploadDataProvider, UploadDataSink};

type RewindFactory = Box<dyn Fn() -> Body + Send + Sync>;

/// Adapts a [`Body`] to the engine's pull-based upload interface.
///
/// `bytes_sent` only moves forward between rewinds and never exceeds the
/// total length. Finality is discovered lazily: every nonzero chunk is
/// reported with the final flag clear, and the engine learns the body is
/// done from the next pull returning zero bytes with the flag set.
pub struct UploadStreamer {
    body: Mutex<Body>,
    total: Option<u64>,
    bytes_sent: AtomicU64,
    completed: AtomicBool,
    rewind_factory: Option<RewindFactory>,
}

impl UploadStreamer {
    /// Wrap `body` without rewind support.
    #[must_use]
    pub fn new(body: Body) -> Self {
        let total = body.length();
        Self {
            body: Mutex::new(body),
            total,
            bytes_sent: AtomicU64::new(0),
            completed: AtomicBool::new(false),
            rewind_factory: None,
        }
    }

    /// Wrap `body`, re-acquiring a fresh snapshot from `factory` on rewind.
    #[must_use]
    pub fn with_rewind(body: Body, factory: impl Fn() -> Body + Send + Sync + 'static) -> Self {
        let mut streamer = Self::new(body);
        streamer.rewind_factory = Some(Box::new(factory));
        streamer
    }

    /// Bytes supplied so far since the last rewind.
    #[must_use]
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Acquire)
    }

    /// Whether the zero-bytes-final signal has been issued.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    fn finish(&self, sink: &dyn UploadDataSink) {
        self.completed.store(true, Ordering::Release);
        sink.on_read_succeeded(0, true);
    }
}

impl UploadDataProvider for UploadStreamer {
    fn length(&self) -> i64 {
        match self.total {
            Some(len) => i64::try_from(len).unwrap_or(i64::MAX),
            None => -1,
        }
    }

    fn read(&self, sink: &dyn UploadDataSink, buffer: &mut [u8]) {
        // Duplicate pulls after the final signal re-report zero-final; the
        // cursor never moves again.
        if self.completed.load(Ordering::Acquire) {
            sink.on_read_succeeded(0, true);
            return;
        }

        let sent = self.bytes_sent.load(Ordering::Acquire);
        let to_copy = match self.total {
            Some(0) => {
                self.finish(sink);
                return;
            }
            Some(total) if sent >= total => {
                self.finish(sink);
                return;
            }
            Some(total) => {
                let remaining = total - sent;
                let to_copy = remaining.min(buffer.len() as u64) as usize;
                if to_copy == 0 {
                    self.finish(sink);
                    return;
                }
                to_copy
            }
            // Unknown total length: read until the stream runs dry.
            None => buffer.len(),
        };

        if to_copy == 0 {
            self.finish(sink);
            return;
        }

        let mut body = match self.body.lock() {
            Ok(guard) => guard,
            Err(_) => {
                sink.on_read_error("upload body lock poisoned");
                return;
            }
        };

        let copied = match body.read_chunk_at(sent, &mut buffer[..to_copy]) {
            Ok(n) => n,
            Err(message) => {
                sink.on_read_error(&message);
                return;
            }
        };
        drop(body);

        if copied == 0 {
            if self.total.is_some() {
                // Declared length promised more bytes than the stream held.
                sink.on_read_error("upload body ended before its declared length");
            } else {
                self.finish(sink);
            }
            return;
        }

        self.bytes_sent.store(sent + copied as u64, Ordering::Release);
        sink.on_read_succeeded(copied, false);
    }

    fn rewind(&self, sink: &dyn UploadDataSink) {
        let Some(factory) = &self.rewind_factory else {
            sink.on_rewind_error("rewinding is not supported");
            return;
        };
        match self.body.lock() {
            Ok(mut body) => {
                *body = factory();
                self.bytes_sent.store(0, Ordering::Release);
                self.completed.store(false, Ordering::Release);
                sink.on_rewind_succeeded();
            }
            Err(_) => sink.on_rewind_error("upload body lock poisoned"),
        }
    }

    fn close(&self) {
        // The streamer owns the body snapshot; replacing it releases any
        // held resources (open file handles in particular).
        if let Ok(mut body) = self.body.lock() {
            *body = Body::empty();
        }
    }
}
