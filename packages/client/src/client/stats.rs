//! Client statistics for telemetry and monitoring

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free per-client counters, updated on every terminal outcome.
#[derive(Debug, Default)]
pub struct ClientStats {
    pub total_requests: AtomicU64,
    pub succeeded_requests: AtomicU64,
    pub failed_requests: AtomicU64,
    pub canceled_requests: AtomicU64,
    pub timed_out_requests: AtomicU64,
    pub bytes_received: AtomicU64,
}

impl ClientStats {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a snapshot of current statistics.
    #[must_use]
    pub fn snapshot(&self) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            succeeded_requests: self.succeeded_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            canceled_requests: self.canceled_requests.load(Ordering::Relaxed),
            timed_out_requests: self.timed_out_requests.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_started(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self, bytes: u64) {
        self.succeeded_requests.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_canceled(&self) {
        self.canceled_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timeout(&self) {
        self.timed_out_requests.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`ClientStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ClientStatsSnapshot {
    pub total_requests: u64,
    pub succeeded_requests: u64,
    pub failed_requests: u64,
    pub canceled_requests: u64,
    pub timed_out_requests: u64,
    pub bytes_received: u64,
}
