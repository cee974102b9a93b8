//! Client configuration

use std::time::Duration;

use crate::redirect::Policy;

/// Read-buffer size used for response body pulls when unconfigured.
///
/// Deliberately small: it trades callback frequency for a low per-request
/// memory footprint. Callers expecting large responses should raise it.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 512;

/// Per-client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Overall request deadline. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// How long an elapsed deadline waits for the engine to acknowledge the
    /// cancellation before the timeout error is raised regardless.
    pub cancel_ack_timeout: Duration,
    /// Response read-buffer size in bytes.
    pub read_chunk_size: usize,
    /// Redirect-following policy.
    pub redirect: Policy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            cancel_ack_timeout: Duration::from_secs(1),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            redirect: Policy::all(),
        }
    }
}

impl ClientConfig {
    /// Validate the configuration before constructing a client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `request_timeout` is configured but zero
    /// - `cancel_ack_timeout` is zero
    /// - `read_chunk_size` is zero
    pub fn validate(&self) -> Result<(), String> {
        if let Some(timeout) = self.request_timeout {
            if timeout.is_zero() {
                return Err("request_timeout cannot be zero".to_string());
            }
        }

        if self.cancel_ack_timeout.is_zero() {
            return Err("cancel_ack_timeout cannot be zero".to_string());
        }

        if self.read_chunk_size == 0 {
            return Err("read_chunk_size cannot be zero".to_string());
        }

        Ok(())
    }
}
