//! Header setters
//!
//! Insertion order is preserved verbatim, including exact duplicate-name
//! sequences: submitting `A, B, A` yields `A, B, A`, never coalesced to
//! `A, A, B` or merged into one value.

use super::core::OrderedRequestBuilder;

impl OrderedRequestBuilder {
    /// Append one header pair at the end of the current sequence.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.poisoned() {
            return self;
        }
        if name.is_empty() {
            self.record_error("header name must not be empty");
            return self;
        }
        if has_ctl(name) || has_ctl(value) {
            self.record_error(format!("header {name:?} contains control characters"));
            return self;
        }
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Append several header pairs, in iteration order.
    #[must_use]
    pub fn headers<I, N, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in pairs {
            self = self.header(name.as_ref(), value.as_ref());
        }
        self
    }
}

/// CR, LF, and NUL are rejected outright: they would split the header block
/// on the wire.
fn has_ctl(text: &str) -> bool {
    text.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0)
}
