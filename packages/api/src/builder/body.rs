//! Body attachment

use bytes::Bytes;

use courier_client::Body;

use super::core::OrderedRequestBuilder;

impl OrderedRequestBuilder {
    /// Attach an already-constructed body.
    #[must_use]
    pub fn body(mut self, body: Body) -> Self {
        if self.poisoned() {
            return self;
        }
        self.body = Some(body);
        self
    }

    /// Attach a UTF-8 text body.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        if self.poisoned() {
            return self;
        }
        let body = Body::from_text(text);
        self.body(body)
    }

    /// Attach a raw byte body.
    #[must_use]
    pub fn bytes(self, bytes: impl Into<Bytes>) -> Self {
        if self.poisoned() {
            return self;
        }
        let body = Body::from_bytes(bytes);
        self.body(body)
    }
}
