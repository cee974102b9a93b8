//! Request-line setters: method, uri, version

use http::Method;

use super::core::OrderedRequestBuilder;

impl OrderedRequestBuilder {
    /// Set the request method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        if self.poisoned() {
            return self;
        }
        self.method = method;
        self
    }

    /// Set the request target URI.
    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        if self.poisoned() {
            return self;
        }
        if uri.is_empty() {
            self.record_error("uri must not be empty");
            return self;
        }
        self.uri = uri.to_string();
        self
    }

    /// Set the HTTP version string, e.g. `HTTP/1.1`.
    #[must_use]
    pub fn version(mut self, version: &str) -> Self {
        if self.poisoned() {
            return self;
        }
        if !version.starts_with("HTTP/") {
            self.record_error(format!("malformed HTTP version: {version:?}"));
            return self;
        }
        self.version = version.to_string();
        self
    }

    /// Shorthand for `method(Method::GET).uri(uri)`.
    #[must_use]
    pub fn get(self, uri: &str) -> Self {
        self.method(Method::GET).uri(uri)
    }

    /// Shorthand for `method(Method::POST).uri(uri)`.
    #[must_use]
    pub fn post(self, uri: &str) -> Self {
        self.method(Method::POST).uri(uri)
    }
}
