//! Redirect handling
//!
//! A [`Policy`] decides, per redirect target, whether the client follows it
//! automatically. The default follows every redirect; it is always an
//! explicit configuration value on the client, never global state. When a
//! policy declines, the 3xx response itself is what the caller receives.

use std::fmt;
use std::sync::Arc;

use url::Url;

/// A predicate over redirect target URLs.
#[derive(Clone)]
pub struct Policy {
    inner: PolicyKind,
}

#[derive(Clone)]
enum PolicyKind {
    All,
    None,
    Custom(Arc<dyn Fn(&Url) -> bool + Send + Sync>),
}

impl Policy {
    /// Follow every redirect. This is the default.
    #[must_use]
    pub fn all() -> Self {
        Self {
            inner: PolicyKind::All,
        }
    }

    /// Never follow a redirect; 3xx responses are returned as-is.
    #[must_use]
    pub fn none() -> Self {
        Self {
            inner: PolicyKind::None,
        }
    }

    /// Decide per target URL.
    pub fn custom(predicate: impl Fn(&Url) -> bool + Send + Sync + 'static) -> Self {
        Self {
            inner: PolicyKind::Custom(Arc::new(predicate)),
        }
    }

    /// Whether `url` should be followed automatically.
    #[must_use]
    pub fn should_follow(&self, url: &Url) -> bool {
        match &self.inner {
            PolicyKind::All => true,
            PolicyKind::None => false,
            PolicyKind::Custom(predicate) => predicate(url),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            PolicyKind::All => f.write_str("Policy::All"),
            PolicyKind::None => f.write_str("Policy::None"),
            PolicyKind::Custom(_) => f.write_str("Policy::Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_policy_sees_target_host() {
        let policy = Policy::custom(|url| url.host_str() == Some("trusted.example"));

        let next = Url::parse("http://trusted.example/next").expect("test URL should parse");
        assert!(policy.should_follow(&next));

        let next = Url::parse("http://other.example/next").expect("test URL should parse");
        assert!(!policy.should_follow(&next));
    }
}
