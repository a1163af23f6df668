//! Client configuration: credentials plus endpoint settings.

use std::time::Duration;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.influitive.com";

/// Value sent as `q[status]` alongside a field filter unless disabled.
pub const DEFAULT_STATUS_SCOPE: &str = "all";

/// Per-request timeout used when none is configured explicitly.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials and endpoint settings for one Influitive organization.
///
/// Built once and never mutated; the `with_*` methods consume the value and
/// return a modified copy.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    token: String,
    org_id: String,
    base_url: String,
    status_scope: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>, org_id: impl Into<String>, base_url: &str) -> Self {
        Self {
            token: token.into(),
            org_id: org_id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            status_scope: Some(DEFAULT_STATUS_SCOPE.to_string()),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Config pointing at the production API.
    pub fn production(token: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self::new(token, org_id, DEFAULT_BASE_URL)
    }

    pub fn with_status_scope(mut self, scope: impl Into<String>) -> Self {
        self.status_scope = Some(scope.into());
        self
    }

    /// Stop sending `q[status]` with filtered listings.
    pub fn without_status_scope(mut self) -> Self {
        self.status_scope = None;
        self
    }

    /// `None` waits on the server indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn status_scope(&self) -> Option<&str> {
        self.status_scope.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("org_id", &self.org_id)
            .field("base_url", &self.base_url)
            .field("status_scope", &self.status_scope)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::production("tok", "7");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.status_scope(), Some("all"));
        assert_eq!(config.timeout(), Some(DEFAULT_TIMEOUT));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("tok", "7", "http://localhost:3000/");
        assert_eq!(config.base_url(), "http://localhost:3000");
    }

    #[test]
    fn builders_return_modified_copy() {
        let config = ClientConfig::production("tok", "7")
            .without_status_scope()
            .with_timeout(None);
        assert_eq!(config.status_scope(), None);
        assert_eq!(config.timeout(), None);

        let config = config.with_status_scope("active");
        assert_eq!(config.status_scope(), Some("active"));
    }

    #[test]
    fn debug_output_hides_token() {
        let shown = format!("{:?}", ClientConfig::production("very-secret", "7"));
        assert!(!shown.contains("very-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
