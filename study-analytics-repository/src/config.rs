//! Configuration types for the transport and the analytics components.

use std::str::FromStr;
use std::time::Duration;

use crate::errors::AnalyticsError;

/// Default OpenSearch URL.
pub const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the analytics components.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Maximum number of ids allowed in a single update-by-query selector.
    /// Set to None to disable the limit (not recommended for production).
    pub max_selector_ids: Option<usize>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            max_selector_ids: Some(1000),
        }
    }
}

impl AnalyticsConfig {
    /// Create a config with no selector size limit (use with caution).
    pub fn unlimited() -> Self {
        Self {
            max_selector_ids: None,
        }
    }

    /// Create a config with a custom selector size limit.
    pub fn with_max_selector_ids(max_selector_ids: usize) -> Self {
        Self {
            max_selector_ids: Some(max_selector_ids),
        }
    }
}

/// When writes become visible to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Visible after the engine's next periodic refresh.
    #[default]
    None,
    /// Force a refresh of the affected shards.
    Immediate,
    /// Wait for the next refresh before returning.
    WaitFor,
}

impl FromStr for RefreshPolicy {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "false" | "none" => Ok(Self::None),
            "true" | "immediate" => Ok(Self::Immediate),
            "wait_for" => Ok(Self::WaitFor),
            other => Err(AnalyticsError::validation(format!(
                "Unknown refresh policy: {}",
                other
            ))),
        }
    }
}

/// Basic-auth credentials for the engine.
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Connection settings for [`crate::OpenSearchTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub url: String,
    pub credentials: Option<BasicCredentials>,
    /// Applied to every request; a timeout surfaces as a transport error.
    pub request_timeout: Duration,
    pub refresh: RefreshPolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OPENSEARCH_URL.to_string(),
            credentials: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            refresh: RefreshPolicy::None,
        }
    }
}

impl TransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(BasicCredentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = refresh;
        self
    }
}
