//! Dependency initialization and wiring for the analytics service.

use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::ServiceError;
use study_analytics_repository::config::{DEFAULT_OPENSEARCH_URL, DEFAULT_REQUEST_TIMEOUT};
use study_analytics_repository::{
    AnalyticsConfig, BulkUpdater, DocumentStore, IndexManager, OpenSearchTransport,
    ProblemAnalytics, RefreshPolicy, SearchTransport, TransportConfig,
};

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Plain,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT`; anything other than `json` is plain.
    pub fn from_env() -> Self {
        Self::parse(env::var("LOG_FORMAT").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Plain,
        }
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub indices: IndexManager,
    pub documents: DocumentStore,
    pub bulk_updater: BulkUpdater,
    pub analytics: ProblemAnalytics,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: basic auth, both or neither
    /// - `OPENSEARCH_TIMEOUT_SECS`: per-request timeout (default: 30)
    /// - `ANALYTICS_REFRESH`: `true`, `false` or `wait_for` (default: false)
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ServiceError)` - If a variable is malformed or the client cannot be built
    pub fn from_env() -> Result<Self, ServiceError> {
        let config = transport_config(|key| env::var(key).ok())?;

        info!(
            opensearch_url = %config.url,
            timeout_secs = config.request_timeout.as_secs(),
            refresh = ?config.refresh,
            authenticated = config.credentials.is_some(),
            "Initializing dependencies"
        );

        let transport = OpenSearchTransport::new(&config).map_err(|e| {
            ServiceError::config(format!("Failed to create OpenSearch client: {}", e))
        })?;

        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Wire every component onto one shared transport.
    pub fn with_transport(transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            indices: IndexManager::new(transport.clone()),
            documents: DocumentStore::new(transport.clone()),
            bulk_updater: BulkUpdater::with_config(transport.clone(), AnalyticsConfig::default()),
            analytics: ProblemAnalytics::new(transport),
        }
    }
}

/// Build the transport configuration from a variable lookup.
fn transport_config<F>(lookup: F) -> Result<TransportConfig, ServiceError>
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());

    let timeout = match lookup("OPENSEARCH_TIMEOUT_SECS") {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ServiceError::config(format!("Invalid OPENSEARCH_TIMEOUT_SECS: {}", raw)))?,
        None => DEFAULT_REQUEST_TIMEOUT,
    };

    let refresh = match lookup("ANALYTICS_REFRESH") {
        Some(raw) => raw
            .parse::<RefreshPolicy>()
            .map_err(|e| ServiceError::config(format!("Invalid ANALYTICS_REFRESH: {}", e)))?,
        None => RefreshPolicy::default(),
    };

    let mut config = TransportConfig::new(url)
        .with_timeout(timeout)
        .with_refresh(refresh);

    match (lookup("OPENSEARCH_USERNAME"), lookup("OPENSEARCH_PASSWORD")) {
        (Some(username), Some(password)) => {
            config = config.with_credentials(username, password);
        }
        (None, None) => {}
        _ => {
            return Err(ServiceError::config(
                "OPENSEARCH_USERNAME and OPENSEARCH_PASSWORD must be set together",
            ))
        }
    }

    Ok(config)
}
