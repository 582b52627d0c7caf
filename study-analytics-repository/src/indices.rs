//! Index lifecycle management.
//!
//! Creation and deletion are idempotent in intent: an index that already
//! exists (or is already gone) is a logged soft outcome, not an error.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::errors::AnalyticsError;
use crate::interfaces::SearchTransport;
use crate::types::IndexOutcome;

/// Creates, checks and deletes named indices.
///
/// Existence is always asked of the engine; nothing is cached. Operations
/// are not retried, so callers that get anything other than an acknowledged
/// outcome re-check with [`IndexManager::exists_index`].
pub struct IndexManager {
    transport: Arc<dyn SearchTransport>,
}

impl IndexManager {
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self { transport }
    }

    fn validate_name(index: &str) -> Result<(), AnalyticsError> {
        if index.trim().is_empty() {
            return Err(AnalyticsError::validation("index name is required"));
        }
        Ok(())
    }

    /// Create an index with engine defaults.
    pub async fn create_index(&self, index: &str) -> Result<IndexOutcome, AnalyticsError> {
        self.create_index_with(index, None).await
    }

    /// Create an index with the given settings and mappings.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexOutcome::Acknowledged)` - If the engine processed the request
    /// * `Ok(IndexOutcome::AlreadyExists)` - If the index was already there
    /// * `Err(AnalyticsError)` - If the engine could not be reached
    #[instrument(skip(self, body))]
    pub async fn create_index_with(
        &self,
        index: &str,
        body: Option<Value>,
    ) -> Result<IndexOutcome, AnalyticsError> {
        Self::validate_name(index)?;

        match self.transport.create_index(index, body).await {
            Ok(response) => {
                debug!(index = %response.index, acknowledged = response.acknowledged, "Index created");
                Ok(IndexOutcome::Acknowledged {
                    index: response.index,
                    acknowledged: response.acknowledged,
                })
            }
            Err(e) if e.is_conflict() => {
                warn!(index = %index, error = %e, "Index already exists, skipping creation");
                Ok(IndexOutcome::AlreadyExists)
            }
            Err(e) => {
                error!(index = %index, error = %e, "Failed to create index");
                Err(e)
            }
        }
    }

    /// Check whether an index exists.
    #[instrument(skip(self))]
    pub async fn exists_index(&self, index: &str) -> Result<bool, AnalyticsError> {
        Self::validate_name(index)?;

        self.transport.exists_index(index).await.map_err(|e| {
            error!(index = %index, error = %e, "Failed to check index existence");
            e
        })
    }

    /// Delete an index.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexOutcome::Acknowledged)` - If the engine processed the request
    /// * `Ok(IndexOutcome::NotFound)` - If there was no such index
    /// * `Err(AnalyticsError)` - If the engine could not be reached
    #[instrument(skip(self))]
    pub async fn delete_index(&self, index: &str) -> Result<IndexOutcome, AnalyticsError> {
        Self::validate_name(index)?;

        match self.transport.delete_index(index).await {
            Ok(response) => {
                debug!(index = %index, acknowledged = response.acknowledged, "Index deleted");
                Ok(IndexOutcome::Acknowledged {
                    index: index.to_string(),
                    acknowledged: response.acknowledged,
                })
            }
            Err(e) if e.is_conflict() => {
                warn!(index = %index, error = %e, "Index does not exist, skipping deletion");
                Ok(IndexOutcome::NotFound)
            }
            Err(e) => {
                error!(index = %index, error = %e, "Failed to delete index");
                Err(e)
            }
        }
    }

    /// Create the index if it does not exist yet.
    ///
    /// Returns `true` when this call created it. Losing a creation race to
    /// another caller counts as success.
    #[instrument(skip(self, body))]
    pub async fn ensure_index(
        &self,
        index: &str,
        body: Option<Value>,
    ) -> Result<bool, AnalyticsError> {
        if self.exists_index(index).await? {
            debug!(index = %index, "Index already present");
            return Ok(false);
        }

        match self.create_index_with(index, body).await? {
            IndexOutcome::Acknowledged { acknowledged, .. } => Ok(acknowledged),
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryTransport;

    fn manager() -> IndexManager {
        IndexManager::new(Arc::new(InMemoryTransport::new()))
    }

    #[tokio::test]
    async fn test_create_then_exists() {
        let indices = manager();

        let outcome = indices.create_index("sample-index").await.unwrap();

        assert!(outcome.is_acknowledged());
        assert_eq!(
            outcome,
            IndexOutcome::Acknowledged {
                index: "sample-index".to_string(),
                acknowledged: true
            }
        );
        assert!(indices.exists_index("sample-index").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_then_not_exists() {
        let indices = manager();
        indices.create_index("sample-index").await.unwrap();

        let outcome = indices.delete_index("sample-index").await.unwrap();

        assert!(outcome.is_acknowledged());
        assert!(!indices.exists_index("sample-index").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_existing_is_soft_outcome() {
        let indices = manager();
        indices.create_index("sample-index").await.unwrap();

        let outcome = indices.create_index("sample-index").await.unwrap();

        assert_eq!(outcome, IndexOutcome::AlreadyExists);
        assert!(!outcome.is_acknowledged());
    }

    #[tokio::test]
    async fn test_delete_missing_is_soft_outcome() {
        let indices = manager();

        let outcome = indices.delete_index("missing-index").await.unwrap();

        assert_eq!(outcome, IndexOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_ensure_index() {
        let indices = manager();

        assert!(indices.ensure_index("problem-records", None).await.unwrap());
        assert!(!indices.ensure_index("problem-records", None).await.unwrap());
        assert!(indices.exists_index("problem-records").await.unwrap());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let indices = IndexManager::new(Arc::new(InMemoryTransport::failing()));

        let result = indices.create_index("sample-index").await;
        assert!(matches!(result, Err(AnalyticsError::TransportError(_))));

        let result = indices.exists_index("sample-index").await;
        assert!(matches!(result, Err(AnalyticsError::TransportError(_))));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let indices = manager();

        let result = indices.create_index("  ").await;
        assert!(matches!(result, Err(AnalyticsError::ValidationError(_))));
    }
}
