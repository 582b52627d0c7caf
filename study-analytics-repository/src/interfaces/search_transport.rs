//! Search transport trait definition.
//!
//! This module defines the abstract interface to the search engine, allowing
//! different backend implementations (OpenSearch, in-memory for tests, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::aggregations::AggregationResults;
use crate::errors::AnalyticsError;
use crate::types::{
    AcknowledgedResponse, CreateIndexResponse, DeleteResult, IndexResponse, RawHit,
    SearchResponse, UpdateByQueryResponse,
};
use study_analytics_shared::{FieldAssignments, SearchQuery, Selector};

/// Abstracts the underlying search engine.
///
/// Implementations are injected into the lifecycle, document, update and
/// analytics components so one long-lived connection can serve all of them,
/// and so tests can substitute an in-memory engine.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// Lifecycle conflicts are reported as `AnalyticsError::ConflictError`.
/// Connectivity failures, timeouts and unexpected statuses are reported as
/// `AnalyticsError::TransportError`. Nothing is retried.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Create an index, optionally with settings and mappings.
    ///
    /// # Returns
    ///
    /// * `Ok(CreateIndexResponse)` - If the engine processed the request
    /// * `Err(AnalyticsError::ConflictError)` - If the index already exists
    async fn create_index(
        &self,
        index: &str,
        body: Option<Value>,
    ) -> Result<CreateIndexResponse, AnalyticsError>;

    /// Delete an index.
    ///
    /// # Returns
    ///
    /// * `Ok(AcknowledgedResponse)` - If the engine processed the request
    /// * `Err(AnalyticsError::ConflictError)` - If the index does not exist
    async fn delete_index(&self, index: &str) -> Result<AcknowledgedResponse, AnalyticsError>;

    /// Check whether an index exists.
    async fn exists_index(&self, index: &str) -> Result<bool, AnalyticsError>;

    /// Write a document, replacing any document with the same id.
    ///
    /// When `id` is `None` the engine assigns one.
    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        source: Value,
    ) -> Result<IndexResponse, AnalyticsError>;

    /// Fetch a single document by id.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - If no document has that id
    async fn get_document(&self, index: &str, id: &str) -> Result<Option<RawHit>, AnalyticsError>;

    /// Execute a query and return one page of hits.
    async fn search(
        &self,
        index: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse, AnalyticsError>;

    /// Delete a single document by id.
    ///
    /// A missing document is `Ok(DeleteResult::NotFound)`, not an error.
    async fn delete_document(&self, index: &str, id: &str)
        -> Result<DeleteResult, AnalyticsError>;

    /// Apply the field assignments to every document matching the selector.
    ///
    /// Assignment values must be bound as script parameters.
    async fn update_by_query(
        &self,
        index: &str,
        selector: &Selector,
        assignments: &FieldAssignments,
    ) -> Result<UpdateByQueryResponse, AnalyticsError>;

    /// Execute a query and return only its aggregation results.
    async fn run_aggregation_query(
        &self,
        index: &str,
        query: &SearchQuery,
    ) -> Result<AggregationResults, AnalyticsError>;
}
