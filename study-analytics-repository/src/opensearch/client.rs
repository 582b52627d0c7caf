//! OpenSearch transport implementation.
//!
//! This module provides the concrete implementation of `SearchTransport`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts},
    params::{Conflicts, Refresh},
    DeleteParts, GetParts, IndexParts, OpenSearch, SearchParts, UpdateByQueryParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::aggregations::AggregationResults;
use crate::config::{RefreshPolicy, TransportConfig};
use crate::errors::AnalyticsError;
use crate::interfaces::SearchTransport;
use crate::opensearch::queries::{build_search_body, build_update_by_query_body};
use crate::opensearch::responses::{
    classify_create_failure, classify_delete_document, classify_delete_index_failure,
    classify_exists_status, error_type, parse_acknowledged, parse_create_index,
    parse_get_response, parse_index_response, parse_search_response, parse_update_by_query,
    request_failure, INDEX_NOT_FOUND_ERROR,
};
use crate::types::{
    AcknowledgedResponse, CreateIndexResponse, DeleteResult, IndexResponse, RawHit,
    SearchResponse, UpdateByQueryResponse,
};
use study_analytics_shared::{FieldAssignments, SearchQuery, Selector};

/// OpenSearch transport.
///
/// Holds one HTTP connection pool shared by every component built on top of
/// it. Every request is bounded by the configured timeout.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use study_analytics_repository::{IndexManager, OpenSearchTransport, TransportConfig};
///
/// let config = TransportConfig::new("http://localhost:9200").with_credentials("admin", "admin");
/// let transport = Arc::new(OpenSearchTransport::new(&config)?);
///
/// let indices = IndexManager::new(transport.clone());
/// indices.ensure_index("sample-index", None).await?;
/// ```
pub struct OpenSearchTransport {
    client: OpenSearch,
    refresh: RefreshPolicy,
}

impl OpenSearchTransport {
    /// Create a new transport connected to the configured URL.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchTransport)` - A new transport instance
    /// * `Err(AnalyticsError)` - If the URL is invalid or connection setup fails
    pub fn new(config: &TransportConfig) -> Result<Self, AnalyticsError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| AnalyticsError::transport(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.request_timeout);

        if let Some(credentials) = &config.credentials {
            builder = builder.auth(Credentials::Basic(
                credentials.username.clone(),
                credentials.password.clone(),
            ));
        }

        let transport = builder
            .build()
            .map_err(|e| AnalyticsError::transport(e.to_string()))?;

        info!(
            url = %config.url,
            authenticated = config.credentials.is_some(),
            timeout_secs = config.request_timeout.as_secs(),
            refresh = ?config.refresh,
            "Created OpenSearch transport"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            refresh: config.refresh,
        })
    }

    fn refresh_param(&self) -> Option<Refresh> {
        match self.refresh {
            RefreshPolicy::None => None,
            RefreshPolicy::Immediate => Some(Refresh::True),
            RefreshPolicy::WaitFor => Some(Refresh::WaitFor),
        }
    }

    /// Read status and body. Non-JSON bodies are kept as a string value.
    async fn read_body(response: Response) -> Result<(u16, Value), AnalyticsError> {
        let status = response.status_code().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AnalyticsError::transport(e.to_string()))?;

        if text.is_empty() {
            return Ok((status, Value::Null));
        }
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok((status, body))
    }

    fn is_success(status: u16) -> bool {
        (200..300).contains(&status)
    }

    fn failure(operation: &str, index: &str, status: u16, body: &Value) -> AnalyticsError {
        Self::logged(operation, index, request_failure(operation, index, status, body))
    }

    fn logged(operation: &str, index: &str, e: AnalyticsError) -> AnalyticsError {
        error!(
            operation = operation,
            index = %index,
            error = %e,
            "OpenSearch request failed"
        );
        e
    }
}

#[async_trait]
impl SearchTransport for OpenSearchTransport {
    #[instrument(skip(self, body))]
    async fn create_index(
        &self,
        index: &str,
        body: Option<Value>,
    ) -> Result<CreateIndexResponse, AnalyticsError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body.unwrap_or_else(|| json!({})))
            .send()
            .await?;

        let (status, body) = Self::read_body(response).await?;
        if Self::is_success(status) {
            debug!(index = %index, "Index created");
            return Ok(parse_create_index(&body, index));
        }

        let e = classify_create_failure(index, status, &body);
        if e.is_conflict() {
            return Err(e);
        }
        Err(Self::logged("create_index", index, e))
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<AcknowledgedResponse, AnalyticsError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await?;

        let (status, body) = Self::read_body(response).await?;
        if Self::is_success(status) {
            debug!(index = %index, "Index deleted");
            return Ok(parse_acknowledged(&body));
        }

        let e = classify_delete_index_failure(index, status, &body);
        if e.is_conflict() {
            return Err(e);
        }
        Err(Self::logged("delete_index", index, e))
    }

    #[instrument(skip(self))]
    async fn exists_index(&self, index: &str) -> Result<bool, AnalyticsError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await?;

        classify_exists_status(index, response.status_code().as_u16())
            .map_err(|e| Self::logged("exists_index", index, e))
    }

    #[instrument(skip(self, source))]
    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        source: Value,
    ) -> Result<IndexResponse, AnalyticsError> {
        let parts = match id {
            Some(id) => IndexParts::IndexId(index, id),
            None => IndexParts::Index(index),
        };

        let mut request = self.client.index(parts).body(source);
        if let Some(refresh) = self.refresh_param() {
            request = request.refresh(refresh);
        }
        let response = request.send().await?;

        let (status, body) = Self::read_body(response).await?;
        if !Self::is_success(status) {
            return Err(Self::failure("index_document", index, status, &body));
        }

        let indexed = parse_index_response(&body)?;
        debug!(index = %index, doc_id = %indexed.id, result = ?indexed.result, "Document indexed");
        Ok(indexed)
    }

    #[instrument(skip(self))]
    async fn get_document(&self, index: &str, id: &str) -> Result<Option<RawHit>, AnalyticsError> {
        let response = self.client.get(GetParts::IndexId(index, id)).send().await?;

        let (status, body) = Self::read_body(response).await?;
        match status {
            200 => Ok(parse_get_response(&body)),
            404 => Ok(None),
            _ => Err(Self::failure("get_document", index, status, &body)),
        }
    }

    #[instrument(skip(self, query))]
    async fn search(
        &self,
        index: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse, AnalyticsError> {
        let request_body = build_search_body(query);
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(request_body)
            .send()
            .await?;

        let (status, body) = Self::read_body(response).await?;
        if !Self::is_success(status) {
            return Err(Self::failure("search", index, status, &body));
        }

        parse_search_response(&body)
    }

    #[instrument(skip(self))]
    async fn delete_document(
        &self,
        index: &str,
        id: &str,
    ) -> Result<DeleteResult, AnalyticsError> {
        let mut request = self.client.delete(DeleteParts::IndexId(index, id));
        if let Some(refresh) = self.refresh_param() {
            request = request.refresh(refresh);
        }
        let response = request.send().await?;

        let (status, body) = Self::read_body(response).await?;
        if status == 404 && error_type(&body) == Some(INDEX_NOT_FOUND_ERROR) {
            warn!(index = %index, doc_id = %id, "Delete targeted a missing index");
        }

        classify_delete_document(index, status, &body)
            .map_err(|e| Self::logged("delete_document", index, e))
    }

    #[instrument(skip(self, selector, assignments))]
    async fn update_by_query(
        &self,
        index: &str,
        selector: &Selector,
        assignments: &FieldAssignments,
    ) -> Result<UpdateByQueryResponse, AnalyticsError> {
        let request_body = build_update_by_query_body(selector, assignments);
        let response = self
            .client
            .update_by_query(UpdateByQueryParts::Index(&[index]))
            .conflicts(Conflicts::Proceed)
            .refresh(self.refresh != RefreshPolicy::None)
            .body(request_body)
            .send()
            .await?;

        let (status, body) = Self::read_body(response).await?;
        if !Self::is_success(status) {
            return Err(Self::failure("update_by_query", index, status, &body));
        }

        let updated = parse_update_by_query(&body);
        debug!(
            index = %index,
            matched = updated.total,
            updated = updated.updated,
            "Update by query completed"
        );
        Ok(updated)
    }

    #[instrument(skip(self, query))]
    async fn run_aggregation_query(
        &self,
        index: &str,
        query: &SearchQuery,
    ) -> Result<AggregationResults, AnalyticsError> {
        let request_body = build_search_body(query);
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(request_body)
            .send()
            .await?;

        let (status, body) = Self::read_body(response).await?;
        if !Self::is_success(status) {
            return Err(Self::failure("run_aggregation_query", index, status, &body));
        }

        AggregationResults::from_response(&body)
    }
}
