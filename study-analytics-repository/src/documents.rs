//! Single-document operations.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::errors::AnalyticsError;
use crate::interfaces::SearchTransport;
use crate::types::{DeleteResult, Hit, IndexResponse, SearchHits};
use study_analytics_shared::{IndexedDocument, SearchQuery};

/// Inserts, fetches, searches and deletes documents.
///
/// Every failure is logged with the index and document involved and returned
/// to the caller; nothing here panics on a remote failure.
pub struct DocumentStore {
    transport: Arc<dyn SearchTransport>,
}

impl DocumentStore {
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self { transport }
    }

    /// Write a document, overwriting any document with the same id.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexResponse)` - With `WriteResult::Created` or `WriteResult::Updated`;
    ///   callers that care about overwrites must check which one
    /// * `Err(AnalyticsError)` - If serialization or the request fails
    #[instrument(skip(self, document))]
    pub async fn insert<T>(&self, index: &str, document: &T) -> Result<IndexResponse, AnalyticsError>
    where
        T: Serialize + IndexedDocument + Sync,
    {
        let doc_id = document.document_id();
        let source = serde_json::to_value(document).map_err(|e| {
            error!(index = %index, doc_id = ?doc_id, error = %e, "Failed to serialize document");
            AnalyticsError::serialization(e.to_string())
        })?;

        match self
            .transport
            .index_document(index, doc_id.as_deref(), source)
            .await
        {
            Ok(response) => {
                debug!(index = %index, doc_id = %response.id, result = ?response.result, "Document written");
                Ok(response)
            }
            Err(e) => {
                error!(index = %index, doc_id = ?doc_id, error = %e, "Failed to write document");
                Err(e)
            }
        }
    }

    /// Fetch a document by id.
    #[instrument(skip(self))]
    pub async fn get<T>(&self, index: &str, id: &str) -> Result<Option<Hit<T>>, AnalyticsError>
    where
        T: DeserializeOwned,
    {
        let raw = self.transport.get_document(index, id).await.map_err(|e| {
            error!(index = %index, doc_id = %id, error = %e, "Failed to get document");
            e
        })?;

        raw.map(|hit| hit.decode()).transpose()
    }

    /// Search an index. `None` matches every document.
    ///
    /// Only one page is returned (10 hits unless the query sets a size);
    /// check `is_truncated()` before assuming completeness.
    #[instrument(skip(self, query))]
    pub async fn search<T>(
        &self,
        index: &str,
        query: Option<&SearchQuery>,
    ) -> Result<SearchHits<T>, AnalyticsError>
    where
        T: DeserializeOwned,
    {
        let match_all = SearchQuery::match_all();
        let query = query.unwrap_or(&match_all);

        let response = self.transport.search(index, query).await.map_err(|e| {
            error!(index = %index, query = ?query, error = %e, "Search failed");
            e
        })?;

        let hits = response
            .hits
            .into_iter()
            .map(|hit| hit.decode())
            .collect::<Result<Vec<_>, _>>()?;

        debug!(index = %index, total = response.total, returned = hits.len(), "Search completed");
        Ok(SearchHits {
            total: response.total,
            total_relation: response.total_relation,
            from: query.from().unwrap_or(0) as u64,
            hits,
        })
    }

    /// Delete a document by id.
    ///
    /// # Returns
    ///
    /// * `Ok(DeleteResult::Deleted)` - If the document was removed
    /// * `Ok(DeleteResult::NotFound)` - If there was no such document
    /// * `Err(AnalyticsError)` - If the request fails
    #[instrument(skip(self))]
    pub async fn delete(&self, index: &str, id: &str) -> Result<DeleteResult, AnalyticsError> {
        if id.is_empty() {
            return Err(AnalyticsError::validation("document id is required"));
        }

        match self.transport.delete_document(index, id).await {
            Ok(result) => {
                debug!(index = %index, doc_id = %id, result = ?result, "Document delete processed");
                Ok(result)
            }
            Err(e) => {
                error!(index = %index, doc_id = %id, error = %e, "Failed to delete document");
                Err(e)
            }
        }
    }
}
