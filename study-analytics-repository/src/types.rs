//! Request and response types for index, document and update operations.
//!
//! Outcomes that are not failures (an index that already exists, a document
//! that was not found, an update that matched nothing) are modelled as enum
//! variants or fields here, never as errors.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::AnalyticsError;

/// Response to an index creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndexResponse {
    pub acknowledged: bool,
    pub index: String,
}

/// Response to a request that only carries an acknowledgement flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcknowledgedResponse {
    pub acknowledged: bool,
}

/// Result of an index lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// The engine processed the request.
    Acknowledged { index: String, acknowledged: bool },
    /// Creation was skipped because the index already exists.
    AlreadyExists,
    /// Deletion was skipped because the index does not exist.
    NotFound,
}

impl IndexOutcome {
    /// True only when the engine acknowledged the change.
    pub fn is_acknowledged(&self) -> bool {
        matches!(
            self,
            Self::Acknowledged {
                acknowledged: true,
                ..
            }
        )
    }
}

/// How a write changed the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Created,
    Updated,
}

impl WriteResult {
    /// Parse the engine's `result` field.
    pub fn parse(result: &str) -> Option<Self> {
        match result {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            _ => None,
        }
    }
}

/// Response to a document write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexResponse {
    /// The document id, engine-assigned when the caller supplied none.
    pub id: String,
    pub result: WriteResult,
}

/// Result of a single document deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteResult {
    Deleted,
    NotFound,
}

impl DeleteResult {
    /// Parse the engine's `result` field.
    pub fn parse(result: &str) -> Option<Self> {
        match result {
            "deleted" => Some(Self::Deleted),
            "not_found" => Some(Self::NotFound),
            _ => None,
        }
    }
}

/// A hit as returned by the engine, before decoding the source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    pub id: String,
    pub source: Value,
}

impl RawHit {
    /// Decode the source into a typed document.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Hit<T>, AnalyticsError> {
        let source = serde_json::from_value(self.source).map_err(|e| {
            AnalyticsError::decode(format!("Invalid source for document {}: {}", self.id, e))
        })?;
        Ok(Hit {
            id: self.id,
            source,
        })
    }
}

/// A decoded hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<T> {
    pub id: String,
    pub source: T,
}

/// Whether the reported total is exact or a lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalRelation {
    #[default]
    Eq,
    Gte,
}

/// Raw search response.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub total: u64,
    pub total_relation: TotalRelation,
    pub hits: Vec<RawHit>,
}

/// Decoded search results.
///
/// `hits.len()` may be smaller than `total`: the engine returns one page,
/// and no further pages are fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHits<T> {
    pub total: u64,
    pub total_relation: TotalRelation,
    /// Offset of the first returned hit.
    pub from: u64,
    pub hits: Vec<Hit<T>>,
}

impl<T> SearchHits<T> {
    /// True when matching hits exist after the returned page.
    pub fn is_truncated(&self) -> bool {
        self.from + (self.hits.len() as u64) < self.total
            || self.total_relation == TotalRelation::Gte
    }
}

/// Raw update-by-query response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateByQueryResponse {
    /// Documents matched by the selector.
    pub total: u64,
    /// Documents the script updated.
    pub updated: u64,
    /// Documents skipped because of concurrent modification.
    pub version_conflicts: u64,
}

/// Result of an update-by-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub updated: u64,
    pub version_conflicts: u64,
}

impl UpdateOutcome {
    /// The selector matched no documents. Not an error.
    pub fn is_no_match(&self) -> bool {
        self.matched == 0 && self.updated == 0
    }
}

impl From<UpdateByQueryResponse> for UpdateOutcome {
    fn from(response: UpdateByQueryResponse) -> Self {
        Self {
            matched: response.total,
            updated: response.updated,
            version_conflicts: response.version_conflicts,
        }
    }
}
