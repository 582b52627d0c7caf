//! In-memory search transport for tests.
//!
//! Evaluates the typed query model directly: match clauses compare field
//! values (case-insensitively for text), aggregations are computed over the
//! matched documents and returned in the engine's response shape.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::aggregations::AggregationResults;
use crate::errors::AnalyticsError;
use crate::interfaces::SearchTransport;
use crate::types::{
    AcknowledgedResponse, CreateIndexResponse, DeleteResult, IndexResponse, RawHit,
    SearchResponse, TotalRelation, UpdateByQueryResponse, WriteResult,
};
use study_analytics_shared::{
    AggregationSpec, FieldAssignments, MatchClause, SearchQuery, Selector,
};

const DEFAULT_PAGE_SIZE: usize = 10;

type Documents = BTreeMap<String, Value>;

/// Mock engine for testing.
#[derive(Default)]
pub(crate) struct InMemoryTransport {
    indices: Mutex<HashMap<String, Documents>>,
    last_query: Mutex<Option<SearchQuery>>,
    should_fail: bool,
}

impl InMemoryTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A transport whose every call fails like an unreachable engine.
    pub(crate) fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub(crate) async fn last_query(&self) -> Option<SearchQuery> {
        self.last_query.lock().await.clone()
    }

    pub(crate) async fn document(&self, index: &str, id: &str) -> Option<Value> {
        self.indices.lock().await.get(index)?.get(id).cloned()
    }

    fn check(&self) -> Result<(), AnalyticsError> {
        if self.should_fail {
            return Err(AnalyticsError::transport("Mock failure"));
        }
        Ok(())
    }

    fn missing_index(index: &str) -> AnalyticsError {
        AnalyticsError::transport(format!("no such index [{}]", index))
    }

    fn values_equal(actual: &Value, expected: &Value, analyzed: bool) -> bool {
        match (actual, expected) {
            (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
            (Value::String(a), Value::String(b)) if analyzed => a.eq_ignore_ascii_case(b),
            _ => actual == expected,
        }
    }

    /// Dynamic mappings index text fields with an exact `.keyword` subfield.
    fn source_field(field: &str) -> &str {
        field.strip_suffix(".keyword").unwrap_or(field)
    }

    fn matches_clauses(doc: &Value, clauses: &[MatchClause]) -> bool {
        clauses.iter().all(|clause| {
            doc.get(&clause.field).is_some_and(|actual| {
                Self::values_equal(actual, &json!(clause.value), true)
            })
        })
    }

    fn matches_selector(id: &str, doc: &Value, selector: &Selector) -> bool {
        match selector {
            Selector::Ids(ids) => ids.iter().any(|candidate| candidate == id),
            Selector::Term { field, value } => doc
                .get(Self::source_field(field))
                .is_some_and(|actual| Self::values_equal(actual, &json!(value), false)),
            Selector::Match { field, value } => doc
                .get(field)
                .is_some_and(|actual| Self::values_equal(actual, &json!(value), true)),
        }
    }

    fn aggregate(spec: &AggregationSpec, docs: &[&Value]) -> Value {
        match spec {
            AggregationSpec::Average { field } => {
                let values: Vec<f64> = docs
                    .iter()
                    .filter_map(|doc| doc.get(field).and_then(Value::as_f64))
                    .collect();
                if values.is_empty() {
                    json!({ "value": null })
                } else {
                    json!({ "value": values.iter().sum::<f64>() / values.len() as f64 })
                }
            }
            AggregationSpec::ValueCount { field } => {
                let count = docs
                    .iter()
                    .filter(|doc| doc.get(field).is_some_and(|v| !v.is_null()))
                    .count();
                json!({ "value": count })
            }
            AggregationSpec::FilteredCount { field, value } => {
                let expected = json!(value);
                let count = docs
                    .iter()
                    .filter(|doc| {
                        doc.get(field)
                            .is_some_and(|actual| Self::values_equal(actual, &expected, false))
                    })
                    .count();
                json!({ "doc_count": count })
            }
        }
    }
}

#[async_trait]
impl SearchTransport for InMemoryTransport {
    async fn create_index(
        &self,
        index: &str,
        _body: Option<Value>,
    ) -> Result<CreateIndexResponse, AnalyticsError> {
        self.check()?;
        let mut indices = self.indices.lock().await;
        if indices.contains_key(index) {
            return Err(AnalyticsError::conflict(format!(
                "index {} already exists",
                index
            )));
        }
        indices.insert(index.to_string(), Documents::new());
        Ok(CreateIndexResponse {
            acknowledged: true,
            index: index.to_string(),
        })
    }

    async fn delete_index(&self, index: &str) -> Result<AcknowledgedResponse, AnalyticsError> {
        self.check()?;
        match self.indices.lock().await.remove(index) {
            Some(_) => Ok(AcknowledgedResponse { acknowledged: true }),
            None => Err(AnalyticsError::conflict(format!(
                "index {} does not exist",
                index
            ))),
        }
    }

    async fn exists_index(&self, index: &str) -> Result<bool, AnalyticsError> {
        self.check()?;
        Ok(self.indices.lock().await.contains_key(index))
    }

    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        source: Value,
    ) -> Result<IndexResponse, AnalyticsError> {
        self.check()?;
        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // Writes auto-create the index, as the engine does by default.
        let mut indices = self.indices.lock().await;
        let documents = indices.entry(index.to_string()).or_default();
        let result = match documents.insert(id.clone(), source) {
            Some(_) => WriteResult::Updated,
            None => WriteResult::Created,
        };
        Ok(IndexResponse { id, result })
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<RawHit>, AnalyticsError> {
        self.check()?;
        Ok(self.document(index, id).await.map(|source| RawHit {
            id: id.to_string(),
            source,
        }))
    }

    async fn search(
        &self,
        index: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse, AnalyticsError> {
        self.check()?;
        *self.last_query.lock().await = Some(query.clone());

        let indices = self.indices.lock().await;
        let documents = indices.get(index).ok_or_else(|| Self::missing_index(index))?;

        let matched: Vec<RawHit> = documents
            .iter()
            .filter(|(_, doc)| Self::matches_clauses(doc, query.must()))
            .map(|(id, doc)| RawHit {
                id: id.clone(),
                source: doc.clone(),
            })
            .collect();

        let total = matched.len() as u64;
        let hits = matched
            .into_iter()
            .skip(query.from().unwrap_or(0))
            .take(query.size().unwrap_or(DEFAULT_PAGE_SIZE))
            .collect();

        Ok(SearchResponse {
            total,
            total_relation: TotalRelation::Eq,
            hits,
        })
    }

    async fn delete_document(
        &self,
        index: &str,
        id: &str,
    ) -> Result<DeleteResult, AnalyticsError> {
        self.check()?;
        let mut indices = self.indices.lock().await;
        let removed = indices
            .get_mut(index)
            .and_then(|documents| documents.remove(id));
        Ok(match removed {
            Some(_) => DeleteResult::Deleted,
            None => DeleteResult::NotFound,
        })
    }

    async fn update_by_query(
        &self,
        index: &str,
        selector: &Selector,
        assignments: &FieldAssignments,
    ) -> Result<UpdateByQueryResponse, AnalyticsError> {
        self.check()?;
        let mut indices = self.indices.lock().await;
        let documents = indices
            .get_mut(index)
            .ok_or_else(|| Self::missing_index(index))?;

        let mut updated = 0;
        for (id, doc) in documents.iter_mut() {
            if !Self::matches_selector(id, doc, selector) {
                continue;
            }
            if let Value::Object(fields) = doc {
                for (field, value) in assignments.iter() {
                    fields.insert(field.to_string(), json!(value));
                }
            }
            updated += 1;
        }

        Ok(UpdateByQueryResponse {
            total: updated,
            updated,
            version_conflicts: 0,
        })
    }

    async fn run_aggregation_query(
        &self,
        index: &str,
        query: &SearchQuery,
    ) -> Result<AggregationResults, AnalyticsError> {
        self.check()?;
        *self.last_query.lock().await = Some(query.clone());

        let indices = self.indices.lock().await;
        let documents = indices.get(index).ok_or_else(|| Self::missing_index(index))?;

        let matched: Vec<&Value> = documents
            .values()
            .filter(|doc| Self::matches_clauses(doc, query.must()))
            .collect();

        let aggregations: Map<String, Value> = query
            .aggregations()
            .iter()
            .map(|agg| (agg.name.clone(), Self::aggregate(&agg.spec, &matched)))
            .collect();

        Ok(AggregationResults::new(aggregations))
    }
}
