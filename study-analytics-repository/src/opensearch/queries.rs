//! OpenSearch request body builders.
//!
//! This module turns the typed query model into OpenSearch query DSL:
//! - match clauses become a `bool.must` list (`match_all` when empty)
//! - named aggregations become `avg`, `value_count` and `filter` aggregations
//! - update selectors become `terms`/`term`/`match` queries
//! - field assignments become script params for a fixed Painless body

use serde_json::{json, Map, Value};

use study_analytics_shared::{
    AggregationSpec, FieldAssignments, FieldValue, MatchClause, SearchQuery, Selector,
};

/// Painless body for update-by-query.
///
/// Field names and values are read from `params.assignments`; nothing from
/// the caller is ever part of the source.
pub const ASSIGN_FIELDS_SCRIPT: &str =
    "for (entry in params.assignments.entrySet()) { ctx._source[entry.getKey()] = entry.getValue(); }";

/// Build a search request body from a SearchQuery.
///
/// `size` is set to 0 for aggregation-only queries so the engine does not
/// return document bodies that would be discarded.
pub fn build_search_body(query: &SearchQuery) -> Value {
    let mut body = Map::new();
    body.insert("query".to_string(), build_match_query(query.must()));

    if let Some(size) = query.size() {
        body.insert("size".to_string(), json!(size));
    }
    if let Some(from) = query.from() {
        body.insert("from".to_string(), json!(from));
    }

    if !query.aggregations().is_empty() {
        let aggs: Map<String, Value> = query
            .aggregations()
            .iter()
            .map(|agg| (agg.name.clone(), build_aggregation(&agg.spec)))
            .collect();
        body.insert("aggs".to_string(), Value::Object(aggs));
    }

    Value::Object(body)
}

/// Build the query clause for a list of must-match clauses.
fn build_match_query(clauses: &[MatchClause]) -> Value {
    if clauses.is_empty() {
        return json!({ "match_all": {} });
    }

    let must: Vec<Value> = clauses
        .iter()
        .map(|clause| build_match(&clause.field, &clause.value))
        .collect();

    json!({
        "bool": {
            "must": must
        }
    })
}

fn build_match(field: &str, value: &FieldValue) -> Value {
    json!({
        "match": {
            field: { "query": value }
        }
    })
}

/// Build a single aggregation.
fn build_aggregation(spec: &AggregationSpec) -> Value {
    match spec {
        AggregationSpec::Average { field } => json!({ "avg": { "field": field } }),
        AggregationSpec::ValueCount { field } => json!({ "value_count": { "field": field } }),
        AggregationSpec::FilteredCount { field, value } => json!({
            "filter": {
                "term": { field: value }
            }
        }),
    }
}

/// Build the query selecting the documents an update applies to.
pub fn build_selector_query(selector: &Selector) -> Value {
    match selector {
        // `_id` rather than a source field, so documents whose body lacks an
        // id field are still addressable.
        Selector::Ids(ids) => json!({ "terms": { "_id": ids } }),
        Selector::Term { field, value } => json!({
            "term": { field: value }
        }),
        Selector::Match { field, value } => build_match(field, value),
    }
}

/// Build an update-by-query request body.
pub fn build_update_by_query_body(selector: &Selector, assignments: &FieldAssignments) -> Value {
    let params: Map<String, Value> = assignments
        .iter()
        .map(|(field, value)| (field.to_string(), json!(value)))
        .collect();

    json!({
        "query": build_selector_query(selector),
        "script": {
            "lang": "painless",
            "source": ASSIGN_FIELDS_SCRIPT,
            "params": {
                "assignments": params
            }
        }
    })
}
