//! OpenSearch response parsing.
//!
//! Pure functions from response bodies to the typed responses, kept apart
//! from the HTTP calls so they can be tested against captured payloads.

use serde_json::Value;

use crate::errors::AnalyticsError;
use crate::types::{
    AcknowledgedResponse, CreateIndexResponse, DeleteResult, IndexResponse, RawHit,
    SearchResponse, TotalRelation, UpdateByQueryResponse, WriteResult,
};

/// Error type reported when creating an index that exists.
pub const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// Error type reported when addressing an index that does not exist.
pub const INDEX_NOT_FOUND_ERROR: &str = "index_not_found_exception";

/// Extract `error.type` from an error body.
pub fn error_type(body: &Value) -> Option<&str> {
    body.get("error")?.get("type")?.as_str()
}

/// Failure for a request that came back with an unexpected status.
pub fn request_failure(operation: &str, index: &str, status: u16, body: &Value) -> AnalyticsError {
    AnalyticsError::transport(format!(
        "{} on {} failed with status {}: {}",
        operation, index, status, body
    ))
}

/// Classify a failed index creation. An existing index is a conflict.
pub fn classify_create_failure(index: &str, status: u16, body: &Value) -> AnalyticsError {
    if error_type(body) == Some(ALREADY_EXISTS_ERROR) {
        return AnalyticsError::conflict(format!("index {} already exists", index));
    }
    request_failure("create_index", index, status, body)
}

/// Classify a failed index deletion. A missing index is a conflict.
pub fn classify_delete_index_failure(index: &str, status: u16, body: &Value) -> AnalyticsError {
    if status == 404 || error_type(body) == Some(INDEX_NOT_FOUND_ERROR) {
        return AnalyticsError::conflict(format!("index {} does not exist", index));
    }
    request_failure("delete_index", index, status, body)
}

/// Map the status of an index existence check.
pub fn classify_exists_status(index: &str, status: u16) -> Result<bool, AnalyticsError> {
    match status {
        200 => Ok(true),
        404 => Ok(false),
        _ => Err(request_failure("exists_index", index, status, &Value::Null)),
    }
}

/// Map a document delete response.
///
/// 404 carries `"result": "not_found"` when the index exists and an error
/// body when it does not. Either way the document is absent.
pub fn classify_delete_document(
    index: &str,
    status: u16,
    body: &Value,
) -> Result<DeleteResult, AnalyticsError> {
    match status {
        404 => Ok(DeleteResult::NotFound),
        200..=299 => parse_delete_response(body),
        _ => Err(request_failure("delete_document", index, status, body)),
    }
}

pub fn parse_create_index(body: &Value, index: &str) -> CreateIndexResponse {
    CreateIndexResponse {
        acknowledged: body["acknowledged"].as_bool().unwrap_or(false),
        index: body["index"].as_str().unwrap_or(index).to_string(),
    }
}

pub fn parse_acknowledged(body: &Value) -> AcknowledgedResponse {
    AcknowledgedResponse {
        acknowledged: body["acknowledged"].as_bool().unwrap_or(false),
    }
}

pub fn parse_index_response(body: &Value) -> Result<IndexResponse, AnalyticsError> {
    let id = body["_id"]
        .as_str()
        .ok_or_else(|| AnalyticsError::decode("index response missing _id"))?;
    let result = body["result"]
        .as_str()
        .and_then(WriteResult::parse)
        .ok_or_else(|| {
            AnalyticsError::decode(format!("unexpected index result: {}", body["result"]))
        })?;

    Ok(IndexResponse {
        id: id.to_string(),
        result,
    })
}

pub fn parse_delete_response(body: &Value) -> Result<DeleteResult, AnalyticsError> {
    body["result"]
        .as_str()
        .and_then(DeleteResult::parse)
        .ok_or_else(|| {
            AnalyticsError::decode(format!("unexpected delete result: {}", body["result"]))
        })
}

/// Parse a single hit. Returns `None` when `_id` is missing.
pub fn parse_hit(hit: &Value) -> Option<RawHit> {
    let id = hit.get("_id")?.as_str()?;
    let source = hit.get("_source").cloned().unwrap_or(Value::Null);

    Some(RawHit {
        id: id.to_string(),
        source,
    })
}

/// Parse a get-document response, `None` when `found` is false.
pub fn parse_get_response(body: &Value) -> Option<RawHit> {
    if !body["found"].as_bool().unwrap_or(false) {
        return None;
    }
    parse_hit(body)
}

pub fn parse_search_response(body: &Value) -> Result<SearchResponse, AnalyticsError> {
    let hits = body
        .get("hits")
        .ok_or_else(|| AnalyticsError::decode("search response missing hits"))?;

    // `hits.total` is an object on current engines and a bare number on
    // older ones.
    let (total, total_relation) = match hits.get("total") {
        Some(Value::Number(n)) => (n.as_u64().unwrap_or(0), TotalRelation::Eq),
        Some(total) => {
            let relation = match total["relation"].as_str() {
                Some("gte") => TotalRelation::Gte,
                _ => TotalRelation::Eq,
            };
            (total["value"].as_u64().unwrap_or(0), relation)
        }
        None => (0, TotalRelation::Eq),
    };

    let hits = hits["hits"]
        .as_array()
        .map(|items| items.iter().filter_map(parse_hit).collect())
        .unwrap_or_default();

    Ok(SearchResponse {
        total,
        total_relation,
        hits,
    })
}

pub fn parse_update_by_query(body: &Value) -> UpdateByQueryResponse {
    UpdateByQueryResponse {
        total: body["total"].as_u64().unwrap_or(0),
        updated: body["updated"].as_u64().unwrap_or(0),
        version_conflicts: body["version_conflicts"].as_u64().unwrap_or(0),
    }
}
