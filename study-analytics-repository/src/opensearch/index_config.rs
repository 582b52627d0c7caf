//! OpenSearch index configuration and mappings.
//!
//! This module defines the settings and mappings for the answer-record index.

use serde_json::{json, Value};

/// The name of the answer-record index.
pub const ANSWER_INDEX_NAME: &str = "problem-records";

/// Get the index settings and mappings for the answer-record index.
///
/// The configuration includes:
/// - **Keyword fields**: `studentId` for exact filtering
/// - **boolean**: `correctYn`, so term filters on `true` behave
/// - **long**: ids, problem number and `dsscValue` for averaging
/// - **date**: start and end timestamps
pub fn answer_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "properties": {
                "studyId": { "type": "long" },
                "studyStructureId": { "type": "long" },
                "studentId": { "type": "keyword" },
                "problemNo": { "type": "long" },
                "correctYn": { "type": "boolean" },
                "problemStartDtm": { "type": "date" },
                "problemEndDtm": { "type": "date" },
                "dsscValue": { "type": "long" }
            }
        }
    })
}
