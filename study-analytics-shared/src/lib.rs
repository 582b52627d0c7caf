//! # Study Analytics Shared
//!
//! Types shared between the repository layer and the service binary:
//! the documents stored in the search engine and the typed query model
//! used to select and aggregate them.

pub mod documents;
pub mod query;

pub use documents::{AnswerRecord, AnswerSheet, IndexedDocument, ProfileDocument};
pub use query::{
    AggregationSpec, FieldAssignments, FieldValue, MatchClause, NamedAggregation, QueryBuilder,
    SearchQuery, Selector,
};
