//! # Study Analytics Repository
//!
//! This crate provides the layer between callers and the search engine:
//! index lifecycle, single-document operations, update-by-query, and
//! aggregation queries decoded into business metrics. It includes the
//! transport trait, error types, and a concrete OpenSearch implementation.

pub mod aggregations;
pub mod analytics;
pub mod bulk_update;
pub mod config;
pub mod documents;
pub mod errors;
pub mod indices;
pub mod interfaces;
pub mod opensearch;
pub mod types;

#[cfg(test)]
mod testing;

pub use aggregations::{percentage, AggregationResults, Metric};
pub use analytics::ProblemAnalytics;
pub use bulk_update::BulkUpdater;
pub use config::{AnalyticsConfig, RefreshPolicy, TransportConfig};
pub use documents::DocumentStore;
pub use errors::AnalyticsError;
pub use indices::IndexManager;
pub use interfaces::SearchTransport;
pub use opensearch::OpenSearchTransport;
pub use types::{DeleteResult, IndexOutcome, UpdateOutcome, WriteResult};
