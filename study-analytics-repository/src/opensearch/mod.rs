//! OpenSearch implementation of the search transport.
//!
//! This module provides a concrete implementation of `SearchTransport`
//! using OpenSearch as the backend.

mod client;
mod index_config;
pub mod queries;
pub mod responses;

pub use client::OpenSearchTransport;
pub use index_config::{answer_index_settings, ANSWER_INDEX_NAME};
