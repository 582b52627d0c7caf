//! Analytics error types.
//!
//! This module defines the error types that can occur while talking to the
//! search engine or decoding its responses.

use thiserror::Error;

/// Errors that can occur during index, document and aggregation operations.
#[derive(Debug, Clone, Error)]
pub enum AnalyticsError {
    /// The engine was unreachable, timed out, or answered with a failure status.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The index already exists, or does not exist, on a lifecycle operation.
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// The response was missing an expected field or aggregation.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Invalid input from the caller.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A document could not be serialized into a request body.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Selector id list exceeds the configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

impl AnalyticsError {
    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConflictError(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Whether this is a lifecycle conflict rather than a hard failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConflictError(_))
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

impl From<opensearch::Error> for AnalyticsError {
    fn from(e: opensearch::Error) -> Self {
        Self::TransportError(e.to_string())
    }
}
