//! # Study Analytics
//!
//! Entry point library for the student answer analytics service.
//!
//! This crate provides environment configuration and dependency wiring
//! for the components in `study-analytics-repository`.

pub mod config;

pub use config::Dependencies;

use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Analytics error.
    #[error("Analytics error: {0}")]
    AnalyticsError(#[from] study_analytics_repository::AnalyticsError),
}

impl ServiceError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
