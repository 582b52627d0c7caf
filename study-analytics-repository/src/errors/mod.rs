//! Error types for the study analytics repository.

mod analytics_error;

pub use analytics_error::AnalyticsError;
