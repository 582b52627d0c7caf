//! Update-by-query.
//!
//! Applies field assignments to every document matching a selector in one
//! engine request. Values are always bound as script parameters.

use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::config::AnalyticsConfig;
use crate::errors::AnalyticsError;
use crate::interfaces::SearchTransport;
use crate::types::UpdateOutcome;
use study_analytics_shared::{FieldAssignments, Selector};

/// Field that holds a document's identifier; it is never reassigned.
const ID_FIELD: &str = "id";

/// Applies parameter-bound field updates to selected documents.
pub struct BulkUpdater {
    transport: Arc<dyn SearchTransport>,
    config: AnalyticsConfig,
}

impl BulkUpdater {
    /// Create a new BulkUpdater with default configuration.
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            transport,
            config: AnalyticsConfig::default(),
        }
    }

    /// Create a new BulkUpdater with custom configuration.
    pub fn with_config(transport: Arc<dyn SearchTransport>, config: AnalyticsConfig) -> Self {
        Self { transport, config }
    }

    /// Check if the selector id list exceeds the configured limit.
    fn validate_selector(&self, selector: &Selector) -> Result<(), AnalyticsError> {
        if let (Selector::Ids(ids), Some(max)) = (selector, self.config.max_selector_ids) {
            if ids.len() > max {
                return Err(AnalyticsError::batch_size_exceeded(ids.len(), max));
            }
        }
        Ok(())
    }

    fn validate_assignments(assignments: &FieldAssignments) -> Result<(), AnalyticsError> {
        if assignments.is_empty() {
            return Err(AnalyticsError::validation("at least one field assignment is required"));
        }
        if assignments.contains_field(ID_FIELD) {
            return Err(AnalyticsError::validation("document id cannot be reassigned"));
        }
        Ok(())
    }

    /// Set the assigned fields on every document matched by `selector`.
    ///
    /// # Returns
    ///
    /// * `Ok(UpdateOutcome)` - `is_no_match()` is true when nothing matched,
    ///   which is not an error
    /// * `Err(AnalyticsError)` - If validation or the request fails
    #[instrument(skip(self, selector, assignments), fields(fields = assignments.len()))]
    pub async fn update_by_query(
        &self,
        index: &str,
        selector: &Selector,
        assignments: &FieldAssignments,
    ) -> Result<UpdateOutcome, AnalyticsError> {
        Self::validate_assignments(assignments)?;
        self.validate_selector(selector)?;

        if matches!(selector, Selector::Ids(ids) if ids.is_empty()) {
            debug!(index = %index, "Empty id selector, nothing to update");
            return Ok(UpdateOutcome::default());
        }

        let response = self
            .transport
            .update_by_query(index, selector, assignments)
            .await
            .map_err(|e| {
                error!(index = %index, selector = ?selector, error = %e, "Update by query failed");
                e
            })?;

        let outcome = UpdateOutcome::from(response);
        if outcome.is_no_match() {
            info!(index = %index, selector = ?selector, "Update by query matched no documents");
        } else {
            debug!(
                index = %index,
                matched = outcome.matched,
                updated = outcome.updated,
                version_conflicts = outcome.version_conflicts,
                "Update by query applied"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::DocumentStore;
    use crate::testing::InMemoryTransport;
    use study_analytics_shared::ProfileDocument;

    const INDEX: &str = "sample-index";

    async fn seeded() -> (Arc<InMemoryTransport>, BulkUpdater) {
        let transport = Arc::new(InMemoryTransport::new());
        let store = DocumentStore::new(transport.clone());
        store
            .insert(
                INDEX,
                &ProfileDocument::new("01", "Original FirstName", "Original LastName"),
            )
            .await
            .unwrap();
        store
            .insert(INDEX, &ProfileDocument::new("02", "Other", "Person"))
            .await
            .unwrap();

        (transport.clone(), BulkUpdater::new(transport))
    }

    #[tokio::test]
    async fn test_update_by_ids() {
        let (transport, updater) = seeded().await;
        let assignments = FieldAssignments::new()
            .set("firstName", "Updated FirstName")
            .set("lastName", "Updated LastName");

        let outcome = updater
            .update_by_query(INDEX, &Selector::ids(["01"]), &assignments)
            .await
            .unwrap();

        assert_eq!(outcome.updated, 1);
        assert!(!outcome.is_no_match());

        let doc = transport.document(INDEX, "01").await.unwrap();
        assert_eq!(doc["firstName"], "Updated FirstName");
        assert_eq!(doc["lastName"], "Updated LastName");
        assert_eq!(doc["id"], "01");

        let untouched = transport.document(INDEX, "02").await.unwrap();
        assert_eq!(untouched["firstName"], "Other");
    }

    #[tokio::test]
    async fn test_update_by_term() {
        let (transport, updater) = seeded().await;
        let assignments = FieldAssignments::new().set("lastName", "Renamed");

        // `firstName` is analyzed text; exact terms go to its keyword subfield.
        let outcome = updater
            .update_by_query(
                INDEX,
                &Selector::term("firstName.keyword", "Other"),
                &assignments,
            )
            .await
            .unwrap();

        assert_eq!(outcome.updated, 1);
        let doc = transport.document(INDEX, "02").await.unwrap();
        assert_eq!(doc["lastName"], "Renamed");
    }

    #[tokio::test]
    async fn test_update_by_match() {
        let (transport, updater) = seeded().await;
        let assignments = FieldAssignments::new().set("lastName", "Matched");

        let outcome = updater
            .update_by_query(INDEX, &Selector::matching("firstName", "other"), &assignments)
            .await
            .unwrap();

        assert_eq!(outcome.updated, 1);
        let doc = transport.document(INDEX, "02").await.unwrap();
        assert_eq!(doc["lastName"], "Matched");
        let untouched = transport.document(INDEX, "01").await.unwrap();
        assert_eq!(untouched["lastName"], "Original LastName");
    }

    #[tokio::test]
    async fn test_quotes_in_values_are_stored_verbatim() {
        let (transport, updater) = seeded().await;
        let hostile = "O'Brien'; ctx._source.clear(); '";
        let assignments = FieldAssignments::new().set("lastName", hostile);

        updater
            .update_by_query(INDEX, &Selector::ids(["01"]), &assignments)
            .await
            .unwrap();

        let doc = transport.document(INDEX, "01").await.unwrap();
        assert_eq!(doc["lastName"], hostile);
        assert_eq!(doc["firstName"], "Original FirstName");
    }

    #[tokio::test]
    async fn test_no_match_is_not_an_error() {
        let (_, updater) = seeded().await;
        let assignments = FieldAssignments::new().set("firstName", "Nobody");

        let outcome = updater
            .update_by_query(INDEX, &Selector::ids(["99"]), &assignments)
            .await
            .unwrap();

        assert_eq!(outcome.updated, 0);
        assert!(outcome.is_no_match());
    }

    #[tokio::test]
    async fn test_empty_id_selector_short_circuits() {
        // A failing transport proves no request is sent.
        let updater = BulkUpdater::new(Arc::new(InMemoryTransport::failing()));
        let assignments = FieldAssignments::new().set("firstName", "Nobody");

        let outcome = updater
            .update_by_query(INDEX, &Selector::Ids(vec![]), &assignments)
            .await
            .unwrap();

        assert!(outcome.is_no_match());
    }

    #[tokio::test]
    async fn test_id_reassignment_rejected() {
        let (_, updater) = seeded().await;
        let assignments = FieldAssignments::new().set("id", "02");

        let result = updater
            .update_by_query(INDEX, &Selector::ids(["01"]), &assignments)
            .await;

        assert!(matches!(result, Err(AnalyticsError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_empty_assignments_rejected() {
        let (_, updater) = seeded().await;

        let result = updater
            .update_by_query(INDEX, &Selector::ids(["01"]), &FieldAssignments::new())
            .await;

        assert!(matches!(result, Err(AnalyticsError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_selector_size_exceeded() {
        let transport = Arc::new(InMemoryTransport::new());
        let updater =
            BulkUpdater::with_config(transport, AnalyticsConfig::with_max_selector_ids(5));
        let ids: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let assignments = FieldAssignments::new().set("firstName", "Bulk");

        let result = updater
            .update_by_query(INDEX, &Selector::Ids(ids), &assignments)
            .await;

        assert!(matches!(
            result,
            Err(AnalyticsError::BatchSizeExceeded {
                provided: 10,
                max: 5
            })
        ));
    }
}
