//! Answer-record analytics.
//!
//! Stores student answers in the `problem-records` index and derives the
//! average score and per-student correct-answer rate through aggregations.

use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::aggregations::{percentage, AggregationResults, Metric};
use crate::documents::DocumentStore;
use crate::errors::AnalyticsError;
use crate::indices::IndexManager;
use crate::interfaces::SearchTransport;
use crate::opensearch::queries::build_search_body;
use crate::opensearch::{answer_index_settings, ANSWER_INDEX_NAME};
use crate::types::{IndexOutcome, IndexResponse};
use study_analytics_shared::{AnswerRecord, QueryBuilder, SearchQuery};

const SCORE_FIELD: &str = "dsscValue";
const CORRECT_FIELD: &str = "correctYn";
const STUDENT_FIELD: &str = "studentId";

const AVG_SCORE_AGG: &str = "avg_dsscValue";
const CORRECT_TOTAL_AGG: &str = "correct_total_count";
const CORRECT_TRUE_AGG: &str = "correct_true_count";

/// Analytics over student answer records.
pub struct ProblemAnalytics {
    transport: Arc<dyn SearchTransport>,
    indices: IndexManager,
    documents: DocumentStore,
}

impl ProblemAnalytics {
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            indices: IndexManager::new(transport.clone()),
            documents: DocumentStore::new(transport.clone()),
            transport,
        }
    }

    /// Create the answer index with its mappings.
    pub async fn create_index(&self) -> Result<IndexOutcome, AnalyticsError> {
        self.indices
            .create_index_with(ANSWER_INDEX_NAME, Some(answer_index_settings()))
            .await
    }

    pub async fn delete_index(&self) -> Result<IndexOutcome, AnalyticsError> {
        self.indices.delete_index(ANSWER_INDEX_NAME).await
    }

    /// Create the answer index unless it exists. Returns `true` if created.
    pub async fn ensure_index(&self) -> Result<bool, AnalyticsError> {
        self.indices
            .ensure_index(ANSWER_INDEX_NAME, Some(answer_index_settings()))
            .await
    }

    /// Store one answer. Resubmitting the same problem overwrites it.
    pub async fn insert_answer(&self, answer: &AnswerRecord) -> Result<IndexResponse, AnalyticsError> {
        self.documents.insert(ANSWER_INDEX_NAME, answer).await
    }

    /// Average score over every stored answer.
    ///
    /// `Metric::NoData` when no answer carries a score.
    #[instrument(skip(self))]
    pub async fn average_score(&self) -> Result<Metric, AnalyticsError> {
        let query = QueryBuilder::new().average(AVG_SCORE_AGG, SCORE_FIELD).build();

        let aggregations = self.run(&query).await?;
        let average = aggregations
            .average(AVG_SCORE_AGG)
            .map_err(|e| Self::decode_failure(&query, e))?;

        debug!(average = ?average, "Average score computed");
        Ok(average)
    }

    /// Percentage of a student's answers that were correct.
    ///
    /// `Metric::NoData` when the student has no answers; the flat rate for
    /// that case is `0.0`, never NaN.
    #[instrument(skip(self))]
    pub async fn correct_rate(&self, student_id: &str) -> Result<Metric, AnalyticsError> {
        let query = QueryBuilder::new()
            .must_match(STUDENT_FIELD, student_id)
            .value_count(CORRECT_TOTAL_AGG, CORRECT_FIELD)
            .filtered_count(CORRECT_TRUE_AGG, CORRECT_FIELD, true)
            .build();

        let aggregations = self.run(&query).await?;
        let total = aggregations
            .value_count(CORRECT_TOTAL_AGG)
            .map_err(|e| Self::decode_failure(&query, e))?;
        let correct = aggregations
            .filtered_count(CORRECT_TRUE_AGG)
            .map_err(|e| Self::decode_failure(&query, e))?;

        if total == 0 {
            debug!(student_id = %student_id, "No answers recorded");
            return Ok(Metric::NoData);
        }

        let rate = percentage(correct, total);
        debug!(
            student_id = %student_id,
            total = total,
            correct = correct,
            rate = rate,
            "Correct rate computed"
        );
        Ok(Metric::Value(rate))
    }

    async fn run(
        &self,
        query: &SearchQuery,
    ) -> Result<AggregationResults, AnalyticsError> {
        self.transport
            .run_aggregation_query(ANSWER_INDEX_NAME, query)
            .await
            .map_err(|e| {
                error!(
                    index = ANSWER_INDEX_NAME,
                    query = %build_search_body(query),
                    error = %e,
                    "Aggregation query failed"
                );
                e
            })
    }

    fn decode_failure(query: &SearchQuery, e: AnalyticsError) -> AnalyticsError {
        error!(
            index = ANSWER_INDEX_NAME,
            query = %build_search_body(query),
            error = %e,
            "Failed to decode aggregation result"
        );
        e
    }
}
