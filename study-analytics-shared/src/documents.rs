//! Documents stored in the search engine.
//!
//! Field names are serialized in camelCase to match the documents already
//! present in the `problem-records` and profile indices.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A document that can be written to an index.
///
/// Returning `None` from `document_id` lets the engine assign an id.
pub trait IndexedDocument {
    /// The caller-assigned identifier, if any.
    fn document_id(&self) -> Option<String>;
}

/// A single answer submitted by a student for one problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    /// The study session the answer belongs to.
    pub study_id: i64,
    /// The study structure (curriculum node) the problem belongs to.
    pub study_structure_id: i64,
    /// The student who answered.
    pub student_id: String,
    /// Problem number within the study.
    pub problem_no: i64,
    /// Whether the answer was correct.
    pub correct_yn: bool,
    /// When the student started the problem.
    pub problem_start_dtm: DateTime<Utc>,
    /// When the student finished the problem.
    pub problem_end_dtm: DateTime<Utc>,
    /// Score awarded for the answer.
    pub dssc_value: i64,
}

impl AnswerRecord {
    /// Create an unanswered record for the given student and problem.
    ///
    /// The record starts out incorrect with a zero score, timed at the
    /// current instant.
    pub fn new(
        student_id: impl Into<String>,
        study_id: i64,
        study_structure_id: i64,
        problem_no: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            study_id,
            study_structure_id,
            student_id: student_id.into(),
            problem_no,
            correct_yn: false,
            problem_start_dtm: now,
            problem_end_dtm: now,
            dssc_value: 0,
        }
    }

    /// Set whether the answer was correct.
    pub fn with_correctness(mut self, correct: bool) -> Self {
        self.correct_yn = correct;
        self
    }

    /// Set the score awarded.
    pub fn with_score(mut self, score: i64) -> Self {
        self.dssc_value = score;
        self
    }

    /// Set the start instant and time spent on the problem.
    pub fn with_timing(mut self, start: DateTime<Utc>, spent: Duration) -> Self {
        self.problem_start_dtm = start;
        self.problem_end_dtm = start + spent;
        self
    }
}

impl IndexedDocument for AnswerRecord {
    /// Uses format: `{student_id}_{study_id}_{problem_no}` so a resubmitted
    /// answer replaces the previous one.
    fn document_id(&self) -> Option<String> {
        Some(format!(
            "{}_{}_{}",
            self.student_id, self.study_id, self.problem_no
        ))
    }
}

/// One student's answers for a whole study, solved back to back.
#[derive(Debug, Clone)]
pub struct AnswerSheet {
    pub student_id: String,
    pub study_id: i64,
    pub study_structure_id: i64,
    /// `(problem_no, correct)` in the order the problems were solved.
    pub answers: Vec<(i64, bool)>,
    pub started_at: DateTime<Utc>,
    /// Time spent on each problem.
    pub per_problem: Duration,
    /// Score awarded for each correct answer; incorrect answers score 0.
    pub points_per_correct: i64,
}

impl AnswerSheet {
    /// Expand the sheet into one record per problem.
    ///
    /// Each problem starts when the previous one ended.
    pub fn into_records(self) -> Vec<AnswerRecord> {
        let mut start = self.started_at;
        let mut records = Vec::with_capacity(self.answers.len());

        for (problem_no, correct) in self.answers {
            let score = if correct { self.points_per_correct } else { 0 };
            let record = AnswerRecord::new(
                self.student_id.clone(),
                self.study_id,
                self.study_structure_id,
                problem_no,
            )
            .with_correctness(correct)
            .with_score(score)
            .with_timing(start, self.per_problem);

            start = record.problem_end_dtm;
            records.push(record);
        }

        records
    }
}

/// A minimal person profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    /// Identifier, also stored in the document body.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl ProfileDocument {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl IndexedDocument for ProfileDocument {
    fn document_id(&self) -> Option<String> {
        Some(self.id.clone())
    }
}
