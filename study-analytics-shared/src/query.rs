//! Typed query model.
//!
//! A [`SearchQuery`] is built once through [`QueryBuilder`] and never mutated
//! afterwards. The repository crate turns it into an engine request body;
//! nothing in here knows about the wire format.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A literal field value used in match clauses, selectors and updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A `field = value` clause. Multiple clauses are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchClause {
    pub field: String,
    pub value: FieldValue,
}

/// The statistic computed by a named aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationSpec {
    /// Arithmetic mean of a numeric field, ignoring documents without it.
    Average { field: String },
    /// Number of documents where the field is present.
    ValueCount { field: String },
    /// Number of matched documents where `field == value`.
    FilteredCount { field: String, value: FieldValue },
}

/// An aggregation request together with the name its result is keyed by.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedAggregation {
    pub name: String,
    pub spec: AggregationSpec,
}

/// An immutable query: match clauses, aggregations and paging.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchQuery {
    must: Vec<MatchClause>,
    aggregations: Vec<NamedAggregation>,
    from: Option<usize>,
    size: Option<usize>,
}

impl SearchQuery {
    /// A query matching every document with the engine's default page size.
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn must(&self) -> &[MatchClause] {
        &self.must
    }

    pub fn aggregations(&self) -> &[NamedAggregation] {
        &self.aggregations
    }

    pub fn from(&self) -> Option<usize> {
        self.from
    }

    /// True when the query exists only to compute aggregations.
    pub fn is_aggregation_only(&self) -> bool {
        !self.aggregations.is_empty() && self.size.is_none()
    }

    /// The page size to request.
    ///
    /// Aggregation-only queries request zero hits so no document bodies are
    /// transferred. `None` leaves the engine default in place (10 hits), so
    /// larger result sets are truncated unless a size is set explicitly.
    pub fn size(&self) -> Option<usize> {
        if self.is_aggregation_only() {
            Some(0)
        } else {
            self.size
        }
    }
}

/// Builder for [`SearchQuery`].
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: SearchQuery,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to match `value`.
    pub fn must_match(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.query.must.push(MatchClause {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Add an average aggregation over `field`.
    pub fn average(mut self, name: impl Into<String>, field: impl Into<String>) -> Self {
        self.push_aggregation(
            name,
            AggregationSpec::Average {
                field: field.into(),
            },
        );
        self
    }

    /// Add a value-count aggregation over `field`.
    pub fn value_count(mut self, name: impl Into<String>, field: impl Into<String>) -> Self {
        self.push_aggregation(
            name,
            AggregationSpec::ValueCount {
                field: field.into(),
            },
        );
        self
    }

    /// Add a count of matched documents where `field == value`.
    pub fn filtered_count(
        mut self,
        name: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.push_aggregation(
            name,
            AggregationSpec::FilteredCount {
                field: field.into(),
                value: value.into(),
            },
        );
        self
    }

    /// Skip the first `from` hits.
    pub fn from(mut self, from: usize) -> Self {
        self.query.from = Some(from);
        self
    }

    /// Request `size` hits, also when aggregations are present.
    pub fn size(mut self, size: usize) -> Self {
        self.query.size = Some(size);
        self
    }

    pub fn build(self) -> SearchQuery {
        self.query
    }

    // A later aggregation with the same name replaces the earlier one, the
    // same way the engine keys its response.
    fn push_aggregation(&mut self, name: impl Into<String>, spec: AggregationSpec) {
        let name = name.into();
        self.query.aggregations.retain(|agg| agg.name != name);
        self.query.aggregations.push(NamedAggregation { name, spec });
    }
}

/// Selects the documents an update-by-query applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Documents whose id is in the list.
    Ids(Vec<String>),
    /// Documents whose field holds exactly `value`.
    Term { field: String, value: FieldValue },
    /// Documents whose field matches `value` after analysis.
    Match { field: String, value: FieldValue },
}

impl Selector {
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Ids(ids.into_iter().map(Into::into).collect())
    }

    pub fn term(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Select by an analyzed match, for text fields.
    pub fn matching(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::Match {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Field values to set on every selected document.
///
/// Values are bound as script parameters, never spliced into script source.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct FieldAssignments {
    values: BTreeMap<String, FieldValue>,
}

impl FieldAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`, replacing any earlier assignment to it.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
