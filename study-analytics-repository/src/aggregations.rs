//! Aggregation result decoding.
//!
//! The engine reports the average of an empty set as `null`. Decoding keeps
//! that apart from a computed zero through [`Metric::NoData`]; callers that
//! want the flat number use [`Metric::or_zero`], which maps both to `0.0`.

use serde_json::{Map, Value};

use crate::errors::AnalyticsError;

/// A derived numeric metric that may have no underlying data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    /// A value computed from at least one document.
    Value(f64),
    /// Nothing to compute from.
    NoData,
}

impl Metric {
    /// The value, with `NoData` reported as `0.0`.
    pub fn or_zero(self) -> f64 {
        match self {
            Self::Value(v) => v,
            Self::NoData => 0.0,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::NoData => None,
        }
    }

    pub fn is_no_data(self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// `true_count / total_count * 100`, defined as `0.0` when `total_count` is 0.
pub fn percentage(true_count: u64, total_count: u64) -> f64 {
    if total_count == 0 {
        return 0.0;
    }
    (true_count as f64 / total_count as f64) * 100.0
}

/// Named aggregation results from a single query execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResults {
    values: Map<String, Value>,
}

impl AggregationResults {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Extract the `aggregations` object from a search response body.
    ///
    /// A body without aggregations yields an empty result set; each lookup
    /// then fails with a decode error naming the missing aggregation.
    pub fn from_response(body: &Value) -> Result<Self, AnalyticsError> {
        match body.get("aggregations") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Object(map)) => Ok(Self::new(map.clone())),
            Some(other) => Err(AnalyticsError::decode(format!(
                "aggregations is not an object: {}",
                other
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Decode an average aggregation.
    pub fn average(&self, name: &str) -> Result<Metric, AnalyticsError> {
        match self.get(name)?.get("value") {
            None | Some(Value::Null) => Ok(Metric::NoData),
            Some(value) => value.as_f64().map(Metric::Value).ok_or_else(|| {
                AnalyticsError::decode(format!("{}: average is not a number: {}", name, value))
            }),
        }
    }

    /// Decode a value-count aggregation.
    pub fn value_count(&self, name: &str) -> Result<u64, AnalyticsError> {
        Self::count_field(name, self.get(name)?, "value")
    }

    /// Decode a filter aggregation's document count.
    pub fn filtered_count(&self, name: &str) -> Result<u64, AnalyticsError> {
        Self::count_field(name, self.get(name)?, "doc_count")
    }

    fn get(&self, name: &str) -> Result<&Value, AnalyticsError> {
        self.values
            .get(name)
            .ok_or_else(|| AnalyticsError::decode(format!("missing aggregation: {}", name)))
    }

    fn count_field(name: &str, aggregation: &Value, field: &str) -> Result<u64, AnalyticsError> {
        let value = aggregation
            .get(field)
            .ok_or_else(|| AnalyticsError::decode(format!("{}: missing {}", name, field)))?;

        // Counts come back as integers, but some engine versions emit floats.
        value
            .as_u64()
            .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
            .ok_or_else(|| {
                AnalyticsError::decode(format!("{}: {} is not a count: {}", name, field, value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results(body: Value) -> AggregationResults {
        AggregationResults::from_response(&body).unwrap()
    }

    #[test]
    fn test_percentage_zero_total_is_zero() {
        let rate = percentage(0, 0);
        assert_eq!(rate, 0.0);
        assert!(!rate.is_nan());
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(7, 10), 70.0);
        assert_eq!(percentage(10, 10), 100.0);
    }

    #[test]
    fn test_average_value() {
        let aggs = results(json!({
            "aggregations": { "avg_dsscValue": { "value": 7.0 } }
        }));

        assert_eq!(aggs.average("avg_dsscValue").unwrap(), Metric::Value(7.0));
    }

    #[test]
    fn test_average_null_is_no_data() {
        let aggs = results(json!({
            "aggregations": { "avg_dsscValue": { "value": null } }
        }));

        let metric = aggs.average("avg_dsscValue").unwrap();
        assert!(metric.is_no_data());
        assert_eq!(metric.or_zero(), 0.0);
        assert_eq!(metric.value(), None);
    }

    #[test]
    fn test_confirmed_zero_is_distinct_from_no_data() {
        let aggs = results(json!({
            "aggregations": { "avg": { "value": 0.0 } }
        }));

        assert_eq!(aggs.average("avg").unwrap(), Metric::Value(0.0));
    }

    #[test]
    fn test_counts() {
        let aggs = results(json!({
            "aggregations": {
                "correct_total_count": { "value": 10 },
                "correct_true_count": { "doc_count": 7 }
            }
        }));

        assert_eq!(aggs.value_count("correct_total_count").unwrap(), 10);
        assert_eq!(aggs.filtered_count("correct_true_count").unwrap(), 7);
    }

    #[test]
    fn test_missing_aggregation_is_decode_error() {
        let aggs = results(json!({ "hits": { "hits": [] } }));

        assert!(aggs.is_empty());
        let err = aggs.value_count("correct_total_count").unwrap_err();
        assert!(matches!(err, AnalyticsError::DecodeError(ref msg) if msg.contains("correct_total_count")));
    }

    #[test]
    fn test_malformed_count_is_decode_error() {
        let aggs = results(json!({
            "aggregations": { "count": { "value": "ten" } }
        }));

        assert!(matches!(
            aggs.value_count("count"),
            Err(AnalyticsError::DecodeError(_))
        ));
    }

    #[test]
    fn test_aggregations_not_object() {
        let result = AggregationResults::from_response(&json!({ "aggregations": [1, 2] }));
        assert!(result.is_err());
    }
}
