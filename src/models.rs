use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::SchemaError;

/// Typed view of `GET /api2/questions/{id}/`.
/// Only the fields the median extractor reads are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionSnapshot {
    pub question: Question,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub scaling: Scaling,
    pub aggregations: Aggregations,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scaling {
    /// ISO-8601 timestamps along the question's date axis
    pub continuous_range: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Aggregations {
    pub recency_weighted: Aggregation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Aggregation {
    pub latest: AggregateForecast,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregateForecast {
    /// CDF samples aligned 1:1 with `continuous_range`
    pub forecast_values: Vec<f64>,
}

impl QuestionSnapshot {
    pub fn continuous_range(&self) -> &[String] {
        &self.question.scaling.continuous_range
    }

    pub fn forecast_cdf(&self) -> &[f64] {
        &self.question.aggregations.recency_weighted.latest.forecast_values
    }
}

impl TryFrom<&Value> for QuestionSnapshot {
    type Error = SchemaError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        QuestionSnapshot::deserialize(value).map_err(|e| SchemaError::Malformed(e.to_string()))
    }
}

/// One line of the ledger, keyed by the day the snapshot was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerRow {
    pub snapshot_date: NaiveDate,
    pub median_event_date: NaiveDate,
}
