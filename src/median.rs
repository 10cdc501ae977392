//! Median extraction
//!
//! The community forecast of a date question arrives as CDF samples over a
//! range of timestamps. The median event date is the timestamp whose CDF
//! sample sits closest to 0.5.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use crate::error::{SchemaError, TrackerError};
use crate::models::QuestionSnapshot;

/// Cumulative probability the median sits at
pub const MEDIAN_TARGET: f64 = 0.5;

/// Derive the median event date from a raw question snapshot
pub fn extract_median_date(snapshot: &Value) -> Result<NaiveDate, TrackerError> {
    let snapshot = QuestionSnapshot::try_from(snapshot)?;
    Ok(median_from_distribution(
        snapshot.continuous_range(),
        snapshot.forecast_cdf(),
    )?)
}

/// Pick the timestamp whose CDF value is closest to [`MEDIAN_TARGET`]
pub fn median_from_distribution(
    continuous_range: &[String],
    cdf: &[f64],
) -> Result<NaiveDate, SchemaError> {
    if continuous_range.len() != cdf.len() {
        return Err(SchemaError::LengthMismatch {
            range_len: continuous_range.len(),
            cdf_len: cdf.len(),
        });
    }

    let idx = closest_index(cdf, MEDIAN_TARGET).ok_or(SchemaError::EmptyDistribution)?;
    let iso_ts = &continuous_range[idx];
    let date = parse_event_timestamp(iso_ts)?;

    debug!(
        index = idx,
        cdf_value = cdf[idx],
        timestamp = %iso_ts,
        %date,
        "median sample selected"
    );

    Ok(date)
}

/// Index of the first value with the smallest distance to `target`.
/// Later samples only win when strictly closer.
pub fn closest_index(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.iter().enumerate() {
        let dist = (v - target).abs();
        match best {
            // ties keep the earlier index; JSON numbers are never NaN
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Parse an ISO-8601 timestamp from `continuous_range` into its calendar date.
///
/// A trailing `Z` is rewritten to `+00:00` first. The date is taken in the
/// timestamp's own offset; time of day and offset are then dropped.
pub fn parse_event_timestamp(raw: &str) -> Result<NaiveDate, SchemaError> {
    let trimmed = raw.trim();
    let normalized = match trimmed.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Ok(dt.date_naive());
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Ok(dt.date());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return Ok(d);
    }

    Err(SchemaError::InvalidTimestamp {
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot(range: &[&str], cdf: &[f64]) -> Value {
        json!({
            "question": {
                "scaling": { "continuous_range": range },
                "aggregations": {
                    "recency_weighted": { "latest": { "forecast_values": cdf } }
                }
            }
        })
    }

    #[test]
    fn test_exact_median_sample() {
        let raw = snapshot(
            &[
                "2030-01-01T00:00:00Z",
                "2031-01-01T00:00:00Z",
                "2032-01-01T00:00:00Z",
            ],
            &[0.1, 0.5, 0.9],
        );
        assert_eq!(extract_median_date(&raw).unwrap(), ymd(2031, 1, 1));
    }

    #[test]
    fn test_equidistant_samples_pick_first() {
        assert_eq!(closest_index(&[0.2, 0.4, 0.6], 0.5), Some(1));

        let raw = snapshot(
            &[
                "2030-01-01T00:00:00Z",
                "2031-06-15T00:00:00Z",
                "2032-01-01T00:00:00Z",
            ],
            &[0.2, 0.4, 0.6],
        );
        assert_eq!(extract_median_date(&raw).unwrap(), ymd(2031, 6, 15));
    }

    #[test]
    fn test_flat_cdf_returns_index_zero() {
        assert_eq!(closest_index(&[0.5, 0.5, 0.5, 0.5], 0.5), Some(0));
    }

    #[test]
    fn test_no_exact_match_still_returns_closest() {
        assert_eq!(closest_index(&[0.0, 0.1, 0.3, 0.46, 0.7, 1.0], 0.5), Some(3));
        assert_eq!(closest_index(&[0.9, 0.95, 1.0], 0.5), Some(0));
        assert_eq!(closest_index(&[], 0.5), None);
    }

    #[test]
    fn test_non_monotonic_cdf_uses_closest_value() {
        // not a valid CDF; selection still runs on raw distances
        assert_eq!(closest_index(&[0.1, 0.8, 0.52, 0.49, 0.3], 0.5), Some(3));
    }

    #[test]
    fn test_length_mismatch_is_schema_error() {
        let raw = snapshot(
            &["2030-01-01T00:00:00Z", "2031-01-01T00:00:00Z"],
            &[0.1, 0.5, 0.9],
        );
        match extract_median_date(&raw) {
            Err(TrackerError::Schema(SchemaError::LengthMismatch { range_len, cdf_len })) => {
                assert_eq!((range_len, cdf_len), (2, 3));
            }
            other => panic!("expected length mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_distribution() {
        let raw = snapshot(&[], &[]);
        assert!(matches!(
            extract_median_date(&raw),
            Err(TrackerError::Schema(SchemaError::EmptyDistribution))
        ));
    }

    #[test]
    fn test_missing_keys_are_schema_errors() {
        let raw = json!({ "question": { "scaling": { "continuous_range": [] } } });
        assert!(matches!(
            extract_median_date(&raw),
            Err(TrackerError::Schema(SchemaError::Malformed(_)))
        ));
    }

    #[test]
    fn test_z_and_explicit_utc_offset_agree() {
        let z = parse_event_timestamp("2033-07-04T18:30:00Z").unwrap();
        let offset = parse_event_timestamp("2033-07-04T18:30:00+00:00").unwrap();
        assert_eq!(z, offset);
        assert_eq!(z, ymd(2033, 7, 4));
    }

    #[test]
    fn test_fractional_seconds_and_naive_forms() {
        assert_eq!(
            parse_event_timestamp("2040-02-29T23:59:59.123456Z").unwrap(),
            ymd(2040, 2, 29)
        );
        assert_eq!(
            parse_event_timestamp("2040-03-01T06:00:00").unwrap(),
            ymd(2040, 3, 1)
        );
        assert_eq!(parse_event_timestamp("2040-03-02").unwrap(), ymd(2040, 3, 2));
    }

    #[test]
    fn test_minute_precision_forms() {
        let d = ymd(2030, 1, 1);
        assert_eq!(parse_event_timestamp("2030-01-01T00:00Z").unwrap(), d);
        assert_eq!(parse_event_timestamp("2030-01-01T00:00").unwrap(), d);
        assert_eq!(parse_event_timestamp("2030-01-01T23:30-05:00").unwrap(), d);
        assert_eq!(parse_event_timestamp("2030-01-01 12:00").unwrap(), d);
        assert_eq!(parse_event_timestamp("2030-01-01 12:00:00+00:00").unwrap(), d);
    }

    #[test]
    fn test_date_taken_in_own_offset() {
        // 23:00 at -05:00 is already the next day in UTC
        assert_eq!(
            parse_event_timestamp("2035-12-31T23:00:00-05:00").unwrap(),
            ymd(2035, 12, 31)
        );
    }

    #[test]
    fn test_invalid_timestamp() {
        let raw = snapshot(&["not-a-date"], &[0.5]);
        match extract_median_date(&raw) {
            Err(TrackerError::Schema(SchemaError::InvalidTimestamp { value })) => {
                assert_eq!(value, "not-a-date");
            }
            other => panic!("expected invalid timestamp, got {other:?}"),
        }
    }
}
