// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GDP series: `{ data: [["1947-01-01", 243.1], ...] }`.

use chrono::NaiveDate;
use serde_json::Value;
use vizdeck_core::{Dataset, Extra, Record, XValue};

use crate::{NormalizeError, decode, field};

/// Normalizes a quarterly GDP document into a time-indexed dataset.
///
/// Each record is keyed by its date string, positioned at UTC midnight of that date, and keeps
/// the literal date string in `extra["date"]`.
pub fn normalize_gdp(payload: &Value) -> Result<Dataset, NormalizeError> {
    let rows: Vec<(String, f64)> = decode(field(payload, "data")?, "data")?;

    let mut records = Vec::with_capacity(rows.len());
    for (row, (date, value)) in rows.into_iter().enumerate() {
        let millis = parse_date_millis(&date).ok_or_else(|| NormalizeError::InvalidDate {
            row,
            value: date.clone(),
        })?;
        records.push(
            Record::new(date.clone(), value, XValue::Time(millis))
                .with_extra("date", Extra::Text(date)),
        );
    }

    let dataset = Dataset::new(records)?;
    tracing::debug!(records = dataset.len(), "normalized GDP series");
    Ok(dataset)
}

/// Parses `YYYY-MM-DD` into epoch milliseconds at UTC midnight.
fn parse_date_millis(text: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keeps_order_and_literal_dates() {
        let ds = normalize_gdp(&json!({
            "data": [["1929-01-01", 1065.9], ["1930-01-01", 976.1]]
        }))
        .unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records()[0];
        assert_eq!(first.key, "1929-01-01");
        assert_eq!(first.extra_str("date"), Some("1929-01-01"));
        assert_eq!(first.x, XValue::Time(-1_293_840_000_000));
        assert_eq!(ds.records()[1].value, 976.1);
    }

    #[test]
    fn missing_data_field_is_reported() {
        let err = normalize_gdp(&json!({ "name": "GDP" })).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingField { field: "data" }));
    }

    #[test]
    fn malformed_rows_are_reported() {
        let err = normalize_gdp(&json!({ "data": [["1947-01-01"]] })).unwrap_err();
        assert!(matches!(err, NormalizeError::Shape { field: "data", .. }));

        let err = normalize_gdp(&json!({ "data": [["Q1 1947", 1.0]] })).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidDate { row: 0, .. }));
    }
}
