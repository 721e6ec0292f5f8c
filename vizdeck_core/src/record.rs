// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat datasets (bar chart and heat map input).

use hashbrown::HashMap;

/// Position of a record along the x dimension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum XValue {
    /// A timestamp in milliseconds since the Unix epoch (UTC).
    Time(i64),
    /// An ordinal or numeric position (e.g. a year).
    Ordinal(f64),
}

impl XValue {
    /// Returns the value as `f64` for use with continuous scales.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Time(ms) => ms as f64,
            Self::Ordinal(v) => v,
        }
    }
}

/// An auxiliary field carried alongside a record.
#[derive(Clone, Debug, PartialEq)]
pub enum Extra {
    /// A numeric field.
    Number(f64),
    /// A text field (kept verbatim, e.g. the source date string).
    Text(String),
}

/// One normalized datum.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Stable key, unique within a dataset.
    pub key: String,
    /// Optional category label.
    pub category: Option<String>,
    /// The measured value. Always finite inside a [`Dataset`].
    pub value: f64,
    /// Position along x.
    pub x: XValue,
    /// Auxiliary fields.
    pub extra: HashMap<String, Extra>,
}

impl Record {
    /// Creates a record without category or extra fields.
    pub fn new(key: impl Into<String>, value: f64, x: XValue) -> Self {
        Self {
            key: key.into(),
            category: None,
            value,
            x,
            extra: HashMap::new(),
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Adds an auxiliary field.
    pub fn with_extra(mut self, name: impl Into<String>, value: Extra) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    /// Returns a numeric auxiliary field.
    pub fn extra_f64(&self, name: &str) -> Option<f64> {
        match self.extra.get(name)? {
            Extra::Number(v) => Some(*v),
            Extra::Text(_) => None,
        }
    }

    /// Returns a text auxiliary field.
    pub fn extra_str(&self, name: &str) -> Option<&str> {
        match self.extra.get(name)? {
            Extra::Text(s) => Some(s),
            Extra::Number(_) => None,
        }
    }
}

/// Errors returned when assembling a [`Dataset`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    /// A record value was NaN or infinite.
    #[error("record `{key}` has a non-finite value ({value})")]
    NonFiniteValue {
        /// Key of the offending record.
        key: String,
        /// The rejected value.
        value: f64,
    },
    /// A record x position was NaN or infinite.
    #[error("record `{key}` has a non-finite x position")]
    NonFiniteX {
        /// Key of the offending record.
        key: String,
    },
}

/// An ordered sequence of records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Builds a dataset, rejecting non-finite values and positions.
    pub fn new(records: Vec<Record>) -> Result<Self, DatasetError> {
        for r in &records {
            if !r.value.is_finite() {
                return Err(DatasetError::NonFiniteValue {
                    key: r.key.clone(),
                    value: r.value,
                });
            }
            if !r.x.as_f64().is_finite() {
                return Err(DatasetError::NonFiniteX { key: r.key.clone() });
            }
        }
        Ok(Self { records })
    }

    /// Returns the records in input order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `(min, max)` over record values, or `None` when empty.
    pub fn value_extent(&self) -> Option<(f64, f64)> {
        extent(self.records.iter().map(|r| r.value))
    }

    /// Returns `(min, max)` over record x positions, or `None` when empty.
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(self.records.iter().map(|r| r.x.as_f64()))
    }
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_finite_values() {
        let err = Dataset::new(vec![Record::new("a", f64::NAN, XValue::Ordinal(0.0))])
            .expect_err("NaN must be rejected");
        assert!(matches!(err, DatasetError::NonFiniteValue { .. }));
    }

    #[test]
    fn extents_cover_all_records() {
        let ds = Dataset::new(vec![
            Record::new("a", 3.0, XValue::Ordinal(1753.0)),
            Record::new("b", -1.5, XValue::Ordinal(2015.0)),
            Record::new("c", 7.25, XValue::Ordinal(1800.0)),
        ])
        .unwrap();
        assert_eq!(ds.value_extent(), Some((-1.5, 7.25)));
        assert_eq!(ds.x_extent(), Some((1753.0, 2015.0)));
        assert_eq!(Dataset::default().value_extent(), None);
    }

    #[test]
    fn extra_accessors_check_the_variant() {
        let r = Record::new("1947-01-01", 243.1, XValue::Time(0))
            .with_extra("date", Extra::Text("1947-01-01".into()))
            .with_extra("month", Extra::Number(1.0));
        assert_eq!(r.extra_str("date"), Some("1947-01-01"));
        assert_eq!(r.extra_f64("date"), None);
        assert_eq!(r.extra_f64("month"), Some(1.0));
    }
}
