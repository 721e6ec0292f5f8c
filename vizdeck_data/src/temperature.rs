// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monthly temperature grids: `{ baseTemperature, monthlyVariance: [{year, month, variance}] }`.

use serde::Deserialize;
use serde_json::Value;
use vizdeck_core::{Dataset, Extra, Record, XValue};

use crate::{NormalizeError, decode, field};

#[derive(Debug, Deserialize)]
struct MonthlyVariance {
    year: i32,
    month: u32,
    variance: f64,
}

/// A normalized temperature grid.
#[derive(Clone, Debug, PartialEq)]
pub struct TemperatureDataset {
    /// The reference temperature the variances are relative to.
    pub base_temperature: f64,
    /// One record per `(year, month)`.
    ///
    /// `x` is the year, `value` is the absolute temperature (`base + variance`),
    /// `extra["month"]` is the 1-based month and `extra["variance"]` the raw variance.
    pub dataset: Dataset,
}

impl TemperatureDataset {
    /// Returns `(first_year, last_year)`, or `None` for an empty grid.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "x positions are built from i32 years"
    )]
    pub fn year_extent(&self) -> Option<(i32, i32)> {
        let (lo, hi) = self.dataset.x_extent()?;
        Some((lo as i32, hi as i32))
    }
}

/// Normalizes a monthly variance document.
pub fn normalize_temperature(payload: &Value) -> Result<TemperatureDataset, NormalizeError> {
    let base_temperature: f64 = decode(field(payload, "baseTemperature")?, "baseTemperature")?;
    let rows: Vec<MonthlyVariance> =
        decode(field(payload, "monthlyVariance")?, "monthlyVariance")?;

    let mut records = Vec::with_capacity(rows.len());
    for (row, r) in rows.into_iter().enumerate() {
        if !(1..=12).contains(&r.month) {
            return Err(NormalizeError::InvalidRow {
                row,
                reason: format!("month {} is outside 1..=12", r.month),
            });
        }
        records.push(
            Record::new(
                format!("{}-{:02}", r.year, r.month),
                base_temperature + r.variance,
                XValue::Ordinal(f64::from(r.year)),
            )
            .with_extra("month", Extra::Number(f64::from(r.month)))
            .with_extra("variance", Extra::Number(r.variance)),
        );
    }

    let dataset = Dataset::new(records)?;
    tracing::debug!(
        records = dataset.len(),
        base_temperature,
        "normalized temperature grid"
    );
    Ok(TemperatureDataset {
        base_temperature,
        dataset,
    })
}
