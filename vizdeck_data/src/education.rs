// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! County attribute rows: `[{fips, state, area_name, bachelorsOrHigher}, ...]`.

use serde::Deserialize;
use serde_json::Value;
use vizdeck_core::{AttributeRow, AttributeTable};

use crate::{NormalizeError, decode};

#[derive(Debug, Deserialize)]
struct EducationRow {
    fips: u32,
    state: String,
    area_name: String,
    #[serde(rename = "bachelorsOrHigher")]
    bachelors_or_higher: f64,
}

/// Normalizes the education attribute array into a table keyed by FIPS code.
///
/// Duplicate FIPS codes keep the first row.
pub fn normalize_education(payload: &Value) -> Result<AttributeTable, NormalizeError> {
    if !payload.is_array() {
        return Err(NormalizeError::MissingField { field: "[]" });
    }
    let rows: Vec<EducationRow> = decode(payload, "[]")?;

    let mut table = AttributeTable::new();
    for row in rows {
        let fips = row.fips;
        let inserted = table.insert(AttributeRow {
            fips,
            state: row.state,
            area_name: row.area_name,
            value: row.bachelors_or_higher,
        });
        if !inserted {
            tracing::warn!(fips, "duplicate attribute row ignored");
        }
    }
    tracing::debug!(rows = table.len(), "normalized education table");
    Ok(table)
}
