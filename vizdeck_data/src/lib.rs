// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dataset normalizers for vizdeck widgets.
//!
//! Each normalizer takes a decoded JSON document (`serde_json::Value`) and produces one of the
//! `vizdeck_core` data shapes:
//! - [`normalize_gdp`]: `{ data: [[date, number], ...] }` into a time-indexed [`Dataset`].
//! - [`normalize_temperature`]: monthly variance grids into a year-indexed [`Dataset`].
//! - [`decode_topology`] + [`normalize_education`]: TopoJSON features and the attribute table
//!   they join against.
//! - [`normalize_hierarchy`]: nested `{ name, children, value, category }` trees.
//!
//! Normalizers never panic on malformed input; they return a [`NormalizeError`] describing
//! the first problem found.
//!
//! [`Dataset`]: vizdeck_core::Dataset

mod education;
mod error;
mod gdp;
mod temperature;
mod topology;
mod tree;

pub use education::normalize_education;
pub use error::NormalizeError;
pub use gdp::normalize_gdp;
pub use temperature::{TemperatureDataset, normalize_temperature};
pub use topology::decode_topology;
pub use tree::normalize_hierarchy;

use serde::Deserialize;
use serde_json::Value;

/// Looks up a required top-level field.
fn field<'a>(payload: &'a Value, name: &'static str) -> Result<&'a Value, NormalizeError> {
    payload
        .get(name)
        .filter(|v| !v.is_null())
        .ok_or(NormalizeError::MissingField { field: name })
}

/// Deserializes a borrowed JSON value, attributing failures to `name`.
fn decode<'a, T>(value: &'a Value, name: &'static str) -> Result<T, NormalizeError>
where
    T: Deserialize<'a>,
{
    T::deserialize(value).map_err(|source| NormalizeError::Shape {
        field: name,
        source,
    })
}
