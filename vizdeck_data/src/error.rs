// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use vizdeck_core::{DatasetError, HierarchyError};

/// Errors returned by the normalizers.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// A required field is absent (or `null`).
    #[error("missing field `{field}`")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// A field is present but does not have the expected shape.
    #[error("field `{field}` has an unexpected shape: {source}")]
    Shape {
        /// Name of the malformed field.
        field: &'static str,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// A date string could not be parsed.
    #[error("row {row}: invalid date `{value}`")]
    InvalidDate {
        /// Row index.
        row: usize,
        /// The rejected text.
        value: String,
    },
    /// A row is structurally valid but semantically out of range.
    #[error("row {row}: {reason}")]
    InvalidRow {
        /// Row index.
        row: usize,
        /// What was wrong.
        reason: String,
    },
    /// A tree leaf has no usable value.
    #[error("leaf `{name}`: {reason}")]
    InvalidLeaf {
        /// Leaf name.
        name: String,
        /// What was wrong.
        reason: String,
    },
    /// Nothing with a positive value survived normalization.
    #[error("hierarchy has no positive leaves")]
    EmptyHierarchy,
    /// A named topology object is absent.
    #[error("topology has no object named `{name}`")]
    MissingObject {
        /// Requested object name.
        name: String,
    },
    /// A geometry references an arc that does not exist.
    #[error("arc index {index} is out of range ({len} arcs)")]
    ArcOutOfRange {
        /// The (possibly negative) arc reference.
        index: i64,
        /// Number of arcs in the topology.
        len: usize,
    },
    /// Record-level invariant violation.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// Tree-level invariant violation.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}
