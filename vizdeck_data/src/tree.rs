// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested value trees: `{ name, children: [...] }` with `{ name, category, value }` leaves.

use serde::Deserialize;
use serde_json::Value;
use vizdeck_core::{Hierarchy, HierarchyNode};

use crate::{NormalizeError, decode, field};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawNode {
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    value: Option<NumberLike>,
    #[serde(default)]
    children: Option<Vec<RawNode>>,
}

impl RawNode {
    /// Converts to a core node, pruning leaves without a positive value.
    fn into_node(self) -> Result<Option<HierarchyNode>, NormalizeError> {
        match self.children {
            Some(children) if !children.is_empty() => {
                let mut kept = Vec::with_capacity(children.len());
                for c in children {
                    if let Some(node) = c.into_node()? {
                        kept.push(node);
                    }
                }
                if kept.is_empty() {
                    tracing::warn!(name = %self.name, "dropping branch without positive leaves");
                    return Ok(None);
                }
                Ok(Some(HierarchyNode::branch(self.name, kept)))
            }
            _ => {
                let value = leaf_value(&self.name, self.value)?;
                if !(value.is_finite() && value > 0.0) {
                    tracing::warn!(name = %self.name, value, "dropping non-positive leaf");
                    return Ok(None);
                }
                Ok(Some(HierarchyNode::leaf(self.name, self.category, value)))
            }
        }
    }
}

fn leaf_value(name: &str, value: Option<NumberLike>) -> Result<f64, NormalizeError> {
    match value {
        Some(NumberLike::Number(v)) => Ok(v),
        Some(NumberLike::Text(text)) => {
            text.trim()
                .parse()
                .map_err(|_| NormalizeError::InvalidLeaf {
                    name: name.to_owned(),
                    reason: format!("value `{text}` is not a number"),
                })
        }
        None => Err(NormalizeError::InvalidLeaf {
            name: name.to_owned(),
            reason: "missing value".into(),
        }),
    }
}

/// Normalizes a nested tree document.
///
/// Leaf values may be JSON numbers or numeric strings. Leaves whose value is not positive are
/// dropped (with a warning), as are branches left without leaves. The result has path ids,
/// bottom-up sums and children sorted by descending value.
pub fn normalize_hierarchy(payload: &Value) -> Result<Hierarchy, NormalizeError> {
    field(payload, "name")?;
    let raw: RawNode = decode(payload, "children")?;
    let root = raw.into_node()?.ok_or(NormalizeError::EmptyHierarchy)?;
    let hierarchy = Hierarchy::new(root)?;
    tracing::debug!(
        leaves = hierarchy.leaves().len(),
        total = hierarchy.total(),
        "normalized hierarchy"
    );
    Ok(hierarchy)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_values_are_parsed_and_summed() {
        let h = normalize_hierarchy(&json!({
            "name": "Video Game Sales Data Top 100",
            "children": [
                {"name": "Wii", "children": [
                    {"name": "Wii Sports", "category": "Wii", "value": "82.53"},
                    {"name": "Mario Kart Wii", "category": "Wii", "value": "35.52"}
                ]},
                {"name": "NES", "children": [
                    {"name": "Super Mario Bros.", "category": "NES", "value": 40.24}
                ]}
            ]
        }))
        .unwrap();
        assert!((h.total() - (82.53 + 35.52 + 40.24)).abs() < 1e-9);
        let leaves = h.leaves();
        assert_eq!(leaves[0].id, "Video Game Sales Data Top 100.Wii.Wii Sports");
        assert_eq!(leaves[0].category.as_deref(), Some("Wii"));
    }

    #[test]
    fn non_positive_leaves_and_empty_branches_are_pruned() {
        let h = normalize_hierarchy(&json!({
            "name": "Kickstarter",
            "children": [
                {"name": "Games", "children": [
                    {"name": "Zero", "category": "Games", "value": 0},
                    {"name": "Pebble", "category": "Games", "value": 20338986}
                ]},
                {"name": "Empty", "children": [
                    {"name": "Refunded", "category": "Empty", "value": "-5"}
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(h.root().children.len(), 1);
        assert_eq!(h.leaves().len(), 1);
    }

    #[test]
    fn malformed_trees_are_reported() {
        let err = normalize_hierarchy(&json!({"children": []})).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingField { field: "name" }));

        let err = normalize_hierarchy(&json!({
            "name": "Root",
            "children": [{"name": "Leaf", "value": "lots"}]
        }))
        .unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidLeaf { .. }));

        let err = normalize_hierarchy(&json!({
            "name": "Root",
            "children": [{"name": "Leaf", "value": 0}]
        }))
        .unwrap_err();
        assert!(matches!(err, NormalizeError::EmptyHierarchy));
    }
}
