// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rooted value trees (tree map input).

/// A node of a [`Hierarchy`].
///
/// Leaves carry their own value; internal nodes carry the sum of their children once the
/// node is placed in a [`Hierarchy`].
#[derive(Clone, Debug, PartialEq)]
pub struct HierarchyNode {
    /// Path id: ancestor names joined with `.` (assigned by [`Hierarchy::new`]).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional category (usually only set on leaves).
    pub category: Option<String>,
    /// Leaf value, or aggregated sum for internal nodes.
    pub value: f64,
    /// Depth from the root (root is `0`).
    pub depth: usize,
    /// Child nodes.
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Creates a leaf node.
    pub fn leaf(name: impl Into<String>, category: Option<String>, value: f64) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            category,
            value,
            depth: 0,
            children: Vec::new(),
        }
    }

    /// Creates an internal node. Its value is computed by [`Hierarchy::new`].
    pub fn branch(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            category: None,
            value: 0.0,
            depth: 0,
            children,
        }
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the leaves under this node in pre-order.
    pub fn leaves(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Self>) {
        if self.is_leaf() {
            out.push(self);
            return;
        }
        for c in &self.children {
            c.collect_leaves(out);
        }
    }

    fn assign_ids(&mut self, parent: Option<&str>, depth: usize) {
        self.id = match parent {
            Some(p) => format!("{p}.{}", self.name),
            None => self.name.clone(),
        };
        self.depth = depth;
        let id = self.id.clone();
        for c in &mut self.children {
            c.assign_ids(Some(&id), depth + 1);
        }
    }

    fn validate(&self) -> Result<(), HierarchyError> {
        if self.is_leaf() {
            if !(self.value.is_finite() && self.value > 0.0) {
                return Err(HierarchyError::NonPositiveLeaf {
                    id: self.id.clone(),
                    value: self.value,
                });
            }
            return Ok(());
        }
        self.children.iter().try_for_each(Self::validate)
    }

    fn sum(&mut self) -> f64 {
        if !self.is_leaf() {
            self.value = self.children.iter_mut().map(Self::sum).sum();
        }
        self.value
    }

    fn sort_descending(&mut self) {
        // `sort_by` is stable, so equal values keep input order.
        self.children.sort_by(|a, b| b.value.total_cmp(&a.value));
        for c in &mut self.children {
            c.sort_descending();
        }
    }
}

/// Errors returned when building a [`Hierarchy`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HierarchyError {
    /// A leaf value was zero, negative or non-finite.
    #[error("leaf `{id}` has a non-positive value ({value})")]
    NonPositiveLeaf {
        /// Path id of the offending leaf.
        id: String,
        /// The rejected value.
        value: f64,
    },
}

/// A validated tree with path ids, bottom-up sums and children sorted by descending value.
#[derive(Clone, Debug, PartialEq)]
pub struct Hierarchy {
    root: HierarchyNode,
}

impl Hierarchy {
    /// Assigns ids, validates leaves, sums internal nodes and sorts children.
    pub fn new(mut root: HierarchyNode) -> Result<Self, HierarchyError> {
        root.assign_ids(None, 0);
        root.validate()?;
        root.sum();
        root.sort_descending();
        Ok(Self { root })
    }

    /// Returns the root node.
    pub fn root(&self) -> &HierarchyNode {
        &self.root
    }

    /// Returns the root total (sum of all leaves).
    pub fn total(&self) -> f64 {
        self.root.value
    }

    /// Returns all leaves in pre-order (after sorting).
    pub fn leaves(&self) -> Vec<&HierarchyNode> {
        self.root.leaves()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HierarchyNode {
        HierarchyNode::branch(
            "Movies",
            vec![
                HierarchyNode::branch(
                    "Action",
                    vec![
                        HierarchyNode::leaf("Avatar", Some("Action".into()), 760.5),
                        HierarchyNode::leaf("Jurassic World", Some("Action".into()), 652.2),
                    ],
                ),
                HierarchyNode::branch(
                    "Drama",
                    vec![HierarchyNode::leaf("Titanic", Some("Drama".into()), 1658.8)],
                ),
            ],
        )
    }

    #[test]
    fn sums_bottom_up_and_sorts_descending() {
        let h = Hierarchy::new(sample()).unwrap();
        assert!((h.total() - (760.5 + 652.2 + 1658.8)).abs() < 1e-9);
        let root = h.root();
        assert_eq!(root.children[0].name, "Drama", "largest child first");
        assert!((root.children[1].value - (760.5 + 652.2)).abs() < 1e-9);
    }

    #[test]
    fn assigns_path_ids_and_depths() {
        let h = Hierarchy::new(sample()).unwrap();
        let ids: Vec<_> = h.leaves().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(
            ids,
            ["Movies.Drama.Titanic", "Movies.Action.Avatar", "Movies.Action.Jurassic World"]
        );
        assert!(h.leaves().iter().all(|l| l.depth == 2));
    }

    #[test]
    fn rejects_non_positive_leaves() {
        let root = HierarchyNode::branch("Root", vec![HierarchyNode::leaf("Zero", None, 0.0)]);
        let err = Hierarchy::new(root).expect_err("zero leaf must be rejected");
        assert_eq!(
            err,
            HierarchyError::NonPositiveLeaf {
                id: "Root.Zero".into(),
                value: 0.0
            }
        );
    }
}
