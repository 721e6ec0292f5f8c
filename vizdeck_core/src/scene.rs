// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The retained set of marks for one widget.

use hashbrown::HashMap;
use kurbo::Rect;
use peniko::Brush;

use crate::mark::{Mark, MarkId, MarkKind};

/// A change to the retained mark set.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkDiff {
    /// A mark was added.
    Enter {
        /// Mark id.
        id: MarkId,
        /// Mark kind.
        kind: MarkKind,
        /// Render order of the new mark.
        z_index: i32,
        /// The new mark.
        new: Box<Mark>,
    },
    /// A mark was removed.
    Exit {
        /// Mark id.
        id: MarkId,
        /// Mark kind.
        kind: MarkKind,
        /// Bounds of the removed mark, if known.
        bounds: Option<Rect>,
    },
}

/// The current marks of a widget.
///
/// Every rebuild discards all existing marks before adding the new set: geometry is never
/// patched in place, so a reload can never leave residual shapes behind.
#[derive(Debug, Default)]
pub struct Scene {
    marks: Vec<Mark>,
    index: HashMap<MarkId, usize>,
    revision: u64,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all marks.
    ///
    /// Returns one `Exit` per previous mark followed by one `Enter` per new mark. If `marks`
    /// repeats an id, the later mark wins.
    pub fn rebuild(&mut self, marks: impl IntoIterator<Item = Mark>) -> Vec<MarkDiff> {
        let mut diffs = self.clear();
        for mark in marks {
            match self.index.get(&mark.id) {
                Some(&slot) => self.marks[slot] = mark,
                None => {
                    self.index.insert(mark.id, self.marks.len());
                    self.marks.push(mark);
                }
            }
        }
        diffs.extend(self.marks.iter().map(|m| MarkDiff::Enter {
            id: m.id,
            kind: m.kind(),
            z_index: m.z_index,
            new: Box::new(m.clone()),
        }));
        self.revision += 1;
        diffs
    }

    /// Removes all marks, returning an `Exit` diff per removed mark.
    pub fn clear(&mut self) -> Vec<MarkDiff> {
        let diffs = self
            .marks
            .drain(..)
            .map(|m| MarkDiff::Exit {
                id: m.id,
                kind: m.kind(),
                bounds: m.bounds(),
            })
            .collect();
        self.index.clear();
        diffs
    }

    /// Looks up a mark by id.
    pub fn get(&self, id: MarkId) -> Option<&Mark> {
        self.index.get(&id).map(|&i| &self.marks[i])
    }

    /// Replaces the fill of a mark in place. Returns `false` if no mark has that id.
    ///
    /// Paint changes do not count as a rebuild and leave the revision untouched.
    pub fn set_fill(&mut self, id: MarkId, fill: impl Into<Brush>) -> bool {
        match self.index.get(&id) {
            Some(&i) => {
                self.marks[i].fill = fill.into();
                true
            }
            None => false,
        }
    }

    /// Returns marks in insertion order.
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Returns marks sorted by z-index; ties keep insertion order.
    pub fn marks_in_paint_order(&self) -> Vec<&Mark> {
        let mut out: Vec<&Mark> = self.marks.iter().collect();
        out.sort_by_key(|m| m.z_index);
        out
    }

    /// Returns the number of marks.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Returns `true` if there are no marks.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Number of completed rebuilds.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
