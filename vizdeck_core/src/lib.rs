// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core data model and mark scene for vizdeck widgets.
//!
//! This crate is deliberately small:
//! - **Data**: [`Dataset`] of [`Record`]s, [`Hierarchy`] trees and [`GeoFeature`]s joined
//!   against an [`AttributeTable`].
//! - **Marks**: stable-identity shapes ([`Mark`]) carrying geometry, paint and the `data-*`
//!   attributes external verifiers read.
//! - **Scene**: the current set of marks, rebuilt wholesale on every successful load and
//!   reported as [`MarkDiff`]s.
//!
//! Scales, layout and rendering live downstream in `vizdeck_charts`.

mod geo;
mod hierarchy;
mod mark;
mod record;
mod scene;

pub use geo::{AttributeRow, AttributeTable, GeoFeature, Polygon, Ring};
pub use hierarchy::{Hierarchy, HierarchyError, HierarchyNode};
pub use mark::{
    DataAttr, DataAttrName, Mark, MarkBuilder, MarkId, MarkKind, MarkShape, Stroke, TextAnchor,
    TextBaseline, TextShape, TextSpan,
};
pub use record::{Dataset, DatasetError, Extra, Record, XValue};
pub use scene::{MarkDiff, Scene};
