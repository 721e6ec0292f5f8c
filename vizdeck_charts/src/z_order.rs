// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order conventions for widget-generated marks.
//!
//! Marks carry an explicit `z_index`; renderers sort by it and keep insertion order for ties.

/// Filled series marks (bars, cells, counties, tiles).
pub const SERIES_FILL: i32 = 0;
/// Labels drawn on top of series marks (tile labels).
pub const SERIES_LABELS: i32 = 20;

/// Axis domain line and tick marks.
pub const AXIS_RULES: i32 = 30;
/// Axis tick labels.
pub const AXIS_LABELS: i32 = 40;
/// Axis title labels.
pub const AXIS_TITLES: i32 = 50;

/// Legend swatches.
pub const LEGEND_SWATCHES: i32 = 60;
/// Legend labels and tick marks.
pub const LEGEND_LABELS: i32 = 70;
/// Widget title and description.
pub const TITLES: i32 = 80;
