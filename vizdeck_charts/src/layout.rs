// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plot sizing shared by the widgets.

use kurbo::{Rect, Vec2};
use serde::Deserialize;

/// A width/height pair used by chart layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Size {
    /// Width in chart coordinate units.
    pub width: f64,
    /// Height in chart coordinate units.
    pub height: f64,
}

impl Size {
    /// Creates a size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Space reserved around the plot area for axes, titles and legends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margin {
    /// Space above the plot.
    pub top: f64,
    /// Space right of the plot.
    pub right: f64,
    /// Space below the plot.
    pub bottom: f64,
    /// Space left of the plot.
    pub left: f64,
}

impl Margin {
    /// Creates a margin.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The translation applied to plot-space marks.
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    /// The full view rectangle around a plot of `plot` size.
    pub fn view(&self, plot: Size) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.left + plot.width + self.right,
            self.top + plot.height + self.bottom,
        )
    }
}
