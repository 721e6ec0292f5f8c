// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement hooks for guide layout.
//!
//! Text shaping happens in the browser, so guides accept a measurer for rough bounds
//! estimation (legend extents, SVG view boxes).

use kurbo::Rect;
use vizdeck_core::{TextAnchor, TextBaseline};

/// A minimal text measurement interface used by guide generators.
pub trait TextMeasurer {
    /// Returns `(width, height)` in the same coordinate system as the marks.
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);
}

/// A heuristic measurer assuming an average glyph width of ~0.6em and a height of 1em.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        let width = 0.6 * font_size * text.chars().count() as f64;
        (width, font_size)
    }
}

/// Places a measured text box relative to its anchor point.
pub(crate) fn text_bounds(
    x: f64,
    y: f64,
    size: (f64, f64),
    anchor: TextAnchor,
    baseline: TextBaseline,
) -> Rect {
    let (w, h) = size;
    let (x0, x1) = match anchor {
        TextAnchor::Start => (x, x + w),
        TextAnchor::Middle => (x - w * 0.5, x + w * 0.5),
        TextAnchor::End => (x - w, x),
    };
    let (y0, y1) = match baseline {
        TextBaseline::Middle => (y - h * 0.5, y + h * 0.5),
        TextBaseline::Alphabetic | TextBaseline::Ideographic => (y - h, y),
        TextBaseline::Hanging => (y, y + h),
    };
    Rect::new(x0, y0, x1, y1)
}
