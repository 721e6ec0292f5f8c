// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Legend mark generation.
//!
//! - [`LegendSwatchesSpec`]: categorical swatches + labels, laid out row-major or
//!   column-major into a fixed number of columns.
//! - [`QuantizeLegendSpec`]: one swatch per bucket of a [`ScaleQuantize`], with threshold
//!   ticks, so legend boundaries are exactly the color boundaries of the data marks.
//!
//! All legend marks share the `legend` group id; swatches carry the `legend-item` class.

use std::sync::Arc;

use kurbo::{BezPath, Point, Rect};
use peniko::color::palette::css;
use peniko::{Brush, Color};
use vizdeck_core::{Mark, MarkId, MarkShape, TextAnchor, TextBaseline, TextShape};

use crate::color::ScaleQuantize;
use crate::format::format_tick_with_step;
use crate::layout::Size;
use crate::measure::{TextMeasurer, text_bounds};
use crate::z_order;

/// Element id shared by all legend marks.
pub const LEGEND_GROUP: &str = "legend";

/// Offset of label ids from a legend's id base.
const LABEL_IDS: u64 = 0x4000_0000;
/// Offset of threshold tick ids from a legend's id base.
const TICK_IDS: u64 = 0x8000_0000;

/// A legend row item.
#[derive(Clone, Debug)]
pub struct LegendItem {
    /// The label string shown next to the swatch.
    pub label: String,
    /// The swatch fill paint.
    pub fill: Brush,
}

impl LegendItem {
    /// Convenience constructor for a solid-color swatch.
    pub fn solid(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            fill: Brush::Solid(color),
        }
    }
}

/// The order in which items fill the legend grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LegendFlow {
    /// Left-to-right, then top-to-bottom.
    #[default]
    RowMajor,
    /// Top-to-bottom, then left-to-right.
    ColumnMajor,
}

/// A positioned categorical legend.
#[derive(Clone, Debug)]
pub struct LegendSwatches {
    spec: LegendSwatchesSpec,
    /// Legend origin (top-left).
    pub x: f64,
    /// Legend origin (top-left).
    pub y: f64,
}

impl LegendSwatches {
    fn cell(&self, i: usize) -> (usize, usize) {
        let s = &self.spec;
        let columns = s.columns.max(1);
        match s.flow {
            LegendFlow::RowMajor => (i / columns, i % columns),
            LegendFlow::ColumnMajor => {
                let rows = s.items.len().div_ceil(columns).max(1);
                (i % rows, i / rows)
            }
        }
    }

    /// Generate legend marks (swatch rect + label text per item).
    pub fn marks(&self) -> Vec<Mark> {
        let s = &self.spec;
        let mut out = Vec::with_capacity(s.items.len() * 2);
        let row_height = s.swatch_size.max(s.font_size);

        for (i, item) in s.items.iter().enumerate() {
            let (row, col) = self.cell(i);
            let x = self.x + col as f64 * (s.column_width + s.column_gap);
            let y = self.y + row as f64 * (row_height + s.row_gap);
            let swatch_y = y + (row_height - s.swatch_size) * 0.5;

            out.push(
                Mark::builder(MarkId::for_row(s.id_base, i as u64))
                    .rect(Rect::new(x, swatch_y, x + s.swatch_size, swatch_y + s.swatch_size))
                    .z_index(z_order::LEGEND_SWATCHES)
                    .fill(item.fill.clone())
                    .group(LEGEND_GROUP)
                    .class("legend-item")
                    .build(),
            );

            let mut label = TextShape::new(
                Point::new(x + s.swatch_size + s.label_dx, y + row_height * 0.5),
                item.label.clone(),
            );
            label.font_size = s.font_size;
            label.anchor = TextAnchor::Start;
            label.baseline = TextBaseline::Middle;
            out.push(
                Mark::builder(MarkId::for_row(s.id_base + LABEL_IDS, i as u64))
                    .text(label)
                    .z_index(z_order::LEGEND_LABELS)
                    .fill(s.text_fill.clone())
                    .group(LEGEND_GROUP)
                    .class("legend-label")
                    .build(),
            );
        }
        out
    }

    /// Estimates legend bounds using the provided text measurer.
    pub fn bounds(&self, measurer: &impl TextMeasurer) -> Rect {
        self.marks()
            .iter()
            .filter_map(|m| match &m.shape {
                MarkShape::Text(t) => Some(text_bounds(
                    t.pos.x,
                    t.pos.y,
                    measurer.measure(&t.text, t.font_size),
                    t.anchor,
                    t.baseline,
                )),
                _ => m.bounds(),
            })
            .reduce(|a, b| a.union(b))
            .unwrap_or_else(|| Rect::new(self.x, self.y, self.x, self.y))
    }
}

/// An unpositioned categorical legend.
///
/// Measure with [`LegendSwatchesSpec::measure`], then place with [`LegendSwatchesSpec::at`].
#[derive(Clone, Debug)]
pub struct LegendSwatchesSpec {
    /// Stable-id base; swatch `i` uses `id_base + i`, its label `id_base + 0x4000_0000 + i`.
    pub id_base: u64,
    /// Swatch square size.
    pub swatch_size: f64,
    /// Vertical gap between rows.
    pub row_gap: f64,
    /// Horizontal gap between swatch and label.
    pub label_dx: f64,
    /// Number of columns.
    pub columns: usize,
    /// Width of one column (swatch + label).
    pub column_width: f64,
    /// Horizontal gap between columns.
    pub column_gap: f64,
    /// Fill order.
    pub flow: LegendFlow,
    /// Label font size.
    pub font_size: f64,
    /// Label color.
    pub text_fill: Brush,
    /// Items in display order.
    pub items: Vec<LegendItem>,
}

impl LegendSwatchesSpec {
    /// Creates a single-column, row-major legend with 10px swatches.
    pub fn new(id_base: u64, items: Vec<LegendItem>) -> Self {
        Self {
            id_base,
            swatch_size: 10.0,
            row_gap: 6.0,
            label_dx: 6.0,
            columns: 1,
            column_width: 120.0,
            column_gap: 0.0,
            flow: LegendFlow::default(),
            font_size: 10.0,
            text_fill: css::BLACK.into(),
            items,
        }
    }

    /// Set the label font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the swatch size.
    pub fn with_swatch_size(mut self, swatch_size: f64) -> Self {
        self.swatch_size = swatch_size;
        self
    }

    /// Set the vertical gap between rows.
    pub fn with_row_gap(mut self, row_gap: f64) -> Self {
        self.row_gap = row_gap;
        self
    }

    /// Set the gap between swatch and label.
    pub fn with_label_dx(mut self, label_dx: f64) -> Self {
        self.label_dx = label_dx;
        self
    }

    /// Sets the number of columns and the width of each.
    pub fn with_columns(mut self, columns: usize, column_width: f64) -> Self {
        self.columns = columns.max(1);
        self.column_width = column_width.max(0.0);
        self
    }

    /// Sets the fill order.
    pub fn with_flow(mut self, flow: LegendFlow) -> Self {
        self.flow = flow;
        self
    }

    /// Measures the desired legend size.
    pub fn measure(&self, measurer: &impl TextMeasurer) -> Size {
        let b = self.at(0.0, 0.0).bounds(measurer);
        Size::new(b.width(), b.height())
    }

    /// Creates a positioned legend at the given origin.
    pub fn at(&self, x: f64, y: f64) -> LegendSwatches {
        LegendSwatches {
            spec: self.clone(),
            x,
            y,
        }
    }

    /// Generates marks for this legend at the given origin.
    pub fn marks(&self, x: f64, y: f64) -> Vec<Mark> {
        self.at(x, y).marks()
    }
}

/// One bucket of a quantized legend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantizeLegendItem {
    /// Bucket bounds in data units.
    pub range: (f64, f64),
    /// Bucket color.
    pub color: Color,
    /// Horizontal pixel span, relative to the legend origin.
    pub span: (f64, f64),
}

/// A horizontal legend for a [`ScaleQuantize`].
#[derive(Clone)]
pub struct QuantizeLegendSpec {
    /// Stable-id base; swatch `i` uses `id_base + i`, threshold labels
    /// `id_base + 0x4000_0000 + i` and threshold ticks `id_base + 0x8000_0000 + i`.
    pub id_base: u64,
    /// Total legend width.
    pub width: f64,
    /// Swatch height.
    pub swatch_height: f64,
    /// Threshold tick length.
    pub tick_size: f64,
    /// Label font size.
    pub font_size: f64,
    /// Label and tick color.
    pub text_fill: Brush,
    /// Optional threshold label formatter.
    pub label_formatter: Option<Arc<dyn Fn(f64) -> String>>,
}

impl core::fmt::Debug for QuantizeLegendSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QuantizeLegendSpec")
            .field("id_base", &self.id_base)
            .field("width", &self.width)
            .field("swatch_height", &self.swatch_height)
            .field("tick_size", &self.tick_size)
            .field("font_size", &self.font_size)
            .field("text_fill", &self.text_fill)
            .field("label_formatter", &self.label_formatter.is_some())
            .finish()
    }
}

impl QuantizeLegendSpec {
    /// Creates a legend of the given total width with 20px swatches.
    pub fn new(id_base: u64, width: f64) -> Self {
        Self {
            id_base,
            width,
            swatch_height: 20.0,
            tick_size: 6.0,
            font_size: 10.0,
            text_fill: css::BLACK.into(),
            label_formatter: None,
        }
    }

    /// Sets the swatch height.
    pub fn with_swatch_height(mut self, height: f64) -> Self {
        self.swatch_height = height;
        self
    }

    /// Sets the threshold label formatter.
    pub fn with_label_formatter(mut self, f: impl Fn(f64) -> String + 'static) -> Self {
        self.label_formatter = Some(Arc::new(f));
        self
    }

    /// Returns one item per bucket of `scale`, derived from its bucket bounds.
    pub fn items(&self, scale: &ScaleQuantize) -> Vec<QuantizeLegendItem> {
        let n = scale.steps() as f64;
        let step = self.width / n;
        scale
            .bucket_bounds()
            .into_iter()
            .zip(scale.colors())
            .enumerate()
            .map(|(i, (range, &color))| QuantizeLegendItem {
                range,
                color,
                span: (step * i as f64, step * (i + 1) as f64),
            })
            .collect()
    }

    fn format(&self, v: f64, step: f64) -> String {
        match &self.label_formatter {
            Some(f) => f(v),
            None => format_tick_with_step(v, step),
        }
    }

    /// Generates swatches, threshold ticks and labels with the top-left corner at `origin`.
    pub fn marks(&self, scale: &ScaleQuantize, origin: Point) -> Vec<Mark> {
        let items = self.items(scale);
        let (lo, hi) = scale.domain();
        let step = (hi - lo) / scale.steps() as f64;
        let mut out = Vec::with_capacity(items.len() * 3 + 2);

        for (i, item) in items.iter().enumerate() {
            let rect = Rect::new(
                origin.x + item.span.0,
                origin.y,
                origin.x + item.span.1,
                origin.y + self.swatch_height,
            );
            out.push(
                Mark::builder(MarkId::for_row(self.id_base, i as u64))
                    .rect(rect)
                    .z_index(z_order::LEGEND_SWATCHES)
                    .fill(item.color)
                    .group(LEGEND_GROUP)
                    .class("legend-item")
                    .build(),
            );
        }

        let y = origin.y + self.swatch_height;
        for (i, v) in scale.thresholds().into_iter().enumerate() {
            let x = origin.x + self.width * i as f64 / scale.steps() as f64;
            let mut tick = BezPath::new();
            tick.move_to((x, y));
            tick.line_to((x, y + self.tick_size));
            out.push(
                Mark::builder(MarkId::for_row(self.id_base + TICK_IDS, i as u64))
                    .path(tick)
                    .z_index(z_order::LEGEND_LABELS)
                    .fill(Brush::default())
                    .stroke(self.text_fill.clone(), 1.0)
                    .group(LEGEND_GROUP)
                    .class("tick")
                    .build(),
            );

            let mut label = TextShape::new(Point::new(x, y + self.tick_size + 3.0), self.format(v, step));
            label.font_size = self.font_size;
            label.anchor = TextAnchor::Middle;
            label.baseline = TextBaseline::Hanging;
            out.push(
                Mark::builder(MarkId::for_row(self.id_base + LABEL_IDS, i as u64))
                    .text(label)
                    .z_index(z_order::LEGEND_LABELS)
                    .fill(self.text_fill.clone())
                    .group(LEGEND_GROUP)
                    .class("tick")
                    .build(),
            );
        }
        out
    }
}
