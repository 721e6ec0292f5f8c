// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis mark generation.
//!
//! An [`AxisSpec`] generates the domain line, ticks, tick labels and optional title of one
//! axis. Marks are emitted in axis-local coordinates (the domain line sits on `y = 0` for a
//! bottom axis and on `x = 0` for a left axis) and share a group element id (`x-axis`,
//! `y-axis`) plus a translation that places the axis next to the plot.

use std::sync::Arc;

use kurbo::{BezPath, Point, Vec2};
use peniko::Brush;
use peniko::color::palette::css;
use vizdeck_core::{Mark, MarkId, TextAnchor, TextBaseline, TextShape};

use crate::format::format_tick_with_step;
use crate::scale::{ScaleBand, ScaleLinear, ScaleTime, tick_step};
use crate::time::format_year;
use crate::z_order;

/// A paint + width pair for stroked paths (domain lines, ticks).
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke paint.
    pub brush: Brush,
    /// Stroke width in scene coordinates.
    pub stroke_width: f64,
}

impl StrokeStyle {
    /// Convenience for a solid stroke.
    pub fn solid(brush: impl Into<Brush>, stroke_width: f64) -> Self {
        Self {
            brush: brush.into(),
            stroke_width,
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::solid(css::BLACK, 1.0)
    }
}

/// Axis styling defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisStyle {
    /// Style for the axis domain line and tick marks.
    pub rule: StrokeStyle,
    /// Fill paint for tick labels.
    pub label_fill: Brush,
    /// Font size for tick labels.
    pub label_font_size: f64,
    /// Fill paint for the axis title.
    pub title_fill: Brush,
    /// Font size for the axis title.
    pub title_font_size: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        let rule = StrokeStyle::default();
        Self {
            rule: rule.clone(),
            label_fill: rule.brush.clone(),
            label_font_size: 10.0,
            title_fill: rule.brush,
            title_font_size: 12.0,
        }
    }
}

/// Axis orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisOrient {
    /// A horizontal axis below the plot area.
    Bottom,
    /// A vertical axis left of the plot area.
    Left,
}

/// The scale an axis reads its ticks from.
#[derive(Clone, Debug, PartialEq)]
pub enum AxisScale {
    /// Continuous linear ticks.
    Linear(ScaleLinear),
    /// Calendar-year ticks over epoch milliseconds.
    Time(ScaleTime),
    /// One tick per band, centered, labelled from `labels`.
    Band {
        /// The band scale.
        scale: ScaleBand,
        /// Label per band index.
        labels: Vec<String>,
    },
}

/// One resolved tick.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisTick {
    /// Tick value in domain units (band index for band scales).
    pub value: f64,
    /// Tick position along the axis, in axis-local coordinates.
    pub position: f64,
    /// Formatted label.
    pub label: String,
}

/// Offset of tick ids from an axis's id base.
const TICK_IDS: u64 = 0x4000_0000;
/// Offset of tick label ids from an axis's id base.
const LABEL_IDS: u64 = 0x8000_0000;
/// Offset of the axis title id.
const TITLE_ID: u64 = 1;

/// An axis specification.
#[derive(Clone)]
pub struct AxisSpec {
    /// Stable-id base: the domain line uses `id_base`, tick `i` `id_base + 0x4000_0000 + i`,
    /// its label `id_base + 0x8000_0000 + i` and the title `id_base + 1`.
    pub id_base: u64,
    /// Element id of the axis group.
    pub element_id: String,
    /// The axis scale.
    pub scale: AxisScale,
    /// Axis placement relative to the plot.
    pub orient: AxisOrient,
    /// Approximate number of ticks (continuous scales only).
    pub tick_count: usize,
    /// Tick line length.
    pub tick_size: f64,
    /// Padding between the tick end and the tick label.
    pub tick_padding: f64,
    /// Axis styling.
    pub style: AxisStyle,
    /// Optional axis title text.
    pub title: Option<String>,
    /// Distance from the domain line to the title.
    pub title_offset: f64,
    /// Translation applied to every axis mark.
    pub offset: Vec2,
    /// Optional tick label formatter, called with `(value, step)`.
    pub tick_formatter: Option<Arc<dyn Fn(f64, f64) -> String>>,
}

impl core::fmt::Debug for AxisSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AxisSpec")
            .field("id_base", &self.id_base)
            .field("element_id", &self.element_id)
            .field("scale", &self.scale)
            .field("orient", &self.orient)
            .field("tick_count", &self.tick_count)
            .field("tick_size", &self.tick_size)
            .field("tick_padding", &self.tick_padding)
            .field("style", &self.style)
            .field("title", &self.title)
            .field("title_offset", &self.title_offset)
            .field("offset", &self.offset)
            .field("tick_formatter", &self.tick_formatter.is_some())
            .finish()
    }
}

impl AxisSpec {
    /// Creates a new axis with `tick_count = 10`, `tick_size = 6` and `tick_padding = 3`.
    pub fn new(
        id_base: u64,
        element_id: impl Into<String>,
        scale: AxisScale,
        orient: AxisOrient,
    ) -> Self {
        Self {
            id_base,
            element_id: element_id.into(),
            scale,
            orient,
            tick_count: 10,
            tick_size: 6.0,
            tick_padding: 3.0,
            style: AxisStyle::default(),
            title: None,
            title_offset: 40.0,
            offset: Vec2::ZERO,
            tick_formatter: None,
        }
    }

    /// Convenience constructor for a `bottom` axis.
    pub fn bottom(id_base: u64, element_id: impl Into<String>, scale: AxisScale) -> Self {
        Self::new(id_base, element_id, scale, AxisOrient::Bottom)
    }

    /// Convenience constructor for a `left` axis.
    pub fn left(id_base: u64, element_id: impl Into<String>, scale: AxisScale) -> Self {
        Self::new(id_base, element_id, scale, AxisOrient::Left)
    }

    /// Set the approximate tick count.
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count;
        self
    }

    /// Set tick size in scene coordinates.
    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Set tick padding in scene coordinates.
    pub fn with_tick_padding(mut self, tick_padding: f64) -> Self {
        self.tick_padding = tick_padding;
        self
    }

    /// Set the axis style.
    pub fn with_style(mut self, style: AxisStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the axis title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the title distance from the domain line.
    pub fn with_title_offset(mut self, title_offset: f64) -> Self {
        self.title_offset = title_offset;
        self
    }

    /// Set the translation applied to every axis mark.
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Set a custom tick label formatter.
    pub fn with_tick_formatter(mut self, f: impl Fn(f64, f64) -> String + 'static) -> Self {
        self.tick_formatter = Some(Arc::new(f));
        self
    }

    fn format_tick(&self, v: f64, step: f64) -> String {
        match &self.tick_formatter {
            Some(f) => (f)(v, step),
            None => match self.scale {
                AxisScale::Time(_) => format_year(v),
                _ => format_tick_with_step(v, step),
            },
        }
    }

    fn range(&self) -> (f64, f64) {
        let (a, b) = match &self.scale {
            AxisScale::Linear(s) => s.range(),
            AxisScale::Time(s) => s.range(),
            AxisScale::Band { scale, .. } => scale.range(),
        };
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Resolves tick values, positions and labels.
    pub fn ticks(&self) -> Vec<AxisTick> {
        match &self.scale {
            AxisScale::Linear(s) => {
                let values = s.ticks(self.tick_count);
                let step = tick_step(&values);
                values
                    .into_iter()
                    .map(|v| AxisTick {
                        value: v,
                        position: s.map(v),
                        label: self.format_tick(v, step),
                    })
                    .collect()
            }
            AxisScale::Time(s) => {
                let values = s.ticks(self.tick_count);
                let step = tick_step(&values);
                values
                    .into_iter()
                    .map(|v| AxisTick {
                        value: v,
                        position: s.map(v),
                        label: self.format_tick(v, step),
                    })
                    .collect()
            }
            AxisScale::Band { scale, labels } => {
                let half = 0.5 * scale.band_width();
                (0..scale.count())
                    .map(|i| AxisTick {
                        value: i as f64,
                        position: scale.position(i) + half,
                        label: labels.get(i).cloned().unwrap_or_else(|| i.to_string()),
                    })
                    .collect()
            }
        }
    }

    /// Generates axis marks.
    pub fn marks(&self) -> Vec<Mark> {
        let (r0, r1) = self.range();
        let size = self.tick_size.abs();
        let label_gap = size + self.tick_padding.max(0.0);
        let mut out = Vec::new();

        let mut domain = BezPath::new();
        match self.orient {
            AxisOrient::Bottom => {
                domain.move_to((r0, 0.0));
                domain.line_to((r1, 0.0));
            }
            AxisOrient::Left => {
                domain.move_to((0.0, r0));
                domain.line_to((0.0, r1));
            }
        }
        out.push(self.rule_mark(MarkId::from_raw(self.id_base), domain, "domain"));

        for (i, tick) in self.ticks().into_iter().enumerate() {
            let p = tick.position;
            let mut line = BezPath::new();
            let (pos, anchor, baseline) = match self.orient {
                AxisOrient::Bottom => {
                    line.move_to((p, 0.0));
                    line.line_to((p, size));
                    (
                        Point::new(p, label_gap),
                        TextAnchor::Middle,
                        TextBaseline::Hanging,
                    )
                }
                AxisOrient::Left => {
                    line.move_to((-size, p));
                    line.line_to((0.0, p));
                    (
                        Point::new(-label_gap, p),
                        TextAnchor::End,
                        TextBaseline::Middle,
                    )
                }
            };
            out.push(self.rule_mark(
                MarkId::for_row(self.id_base + TICK_IDS, i as u64),
                line,
                "tick",
            ));

            let mut text = TextShape::new(pos, tick.label);
            text.font_size = self.style.label_font_size;
            text.anchor = anchor;
            text.baseline = baseline;
            out.push(
                Mark::builder(MarkId::for_row(self.id_base + LABEL_IDS, i as u64))
                    .text(text)
                    .z_index(z_order::AXIS_LABELS)
                    .fill(self.style.label_fill.clone())
                    .offset(self.offset)
                    .group(self.element_id.clone())
                    .class("tick")
                    .build(),
            );
        }

        if let Some(title) = &self.title {
            let mid = 0.5 * (r0 + r1);
            let mut text = match self.orient {
                AxisOrient::Bottom => TextShape::new(Point::new(mid, self.title_offset), title),
                AxisOrient::Left => {
                    let mut t = TextShape::new(Point::new(-self.title_offset, mid), title);
                    t.angle = -90.0;
                    t
                }
            };
            text.font_size = self.style.title_font_size;
            text.anchor = TextAnchor::Middle;
            text.baseline = TextBaseline::Middle;
            out.push(
                Mark::builder(MarkId::from_raw(self.id_base + TITLE_ID))
                    .text(text)
                    .z_index(z_order::AXIS_TITLES)
                    .fill(self.style.title_fill.clone())
                    .offset(self.offset)
                    .group(self.element_id.clone())
                    .class("axis-title")
                    .build(),
            );
        }

        out
    }

    fn rule_mark(&self, id: MarkId, path: BezPath, class: &str) -> Mark {
        Mark::builder(id)
            .path(path)
            .z_index(z_order::AXIS_RULES)
            .fill(Brush::default())
            .stroke(self.style.rule.brush.clone(), self.style.rule.stroke_width)
            .offset(self.offset)
            .group(self.element_id.clone())
            .class(class)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use vizdeck_core::MarkShape;

    use super::*;
    use crate::time::year_start_millis;

    fn labels(marks: &[Mark]) -> Vec<String> {
        marks
            .iter()
            .filter_map(|m| match &m.shape {
                MarkShape::Text(t) if m.class.as_deref() == Some("tick") => Some(t.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn every_mark_belongs_to_the_axis_group() {
        let axis = AxisSpec::left(
            1,
            "y-axis",
            AxisScale::Linear(ScaleLinear::new((0.0, 100.0), (500.0, 0.0))),
        )
        .with_title("Gross Domestic Product")
        .with_offset(Vec2::new(60.0, 50.0));
        let marks = axis.marks();
        assert!(marks.iter().all(|m| m.group.as_deref() == Some("y-axis")));
        assert!(marks.iter().all(|m| m.offset == Vec2::new(60.0, 50.0)));
        assert_eq!(labels(&marks).first().map(String::as_str), Some("0"));
        assert_eq!(labels(&marks).last().map(String::as_str), Some("100"));
    }

    #[test]
    fn reversed_linear_axis_puts_zero_at_the_bottom() {
        let axis = AxisSpec::left(
            1,
            "y-axis",
            AxisScale::Linear(ScaleLinear::new((0.0, 100.0), (500.0, 0.0))),
        );
        let ticks = axis.ticks();
        assert_eq!(ticks[0].position, 500.0);
        assert_eq!(ticks.last().map(|t| t.position), Some(0.0));
    }

    #[test]
    fn time_axis_labels_years() {
        let lo = year_start_millis(1947).unwrap() as f64;
        let hi = year_start_millis(2015).unwrap() as f64;
        let axis = AxisSpec::bottom(1, "x-axis", AxisScale::Time(ScaleTime::new((lo, hi), (0.0, 1000.0))));
        let marks = axis.marks();
        let l = labels(&marks);
        assert_eq!(l.first().map(String::as_str), Some("1950"));
        assert_eq!(l.last().map(String::as_str), Some("2010"));
    }

    #[test]
    fn band_axis_centers_labels() {
        let axis = AxisSpec::left(
            1,
            "y-axis",
            AxisScale::Band {
                scale: ScaleBand::new((0.0, 120.0), 12),
                labels: vec!["January".into(), "February".into()],
            },
        );
        let ticks = axis.ticks();
        assert_eq!(ticks.len(), 12);
        assert_eq!(ticks[0].position, 5.0);
        assert_eq!(ticks[1].label, "February");
        assert_eq!(ticks[11].label, "11", "missing labels fall back to the index");
    }

    #[test]
    fn custom_formatter_overrides_defaults() {
        let axis = AxisSpec::bottom(
            1,
            "x-axis",
            AxisScale::Linear(ScaleLinear::new((1753.0, 2016.0), (0.0, 1000.0))),
        )
        .with_tick_formatter(|v, _| format!("Y{v}"));
        assert!(axis.ticks().iter().all(|t| t.label.starts_with('Y')));
    }
}
