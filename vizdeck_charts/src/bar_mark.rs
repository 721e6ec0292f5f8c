// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bar mark generation.

use kurbo::{Rect, Vec2};
use peniko::Brush;
use vizdeck_core::{DataAttrName, Dataset, Mark, MarkId, Record};

use crate::format::format_number;
use crate::scale::{LinearPair, ScaleTime};

/// Vertical bars over a time axis: one `bar` rect per record.
///
/// Bars sit on the plot baseline; the record's x maps through `x_scale` and its value through
/// `y.forward`. Marks carry `data-date` and `data-gdp` and are bound to their record index.
#[derive(Clone, Debug)]
pub struct BarMarkSpec {
    /// Stable-id base; bar `i` uses `id_base + i`.
    pub id_base: u64,
    /// Scale for bar positions along x.
    pub x_scale: ScaleTime,
    /// Scales for bar heights.
    pub y: LinearPair,
    /// Fixed slot width per bar.
    pub bar_width: f64,
    /// Plot height (the baseline y coordinate).
    pub plot_height: f64,
    /// Translation applied to every bar (margin offset).
    pub offset: Vec2,
    /// Fill paint for bars.
    pub fill: Brush,
    /// Rendering order hint.
    pub z_index: i32,
}

impl BarMarkSpec {
    /// Creates a bar mark spec with no offset and a default fill.
    pub fn new(
        id_base: u64,
        x_scale: ScaleTime,
        y: LinearPair,
        bar_width: f64,
        plot_height: f64,
    ) -> Self {
        Self {
            id_base,
            x_scale,
            y,
            bar_width,
            plot_height,
            offset: Vec2::ZERO,
            fill: Brush::default(),
            z_index: crate::z_order::SERIES_FILL,
        }
    }

    /// Sets the fill paint.
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets the translation applied to every bar.
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Returns the bar rectangle for `record`, in plot coordinates.
    pub fn bar_rect(&self, record: &Record) -> Rect {
        let x = self.x_scale.map(record.x.as_f64());
        let top = self.plot_height - self.y.forward.map(record.value);
        Rect::new(
            x,
            top.min(self.plot_height),
            x + self.bar_width,
            top.max(self.plot_height),
        )
    }

    /// Generates one mark per record, in record order.
    pub fn marks(&self, dataset: &Dataset) -> Vec<Mark> {
        dataset
            .records()
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let date = r.extra_str("date").unwrap_or(&r.key);
                Mark::builder(MarkId::for_row(self.id_base, i as u64))
                    .rect(self.bar_rect(r))
                    .z_index(self.z_index)
                    .fill(self.fill.clone())
                    .offset(self.offset)
                    .class("bar")
                    .attr(DataAttrName::Date, date)
                    .attr(DataAttrName::Gdp, format_number(r.value))
                    .datum(i)
                    .build()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use vizdeck_core::{Extra, XValue};

    use super::*;

    #[test]
    fn bars_stand_on_the_baseline() {
        let ds = Dataset::new(vec![
            Record::new("a", 50.0, XValue::Time(0))
                .with_extra("date", Extra::Text("1970-01-01".into())),
            Record::new("b", 100.0, XValue::Time(1000)),
        ])
        .unwrap();
        let spec = BarMarkSpec::new(
            0,
            ScaleTime::new((0.0, 1000.0), (0.0, 500.0)),
            LinearPair::from_max(100.0, 200.0),
            250.0,
            200.0,
        )
        .with_offset(Vec2::new(60.0, 50.0));
        let marks = spec.marks(&ds);
        assert_eq!(marks.len(), 2);
        assert_eq!(
            marks[0].shape,
            vizdeck_core::MarkShape::Rect(Rect::new(0.0, 100.0, 250.0, 200.0))
        );
        assert_eq!(marks[0].attr(DataAttrName::Date), Some("1970-01-01"));
        assert_eq!(marks[1].attr(DataAttrName::Date), Some("b"), "falls back to the key");
        assert_eq!(marks[1].attr(DataAttrName::Gdp), Some("100"));
        assert_eq!(
            marks[1].screen_rect(),
            Some(Rect::new(560.0, 50.0, 810.0, 250.0))
        );
    }
}
