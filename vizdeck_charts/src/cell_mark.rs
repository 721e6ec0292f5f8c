// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Heat map cell generation.

use kurbo::{Rect, Vec2};
use vizdeck_core::{DataAttrName, Dataset, Mark, MarkId};

use crate::color::ScaleQuantize;
use crate::format::format_number;
use crate::scale::{ScaleBand, ScaleLinear};

/// One `cell` rect per `(year, month)` record.
///
/// `x` comes from the year scale, `y` from the month band scale; every cell is `cell_width`
/// wide and one band tall, filled with the quantized color of its value.
#[derive(Clone, Debug)]
pub struct CellMarkSpec {
    /// Stable-id base; cell `i` uses `id_base + i`.
    pub id_base: u64,
    /// Year scale.
    pub x_scale: ScaleLinear,
    /// Month band scale (12 bands).
    pub band: ScaleBand,
    /// Width of one year slot.
    pub cell_width: f64,
    /// Value to color mapping.
    pub color: ScaleQuantize,
    /// Translation applied to every cell.
    pub offset: Vec2,
    /// Rendering order hint.
    pub z_index: i32,
}

impl CellMarkSpec {
    /// Creates a cell mark spec with no offset.
    pub fn new(
        id_base: u64,
        x_scale: ScaleLinear,
        band: ScaleBand,
        cell_width: f64,
        color: ScaleQuantize,
    ) -> Self {
        Self {
            id_base,
            x_scale,
            band,
            cell_width,
            color,
            offset: Vec2::ZERO,
            z_index: crate::z_order::SERIES_FILL,
        }
    }

    /// Sets the translation applied to every cell.
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Returns the cell rectangle for a year and a 0-based month index.
    pub fn cell_rect(&self, year: f64, month_index: usize) -> Rect {
        let x = self.x_scale.map(year);
        let y = self.band.position(month_index);
        Rect::new(x, y, x + self.cell_width, y + self.band.band_width())
    }

    /// Generates one mark per record. Records without a valid `month` extra are skipped.
    pub fn marks(&self, dataset: &Dataset) -> Vec<Mark> {
        let mut out = Vec::with_capacity(dataset.len());
        for (i, r) in dataset.records().iter().enumerate() {
            let Some(month) = r.extra_f64("month").filter(|m| (1.0..=12.0).contains(m)) else {
                tracing::warn!(key = %r.key, "temperature record without a month");
                continue;
            };
            #[allow(clippy::cast_possible_truncation, reason = "checked to be within 1..=12")]
            let month_index = (month - 1.0) as usize;
            let year = r.x.as_f64();
            out.push(
                Mark::builder(MarkId::for_row(self.id_base, i as u64))
                    .rect(self.cell_rect(year, month_index))
                    .z_index(self.z_index)
                    .fill(self.color.map(r.value))
                    .offset(self.offset)
                    .class("cell")
                    .attr(DataAttrName::Month, month_index.to_string())
                    .attr(DataAttrName::Year, format_number(year))
                    .attr(DataAttrName::Temp, format_number(r.value))
                    .datum(i)
                    .build(),
            );
        }
        out
    }
}
