// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Choropleth region generation.

use kurbo::{BezPath, Vec2};
use peniko::Color;
use vizdeck_core::{AttributeRow, AttributeTable, DataAttrName, GeoFeature, Mark, MarkId};

use crate::axis::StrokeStyle;
use crate::color::ScaleQuantize;
use crate::format::format_number;

/// Builds a closed path over every ring of `feature`. Coordinates are used as-is.
pub fn feature_path(feature: &GeoFeature) -> BezPath {
    let mut path = BezPath::new();
    for ring in feature.polygons().iter().flat_map(|p| p.rings.iter()) {
        let mut points = ring.iter().copied();
        let Some(first) = points.next() else {
            continue;
        };
        path.move_to(first);
        for p in points {
            path.line_to(p);
        }
        path.close_path();
    }
    path
}

/// One `county` path per feature, colored by the joined attribute row.
///
/// Features without a row use `fallback_fill` and report `fallback_value`.
#[derive(Clone, Debug)]
pub struct GeoMarkSpec {
    /// Stable-id base; feature `i` uses `id_base + i`.
    pub id_base: u64,
    /// Value to color mapping.
    pub color: ScaleQuantize,
    /// Fill used on a join miss.
    pub fallback_fill: Color,
    /// Value reported on a join miss.
    pub fallback_value: f64,
    /// Optional region outline.
    pub stroke: Option<StrokeStyle>,
    /// Translation applied to every region.
    pub offset: Vec2,
    /// Rendering order hint.
    pub z_index: i32,
}

impl GeoMarkSpec {
    /// Creates a spec with a gray fallback, fallback value `0` and no stroke.
    pub fn new(id_base: u64, color: ScaleQuantize) -> Self {
        Self {
            id_base,
            color,
            fallback_fill: Color::from_rgba8(0xcc, 0xcc, 0xcc, 0xff),
            fallback_value: 0.0,
            stroke: None,
            offset: Vec2::ZERO,
            z_index: crate::z_order::SERIES_FILL,
        }
    }

    /// Sets the join-miss fill and value.
    pub fn with_fallback(mut self, fill: Color, value: f64) -> Self {
        self.fallback_fill = fill;
        self.fallback_value = value;
        self
    }

    /// Sets the region outline.
    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = Some(stroke);
        self
    }

    /// Sets the translation applied to every region.
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Returns the `(fill, reported value)` for an optional joined row.
    pub fn resolve(&self, row: Option<&AttributeRow>) -> (Color, f64) {
        match row {
            Some(r) => (self.color.map(r.value), r.value),
            None => (self.fallback_fill, self.fallback_value),
        }
    }

    /// Generates one mark per feature, in feature order.
    pub fn marks(&self, features: &[GeoFeature], table: &AttributeTable) -> Vec<Mark> {
        features
            .iter()
            .enumerate()
            .map(|(i, feature)| {
                let row = table.get(feature.id());
                if row.is_none() {
                    tracing::debug!(fips = feature.id(), "no attribute row, using fallback fill");
                }
                let (fill, value) = self.resolve(row);
                let mut builder = Mark::builder(MarkId::for_row(self.id_base, i as u64))
                    .path(feature_path(feature))
                    .z_index(self.z_index)
                    .fill(fill)
                    .offset(self.offset)
                    .class("county")
                    .attr(DataAttrName::Fips, feature.id().to_string())
                    .attr(DataAttrName::Education, format_number(value))
                    .datum(i);
                if let Some(stroke) = &self.stroke {
                    builder = builder.stroke(stroke.brush.clone(), stroke.stroke_width);
                }
                builder.build()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;
    use peniko::Brush;
    use vizdeck_core::Polygon;

    use super::*;
    use crate::color::{ColorRamp, palettes, to_hex};

    fn square(id: u32, x: f64) -> GeoFeature {
        GeoFeature::new(
            id,
            vec![Polygon {
                rings: vec![vec![
                    Point::new(x, 0.0),
                    Point::new(x + 10.0, 0.0),
                    Point::new(x + 10.0, 10.0),
                    Point::new(x, 10.0),
                ]],
            }],
        )
    }

    #[test]
    fn join_miss_uses_fallback_fill_and_value() {
        let mut table = AttributeTable::new();
        table.insert(AttributeRow {
            fips: 1001,
            state: "AL".into(),
            area_name: "Autauga County".into(),
            value: 24.6,
        });
        let ramp = ColorRamp::from_css(&palettes::GREENS).unwrap();
        let spec = GeoMarkSpec::new(0, ScaleQuantize::new((2.6, 75.1), 9, &ramp));
        let marks = spec.marks(&[square(1001, 0.0), square(9999, 20.0)], &table);

        assert_eq!(marks[0].attr(DataAttrName::Education), Some("24.6"));
        assert_eq!(marks[1].attr(DataAttrName::Fips), Some("9999"));
        assert_eq!(marks[1].attr(DataAttrName::Education), Some("0"));
        let Brush::Solid(fill) = marks[1].fill else {
            panic!("expected a solid fill");
        };
        assert_eq!(to_hex(fill), "#cccccc");
    }

    #[test]
    fn path_closes_every_ring() {
        let path = feature_path(&square(1, 0.0));
        assert_eq!(path.elements().len(), 5);
        assert_eq!(path.elements()[4], kurbo::PathEl::ClosePath);
        assert!(feature_path(&GeoFeature::new(2, Vec::new())).elements().is_empty());
    }
}
