// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pre-projected geographic features and the attribute table they join against.

use hashbrown::HashMap;
use kurbo::{Point, Rect};

/// A closed ring of pre-projected points.
pub type Ring = Vec<Point>;

/// A polygon: the first ring is the exterior, the rest are holes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    /// Rings in source order.
    pub rings: Vec<Ring>,
}

/// An immutable polygon/multipolygon with its join identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoFeature {
    id: u32,
    polygons: Vec<Polygon>,
}

impl GeoFeature {
    /// Creates a feature from its identifier (FIPS code) and polygons.
    pub fn new(id: u32, polygons: Vec<Polygon>) -> Self {
        Self { id, polygons }
    }

    /// Returns the join identifier.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the polygons of this feature.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Returns the bounding box over all rings, or `None` for an empty feature.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self
            .polygons
            .iter()
            .flat_map(|p| p.rings.iter())
            .flat_map(|r| r.iter().copied());
        let first = points.next()?;
        Some(points.fold(Rect::from_points(first, first), |r, p| r.union_pt(p)))
    }
}

/// One row of the attribute table.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeRow {
    /// Join identifier (FIPS code).
    pub fips: u32,
    /// State abbreviation.
    pub state: String,
    /// Human-readable area name.
    pub area_name: String,
    /// The bound statistic (e.g. percentage with a bachelor's degree or higher).
    pub value: f64,
}

/// Attribute rows keyed by identifier. At most one row per identifier.
#[derive(Clone, Debug, Default)]
pub struct AttributeTable {
    rows: HashMap<u32, AttributeRow>,
}

impl AttributeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row. Returns `false` (and keeps the existing row) on a duplicate identifier.
    pub fn insert(&mut self, row: AttributeRow) -> bool {
        match self.rows.entry(row.fips) {
            hashbrown::hash_map::Entry::Occupied(_) => false,
            hashbrown::hash_map::Entry::Vacant(v) => {
                v.insert(row);
                true
            }
        }
    }

    /// Looks up the row for `fips`.
    pub fn get(&self, fips: u32) -> Option<&AttributeRow> {
        self.rows.get(&fips)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns `(min, max)` over finite row values.
    pub fn value_extent(&self) -> Option<(f64, f64)> {
        self.rows
            .values()
            .map(|r| r.value)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
