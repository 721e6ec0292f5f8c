// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Treemap layout and tile generation.
//!
//! [`TreemapLayout`] recursively allocates a rectangle to each child of a [`Hierarchy`] node,
//! proportional to the child's summed value. Two tilings are provided:
//! - [`Tiling::Squarify`]: rows of children chosen to keep aspect ratios near the golden
//!   ratio (the same row-breaking rule as d3's `treemapSquarify`).
//! - [`Tiling::SliceDice`]: alternate horizontal and vertical splits by depth.
//!
//! Inner padding follows d3 semantics: each node's area is shrunk by half the padding on
//! every side, and children are tiled into the parent area grown by the same half padding,
//! so the gap between siblings is the full padding while the outer edge stays flush.

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::Deserialize;
use smallvec::SmallVec;
use vizdeck_core::{
    DataAttrName, Hierarchy, HierarchyNode, Mark, MarkId, TextShape, TextSpan,
};

use crate::color::ScaleOrdinal;
use crate::format::format_number;
use crate::z_order;

/// The golden ratio, used as the target aspect ratio of squarified rows.
const PHI: f64 = 1.618_033_988_749_895;

/// How children are arranged inside their parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tiling {
    /// Squarified rows (golden ratio).
    #[default]
    Squarify,
    /// Horizontal slices at odd depths, vertical dices at even depths.
    SliceDice,
}

/// A positioned leaf.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreemapTile<'a> {
    /// The leaf node.
    pub node: &'a HierarchyNode,
    /// The leaf rectangle `(x0, y0, x1, y1)`.
    pub rect: Rect,
}

/// Treemap layout parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreemapLayout {
    /// Width of the layout area.
    pub width: f64,
    /// Height of the layout area.
    pub height: f64,
    /// Gap between sibling tiles.
    pub padding_inner: f64,
    /// Tiling strategy.
    pub tiling: Tiling,
}

impl TreemapLayout {
    /// Creates a squarified layout of the given size, without padding.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            padding_inner: 0.0,
            tiling: Tiling::Squarify,
        }
    }

    /// Sets the gap between sibling tiles.
    pub fn with_padding_inner(mut self, padding: f64) -> Self {
        self.padding_inner = padding.max(0.0);
        self
    }

    /// Sets the tiling strategy.
    pub fn with_tiling(mut self, tiling: Tiling) -> Self {
        self.tiling = tiling;
        self
    }

    /// Lays out `hierarchy`, returning its leaves in pre-order with their rectangles.
    pub fn layout<'a>(&self, hierarchy: &'a Hierarchy) -> Vec<TreemapTile<'a>> {
        let mut out = Vec::new();
        self.position(
            hierarchy.root(),
            Rect::new(0.0, 0.0, self.width, self.height),
            0.0,
            &mut out,
        );
        out
    }

    fn position<'a>(
        &self,
        node: &'a HierarchyNode,
        rect: Rect,
        padding: f64,
        out: &mut Vec<TreemapTile<'a>>,
    ) {
        let rect = inset(rect, padding);
        if node.is_leaf() {
            out.push(TreemapTile { node, rect });
            return;
        }
        let half = 0.5 * self.padding_inner;
        let area = inset(rect, -half);
        let values: SmallVec<[f64; 16]> = node.children.iter().map(|c| c.value).collect();
        let rects = match self.tiling {
            Tiling::Squarify => squarify(&values, node.value, area),
            Tiling::SliceDice if node.depth % 2 == 1 => slice(&values, node.value, area),
            Tiling::SliceDice => dice(&values, node.value, area),
        };
        for (child, r) in node.children.iter().zip(rects) {
            self.position(child, r, half, out);
        }
    }
}

/// Shrinks (or grows, for negative `d`) a rectangle, collapsing inverted sides to their
/// midpoint.
fn inset(r: Rect, d: f64) -> Rect {
    let (mut x0, mut y0, mut x1, mut y1) = (r.x0 + d, r.y0 + d, r.x1 - d, r.y1 - d);
    if x1 < x0 {
        x0 = 0.5 * (x0 + x1);
        x1 = x0;
    }
    if y1 < y0 {
        y0 = 0.5 * (y0 + y1);
        y1 = y0;
    }
    Rect::new(x0, y0, x1, y1)
}

/// Splits `r` left-to-right proportionally to `values`.
fn dice(values: &[f64], total: f64, r: Rect) -> Vec<Rect> {
    let k = if total > 0.0 { r.width() / total } else { 0.0 };
    let mut x = r.x0;
    values
        .iter()
        .map(|v| {
            let x0 = x;
            x += v * k;
            Rect::new(x0, r.y0, x, r.y1)
        })
        .collect()
}

/// Splits `r` top-to-bottom proportionally to `values`.
fn slice(values: &[f64], total: f64, r: Rect) -> Vec<Rect> {
    let k = if total > 0.0 { r.height() / total } else { 0.0 };
    let mut y = r.y0;
    values
        .iter()
        .map(|v| {
            let y0 = y;
            y += v * k;
            Rect::new(r.x0, y0, r.x1, y)
        })
        .collect()
}

/// Squarified tiling of `values` (sorted descending) into `r`.
fn squarify(values: &[f64], total: f64, r: Rect) -> Vec<Rect> {
    let n = values.len();
    let mut out = Vec::with_capacity(n);
    let (mut x0, mut y0, x1, y1) = (r.x0, r.y0, r.x1, r.y1);
    let mut remaining = total;
    let mut i0 = 0;

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // The first non-empty value starts the row.
        let mut i1 = i0;
        let mut sum = 0.0;
        while i1 < n {
            sum = values[i1];
            i1 += 1;
            if sum != 0.0 {
                break;
            }
        }
        let mut min_value = sum;
        let mut max_value = sum;
        let alpha = (dy / dx).max(dx / dy) / (remaining * PHI);
        let mut beta = sum * sum * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        // Keep adding children while the worst aspect ratio improves.
        while i1 < n {
            let v = values[i1];
            sum += v;
            min_value = min_value.min(v);
            max_value = max_value.max(v);
            beta = sum * sum * alpha;
            let ratio = (max_value / beta).max(beta / min_value);
            if ratio > min_ratio {
                sum -= v;
                break;
            }
            min_ratio = ratio;
            i1 += 1;
        }

        let row = &values[i0..i1];
        if dx < dy {
            let y = if remaining > 0.0 { y0 + dy * sum / remaining } else { y1 };
            out.extend(dice(row, sum, Rect::new(x0, y0, x1, y)));
            y0 = y;
        } else {
            let x = if remaining > 0.0 { x0 + dx * sum / remaining } else { x1 };
            out.extend(slice(row, sum, Rect::new(x0, y0, x, y1)));
            x0 = x;
        }
        remaining -= sum;
        i0 = i1;
    }
    out
}

/// Splits a label into word-like fragments: a new fragment starts before every uppercase
/// ASCII letter that is followed by a character that is not an uppercase ASCII letter.
///
/// `"SuperMarioBros"` becomes `["Super", "Mario", "Bros"]` and `"NBA 2K"` becomes
/// `["NB", "A 2K"]`.
pub fn split_label(name: &str) -> SmallVec<[&str; 4]> {
    let mut out = SmallVec::new();
    let mut start = 0;
    let mut chars = name.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let Some(&(_, next)) = chars.peek() else {
            break;
        };
        if i > start && c.is_ascii_uppercase() && !next.is_ascii_uppercase() {
            out.push(&name[start..i]);
            start = i;
        }
    }
    if start < name.len() || out.is_empty() {
        out.push(&name[start..]);
    }
    out
}

/// Tile and label marks for a laid-out treemap.
#[derive(Clone, Debug)]
pub struct TileMarkSpec {
    /// Stable-id base; tile `i` uses `id_base + i`, its label `id_base + 1_000_000 + i`.
    pub id_base: u64,
    /// Category to color mapping.
    pub color: ScaleOrdinal,
    /// Fill for leaves without a known category.
    pub fallback_fill: Color,
    /// Label font size.
    pub label_font_size: f64,
    /// Chart origin; each tile is additionally translated to its own corner.
    pub offset: Vec2,
}

impl TileMarkSpec {
    /// Creates a tile spec with 10px labels.
    pub fn new(id_base: u64, color: ScaleOrdinal) -> Self {
        Self {
            id_base,
            color,
            fallback_fill: Color::from_rgba8(0xcc, 0xcc, 0xcc, 0xff),
            label_font_size: 10.0,
            offset: Vec2::ZERO,
        }
    }

    /// Sets the chart origin.
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Returns the fill of a leaf.
    pub fn fill_for(&self, node: &HierarchyNode) -> Color {
        node.category
            .as_deref()
            .and_then(|c| self.color.map(c))
            .unwrap_or(self.fallback_fill)
    }

    /// Generates a `tile` rect and a stacked label per leaf.
    pub fn marks(&self, tiles: &[TreemapTile<'_>]) -> Vec<Mark> {
        let mut out = Vec::with_capacity(tiles.len() * 2);
        for (i, tile) in tiles.iter().enumerate() {
            let node = tile.node;
            let corner = self.offset + tile.rect.origin().to_vec2();
            let size = tile.rect.size();
            out.push(
                Mark::builder(MarkId::for_row(self.id_base, i as u64))
                    .rect(Rect::from_origin_size(Point::ZERO, size))
                    .z_index(z_order::SERIES_FILL)
                    .fill(self.fill_for(node))
                    .offset(corner)
                    .element_id(node.id.clone())
                    .class("tile")
                    .attr(DataAttrName::Name, node.name.clone())
                    .attr(
                        DataAttrName::Category,
                        node.category.clone().unwrap_or_default(),
                    )
                    .attr(DataAttrName::Value, format_number(node.value))
                    .datum(i)
                    .build(),
            );

            let spans = split_label(&node.name)
                .into_iter()
                .enumerate()
                .map(|(line, text)| TextSpan {
                    pos: Point::new(3.0, 13.0 + 10.0 * line as f64),
                    text: text.to_string(),
                })
                .collect();
            let mut label = TextShape::lines(spans);
            label.font_size = self.label_font_size;
            out.push(
                Mark::builder(MarkId::for_row(self.id_base, 1_000_000 + i as u64))
                    .text(label)
                    .z_index(z_order::SERIES_LABELS)
                    .fill(Color::BLACK)
                    .offset(corner)
                    .class("tile-text")
                    .build(),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn games() -> Hierarchy {
        let leaf = |name: &str, cat: &str, v: f64| HierarchyNode::leaf(name, Some(cat.into()), v);
        Hierarchy::new(HierarchyNode::branch(
            "Video Game Sales Data Top 100",
            vec![
                HierarchyNode::branch(
                    "Wii",
                    vec![
                        leaf("Wii Sports", "Wii", 82.53),
                        leaf("Mario Kart Wii", "Wii", 35.52),
                        leaf("Wii Sports Resort", "Wii", 32.77),
                    ],
                ),
                HierarchyNode::branch(
                    "NES",
                    vec![
                        leaf("Super Mario Bros.", "NES", 40.24),
                        leaf("Duck Hunt", "NES", 28.31),
                    ],
                ),
                HierarchyNode::branch("GB", vec![leaf("Tetris", "GB", 30.26)]),
                HierarchyNode::branch(
                    "DS",
                    vec![
                        leaf("New Super Mario Bros.", "DS", 29.8),
                        leaf("Nintendogs", "DS", 24.67),
                        leaf("Mario Kart DS", "DS", 23.21),
                    ],
                ),
            ],
        ))
        .unwrap()
    }

    fn assert_partition(layout: TreemapLayout) {
        let h = games();
        let tiles = layout.layout(&h);
        let total_area = layout.width * layout.height;
        assert_eq!(tiles.len(), h.leaves().len());

        let area_sum: f64 = tiles.iter().map(|t| t.rect.area()).sum();
        assert!((area_sum - total_area).abs() < 1e-6, "tiles cover the whole area");

        for t in &tiles {
            let expected = total_area * t.node.value / h.total();
            assert!(
                (t.rect.area() - expected).abs() < 1e-6,
                "area of {} is proportional to its value",
                t.node.name
            );
            assert!(t.rect.x0 >= -1e-9 && t.rect.x1 <= layout.width + 1e-9);
            assert!(t.rect.y0 >= -1e-9 && t.rect.y1 <= layout.height + 1e-9);
        }
        for (i, a) in tiles.iter().enumerate() {
            for b in &tiles[i + 1..] {
                let overlap = a.rect.intersect(b.rect).area();
                assert!(overlap < 1e-6, "{} overlaps {}", a.node.name, b.node.name);
            }
        }
    }

    #[test]
    fn squarify_partitions_the_area() {
        assert_partition(TreemapLayout::new(960.0, 570.0));
    }

    #[test]
    fn slice_dice_partitions_the_area() {
        assert_partition(TreemapLayout::new(960.0, 570.0).with_tiling(Tiling::SliceDice));
    }

    #[test]
    fn slice_dice_alternates_direction() {
        let h = games();
        let tiles = TreemapLayout::new(100.0, 100.0)
            .with_tiling(Tiling::SliceDice)
            .layout(&h);
        // The root (depth 0) dices into full-height columns.
        let tetris = tiles.iter().find(|t| t.node.name == "Tetris").unwrap();
        assert!((tetris.rect.height() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn squarified_tiles_are_not_slivers() {
        let h = games();
        let tiles = TreemapLayout::new(960.0, 570.0).layout(&h);
        for t in tiles {
            let (w, hgt) = (t.rect.width(), t.rect.height());
            let aspect = w.max(hgt) / w.min(hgt);
            assert!(aspect < 8.0, "{} has aspect {aspect}", t.node.name);
        }
    }

    #[test]
    fn padding_separates_siblings_but_keeps_outer_edges() {
        let h = games();
        let tiles = TreemapLayout::new(960.0, 570.0)
            .with_padding_inner(1.0)
            .layout(&h);
        let bounds = tiles
            .iter()
            .fold(tiles[0].rect, |acc, t| acc.union(t.rect));
        assert!((bounds.x0).abs() < 1e-9 && (bounds.y0).abs() < 1e-9);
        assert!((bounds.x1 - 960.0).abs() < 1e-9 && (bounds.y1 - 570.0).abs() < 1e-9);
        for (i, a) in tiles.iter().enumerate() {
            for b in &tiles[i + 1..] {
                assert!(a.rect.intersect(b.rect).area() < 1e-9, "padded tiles never touch");
            }
        }
    }

    #[test]
    fn labels_split_before_capitalized_words() {
        assert_eq!(split_label("SuperMarioBros").as_slice(), ["Super", "Mario", "Bros"]);
        assert_eq!(split_label("Wii Sports").as_slice(), ["Wii ", "Sports"]);
        assert_eq!(split_label("NBA 2K").as_slice(), ["NB", "A 2K"]);
        assert_eq!(split_label("Tetris").as_slice(), ["Tetris"]);
        assert_eq!(split_label("").as_slice(), [""]);
        assert_eq!(split_label("iPhone").as_slice(), ["i", "Phone"]);
    }

    #[test]
    fn tile_marks_carry_contract_attributes() {
        let h = games();
        let tiles = TreemapLayout::new(960.0, 570.0).layout(&h);
        let palette = vec![Color::from_rgba8(1, 2, 3, 255)];
        let spec = TileMarkSpec::new(0, ScaleOrdinal::new(palette, ["Wii", "NES"]));
        let marks = spec.marks(&tiles);
        let first = &marks[0];
        assert_eq!(first.class.as_deref(), Some("tile"));
        assert_eq!(first.attr(DataAttrName::Name), Some("Wii Sports"));
        assert_eq!(first.attr(DataAttrName::Category), Some("Wii"));
        assert_eq!(first.attr(DataAttrName::Value), Some("82.53"));
        assert_eq!(
            first.screen_rect().map(|r| r.area()),
            Some(tiles[0].rect.area())
        );

        let gb = tiles.iter().position(|t| t.node.name == "Tetris").unwrap();
        assert_eq!(
            marks[2 * gb].fill,
            peniko::Brush::Solid(spec.fallback_fill),
            "unknown categories use the fallback fill"
        );
    }
}
