// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The hierarchical tree map.

use std::time::Duration;

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::Deserialize;
use serde_json::Value;
use vizdeck_core::{DataAttr, DataAttrName, Hierarchy};
use vizdeck_data::normalize_hierarchy;

use crate::color::{ScaleOrdinal, palettes, parse_css_color};
use crate::format::format_number;
use crate::layout::Size;
use crate::legend::{LegendFlow, LegendItem, LegendSwatchesSpec};
use crate::measure::HeuristicTextMeasurer;
use crate::overlay::{OverlayConfig, RenderContext, TooltipAnchor, TooltipContent};
use crate::title::TitleSpec;
use crate::treemap::{TileMarkSpec, Tiling, TreemapLayout};
use crate::widget::{LEGEND_IDS, RenderError, Rendered, SERIES_IDS, TITLE_IDS, Widget, expect_documents};

/// Kickstarter pledges grouped by category.
pub const KICKSTARTER_URL: &str = "https://cdn.freecodecamp.org/testable-projects-fcc/data/tree_map/kickstarter-funding-data.json";
/// Movie box office grouped by genre.
pub const MOVIE_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/tree_map/movie-data.json";
/// Video game sales grouped by platform.
pub const VIDEO_GAME_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/tree_map/video-game-sales-data.json";

/// Height reserved above the tiles when a title is set.
const TITLE_BAND: f64 = 80.0;

/// Tree map configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreeMapConfig {
    /// Source URL.
    pub url: String,
    /// Tile area size.
    pub size: Size,
    /// Gap between sibling tiles.
    pub padding_inner: f64,
    /// Tiling strategy.
    pub tiling: Tiling,
    /// Category palette (CSS colors), reused cyclically.
    pub palette: Vec<String>,
    /// Legend width; split evenly into `legend_columns`.
    pub legend_width: f64,
    /// Number of legend columns.
    pub legend_columns: usize,
    /// Legend swatch size.
    pub legend_swatch: f64,
    /// Vertical gap between legend rows.
    pub legend_row_gap: f64,
    /// Gap between the tiles and the legend.
    pub legend_top: f64,
    /// Optional title.
    pub title: Option<String>,
    /// Optional description below the title.
    pub description: Option<String>,
}

impl Default for TreeMapConfig {
    fn default() -> Self {
        Self {
            url: VIDEO_GAME_URL.to_string(),
            size: Size::new(960.0, 600.0),
            padding_inner: 1.0,
            tiling: Tiling::Squarify,
            palette: palettes::CATEGORY10.iter().map(|s| s.to_string()).collect(),
            legend_width: 576.0,
            legend_columns: 3,
            legend_swatch: 20.0,
            legend_row_gap: 10.0,
            legend_top: 50.0,
            title: None,
            description: None,
        }
    }
}

impl TreeMapConfig {
    /// Sets the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the tile area size.
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Sets the tiling strategy.
    pub fn with_tiling(mut self, tiling: Tiling) -> Self {
        self.tiling = tiling;
        self
    }

    /// Sets the gap between sibling tiles.
    pub fn with_padding_inner(mut self, padding: f64) -> Self {
        self.padding_inner = padding;
        self
    }

    /// Sets the title and description.
    pub fn with_title(mut self, title: impl Into<String>, description: Option<String>) -> Self {
        self.title = Some(title.into());
        self.description = description;
        self
    }
}

/// Leaves of a hierarchy as nested rectangles, with a category legend.
#[derive(Clone, Debug, Default)]
pub struct TreeMap {
    config: TreeMapConfig,
}

impl TreeMap {
    /// Creates a tree map.
    pub fn new(config: TreeMapConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TreeMapConfig {
        &self.config
    }

    /// Switches the dataset. The next load fetches from `url`.
    pub fn set_source(&mut self, url: impl Into<String>) {
        self.config.url = url.into();
    }
}

#[derive(Debug)]
struct LeafDatum {
    name: String,
    category: Option<String>,
    value: f64,
    fill: Color,
}

#[derive(Debug)]
struct TileContext {
    leaves: Vec<LeafDatum>,
}

impl RenderContext for TileContext {
    fn datum_count(&self) -> usize {
        self.leaves.len()
    }

    fn tooltip(&self, index: usize) -> Option<TooltipContent> {
        let leaf = self.leaves.get(index)?;
        let value = format_number(leaf.value);
        Some(
            TooltipContent::new([
                format!("Name: {}", leaf.name),
                format!("Category: {}", leaf.category.as_deref().unwrap_or_default()),
                format!("Value: {value}"),
            ])
            .with_attr(DataAttr::new(DataAttrName::Value, value)),
        )
    }

    fn base_fill(&self, index: usize) -> Option<Color> {
        self.leaves.get(index).map(|l| l.fill)
    }
}

impl Widget for TreeMap {
    fn name(&self) -> &str {
        "tree-map"
    }

    fn sources(&self) -> Vec<String> {
        vec![self.config.url.clone()]
    }

    fn render(&self, documents: &[Value]) -> Result<Rendered, RenderError> {
        expect_documents(documents, 1)?;
        let hierarchy = normalize_hierarchy(&documents[0])?;
        self.render_hierarchy(&hierarchy)
    }
}

impl TreeMap {
    fn render_hierarchy(&self, hierarchy: &Hierarchy) -> Result<Rendered, RenderError> {
        let c = &self.config;
        let palette = c
            .palette
            .iter()
            .map(|s| parse_css_color(s))
            .collect::<Result<Vec<_>, _>>()?;
        let top = if c.title.is_some() { TITLE_BAND } else { 0.0 };

        let tiles = TreemapLayout::new(c.size.width, c.size.height)
            .with_padding_inner(c.padding_inner)
            .with_tiling(c.tiling)
            .layout(hierarchy);
        if tiles.is_empty() {
            return Err(RenderError::Empty { what: "hierarchy" });
        }

        let categories = ScaleOrdinal::new(
            palette,
            tiles.iter().filter_map(|t| t.node.category.clone()),
        );
        let spec = TileMarkSpec::new(SERIES_IDS, categories.clone()).with_offset(Vec2::new(0.0, top));
        let mut marks = spec.marks(&tiles);

        let items = categories
            .domain()
            .iter()
            .filter_map(|cat| categories.map(cat).map(|color| LegendItem::solid(cat.clone(), color)))
            .collect();
        let columns = c.legend_columns.max(1);
        let legend = LegendSwatchesSpec::new(LEGEND_IDS, items)
            .with_swatch_size(c.legend_swatch)
            .with_row_gap(c.legend_row_gap)
            .with_label_dx(c.legend_swatch * 0.2)
            .with_font_size(12.0)
            .with_columns(columns, c.legend_width / columns as f64)
            .with_flow(LegendFlow::RowMajor)
            .at(c.size.width / 4.0, top + c.size.height + c.legend_top);
        let legend_bounds = legend.bounds(&HeuristicTextMeasurer);
        marks.extend(legend.marks());

        if let Some(title) = &c.title {
            let mut spec = TitleSpec::new(TITLE_IDS, title.clone(), Point::new(c.size.width / 2.0, 34.0));
            if let Some(description) = &c.description {
                spec = spec.with_description(description.clone());
            }
            marks.extend(spec.marks());
        }

        let view = Rect::new(0.0, 0.0, c.size.width, top + c.size.height).union(Rect::new(
            0.0,
            0.0,
            legend_bounds.x1,
            legend_bounds.y1 + 20.0,
        ));
        tracing::debug!(
            leaves = tiles.len(),
            categories = categories.domain().len(),
            total = hierarchy.total(),
            "tree map laid out"
        );

        let leaves = tiles
            .iter()
            .map(|t| LeafDatum {
                name: t.node.name.clone(),
                category: t.node.category.clone(),
                value: t.node.value,
                fill: spec.fill_for(t.node),
            })
            .collect();
        Ok(Rendered {
            marks,
            context: Box::new(TileContext { leaves }),
            overlay: OverlayConfig {
                anchor: TooltipAnchor::Pointer {
                    dx: 10.0,
                    dy: -28.0,
                },
                fade_in: Duration::from_millis(200),
                fade_out: Duration::from_millis(500),
                highlight: None,
            },
            view,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vizdeck_core::{Mark, MarkShape};

    use super::*;
    use crate::legend::LEGEND_GROUP;

    fn movies() -> Value {
        json!({
            "name": "Movies",
            "children": [
                { "name": "Action", "children": [
                    { "name": "Avatar", "category": "Action", "value": "760505847" },
                    { "name": "Jurassic World", "category": "Action", "value": "652177271" }
                ]},
                { "name": "Drama", "children": [
                    { "name": "Titanic", "category": "Drama", "value": "658672302" }
                ]},
                { "name": "Family", "children": [
                    { "name": "Frozen", "category": "Family", "value": "400738009" }
                ]},
                { "name": "Adventure", "children": [
                    { "name": "The Lion King", "category": "Adventure", "value": "422783777" }
                ]}
            ]
        })
    }

    fn tiles(marks: &[Mark]) -> Vec<&Mark> {
        marks
            .iter()
            .filter(|m| m.class.as_deref() == Some("tile"))
            .collect()
    }

    #[test]
    fn one_tile_per_leaf_with_path_ids() {
        let rendered = TreeMap::default().render(&[movies()]).unwrap();
        let tiles = tiles(&rendered.marks);
        assert_eq!(tiles.len(), 5);
        assert_eq!(tiles[0].element_id.as_deref(), Some("Movies.Action.Avatar"));
        assert_eq!(tiles[0].attr(DataAttrName::Value), Some("760505847"));
        assert_eq!(tiles[0].attr(DataAttrName::Category), Some("Action"));
        assert_eq!(rendered.context.datum_count(), 5);
    }

    #[test]
    fn legend_lists_each_category_once() {
        let rendered = TreeMap::default().render(&[movies()]).unwrap();
        let swatches: Vec<_> = rendered
            .marks
            .iter()
            .filter(|m| m.class.as_deref() == Some("legend-item"))
            .collect();
        assert_eq!(swatches.len(), 4);
        assert!(swatches.iter().all(|m| m.group.as_deref() == Some(LEGEND_GROUP)));

        // Four categories in three columns wrap to a second row.
        let fourth = swatches[3].screen_rect().unwrap();
        assert_eq!(fourth.origin(), Point::new(240.0, 680.0));
        assert!(rendered.view.y1 >= fourth.y1, "the view includes the legend");
    }

    #[test]
    fn tile_and_legend_colors_agree() {
        let rendered = TreeMap::default().render(&[movies()]).unwrap();
        let fill_of = |m: &Mark| m.fill.clone();
        let tiles = tiles(&rendered.marks);
        let legend: Vec<_> = rendered
            .marks
            .iter()
            .filter(|m| m.class.as_deref() == Some("legend-item"))
            .collect();
        // Categories are legend-ordered by first appearance among the sorted leaves.
        assert_eq!(fill_of(tiles[0]), fill_of(legend[0]));
        let label = rendered.marks.iter().find_map(|m| match &m.shape {
            MarkShape::Text(t) if m.class.as_deref() == Some("legend-label") => Some(t.text.clone()),
            _ => None,
        });
        assert_eq!(label.as_deref(), Some("Action"));
    }

    #[test]
    fn tooltip_lists_name_category_and_value() {
        let rendered = TreeMap::default().render(&[movies()]).unwrap();
        let tip = rendered.context.tooltip(2).unwrap();
        assert_eq!(
            tip.lines,
            ["Name: Titanic", "Category: Drama", "Value: 658672302"]
        );
        assert_eq!(tip.attr, Some(DataAttr::new(DataAttrName::Value, "658672302")));
    }

    #[test]
    fn title_shifts_the_tiles_down() {
        let chart = TreeMap::new(TreeMapConfig::default().with_title("Movie Sales", None));
        let rendered = chart.render(&[movies()]).unwrap();
        let min_y = tiles(&rendered.marks)
            .iter()
            .filter_map(|m| m.screen_rect())
            .map(|r| r.y0)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(min_y, TITLE_BAND);
    }
}
