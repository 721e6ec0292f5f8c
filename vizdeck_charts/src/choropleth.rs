// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The county education choropleth.

use std::time::Duration;

use kurbo::Point;
use peniko::Color;
use serde::Deserialize;
use serde_json::Value;
use vizdeck_core::{AttributeTable, DataAttr, DataAttrName, GeoFeature};
use vizdeck_data::{decode_topology, normalize_education};

use crate::axis::StrokeStyle;
use crate::color::{ColorRamp, ScaleQuantize, palettes, parse_css_color};
use crate::format::{format_fixed, format_number};
use crate::geo_mark::GeoMarkSpec;
use crate::layout::{Margin, Size};
use crate::legend::QuantizeLegendSpec;
use crate::overlay::{OverlayConfig, RenderContext, TooltipAnchor, TooltipContent};
use crate::title::TitleSpec;
use crate::widget::{LEGEND_IDS, RenderError, Rendered, SERIES_IDS, TITLE_IDS, Widget, expect_documents};

/// Default county topology source.
pub const COUNTIES_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/counties.json";

/// Default education attribute source.
pub const EDUCATION_URL: &str = "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/for_user_education.json";

/// Choropleth configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChoroplethConfig {
    /// Topology source URL.
    pub topology_url: String,
    /// Attribute table source URL.
    pub education_url: String,
    /// Name of the topology object holding the regions.
    pub object: String,
    /// Map area size (input coordinates are drawn 1:1).
    pub plot: Size,
    /// Space around the map.
    pub margin: Margin,
    /// Number of color buckets.
    pub steps: usize,
    /// Color ramp stops (CSS colors), from lowest to highest value.
    pub ramp: Vec<String>,
    /// Fill of regions without an attribute row.
    pub fallback_fill: String,
    /// Value reported for regions without an attribute row.
    pub fallback_value: f64,
    /// Fill of the hovered region, if highlighting is wanted.
    pub highlight: Option<String>,
    /// Region outline color.
    pub stroke: Option<String>,
    /// Legend width.
    pub legend_width: f64,
    /// Chart title.
    pub title: String,
    /// Description below the title.
    pub description: String,
}

impl Default for ChoroplethConfig {
    fn default() -> Self {
        Self {
            topology_url: COUNTIES_URL.to_string(),
            education_url: EDUCATION_URL.to_string(),
            object: "counties".to_string(),
            plot: Size::new(960.0, 600.0),
            margin: Margin::new(110.0, 20.0, 20.0, 20.0),
            steps: 9,
            ramp: palettes::GREENS.iter().map(|s| s.to_string()).collect(),
            fallback_fill: "#cccccc".to_string(),
            fallback_value: 0.0,
            highlight: Some("#ffa500".to_string()),
            stroke: None,
            legend_width: 300.0,
            title: "United States Educational Attainment".to_string(),
            description: "Percentage of adults age 25 and older with a bachelor's degree or higher (2010-2014)"
                .to_string(),
        }
    }
}

impl ChoroplethConfig {
    /// Sets both source URLs.
    pub fn with_urls(mut self, topology: impl Into<String>, education: impl Into<String>) -> Self {
        self.topology_url = topology.into();
        self.education_url = education.into();
        self
    }

    /// Sets the number of color buckets.
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the join-miss fill and reported value.
    pub fn with_fallback(mut self, fill: impl Into<String>, value: f64) -> Self {
        self.fallback_fill = fill.into();
        self.fallback_value = value;
        self
    }

    /// Sets or disables the hover highlight.
    pub fn with_highlight(mut self, highlight: Option<String>) -> Self {
        self.highlight = highlight;
        self
    }
}

/// Regions colored by a joined statistic.
#[derive(Clone, Debug, Default)]
pub struct Choropleth {
    config: ChoroplethConfig,
}

impl Choropleth {
    /// Creates a choropleth.
    pub fn new(config: ChoroplethConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ChoroplethConfig {
        &self.config
    }
}

#[derive(Debug)]
struct RegionDatum {
    fips: u32,
    row: Option<(String, String, f64)>,
    fill: Color,
}

#[derive(Debug)]
struct MapContext {
    regions: Vec<RegionDatum>,
    fallback_value: f64,
}

impl RenderContext for MapContext {
    fn datum_count(&self) -> usize {
        self.regions.len()
    }

    fn tooltip(&self, index: usize) -> Option<TooltipContent> {
        let region = self.regions.get(index)?;
        let (line, value) = match &region.row {
            Some((area, state, value)) => {
                (format!("{area}, {state}: {}%", format_number(*value)), *value)
            }
            None => (format!("FIPS {}: no data", region.fips), self.fallback_value),
        };
        Some(
            TooltipContent::new([line])
                .with_attr(DataAttr::new(DataAttrName::Education, format_number(value))),
        )
    }

    fn base_fill(&self, index: usize) -> Option<Color> {
        self.regions.get(index).map(|r| r.fill)
    }
}

impl Widget for Choropleth {
    fn name(&self) -> &str {
        "choropleth"
    }

    fn sources(&self) -> Vec<String> {
        vec![
            self.config.topology_url.clone(),
            self.config.education_url.clone(),
        ]
    }

    fn render(&self, documents: &[Value]) -> Result<Rendered, RenderError> {
        expect_documents(documents, 2)?;
        let features = decode_topology(&documents[0], &self.config.object)?;
        let table = normalize_education(&documents[1])?;
        self.render_joined(&features, &table)
    }
}

impl Choropleth {
    fn render_joined(
        &self,
        features: &[GeoFeature],
        table: &AttributeTable,
    ) -> Result<Rendered, RenderError> {
        let c = &self.config;
        if features.is_empty() {
            return Err(RenderError::Empty { what: "topology" });
        }
        let Some(extent) = table.value_extent() else {
            return Err(RenderError::Empty {
                what: "attribute table",
            });
        };
        let ramp = ColorRamp::from_css(&c.ramp)?;
        let fallback = parse_css_color(&c.fallback_fill)?;
        let highlight = c.highlight.as_deref().map(parse_css_color).transpose()?;
        let color = ScaleQuantize::new(extent, c.steps, &ramp);

        let mut spec = GeoMarkSpec::new(SERIES_IDS, color.clone())
            .with_fallback(fallback, c.fallback_value)
            .with_offset(c.margin.origin());
        if let Some(stroke) = &c.stroke {
            spec = spec.with_stroke(StrokeStyle::solid(parse_css_color(stroke)?, 0.5));
        }
        let mut marks = spec.marks(features, table);
        let misses = features.iter().filter(|f| table.get(f.id()).is_none()).count();

        let view = c.margin.view(c.plot);
        let legend_origin = Point::new(
            c.margin.left + c.plot.width - c.legend_width - 40.0,
            c.margin.top - 30.0,
        );
        marks.extend(
            QuantizeLegendSpec::new(LEGEND_IDS, c.legend_width)
                .with_swatch_height(8.0)
                .with_label_formatter(|v| format!("{}%", format_fixed(v, 0)))
                .marks(&color, legend_origin),
        );
        marks.extend(
            TitleSpec::new(TITLE_IDS, c.title.clone(), Point::new(view.center().x, 34.0))
                .with_description(c.description.clone())
                .marks(),
        );
        tracing::debug!(
            regions = features.len(),
            rows = table.len(),
            misses,
            "choropleth joined"
        );

        let regions = features
            .iter()
            .map(|f| {
                let row = table.get(f.id());
                RegionDatum {
                    fips: f.id(),
                    fill: spec.resolve(row).0,
                    row: row.map(|r| (r.area_name.clone(), r.state.clone(), r.value)),
                }
            })
            .collect();
        Ok(Rendered {
            marks,
            context: Box::new(MapContext {
                regions,
                fallback_value: c.fallback_value,
            }),
            overlay: OverlayConfig {
                anchor: TooltipAnchor::Pointer {
                    dx: 10.0,
                    dy: -28.0,
                },
                fade_in: Duration::from_millis(200),
                fade_out: Duration::from_millis(500),
                highlight,
            },
            view,
        })
    }
}
