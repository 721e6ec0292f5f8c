// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The GDP bar chart.

use std::time::Duration;

use kurbo::{Point, Vec2};
use peniko::Color;
use serde::Deserialize;
use serde_json::Value;
use vizdeck_core::{DataAttr, DataAttrName, Dataset};
use vizdeck_data::normalize_gdp;

use crate::axis::{AxisScale, AxisSpec};
use crate::bar_mark::BarMarkSpec;
use crate::color::parse_css_color;
use crate::format::format_number;
use crate::layout::{Margin, Size};
use crate::overlay::{OverlayConfig, RenderContext, TooltipAnchor, TooltipContent};
use crate::scale::{LinearPair, ScaleTime};
use crate::title::TitleSpec;
use crate::widget::{
    RenderError, Rendered, SERIES_IDS, TITLE_IDS, Widget, X_AXIS_IDS, Y_AXIS_IDS,
    expect_documents,
};

/// Default GDP source.
pub const GDP_URL: &str =
    "https://raw.githubusercontent.com/FreeCodeCamp/ProjectReferenceData/master/GDP-data.json";

/// Bar chart configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BarChartConfig {
    /// Source URL.
    pub url: String,
    /// Plot area size.
    pub plot: Size,
    /// Space around the plot.
    pub margin: Margin,
    /// Bar fill as a CSS color.
    pub bar_fill: String,
    /// Chart title.
    pub title: String,
    /// Vertical axis title.
    pub y_axis_title: Option<String>,
    /// Approximate number of vertical axis ticks.
    pub y_tick_count: usize,
    /// Approximate number of year ticks.
    pub x_tick_count: usize,
    /// Horizontal tooltip offset from the hovered slot.
    pub tooltip_dx: f64,
    /// Fixed vertical tooltip position.
    pub tooltip_y: f64,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            url: GDP_URL.to_string(),
            plot: Size::new(1000.0, 500.0),
            margin: Margin::new(50.0, 60.0, 50.0, 60.0),
            bar_fill: "#ddf".to_string(),
            title: "United States GDP".to_string(),
            y_axis_title: Some("Gross Domestic Product".to_string()),
            y_tick_count: 10,
            x_tick_count: 14,
            tooltip_dx: 40.0,
            tooltip_y: 400.0,
        }
    }
}

impl BarChartConfig {
    /// Sets the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the plot size.
    pub fn with_plot(mut self, plot: Size) -> Self {
        self.plot = plot;
        self
    }

    /// Sets the margin.
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the bar fill.
    pub fn with_bar_fill(mut self, fill: impl Into<String>) -> Self {
        self.bar_fill = fill.into();
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Vertical bars of GDP over time.
#[derive(Clone, Debug, Default)]
pub struct BarChart {
    config: BarChartConfig,
}

impl BarChart {
    /// Creates a bar chart.
    pub fn new(config: BarChartConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BarChartConfig {
        &self.config
    }
}

#[derive(Debug)]
struct BarContext {
    rows: Vec<(String, f64)>,
    fill: Color,
}

impl RenderContext for BarContext {
    fn datum_count(&self) -> usize {
        self.rows.len()
    }

    fn tooltip(&self, index: usize) -> Option<TooltipContent> {
        let (date, value) = self.rows.get(index)?;
        Some(
            TooltipContent::new([date.clone(), format!("${} Billion", format_number(*value))])
                .with_attr(DataAttr::new(DataAttrName::Date, date.clone())),
        )
    }

    fn base_fill(&self, index: usize) -> Option<Color> {
        self.rows.get(index).map(|_| self.fill)
    }
}

impl Widget for BarChart {
    fn name(&self) -> &str {
        "bar-chart"
    }

    fn sources(&self) -> Vec<String> {
        vec![self.config.url.clone()]
    }

    fn render(&self, documents: &[Value]) -> Result<Rendered, RenderError> {
        expect_documents(documents, 1)?;
        let dataset = normalize_gdp(&documents[0])?;
        self.render_dataset(&dataset)
    }
}

impl BarChart {
    fn render_dataset(&self, dataset: &Dataset) -> Result<Rendered, RenderError> {
        let c = &self.config;
        let (Some(x_extent), Some((_, max))) = (dataset.x_extent(), dataset.value_extent()) else {
            return Err(RenderError::Empty { what: "GDP series" });
        };
        let fill = parse_css_color(&c.bar_fill)?;
        let plot = c.plot;
        let origin = c.margin.origin();

        let x_scale = ScaleTime::new(x_extent, (0.0, plot.width));
        let y = LinearPair::from_max(max, plot.height);
        let bar_width = plot.width / dataset.len() as f64;

        let mut marks = BarMarkSpec::new(SERIES_IDS, x_scale, y, bar_width, plot.height)
            .with_fill(fill)
            .with_offset(origin)
            .marks(dataset);

        marks.extend(
            AxisSpec::bottom(X_AXIS_IDS, "x-axis", AxisScale::Time(x_scale))
                .with_tick_count(c.x_tick_count)
                .with_offset(origin + Vec2::new(0.0, plot.height))
                .marks(),
        );
        let mut y_axis = AxisSpec::left(Y_AXIS_IDS, "y-axis", AxisScale::Linear(y.reversed))
            .with_tick_count(c.y_tick_count)
            .with_title_offset(c.margin.left * 0.5 + 20.0)
            .with_offset(origin);
        if let Some(title) = &c.y_axis_title {
            y_axis = y_axis.with_title(title.clone());
        }
        marks.extend(y_axis.marks());

        let view = c.margin.view(plot);
        marks.extend(
            TitleSpec::new(TITLE_IDS, c.title.clone(), Point::new(view.center().x, c.margin.top * 0.7))
                .marks(),
        );

        let first = dataset.records().first().map(|r| r.key.as_str()).unwrap_or_default();
        let last = dataset.records().last().map(|r| r.key.as_str()).unwrap_or_default();
        tracing::debug!(bars = dataset.len(), first, last, max, "bar chart laid out");

        let context = BarContext {
            rows: dataset
                .records()
                .iter()
                .map(|r| (r.extra_str("date").unwrap_or(&r.key).to_string(), r.value))
                .collect(),
            fill,
        };
        Ok(Rendered {
            marks,
            context: Box::new(context),
            overlay: OverlayConfig {
                anchor: TooltipAnchor::Slot {
                    slot_width: bar_width,
                    dx: c.tooltip_dx,
                    y: c.tooltip_y,
                },
                fade_in: Duration::from_millis(200),
                fade_out: Duration::from_millis(300),
                highlight: None,
            },
            view,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vizdeck_core::MarkShape;

    use super::*;

    #[test]
    fn config_deserializes_with_defaults() {
        let config: BarChartConfig =
            serde_json::from_value(json!({ "bar_fill": "#333", "plot": { "width": 500.0, "height": 200.0 } }))
                .unwrap();
        assert_eq!(config.bar_fill, "#333");
        assert_eq!(config.plot, Size::new(500.0, 200.0));
        assert_eq!(config.url, GDP_URL, "unspecified fields keep their defaults");
        assert_eq!(config.margin, Margin::new(50.0, 60.0, 50.0, 60.0));
    }

    #[test]
    fn bars_fill_the_plot_width() {
        let doc = json!({ "data": [
            ["1947-01-01", 243.1], ["1947-04-01", 246.3], ["1947-07-01", 250.1], ["1947-10-01", 260.3]
        ]});
        let rendered = BarChart::default().render(&[doc]).unwrap();
        let bars: Vec<_> = rendered
            .marks
            .iter()
            .filter(|m| m.class.as_deref() == Some("bar"))
            .collect();
        assert_eq!(bars.len(), 4);
        for bar in &bars {
            let MarkShape::Rect(r) = bar.shape else {
                panic!("bars are rects");
            };
            assert!((r.width() - 250.0).abs() < 1e-9, "slot width is plot width / count");
        }
        let tallest = bars[3].screen_rect().unwrap();
        assert!((tallest.y0 - 50.0).abs() < 1e-9, "max value reaches the top of the plot");
        assert_eq!(rendered.view.size(), kurbo::Size::new(1120.0, 600.0));
        assert_eq!(rendered.context.datum_count(), 4);
    }

    #[test]
    fn empty_series_is_an_error() {
        let err = BarChart::default().render(&[json!({ "data": [] })]).unwrap_err();
        assert!(matches!(err, RenderError::Empty { .. }));
        let err = BarChart::default().render(&[]).unwrap_err();
        assert!(matches!(err, RenderError::DocumentCount { expected: 1, got: 0 }));
    }

    #[test]
    fn named_fill_colors_the_bars() {
        let chart = BarChart::new(BarChartConfig::default().with_bar_fill("orange"));
        let rendered = chart
            .render(&[json!({ "data": [["1947-01-01", 243.1]] })])
            .unwrap();
        let bar = rendered
            .marks
            .iter()
            .find(|m| m.class.as_deref() == Some("bar"))
            .unwrap();
        assert_eq!(
            bar.fill,
            peniko::Brush::Solid(Color::from_rgba8(0xff, 0xa5, 0x00, 0xff)),
            "CSS color names are accepted in configs"
        );
    }

    #[test]
    fn invalid_fill_is_reported() {
        let chart = BarChart::new(BarChartConfig::default().with_bar_fill("blue-ish"));
        let err = chart
            .render(&[json!({ "data": [["1947-01-01", 243.1]] })])
            .unwrap_err();
        assert!(matches!(err, RenderError::Color(_)));
    }
}
