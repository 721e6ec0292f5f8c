// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The monthly global temperature heat map.

use kurbo::{Point, Vec2};
use peniko::Color;
use serde::Deserialize;
use serde_json::Value;
use vizdeck_core::{DataAttr, DataAttrName};
use vizdeck_data::{TemperatureDataset, normalize_temperature};

use crate::axis::{AxisScale, AxisSpec};
use crate::cell_mark::CellMarkSpec;
use crate::color::{ColorRamp, ScaleQuantize, palettes};
use crate::format::{format_fixed, format_number};
use crate::layout::{Margin, Size};
use crate::legend::QuantizeLegendSpec;
use crate::overlay::{OverlayConfig, RenderContext, TooltipContent};
use crate::scale::{ScaleBand, ScaleLinear};
use crate::time::month_name;
use crate::title::TitleSpec;
use crate::widget::{
    LEGEND_IDS, RenderError, Rendered, SERIES_IDS, TITLE_IDS, Widget, X_AXIS_IDS, Y_AXIS_IDS,
    expect_documents,
};

/// Default temperature source.
pub const TEMPERATURE_URL: &str = "https://raw.githubusercontent.com/freeCodeCamp/ProjectReferenceData/master/global-temperature.json";

/// Heat map configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeatMapConfig {
    /// Source URL.
    pub url: String,
    /// Plot area size.
    pub plot: Size,
    /// Space around the plot.
    pub margin: Margin,
    /// Number of color buckets.
    pub steps: usize,
    /// Color ramp stops (CSS colors), from coldest to warmest.
    pub ramp: Vec<String>,
    /// Legend width.
    pub legend_width: f64,
    /// Approximate number of year ticks.
    pub x_tick_count: usize,
    /// Chart title.
    pub title: String,
}

impl Default for HeatMapConfig {
    fn default() -> Self {
        Self {
            url: TEMPERATURE_URL.to_string(),
            plot: Size::new(1200.0, 396.0),
            margin: Margin::new(100.0, 40.0, 130.0, 110.0),
            steps: 11,
            ramp: palettes::RD_YL_BU.iter().rev().map(|s| s.to_string()).collect(),
            legend_width: 400.0,
            x_tick_count: 26,
            title: "Monthly Global Land-Surface Temperature".to_string(),
        }
    }
}

impl HeatMapConfig {
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

    /// Sets the number of color buckets.
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the color ramp.
    pub fn with_ramp<S: Into<String>>(mut self, ramp: impl IntoIterator<Item = S>) -> Self {
        self.ramp = ramp.into_iter().map(Into::into).collect();
        self
    }
}

/// Year x month cells colored by temperature.
#[derive(Clone, Debug, Default)]
pub struct HeatMap {
    config: HeatMapConfig,
}

impl HeatMap {
    /// Creates a heat map.
    pub fn new(config: HeatMapConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HeatMapConfig {
        &self.config
    }
}

#[derive(Debug)]
struct CellDatum {
    year: f64,
    month: Option<usize>,
    temp: f64,
    variance: f64,
}

#[derive(Debug)]
struct HeatContext {
    cells: Vec<CellDatum>,
    color: ScaleQuantize,
}

impl RenderContext for HeatContext {
    fn datum_count(&self) -> usize {
        self.cells.len()
    }

    fn tooltip(&self, index: usize) -> Option<TooltipContent> {
        let cell = self.cells.get(index)?;
        let month = month_name(cell.month?)?;
        let year = format_number(cell.year);
        let mut variance = format_fixed(cell.variance, 1);
        if !variance.starts_with('-') {
            variance.insert(0, '+');
        }
        Some(
            TooltipContent::new([
                format!("{year} - {month}"),
                format!("{}℃", format_fixed(cell.temp, 1)),
                format!("{variance}℃"),
            ])
            .with_attr(DataAttr::new(DataAttrName::Year, year)),
        )
    }

    fn base_fill(&self, index: usize) -> Option<Color> {
        self.cells.get(index).map(|c| self.color.map(c.temp))
    }
}

impl Widget for HeatMap {
    fn name(&self) -> &str {
        "heat-map"
    }

    fn sources(&self) -> Vec<String> {
        vec![self.config.url.clone()]
    }

    fn render(&self, documents: &[Value]) -> Result<Rendered, RenderError> {
        expect_documents(documents, 1)?;
        let grid = normalize_temperature(&documents[0])?;
        self.render_grid(&grid)
    }
}

impl HeatMap {
    fn render_grid(&self, grid: &TemperatureDataset) -> Result<Rendered, RenderError> {
        let c = &self.config;
        let dataset = &grid.dataset;
        let (Some((y0, y1)), Some(extent)) = (grid.year_extent(), dataset.value_extent()) else {
            return Err(RenderError::Empty {
                what: "temperature grid",
            });
        };
        let ramp = ColorRamp::from_css(&c.ramp)?;
        let plot = c.plot;
        let origin = c.margin.origin();

        // The last year gets a full slot, so the domain ends one year past it.
        let year_span = f64::from(y1 - y0 + 1);
        let x_scale = ScaleLinear::new((f64::from(y0), f64::from(y1 + 1)), (0.0, plot.width));
        let band = ScaleBand::new((0.0, plot.height), 12);
        let color = ScaleQuantize::new(extent, c.steps, &ramp);

        let mut marks = CellMarkSpec::new(
            SERIES_IDS,
            x_scale,
            band,
            plot.width / year_span,
            color.clone(),
        )
        .with_offset(origin)
        .marks(dataset);

        marks.extend(
            AxisSpec::bottom(X_AXIS_IDS, "x-axis", AxisScale::Linear(x_scale))
                .with_tick_count(c.x_tick_count)
                .with_title("Years")
                .with_offset(origin + Vec2::new(0.0, plot.height))
                .marks(),
        );
        let months = (0..12)
            .filter_map(month_name)
            .map(str::to_string)
            .collect();
        marks.extend(
            AxisSpec::left(
                Y_AXIS_IDS,
                "y-axis",
                AxisScale::Band {
                    scale: band,
                    labels: months,
                },
            )
            .with_title("Months")
            .with_title_offset(c.margin.left - 20.0)
            .with_offset(origin)
            .marks(),
        );

        let legend_origin = Point::new(c.margin.left, c.margin.top + plot.height + 60.0);
        marks.extend(
            QuantizeLegendSpec::new(LEGEND_IDS, c.legend_width)
                .with_label_formatter(|v| format_fixed(v, 1))
                .marks(&color, legend_origin),
        );

        let view = c.margin.view(plot);
        marks.extend(
            TitleSpec::new(TITLE_IDS, c.title.clone(), Point::new(view.center().x, 40.0))
                .with_description(format!(
                    "{y0} - {y1}: base temperature {}℃",
                    format_number(grid.base_temperature)
                ))
                .marks(),
        );
        tracing::debug!(cells = dataset.len(), y0, y1, "heat map laid out");

        let cells = dataset
            .records()
            .iter()
            .map(|r| CellDatum {
                year: r.x.as_f64(),
                month: r
                    .extra_f64("month")
                    .filter(|m| (1.0..=12.0).contains(m))
                    .map(|m| {
                        #[allow(clippy::cast_possible_truncation, reason = "checked to be within 1..=12")]
                        let m = m as usize;
                        m - 1
                    }),
                temp: r.value,
                variance: r.extra_f64("variance").unwrap_or(r.value - grid.base_temperature),
            })
            .collect();
        Ok(Rendered {
            marks,
            context: Box::new(HeatContext { cells, color }),
            overlay: OverlayConfig::default(),
            view,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vizdeck_core::{Mark, MarkShape};

    use super::*;

    fn grid() -> Value {
        json!({
            "baseTemperature": 8.66,
            "monthlyVariance": [
                { "year": 1753, "month": 1, "variance": -1.366 },
                { "year": 1753, "month": 2, "variance": -2.223 },
                { "year": 1754, "month": 1, "variance": 0.2 },
                { "year": 1755, "month": 12, "variance": 1.1 }
            ]
        })
    }

    fn cells(marks: &[Mark]) -> Vec<&Mark> {
        marks
            .iter()
            .filter(|m| m.class.as_deref() == Some("cell"))
            .collect()
    }

    #[test]
    fn cells_tile_the_year_month_grid() {
        let rendered = HeatMap::default().render(&[grid()]).unwrap();
        let cells = cells(&rendered.marks);
        assert_eq!(cells.len(), 4);

        let MarkShape::Rect(first) = cells[0].shape else {
            panic!("cells are rects");
        };
        assert_eq!(first.x0, 0.0);
        assert!((first.width() - 400.0).abs() < 1e-9, "three years share 1200px");
        assert!((first.height() - 33.0).abs() < 1e-9, "twelve bands share 396px");

        let MarkShape::Rect(last) = cells[3].shape else {
            panic!("cells are rects");
        };
        assert!((last.x1 - 1200.0).abs() < 1e-9, "the last year ends at the plot edge");
        assert_eq!(cells[3].attr(DataAttrName::Month), Some("11"));
        assert_eq!(cells[3].attr(DataAttrName::Year), Some("1755"));
    }

    #[test]
    fn extremes_use_the_outer_ramp_colors() {
        let rendered = HeatMap::default().render(&[grid()]).unwrap();
        let cells = cells(&rendered.marks);
        let blue = palettes::RD_YL_BU[10];
        let red = palettes::RD_YL_BU[0];
        let hex = |m: &Mark| match m.fill {
            peniko::Brush::Solid(c) => crate::color::to_hex(c),
            _ => String::new(),
        };
        assert_eq!(hex(cells[1]), blue, "coldest cell");
        assert_eq!(hex(cells[3]), red, "warmest cell");
    }

    #[test]
    fn tooltip_shows_month_and_signed_variance() {
        let rendered = HeatMap::default().render(&[grid()]).unwrap();
        let tip = rendered.context.tooltip(2).unwrap();
        assert_eq!(tip.lines, ["1754 - January", "8.9℃", "+0.2℃"]);
        assert_eq!(tip.attr, Some(DataAttr::new(DataAttrName::Year, "1754")));
        let tip = rendered.context.tooltip(0).unwrap();
        assert_eq!(tip.lines[2], "-1.4℃");
    }

    #[test]
    fn description_names_the_year_range() {
        let rendered = HeatMap::default().render(&[grid()]).unwrap();
        let description = rendered
            .marks
            .iter()
            .find(|m| m.element_id.as_deref() == Some("description"))
            .and_then(|m| match &m.shape {
                MarkShape::Text(t) => Some(t.text.clone()),
                _ => None,
            });
        assert_eq!(
            description.as_deref(),
            Some("1753 - 1755: base temperature 8.66℃")
        );
    }
}
