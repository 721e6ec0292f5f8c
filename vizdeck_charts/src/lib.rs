// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart building blocks and widgets for `vizdeck_core`.
//!
//! This crate turns normalized datasets into stable-identity marks:
//! - **Scales** map data values into screen coordinates and colors.
//! - **Guides** (axes, legends, titles) are built by generating `vizdeck_core::Mark`s.
//! - **Widgets** (bar chart, heat map, choropleth, tree map) fetch documents, render them and
//!   drive a hover [`Overlay`] through a [`WidgetHost`].
//!
//! Text shaping is out of scope; text marks store unshaped strings and layout relies on a
//! [`TextMeasurer`]. The [`to_svg_string`] serializer emits the scene as SVG.

mod axis;
mod bar_chart;
mod bar_mark;
mod cell_mark;
mod choropleth;
mod color;
mod format;
mod geo_mark;
mod heat_map;
mod layout;
mod legend;
mod measure;
mod overlay;
mod scale;
mod svg;
mod time;
mod title;
mod tree_map;
mod treemap;
mod widget;
mod z_order;

pub use axis::{AxisOrient, AxisScale, AxisSpec, AxisStyle, AxisTick, StrokeStyle};
pub use bar_chart::{BarChart, BarChartConfig, GDP_URL};
pub use bar_mark::BarMarkSpec;
pub use cell_mark::CellMarkSpec;
pub use choropleth::{COUNTIES_URL, Choropleth, ChoroplethConfig, EDUCATION_URL};
pub use color::{
    ColorError, ColorRamp, ScaleOrdinal, ScaleQuantize, palettes, parse_css_color, to_hex,
};
pub use format::{format_fixed, format_number, format_tick_with_step};
pub use geo_mark::{GeoMarkSpec, feature_path};
pub use heat_map::{HeatMap, HeatMapConfig, TEMPERATURE_URL};
pub use layout::{Margin, Size};
pub use legend::{
    LEGEND_GROUP, LegendFlow, LegendItem, LegendSwatches, LegendSwatchesSpec, QuantizeLegendItem,
    QuantizeLegendSpec,
};
pub use measure::{HeuristicTextMeasurer, TextMeasurer};
pub use overlay::{
    Fade, HoverState, Overlay, OverlayConfig, OverlayEffect, RenderContext, TooltipAnchor,
    TooltipContent, TooltipController, TooltipState, VISIBLE_OPACITY,
};
pub use scale::{LinearPair, ScaleBand, ScaleLinear, ScaleTime};
pub use svg::{to_svg_string, tooltip_html};
pub use time::{format_year, month_name, year_start_millis, year_ticks_millis};
pub use title::TitleSpec;
pub use tree_map::{KICKSTARTER_URL, MOVIE_URL, TreeMap, TreeMapConfig, VIDEO_GAME_URL};
pub use treemap::{TileMarkSpec, Tiling, TreemapLayout, TreemapTile, split_label};
pub use widget::{
    FetchError, LoadOutcome, LoadTicket, RenderError, Rendered, Widget, WidgetHost,
};
pub use z_order::*;
