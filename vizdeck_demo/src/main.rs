// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fetches the widget datasets, renders every widget and writes an HTML report.
//!
//! Each widget gets one simulated hover over its first data mark so the report shows the
//! tooltip next to the chart. Set `RUST_LOG=vizdeck_charts=debug` to follow loads.

mod html;

use std::time::Duration;

use anyhow::Context;
use kurbo::{Point, Shape};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use vizdeck_charts::{
    BarChart, Choropleth, FetchError, HeatMap, KICKSTARTER_URL, LoadOutcome, MOVIE_URL, TreeMap,
    TreeMapConfig, VIDEO_GAME_URL, Widget, WidgetHost, to_svg_string, tooltip_html,
};
use vizdeck_core::{Mark, MarkShape};

use html::Section;

const OUTPUT: &str = "vizdeck_demo.html";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let output = std::env::args().nth(1).unwrap_or_else(|| OUTPUT.to_string());
    let client = Client::builder()
        .user_agent("vizdeck-demo/0.1")
        .timeout(Duration::from_secs(30))
        .build()
        .context("building HTTP client")?;

    let mut sections = Vec::new();
    let widgets: [(&str, Box<dyn Widget>); 3] = [
        ("Bar chart", Box::new(BarChart::default())),
        ("Heat map", Box::new(HeatMap::default())),
        ("Choropleth", Box::new(Choropleth::default())),
    ];
    for (heading, widget) in widgets {
        let mut host = WidgetHost::new(widget);
        sections.push(show(&mut host, &client, heading.to_string()));
    }

    // One tree map host, switched between its three datasets.
    let mut tree_map = WidgetHost::new(TreeMap::new(TreeMapConfig::default().with_title(
        "Tree Map",
        Some("Top sellers grouped by category".to_string()),
    )));
    for (heading, url) in [
        ("Tree map: video games", VIDEO_GAME_URL),
        ("Tree map: movies", MOVIE_URL),
        ("Tree map: kickstarter", KICKSTARTER_URL),
    ] {
        tree_map.widget_mut().set_source(url);
        sections.push(show(&mut tree_map, &client, heading.to_string()));
    }

    let report = html::render_report("Vizdeck widgets", &sections);
    std::fs::write(&output, report).with_context(|| format!("writing {output}"))?;
    tracing::info!(path = %output, sections = sections.len(), "report written");
    Ok(())
}

fn show<W: Widget>(host: &mut WidgetHost<W>, client: &Client, heading: String) -> Section {
    match host.load_with(|url| fetch_json(client, url)) {
        LoadOutcome::Rendered { diffs } => {
            tracing::info!(widget = %heading, marks = diffs.len(), "rendered");
        }
        LoadOutcome::Failed { .. } | LoadOutcome::Stale => {
            return Section {
                heading,
                svg: String::new(),
                tooltip: None,
                note: Some("Loading failed; see the log for details.".to_string()),
            };
        }
    }

    let target = host
        .scene()
        .marks_in_paint_order()
        .into_iter()
        .find(|m| m.datum.is_some())
        .and_then(center);
    if let Some(point) = target {
        host.pointer_move(point);
    }
    let svg = to_svg_string(host.scene(), host.view());
    let tooltip = host.tooltip().is_visible().then(|| tooltip_html(host.tooltip()));
    Section {
        heading,
        svg,
        tooltip,
        note: None,
    }
}

fn center(mark: &Mark) -> Option<Point> {
    let bounds = match &mark.shape {
        MarkShape::Rect(r) => *r,
        MarkShape::Path(p) => p.bounding_box(),
        MarkShape::Text(_) => return None,
    };
    Some(bounds.center() + mark.offset)
}

fn fetch_json(client: &Client, url: &str) -> Result<Value, FetchError> {
    tracing::debug!(url, "fetching");
    let response = client.get(url).send().map_err(|e| FetchError::Network {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.json::<Value>().map_err(|e| FetchError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
