// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! HTML report assembly.

use std::fmt::Write as _;

/// One rendered widget in the report.
#[derive(Debug)]
pub(crate) struct Section {
    pub(crate) heading: String,
    pub(crate) svg: String,
    pub(crate) tooltip: Option<String>,
    pub(crate) note: Option<String>,
}

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 24px; background: #fafafa; }
section { margin-bottom: 48px; }
.stage { position: relative; display: inline-block; background: #fff; border: 1px solid #ddd; }
#tooltip { position: absolute; pointer-events: none; padding: 6px 10px; border-radius: 4px;
  background: rgba(20, 20, 30, 0.85); color: #fff; font-size: 13px; white-space: nowrap; }
.note { color: #a33; }
"#;

pub(crate) fn render_report(title: &str, sections: &[Section]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html><head><meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{}</title>", escape_html(title));
    let _ = writeln!(out, "<style>{STYLE}</style></head><body>");
    let _ = writeln!(out, "<h1>{}</h1>", escape_html(title));
    for section in sections {
        let _ = writeln!(out, "<section>");
        let _ = writeln!(out, "<h2>{}</h2>", escape_html(&section.heading));
        if let Some(note) = &section.note {
            let _ = writeln!(out, "<p class=\"note\">{}</p>", escape_html(note));
        }
        if !section.svg.is_empty() {
            let _ = writeln!(out, "<div class=\"stage\">");
            out.push_str(&section.svg);
            if let Some(tooltip) = &section.tooltip {
                out.push_str(tooltip);
                out.push('\n');
            }
            let _ = writeln!(out, "</div>");
        }
        let _ = writeln!(out, "</section>");
    }
    let _ = writeln!(out, "</body></html>");
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
