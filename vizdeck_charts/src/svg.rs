// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG and HTML emission.
//!
//! Marks become `<rect>`, `<path>` and `<text>` elements carrying their element id, class and
//! `data-*` attributes verbatim. Marks sharing a group are wrapped in one `<g id="...">`.

use kurbo::{Rect, Vec2};
use peniko::Brush;
use vizdeck_core::{Mark, MarkShape, Scene, TextAnchor, TextBaseline};

use crate::overlay::TooltipState;

/// Serializes `scene` into a standalone SVG document covering `view`.
///
/// Ungrouped marks are written first, in paint order, followed by one `<g>` per group in order
/// of first appearance.
pub fn to_svg_string(scene: &Scene, view: Rect) -> String {
    let mut out = String::new();
    out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
    out.push_str(&format!(
        r#"viewBox="{} {} {} {}" width="{}" height="{}">"#,
        view.x0,
        view.y0,
        view.width(),
        view.height(),
        view.width(),
        view.height()
    ));
    out.push('\n');

    let marks = scene.marks_in_paint_order();
    for mark in marks.iter().filter(|m| m.group.is_none()) {
        write_mark(&mut out, mark, "");
    }

    let mut groups: Vec<&str> = Vec::new();
    for group in marks.iter().filter_map(|m| m.group.as_deref()) {
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    for group in groups {
        out.push_str(&format!("<g id=\"{}\">\n", escape_xml(group)));
        for mark in marks.iter().filter(|m| m.group.as_deref() == Some(group)) {
            write_mark(&mut out, mark, "  ");
        }
        out.push_str("</g>\n");
    }

    out.push_str("</svg>\n");
    out
}

/// Serializes the tooltip element (`id="tooltip"`), mirroring the hovered datum's attribute.
pub fn tooltip_html(state: &TooltipState) -> String {
    let mut out = String::from(r#"<div id="tooltip""#);
    if let Some(attr) = state.content.as_ref().and_then(|c| c.attr.as_ref()) {
        out.push_str(&format!(
            r#" {}="{}""#,
            attr.name.as_str(),
            escape_xml(&attr.value)
        ));
    }
    out.push_str(&format!(
        r#" style="opacity: {}; left: {}px; top: {}px;">"#,
        state.opacity, state.position.x, state.position.y
    ));
    if let Some(content) = &state.content {
        let lines: Vec<String> = content.lines.iter().map(|l| escape_xml(l)).collect();
        out.push_str(&lines.join("<br>"));
    }
    out.push_str("</div>");
    out
}

fn write_mark(out: &mut String, mark: &Mark, indent: &str) {
    out.push_str(indent);
    match &mark.shape {
        MarkShape::Rect(r) => {
            out.push_str("<rect");
            write_identity(out, mark);
            out.push_str(&format!(
                r#" x="{}" y="{}" width="{}" height="{}""#,
                r.x0,
                r.y0,
                r.width(),
                r.height()
            ));
            write_paint(out, mark);
            write_translate(out, mark.offset, None);
            out.push_str("/>\n");
        }
        MarkShape::Path(p) => {
            out.push_str("<path");
            write_identity(out, mark);
            out.push_str(&format!(r#" d="{}""#, p.to_svg()));
            write_paint(out, mark);
            write_translate(out, mark.offset, None);
            out.push_str("/>\n");
        }
        MarkShape::Text(t) => {
            let baseline = match t.baseline {
                TextBaseline::Middle => "middle",
                TextBaseline::Alphabetic => "alphabetic",
                TextBaseline::Hanging => "hanging",
                TextBaseline::Ideographic => "ideographic",
            };
            out.push_str("<text");
            write_identity(out, mark);
            out.push_str(&format!(
                r#" x="{}" y="{}" font-size="{}" dominant-baseline="{}""#,
                t.pos.x, t.pos.y, t.font_size, baseline
            ));
            out.push_str(match t.anchor {
                TextAnchor::Start => r#" text-anchor="start""#,
                TextAnchor::Middle => r#" text-anchor="middle""#,
                TextAnchor::End => r#" text-anchor="end""#,
            });
            write_paint(out, mark);
            let rotate = (t.angle != 0.0).then_some((t.angle, t.pos.x, t.pos.y));
            write_translate(out, mark.offset, rotate);
            out.push('>');
            if t.spans.is_empty() {
                out.push_str(&escape_xml(&t.text));
            } else {
                for span in &t.spans {
                    out.push_str(&format!(
                        r#"<tspan x="{}" y="{}">{}</tspan>"#,
                        span.pos.x,
                        span.pos.y,
                        escape_xml(&span.text)
                    ));
                }
            }
            out.push_str("</text>\n");
        }
    }
}

fn write_identity(out: &mut String, mark: &Mark) {
    if let Some(id) = &mark.element_id {
        out.push_str(&format!(r#" id="{}""#, escape_xml(id)));
    }
    if let Some(class) = &mark.class {
        out.push_str(&format!(r#" class="{}""#, escape_xml(class)));
    }
    for attr in &mark.attrs {
        out.push_str(&format!(
            r#" {}="{}""#,
            attr.name.as_str(),
            escape_xml(&attr.value)
        ));
    }
}

fn write_paint(out: &mut String, mark: &Mark) {
    write_paint_attr(out, "fill", &mark.fill);
    if let Some(stroke) = &mark.stroke
        && stroke.width > 0.0
    {
        write_paint_attr(out, "stroke", &stroke.brush);
        out.push_str(&format!(r#" stroke-width="{}""#, stroke.width));
    }
}

fn write_translate(out: &mut String, offset: Vec2, rotate: Option<(f64, f64, f64)>) {
    let mut parts = Vec::new();
    if offset != Vec2::ZERO {
        parts.push(format!("translate({},{})", offset.x, offset.y));
    }
    if let Some((angle, x, y)) = rotate {
        parts.push(format!("rotate({angle} {x} {y})"));
    }
    if !parts.is_empty() {
        out.push_str(&format!(r#" transform="{}""#, parts.join(" ")));
    }
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            if rgba.a == 0 {
                return ("none".to_string(), None);
            }
            let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let opacity = (rgba.a != 255).then(|| f64::from(rgba.a) / 255.0);
            (fill, opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    out.push_str(&format!(r#" {name}="{value}""#));
    if let Some(o) = opacity {
        out.push_str(&format!(r#" {name}-opacity="{o}""#));
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use kurbo::Point;
    use peniko::Color;
    use vizdeck_core::{DataAttr, DataAttrName, MarkId, TextShape, TextSpan};

    use super::*;
    use crate::overlay::TooltipContent;

    #[test]
    fn marks_keep_ids_classes_and_data_attributes() {
        let mut scene = Scene::new();
        scene.rebuild([
            Mark::builder(MarkId(1))
                .rect(Rect::new(0.0, 10.0, 5.0, 30.0))
                .fill(Color::from_rgba8(0xdd, 0xdd, 0xff, 0xff))
                .offset(Vec2::new(60.0, 50.0))
                .class("bar")
                .attr(DataAttrName::Date, "1947-01-01")
                .attr(DataAttrName::Gdp, "243.1")
                .build(),
            Mark::builder(MarkId(2))
                .text(TextShape::new(Point::new(3.0, 4.0), "AT&T"))
                .group("x-axis")
                .build(),
        ]);
        let svg = to_svg_string(&scene, Rect::new(0.0, 0.0, 1120.0, 600.0));
        assert!(svg.starts_with("<svg"), "{svg}");
        assert!(
            svg.contains(r##"<rect class="bar" data-date="1947-01-01" data-gdp="243.1" x="0" y="10" width="5" height="20" fill="#ddddff" transform="translate(60,50)"/>"##),
            "{svg}"
        );
        assert!(svg.contains(r#"<g id="x-axis">"#), "{svg}");
        assert!(svg.contains("AT&amp;T"), "{svg}");
        assert!(svg.contains(r#"fill="none""#), "transparent text fill: {svg}");
    }

    #[test]
    fn stacked_labels_become_tspans() {
        let mut scene = Scene::new();
        scene.rebuild([Mark::builder(MarkId(1))
            .text(TextShape::lines(vec![
                TextSpan {
                    pos: Point::new(3.0, 13.0),
                    text: "Wii".into(),
                },
                TextSpan {
                    pos: Point::new(3.0, 23.0),
                    text: "Sports".into(),
                },
            ]))
            .class("tile-text")
            .build()]);
        let svg = to_svg_string(&scene, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(
            svg.contains(r#"<tspan x="3" y="13">Wii</tspan><tspan x="3" y="23">Sports</tspan>"#),
            "{svg}"
        );
    }

    #[test]
    fn tooltip_mirrors_the_datum_attribute() {
        let state = TooltipState {
            content: Some(
                TooltipContent::new(["1947-01-01", "$243.1 Billion"])
                    .with_attr(DataAttr::new(DataAttrName::Date, "1947-01-01")),
            ),
            position: Point::new(40.0, 400.0),
            opacity: 0.9,
            fade: None,
            owner: Some(MarkId(1)),
        };
        assert_eq!(
            tooltip_html(&state),
            r#"<div id="tooltip" data-date="1947-01-01" style="opacity: 0.9; left: 40px; top: 400px;">1947-01-01<br>$243.1 Billion</div>"#
        );
        assert_eq!(
            tooltip_html(&TooltipState::default()),
            r#"<div id="tooltip" style="opacity: 0; left: 0px; top: 0px;"></div>"#
        );
    }
}
