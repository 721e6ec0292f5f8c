// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marks: stable-identity shapes with paint and verifier-facing attributes.

use kurbo::{BezPath, Point, Rect, Shape, Vec2};
use peniko::Brush;

/// Stable identity for a mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(pub u64);

impl MarkId {
    /// Wraps a raw id.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Derives an id for row `row` of a mark family rooted at `base`.
    ///
    /// Families are expected to use disjoint bases spaced at least `1 << 32` apart.
    pub const fn for_row(base: u64, row: u64) -> Self {
        Self(base.wrapping_add(row))
    }
}

/// The contract attribute names read by external verifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataAttrName {
    /// `data-date`
    Date,
    /// `data-gdp`
    Gdp,
    /// `data-year`
    Year,
    /// `data-month`
    Month,
    /// `data-temp`
    Temp,
    /// `data-fips`
    Fips,
    /// `data-education`
    Education,
    /// `data-name`
    Name,
    /// `data-category`
    Category,
    /// `data-value`
    Value,
}

impl DataAttrName {
    /// Returns the attribute name as written into markup.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "data-date",
            Self::Gdp => "data-gdp",
            Self::Year => "data-year",
            Self::Month => "data-month",
            Self::Temp => "data-temp",
            Self::Fips => "data-fips",
            Self::Education => "data-education",
            Self::Name => "data-name",
            Self::Category => "data-category",
            Self::Value => "data-value",
        }
    }
}

/// A `data-*` attribute and its already formatted value.
#[derive(Clone, Debug, PartialEq)]
pub struct DataAttr {
    /// Attribute name.
    pub name: DataAttrName,
    /// Attribute value, verbatim.
    pub value: String,
}

impl DataAttr {
    /// Creates an attribute.
    pub fn new(name: DataAttrName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    /// Text starts at the anchor point.
    Start,
    /// Text is centered on the anchor point.
    Middle,
    /// Text ends at the anchor point.
    End,
}

/// Vertical text baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// Centered vertically.
    Middle,
    /// Alphabetic baseline.
    Alphabetic,
    /// Top of the em box.
    Hanging,
    /// Ideographic baseline.
    Ideographic,
}

/// A positioned line inside a multi-line text mark.
#[derive(Clone, Debug, PartialEq)]
pub struct TextSpan {
    /// Position of the line, relative to the mark offset.
    pub pos: Point,
    /// Line content.
    pub text: String,
}

/// Text geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct TextShape {
    /// Anchor position.
    pub pos: Point,
    /// Single-line content (ignored when `spans` is non-empty).
    pub text: String,
    /// Stacked lines.
    pub spans: Vec<TextSpan>,
    /// Font size.
    pub font_size: f64,
    /// Rotation in degrees around `pos`.
    pub angle: f64,
    /// Horizontal anchor.
    pub anchor: TextAnchor,
    /// Vertical baseline.
    pub baseline: TextBaseline,
}

impl TextShape {
    /// Creates single-line text with default styling.
    pub fn new(pos: Point, text: impl Into<String>) -> Self {
        Self {
            pos,
            text: text.into(),
            spans: Vec::new(),
            font_size: 12.0,
            angle: 0.0,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Alphabetic,
        }
    }

    /// Creates stacked text from positioned lines.
    pub fn lines(spans: Vec<TextSpan>) -> Self {
        Self {
            spans,
            ..Self::new(Point::ZERO, "")
        }
    }

    /// Returns the full text content (lines joined with a space).
    pub fn content(&self) -> String {
        if self.spans.is_empty() {
            return self.text.clone();
        }
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The kind of a mark, for diffs and quick filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// Axis-aligned rectangle.
    Rect,
    /// Arbitrary path.
    Path,
    /// Text.
    Text,
}

/// Mark geometry.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkShape {
    /// Axis-aligned rectangle.
    Rect(Rect),
    /// Arbitrary path.
    Path(BezPath),
    /// Text.
    Text(TextShape),
}

/// A stroke paint and width.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    /// Stroke paint.
    pub brush: Brush,
    /// Stroke width.
    pub width: f64,
}

/// A renderable shape with stable identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    /// Stable id.
    pub id: MarkId,
    /// Render order; ties keep insertion order.
    pub z_index: i32,
    /// Geometry, in the coordinate system established by `offset`.
    pub shape: MarkShape,
    /// Fill paint.
    pub fill: Brush,
    /// Optional stroke.
    pub stroke: Option<Stroke>,
    /// Translation applied at render time (margin offsets).
    pub offset: Vec2,
    /// Element id of the group this mark belongs to (e.g. `x-axis`).
    pub group: Option<String>,
    /// Element id of the mark itself.
    pub element_id: Option<String>,
    /// Class attribute.
    pub class: Option<String>,
    /// Verifier-facing `data-*` attributes, in emission order.
    pub attrs: Vec<DataAttr>,
    /// Index of the bound datum in the widget's render context.
    pub datum: Option<usize>,
}

impl Mark {
    /// Starts building a mark.
    pub fn builder(id: MarkId) -> MarkBuilder {
        MarkBuilder {
            id,
            z_index: 0,
            shape: MarkShape::Rect(Rect::ZERO),
            fill: Brush::default(),
            stroke: None,
            offset: Vec2::ZERO,
            group: None,
            element_id: None,
            class: None,
            attrs: Vec::new(),
            datum: None,
        }
    }

    /// Returns the kind of this mark.
    pub fn kind(&self) -> MarkKind {
        match self.shape {
            MarkShape::Rect(_) => MarkKind::Rect,
            MarkShape::Path(_) => MarkKind::Path,
            MarkShape::Text(_) => MarkKind::Text,
        }
    }

    /// Returns the value of a `data-*` attribute, if present.
    pub fn attr(&self, name: DataAttrName) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Returns the rectangle geometry in scene coordinates (offset applied).
    pub fn screen_rect(&self) -> Option<Rect> {
        match &self.shape {
            MarkShape::Rect(r) => Some(*r + self.offset),
            _ => None,
        }
    }

    /// Returns geometric bounds in scene coordinates.
    ///
    /// Text has no intrinsic bounds here; renderers estimate those from font metrics.
    pub fn bounds(&self) -> Option<Rect> {
        let local = match &self.shape {
            MarkShape::Rect(r) => *r,
            MarkShape::Path(p) => {
                if p.elements().is_empty() {
                    return None;
                }
                p.bounding_box()
            }
            MarkShape::Text(_) => return None,
        };
        Some(local + self.offset)
    }
}

/// Builder returned by [`Mark::builder`].
#[derive(Clone, Debug)]
pub struct MarkBuilder {
    id: MarkId,
    z_index: i32,
    shape: MarkShape,
    fill: Brush,
    stroke: Option<Stroke>,
    offset: Vec2,
    group: Option<String>,
    element_id: Option<String>,
    class: Option<String>,
    attrs: Vec<DataAttr>,
    datum: Option<usize>,
}

impl MarkBuilder {
    /// Uses rectangle geometry.
    pub fn rect(mut self, rect: Rect) -> Self {
        self.shape = MarkShape::Rect(rect);
        self
    }

    /// Uses path geometry.
    pub fn path(mut self, path: BezPath) -> Self {
        self.shape = MarkShape::Path(path);
        self
    }

    /// Uses text geometry.
    pub fn text(mut self, text: TextShape) -> Self {
        self.shape = MarkShape::Text(text);
        self
    }

    /// Sets the z-index.
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Sets the fill paint.
    pub fn fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets the stroke paint and width.
    pub fn stroke(mut self, brush: impl Into<Brush>, width: f64) -> Self {
        self.stroke = Some(Stroke {
            brush: brush.into(),
            width,
        });
        self
    }

    /// Sets the render-time translation.
    pub fn offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Places the mark in a named group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the element id.
    pub fn element_id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    /// Sets the class attribute.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Appends a `data-*` attribute.
    pub fn attr(mut self, name: DataAttrName, value: impl Into<String>) -> Self {
        self.attrs.push(DataAttr::new(name, value));
        self
    }

    /// Binds the mark to datum `index` of the render context.
    pub fn datum(mut self, index: usize) -> Self {
        self.datum = Some(index);
        self
    }

    /// Finishes the mark.
    pub fn build(self) -> Mark {
        Mark {
            id: self.id,
            z_index: self.z_index,
            shape: self.shape,
            fill: self.fill,
            stroke: self.stroke,
            offset: self.offset,
            group: self.group,
            element_id: self.element_id,
            class: self.class,
            attrs: self.attrs,
            datum: self.datum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_rect_applies_offset() {
        let m = Mark::builder(MarkId(1))
            .rect(Rect::new(0.0, 10.0, 5.0, 30.0))
            .offset(Vec2::new(60.0, 50.0))
            .attr(DataAttrName::Gdp, "243.1")
            .build();
        assert_eq!(m.kind(), MarkKind::Rect);
        assert_eq!(m.screen_rect(), Some(Rect::new(60.0, 60.0, 65.0, 80.0)));
        assert_eq!(m.attr(DataAttrName::Gdp), Some("243.1"));
        assert_eq!(m.attr(DataAttrName::Date), None);
    }

    #[test]
    fn path_bounds_use_control_points() {
        let mut p = BezPath::new();
        p.move_to((1.0, 2.0));
        p.line_to((4.0, 8.0));
        p.close_path();
        let m = Mark::builder(MarkId(2)).path(p).build();
        assert_eq!(m.bounds(), Some(Rect::new(1.0, 2.0, 4.0, 8.0)));
        let empty = Mark::builder(MarkId(3)).path(BezPath::new()).build();
        assert_eq!(empty.bounds(), None);
    }

    #[test]
    fn stacked_text_content_joins_lines() {
        let t = TextShape::lines(vec![
            TextSpan {
                pos: Point::new(3.0, 13.0),
                text: "Super".into(),
            },
            TextSpan {
                pos: Point::new(3.0, 23.0),
                text: "Mario".into(),
            },
        ]);
        assert_eq!(t.content(), "Super Mario");
    }

    #[test]
    fn attribute_names_match_markup() {
        assert_eq!(DataAttrName::Education.as_str(), "data-education");
        assert_eq!(DataAttrName::Temp.as_str(), "data-temp");
    }
}
