// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget titles.
//!
//! The title and the optional description are emitted as text marks carrying the `title` and
//! `description` element ids.

use kurbo::Point;
use peniko::Brush;
use peniko::color::palette::css;
use vizdeck_core::{Mark, MarkId, TextAnchor, TextBaseline, TextShape};

use crate::z_order;

/// A widget-level title with an optional description line below it.
#[derive(Clone, Debug)]
pub struct TitleSpec {
    /// Stable-id base; the title uses `id_base`, the description `id_base + 1`.
    pub id_base: u64,
    /// Title text.
    pub text: String,
    /// Optional description text.
    pub description: Option<String>,
    /// Anchor point of the title.
    pub pos: Point,
    /// Title font size.
    pub font_size: f64,
    /// Description font size.
    pub description_font_size: f64,
    /// Vertical gap between title and description.
    pub gap: f64,
    /// Fill paint.
    pub fill: Brush,
}

impl TitleSpec {
    /// Creates a centered title at `pos` with default styling.
    pub fn new(id_base: u64, text: impl Into<String>, pos: Point) -> Self {
        Self {
            id_base,
            text: text.into(),
            description: None,
            pos,
            font_size: 24.0,
            description_font_size: 16.0,
            gap: 8.0,
            fill: Brush::Solid(css::BLACK),
        }
    }

    /// Sets the description line.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the title font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Generates the title marks.
    pub fn marks(&self) -> Vec<Mark> {
        let mut out = vec![self.text_mark(
            MarkId::from_raw(self.id_base),
            "title",
            &self.text,
            self.pos,
            self.font_size,
        )];
        if let Some(description) = &self.description {
            let pos = Point::new(self.pos.x, self.pos.y + self.font_size + self.gap);
            out.push(self.text_mark(
                MarkId::from_raw(self.id_base + 1),
                "description",
                description,
                pos,
                self.description_font_size,
            ));
        }
        out
    }

    fn text_mark(&self, id: MarkId, element_id: &str, text: &str, pos: Point, size: f64) -> Mark {
        let mut shape = TextShape::new(pos, text);
        shape.font_size = size;
        shape.anchor = TextAnchor::Middle;
        shape.baseline = TextBaseline::Alphabetic;
        Mark::builder(id)
            .text(shape)
            .z_index(z_order::TITLES)
            .fill(self.fill.clone())
            .element_id(element_id)
            .build()
    }
}
