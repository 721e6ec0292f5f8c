// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover interaction: per-mark hover state, the tooltip and optional highlighting.
//!
//! Every mark with a bound datum is either [`HoverState::Idle`] or
//! [`HoverState::Hovering`]. Tooltip content is a pure function of the widget's
//! [`RenderContext`] and the datum index. Opacity changes are described as [`Fade`]s for the
//! host to animate; nothing here owns a timer.

use std::time::Duration;

use hashbrown::HashMap;
use kurbo::{Point, Vec2};
use peniko::Color;
use serde::{Deserialize, Deserializer};
use vizdeck_core::{DataAttr, Mark, MarkId};

use crate::color::parse_css_color;

/// Tooltip opacity while visible.
pub const VISIBLE_OPACITY: f64 = 0.9;

/// What a widget exposes to the overlay about its rendered data.
pub trait RenderContext: core::fmt::Debug {
    /// Number of bound datums.
    fn datum_count(&self) -> usize;

    /// Tooltip content for datum `index`.
    fn tooltip(&self, index: usize) -> Option<TooltipContent>;

    /// The scale-derived fill of datum `index`, used to restore highlighted marks.
    fn base_fill(&self, index: usize) -> Option<Color>;
}

/// Tooltip text plus the datum attribute mirrored onto the tooltip element.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipContent {
    /// Lines of text.
    pub lines: Vec<String>,
    /// The `data-*` attribute of the hovered datum.
    pub attr: Option<DataAttr>,
}

impl TooltipContent {
    /// Creates content from lines.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            attr: None,
        }
    }

    /// Sets the mirrored attribute.
    pub fn with_attr(mut self, attr: DataAttr) -> Self {
        self.attr = Some(attr);
        self
    }

    /// Returns the lines joined with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// A requested opacity transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
    /// Target opacity.
    pub to: f64,
    /// Transition duration.
    pub duration: Duration,
}

/// Where the tooltip is placed.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TooltipAnchor {
    /// Offset from the pointer position.
    Pointer {
        /// Horizontal offset.
        dx: f64,
        /// Vertical offset.
        dy: f64,
    },
    /// At `index * slot_width + dx` horizontally and a fixed `y`, ignoring the pointer.
    Slot {
        /// Width of one datum slot.
        slot_width: f64,
        /// Horizontal offset.
        dx: f64,
        /// Fixed vertical position.
        y: f64,
    },
}

impl TooltipAnchor {
    /// Resolves the tooltip position for datum `index`.
    ///
    /// Pointer anchoring without a pointer position falls back to the mark's bounds corner
    /// (or the origin for marks without geometric bounds).
    pub fn resolve(&self, index: usize, mark: &Mark, pointer: Option<Point>) -> Point {
        match *self {
            Self::Pointer { dx, dy } => {
                let base = pointer
                    .or_else(|| mark.bounds().map(|b| b.origin()))
                    .unwrap_or(Point::ORIGIN);
                base + Vec2::new(dx, dy)
            }
            Self::Slot { slot_width, dx, y } => Point::new(index as f64 * slot_width + dx, y),
        }
    }
}

/// Overlay behavior for one widget.
///
/// Deserializes from JSON with fades in milliseconds (`fade_in_ms`, `fade_out_ms`) and the
/// highlight as a CSS color string.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Tooltip placement.
    pub anchor: TooltipAnchor,
    /// Fade-in duration.
    #[serde(rename = "fade_in_ms", deserialize_with = "millis")]
    pub fade_in: Duration,
    /// Fade-out duration.
    #[serde(rename = "fade_out_ms", deserialize_with = "millis")]
    pub fade_out: Duration,
    /// Fill applied to a hovered mark, if any.
    #[serde(deserialize_with = "css_color")]
    pub highlight: Option<Color>,
}

fn millis<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_millis)
}

fn css_color<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Color>, D::Error> {
    Option::<String>::deserialize(d)?
        .map(|s| parse_css_color(&s).map_err(serde::de::Error::custom))
        .transpose()
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            anchor: TooltipAnchor::Pointer {
                dx: 10.0,
                dy: -28.0,
            },
            fade_in: Duration::from_millis(200),
            fade_out: Duration::from_millis(500),
            highlight: None,
        }
    }
}

/// The tooltip element state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TooltipState {
    /// Current content; `None` once hidden.
    pub content: Option<TooltipContent>,
    /// Position in widget coordinates.
    pub position: Point,
    /// Target opacity.
    pub opacity: f64,
    /// The transition towards `opacity`.
    pub fade: Option<Fade>,
    /// The mark that currently owns the tooltip.
    pub owner: Option<MarkId>,
}

impl TooltipState {
    /// Returns `true` while the tooltip is shown (or fading in).
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Owns the tooltip of one widget.
#[derive(Clone, Debug, Default)]
pub struct TooltipController {
    state: TooltipState,
}

impl TooltipController {
    /// Shows `content` at `position`, owned by `owner`.
    pub fn show(&mut self, owner: MarkId, content: TooltipContent, position: Point, fade: Duration) {
        self.state = TooltipState {
            content: Some(content),
            position,
            opacity: VISIBLE_OPACITY,
            fade: Some(Fade {
                to: VISIBLE_OPACITY,
                duration: fade,
            }),
            owner: Some(owner),
        };
    }

    /// Hides the tooltip if `owner` owns it. Returns `true` if it was hidden.
    pub fn hide(&mut self, owner: MarkId, fade: Duration) -> bool {
        if self.state.owner != Some(owner) {
            return false;
        }
        self.state = TooltipState {
            content: None,
            position: self.state.position,
            opacity: 0.0,
            fade: Some(Fade {
                to: 0.0,
                duration: fade,
            }),
            owner: None,
        };
        true
    }

    /// Returns the current state.
    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    /// Resets to the initial hidden state.
    pub fn reset(&mut self) {
        self.state = TooltipState::default();
    }
}

/// Per-mark hover state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HoverState {
    /// Not under the pointer.
    #[default]
    Idle,
    /// Under the pointer.
    Hovering,
}

/// A scene change requested by the overlay.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayEffect {
    /// Replace the fill of a mark.
    Fill {
        /// Target mark.
        mark: MarkId,
        /// New fill.
        fill: Color,
    },
}

/// Hover state machine and tooltip for one widget.
#[derive(Clone, Debug, Default)]
pub struct Overlay {
    config: OverlayConfig,
    tooltip: TooltipController,
    hovering: HashMap<MarkId, HoverState>,
}

impl Overlay {
    /// Creates an overlay.
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            tooltip: TooltipController::default(),
            hovering: HashMap::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Handles the pointer entering `mark`.
    ///
    /// Marks without a bound datum, whose datum is out of the context's range, or whose
    /// datum has no tooltip, are ignored.
    pub fn pointer_enter(
        &mut self,
        ctx: &dyn RenderContext,
        mark: &Mark,
        pointer: Option<Point>,
    ) -> Vec<OverlayEffect> {
        let Some(index) = mark.datum.filter(|&i| i < ctx.datum_count()) else {
            return Vec::new();
        };
        if self.hover_state(mark.id) == HoverState::Hovering {
            return Vec::new();
        }
        let Some(content) = ctx.tooltip(index) else {
            return Vec::new();
        };
        let position = self.config.anchor.resolve(index, mark, pointer);
        self.hovering.insert(mark.id, HoverState::Hovering);
        self.tooltip
            .show(mark.id, content, position, self.config.fade_in);
        tracing::trace!(mark = mark.id.0, index, "hover enter");

        self.config
            .highlight
            .map(|fill| OverlayEffect::Fill {
                mark: mark.id,
                fill,
            })
            .into_iter()
            .collect()
    }

    /// Handles the pointer leaving `mark`.
    ///
    /// Only a mark that is hovering changes state; the tooltip fades out only if that mark
    /// owns it.
    pub fn pointer_leave(&mut self, ctx: &dyn RenderContext, mark: &Mark) -> Vec<OverlayEffect> {
        if self.hovering.remove(&mark.id).is_none() {
            return Vec::new();
        }
        self.tooltip.hide(mark.id, self.config.fade_out);
        tracing::trace!(mark = mark.id.0, "hover leave");

        if self.config.highlight.is_none() {
            return Vec::new();
        }
        mark.datum
            .and_then(|index| ctx.base_fill(index))
            .map(|fill| OverlayEffect::Fill {
                mark: mark.id,
                fill,
            })
            .into_iter()
            .collect()
    }

    /// Returns the hover state of a mark.
    pub fn hover_state(&self, mark: MarkId) -> HoverState {
        self.hovering.get(&mark).copied().unwrap_or_default()
    }

    /// Returns the tooltip state.
    pub fn tooltip(&self) -> &TooltipState {
        self.tooltip.state()
    }

    /// Forgets all hover state and hides the tooltip.
    pub fn reset(&mut self) {
        self.hovering.clear();
        self.tooltip.reset();
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use vizdeck_core::DataAttrName;

    use super::*;

    #[derive(Debug)]
    struct Values(Vec<f64>);

    impl RenderContext for Values {
        fn datum_count(&self) -> usize {
            self.0.len()
        }

        fn tooltip(&self, index: usize) -> Option<TooltipContent> {
            let v = self.0.get(index)?;
            Some(
                TooltipContent::new([format!("${v} Billion")])
                    .with_attr(DataAttr::new(DataAttrName::Date, format!("d{index}"))),
            )
        }

        fn base_fill(&self, index: usize) -> Option<Color> {
            self.0.get(index).map(|_| Color::from_rgba8(0, 0, 255, 255))
        }
    }

    fn bar(id: u64, datum: usize) -> Mark {
        Mark::builder(MarkId(id))
            .rect(Rect::new(datum as f64 * 5.0, 0.0, datum as f64 * 5.0 + 5.0, 10.0))
            .datum(datum)
            .build()
    }

    #[test]
    fn enter_shows_and_leave_fades_out() {
        let ctx = Values(vec![1065.9, 976.1]);
        let mut overlay = Overlay::new(OverlayConfig::default());
        let m = bar(1, 0);

        overlay.pointer_enter(&ctx, &m, Some(Point::new(100.0, 100.0)));
        let t = overlay.tooltip();
        assert_eq!(t.opacity, VISIBLE_OPACITY);
        assert_eq!(t.position, Point::new(110.0, 72.0));
        assert!(t.content.as_ref().unwrap().text().contains("1065.9"));
        assert_eq!(overlay.hover_state(m.id), HoverState::Hovering);

        overlay.pointer_leave(&ctx, &m);
        let t = overlay.tooltip();
        assert_eq!(t.opacity, 0.0);
        assert_eq!(
            t.fade,
            Some(Fade {
                to: 0.0,
                duration: Duration::from_millis(500)
            })
        );
        assert_eq!(overlay.hover_state(m.id), HoverState::Idle);
    }

    #[test]
    fn leave_on_a_mark_not_under_the_pointer_changes_nothing() {
        let ctx = Values(vec![1.0, 2.0]);
        let mut overlay = Overlay::new(OverlayConfig::default());
        let (a, b) = (bar(1, 0), bar(2, 1));

        overlay.pointer_enter(&ctx, &a, None);
        let before = overlay.tooltip().clone();
        assert!(overlay.pointer_leave(&ctx, &b).is_empty());
        assert_eq!(overlay.tooltip(), &before);
        assert_eq!(overlay.hover_state(a.id), HoverState::Hovering);
    }

    #[test]
    fn stale_leave_does_not_hide_the_new_owner() {
        let ctx = Values(vec![1.0, 2.0]);
        let mut overlay = Overlay::new(OverlayConfig::default());
        let (a, b) = (bar(1, 0), bar(2, 1));

        overlay.pointer_enter(&ctx, &a, None);
        overlay.pointer_enter(&ctx, &b, None);
        overlay.pointer_leave(&ctx, &a);
        assert_eq!(overlay.tooltip().owner, Some(b.id));
        assert!(overlay.tooltip().is_visible());
    }

    #[test]
    fn slot_anchor_uses_the_datum_index() {
        let ctx = Values(vec![1.0, 2.0, 3.0]);
        let mut overlay = Overlay::new(OverlayConfig {
            anchor: TooltipAnchor::Slot {
                slot_width: 3.5,
                dx: 40.0,
                y: 350.0,
            },
            ..OverlayConfig::default()
        });
        overlay.pointer_enter(&ctx, &bar(3, 2), Some(Point::new(999.0, 999.0)));
        assert_eq!(overlay.tooltip().position, Point::new(47.0, 350.0));
    }

    #[test]
    fn highlight_is_restored_from_the_context() {
        let ctx = Values(vec![1.0]);
        let highlight = Color::from_rgba8(255, 165, 0, 255);
        let mut overlay = Overlay::new(OverlayConfig {
            highlight: Some(highlight),
            ..OverlayConfig::default()
        });
        let m = bar(1, 0);
        assert_eq!(
            overlay.pointer_enter(&ctx, &m, None),
            [OverlayEffect::Fill {
                mark: m.id,
                fill: highlight
            }]
        );
        assert_eq!(
            overlay.pointer_leave(&ctx, &m),
            [OverlayEffect::Fill {
                mark: m.id,
                fill: Color::from_rgba8(0, 0, 255, 255)
            }]
        );
    }

    #[derive(Debug)]
    struct Unbounded(usize);

    impl RenderContext for Unbounded {
        fn datum_count(&self) -> usize {
            self.0
        }

        fn tooltip(&self, index: usize) -> Option<TooltipContent> {
            Some(TooltipContent::new([format!("datum {index}")]))
        }

        fn base_fill(&self, _index: usize) -> Option<Color> {
            None
        }
    }

    #[test]
    fn datums_past_the_context_are_ignored() {
        let ctx = Unbounded(2);
        let mut overlay = Overlay::new(OverlayConfig::default());
        let stale = bar(7, 5);
        overlay.pointer_enter(&ctx, &stale, None);
        assert_eq!(overlay.hover_state(stale.id), HoverState::Idle);
        assert_eq!(overlay.tooltip(), &TooltipState::default());

        overlay.pointer_enter(&ctx, &bar(1, 1), None);
        assert!(overlay.tooltip().is_visible(), "in-range datums still show the tooltip");
    }

    #[test]
    fn config_loads_from_json() {
        let config: OverlayConfig = serde_json::from_value(serde_json::json!({
            "anchor": { "kind": "slot", "slot_width": 3.5, "dx": 40.0, "y": 350.0 },
            "fade_out_ms": 750,
            "highlight": "orange"
        }))
        .unwrap();
        assert_eq!(
            config.anchor,
            TooltipAnchor::Slot {
                slot_width: 3.5,
                dx: 40.0,
                y: 350.0
            }
        );
        assert_eq!(config.fade_in, Duration::from_millis(200), "missing fields keep defaults");
        assert_eq!(config.fade_out, Duration::from_millis(750));
        assert_eq!(config.highlight, Some(Color::from_rgba8(0xff, 0xa5, 0x00, 0xff)));

        let err = serde_json::from_value::<OverlayConfig>(serde_json::json!({ "highlight": "#12" }));
        assert!(err.is_err(), "invalid highlight colors are rejected");
    }

    #[test]
    fn marks_without_a_datum_are_ignored() {
        let ctx = Values(vec![1.0]);
        let mut overlay = Overlay::new(OverlayConfig::default());
        let axis_label = Mark::builder(MarkId(9)).build();
        assert!(overlay.pointer_enter(&ctx, &axis_label, None).is_empty());
        assert_eq!(overlay.tooltip(), &TooltipState::default());
    }
}
