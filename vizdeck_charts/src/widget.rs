// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget pipelines and the host that drives them.
//!
//! A [`Widget`] turns fetched JSON documents into marks plus a [`RenderContext`]. A
//! [`WidgetHost`] owns one widget together with its [`Scene`] and [`Overlay`], tags every load
//! with a generation number and routes pointer events to the overlay.

use kurbo::{Point, Rect, Shape};
use serde_json::Value;
use vizdeck_core::{Mark, MarkDiff, MarkId, MarkShape, Scene};
use vizdeck_data::NormalizeError;

use crate::color::ColorError;
use crate::overlay::{
    HoverState, Overlay, OverlayConfig, OverlayEffect, RenderContext, TooltipState,
};

/// Id base of the data marks (bars, cells, regions, tiles).
pub(crate) const SERIES_IDS: u64 = 0x1_0000_0000;
/// Id base of the horizontal axis.
pub(crate) const X_AXIS_IDS: u64 = 0x2_0000_0000;
/// Id base of the vertical axis.
pub(crate) const Y_AXIS_IDS: u64 = 0x3_0000_0000;
/// Id base of the legend.
pub(crate) const LEGEND_IDS: u64 = 0x4_0000_0000;
/// Id base of the title and description.
pub(crate) const TITLE_IDS: u64 = 0x5_0000_0000;

/// Errors raised while fetching a widget's documents.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete.
    #[error("request to {url} failed: {reason}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport error description.
        reason: String,
    },
    /// The server answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The body is not valid JSON.
    #[error("{url} returned an undecodable body: {reason}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder error description.
        reason: String,
    },
}

/// Errors raised while turning documents into marks.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The widget received the wrong number of documents.
    #[error("expected {expected} documents, got {got}")]
    DocumentCount {
        /// Number of sources of the widget.
        expected: usize,
        /// Number of documents received.
        got: usize,
    },
    /// A document has an unexpected shape.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    /// A configured color is invalid.
    #[error(transparent)]
    Color(#[from] ColorError),
    /// The normalized data has nothing to draw.
    #[error("{what} is empty")]
    Empty {
        /// What turned out empty.
        what: &'static str,
    },
}

/// The output of a successful render.
#[derive(Debug)]
pub struct Rendered {
    /// Every mark of the widget.
    pub marks: Vec<Mark>,
    /// Scales and data needed by the overlay.
    pub context: Box<dyn RenderContext>,
    /// Overlay behavior for this render (tooltip slots may depend on the data).
    pub overlay: OverlayConfig,
    /// The full view rectangle.
    pub view: Rect,
}

/// A data-driven widget.
pub trait Widget: core::fmt::Debug {
    /// A short name used in logs.
    fn name(&self) -> &str;

    /// URLs to fetch, in the order `render` expects the documents.
    fn sources(&self) -> Vec<String>;

    /// Builds marks from the fetched documents.
    fn render(&self, documents: &[Value]) -> Result<Rendered, RenderError>;
}

impl<W: Widget + ?Sized> Widget for Box<W> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sources(&self) -> Vec<String> {
        (**self).sources()
    }

    fn render(&self, documents: &[Value]) -> Result<Rendered, RenderError> {
        (**self).render(documents)
    }
}

/// Checks the number of documents handed to [`Widget::render`].
pub(crate) fn expect_documents(documents: &[Value], expected: usize) -> Result<(), RenderError> {
    if documents.len() == expected {
        Ok(())
    } else {
        Err(RenderError::DocumentCount {
            expected,
            got: documents.len(),
        })
    }
}

/// Identifies one load started with [`WidgetHost::begin_load`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    /// Returns the generation of this load.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`WidgetHost::finish_load`] did.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The scene was rebuilt.
    Rendered {
        /// Exits of the previous marks followed by enters of the new ones.
        diffs: Vec<MarkDiff>,
    },
    /// Fetching or rendering failed; the scene was cleared.
    Failed {
        /// Exits of the previous marks.
        diffs: Vec<MarkDiff>,
    },
    /// A newer load was started; the result was discarded.
    Stale,
}

/// Owns a widget, its scene and its overlay.
#[derive(Debug)]
pub struct WidgetHost<W> {
    widget: W,
    scene: Scene,
    overlay: Overlay,
    context: Option<Box<dyn RenderContext>>,
    view: Rect,
    generation: u64,
    hovered: Option<MarkId>,
}

impl<W: Widget> WidgetHost<W> {
    /// Creates a host with an empty scene.
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            scene: Scene::new(),
            overlay: Overlay::default(),
            context: None,
            view: Rect::ZERO,
            generation: 0,
            hovered: None,
        }
    }

    /// Returns the widget.
    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Returns the widget for reconfiguration. Changes apply on the next load.
    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    /// Starts a load, superseding any load still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        tracing::debug!(widget = self.widget.name(), generation = self.generation, "load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Completes the load identified by `ticket`.
    ///
    /// Results of superseded loads are dropped without touching the scene. Failures are logged
    /// and clear the scene; successes replace every mark.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        documents: Result<Vec<Value>, FetchError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                widget = self.widget.name(),
                stale = ticket.generation,
                current = self.generation,
                "discarding stale load"
            );
            return LoadOutcome::Stale;
        }

        let rendered = match documents {
            Ok(documents) => self.widget.render(&documents).map_err(|e| {
                tracing::error!(widget = self.widget.name(), error = %e, "render failed");
            }),
            Err(e) => {
                tracing::error!(widget = self.widget.name(), error = %e, "fetch failed");
                Err(())
            }
        };

        self.overlay.reset();
        self.hovered = None;
        match rendered {
            Ok(rendered) => {
                let diffs = self.scene.rebuild(rendered.marks);
                self.overlay = Overlay::new(rendered.overlay);
                self.context = Some(rendered.context);
                self.view = rendered.view;
                tracing::debug!(
                    widget = self.widget.name(),
                    marks = self.scene.len(),
                    "scene rebuilt"
                );
                LoadOutcome::Rendered { diffs }
            }
            Err(()) => {
                self.context = None;
                self.view = Rect::ZERO;
                LoadOutcome::Failed {
                    diffs: self.scene.clear(),
                }
            }
        }
    }

    /// Fetches every source with `fetch` and completes the load.
    ///
    /// The first failing source aborts the load.
    pub fn load_with<F>(&mut self, mut fetch: F) -> LoadOutcome
    where
        F: FnMut(&str) -> Result<Value, FetchError>,
    {
        let ticket = self.begin_load();
        let documents = self
            .widget
            .sources()
            .iter()
            .map(|url| fetch(url))
            .collect::<Result<Vec<_>, _>>();
        self.finish_load(ticket, documents)
    }

    /// Handles the pointer entering mark `id`. Returns the effects applied to the scene.
    pub fn pointer_enter(&mut self, id: MarkId, pointer: Option<Point>) -> Vec<OverlayEffect> {
        let (Some(ctx), Some(mark)) = (self.context.as_deref(), self.scene.get(id)) else {
            return Vec::new();
        };
        let effects = self.overlay.pointer_enter(ctx, mark, pointer);
        if self.overlay.hover_state(id) == HoverState::Hovering {
            self.hovered = Some(id);
        }
        self.apply(&effects);
        effects
    }

    /// Handles the pointer leaving mark `id`. Returns the effects applied to the scene.
    pub fn pointer_leave(&mut self, id: MarkId) -> Vec<OverlayEffect> {
        let (Some(ctx), Some(mark)) = (self.context.as_deref(), self.scene.get(id)) else {
            return Vec::new();
        };
        let effects = self.overlay.pointer_leave(ctx, mark);
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        self.apply(&effects);
        effects
    }

    /// Moves the pointer to `point`, issuing leave/enter for the marks under it.
    pub fn pointer_move(&mut self, point: Point) -> Vec<OverlayEffect> {
        let target = self.hit_test(point);
        if target == self.hovered {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if let Some(old) = self.hovered {
            effects.extend(self.pointer_leave(old));
        }
        if let Some(new) = target {
            effects.extend(self.pointer_enter(new, Some(point)));
        }
        effects
    }

    /// Returns the topmost mark containing `point` whose datum belongs to the current render.
    pub fn hit_test(&self, point: Point) -> Option<MarkId> {
        let count = self.context.as_deref().map_or(0, |ctx| ctx.datum_count());
        self.scene
            .marks_in_paint_order()
            .into_iter()
            .rev()
            .filter(|m| m.datum.is_some_and(|i| i < count))
            .find(|m| contains(m, point))
            .map(|m| m.id)
    }

    fn apply(&mut self, effects: &[OverlayEffect]) {
        for effect in effects {
            match effect {
                OverlayEffect::Fill { mark, fill } => {
                    self.scene.set_fill(*mark, *fill);
                }
            }
        }
    }

    /// Returns the current scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Returns the tooltip state.
    pub fn tooltip(&self) -> &TooltipState {
        self.overlay.tooltip()
    }

    /// Returns the overlay.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Returns the view rectangle of the last successful render.
    pub fn view(&self) -> Rect {
        self.view
    }

    /// Returns the generation of the most recent load.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn contains(mark: &Mark, point: Point) -> bool {
    let local = point - mark.offset;
    match &mark.shape {
        MarkShape::Rect(r) => r.contains(local),
        MarkShape::Path(p) => p.contains(local),
        MarkShape::Text(_) => false,
    }
}
