//! Renderer plugins: the pluggable units that draw gutter columns.
//!
//! A renderer owns one vertical column of the gutter. The compositor
//! asks it for a natural size, then once per paint pass calls
//! `begin`, `draw` for every visible line, and `end`. Interactive
//! renderers additionally answer activation and tooltip queries.
//!
//! Renderers talk back to the compositor through a [`NoticeSender`]
//! handed over on [`GutterRenderer::attach`]: `size_changed` when the
//! natural size is stale and `queue_draw` when content changed. Both
//! are queued, never applied re-entrantly, so it is safe to emit them
//! at any time except from inside `begin`/`draw`/`end` (where they
//! would be wasted: the compositor drains the queue right after the
//! paint pass anyway).

mod base;
mod text;

pub use base::RendererBase;
pub use text::{DataFn, TextContent, TextRenderer};

use bitflags::bitflags;
use crossbeam_channel::Sender;

use crate::canvas::Canvas;
use crate::layout::Rect;
use crate::view::TextPos;

bitflags! {
    /// Transient visual state of a renderer on one line.
    ///
    /// The empty set is the normal state. Flags are recomputed by the
    /// compositor on every pointer motion and paint pass.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RendererState: u8 {
        /// The pointer hovers this renderer's column.
        const PRELIT = 0b0000_0001;
        /// The line holds the primary insertion point.
        const CURSOR = 0b0000_0010;
        /// The line is part of the selection.
        const SELECTED = 0b0000_0100;
    }
}

impl std::fmt::Debug for RendererState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// How renderer content is positioned when a line wraps into multiple
/// visual rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlignmentMode {
    /// Align within the full multi-row cell.
    #[default]
    Cell,
    /// Align against the first visual row of the line.
    First,
    /// Align against the last visual row of the line.
    Last,
}

/// Notifications a renderer emits upward to its compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The renderer's natural size is stale; the strip width must be
    /// recomputed and re-reserved on the host.
    SizeChanged,
    /// The renderer's content changed; the strip must be repainted.
    RedrawRequested,
}

/// Sending half of the renderer notification bus.
///
/// Cloneable and cheap; a renderer keeps it for the duration of its
/// membership in a gutter. Sends after the gutter is gone are silently
/// dropped.
#[derive(Debug, Clone)]
pub struct NoticeSender {
    tx: Sender<Notice>,
}

impl NoticeSender {
    pub(crate) const fn new(tx: Sender<Notice>) -> Self {
        Self { tx }
    }

    /// Announce that the natural size changed.
    pub fn size_changed(&self) {
        let _ = self.tx.send(Notice::SizeChanged);
    }

    /// Request a repaint of the whole strip.
    pub fn queue_draw(&self) {
        let _ = self.tx.send(Notice::RedrawRequested);
    }
}

/// Tooltip content sink.
///
/// Passed to [`GutterRenderer::query_tooltip`]; the renderer fills it
/// as a side effect and reports whether it did.
#[derive(Debug, Clone, Default)]
pub struct Tooltip {
    text: Option<String>,
    is_markup: bool,
}

impl Tooltip {
    /// An unset tooltip.
    pub const fn new() -> Self {
        Self {
            text: None,
            is_markup: false,
        }
    }

    /// Set plain text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
        self.is_markup = false;
    }

    /// Set rich-markup content.
    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.text = Some(markup.into());
        self.is_markup = true;
    }

    /// The content, if any was set.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Whether the content is markup.
    pub const fn is_markup(&self) -> bool {
        self.is_markup
    }

    /// Whether any content was set.
    pub const fn is_set(&self) -> bool {
        self.text.is_some()
    }
}

/// A gutter renderer plugin.
///
/// `draw` is the only required method; everything else defaults to the
/// inert behavior a passive, non-interactive renderer wants. Renderers
/// needing the standard visual properties (visibility, padding,
/// alignment, fixed size, background fill) compose a [`RendererBase`]
/// and delegate to it rather than reimplementing the plumbing.
pub trait GutterRenderer {
    /// Natural size `(width, height)` of the renderer, in pixels.
    ///
    /// The width decides the renderer's x-slice of the strip; the
    /// compositor re-queries it at the top of every paint and hit-test
    /// pass, so implementations should cache measured content.
    fn size(&self) -> (i32, i32);

    /// Called once before a paint pass over `start..end`.
    ///
    /// `background` spans the renderer's x-slice over all lines about
    /// to be drawn; per-paint state (e.g. a text layout) is built here.
    fn begin(
        &mut self,
        canvas: &mut dyn Canvas,
        background: &Rect,
        cell: &Rect,
        start: TextPos,
        end: TextPos,
    ) {
        let _ = (canvas, background, cell, start, end);
    }

    /// Paint one line's cell.
    ///
    /// The canvas is already clipped to `cell`. `state` carries the
    /// per-line flags (cursor, prelit, selected) the visual should
    /// reflect where relevant.
    fn draw(
        &mut self,
        canvas: &mut dyn Canvas,
        background: &Rect,
        cell: &Rect,
        start: TextPos,
        end: TextPos,
        state: RendererState,
    );

    /// Called once after a paint pass; release per-paint state.
    fn end(&mut self) {}

    /// Whether a press at `(x, y)` inside `area` on the line starting
    /// at `pos` would activate this renderer. Defaults to false for
    /// non-interactive renderers.
    fn query_activatable(&mut self, pos: TextPos, area: &Rect, x: i32, y: i32) -> bool {
        let _ = (pos, area, x, y);
        false
    }

    /// Activate the renderer. Only invoked after `query_activatable`
    /// returned true for the same event.
    fn activate(&mut self, pos: TextPos, area: &Rect, x: i32, y: i32) {
        let _ = (pos, area, x, y);
    }

    /// Fill `tooltip` for a hover at `(x, y)`; return whether content
    /// was set.
    fn query_tooltip(
        &mut self,
        pos: TextPos,
        area: &Rect,
        x: i32,
        y: i32,
        tooltip: &mut Tooltip,
    ) -> bool {
        let _ = (pos, area, x, y, tooltip);
        false
    }

    /// Whether the renderer currently occupies width in the strip.
    fn is_visible(&self) -> bool {
        true
    }

    /// Membership begins: the compositor hands over the notice bus.
    fn attach(&mut self, notices: NoticeSender) {
        let _ = notices;
    }

    /// Membership ends: drop the notice sender taken in `attach`.
    fn detach(&mut self) {}
}
