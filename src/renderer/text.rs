//! Text renderer: the standard text-drawing gutter plugin.
//!
//! Draws one run of text per line (line numbers being the classic
//! tenant). Content can be plain or rich markup, positioned by the
//! base alignment properties. A separately settable measurement text
//! decides the column width, so a line-number column can be measured
//! against its widest value ("999") while individual cells show "1".

use std::rc::Weak;

use log::trace;

use crate::canvas::{Canvas, TextLayout};
use crate::layout::Rect;
use crate::view::{TextPos, TextView};

use super::{AlignmentMode, GutterRenderer, NoticeSender, RendererBase, RendererState};

/// Text content for one cell, plain or markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextContent {
    /// Plain text.
    Plain(String),
    /// Rich markup in the host's syntax.
    Markup(String),
}

/// Callback filling per-cell content just before it is drawn.
///
/// Receives the line's start and end positions and the render state;
/// returns what the cell should display. This is how hosts supply
/// per-line data (line numbers, VCS markers) without writing a
/// renderer from scratch.
pub type DataFn = Box<dyn FnMut(TextPos, TextPos, RendererState) -> TextContent>;

/// A gutter renderer that draws text.
pub struct TextRenderer {
    base: RendererBase,
    view: Weak<dyn TextView>,
    text: String,
    is_markup: bool,
    /// Measurement text, when decoupled from the display text.
    measure: Option<(String, bool)>,
    /// Measured size, cached until the next size change.
    measured: std::cell::Cell<Option<(i32, i32)>>,
    /// Per-paint layout, alive between `begin` and `end`.
    layout: Option<Box<dyn TextLayout>>,
    data_fn: Option<DataFn>,
}

impl TextRenderer {
    /// Create a text renderer for the given view.
    ///
    /// The view reference is weak: the renderer goes inert (zero size,
    /// draws nothing) once the view is gone.
    pub fn new(view: Weak<dyn TextView>) -> Self {
        Self {
            base: RendererBase::new(),
            view,
            text: String::new(),
            is_markup: false,
            measure: None,
            measured: std::cell::Cell::new(None),
            layout: None,
            data_fn: None,
        }
    }

    /// The composed property base.
    pub const fn base(&self) -> &RendererBase {
        &self.base
    }

    /// Mutable access to the composed property base.
    pub fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    /// Set plain display text. Resets the measurement text to mirror
    /// the display text again.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.is_markup = false;
        self.measure = None;
    }

    /// Set markup display text. Resets the measurement text to mirror
    /// the display text again.
    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.text = markup.into();
        self.is_markup = true;
        self.measure = None;
    }

    /// Set the measurement text used for sizing, independently of the
    /// display text. Invalidates the cached size and announces the
    /// change to the owning gutter.
    pub fn set_measure_text(&mut self, content: TextContent) {
        self.measure = Some(match content {
            TextContent::Plain(s) => (s, false),
            TextContent::Markup(s) => (s, true),
        });
        self.measured.set(None);
        self.base.size_changed();
    }

    /// Install a per-cell content callback. See [`DataFn`].
    pub fn set_data_fn(&mut self, f: DataFn) {
        self.data_fn = Some(f);
    }

    /// Announce that the display text's natural size changed.
    ///
    /// Snapshots the current display text as the measurement text,
    /// invalidates the cached size and notifies the owning gutter.
    pub fn size_changed(&mut self) {
        self.measure = Some((self.text.clone(), self.is_markup));
        self.measured.set(None);
        self.base.size_changed();
    }

    fn apply_content(layout: &mut dyn TextLayout, text: &str, is_markup: bool) {
        if is_markup {
            layout.set_markup(text);
        } else {
            layout.set_text(text);
        }
    }

    fn measure_size(&self) -> (i32, i32) {
        if let Some(size) = self.measured.get() {
            return size;
        }

        let Some(view) = self.view.upgrade() else {
            return (0, 0);
        };

        let mut layout = view.create_text_layout();
        let (text, is_markup) = self
            .measure
            .as_ref()
            .map_or((self.text.as_str(), self.is_markup), |(t, m)| {
                (t.as_str(), *m)
            });
        Self::apply_content(layout.as_mut(), text, is_markup);

        let size = layout.pixel_size();
        trace!("text renderer measured {:?} for {:?}", size, text);
        self.measured.set(Some(size));
        size
    }

    /// Layout origin for content of `(width, height)` in `cell`,
    /// honoring the padding and the alignment mode.
    ///
    /// Cell mode aligns within the whole cell; First/Last align within
    /// the on-screen band of the line's first/last visual row, so a
    /// wrapped line can pin its number to the row the text starts or
    /// ends on.
    fn layout_origin(
        &self,
        cell: &Rect,
        start: TextPos,
        end: TextPos,
        width: i32,
        height: i32,
    ) -> (i32, i32) {
        let (xpad, ypad) = self.base.padding();
        let (xalign, yalign) = self.base.alignment();
        let x = cell.x + xpad + ((cell.width - 2 * xpad - width) as f32 * xalign) as i32;

        let (band_y, band_height) = match self.base.alignment_mode() {
            AlignmentMode::Cell => (cell.y, cell.height),
            AlignmentMode::First => self.row_band(start).unwrap_or((cell.y, cell.height)),
            AlignmentMode::Last => self.row_band(end).unwrap_or((cell.y, cell.height)),
        };
        let y = band_y + ypad + ((band_height - 2 * ypad - height) as f32 * yalign) as i32;

        (x, y)
    }

    /// `(y, height)` of the visual row containing `pos`, in strip
    /// coordinates.
    fn row_band(&self, pos: TextPos) -> Option<(i32, i32)> {
        self.view.upgrade().map(|view| {
            let rect = view.row_rect(pos);
            (rect.y, rect.height)
        })
    }
}

impl GutterRenderer for TextRenderer {
    fn size(&self) -> (i32, i32) {
        let (width, height) = self.measure_size();
        let (xpad, ypad) = self.base.padding();
        (width + 2 * xpad, height + 2 * ypad)
    }

    fn begin(
        &mut self,
        _canvas: &mut dyn Canvas,
        _background: &Rect,
        _cell: &Rect,
        _start: TextPos,
        _end: TextPos,
    ) {
        self.layout = self.view.upgrade().map(|view| view.create_text_layout());
    }

    fn draw(
        &mut self,
        canvas: &mut dyn Canvas,
        background: &Rect,
        cell: &Rect,
        start: TextPos,
        end: TextPos,
        state: RendererState,
    ) {
        self.base.draw_background(canvas, background);

        let content = self.data_fn.as_mut().map(|f| f(start, end, state));
        match content {
            Some(TextContent::Plain(s)) => {
                self.text = s;
                self.is_markup = false;
            }
            Some(TextContent::Markup(s)) => {
                self.text = s;
                self.is_markup = true;
            }
            None => {}
        }

        // No layout means begin() never ran; nothing to paint with.
        let Some(mut layout) = self.layout.take() else {
            return;
        };
        Self::apply_content(layout.as_mut(), &self.text, self.is_markup);

        let (width, height) = layout.pixel_size();
        let (x, y) = self.layout_origin(cell, start, end, width, height);

        canvas.draw_layout(x, y, layout.as_ref());
        self.layout = Some(layout);
    }

    fn end(&mut self) {
        self.layout = None;
    }

    fn is_visible(&self) -> bool {
        self.base.visible()
    }

    fn attach(&mut self, notices: NoticeSender) {
        self.base.attach(notices);
    }

    fn detach(&mut self) {
        self.base.detach();
    }
}
