//! Reusable renderer base: the standard visual properties and their
//! notification plumbing.
//!
//! Concrete renderers compose a `RendererBase` instead of inheriting
//! from it: they embed one, delegate the property surface to it, and
//! keep their own draw logic. `RendererBase` also implements
//! [`GutterRenderer`] directly, which yields the documented default
//! renderer: a fixed-size column that paints nothing but its background
//! fill, if one is set.

use crate::canvas::{Canvas, Rgb};
use crate::layout::Rect;
use crate::view::TextPos;

use super::{AlignmentMode, GutterRenderer, NoticeSender, RendererState};

/// Standard renderer state: visibility, padding, alignment, fixed size
/// and background fill, plus the attached notice sender.
///
/// Every setter short-circuits when the value is unchanged, so property
/// churn does not translate into redraw storms.
#[derive(Debug, Default)]
pub struct RendererBase {
    visible: bool,
    xpad: i32,
    ypad: i32,
    xalign: f32,
    yalign: f32,
    alignment_mode: AlignmentMode,
    fixed_size: (i32, i32),
    background: Option<Rgb>,
    notices: Option<NoticeSender>,
}

impl RendererBase {
    /// Create a base with default properties: visible, no padding,
    /// top-left alignment, zero fixed size, no background.
    pub fn new() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    /// Whether the renderer is visible.
    pub const fn visible(&self) -> bool {
        self.visible
    }

    /// Set visibility; queues a redraw on change.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.queue_draw();
        }
    }

    /// Get `(xpad, ypad)` in pixels.
    pub const fn padding(&self) -> (i32, i32) {
        (self.xpad, self.ypad)
    }

    /// Set the padding. Either value can be negative to leave that
    /// axis unchanged, so one axis can be set in isolation.
    pub fn set_padding(&mut self, xpad: i32, ypad: i32) {
        let mut changed = false;

        if xpad >= 0 && xpad != self.xpad {
            self.xpad = xpad;
            changed = true;
        }
        if ypad >= 0 && ypad != self.ypad {
            self.ypad = ypad;
            changed = true;
        }

        if changed {
            self.queue_draw();
        }
    }

    /// Get `(xalign, yalign)` in the range [0, 1].
    pub const fn alignment(&self) -> (f32, f32) {
        (self.xalign, self.yalign)
    }

    /// Set the alignment. Either value can be negative to leave that
    /// axis unchanged.
    pub fn set_alignment(&mut self, xalign: f32, yalign: f32) {
        let mut changed = false;

        if xalign >= 0.0 && (xalign - self.xalign).abs() > f32::EPSILON {
            self.xalign = xalign;
            changed = true;
        }
        if yalign >= 0.0 && (yalign - self.yalign).abs() > f32::EPSILON {
            self.yalign = yalign;
            changed = true;
        }

        if changed {
            self.queue_draw();
        }
    }

    /// Get the alignment mode.
    pub const fn alignment_mode(&self) -> AlignmentMode {
        self.alignment_mode
    }

    /// Set the alignment mode; queues a redraw on change.
    pub fn set_alignment_mode(&mut self, mode: AlignmentMode) {
        if self.alignment_mode != mode {
            self.alignment_mode = mode;
            self.queue_draw();
        }
    }

    /// Get the fixed size `(width, height)`.
    pub const fn fixed_size(&self) -> (i32, i32) {
        self.fixed_size
    }

    /// Set the fixed size; announces a size change on change.
    pub fn set_fixed_size(&mut self, width: i32, height: i32) {
        if self.fixed_size != (width, height) {
            self.fixed_size = (width, height);
            self.size_changed();
        }
    }

    /// Get the background fill color, if one is set.
    pub const fn background(&self) -> Option<Rgb> {
        self.background
    }

    /// Set or clear the background fill; queues a redraw on change.
    pub fn set_background(&mut self, color: Option<Rgb>) {
        if self.background != color {
            self.background = color;
            self.queue_draw();
        }
    }

    /// Fill `background` with the background color, if one is set.
    /// The standard first step of a `draw` implementation.
    pub fn draw_background(&self, canvas: &mut dyn Canvas, background: &Rect) {
        if let Some(color) = self.background {
            canvas.save();
            canvas.fill_rect(*background, color);
            canvas.restore();
        }
    }

    /// Announce a size change to the owning gutter, if attached.
    pub fn size_changed(&self) {
        if let Some(notices) = &self.notices {
            notices.size_changed();
        }
    }

    /// Request a strip repaint from the owning gutter, if attached.
    pub fn queue_draw(&self) {
        if let Some(notices) = &self.notices {
            notices.queue_draw();
        }
    }

    /// Store the notice bus. Called from `GutterRenderer::attach`.
    pub fn attach(&mut self, notices: NoticeSender) {
        self.notices = Some(notices);
    }

    /// Drop the notice bus. Called from `GutterRenderer::detach`.
    pub fn detach(&mut self) {
        self.notices = None;
    }
}

impl GutterRenderer for RendererBase {
    fn size(&self) -> (i32, i32) {
        self.fixed_size
    }

    fn draw(
        &mut self,
        canvas: &mut dyn Canvas,
        background: &Rect,
        _cell: &Rect,
        _start: TextPos,
        _end: TextPos,
        _state: RendererState,
    ) {
        self.draw_background(canvas, background);
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn attach(&mut self, notices: NoticeSender) {
        Self::attach(self, notices);
    }

    fn detach(&mut self) {
        Self::detach(self);
    }
}
