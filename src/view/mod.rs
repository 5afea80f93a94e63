//! Host text-view interface.
//!
//! The gutter is a guest inside somebody else's widget: the host view
//! owns line layout, wrapping, scrolling and coordinate spaces. This
//! module is the capability set the compositor consumes from it. All
//! methods are queries or idempotent requests; hosts use interior
//! mutability where a request (width reservation, invalidation) has to
//! touch widget state.
//!
//! Two coordinate spaces are in play:
//!
//! - **buffer y**: distance from the top of the (unscrolled) text.
//! - **strip y**: distance from the top of the gutter's drawing
//!   surface, i.e. what pointer events and clip regions carry.

use crate::canvas::TextLayout;
use crate::layout::Rect;

/// Which edge of the view a gutter decorates.
///
/// A view typically owns two independent gutters, one per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GutterSide {
    /// The strip left of the text.
    Left,
    /// The strip right of the text.
    Right,
}

/// Opaque identity of a drawing surface.
///
/// Input events carry the surface they targeted; the compositor only
/// ever compares ids, it never looks inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

impl SurfaceId {
    /// Create a new surface id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A position in the text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextPos {
    /// Zero-based line index.
    pub line: u32,
    /// Zero-based column within the line.
    pub column: u32,
}

impl TextPos {
    /// Position at the start of `line`.
    pub const fn line_start(line: u32) -> Self {
        Self { line, column: 0 }
    }
}

/// Capability set the compositor consumes from the host view.
pub trait TextView {
    /// Number of lines in the buffer. An empty buffer reports 0.
    fn line_count(&self) -> u32;

    /// Line containing buffer coordinate `y` and the top of that line.
    ///
    /// `y` past the last line clamps to the last line; the returned top
    /// can therefore exceed `y` only when `y` lies above line 0 or the
    /// buffer is empty. Callers use that to detect out-of-range hits.
    fn line_at_y(&self, y: i32) -> (u32, i32);

    /// Vertical extent `(top, height)` of a line in buffer coordinates.
    ///
    /// Wrapped lines report the full multi-row extent.
    fn line_yrange(&self, line: u32) -> (i32, i32);

    /// Position at the end of `line`.
    fn line_end(&self, line: u32) -> TextPos;

    /// On-screen rectangle of the single visual row containing `pos`,
    /// in strip coordinates. Used by renderers aligning against the
    /// first or last row of a wrapped line.
    fn row_rect(&self, pos: TextPos) -> Rect;

    /// Line holding the primary insertion point.
    fn cursor_line(&self) -> u32;

    /// Convert a strip-space y to buffer space for the given side.
    fn strip_to_buffer_y(&self, side: GutterSide, y: i32) -> i32;

    /// Convert a buffer-space y to strip space for the given side.
    fn buffer_to_strip_y(&self, side: GutterSide, y: i32) -> i32;

    /// Reserve `width` pixels of screen space for the gutter strip.
    ///
    /// A width of 0 releases the strip's drawing surface entirely.
    fn reserve_strip_width(&self, side: GutterSide, width: i32);

    /// Identity of the strip's drawing surface, or `None` while no
    /// width is reserved.
    fn strip_surface(&self, side: GutterSide) -> Option<SurfaceId>;

    /// Invalidate the whole strip so the host schedules a repaint.
    /// Coalescing repeated invalidations is the host's business.
    fn invalidate_strip(&self, side: GutterSide);

    /// Create a text layout themed like the view's own text.
    fn create_text_layout(&self) -> Box<dyn TextLayout>;
}
