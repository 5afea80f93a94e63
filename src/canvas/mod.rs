//! Draw-context and text-layout interfaces.
//!
//! The gutter does not render anything itself; it orchestrates renderer
//! plugins that paint into a host-supplied 2D surface. `Canvas` is the
//! minimal contract that surface must honor: a clip stack with
//! save/restore, solid fills, and text-layout painting. Real hosts back
//! it with a vector canvas (cairo, skia, wgpu); tests and the demo use
//! the monospace implementations in this module.

mod color;
mod monospace;

pub use color::Rgb;
pub use monospace::{MonospaceLayout, MonospaceMetrics};

use crate::layout::Rect;

/// A 2D drawing surface with a clip stack.
///
/// The compositor brackets every renderer callback in `save`/`clip`/
/// `restore`, so renderers can paint freely without escaping their cell.
pub trait Canvas {
    /// Push the current clip state.
    fn save(&mut self);

    /// Pop back to the most recently saved clip state.
    fn restore(&mut self);

    /// Intersect the current clip with `rect`.
    fn clip(&mut self, rect: Rect);

    /// Fill `rect` with a solid color, honoring the current clip.
    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    /// Paint a text layout with its top-left corner at (x, y).
    fn draw_layout(&mut self, x: i32, y: i32, layout: &dyn TextLayout);
}

/// A measured, paintable run of text.
///
/// Created by the host view (themed with the view's font) and consumed
/// by both text measurement and painting. Markup content uses the
/// host's rich-text syntax; a layout only ever holds one of the two.
pub trait TextLayout {
    /// Set plain text content.
    fn set_text(&mut self, text: &str);

    /// Set rich-markup content.
    fn set_markup(&mut self, markup: &str);

    /// Current content, plain or markup.
    fn text(&self) -> &str;

    /// Whether the current content is markup.
    fn is_markup(&self) -> bool;

    /// Rendered size in pixels.
    fn pixel_size(&self) -> (i32, i32);
}
