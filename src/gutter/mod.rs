//! The gutter compositor.
//!
//! A [`Gutter`] owns an ordered collection of renderer plugins, lays
//! them out into a shared strip beside the text, and dispatches paint
//! and pointer traffic to the renderer owning each column. See
//! [`Gutter`] for the full contract.

mod compositor;
mod events;
mod lines;

pub use compositor::{Gutter, RendererHandle, POSITION_LINES, POSITION_MARKS};
pub use events::PointerEvent;
pub use lines::{line_geometry, total_height, LineInfo};
