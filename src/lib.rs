//! # Gutter
//!
//! A compositor for text-editor gutters: the informational strips
//! beside the text area that show line numbers, breakpoints, folding
//! marks and friends.
//!
//! ## Core Concepts
//!
//! - **Renderer plugins**: Each column of the gutter is a
//!   [`GutterRenderer`], packed at an ordered position
//! - **Composited strip**: The [`Gutter`] partitions the strip into
//!   per-renderer x-slices and per-line y-slices each paint pass
//! - **Host-agnostic**: The widget side lives behind the [`TextView`]
//!   and [`Canvas`] traits; the crate draws on whatever the host hands
//!   over
//! - **Deferred notices**: Renderers announce size and content changes
//!   over a channel, applied at the compositor's next entry point
//!
//! ## Example
//!
//! ```rust,ignore
//! use gutter::{Gutter, GutterSide, TextRenderer, POSITION_LINES};
//!
//! let mut gutter = Gutter::new(&view, GutterSide::Left);
//!
//! // A line-number column driven by a per-line callback.
//! let mut numbers = TextRenderer::new(Rc::downgrade(&view));
//! numbers.set_data_fn(|start, _end, _state| {
//!     TextContent::Plain(format!("{}", start.line + 1))
//! });
//!
//! gutter.insert(&(Rc::new(RefCell::new(numbers)) as _), POSITION_LINES);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod canvas;
pub mod gutter;
pub mod layout;
pub mod renderer;
pub mod view;

// Re-exports for convenience
pub use canvas::{Canvas, MonospaceLayout, MonospaceMetrics, Rgb, TextLayout};
pub use gutter::{Gutter, LineInfo, PointerEvent, RendererHandle, POSITION_LINES, POSITION_MARKS};
pub use layout::Rect;
pub use renderer::{
    AlignmentMode, DataFn, GutterRenderer, NoticeSender, RendererBase, RendererState,
    TextContent, TextRenderer, Tooltip,
};
pub use view::{GutterSide, SurfaceId, TextPos, TextView};
