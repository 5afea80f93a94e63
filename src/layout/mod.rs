//! Layout primitives for gutter geometry.

mod rect;

pub use rect::Rect;
