//! Pointer event types forwarded by the host.

use crate::view::SurfaceId;

/// A pointer event relayed from the host view.
///
/// Coordinates are relative to the surface the event targeted; the
/// compositor compares `surface` against its own strip surface to
/// decide whether the event concerns it at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// Surface the event targeted.
    pub surface: SurfaceId,
    /// X coordinate within the surface.
    pub x: i32,
    /// Y coordinate within the surface.
    pub y: i32,
}

impl PointerEvent {
    /// Create a pointer event.
    pub const fn new(surface: SurfaceId, x: i32, y: i32) -> Self {
        Self { surface, x, y }
    }
}
