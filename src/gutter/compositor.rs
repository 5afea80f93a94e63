//! Gutter: composition of renderer plugins into one strip.
//!
//! # Architecture
//!
//! The gutter keeps its renderers in a list sorted by position and,
//! each frame, partitions the strip into per-renderer x-slices and the
//! visible range into per-line y-slices. Painting walks that grid:
//! one `begin` per renderer, one clipped `draw` per renderer per line,
//! one `end` per renderer. Pointer traffic walks it the other way,
//! from a pixel to the renderer and line underneath.
//!
//! # Liveness
//!
//! The host view is held weakly. Every public entry point upgrades the
//! reference and silently does nothing when the view is gone; the
//! gutter never owns, and never dangles into, its host.
//!
//! # Notices
//!
//! Renderers announce size changes and redraw requests through a
//! channel rather than calling back into the gutter, so announcements
//! made while the gutter iterates its own slot list (e.g. from inside
//! `draw`) are deferred and applied at the next entry point or right
//! after the paint pass completes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, trace};

use crate::canvas::Canvas;
use crate::layout::Rect;
use crate::renderer::{GutterRenderer, Notice, NoticeSender, RendererState, Tooltip};
use crate::view::{GutterSide, TextPos, TextView};

use super::events::PointerEvent;
use super::lines::{line_geometry, total_height};

/// Position of the builtin line-number renderer.
pub const POSITION_LINES: i32 = -30;

/// Position of the builtin marks renderer.
pub const POSITION_MARKS: i32 = -20;

/// Shared handle to a renderer plugin.
///
/// The gutter holds one strong reference for the duration of the
/// renderer's membership; callers keep their own to address the
/// renderer in `reorder`/`remove` and to mutate its properties.
/// Identity is pointer identity.
pub type RendererHandle = Rc<RefCell<dyn GutterRenderer>>;

/// One renderer plus the compositor-private bookkeeping around it.
struct Slot {
    renderer: RendererHandle,
    /// Sort key; lower positions sit closer to the text.
    position: i32,
    /// Transient visual state, recomputed on pointer motion.
    state: RendererState,
}

impl Slot {
    /// Current width contribution to the strip. Invisible renderers
    /// contribute nothing, which keeps paint and hit-test agreeing on
    /// the partition without special cases.
    fn width(&self) -> i32 {
        let renderer = self.renderer.borrow();
        if renderer.is_visible() {
            renderer.size().0.max(0)
        } else {
            0
        }
    }
}

/// The gutter compositor for one side of a text view.
pub struct Gutter {
    view: Weak<dyn TextView>,
    side: GutterSide,
    slots: Vec<Slot>,
    notice_tx: Sender<Notice>,
    notice_rx: Receiver<Notice>,
}

impl Gutter {
    /// Create a gutter decorating `side` of `view`.
    ///
    /// The view is referenced weakly; the gutter becomes inert once it
    /// is dropped.
    pub fn new(view: &Rc<dyn TextView>, side: GutterSide) -> Self {
        let (notice_tx, notice_rx) = unbounded();
        Self {
            view: Rc::downgrade(view),
            side,
            slots: Vec::new(),
            notice_tx,
            notice_rx,
        }
    }

    /// Which side of the view this gutter decorates.
    pub const fn side(&self) -> GutterSide {
        self.side
    }

    /// Number of renderers currently packed.
    pub fn renderer_count(&self) -> usize {
        self.slots.len()
    }

    /// Insert `renderer` at `position`.
    ///
    /// Lower positions sit closer to the text; the builtin conventions
    /// are [`POSITION_LINES`] and [`POSITION_MARKS`]. Equal positions
    /// keep insertion order. Inserting a renderer that is already
    /// present is a no-op, as is inserting into a gutter whose view is
    /// gone.
    pub fn insert(&mut self, renderer: &RendererHandle, position: i32) {
        self.drain_notices();

        if self.view.upgrade().is_none() || self.find(renderer).is_some() {
            return;
        }

        renderer
            .borrow_mut()
            .attach(NoticeSender::new(self.notice_tx.clone()));

        let slot = Slot {
            renderer: Rc::clone(renderer),
            position,
            state: RendererState::empty(),
        };
        self.insert_sorted(slot);

        trace!("inserted renderer at position {position}");
        self.revalidate_size();
    }

    /// Move `renderer` to a new position, keeping its transient state.
    /// No-op if the renderer is not packed in this gutter.
    pub fn reorder(&mut self, renderer: &RendererHandle, position: i32) {
        self.drain_notices();

        let Some(index) = self.find(renderer) else {
            return;
        };

        let mut slot = self.slots.remove(index);
        slot.position = position;
        self.insert_sorted(slot);

        trace!("reordered renderer to position {position}");
        self.revalidate_size();
    }

    /// Remove `renderer` from the gutter, detaching its notice bus.
    /// No-op if the renderer is not packed in this gutter.
    pub fn remove(&mut self, renderer: &RendererHandle) {
        self.drain_notices();

        let Some(index) = self.find(renderer) else {
            return;
        };

        let slot = self.slots.remove(index);
        slot.renderer.borrow_mut().detach();
        drop(slot);

        trace!("removed renderer");
        self.revalidate_size();
        self.do_redraw();
    }

    /// Invalidate the whole strip so the host repaints it. Idempotent;
    /// the host's paint scheduler coalesces requests.
    pub fn queue_draw(&mut self) {
        self.drain_notices();
        self.do_redraw();
    }

    /// Paint the clipped strip region.
    ///
    /// Every packed renderer receives exactly one `begin`/`end` pair
    /// and one `draw` per resolved line, zero-height lines included.
    /// No-op without a live view, a strip surface, or any renderers.
    pub fn draw(&mut self, canvas: &mut dyn Canvas, clip: Rect) {
        self.drain_notices();

        let Some(view) = self.view.upgrade() else {
            return;
        };
        if view.strip_surface(self.side).is_none() || self.slots.is_empty() || clip.is_empty() {
            return;
        }

        // One width partition per paint; both the begin/end spans and
        // the per-line loop slice against this same array.
        let sizes: Vec<i32> = self.slots.iter().map(Slot::width).collect();

        let y1 = view.strip_to_buffer_y(self.side, clip.y);
        let y2 = view.strip_to_buffer_y(self.side, clip.y + clip.height);
        let lines = line_geometry(view.as_ref(), y1, y2);

        let first = lines[0];
        let last = lines[lines.len() - 1];
        let region_start = TextPos::line_start(first.line);
        let region_end = view.line_end(last.line);

        let background = Rect::new(
            0,
            view.buffer_to_strip_y(self.side, first.top),
            0,
            total_height(&lines),
        );

        let mut x = 0;
        for (slot, &width) in self.slots.iter().zip(&sizes) {
            let span = background.x_slice(x, width);

            canvas.save();
            canvas.clip(span);
            slot.renderer
                .borrow_mut()
                .begin(canvas, &span, &span, region_start, region_end);
            canvas.restore();

            x += width;
        }

        let cursor_line = view.cursor_line();

        for info in &lines {
            let line_start = TextPos::line_start(info.line);
            let line_end = view.line_end(info.line);
            let y = view.buffer_to_strip_y(self.side, info.top);

            let mut x = 0;
            for (slot, &width) in self.slots.iter().zip(&sizes) {
                let cell = Rect::new(x, y, width, info.height);

                let mut state = slot.state;
                if info.line == cursor_line {
                    state |= RendererState::CURSOR;
                }

                canvas.save();
                canvas.clip(cell);
                slot.renderer
                    .borrow_mut()
                    .draw(canvas, &cell, &cell, line_start, line_end, state);
                canvas.restore();

                x += width;
            }
        }

        for slot in &self.slots {
            slot.renderer.borrow_mut().end();
        }

        // Apply anything renderers announced mid-paint.
        self.drain_notices();
    }

    /// The renderer owning column `x`, if any.
    ///
    /// Both the prelit-highlight path and the activation path resolve
    /// through here, so hover and click always agree on ownership.
    pub fn renderer_at_x(&self, x: i32) -> Option<RendererHandle> {
        self.hit_test(x)
            .map(|(index, _, _)| Rc::clone(&self.slots[index].renderer))
    }

    /// Pointer moved. Never consumes.
    pub fn motion_notify(&mut self, event: &PointerEvent) -> bool {
        self.update_prelit(event, true)
    }

    /// Pointer entered. Never consumes.
    pub fn enter_notify(&mut self, event: &PointerEvent) -> bool {
        self.update_prelit(event, true)
    }

    /// Pointer left. Never consumes.
    ///
    /// Deliberately not gated on the event's surface: the pointer may
    /// be leaving straight toward another widget, and an unconditional
    /// clear is what prevents a stuck highlight.
    pub fn leave_notify(&mut self, event: &PointerEvent) -> bool {
        self.update_prelit(event, false)
    }

    /// Button pressed. Consumes the event iff the renderer under the
    /// pointer reports itself activatable there and was activated.
    pub fn button_press(&mut self, event: &PointerEvent) -> bool {
        self.drain_notices();

        let Some(view) = self.view.upgrade() else {
            return false;
        };
        if view.strip_surface(self.side) != Some(event.surface) {
            return false;
        }

        let Some((index, offset, width)) = self.hit_test(event.x) else {
            return false;
        };

        let y_buf = view.strip_to_buffer_y(self.side, event.y);
        let (line, line_top) = view.line_at_y(y_buf);

        // Past the last line the resolved top can exceed the pointer;
        // such presses hit no line at all.
        if line_top > y_buf {
            return false;
        }

        let rect = self.cell_rect(view.as_ref(), offset, width, line);
        let pos = TextPos::line_start(line);

        let renderer = Rc::clone(&self.slots[index].renderer);
        let activatable = renderer
            .borrow_mut()
            .query_activatable(pos, &rect, event.x, event.y);

        if activatable {
            renderer.borrow_mut().activate(pos, &rect, event.x, event.y);
            true
        } else {
            false
        }
    }

    /// Tooltip requested at `(x, y)`. Keyboard-triggered queries are
    /// never handled. Returns whether the renderer set content.
    pub fn query_tooltip(
        &mut self,
        x: i32,
        y: i32,
        keyboard_mode: bool,
        tooltip: &mut Tooltip,
    ) -> bool {
        self.drain_notices();

        if keyboard_mode {
            return false;
        }
        let Some(view) = self.view.upgrade() else {
            return false;
        };

        let Some((index, offset, width)) = self.hit_test(x) else {
            return false;
        };

        let y_buf = view.strip_to_buffer_y(self.side, y);
        let (line, line_top) = view.line_at_y(y_buf);
        if line_top > y_buf {
            return false;
        }

        let rect = self.cell_rect(view.as_ref(), offset, width, line);
        let pos = TextPos::line_start(line);

        let renderer = Rc::clone(&self.slots[index].renderer);
        let mut renderer = renderer.borrow_mut();
        renderer.query_tooltip(pos, &rect, x, y, tooltip)
    }

    // ---- internals -----------------------------------------------------

    /// Slot index of `renderer`, by pointer identity.
    fn find(&self, renderer: &RendererHandle) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| Rc::ptr_eq(&slot.renderer, renderer))
    }

    /// Insert keeping the list sorted by position, after any slot with
    /// an equal position (stable among equals).
    fn insert_sorted(&mut self, slot: Slot) {
        let index = self
            .slots
            .partition_point(|other| other.position <= slot.position);
        self.slots.insert(index, slot);
    }

    /// Recompute the width sum and re-reserve the strip on the host.
    fn revalidate_size(&self) {
        let Some(view) = self.view.upgrade() else {
            return;
        };

        let width: i32 = self.slots.iter().map(Slot::width).sum();
        debug!("gutter {:?} width revalidated to {width}", self.side);
        view.reserve_strip_width(self.side, width);
    }

    fn do_redraw(&self) {
        if let Some(view) = self.view.upgrade() {
            view.invalidate_strip(self.side);
        }
    }

    /// Resolve `x` to `(slot index, x offset, width)` by walking the
    /// partition left to right.
    fn hit_test(&self, x: i32) -> Option<(usize, i32, i32)> {
        let mut offset = 0;

        for (index, slot) in self.slots.iter().enumerate() {
            let width = slot.width();
            if x >= offset && x < offset + width {
                return Some((index, offset, width));
            }
            offset += width;
        }

        None
    }

    /// Cell rectangle of one renderer's slice on one line, in strip
    /// coordinates.
    fn cell_rect(&self, view: &dyn TextView, offset: i32, width: i32, line: u32) -> Rect {
        let (top, height) = view.line_yrange(line);
        Rect::new(
            offset,
            view.buffer_to_strip_y(self.side, top),
            width,
            height,
        )
    }

    /// Flip prelit bits to match the renderer under `x`; redraw only
    /// when some slot actually changed.
    fn update_prelit(&mut self, event: &PointerEvent, require_own_surface: bool) -> bool {
        self.drain_notices();

        let Some(view) = self.view.upgrade() else {
            return false;
        };
        if require_own_surface && view.strip_surface(self.side) != Some(event.surface) {
            return false;
        }

        let at = self.hit_test(event.x).map(|(index, _, _)| index);
        let mut redraw = false;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let old = slot.state;

            if Some(index) == at {
                slot.state |= RendererState::PRELIT;
            } else {
                slot.state &= !RendererState::PRELIT;
            }

            redraw |= slot.state != old;
        }

        if redraw {
            view.invalidate_strip(self.side);
        }

        false
    }

    /// Apply queued renderer notices.
    fn drain_notices(&self) {
        let mut size_changed = false;
        let mut redraw = false;

        while let Ok(notice) = self.notice_rx.try_recv() {
            match notice {
                Notice::SizeChanged => size_changed = true,
                Notice::RedrawRequested => redraw = true,
            }
        }

        if size_changed {
            self.revalidate_size();
        }
        if redraw {
            self.do_redraw();
        }
    }
}

impl Drop for Gutter {
    /// Teardown detaches every renderer before the references go.
    fn drop(&mut self) {
        for slot in &self.slots {
            slot.renderer.borrow_mut().detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::canvas::{MonospaceLayout, MonospaceMetrics, Rgb, TextLayout};
    use crate::gutter::LineInfo;
    use crate::view::SurfaceId;

    use super::*;

    const LINE_HEIGHT: i32 = 16;
    const STRIP_SURFACE: SurfaceId = SurfaceId::new(7);
    const OTHER_SURFACE: SurfaceId = SurfaceId::new(99);

    impl Gutter {
        fn positions(&self) -> Vec<i32> {
            self.slots.iter().map(|slot| slot.position).collect()
        }

        fn renderers(&self) -> Vec<RendererHandle> {
            self.slots
                .iter()
                .map(|slot| Rc::clone(&slot.renderer))
                .collect()
        }
    }

    /// Uniform-height test view: line n spans buffer y
    /// [n * LINE_HEIGHT, (n + 1) * LINE_HEIGHT). `scroll` is how far
    /// the strip surface is scrolled into the buffer.
    struct TestView {
        lines: u32,
        scroll: i32,
        cursor: Cell<u32>,
        reserved: Cell<i32>,
        invalidations: Cell<u32>,
    }

    impl TestView {
        fn new(lines: u32) -> Self {
            Self {
                lines,
                scroll: 0,
                cursor: Cell::new(0),
                reserved: Cell::new(0),
                invalidations: Cell::new(0),
            }
        }
    }

    impl TextView for TestView {
        fn line_count(&self) -> u32 {
            self.lines
        }

        fn line_at_y(&self, y: i32) -> (u32, i32) {
            if self.lines == 0 {
                return (0, 0);
            }
            let line = (y / LINE_HEIGHT).clamp(0, self.lines as i32 - 1) as u32;
            (line, line as i32 * LINE_HEIGHT)
        }

        fn line_yrange(&self, line: u32) -> (i32, i32) {
            if self.lines == 0 {
                return (0, 0);
            }
            (line as i32 * LINE_HEIGHT, LINE_HEIGHT)
        }

        fn line_end(&self, line: u32) -> TextPos {
            TextPos { line, column: 80 }
        }

        fn row_rect(&self, pos: TextPos) -> Rect {
            let (top, height) = self.line_yrange(pos.line);
            Rect::new(0, self.buffer_to_strip_y(GutterSide::Left, top), 0, height)
        }

        fn cursor_line(&self) -> u32 {
            self.cursor.get()
        }

        fn strip_to_buffer_y(&self, _side: GutterSide, y: i32) -> i32 {
            y + self.scroll
        }

        fn buffer_to_strip_y(&self, _side: GutterSide, y: i32) -> i32 {
            y - self.scroll
        }

        fn reserve_strip_width(&self, _side: GutterSide, width: i32) {
            self.reserved.set(width);
        }

        fn strip_surface(&self, _side: GutterSide) -> Option<SurfaceId> {
            (self.reserved.get() > 0).then_some(STRIP_SURFACE)
        }

        fn invalidate_strip(&self, _side: GutterSide) {
            self.invalidations.set(self.invalidations.get() + 1);
        }

        fn create_text_layout(&self) -> Box<dyn TextLayout> {
            Box::new(MonospaceLayout::new(MonospaceMetrics::new(8, LINE_HEIGHT)))
        }
    }

    /// Renderer that records every hook invocation.
    struct RecordRenderer {
        width: i32,
        visible: bool,
        activatable: bool,
        notices: Option<NoticeSender>,
        begins: Vec<Rect>,
        draws: Vec<(u32, Rect, RendererState)>,
        ends: u32,
        activations: Vec<(TextPos, Rect, i32, i32)>,
    }

    impl RecordRenderer {
        fn new(width: i32) -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                width,
                visible: true,
                activatable: false,
                notices: None,
                begins: Vec::new(),
                draws: Vec::new(),
                ends: 0,
                activations: Vec::new(),
            }))
        }

        fn announce_size_changed(&self) {
            if let Some(notices) = &self.notices {
                notices.size_changed();
            }
        }
    }

    impl GutterRenderer for RecordRenderer {
        fn size(&self) -> (i32, i32) {
            (self.width, LINE_HEIGHT)
        }

        fn begin(
            &mut self,
            _canvas: &mut dyn Canvas,
            background: &Rect,
            _cell: &Rect,
            _start: TextPos,
            _end: TextPos,
        ) {
            self.begins.push(*background);
        }

        fn draw(
            &mut self,
            _canvas: &mut dyn Canvas,
            _background: &Rect,
            cell: &Rect,
            start: TextPos,
            _end: TextPos,
            state: RendererState,
        ) {
            self.draws.push((start.line, *cell, state));
        }

        fn end(&mut self) {
            self.ends += 1;
        }

        fn query_activatable(&mut self, _pos: TextPos, _area: &Rect, _x: i32, _y: i32) -> bool {
            self.activatable
        }

        fn activate(&mut self, pos: TextPos, area: &Rect, x: i32, y: i32) {
            self.activations.push((pos, *area, x, y));
        }

        fn query_tooltip(
            &mut self,
            pos: TextPos,
            _area: &Rect,
            _x: i32,
            _y: i32,
            tooltip: &mut Tooltip,
        ) -> bool {
            tooltip.set_text(format!("line {}", pos.line + 1));
            true
        }

        fn is_visible(&self) -> bool {
            self.visible
        }

        fn attach(&mut self, notices: NoticeSender) {
            self.notices = Some(notices);
        }

        fn detach(&mut self) {
            self.notices = None;
        }
    }

    /// Canvas asserting balanced save/restore and recording clips.
    #[derive(Default)]
    struct TestCanvas {
        depth: i32,
        clips: Vec<Rect>,
    }

    impl Canvas for TestCanvas {
        fn save(&mut self) {
            self.depth += 1;
        }

        fn restore(&mut self) {
            assert!(self.depth > 0, "restore without save");
            self.depth -= 1;
        }

        fn clip(&mut self, rect: Rect) {
            self.clips.push(rect);
        }

        fn fill_rect(&mut self, _rect: Rect, _color: Rgb) {}

        fn draw_layout(&mut self, _x: i32, _y: i32, _layout: &dyn TextLayout) {}
    }

    fn setup(lines: u32) -> (Rc<TestView>, Rc<dyn TextView>, Gutter) {
        let concrete = Rc::new(TestView::new(lines));
        let view: Rc<dyn TextView> = concrete.clone();
        let gutter = Gutter::new(&view, GutterSide::Left);
        (concrete, view, gutter)
    }

    fn handle(renderer: &Rc<RefCell<RecordRenderer>>) -> RendererHandle {
        renderer.clone()
    }

    #[test]
    fn test_insert_sorted_by_position() {
        let (_tv, _view, mut gutter) = setup(5);

        gutter.insert(&handle(&RecordRenderer::new(10)), POSITION_MARKS);
        gutter.insert(&handle(&RecordRenderer::new(10)), POSITION_LINES);
        gutter.insert(&handle(&RecordRenderer::new(10)), 0);

        assert_eq!(gutter.positions(), vec![POSITION_LINES, POSITION_MARKS, 0]);
    }

    #[test]
    fn test_equal_positions_keep_insertion_order() {
        let (_tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(1);
        let b = RecordRenderer::new(2);
        let c = RecordRenderer::new(3);

        gutter.insert(&handle(&a), 0);
        gutter.insert(&handle(&b), 0);
        gutter.insert(&handle(&c), -1);

        let order = gutter.renderers();
        assert!(Rc::ptr_eq(&order[0], &handle(&c)));
        assert!(Rc::ptr_eq(&order[1], &handle(&a)));
        assert!(Rc::ptr_eq(&order[2], &handle(&b)));
    }

    #[test]
    fn test_insert_twice_is_noop() {
        let (tv, _view, mut gutter) = setup(5);
        let r = RecordRenderer::new(20);

        gutter.insert(&handle(&r), 0);
        gutter.insert(&handle(&r), 5);

        assert_eq!(gutter.renderer_count(), 1);
        assert_eq!(gutter.positions(), vec![0]);
        assert_eq!(tv.reserved.get(), 20);
    }

    #[test]
    fn test_insert_reserves_total_width() {
        let (tv, _view, mut gutter) = setup(5);

        gutter.insert(&handle(&RecordRenderer::new(20)), POSITION_LINES);
        assert_eq!(tv.reserved.get(), 20);

        gutter.insert(&handle(&RecordRenderer::new(16)), POSITION_MARKS);
        assert_eq!(tv.reserved.get(), 36);
    }

    #[test]
    fn test_remove_restores_width_and_order() {
        let (tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(20);
        let b = RecordRenderer::new(16);

        gutter.insert(&handle(&a), POSITION_LINES);
        let before = (gutter.positions(), tv.reserved.get());

        gutter.insert(&handle(&b), POSITION_MARKS);
        gutter.remove(&handle(&b));

        assert_eq!((gutter.positions(), tv.reserved.get()), before);
        assert!(b.borrow().notices.is_none(), "remove must detach");
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let (_tv, _view, mut gutter) = setup(5);
        gutter.insert(&handle(&RecordRenderer::new(20)), 0);

        gutter.remove(&handle(&RecordRenderer::new(5)));
        assert_eq!(gutter.renderer_count(), 1);
    }

    #[test]
    fn test_reorder_matches_remove_then_insert() {
        let (_tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(1);
        let b = RecordRenderer::new(2);

        gutter.insert(&handle(&a), POSITION_LINES);
        gutter.insert(&handle(&b), POSITION_MARKS);

        gutter.reorder(&handle(&a), 10);

        assert_eq!(gutter.positions(), vec![POSITION_MARKS, 10]);
        let order = gutter.renderers();
        assert!(Rc::ptr_eq(&order[0], &handle(&b)));
        assert!(Rc::ptr_eq(&order[1], &handle(&a)));
    }

    #[test]
    fn test_hit_test_partition() {
        let (_tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(20);
        let b = RecordRenderer::new(16);
        gutter.insert(&handle(&a), POSITION_LINES);
        gutter.insert(&handle(&b), POSITION_MARKS);

        assert!(Rc::ptr_eq(&gutter.renderer_at_x(10).unwrap(), &handle(&a)));
        assert!(Rc::ptr_eq(&gutter.renderer_at_x(19).unwrap(), &handle(&a)));
        assert!(Rc::ptr_eq(&gutter.renderer_at_x(20).unwrap(), &handle(&b)));
        assert!(Rc::ptr_eq(&gutter.renderer_at_x(25).unwrap(), &handle(&b)));
        assert!(gutter.renderer_at_x(36).is_none());
        assert!(gutter.renderer_at_x(40).is_none());
        assert!(gutter.renderer_at_x(-1).is_none());
    }

    #[test]
    fn test_paint_dispatch_per_line_with_cursor() {
        let (tv, _view, mut gutter) = setup(5);
        tv.cursor.set(2);
        let a = RecordRenderer::new(20);
        let b = RecordRenderer::new(16);
        gutter.insert(&handle(&a), POSITION_LINES);
        gutter.insert(&handle(&b), POSITION_MARKS);

        let mut canvas = TestCanvas::default();
        // Clip covering lines 1..=3
        gutter.draw(&mut canvas, Rect::new(0, 16, 36, 48));

        assert_eq!(canvas.depth, 0, "unbalanced save/restore");

        // One begin each, spanning the renderer's x-slice over the
        // resolved lines.
        assert_eq!(a.borrow().begins, vec![Rect::new(0, 16, 20, 48)]);
        assert_eq!(b.borrow().begins, vec![Rect::new(20, 16, 16, 48)]);

        // Two begin clips plus one clip per renderer per line.
        assert_eq!(canvas.clips.len(), 2 + 2 * 3);
        assert_eq!(canvas.clips[0], Rect::new(0, 16, 20, 48));
        assert_eq!(canvas.clips[1], Rect::new(20, 16, 16, 48));

        // Lines top to bottom, CURSOR exactly on the insertion line.
        let draws = a.borrow().draws.clone();
        assert_eq!(
            draws,
            vec![
                (1, Rect::new(0, 16, 20, 16), RendererState::empty()),
                (2, Rect::new(0, 32, 20, 16), RendererState::CURSOR),
                (3, Rect::new(0, 48, 20, 16), RendererState::empty()),
            ]
        );
        let draws = b.borrow().draws.clone();
        assert_eq!(
            draws,
            vec![
                (1, Rect::new(20, 16, 16, 16), RendererState::empty()),
                (2, Rect::new(20, 32, 16, 16), RendererState::CURSOR),
                (3, Rect::new(20, 48, 16, 16), RendererState::empty()),
            ]
        );

        assert_eq!(a.borrow().ends, 1);
        assert_eq!(b.borrow().ends, 1);
    }

    #[test]
    fn test_paint_empty_buffer_single_synthetic_cycle() {
        let (_tv, _view, mut gutter) = setup(0);
        let r = RecordRenderer::new(20);
        gutter.insert(&handle(&r), POSITION_LINES);

        let mut canvas = TestCanvas::default();
        gutter.draw(&mut canvas, Rect::new(0, 0, 20, 100));

        let r = r.borrow();
        assert_eq!(r.begins.len(), 1);
        assert_eq!(r.ends, 1);
        assert_eq!(r.draws.len(), 1);

        let (line, cell, _state) = r.draws[0];
        assert_eq!(line, 0);
        assert_eq!(cell.height, 0);
    }

    #[test]
    fn test_paint_scrolled_converts_coordinates() {
        let concrete = Rc::new(TestView {
            lines: 5,
            scroll: 32,
            cursor: Cell::new(0),
            reserved: Cell::new(0),
            invalidations: Cell::new(0),
        });
        let view: Rc<dyn TextView> = concrete.clone();
        let mut gutter = Gutter::new(&view, GutterSide::Left);
        let r = RecordRenderer::new(20);
        gutter.insert(&handle(&r), POSITION_LINES);

        let mut canvas = TestCanvas::default();
        // Strip rows 0..32 map to buffer rows 32..64: lines 2 and 3.
        gutter.draw(&mut canvas, Rect::new(0, 0, 20, 32));

        let draws = r.borrow().draws.clone();
        assert_eq!(
            draws,
            vec![
                (2, Rect::new(0, 0, 20, 16), RendererState::empty()),
                (3, Rect::new(0, 16, 20, 16), RendererState::empty()),
            ]
        );
    }

    #[test]
    fn test_paint_without_surface_is_noop() {
        let (_tv, _view, mut gutter) = setup(5);
        let r = RecordRenderer::new(0);
        gutter.insert(&handle(&r), 0);

        // Zero total width: no surface is reserved, painting no-ops.
        let mut canvas = TestCanvas::default();
        gutter.draw(&mut canvas, Rect::new(0, 0, 20, 80));

        assert!(r.borrow().begins.is_empty());
        assert!(r.borrow().draws.is_empty());
    }

    #[test]
    fn test_invisible_renderer_contributes_no_width() {
        let (tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(20);
        let b = RecordRenderer::new(16);
        gutter.insert(&handle(&a), POSITION_LINES);
        gutter.insert(&handle(&b), POSITION_MARKS);

        a.borrow_mut().visible = false;
        a.borrow().announce_size_changed();
        gutter.queue_draw();

        assert_eq!(tv.reserved.get(), 16);
        // The hidden renderer's slice collapses; b takes over x = 0.
        assert!(Rc::ptr_eq(&gutter.renderer_at_x(10).unwrap(), &handle(&b)));
    }

    #[test]
    fn test_size_changed_notice_revalidates_width() {
        let (tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(20);
        let b = RecordRenderer::new(16);
        gutter.insert(&handle(&a), POSITION_LINES);
        gutter.insert(&handle(&b), POSITION_MARKS);
        assert_eq!(tv.reserved.get(), 36);

        a.borrow_mut().width = 30;
        a.borrow().announce_size_changed();

        // Hit testing reads live widths immediately.
        assert!(Rc::ptr_eq(&gutter.renderer_at_x(25).unwrap(), &handle(&a)));
        assert!(Rc::ptr_eq(&gutter.renderer_at_x(35).unwrap(), &handle(&b)));

        // The reservation catches up at the next entry point.
        gutter.queue_draw();
        assert_eq!(tv.reserved.get(), 46);
    }

    #[test]
    fn test_motion_sets_prelit_and_redraws_once() {
        let (tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(20);
        let b = RecordRenderer::new(16);
        gutter.insert(&handle(&a), POSITION_LINES);
        gutter.insert(&handle(&b), POSITION_MARKS);

        let before = tv.invalidations.get();
        let consumed = gutter.motion_notify(&PointerEvent::new(STRIP_SURFACE, 25, 10));
        assert!(!consumed);
        assert_eq!(tv.invalidations.get(), before + 1);

        // Same position again: no state change, no extra invalidation.
        gutter.motion_notify(&PointerEvent::new(STRIP_SURFACE, 25, 12));
        assert_eq!(tv.invalidations.get(), before + 1);

        // Prelit shows up on b's draws only.
        let mut canvas = TestCanvas::default();
        gutter.draw(&mut canvas, Rect::new(0, 0, 36, 16));
        assert!(a.borrow().draws.iter().all(|(_, _, s)| !s.contains(RendererState::PRELIT)));
        assert!(b.borrow().draws.iter().all(|(_, _, s)| s.contains(RendererState::PRELIT)));
    }

    #[test]
    fn test_motion_on_other_surface_is_ignored() {
        let (tv, _view, mut gutter) = setup(5);
        gutter.insert(&handle(&RecordRenderer::new(20)), 0);

        let before = tv.invalidations.get();
        gutter.motion_notify(&PointerEvent::new(OTHER_SURFACE, 10, 10));
        assert_eq!(tv.invalidations.get(), before);
    }

    #[test]
    fn test_leave_clears_prelit_regardless_of_surface() {
        let (_tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(20);
        gutter.insert(&handle(&a), 0);

        gutter.motion_notify(&PointerEvent::new(STRIP_SURFACE, 10, 10));

        // Pointer leaves toward another widget: the event targets a
        // foreign surface, the highlight must still clear.
        gutter.leave_notify(&PointerEvent::new(OTHER_SURFACE, -1, -1));

        let mut canvas = TestCanvas::default();
        gutter.draw(&mut canvas, Rect::new(0, 0, 20, 16));
        assert!(a.borrow().draws.iter().all(|(_, _, s)| !s.contains(RendererState::PRELIT)));
    }

    #[test]
    fn test_button_press_activates_and_consumes() {
        let (_tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(20);
        let b = RecordRenderer::new(16);
        b.borrow_mut().activatable = true;
        gutter.insert(&handle(&a), POSITION_LINES);
        gutter.insert(&handle(&b), POSITION_MARKS);

        let consumed = gutter.button_press(&PointerEvent::new(STRIP_SURFACE, 25, 40));
        assert!(consumed);
        assert!(a.borrow().activations.is_empty());

        let activations = b.borrow().activations.clone();
        assert_eq!(activations.len(), 1);
        let (pos, rect, x, y) = activations[0];
        assert_eq!(pos, TextPos::line_start(2));
        assert_eq!(rect, Rect::new(20, 32, 16, 16));
        assert_eq!((x, y), (25, 40));
    }

    #[test]
    fn test_button_press_not_activatable_not_consumed() {
        let (_tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(20);
        gutter.insert(&handle(&a), 0);

        let consumed = gutter.button_press(&PointerEvent::new(STRIP_SURFACE, 10, 10));
        assert!(!consumed);
        assert!(a.borrow().activations.is_empty());
    }

    #[test]
    fn test_button_press_above_first_line_not_consumed() {
        let (_tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(20);
        a.borrow_mut().activatable = true;
        gutter.insert(&handle(&a), 0);

        // y maps above line 0: the resolved line's top exceeds it.
        let consumed = gutter.button_press(&PointerEvent::new(STRIP_SURFACE, 10, -5));
        assert!(!consumed);
        assert!(a.borrow().activations.is_empty());
    }

    #[test]
    fn test_button_press_wrong_surface_not_consumed() {
        let (_tv, _view, mut gutter) = setup(5);
        let a = RecordRenderer::new(20);
        a.borrow_mut().activatable = true;
        gutter.insert(&handle(&a), 0);

        assert!(!gutter.button_press(&PointerEvent::new(OTHER_SURFACE, 10, 10)));
    }

    #[test]
    fn test_tooltip_delegates_to_renderer() {
        let (_tv, _view, mut gutter) = setup(5);
        gutter.insert(&handle(&RecordRenderer::new(20)), 0);

        let mut tooltip = Tooltip::new();
        assert!(gutter.query_tooltip(10, 40, false, &mut tooltip));
        assert_eq!(tooltip.text(), Some("line 3"));
    }

    #[test]
    fn test_tooltip_keyboard_mode_unhandled() {
        let (_tv, _view, mut gutter) = setup(5);
        gutter.insert(&handle(&RecordRenderer::new(20)), 0);

        let mut tooltip = Tooltip::new();
        assert!(!gutter.query_tooltip(10, 40, true, &mut tooltip));
        assert!(!tooltip.is_set());
    }

    #[test]
    fn test_tooltip_outside_any_renderer_unhandled() {
        let (_tv, _view, mut gutter) = setup(5);
        gutter.insert(&handle(&RecordRenderer::new(20)), 0);

        let mut tooltip = Tooltip::new();
        assert!(!gutter.query_tooltip(50, 40, false, &mut tooltip));
        assert!(!tooltip.is_set());
    }

    #[test]
    fn test_inert_after_view_drop() {
        let (tv, view, mut gutter) = setup(5);
        let r = RecordRenderer::new(20);
        gutter.insert(&handle(&r), 0);

        drop(tv);
        drop(view);

        // Everything degrades to a silent no-op; a dead gutter does not
        // even take new members.
        let late = RecordRenderer::new(5);
        gutter.insert(&handle(&late), 1);
        assert_eq!(gutter.renderer_count(), 1);
        assert!(late.borrow().notices.is_none());
        gutter.queue_draw();
        let mut canvas = TestCanvas::default();
        gutter.draw(&mut canvas, Rect::new(0, 0, 20, 80));
        assert!(!gutter.motion_notify(&PointerEvent::new(STRIP_SURFACE, 10, 10)));
        assert!(!gutter.button_press(&PointerEvent::new(STRIP_SURFACE, 10, 10)));

        assert!(r.borrow().draws.is_empty());
    }

    #[test]
    fn test_line_geometry_includes_line_closing_at_clip_end() {
        let (_tv, view, _gutter) = setup(5);

        // Clip bottom falls exactly on the line 1 / line 2 boundary:
        // line 1 closes the range.
        let lines = line_geometry(view.as_ref(), 0, 32);
        let indices: Vec<u32> = lines.iter().map(|info| info.line).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(total_height(&lines), 32);
    }

    #[test]
    fn test_line_geometry_empty_buffer_fallback() {
        let (_tv, view, _gutter) = setup(0);

        let lines = line_geometry(view.as_ref(), 0, 100);
        assert_eq!(lines, vec![LineInfo { line: 0, top: 0, height: 0 }]);
    }
}
