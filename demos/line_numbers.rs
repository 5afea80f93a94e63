//! Line-number demo: a gutter composited onto a plain character grid.
//!
//! Builds a small in-memory text view, packs a line-number column and a
//! bookmark column, paints the strip into an ASCII canvas and prints it
//! alongside the text. Run with `RUST_LOG=trace` to watch the notice
//! traffic.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gutter::{
    Canvas, Gutter, GutterRenderer, GutterSide, MonospaceLayout, MonospaceMetrics, PointerEvent,
    Rect, RendererState, Rgb, SurfaceId, TextContent, TextLayout, TextPos, TextRenderer, TextView,
    Tooltip, POSITION_LINES, POSITION_MARKS,
};

const CELL_WIDTH: i32 = 8;
const LINE_HEIGHT: i32 = 16;
const SURFACE: SurfaceId = SurfaceId::new(1);

const BUFFER: &[&str] = &[
    "fn main() {",
    "    let answer = 42;",
    "    println!(\"{answer}\");",
    "}",
    "",
    "// fin",
];

/// A host view over a fixed string buffer on a monospace grid.
struct DemoView {
    lines: Vec<&'static str>,
    cursor: Cell<u32>,
    reserved: Cell<i32>,
}

impl TextView for DemoView {
    fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    fn line_at_y(&self, y: i32) -> (u32, i32) {
        let last = self.lines.len() as i32 - 1;
        let line = (y / LINE_HEIGHT).clamp(0, last.max(0)) as u32;
        (line, line as i32 * LINE_HEIGHT)
    }

    fn line_yrange(&self, line: u32) -> (i32, i32) {
        (line as i32 * LINE_HEIGHT, LINE_HEIGHT)
    }

    fn line_end(&self, line: u32) -> TextPos {
        let column = self.lines.get(line as usize).map_or(0, |l| l.len() as u32);
        TextPos { line, column }
    }

    fn row_rect(&self, pos: TextPos) -> Rect {
        let (top, height) = self.line_yrange(pos.line);
        Rect::new(0, top, 0, height)
    }

    fn cursor_line(&self) -> u32 {
        self.cursor.get()
    }

    fn strip_to_buffer_y(&self, _side: GutterSide, y: i32) -> i32 {
        y
    }

    fn buffer_to_strip_y(&self, _side: GutterSide, y: i32) -> i32 {
        y
    }

    fn reserve_strip_width(&self, _side: GutterSide, width: i32) {
        self.reserved.set(width);
    }

    fn strip_surface(&self, _side: GutterSide) -> Option<SurfaceId> {
        (self.reserved.get() > 0).then_some(SURFACE)
    }

    fn invalidate_strip(&self, _side: GutterSide) {}

    fn create_text_layout(&self) -> Box<dyn TextLayout> {
        Box::new(MonospaceLayout::new(MonospaceMetrics::new(
            CELL_WIDTH,
            LINE_HEIGHT,
        )))
    }
}

/// Canvas that rasterizes onto a character grid, one glyph per cell.
struct GridCanvas {
    columns: usize,
    rows: Vec<Vec<char>>,
}

impl GridCanvas {
    fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows: vec![vec![' '; columns]; rows],
        }
    }

    fn row(&self, index: usize) -> String {
        self.rows[index].iter().collect()
    }
}

impl Canvas for GridCanvas {
    fn save(&mut self) {}
    fn restore(&mut self) {}
    fn clip(&mut self, _rect: Rect) {}

    fn fill_rect(&mut self, _rect: Rect, _color: Rgb) {}

    fn draw_layout(&mut self, x: i32, y: i32, layout: &dyn TextLayout) {
        let column = (x / CELL_WIDTH) as usize;
        let row = (y / LINE_HEIGHT) as usize;
        if row >= self.rows.len() {
            return;
        }

        for (i, c) in layout.text().chars().enumerate() {
            if column + i < self.columns {
                self.rows[row][column + i] = c;
            }
        }
    }
}

/// A one-column bookmark renderer, activatable and with a tooltip.
struct BookmarkRenderer {
    marked: Vec<u32>,
}

impl GutterRenderer for BookmarkRenderer {
    fn size(&self) -> (i32, i32) {
        (CELL_WIDTH, LINE_HEIGHT)
    }

    fn draw(
        &mut self,
        canvas: &mut dyn Canvas,
        _background: &Rect,
        cell: &Rect,
        start: TextPos,
        _end: TextPos,
        _state: RendererState,
    ) {
        if self.marked.contains(&start.line) {
            let mut layout = MonospaceLayout::new(MonospaceMetrics::new(CELL_WIDTH, LINE_HEIGHT));
            layout.set_text("*");
            canvas.draw_layout(cell.x, cell.y, &layout);
        }
    }

    fn query_activatable(&mut self, _pos: TextPos, _area: &Rect, _x: i32, _y: i32) -> bool {
        true
    }

    fn activate(&mut self, pos: TextPos, _area: &Rect, _x: i32, _y: i32) {
        if let Some(index) = self.marked.iter().position(|&l| l == pos.line) {
            self.marked.remove(index);
        } else {
            self.marked.push(pos.line);
        }
    }

    fn query_tooltip(
        &mut self,
        pos: TextPos,
        _area: &Rect,
        _x: i32,
        _y: i32,
        tooltip: &mut Tooltip,
    ) -> bool {
        if self.marked.contains(&pos.line) {
            tooltip.set_text(format!("bookmark on line {}", pos.line + 1));
            true
        } else {
            false
        }
    }
}

fn paint(gutter: &mut Gutter, view: &DemoView) {
    let strip_width = view.reserved.get();
    let strip_columns = (strip_width / CELL_WIDTH) as usize;
    let rows = view.lines.len();

    let mut canvas = GridCanvas::new(strip_columns, rows);
    gutter.draw(
        &mut canvas,
        Rect::new(0, 0, strip_width, rows as i32 * LINE_HEIGHT),
    );

    for (i, line) in view.lines.iter().enumerate() {
        let marker = if i as u32 == view.cursor.get() { ">" } else { " " };
        println!("{}|{marker}{line}", canvas.row(i));
    }
    println!();
}

fn main() {
    env_logger::init();

    let view = Rc::new(DemoView {
        lines: BUFFER.to_vec(),
        cursor: Cell::new(2),
        reserved: Cell::new(0),
    });
    let dyn_view: Rc<dyn TextView> = view.clone();
    let mut gutter = Gutter::new(&dyn_view, GutterSide::Left);

    // Line numbers, right aligned, measured against the widest value.
    let mut numbers = TextRenderer::new(Rc::downgrade(&dyn_view));
    numbers.set_data_fn(Box::new(|start, _end, _state| {
        TextContent::Plain(format!("{}", start.line + 1))
    }));
    numbers.set_measure_text(TextContent::Plain(format!("{}", BUFFER.len())));
    numbers.base_mut().set_alignment(1.0, 0.0);

    let numbers = Rc::new(RefCell::new(numbers));
    gutter.insert(&(numbers as _), POSITION_LINES);

    let bookmarks = Rc::new(RefCell::new(BookmarkRenderer {
        marked: vec![1, 3],
    }));
    gutter.insert(&(bookmarks.clone() as _), POSITION_MARKS);

    println!("initial paint:");
    paint(&mut gutter, &view);

    // Click the bookmark column on line 5 to toggle a mark there.
    let press_x = view.reserved.get() - CELL_WIDTH / 2;
    let press_y = 4 * LINE_HEIGHT + LINE_HEIGHT / 2;
    let consumed = gutter.button_press(&PointerEvent::new(SURFACE, press_x, press_y));
    println!("press at ({press_x}, {press_y}) consumed: {consumed}");
    paint(&mut gutter, &view);

    // Hover the new mark and ask for its tooltip.
    let mut tooltip = Tooltip::new();
    if gutter.query_tooltip(press_x, press_y, false, &mut tooltip) {
        println!("tooltip: {}", tooltip.text().unwrap_or_default());
    }
}
