//! Monospace text metrics: a reference `TextLayout` implementation.
//!
//! Hosts with a real font stack provide their own layouts; this one
//! assumes a fixed cell grid and measures by display columns, which is
//! exactly right for terminal-style frontends and good enough for
//! tests and demos.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::TextLayout;

/// Cell metrics of a monospace font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceMetrics {
    /// Advance width of one column, in pixels.
    pub cell_width: i32,
    /// Height of one text row, in pixels.
    pub line_height: i32,
}

impl MonospaceMetrics {
    /// Create metrics from a column advance and row height.
    pub const fn new(cell_width: i32, line_height: i32) -> Self {
        Self { cell_width, line_height }
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(8, 16)
    }
}

/// A text layout measured on a monospace cell grid.
///
/// Markup is measured like plain text after stripping tags; this keeps
/// the measurement monotonic with the visible glyphs without dragging a
/// markup engine into the crate.
#[derive(Debug, Clone)]
pub struct MonospaceLayout {
    metrics: MonospaceMetrics,
    text: String,
    is_markup: bool,
}

impl MonospaceLayout {
    /// Create an empty layout with the given metrics.
    pub const fn new(metrics: MonospaceMetrics) -> Self {
        Self {
            metrics,
            text: String::new(),
            is_markup: false,
        }
    }

    /// Display columns of the current content.
    pub fn columns(&self) -> usize {
        let text = if self.is_markup {
            strip_tags(&self.text)
        } else {
            self.text.clone()
        };

        // Widest line wins for multi-line content.
        text.lines()
            .map(|line| {
                line.graphemes(true)
                    .map(|g| UnicodeWidthStr::width(g).max(1))
                    .sum()
            })
            .max()
            .unwrap_or(0)
    }

    fn rows(&self) -> usize {
        self.text.lines().count().max(1)
    }
}

/// Drop `<...>` spans from markup content.
fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;

    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    out
}

impl TextLayout for MonospaceLayout {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
        self.is_markup = false;
    }

    fn set_markup(&mut self, markup: &str) {
        self.text = markup.to_owned();
        self.is_markup = true;
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn is_markup(&self) -> bool {
        self.is_markup
    }

    fn pixel_size(&self) -> (i32, i32) {
        if self.text.is_empty() {
            return (0, 0);
        }

        let width = self.columns() as i32 * self.metrics.cell_width;
        let height = self.rows() as i32 * self.metrics.line_height;
        (width, height)
    }
}
