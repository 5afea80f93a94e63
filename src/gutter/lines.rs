//! Line geometry: resolving a vertical clip range to buffer lines.

use crate::view::TextView;

/// One buffer line's vertical extent, in buffer coordinates.
///
/// Ephemeral: computed per paint pass for the clipped range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    /// Zero-based line index.
    pub line: u32,
    /// Top of the line, buffer coordinates.
    pub top: i32,
    /// Height of the line including all wrapped rows.
    pub height: i32,
}

/// Resolve the buffer-coordinate range `[y1, y2]` to the lines covering
/// it.
///
/// Walks forward from the line at `y1` and stops once a line's bottom
/// reaches `y2`, so a clip ending exactly on a line boundary still
/// includes the line closing at that boundary. The result is never
/// empty: an empty buffer yields a single synthetic zero-height entry
/// for line 0, which keeps the per-renderer begin/draw/end cycle alive
/// with nothing to show.
///
/// The end-of-buffer case rides on the host's line accounting: a
/// buffer ending in a newline has a trailing empty line, and
/// [`TextView::line_count`] must include it (with `line_at_y` and
/// `line_yrange` covering it) so the walk emits it like any other line
/// when the clip reaches the bottom of the text. Hosts that drop the
/// trailing line from their count lose its gutter row.
pub fn line_geometry(view: &dyn TextView, y1: i32, y2: i32) -> Vec<LineInfo> {
    let count = view.line_count();
    let mut lines = Vec::new();

    if count > 0 {
        let (mut line, _) = view.line_at_y(y1);

        while line < count {
            let (top, height) = view.line_yrange(line);
            lines.push(LineInfo { line, top, height });

            if top + height >= y2 {
                break;
            }
            line += 1;
        }
    }

    if lines.is_empty() {
        let (top, height) = if count > 0 { view.line_yrange(0) } else { (0, 0) };
        lines.push(LineInfo { line: 0, top, height });
    }

    lines
}

/// Total height covered by a resolved line range.
pub fn total_height(lines: &[LineInfo]) -> i32 {
    lines.iter().map(|info| info.height).sum()
}
