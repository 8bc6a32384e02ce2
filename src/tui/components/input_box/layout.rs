//! Soft-wrapping for the input box and cursor placement on the wrapped rows.
//!
//! Rows are byte ranges into the draft (newlines excluded), so the cursor
//! maps onto them without re-measuring text. Break points come from
//! [`crate::tui::wrap`]; the spaces at a break hang at the end of the row
//! they follow, so every byte of a logical line belongs to exactly one row.

use std::ops::Range;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::wrap::row_ranges;

/// Borders (2) plus horizontal padding (2).
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// The box grows with the draft up to this many rows, then scrolls.
pub const MAX_VISIBLE_LINES: u16 = 5;
/// Distance from the box edge to the first text cell.
pub(super) const TEXT_INSET_X: u16 = 2;
pub(super) const TEXT_INSET_Y: u16 = 1;

pub(super) fn inner_width(box_width: u16) -> u16 {
    box_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Wrapped rows of `text` at `width` cells. Always at least one row.
pub(super) fn wrap_rows(text: &str, width: u16) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut line_start = 0;

    for line in text.split('\n') {
        let ranges = row_ranges(line, width as usize);
        for (i, range) in ranges.iter().enumerate() {
            let end = ranges.get(i + 1).map_or(line.len(), |next| next.start);
            rows.push(line_start + range.start..line_start + end);
        }
        line_start += line.len() + 1;
    }
    rows
}

pub(super) fn row_count(text: &str, width: u16) -> u16 {
    wrap_rows(text, width).len() as u16
}

/// (row, column) of the byte offset `cursor` on the wrapped rows.
pub(super) fn cursor_row_col(text: &str, cursor: usize, width: u16) -> (u16, u16) {
    let rows = wrap_rows(text, width);
    let row = rows
        .iter()
        .rposition(|r| r.start <= cursor)
        .unwrap_or(0);
    let start = rows[row].start.min(cursor);
    let col = text[start..cursor].width() as u16;
    (row as u16, col)
}

/// Byte offset one row up (`-1`) or down (`1`) from `cursor`, keeping the
/// column where possible. `None` at the first or last row.
pub(super) fn vertical_target(text: &str, cursor: usize, width: u16, direction: i16) -> Option<usize> {
    let rows = wrap_rows(text, width);
    let (row, col) = cursor_row_col(text, cursor, width);
    let target = row as i32 + direction as i32;
    if target < 0 || target as usize >= rows.len() {
        return None;
    }

    let range = rows[target as usize].clone();
    let mut used = 0u16;
    for (i, c) in text[range.clone()].char_indices() {
        let cw = c.width().unwrap_or(0) as u16;
        if used + cw > col {
            return Some(range.start + i);
        }
        used += cw;
    }
    Some(range.end)
}

/// New scroll offset that keeps `cursor_row` inside the visible window.
pub(super) fn follow_cursor(scroll_offset: u16, cursor_row: u16, total_rows: u16) -> u16 {
    if total_rows <= MAX_VISIBLE_LINES {
        0
    } else if cursor_row < scroll_offset {
        cursor_row
    } else if cursor_row >= scroll_offset + MAX_VISIBLE_LINES {
        cursor_row + 1 - MAX_VISIBLE_LINES
    } else {
        scroll_offset
    }
}
