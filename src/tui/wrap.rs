//! Word wrapping shared by the input box and message bubbles.
//!
//! `textwrap` decides where rows break. The rows are then mapped back to byte
//! ranges of the original line so callers can slice styled spans or place a
//! cursor without re-measuring text.

use std::ops::Range;

/// Wrapping options for a column of `width` cells.
pub fn wrap_options(width: usize) -> textwrap::Options<'static> {
    textwrap::Options::new(width)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
        .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit)
}

/// Byte ranges of the wrapped rows of a single logical `line` (no `'\n'`).
///
/// Each range covers the row's visible text; the spaces a break consumed are
/// left out. Leading indentation stays on the first row. Always returns at
/// least one range.
pub fn row_ranges(line: &str, width: usize) -> Vec<Range<usize>> {
    if width == 0 || line.is_empty() {
        return vec![0..line.len()];
    }

    let mut ranges = Vec::new();
    let mut from = 0;
    for segment in textwrap::wrap(line, wrap_options(width)) {
        let start = line[from..]
            .find(segment.as_ref())
            .map_or(from, |i| from + i);
        let end = start + segment.len();
        ranges.push(start..end);
        from = end;
    }

    match ranges.first_mut() {
        Some(first) => first.start = 0,
        None => ranges.push(0..line.len()),
    }
    ranges
}
