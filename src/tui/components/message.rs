use std::ops::Range;

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};

use crate::core::transcript::{Message, Role};
use crate::tui::markdown;
use crate::tui::wrap::row_ranges;

/// Columns reserved beside a bubble for the avatar glyph.
pub const AVATAR_WIDTH: u16 = 3;
/// Blank rows between consecutive entries.
const MARGIN_BELOW: u16 = 1;
/// Horizontal padding inside a bubble, per side.
const PAD_H: u16 = 1;
/// Borders (2) plus padding (2).
const HORIZONTAL_OVERHEAD: u16 = 2 + PAD_H * 2;
const VERTICAL_OVERHEAD: u16 = 2;
/// Bubbles never take more than this share of the row (percent).
const BUBBLE_SHARE: u32 = 85;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const USER_AVATAR: &str = "👤";
const MODEL_AVATAR: &str = "🤖";

/// One transcript entry, laid out the same way as its HTML rendering.
///
/// - **Model**: avatar on the left, bubble beside it
/// - **User**: bubble pushed right, avatar after it
/// - **Error**: a centered red alert with the literal text, no Markdown
///
/// `spinner_frame` is set only for the in-flight placeholder; while its
/// content is still empty the bubble shows a "thinking" indicator.
#[derive(Clone, Copy)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    pub spinner_frame: Option<usize>,
}

impl<'a> MessageView<'a> {
    pub fn new(message: &'a Message, spinner_frame: Option<usize>) -> Self {
        Self {
            message,
            spinner_frame,
        }
    }

    /// Rows this entry occupies at `width`, margin included.
    pub fn calculate_height(message: &Message, width: u16, pending: bool) -> u16 {
        let spinner = pending.then_some(0);
        let (lines, _) = MessageView::new(message, spinner).layout(width);
        (lines.len() as u16).max(1) + VERTICAL_OVERHEAD + MARGIN_BELOW
    }

    /// Wrapped body lines plus the width of the box that holds them.
    fn layout(&self, width: u16) -> (Vec<Line<'static>>, u16) {
        let max_box = max_box_width(width, self.message.role);
        let max_inner = max_box.saturating_sub(HORIZONTAL_OVERHEAD) as usize;
        if max_inner == 0 {
            return (vec![Line::default()], max_box);
        }

        let lines: Vec<Line<'static>> = self
            .body()
            .iter()
            .flat_map(|line| wrap_line(line, max_inner))
            .collect();

        let widest = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
        let title_width = role_title(self.message.role).chars().count() as u16;
        let box_width = (widest.max(title_width) + HORIZONTAL_OVERHEAD).min(max_box);
        (lines, box_width)
    }

    fn body(&self) -> Vec<Line<'static>> {
        let role = self.message.role;
        let content = self.message.content.trim_end();
        match role {
            Role::Error => format!("Error: {}", self.message.content)
                .lines()
                .map(|l| Line::styled(l.to_owned(), role_style(role)))
                .collect(),
            Role::User | Role::Model if content.trim().is_empty() => match self.spinner_frame {
                Some(frame) => vec![Line::from(vec![
                    Span::styled(SPINNER[frame % SPINNER.len()], role_style(role)),
                    Span::styled(
                        " Thinking…",
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    ),
                ])],
                None => vec![Line::default()],
            },
            Role::User | Role::Model => {
                let fg = role_style(role).fg.unwrap_or(Color::Reset);
                markdown::render(content, fg).lines
            }
        }
    }
}

impl Widget for MessageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (lines, box_width) = self.layout(area.width);
        let height = area.height.saturating_sub(MARGIN_BELOW);
        let role = self.message.role;

        let box_x = match role {
            Role::Model => area.x + AVATAR_WIDTH,
            Role::User => (area.x + area.width)
                .saturating_sub(AVATAR_WIDTH)
                .saturating_sub(box_width),
            Role::Error => area.x + area.width.saturating_sub(box_width) / 2,
        };
        let box_area = Rect::new(box_x, area.y, box_width, height).intersection(area);

        let style = role_style(role);
        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(style.add_modifier(Modifier::DIM))
            .padding(Padding::horizontal(PAD_H));
        if role != Role::Error {
            block = block.title(role_title(role)).title_style(style);
        }

        let inner = block.inner(box_area);
        block.render(box_area, buf);

        let mut paragraph = Paragraph::new(lines);
        if role == Role::Error {
            paragraph = paragraph.alignment(Alignment::Center);
        }
        paragraph.render(inner, buf);

        let avatar_row = area.y + 1;
        match role {
            Role::Model => {
                buf.set_string(area.x, avatar_row, MODEL_AVATAR, style);
            }
            Role::User => {
                let x = (area.x + area.width).saturating_sub(AVATAR_WIDTH - 1);
                buf.set_string(x, avatar_row, USER_AVATAR, style);
            }
            Role::Error => {}
        }
    }
}

fn max_box_width(width: u16, role: Role) -> u16 {
    let available = match role {
        Role::Error => width,
        Role::User | Role::Model => width.saturating_sub(AVATAR_WIDTH),
    };
    ((available as u32 * BUBBLE_SHARE / 100) as u16).max(available.min(HORIZONTAL_OVERHEAD + 1))
}

fn role_title(role: Role) -> String {
    format!(" {} ", role.label())
}

fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Green),
        Role::Model => Style::default().fg(Color::Blue),
        Role::Error => Style::default().fg(Color::Red),
    }
}

/// Wraps a styled line. Break points come from the line's plain text; the
/// resulting byte ranges are cut back out of the spans so styles survive.
fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    let plain: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    row_ranges(&plain, width)
        .into_iter()
        .map(|range| slice_line(line, range))
        .collect()
}

/// The part of `line` that falls inside the byte range `range` of its text.
fn slice_line(line: &Line<'static>, range: Range<usize>) -> Line<'static> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for span in &line.spans {
        let len = span.content.len();
        let start = range.start.max(offset);
        let end = range.end.min(offset + len);
        if start < end {
            spans.push(Span::styled(
                span.content[start - offset..end - offset].to_owned(),
                span.style,
            ));
        }
        offset += len;
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn draw(message: &Message, width: u16, spinner: Option<usize>) -> Vec<String> {
        let height = MessageView::calculate_height(message, width, spinner.is_some());
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| f.render_widget(MessageView::new(message, spinner), f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect())
            .collect()
    }

    #[test]
    fn wrap_breaks_on_spaces() {
        let wrapped = wrap_line(&Line::raw("hello world"), 5);
        assert_eq!(plain(&wrapped), vec!["hello", "world"]);
    }

    #[test]
    fn wrap_splits_long_words() {
        let wrapped = wrap_line(&Line::raw("abcdefghij"), 4);
        assert_eq!(plain(&wrapped), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_keeps_blank_lines_and_indent() {
        assert_eq!(plain(&wrap_line(&Line::default(), 10)), vec![""]);
        assert_eq!(plain(&wrap_line(&Line::raw("    x"), 10)), vec!["    x"]);
    }

    #[test]
    fn wrap_preserves_span_styles() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let line = Line::from(vec![Span::raw("plain "), Span::styled("bold", bold)]);
        let wrapped = wrap_line(&line, 80);
        assert_eq!(wrapped.len(), 1);
        let bold_span = wrapped[0].spans.iter().find(|s| s.content == "bold").unwrap();
        assert_eq!(bold_span.style, bold);
    }

    #[test]
    fn wrap_splits_styled_spans_at_break() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let line = Line::from(vec![Span::raw("one two "), Span::styled("three four", bold)]);
        let wrapped = wrap_line(&line, 9);
        assert_eq!(plain(&wrapped), vec!["one two", "three", "four"]);
        assert_eq!(wrapped[1].spans[0].style, bold);
        assert_eq!(wrapped[2].spans[0].style, bold);
    }

    #[test]
    fn wrap_keeps_multibyte_text_whole() {
        let wrapped = wrap_line(&Line::raw("café 日本語 🦀"), 6);
        assert_eq!(plain(&wrapped), vec!["café", "日本語", "🦀"]);
    }

    #[test]
    fn height_counts_borders_and_margin() {
        let message = Message::user("hi");
        assert_eq!(
            MessageView::calculate_height(&message, 80, false),
            1 + VERTICAL_OVERHEAD + MARGIN_BELOW
        );
    }

    #[test]
    fn height_grows_with_wrapping() {
        let short = MessageView::calculate_height(&Message::model("word"), 30, false);
        let long = MessageView::calculate_height(
            &Message::model("this reply is long enough to wrap over several rows at thirty columns"),
            30,
            false,
        );
        assert!(long > short);
    }

    #[test]
    fn model_message_has_avatar_on_the_left() {
        let rows = draw(&Message::model("Hello there"), 40, None);
        assert!(rows[1].starts_with(MODEL_AVATAR), "{rows:?}");
        assert!(rows.iter().any(|r| r.contains("Hello there")));
        assert!(rows[0].contains("assistant"));
    }

    #[test]
    fn user_message_is_right_aligned() {
        let rows = draw(&Message::user("hi"), 40, None);
        assert!(rows[1].trim_end().ends_with(USER_AVATAR), "{rows:?}");
        let bubble_start = rows[1].find("hi").unwrap();
        assert!(bubble_start > 20, "user bubble should sit on the right: {rows:?}");
    }

    #[test]
    fn error_is_centered_literal_text() {
        let rows = draw(&Message::error("**boom**"), 40, None);
        let line = rows.iter().find(|r| r.contains("Error:")).unwrap();
        assert!(line.contains("Error: **boom**"), "markdown must not be parsed: {rows:?}");
        let start = line.find('╰').or_else(|| line.find('│')).unwrap();
        assert!(start > 0, "alert should be centered: {rows:?}");
        assert!(!rows.iter().any(|r| r.contains(MODEL_AVATAR) || r.contains(USER_AVATAR)));
    }

    #[test]
    fn pending_placeholder_shows_spinner() {
        let rows = draw(&Message::model(""), 40, Some(0));
        assert!(rows.iter().any(|r| r.contains("Thinking")), "{rows:?}");

        let rows = draw(&Message::model(""), 40, None);
        assert!(!rows.iter().any(|r| r.contains("Thinking")));
    }
}
