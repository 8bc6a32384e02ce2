//! # InputBox Component
//!
//! Multi-line draft editor pinned to the bottom of the screen.
//!
//! ## Responsibilities
//!
//! - Capture typing, paste, and cursor movement into a [`Draft`]
//! - Grow with the draft up to [`MAX_VISIBLE_LINES`], then scroll inside
//! - Gate submission: a blank draft, an in-flight request, or a missing
//!   session leaves the draft untouched and emits nothing
//!
//! ## Props
//!
//! `loading` and `available` mirror `App::is_loading` and
//! `App::session_available()`; the event loop refreshes them every frame.

mod draft;
mod layout;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub use draft::Draft;
pub use layout::MAX_VISIBLE_LINES;
use layout::{
    TEXT_INSET_X, TEXT_INSET_Y, VERTICAL_OVERHEAD, cursor_row_col, follow_cursor, inner_width,
    row_count, vertical_target, wrap_rows,
};

/// What the input box reports to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Trimmed, non-empty text to send.
    Submit(String),
    /// The draft or cursor changed.
    ContentChanged,
}

pub struct InputBox {
    pub draft: Draft,
    /// A request is in flight (prop).
    pub loading: bool,
    /// A chat session exists (prop).
    pub available: bool,
    /// First visible wrapped row.
    scroll_offset: u16,
    /// Box width from the last render, used for Up/Down between frames.
    last_width: u16,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            draft: Draft::default(),
            loading: false,
            available: true,
            scroll_offset: 0,
            last_width: Self::DEFAULT_WIDTH,
        }
    }

    /// Box height for the current draft at `width`, borders included.
    pub fn calculate_height(&self, width: u16) -> u16 {
        row_count(self.draft.text(), inner_width(width)).min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    fn can_submit(&self) -> bool {
        self.available && !self.loading && !self.draft.is_blank()
    }

    fn title(&self) -> &'static str {
        if !self.available {
            " Chat unavailable "
        } else if self.loading {
            " Waiting for reply… "
        } else {
            " Message (Enter to send, Shift+Enter for newline) "
        }
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect, total_rows: u16) {
        if total_rows <= MAX_VISIBLE_LINES {
            return;
        }
        let mut state = ScrollbarState::default()
            .content_length(total_rows.saturating_sub(MAX_VISIBLE_LINES) as usize)
            .position(self.scroll_offset as usize);
        let track = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            track,
            &mut state,
        );
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.last_width = area.width;
        let width = inner_width(area.width);
        let text = self.draft.text();
        let rows = wrap_rows(text, width);
        let total_rows = rows.len() as u16;
        let (cursor_row, cursor_col) = cursor_row_col(text, self.draft.cursor(), width);
        self.scroll_offset = follow_cursor(self.scroll_offset, cursor_row, total_rows);

        let visible: Vec<Line> = rows
            .into_iter()
            .skip(self.scroll_offset as usize)
            .take(MAX_VISIBLE_LINES as usize)
            .map(|r| Line::raw(&text[r]))
            .collect();

        let style = if self.available {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .padding(Padding::horizontal(1))
            .title(self.title());

        frame.render_widget(Paragraph::new(visible).block(block).style(style), area);
        self.render_scrollbar(frame, area, total_rows);

        if self.available {
            let x = area.x + TEXT_INSET_X + cursor_col.min(width);
            let y = area.y + TEXT_INSET_Y + cursor_row.saturating_sub(self.scroll_offset);
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if !self.available {
            return None;
        }
        let changed = match event {
            TuiEvent::InputChar(c) => {
                self.draft.insert_char(*c);
                true
            }
            TuiEvent::Paste(text) => {
                self.draft.insert_str(text);
                true
            }
            TuiEvent::Backspace => self.draft.backspace(),
            TuiEvent::Delete => self.draft.delete(),
            TuiEvent::CursorLeft => self.draft.move_left(),
            TuiEvent::CursorRight => self.draft.move_right(),
            TuiEvent::CursorHome => self.draft.move_home(),
            TuiEvent::CursorEnd => self.draft.move_end(),
            TuiEvent::CursorUp | TuiEvent::CursorDown => {
                let direction = if matches!(event, TuiEvent::CursorUp) { -1 } else { 1 };
                let width = inner_width(self.last_width);
                match vertical_target(self.draft.text(), self.draft.cursor(), width, direction) {
                    Some(pos) => {
                        self.draft.set_cursor(pos);
                        true
                    }
                    None => false,
                }
            }
            TuiEvent::Submit => {
                if !self.can_submit() {
                    return None;
                }
                self.scroll_offset = 0;
                return Some(InputEvent::Submit(self.draft.take_trimmed()));
            }
            _ => false,
        };
        changed.then_some(InputEvent::ContentChanged)
    }
}
