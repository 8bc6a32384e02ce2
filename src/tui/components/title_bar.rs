//! # TitleBar Component
//!
//! One-line header: application name, model, and status.
//!
//! Stateless; every field is a prop filled in by `ui::draw_ui` each frame.
//! The text degrades in priority order so narrow terminals still show the
//! name and model:
//!
//! 1. `Dev Assistant Chatbot (model: gemini-2.5-flash) | Thinking... | ↓ New`
//! 2. `Dev Assistant Chatbot (model: gemini-2.5-flash) | Thinking...`
//! 3. `Dev Assistant Chatbot (model: gemini-2.5-flash)`

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::render::PAGE_TITLE;
use crate::tui::component::Component;

pub struct TitleBar {
    pub model_name: String,
    pub status_message: String,
    /// Whether a chat session exists; the status turns red without one.
    pub available: bool,
    /// Content below the visible part of the transcript.
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(
        model_name: String,
        status_message: String,
        available: bool,
        has_unseen_content: bool,
    ) -> Self {
        Self {
            model_name,
            status_message,
            available,
            has_unseen_content,
        }
    }

    fn line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(PAGE_TITLE, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" (model: {})", self.model_name)),
        ];
        if !self.status_message.is_empty() {
            let status_style = if self.available {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::Red)
            };
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(self.status_message.clone(), status_style));
        }
        if self.has_unseen_content {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("↓ New", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}
