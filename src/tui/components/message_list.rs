//! # MessageList Component
//!
//! Scrollable view of the transcript.
//!
//! ## Responsibilities
//!
//! - Lay out every entry and cache the measured heights
//! - Render only the entries near the viewport
//! - Follow the newest entry while pinned to the bottom
//!
//! ## Auto-scroll
//!
//! The list starts pinned. Scrolling up unpins it; scrolling back down to
//! the end, pressing End, or a new turn being appended pins it again. While
//! pinned, every transcript change (tracked by `Transcript::revision`)
//! scrolls to the newest content.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::transcript::Transcript;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageView;
use crate::tui::event::TuiEvent;

/// Scroll and layout state that outlives a single frame.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// Follow new content.
    pub stick_to_bottom: bool,
    /// Viewport height from the last render, for clamping between frames.
    pub viewport_height: u16,
    /// Content exists below the visible window.
    pub has_unseen_content: bool,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
            has_unseen_content: false,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout
            .total_height()
            .saturating_sub(self.viewport_height)
    }

    /// Keep the offset inside the content.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-pin once a downward scroll reaches the end.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.pin_to_bottom();
        }
    }

    pub fn pin_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.scroll_state.set_offset(Position {
            x: 0,
            y: self.max_offset(),
        });
    }
}

/// Transient per-frame view over the transcript.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub transcript: &'a Transcript,
    /// The last entry is an in-flight placeholder.
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        transcript: &'a Transcript,
        is_loading: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            transcript,
            is_loading,
            spinner_frame,
        }
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // scrollbar column
        let messages = self.transcript.messages();
        let last = messages.len().saturating_sub(1);

        // 1. Bring the height cache up to date.
        let layout = &mut self.state.layout;
        if messages.len() > layout.message_count {
            // A new turn always brings the view back to the bottom.
            self.state.stick_to_bottom = true;
        }
        let reusable = layout.reusable_count(messages.len(), content_width, self.transcript.revision());
        layout.heights.truncate(reusable);
        for (i, message) in messages.iter().enumerate().skip(layout.heights.len()) {
            let pending = self.is_loading && i == last;
            layout
                .heights
                .push(MessageView::calculate_height(message, content_width, pending));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(messages.len(), content_width, self.transcript.revision());

        // 2. Scroll position.
        self.state.viewport_height = area.height;
        let total_height = self.state.layout.total_height();
        if self.state.stick_to_bottom {
            self.state.pin_to_bottom();
        } else {
            self.state.clamp_scroll();
        }

        // 3. Draw the visible slice.
        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self.state.layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y = self.state.layout.top_of(visible.start);
        for i in visible {
            let height = self.state.layout.heights[i];
            let spinner = (self.is_loading && i == last).then_some(self.spinner_frame);
            scroll_view.render_widget(
                MessageView::new(&messages[i], spinner),
                Rect::new(0, y, content_width, height),
            );
            y += height;
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        let offset = self.state.scroll_state.offset().y;
        self.state.has_unseen_content = offset < total_height.saturating_sub(area.height);
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom | TuiEvent::CursorEnd => self.pin_to_bottom(),
            _ => {}
        }
        None
    }
}

/// Measured heights, kept across frames.
///
/// Entries before the last one never change once appended, so only the
/// tail is re-measured when the transcript revision moves. A width change
/// or a shrinking transcript throws the whole cache away.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    /// `prefix_heights[i]` is the bottom edge of entry `i`.
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
    revision: u64,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            message_count: 0,
            content_width: 0,
            revision: 0,
        }
    }

    pub fn reusable_count(&self, message_count: usize, content_width: u16, revision: u64) -> usize {
        if self.content_width != content_width || message_count < self.message_count {
            return 0;
        }
        let cached = self.heights.len().min(message_count);
        if revision == self.revision {
            cached
        } else {
            // The previous last entry may have been patched or replaced.
            cached.min(self.message_count.saturating_sub(1))
        }
    }

    pub fn update_metadata(&mut self, message_count: usize, content_width: u16, revision: u64) {
        self.message_count = message_count;
        self.content_width = content_width;
        self.revision = revision;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Top edge of entry `index`.
    pub fn top_of(&self, index: usize) -> u16 {
        match index {
            0 => 0,
            i => self.prefix_heights.get(i - 1).copied().unwrap_or(0),
        }
    }

    /// Entries intersecting the viewport, padded by half a screen each way.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let from = scroll_offset.saturating_sub(buffer);
        let to = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self.prefix_heights.partition_point(|&end| end <= from);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < to)
            .saturating_add(1)
            .min(self.prefix_heights.len());
        start..end.max(start)
    }
}
