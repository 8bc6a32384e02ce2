use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, TitleBar};

/// Header, transcript, input. The input area grows with the draft.
pub fn screen_areas(area: Rect, input_height: u16) -> [Rect; 3] {
    use Constraint::{Length, Min};
    Layout::vertical([Length(1), Min(0), Length(input_height)]).areas(area)
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let input_height = tui.input_box.calculate_height(frame.area().width);
    let [title_area, list_area, input_area] = screen_areas(frame.area(), input_height);

    MessageList::new(
        &mut tui.message_list,
        &app.transcript,
        app.is_loading,
        spinner_frame,
    )
    .render(frame, list_area);

    // Drawn after the list so the unseen-content flag is current.
    TitleBar::new(
        app.model_name.clone(),
        app.status_message.clone(),
        app.session_available(),
        tui.message_list.has_unseen_content,
    )
    .render(frame, title_area);

    tui.input_box.render(frame, input_area);
}
