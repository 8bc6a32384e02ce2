//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event loop
//!
//! Each iteration draws (when something changed), waits for terminal input,
//! drains every queued input event, then applies every `Action` the request
//! task has sent. All state changes go through `core::action::update` on this
//! thread, so fragments are applied in the order they were received.
//!
//! ## Redraw Strategy
//!
//! - **Loading**: redraws every ~80ms so the spinner moves.
//! - **Idle**: sleeps up to 500ms and redraws only on input or new actions.
//!
//! A `SteadyBlock` cursor is used because ratatui's `set_cursor_position`
//! resets the terminal's blink timer on every `draw()`.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;
mod wrap;

use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::core::action::{Action, Effect, update};
use crate::core::state::App;
use crate::inference::{ChatSession, StreamChunk};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(500);
/// Fragments buffered between the HTTP reader and the forwarder.
const CHUNK_CHANNEL_CAPACITY: usize = 100;

/// Presentation state that `core` never sees.
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
}

impl TuiState {
    pub fn new(app: &App) -> Self {
        let mut input_box = InputBox::new();
        input_box.available = app.session_available();
        input_box.loading = app.is_loading;
        Self {
            message_list: MessageListState::new(),
            input_box,
        }
    }

    fn sync_props(&mut self, app: &App) {
        self.input_box.available = app.session_available();
        self.input_box.loading = app.is_loading;
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // The Kitty keyboard protocol is what lets Shift+Enter be told apart
        // from Enter. Terminals without it ignore the request.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape,
            Hide
        );
    }
}

/// Run the interactive UI until the user quits. `app` keeps the final
/// transcript so the caller can export it.
pub fn run(app: &mut App) -> std::io::Result<()> {
    let mut terminal = ratatui::init();
    let guard = TerminalModeGuard::new();
    if let Err(e) = &guard {
        warn!("Could not enable terminal modes: {}", e);
    }

    let result = event_loop(&mut terminal, app);

    drop(guard);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut ratatui::DefaultTerminal, app: &mut App) -> std::io::Result<()> {
    let mut tui = TuiState::new(app);
    let (tx, rx) = mpsc::channel::<Action>();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    loop {
        tui.sync_props(app);
        let animating = app.is_loading;

        if needs_redraw || animating {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating { ANIMATION_TICK } else { IDLE_TICK };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                TuiEvent::Resize => {}
                TuiEvent::Quit => {
                    should_quit |= update(app, Action::Quit) == Effect::Quit;
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown
                | TuiEvent::ScrollToBottom => {
                    tui.message_list.handle_event(&event);
                }
                _ => {
                    // End moves the draft cursor and also re-pins the transcript.
                    if event == TuiEvent::CursorEnd {
                        tui.message_list.handle_event(&event);
                    }
                    if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&event) {
                        let effect = update(app, Action::Submit(text));
                        run_effect(effect, app, &tx, &mut should_quit);
                        tui.sync_props(app);
                    }
                }
            }
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(app, action);
            run_effect(effect, app, &tx, &mut should_quit);
        }

        if should_quit {
            info!("Quit requested");
            break;
        }
    }
    Ok(())
}

fn run_effect(effect: Effect, app: &App, tx: &mpsc::Sender<Action>, should_quit: &mut bool) {
    match effect {
        Effect::None => {}
        Effect::Quit => *should_quit = true,
        Effect::SpawnRequest(text) => match &app.session {
            Some(session) => spawn_request(Arc::clone(session), text, tx.clone()),
            None => warn!("SpawnRequest without a session"),
        },
    }
}

/// Stream one reply on a tokio task.
///
/// Fragments travel session → tokio channel → forwarder → `Action` channel.
/// Both halves run inside one task and the terminal action (`ResponseDone`
/// or `ResponseFailed`) is sent only after the forwarder has drained, so it
/// always follows the last fragment.
fn spawn_request(session: Arc<dyn ChatSession>, text: String, tx: mpsc::Sender<Action>) {
    info!("Spawning request ({} bytes) to {}", text.len(), session.model());

    tokio::spawn(async move {
        let (chunk_tx, mut chunk_rx) = tokio::sync::mpsc::channel::<StreamChunk>(CHUNK_CHANNEL_CAPACITY);
        let request_start = Instant::now();

        let forward_tx = tx.clone();
        let forward = async move {
            let mut forwarded = 0usize;
            let mut first_fragment: Option<Duration> = None;
            while let Some(chunk) = chunk_rx.recv().await {
                first_fragment.get_or_insert_with(|| request_start.elapsed());
                forwarded += 1;
                if forward_tx.send(Action::ResponseChunk(chunk.text)).is_err() {
                    warn!("Failed to forward ResponseChunk: receiver dropped");
                    break;
                }
            }
            (forwarded, first_fragment)
        };

        let (outcome, (forwarded, first_fragment)) =
            tokio::join!(session.send_message_stream(&text, chunk_tx), forward);

        debug!(
            "Stream finished: {} fragments, first after {:?}, total {:?}",
            forwarded,
            first_fragment,
            request_start.elapsed()
        );

        let action = match outcome {
            Ok(()) => Action::ResponseDone,
            Err(e) => {
                warn!("Stream failed: {}", e);
                Action::ResponseFailed(e.to_string())
            }
        };
        if tx.send(action).is_err() {
            warn!("Failed to send turn result: receiver dropped");
        }
    });
}
