//! # Actions
//!
//! Everything that can happen in devchat becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! A reply fragment arrives? That's `Action::ResponseChunk(text)`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing any I/O the caller must
//! perform. No side effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! One turn walks this state machine:
//!
//! ```text
//! Idle ──Submit──▶ Sending ──Chunk──▶ Streaming ──Done──▶ Idle
//!                     │                   │
//!                     └──────Failed───────┴──────────────▶ Errored
//! ```

use log::{debug, info, warn};

use crate::core::state::{App, TurnPhase};
use crate::core::transcript::Message;

pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";
pub const SESSION_NOT_INITIALIZED: &str =
    "Chat session is not initialized. Check your API key and restart devchat.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The user submitted a message.
    Submit(String),
    /// A streamed fragment of the model's reply.
    ResponseChunk(String),
    /// The reply stream finished normally.
    ResponseDone,
    /// The request or stream failed; carries a human-readable reason.
    ResponseFailed(String),
    Quit,
}

/// Work the event loop must perform after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Open a streaming request for this message.
    SpawnRequest(String),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => submit(app, text),
        Action::ResponseChunk(fragment) => {
            if !app.phase.in_flight() {
                debug!("Dropping fragment outside an active turn ({:?})", app.phase);
                return Effect::None;
            }
            app.accumulator.push_str(&fragment);
            app.transcript.patch_last(&app.accumulator);
            app.phase = TurnPhase::Streaming;
            Effect::None
        }
        Action::ResponseDone => {
            if !app.phase.in_flight() {
                return Effect::None;
            }
            info!("Turn complete: {} bytes", app.accumulator.len());
            app.is_loading = false;
            app.phase = TurnPhase::Idle;
            app.status_message = String::from("Ready");
            app.accumulator.clear();
            Effect::None
        }
        Action::ResponseFailed(reason) => {
            if !app.phase.in_flight() {
                return Effect::None;
            }
            fail_turn(app, reason);
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit(app: &mut App, text: String) -> Effect {
    let text = text.trim();
    if text.is_empty() || app.is_loading {
        return Effect::None;
    }

    app.transcript.append(Message::user(text));
    app.transcript.append(Message::model(""));
    app.accumulator.clear();
    app.is_loading = true;
    app.phase = TurnPhase::Sending;

    if app.session.is_none() {
        warn!("Submit without a session");
        fail_turn(app, SESSION_NOT_INITIALIZED.to_string());
        return Effect::None;
    }

    app.status_message = String::from("Thinking...");
    Effect::SpawnRequest(text.to_string())
}

fn fail_turn(app: &mut App, reason: String) {
    let reason = if reason.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        reason
    };
    warn!("Turn failed: {}", reason);
    app.transcript.replace_last(Message::error(reason));
    app.accumulator.clear();
    app.is_loading = false;
    app.phase = TurnPhase::Errored;
    app.status_message = String::from("Request failed");
}
