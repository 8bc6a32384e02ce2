//! # Application State
//!
//! Core business state for devchat. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── session: Option<Arc<dyn ChatSession>>  // None when init failed
//! ├── transcript: Transcript                 // what the user sees
//! ├── phase: TurnPhase                       // where the current turn is
//! ├── is_loading: bool                       // request in flight
//! ├── accumulator: String                    // reply text so far
//! ├── model_name: String                     // shown in the header
//! └── status_message: String                 // header status text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use log::{error, info};

use crate::core::transcript::{Message, Transcript};
use crate::inference::{ChatSession, SessionError};

pub const GREETING: &str =
    "Hello! I'm your friendly software development assistant. How can I help you code today?";

pub const INIT_FAILURE_MESSAGE: &str =
    "Failed to initialize chat session. Please check your API key and restart devchat.";

/// Where the current turn is in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    #[default]
    Idle,
    /// User entry and placeholder appended, no fragment received yet.
    Sending,
    /// At least one fragment has been applied to the placeholder.
    Streaming,
    /// The last turn ended in an error entry.
    Errored,
}

impl TurnPhase {
    /// True while a reply placeholder may still be patched.
    pub fn in_flight(self) -> bool {
        matches!(self, TurnPhase::Sending | TurnPhase::Streaming)
    }
}

pub struct App {
    pub session: Option<Arc<dyn ChatSession>>,
    pub transcript: Transcript,
    pub phase: TurnPhase,
    pub is_loading: bool,
    pub model_name: String,
    pub status_message: String,
    /// Full reply text received so far for the in-flight turn.
    pub(crate) accumulator: String,
}

impl App {
    /// Builds the initial state from the outcome of session creation.
    ///
    /// A working session opens with the greeting. A failed one opens with a
    /// single error entry and leaves the app read-only.
    pub fn new(session: Result<Arc<dyn ChatSession>, SessionError>, model_name: String) -> Self {
        let mut transcript = Transcript::new();
        let (session, status_message) = match session {
            Ok(session) => {
                info!("Chat session ready ({} / {})", session.name(), session.model());
                transcript.append(Message::model(GREETING));
                (Some(session), String::from("Ready"))
            }
            Err(e) => {
                error!("Failed to initialize chat session: {}", e);
                transcript.append(Message::error(INIT_FAILURE_MESSAGE));
                (None, String::from("Session unavailable"))
            }
        };

        Self {
            session,
            transcript,
            phase: TurnPhase::Idle,
            is_loading: false,
            model_name,
            status_message,
            accumulator: String::new(),
        }
    }

    /// Whether new messages can be sent at all.
    pub fn session_available(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the input should accept a submission right now.
    pub fn accepts_input(&self) -> bool {
        self.session_available() && !self.is_loading
    }
}
