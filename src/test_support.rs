//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::state::App;
use crate::inference::{ChatSession, SessionError, StreamChunk};

/// A session that replays a fixed list of fragments, then optionally fails.
pub struct ScriptedSession {
    pub fragments: Vec<String>,
    pub failure: Option<SessionError>,
}

impl ScriptedSession {
    pub fn replying(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            failure: None,
        }
    }

    pub fn failing_after(fragments: &[&str], failure: SessionError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::replying(fragments)
        }
    }
}

#[async_trait]
impl ChatSession for ScriptedSession {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "test-model"
    }

    async fn send_message_stream(
        &self,
        _message: &str,
        sender: Sender<StreamChunk>,
    ) -> Result<(), SessionError> {
        for fragment in &self.fragments {
            sender
                .send(StreamChunk::new(fragment.clone()))
                .await
                .map_err(|_| SessionError::ChannelClosed)?;
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Creates a test App backed by a session that replies with nothing.
pub fn test_app() -> App {
    app_with(ScriptedSession::replying(&[]))
}

/// Creates a test App backed by the given session.
pub fn app_with(session: ScriptedSession) -> App {
    let session: Arc<dyn ChatSession> = Arc::new(session);
    App::new(Ok(session), "test-model".to_string())
}

/// Creates a test App whose session failed to initialize.
pub fn failed_app() -> App {
    App::new(
        Err(SessionError::Config("GEMINI_API_KEY environment variable not set".to_string())),
        "test-model".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio_test::{assert_err, assert_ok, block_on};

    fn collect(session: &ScriptedSession) -> (Result<(), SessionError>, Vec<String>) {
        let (tx, mut rx) = mpsc::channel(16);
        let result = block_on(session.send_message_stream("hi", tx));
        let mut fragments = Vec::new();
        while let Ok(chunk) = rx.try_recv() {
            fragments.push(chunk.text);
        }
        (result, fragments)
    }

    #[test]
    fn scripted_session_replays_fragments() {
        let (result, fragments) = collect(&ScriptedSession::replying(&["a", "é", "🦀"]));
        assert_ok!(result);
        assert_eq!(fragments, vec!["a", "é", "🦀"]);
    }

    #[test]
    fn scripted_session_fails_after_fragments() {
        let session = ScriptedSession::failing_after(&["partial"], SessionError::ChannelClosed);
        let (result, fragments) = collect(&session);
        assert_err!(result);
        assert_eq!(fragments, vec!["partial"]);
    }
}
