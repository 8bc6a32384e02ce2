use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use super::types::StreamChunk;

/// Errors that can occur while creating or talking to a chat session.
/// The `Display` text is what ends up in the transcript's error bubble.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Session misconfigured (missing API key, inconsistent token budgets).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused, dropped stream).
    Network(String),
    /// API returned an error response.
    Api { status: u16, message: String },
    /// The model refused to answer the prompt.
    Blocked(String),
    /// Failed to parse the API's response.
    Parse(String),
    /// The mpsc channel was closed (the UI dropped the receiver).
    ChannelClosed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Config(msg) => write!(f, "config error: {msg}"),
            SessionError::Network(msg) => write!(f, "network error: {msg}"),
            SessionError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            SessionError::Blocked(reason) => write!(f, "response blocked: {reason}"),
            SessionError::Parse(msg) => write!(f, "parse error: {msg}"),
            SessionError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for SessionError {}

/// An open conversation with a hosted model.
///
/// The system instruction and generation settings are fixed at creation.
/// Implementations keep the history of completed exchanges themselves, so
/// callers only ever hand over the newest user message.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &str;

    /// Returns the model this session talks to.
    fn model(&self) -> &str;

    /// Sends `message` and streams the reply's text fragments into `sender`.
    /// Returns once the reply is complete or the stream fails.
    async fn send_message_stream(
        &self,
        message: &str,
        sender: Sender<StreamChunk>,
    ) -> Result<(), SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_human_readable() {
        let err = SessionError::Api {
            status: 429,
            message: "Resource has been exhausted".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (HTTP 429): Resource has been exhausted"
        );
        assert_eq!(
            SessionError::Network("connection refused".into()).to_string(),
            "network error: connection refused"
        );
        assert_eq!(
            SessionError::Blocked("SAFETY".into()).to_string(),
            "response blocked: SAFETY"
        );
    }
}
