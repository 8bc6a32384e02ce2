//! # Inference
//!
//! Everything that talks to the hosted model. The rest of the crate only sees
//! the [`ChatSession`] capability: hand it a message, get text fragments back.

pub mod providers;
pub mod session;
pub mod types;

use std::sync::Arc;

use log::info;

pub use providers::GeminiSession;
pub use session::{ChatSession, SessionError};
pub use types::{SessionConfig, StreamChunk};

/// Builds the one chat session used for the lifetime of the program.
///
/// Fails when no API key is configured or when the reasoning budget would not
/// leave room for an answer under the output cap.
pub fn create_session(config: &SessionConfig) -> Result<Arc<dyn ChatSession>, SessionError> {
    let api_key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            SessionError::Config("GEMINI_API_KEY environment variable not set".to_string())
        })?;

    if config.max_output_tokens == 0 {
        return Err(SessionError::Config(
            "max_output_tokens must be greater than zero".to_string(),
        ));
    }
    if config.thinking_budget >= config.max_output_tokens {
        return Err(SessionError::Config(format!(
            "thinking_budget ({}) must be smaller than max_output_tokens ({})",
            config.thinking_budget, config.max_output_tokens
        )));
    }

    info!(
        "Creating Gemini session: model={}, max_output_tokens={}, thinking_budget={}",
        config.model, config.max_output_tokens, config.thinking_budget
    );
    Ok(Arc::new(GeminiSession::new(api_key.to_string(), config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: Option<&str>) -> SessionConfig {
        SessionConfig {
            api_key: key.map(str::to_string),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_create_session_requires_api_key() {
        let err = create_session(&config_with_key(None)).err();
        assert!(matches!(err, Some(SessionError::Config(msg)) if msg.contains("GEMINI_API_KEY")));
    }

    #[test]
    fn test_create_session_rejects_blank_api_key() {
        assert!(create_session(&config_with_key(Some("   "))).is_err());
    }

    #[test]
    fn test_create_session_rejects_budget_at_or_over_cap() {
        let config = SessionConfig {
            thinking_budget: 2048,
            ..config_with_key(Some("key"))
        };
        let err = create_session(&config).err();
        assert!(matches!(err, Some(SessionError::Config(msg)) if msg.contains("thinking_budget")));
    }

    #[test]
    fn test_create_session_succeeds_with_defaults_and_key() {
        let session = create_session(&config_with_key(Some("key"))).unwrap();
        assert_eq!(session.name(), "gemini");
        assert_eq!(session.model(), "gemini-2.5-flash");
    }
}
