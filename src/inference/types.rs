pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;
/// Tokens reserved for the model's internal reasoning. Must stay below the
/// output cap, otherwise the reasoning can consume the whole answer budget.
pub const DEFAULT_THINKING_BUDGET: u32 = 1024;
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a world-class software development assistant chatbot. \
    Your purpose is to assist and instruct users with their programming and software engineering questions. \
    Provide clear, accurate, and concise answers. When appropriate, include well-formatted code examples. \
    Respond in Markdown format.";

/// Everything needed to open a chat session. Fixed once the session exists.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub model: String,
    pub system_instruction: String,
    pub max_output_tokens: u32,
    pub thinking_budget: u32,
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            thinking_budget: DEFAULT_THINKING_BUDGET,
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

/// One incremental piece of model-generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    pub text: String,
}

impl StreamChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_config() {
        let config = SessionConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.max_output_tokens, 2048);
        assert_eq!(config.thinking_budget, 1024);
        assert!(config.api_key.is_none());
        assert!(config.system_instruction.contains("Markdown"));
    }

    #[test]
    fn test_default_budget_fits_under_output_cap() {
        assert!(DEFAULT_THINKING_BUDGET < DEFAULT_MAX_OUTPUT_TOKENS);
    }
}
