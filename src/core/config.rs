//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.devchat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::inference::SessionConfig;
use crate::inference::types::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL,
    DEFAULT_SYSTEM_INSTRUCTION, DEFAULT_THINKING_BUDGET,
};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DevchatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub model: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub thinking_budget: Option<u32>,
    pub system_prompt: Option<String>,
    pub system_prompt_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

// ============================================================================
// Resolved Config (concrete values, no Options except the credential)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model_name: String,
    pub max_output_tokens: u32,
    pub thinking_budget: u32,
    pub system_prompt: String,
    pub api_key: Option<String>,
    pub base_url: String,
}

impl ResolvedConfig {
    /// The fixed settings handed to the session factory.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            model: self.model_name.clone(),
            system_instruction: self.system_prompt.clone(),
            max_output_tokens: self.max_output_tokens,
            thinking_budget: self.thinking_budget,
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

/// Environment variables consulted during resolution. Split out so tests can
/// resolve against a fixed environment instead of the process one.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl EnvOverrides {
    /// Reads `GEMINI_API_KEY` (falling back to `API_KEY`), `GEMINI_BASE_URL`
    /// and `DEVCHAT_MODEL` from the process environment.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .or_else(|| std::env::var("API_KEY").ok()),
            base_url: std::env::var("GEMINI_BASE_URL").ok(),
            model: std::env::var("DEVCHAT_MODEL").ok(),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.devchat/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".devchat"))
}

/// Returns the path to `~/.devchat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `path`, or from `~/.devchat/config.toml` when `path` is None.
///
/// If the default file doesn't exist, generates a commented-out default and
/// returns `DevchatConfig::default()`. An explicit path that doesn't exist is
/// an I/O error. A file that exists but is malformed returns `ConfigError::Parse`.
pub fn load_config(path: Option<&Path>) -> Result<DevchatConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => {
                if !p.exists() {
                    info!("No config file found, generating default at {}", p.display());
                    generate_default_config(&p);
                    return Ok(DevchatConfig::default());
                }
                p
            }
            None => {
                warn!("Could not determine home directory, using default config");
                return Ok(DevchatConfig::default());
            }
        },
    };

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parses TOML text into a config.
pub fn parse_config(contents: &str) -> Result<DevchatConfig, ConfigError> {
    let config: DevchatConfig = toml::from_str(contents).map_err(ConfigError::Parse)?;
    debug!(
        "Config: model={:?}, max_output_tokens={:?}, thinking_budget={:?}, api_key_set={}",
        config.general.model,
        config.general.max_output_tokens,
        config.general.thinking_budget,
        config.gemini.api_key.is_some()
    );
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# devchat Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# model = "gemini-2.5-flash"
# max_output_tokens = 2048
# thinking_budget = 1024             # Must be smaller than max_output_tokens
# system_prompt = "You are a world-class software development assistant."
# system_prompt_file = "system.md"   # Path relative to ~/.devchat/

# [gemini]
# api_key = "..."                    # Or set GEMINI_API_KEY (or API_KEY) env var
# base_url = "https://generativelanguage.googleapis.com/v1beta"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_model` is from the `--model` flag (None = not specified).
pub fn resolve(config: &DevchatConfig, env: &EnvOverrides, cli_model: Option<&str>) -> ResolvedConfig {
    // Model: CLI → env → config → default
    let model_name = cli_model
        .map(|s| s.to_string())
        .or_else(|| env.model.clone())
        .or_else(|| config.general.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    // API key: env → config
    let api_key = env.api_key.clone().or_else(|| config.gemini.api_key.clone());

    // Base URL: env → config → default
    let base_url = env
        .base_url
        .clone()
        .or_else(|| config.gemini.base_url.clone())
        .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

    ResolvedConfig {
        model_name,
        max_output_tokens: config
            .general
            .max_output_tokens
            .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
        thinking_budget: config
            .general
            .thinking_budget
            .unwrap_or(DEFAULT_THINKING_BUDGET),
        system_prompt: resolve_system_prompt(config, config_dir().as_deref()),
        api_key,
        base_url,
    }
}

/// Resolves the system prompt: inline wins over file, both win over default.
/// `system_prompt_file` is relative to `base_dir`.
fn resolve_system_prompt(config: &DevchatConfig, base_dir: Option<&Path>) -> String {
    if let Some(ref prompt) = config.general.system_prompt {
        return prompt.clone();
    }

    if let (Some(file), Some(base)) = (&config.general.system_prompt_file, base_dir) {
        let prompt_path = base.join(file);
        match fs::read_to_string(&prompt_path) {
            Ok(contents) => {
                let trimmed = contents.trim().to_string();
                if !trimmed.is_empty() {
                    info!("Loaded system prompt from {}", prompt_path.display());
                    return trimmed;
                }
                warn!("System prompt file is empty: {}", prompt_path.display());
            }
            Err(e) => {
                warn!(
                    "Failed to read system prompt file {}: {}",
                    prompt_path.display(),
                    e
                );
            }
        }
    }

    DEFAULT_SYSTEM_INSTRUCTION.to_string()
}
