//! Gemini chat session over the `streamGenerateContent` endpoint.
//!
//! This module uses Gemini API terminology:
//! - "contents" (the turn history, each with a role of `user` or `model`)
//! - "parts" (text pieces inside a content item)
//! - SSE stream via `?alt=sse`, one JSON `GenerateContentResponse` per `data:` line

use std::sync::Mutex;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::inference::{ChatSession, SessionConfig, SessionError, StreamChunk};

// ============================================================================
// Gemini API Types
// ============================================================================

/// Role of a content item in the request history
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
enum ContentRole {
    User,
    Model,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct Part {
    text: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct Content {
    role: ContentRole,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: ContentRole, text: &str) -> Self {
        Self {
            role,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize, Debug)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    thinking_config: ThinkingConfig,
}

/// The request body for `streamGenerateContent`
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: SystemInstruction,
    contents: &'a [Content],
    generation_config: GenerationConfig,
}

/// One streamed `GenerateContentResponse`
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct StreamResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
    /// Set on reasoning summaries; those never reach the transcript.
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Error envelope returned with non-success statuses
#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ApiErrorDetail {
    message: String,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// Collects the visible text of the first candidate, skipping thought parts.
fn visible_text(response: &StreamResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter(|p| !p.thought)
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Pulls the human-readable message out of an error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "unknown error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Removes every complete line from `buffer`, leaving any partial tail behind.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let mut line: Vec<u8> = buffer.drain(..=pos).collect();
        line.pop();
        lines.push(line);
    }
    lines
}

/// Decodes one SSE line into the visible text it carries, if any.
///
/// Non-`data:` lines and events without visible text yield `None`. A prompt
/// block reason fails with `SessionError::Blocked`.
fn parse_sse_line(line: &[u8]) -> Result<Option<String>, SessionError> {
    let line = std::str::from_utf8(line)
        .map_err(|e| SessionError::Parse(format!("invalid UTF-8 in stream: {e}")))?;
    let Some(data) = line.trim().strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }

    let event: StreamResponse =
        serde_json::from_str(data).map_err(|e| SessionError::Parse(format!("{e}: {data}")))?;

    if let Some(reason) = event
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
    {
        warn!("Prompt blocked: {}", reason);
        return Err(SessionError::Blocked(reason));
    }

    if let Some(reason) = event
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
    {
        debug!("Candidate finish reason: {}", reason);
    }

    let text = visible_text(&event);
    Ok((!text.is_empty()).then_some(text))
}

// ============================================================================
// Session Implementation
// ============================================================================

/// Gemini chat session: fixed configuration plus the history of completed turns.
pub struct GeminiSession {
    api_key: String,
    base_url: String,
    model: String,
    system_instruction: String,
    max_output_tokens: u32,
    thinking_budget: u32,
    history: Mutex<Vec<Content>>,
    client: reqwest::Client,
}

impl GeminiSession {
    /// Creates a new session.
    ///
    /// # Arguments
    /// * `api_key` - Gemini API key
    /// * `config` - model, system instruction, token budgets and base URL
    pub fn new(api_key: String, config: &SessionConfig) -> Self {
        Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            system_instruction: config.system_instruction.clone(),
            max_output_tokens: config.max_output_tokens,
            thinking_budget: config.thinking_budget,
            history: Mutex::new(Vec::new()),
            client: reqwest::Client::new(),
        }
    }

    /// Number of content items (user + model) recorded so far.
    pub fn history_len(&self) -> usize {
        self.history
            .lock()
            .map(|h| h.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    fn snapshot_history(&self) -> Vec<Content> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn record_exchange(&self, user: Content, model: Content) {
        let mut history = self
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        history.push(user);
        history.push(model);
    }

    fn build_request<'a>(&self, contents: &'a [Content]) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: self.system_instruction.clone(),
                }],
            },
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                thinking_config: ThinkingConfig {
                    thinking_budget: self.thinking_budget,
                },
            },
        }
    }

    /// Sends a request to the streaming endpoint and returns the response.
    async fn send_request(
        &self,
        request: &GenerateContentRequest<'_>,
    ) -> Result<reqwest::Response, SessionError> {
        let json_body = serde_json::to_string(request)
            .map_err(|e| SessionError::Parse(format!("Request serialization failed: {e}")))?;
        debug!("Gemini request body: {} bytes", json_body.len());

        let response = self
            .client
            .post(format!(
                "{}/models/{}:streamGenerateContent?alt=sse",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .body(json_body)
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        debug!("Gemini response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Gemini API error: {} - {}", status, err_body);
            return Err(SessionError::Api {
                status,
                message: api_error_message(&err_body),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatSession for GeminiSession {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send_message_stream(
        &self,
        message: &str,
        sender: Sender<StreamChunk>,
    ) -> Result<(), SessionError> {
        let user_content = Content::text(ContentRole::User, message);
        let mut contents = self.snapshot_history();
        contents.push(user_content.clone());

        let request = self.build_request(&contents);
        info!(
            "Gemini streamGenerateContent request: model={}, contents={}, max_output_tokens={}, thinking_budget={}",
            self.model,
            contents.len(),
            self.max_output_tokens,
            self.thinking_budget
        );

        let mut response = self.send_request(&request).await?;

        // Process the SSE stream. Bytes are buffered until a full line is
        // available so multi-byte characters split across reads stay intact.
        let mut buffer: Vec<u8> = Vec::new();
        let mut full_text = String::new();
        let mut chunk_count = 0usize;

        loop {
            let next = response
                .chunk()
                .await
                .map_err(|e| SessionError::Network(e.to_string()))?;

            let (lines, finished) = match next {
                Some(chunk) => {
                    debug!("Raw chunk received: {} bytes", chunk.len());
                    buffer.extend_from_slice(&chunk);
                    (drain_lines(&mut buffer), false)
                }
                // An unterminated final line is still an event.
                None => (vec![std::mem::take(&mut buffer)], true),
            };

            for line in lines {
                let Some(text) = parse_sse_line(&line)? else {
                    continue;
                };
                chunk_count += 1;
                full_text.push_str(&text);
                debug!(
                    "Sending text chunk (len={}, total={})",
                    text.len(),
                    full_text.len()
                );
                if sender.send(StreamChunk { text }).await.is_err() {
                    warn!("Text chunk send failed: receiver dropped");
                    return Err(SessionError::ChannelClosed);
                }
            }

            if finished {
                break;
            }
        }

        info!(
            "Stream ended: {} chunks, {} total content bytes",
            chunk_count,
            full_text.len()
        );
        self.record_exchange(user_content, Content::text(ContentRole::Model, &full_text));
        Ok(())
    }
}
