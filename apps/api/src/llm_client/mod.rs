//! LLM Client: the only module that talks to the Anthropic Messages API.
//!
//! Text refinement and resume import both go through `LlmClient`. Calls retry on
//! 429 and 5xx with exponential backoff; JSON replies may arrive wrapped in code
//! fences, which `call_json` strips before parsing. Images are sent inline as
//! base64 content blocks ahead of the prompt.
use std::time::Duration;

use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Model used for every call.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

/// A bare string, or a list of typed blocks when the message carries an image.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Blocks(Vec<RequestBlock<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    encoding: &'static str,
    media_type: &'a str,
    data: String,
}

/// Raw image bytes with their MIME type, e.g. `image/png`.
#[derive(Debug, Clone, Copy)]
pub struct ImageInput<'a> {
    pub media_type: &'a str,
    pub data: &'a [u8],
}

impl<'a> MessageContent<'a> {
    fn with_image(image: ImageInput<'a>, prompt: &'a str) -> Self {
        let source = ImageSource {
            encoding: "base64",
            media_type: image.media_type,
            data: base64::engine::general_purpose::STANDARD.encode(image.data),
        };
        MessageContent::Blocks(vec![
            RequestBlock::Image { source },
            RequestBlock::Text { text: prompt },
        ])
    }
}

fn messages_request<'a>(system: &'a str, content: MessageContent<'a>) -> MessagesRequest<'a> {
    MessagesRequest {
        model: MODEL,
        max_tokens: MAX_TOKENS,
        system,
        messages: [UserMessage {
            role: "user",
            content,
        }],
    }
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// All text blocks of the reply, concatenated. `None` when there are none.
    pub fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();
        (!parts.is_empty()).then(|| parts.concat())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Prefers the API's own error message over the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// 1s, 2s, 4s, ... before the given retry (attempt 1 is the first retry).
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.saturating_sub(1).min(6))
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of a single HTTP attempt.
enum Attempt {
    Done(LlmResponse),
    Retry(LlmError),
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, api_key })
    }

    /// Sends one user message and returns the full reply.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        self.send(&messages_request(system, MessageContent::Text(prompt)))
            .await
    }

    /// Like `call`, with the image placed before the prompt in the same message.
    pub async fn call_with_image(
        &self,
        image: ImageInput<'_>,
        prompt: &str,
        system: &str,
    ) -> Result<LlmResponse, LlmError> {
        self.send(&messages_request(
            system,
            MessageContent::with_image(image, prompt),
        ))
        .await
    }

    async fn send(&self, request: &MessagesRequest<'_>) -> Result<LlmResponse, LlmError> {
        let mut last_error = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying LLM call");
                tokio::time::sleep(delay).await;
            }
            match self.attempt(request).await? {
                Attempt::Done(response) => {
                    debug!(
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        "LLM call succeeded"
                    );
                    return Ok(response);
                }
                Attempt::Retry(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_ATTEMPTS,
        }))
    }

    /// Transport failures and retryable statuses come back as `Attempt::Retry`;
    /// any other non-success status is final.
    async fn attempt(&self, request: &MessagesRequest<'_>) -> Result<Attempt, LlmError> {
        let sent = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(e) => return Ok(Attempt::Retry(LlmError::Http(e))),
        };

        let status = response.status();
        if status.is_success() {
            return Ok(Attempt::Done(response.json().await?));
        }

        let body = response.text().await.unwrap_or_default();
        let error = LlmError::Api {
            status: status.as_u16(),
            message: api_error_message(body),
        };
        if is_retryable(status) {
            warn!(status = status.as_u16(), "LLM API error: {error}");
            Ok(Attempt::Retry(error))
        } else {
            Err(error)
        }
    }

    /// The reply's text, trimmed. Blank replies are an error.
    pub async fn call_text(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        reply_text(&self.call(prompt, system).await?)
    }

    /// Deserializes the reply as JSON. The prompt must ask for JSON only.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let text = self.call_text(prompt, system).await?;
        Ok(serde_json::from_str(strip_code_fences(&text))?)
    }

    /// `call_json` for a prompt about an attached image.
    pub async fn call_json_with_image<T: DeserializeOwned>(
        &self,
        image: ImageInput<'_>,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let text = reply_text(&self.call_with_image(image, prompt, system).await?)?;
        Ok(serde_json::from_str(strip_code_fences(&text))?)
    }
}

fn reply_text(response: &LlmResponse) -> Result<String, LlmError> {
    let text = response.text().unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(text.to_string())
}

/// Strips one surrounding Markdown code fence, with or without a language tag.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag (e.g. `json`) up to the first newline.
    let body = match body.find('\n') {
        Some(newline) if !body[..newline].contains('{') => &body[newline + 1..],
        _ => body,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences_with_language_tag() {
        assert_eq!(strip_code_fences("```json\n{\"name\": \"Ada\"}\n```"), "{\"name\": \"Ada\"}");
    }

    #[test]
    fn test_strip_code_fences_without_tag() {
        assert_eq!(strip_code_fences("```\n{\"name\": \"Ada\"}\n```"), "{\"name\": \"Ada\"}");
    }

    #[test]
    fn test_strip_code_fences_leaves_plain_json() {
        assert_eq!(strip_code_fences("  {\"name\": \"Ada\"} "), "{\"name\": \"Ada\"}");
    }

    #[test]
    fn test_strip_code_fences_on_one_line() {
        assert_eq!(strip_code_fences("```{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn test_reply_text_joins_text_blocks() {
        let response: LlmResponse = serde_json::from_str(
            r#"{"content": [
                {"type": "text", "text": "Led "},
                {"type": "tool_use"},
                {"type": "text", "text": "the team"}
            ], "usage": {"input_tokens": 3, "output_tokens": 2}}"#,
        )
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("Led the team"));
    }

    #[test]
    fn test_reply_without_text_blocks() {
        let response: LlmResponse = serde_json::from_str(
            r#"{"content": [], "usage": {"input_tokens": 3, "output_tokens": 0}}"#,
        )
        .unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_text_request_sends_plain_content() {
        let request = messages_request("sys", MessageContent::Text("hello"));
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_image_request_sends_base64_block_before_prompt() {
        let image = ImageInput {
            media_type: "image/png",
            data: b"abc",
        };
        let request = messages_request("sys", MessageContent::with_image(image, "read it"));
        let body = serde_json::to_value(&request).unwrap();
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[0]["source"]["media_type"], "image/png");
        assert_eq!(content[0]["source"]["data"], "YWJj");
        assert_eq!(content[1]["type"], "text");
        assert_eq!(content[1]["text"], "read it");
    }

    #[test]
    fn test_blank_reply_is_empty_content() {
        let response: LlmResponse = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "  "}], "usage": {"input_tokens": 1, "output_tokens": 1}}"#,
        )
        .unwrap();
        assert!(matches!(reply_text(&response), Err(LlmError::EmptyContent)));
    }

    #[test]
    fn test_retry_policy() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(3), Duration::from_secs(4));
    }

    #[test]
    fn test_api_error_message_prefers_envelope() {
        let body = r#"{"type":"error","error":{"type":"invalid_request_error","message":"bad model"}}"#;
        assert_eq!(api_error_message(body.to_string()), "bad model");
        assert_eq!(api_error_message("gateway timeout".to_string()), "gateway timeout");
    }
}
