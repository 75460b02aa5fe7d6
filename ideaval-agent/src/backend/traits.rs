//! Core traits for completion backends.
//!
//! This module defines the `LlmBackend` trait - the single capability the
//! validation pipeline needs from a language model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Error types for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Backend rejected the credentials (HTTP 401)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Backend is not available
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Rate limited by the backend
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    /// Content was filtered
    #[error("Content filtered: {reason}")]
    ContentFiltered { reason: String },

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Backend returned a body we could not decode
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl LlmError {
    /// Whether the failure was an authorization rejection.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, LlmError::Unauthorized(_))
    }
}

/// Core trait for completion backends.
///
/// Implementations must be safe to share between concurrent validation runs.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Backend identifier (e.g., default model name).
    fn id(&self) -> &str;

    /// Generate a completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Request for LLM completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CompletionRequest {
    /// System prompt (optional)
    pub system_prompt: Option<String>,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Model to use; backends fall back to their default when unset
    pub model: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature (0.0-2.0)
    pub temperature: Option<f32>,
    /// Request structured output format
    pub response_format: Option<ResponseFormat>,
}

impl CompletionRequest {
    /// Create a new request with a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
            ..Default::default()
        }
    }

    /// Add a system prompt.
    pub fn with_system(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Select the model for this request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp.clamp(0.0, 2.0));
        self
    }

    /// Request JSON output.
    pub fn with_json_output(mut self) -> Self {
        self.response_format = Some(ResponseFormat {
            format_type: ResponseFormatType::Json,
        });
        self
    }

    /// Concatenated text of every user message.
    pub fn prompt_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// Response from LLM completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CompletionResponse {
    /// Generated content
    pub content: String,
    /// Why generation stopped
    pub finish_reason: FinishReason,
    /// Token usage
    pub usage: Usage,
}

/// Why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response or stop sequence)
    Stop,
    /// Hit max tokens limit
    Length,
    /// Content was filtered
    ContentFilter,
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl Usage {
    /// Get total tokens.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Format for structured output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ResponseFormat {
    /// Type of format
    pub format_type: ResponseFormatType,
}

/// Type of response format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormatType {
    /// Plain text
    Text,
    /// JSON object
    Json,
}
