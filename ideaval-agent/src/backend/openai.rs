//! OpenAI-compatible completion backend.
//!
//! Works with any server exposing `POST {base_url}/chat/completions`:
//! - OpenAI API
//! - vLLM
//! - Ollama
//! - Together.ai

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::traits::*;

/// OpenAI-compatible backend.
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        })
    }

    /// Create a backend for the OpenAI API.
    pub fn openai(model: &str, api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::new("https://api.openai.com/v1", model, Some(api_key.into()))
    }

    /// Create a backend pointing to Ollama.
    pub fn ollama(model: &str) -> Result<Self, LlmError> {
        Self::new("http://localhost:11434/v1", model, None)
    }

    /// Build the request URL.
    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build authorization header if API key is set.
    fn auth_header(&self) -> Option<String> {
        self.api_key.as_ref().map(|k| format!("Bearer {}", k))
    }
}

/// OpenAI chat completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatRequest>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormatRequest {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// OpenAI chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<UsageResponse>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut messages: Vec<ChatMessage> = Vec::new();

        if let Some(system) = &request.system_prompt {
            messages.push(ChatMessage {
                role: MessageRole::System.as_str(),
                content: system.clone(),
            });
        }

        for msg in &request.messages {
            messages.push(ChatMessage {
                role: msg.role.as_str(),
                content: msg.content.clone(),
            });
        }

        let response_format = request.response_format.as_ref().map(|rf| ResponseFormatRequest {
            format_type: match rf.format_type {
                ResponseFormatType::Json => "json_object",
                ResponseFormatType::Text => "text",
            },
        });

        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let chat_request = ChatRequest {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format,
            stream: false,
        };

        debug!(model = %chat_request.model, "Sending chat completion");

        let mut http_request = self.client.post(self.chat_completions_url());

        if let Some(auth) = self.auth_header() {
            http_request = http_request.header(header::AUTHORIZATION, auth);
        }

        let response = http_request
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000);
            let body = response.text().await.unwrap_or_default();

            warn!(status = %status, "Chat completion rejected");

            return Err(match status {
                StatusCode::UNAUTHORIZED => LlmError::Unauthorized(body),
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { retry_after_ms },
                _ => LlmError::RequestFailed(format!("HTTP {}: {}", status, body)),
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ParseError("No choices in response".to_string()))?;

        let content = choice.message.content.unwrap_or_default();

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        if finish_reason == FinishReason::ContentFilter && content.is_empty() {
            return Err(LlmError::ContentFiltered {
                reason: "Completion blocked by provider content filter".to_string(),
            });
        }

        let usage = chat_response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            finish_reason,
            usage,
        })
    }
}
