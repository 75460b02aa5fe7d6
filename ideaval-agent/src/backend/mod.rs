//! Completion backend abstraction layer.
//!
//! Provides a trait-based interface over chat-completion providers:
//! - OpenAI-compatible HTTP APIs (OpenAI, vLLM, Ollama, etc.)
//! - Scripted backend for testing

pub mod openai;
pub mod scripted;
pub mod traits;

pub use openai::OpenAiBackend;
pub use scripted::ScriptedBackend;
pub use traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
