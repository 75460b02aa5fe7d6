//! Idea validation agent - completion capability
//!
//! Provides the model-facing half of the validation pipeline:
//! - Trait-based completion backends (`LlmBackend`)
//! - An OpenAI-compatible HTTP backend
//! - A scripted backend for deterministic tests
//! - An interaction audit trail of every prompt and raw response
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Validation pipeline (ive)        │
//! └────────────────┬────────────────────────┘
//!                  │ CompletionRequest
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ LlmBackend  │       │ Interaction │
//! │ (OpenAI/    │       │ Log         │
//! │  Scripted)  │       │             │
//! └─────────────┘       └─────────────┘
//! ```

pub mod audit;
pub mod backend;

// Re-export main types for convenience
pub use audit::{InteractionDirection, InteractionEntry, InteractionLog, InteractionStats};
pub use backend::traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmBackend, LlmError, Usage,
};
pub use backend::{OpenAiBackend, ScriptedBackend};
