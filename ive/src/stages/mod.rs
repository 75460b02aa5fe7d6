//! Model-backed pipeline stages.
//!
//! Each stage builds its prompt, calls the backend through [`StageContext`],
//! then parses and checks the response against its contract.

pub mod architect;
pub mod calculator;
pub mod sensor;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use ideaval_agent::{
    CompletionRequest, InteractionDirection, InteractionEntry, InteractionLog, LlmBackend, LlmError,
};
use rubric::{parser, SchemaNode};

use crate::config::StageConfig;
use crate::observer::{InteractionEvent, PipelineObserver};
use crate::types::{PipelineError, Result, Stage};

pub use architect::run_architect;
pub use calculator::{run_calculator, Narrative};
pub use sensor::run_sensor;

/// Everything a stage needs to talk to the model for one run.
pub struct StageContext<'a> {
    pub run_id: &'a str,
    pub backend: &'a Arc<dyn LlmBackend>,
    pub observer: &'a dyn PipelineObserver,
    /// Engine-owned transcript, when auditing is enabled
    pub audit: Option<&'a InteractionLog>,
    /// Characters of raw output included in error logs
    pub log_raw_chars: usize,
}

impl<'a> StageContext<'a> {
    /// Send a prompt and return the raw completion text.
    ///
    /// Notifies the observer before sending and after receiving.
    pub async fn invoke(&self, stage: Stage, config: &StageConfig, prompt: String) -> Result<String> {
        let mut request = CompletionRequest::user(prompt)
            .with_model(&config.model)
            .with_temperature(config.temperature)
            .with_json_output();
        if let Some(max) = config.max_tokens {
            request = request.with_max_tokens(max);
        }

        let prompt_text = request.prompt_text();
        self.notify(stage, InteractionDirection::Sent, &prompt_text).await;

        debug!(run_id = %self.run_id, stage = %stage, model = %config.model, "Calling backend");

        let response = self.backend.complete(request).await.map_err(|e| {
            error!(run_id = %self.run_id, stage = %stage, error = %e, "Backend call failed");
            match e {
                LlmError::Unauthorized(message) => PipelineError::Authentication { stage, message },
                other => PipelineError::Stage {
                    stage,
                    message: other.to_string(),
                },
            }
        })?;

        self.notify(stage, InteractionDirection::Received, &response.content).await;

        Ok(response.content)
    }

    async fn notify(&self, stage: Stage, direction: InteractionDirection, content: &str) {
        if let Some(audit) = self.audit {
            audit
                .record(InteractionEntry::new(self.run_id, stage.name(), direction, content))
                .await;
        }
        self.observer
            .on_interaction(&InteractionEvent {
                run_id: self.run_id,
                stage,
                direction,
                content,
            })
            .await;
    }

    /// Parse raw text and check it against a contract.
    ///
    /// Parse and validation failures are errors.
    pub fn parse_strict(&self, stage: Stage, raw: &str, schema: &SchemaNode) -> Result<Value> {
        let value = parser::parse(raw).map_err(|source| {
            error!(
                run_id = %self.run_id,
                stage = %stage,
                error = %source,
                raw = %truncate(raw, self.log_raw_chars),
                "Response was not valid JSON"
            );
            PipelineError::Parse { stage, source }
        })?;

        let report = schema.validate(&value);
        if !report.valid {
            error!(
                run_id = %self.run_id,
                stage = %stage,
                errors = %report.joined(),
                raw = %truncate(raw, self.log_raw_chars),
                "Response failed schema validation"
            );
            return Err(PipelineError::SchemaValidation {
                stage,
                errors: report.errors,
            });
        }

        Ok(value)
    }

    /// Decode a validated value into its typed form.
    pub fn decode<T: DeserializeOwned>(&self, stage: Stage, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| {
            error!(run_id = %self.run_id, stage = %stage, error = %e, "Validated output did not decode");
            PipelineError::SchemaValidation {
                stage,
                errors: vec![format!("root: {}", e)],
            }
        })
    }

    /// Log a non-fatal contract violation.
    pub fn warn_advisory(&self, stage: Stage, errors: &[String], raw: &str) {
        warn!(
            run_id = %self.run_id,
            stage = %stage,
            errors = %errors.join("; "),
            raw = %truncate(raw, self.log_raw_chars),
            "Response failed advisory schema validation"
        );
    }
}

/// Cut text to at most `max` characters on a char boundary.
pub(crate) fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
