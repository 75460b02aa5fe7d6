//! ValidationEngine - runs the Architect → Sensor → Gate → Score → Narrate pipeline.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use ideaval_agent::{InteractionLog, LlmBackend};
use rubric::{rubric_fingerprint, IdeaInput, ValidationResult};

use crate::config::{EngineConfig, NarrativeFailurePolicy};
use crate::gate;
use crate::observer::PipelineObserver;
use crate::scoring;
use crate::stages::{run_architect, run_calculator, run_sensor, StageContext};
use crate::types::{PipelinePhase, Result};

/// Runs validation pipelines against a shared completion backend.
pub struct ValidationEngine {
    backend: Arc<dyn LlmBackend>,
    config: EngineConfig,
    /// Transcript of every prompt and response, across runs
    audit: Arc<InteractionLog>,
}

impl ValidationEngine {
    /// Create an engine with default configuration.
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend,
            config: EngineConfig::default(),
            audit: Arc::new(InteractionLog::new()),
        }
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the interaction transcript.
    pub fn audit_log(&self) -> &Arc<InteractionLog> {
        &self.audit
    }

    /// Validate one idea under a fresh run ID.
    pub async fn run(
        &self,
        input: &IdeaInput,
        observer: &dyn PipelineObserver,
    ) -> Result<ValidationResult> {
        let run_id = uuid::Uuid::new_v4().to_string();
        self.run_as(&run_id, input, observer).await
    }

    /// Validate one idea under the given run ID.
    pub async fn run_as(
        &self,
        run_id: &str,
        input: &IdeaInput,
        observer: &dyn PipelineObserver,
    ) -> Result<ValidationResult> {
        info!(
            run_id = %run_id,
            title = %input.title,
            backend = %self.backend.id(),
            rubric = %rubric_fingerprint(),
            "Starting validation run"
        );
        observer.on_phase(run_id, PipelinePhase::Idle).await;

        match self.execute(run_id, input, observer).await {
            Ok(result) => {
                observer.on_phase(run_id, PipelinePhase::Done).await;
                info!(
                    run_id = %run_id,
                    final_score = result.final_score,
                    readiness = result.validation_readiness.level,
                    "Validation run complete"
                );
                Ok(result)
            }
            Err(e) => {
                observer.on_phase(run_id, PipelinePhase::Failed).await;
                error!(run_id = %run_id, stage = ?e.stage(), error = %e, "Validation run failed");
                Err(e)
            }
        }
    }

    /// Validate several ideas, at most `max_concurrent_runs` at a time.
    ///
    /// Results are returned in input order.
    pub async fn run_many(
        &self,
        inputs: &[IdeaInput],
        observer: &dyn PipelineObserver,
    ) -> Vec<Result<ValidationResult>> {
        let limit = self.config.general.max_concurrent_runs.max(1);
        debug!(runs = inputs.len(), limit, "Starting batch validation");

        stream::iter(inputs)
            .map(|input| self.run(input, observer))
            .buffered(limit)
            .collect()
            .await
    }

    async fn execute(
        &self,
        run_id: &str,
        input: &IdeaInput,
        observer: &dyn PipelineObserver,
    ) -> Result<ValidationResult> {
        let ctx = StageContext {
            run_id,
            backend: &self.backend,
            observer,
            audit: self.config.general.audit_enabled.then(|| self.audit.as_ref()),
            log_raw_chars: self.config.general.log_raw_response_chars,
        };

        observer.on_phase(run_id, PipelinePhase::Architect).await;
        let architect = run_architect(&ctx, &self.config.architect, input).await?;
        observer
            .on_log(&format!(
                "Architect complete: {} research items planned",
                architect.research_plan.len()
            ))
            .await;

        observer.on_phase(run_id, PipelinePhase::Sensor).await;
        let sensor = run_sensor(&ctx, &self.config.sensor, &architect).await?;
        observer
            .on_log(&format!(
                "Sensor complete: {} findings",
                sensor.research_results.len()
            ))
            .await;

        observer.on_phase(run_id, PipelinePhase::Gate).await;
        let outcome = gate::evaluate(&architect, &sensor, &self.config.gate);
        observer
            .on_log(&format!(
                "Gate: level {} ({})",
                outcome.readiness.level, outcome.readiness.label
            ))
            .await;

        if !outcome.pass {
            warn!(run_id = %run_id, gaps = outcome.readiness.blocking_gaps.len(), "Gate halted run");
            return Ok(gate::halted_result(outcome.readiness));
        }

        observer.on_phase(run_id, PipelinePhase::Score).await;
        let gate_readiness = outcome.readiness;
        let mut result = scoring::score(&architect, &sensor, gate_readiness.clone());
        observer
            .on_log(&format!("Scoring complete: final score {}", result.final_score))
            .await;

        observer.on_phase(run_id, PipelinePhase::Narrate).await;
        match run_calculator(&ctx, &self.config.calculator, input, &result).await {
            Ok(narrative) => {
                narrative.apply(&mut result);
                observer.on_log("Calculator reasoning complete").await;
            }
            Err(e) => match self.config.policy.narrative_failure {
                NarrativeFailurePolicy::Abort => return Err(e),
                NarrativeFailurePolicy::Degrade => {
                    warn!(run_id = %run_id, error = %e, "Narrative unavailable, returning scores only");
                    observer
                        .on_log(&format!("Calculator reasoning skipped: {}", e))
                        .await;
                }
            },
        }

        result.validation_readiness =
            gate::upgrade_readiness(&gate_readiness, &result, self.config.policy.readiness_upgrade);

        Ok(result)
    }
}

/// Run one validation with a throwaway engine.
pub async fn run_validation_pipeline(
    backend: Arc<dyn LlmBackend>,
    config: EngineConfig,
    input: &IdeaInput,
    observer: &dyn PipelineObserver,
) -> Result<ValidationResult> {
    ValidationEngine::new(backend)
        .with_config(config)
        .run(input, observer)
        .await
}

