//! Core types for the validation engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use rubric::ParseError;

/// A model-backed pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Normalizes the idea and plans research
    Architect,
    /// Gathers evidence for the research plan
    Sensor,
    /// Writes the narrative around computed scores
    Calculator,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Architect => "Architect",
            Stage::Sensor => "Sensor",
            Stage::Calculator => "Calculator reasoning",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position of a run in the pipeline state machine.
///
/// `Idle → Architect → Sensor → Gate → Score → Narrate → Done`, with
/// `Failed` reachable from any model-backed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    Idle,
    Architect,
    Sensor,
    Gate,
    Score,
    Narrate,
    Done,
    Failed,
}

impl PipelinePhase {
    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelinePhase::Done | PipelinePhase::Failed)
    }

    /// Whether this phase calls the completion backend.
    pub fn is_model_backed(&self) -> bool {
        matches!(
            self,
            PipelinePhase::Architect | PipelinePhase::Sensor | PipelinePhase::Narrate
        )
    }
}

/// Error types for the validation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Backend rejected the credentials
    #[error("{stage} authentication failed: {message}")]
    Authentication { stage: Stage, message: String },

    /// Parsed output does not match the stage contract
    #[error("{stage} output failed schema validation: {}", .errors.join("; "))]
    SchemaValidation { stage: Stage, errors: Vec<String> },

    /// Response could not be reduced to JSON
    #[error("{stage} response could not be parsed: {source}")]
    Parse {
        stage: Stage,
        #[source]
        source: ParseError,
    },

    /// Any other failure during a stage's model call
    #[error("{stage} failed: {message}")]
    Stage { stage: Stage, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// The stage that failed, if the error came from one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Authentication { stage, .. }
            | PipelineError::SchemaValidation { stage, .. }
            | PipelineError::Parse { stage, .. }
            | PipelineError::Stage { stage, .. } => Some(*stage),
            PipelineError::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_messages() {
        let err = PipelineError::Stage {
            stage: Stage::Calculator,
            message: "Network error: reset".to_string(),
        };
        assert_eq!(err.to_string(), "Calculator reasoning failed: Network error: reset");

        let err = PipelineError::SchemaValidation {
            stage: Stage::Architect,
            errors: vec![
                "root.research_plan: Missing required field".to_string(),
                "root.claims: Expected object, got string".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Architect output failed schema validation: root.research_plan: Missing required field; root.claims: Expected object, got string"
        );
        assert_eq!(err.stage(), Some(Stage::Architect));
    }

    #[test]
    fn test_phase_properties() {
        assert!(PipelinePhase::Failed.is_terminal());
        assert!(!PipelinePhase::Gate.is_terminal());
        assert!(PipelinePhase::Narrate.is_model_backed());
        assert!(!PipelinePhase::Score.is_model_backed());
    }
}
