//! Configuration for the validation engine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{PipelineError, Result};

/// Configuration for a [`crate::ValidationEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Architect stage model settings
    pub architect: StageConfig,
    /// Sensor stage model settings
    pub sensor: StageConfig,
    /// Calculator (narrative) stage model settings
    pub calculator: StageConfig,
    /// Pre-scoring gate settings
    pub gate: GateConfig,
    /// Behavior for unresolved design questions
    pub policy: PolicyConfig,
    /// General settings
    pub general: GeneralConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            architect: StageConfig::default(),
            sensor: StageConfig::default(),
            calculator: StageConfig {
                model: "gpt-4o-mini".to_string(),
                temperature: 0.2,
                max_tokens: None,
            },
            gate: GateConfig::default(),
            policy: PolicyConfig::default(),
            general: GeneralConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load config from YAML text.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load config from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&text).map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Use one model for every stage.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.architect.model = model.clone();
        self.sensor.model = model.clone();
        self.calculator.model = model;
        self
    }
}

/// Model settings for one stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Model identifier passed through to the backend
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Optional completion token limit
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            max_tokens: None,
        }
    }
}

/// Pre-scoring gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Return `pass = false` when critical evidence is missing
    pub halt_on_insufficient_evidence: bool,
    /// Missing market entries above which readiness drops to "Low Data Density"
    pub low_density_threshold: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            halt_on_insufficient_evidence: false,
            low_density_threshold: 5,
        }
    }
}

/// How the readiness upgrade treats gate-level blocking gaps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessUpgradePolicy {
    /// Skip the upgrade when the gate reported blocking gaps
    #[default]
    PreserveBlockingGaps,
    /// Upgrade on high-confidence count alone, replacing gate readiness
    Overwrite,
}

/// What happens when the narrative stage fails outright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeFailurePolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Return the deterministic result with empty narrative fields
    Degrade,
}

/// Policy configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub readiness_upgrade: ReadinessUpgradePolicy,
    pub narrative_failure: NarrativeFailurePolicy,
}

/// General configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Maximum validation runs in flight for batch validation
    pub max_concurrent_runs: usize,
    /// Keep an in-memory transcript of every prompt and response
    pub audit_enabled: bool,
    /// Characters of raw model output included in error logs
    pub log_raw_response_chars: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: 4,
            audit_enabled: true,
            log_raw_response_chars: 2_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.architect.temperature, 0.0);
        assert_eq!(config.sensor.temperature, 0.0);
        assert_eq!(config.calculator.model, "gpt-4o-mini");
        assert!(!config.gate.halt_on_insufficient_evidence);
        assert_eq!(config.gate.low_density_threshold, 5);
        assert_eq!(config.policy.narrative_failure, NarrativeFailurePolicy::Abort);
        assert_eq!(
            config.policy.readiness_upgrade,
            ReadinessUpgradePolicy::PreserveBlockingGaps
        );
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = EngineConfig::default().with_model("llama-3.3-70b");
        let yaml = config.to_yaml().unwrap();
        let parsed = EngineConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.calculator.model, "llama-3.3-70b");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
sensor:
  model: sonar-pro
  temperature: 0.0
policy:
  narrative_failure: degrade
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.sensor.model, "sonar-pro");
        assert_eq!(config.architect.model, "gpt-4o");
        assert_eq!(config.policy.narrative_failure, NarrativeFailurePolicy::Degrade);
        assert_eq!(config.general.max_concurrent_runs, 4);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = EngineConfig::from_file("/nonexistent/ive.yaml").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
