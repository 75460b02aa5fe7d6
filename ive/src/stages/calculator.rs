//! Calculator stage: narrative around computed scores.
//!
//! The model writes prose only. Its response is checked against the
//! contract for logging, then merged field by field; numbers in the result
//! are never touched.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

use rubric::{contracts, parser, IdeaInput, PromptAssembler, ValidationResult};

use super::StageContext;
use crate::config::StageConfig;
use crate::types::{PipelineError, Result, Stage};

/// Narrative fields recovered from a Calculator response.
///
/// `None` means the field was absent or unusable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Narrative {
    pub summary: Option<String>,
    pub key_risks: Option<Vec<String>>,
    pub research_gaps: Option<Vec<String>>,
    pub metric_reasoning: BTreeMap<String, String>,
}

impl Narrative {
    /// Extract whatever usable fields the response carries.
    pub fn from_value(value: &Value) -> Self {
        let string_list = |key: &str| {
            value.get(key).and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
        };

        let metric_reasoning = value
            .get("metric_reasoning")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            summary: value.get("summary").and_then(Value::as_str).map(String::from),
            key_risks: string_list("key_risks"),
            research_gaps: string_list("research_gaps"),
            metric_reasoning,
        }
    }

    /// Merge into a scored result. Unknown metric keys are ignored.
    pub fn apply(self, result: &mut ValidationResult) {
        if let Some(summary) = self.summary {
            result.summary = summary;
        }
        if let Some(risks) = self.key_risks {
            result.key_risks = risks;
        }
        if let Some(gaps) = self.research_gaps {
            result.research_gaps = gaps;
        }
        for (key, reasoning) in self.metric_reasoning {
            if let Some(metric) = result.metrics.get_mut(&key) {
                metric.reasoning = reasoning;
            }
        }
    }
}

/// Run the Calculator stage.
///
/// Contract violations are logged, not returned. Backend and parse failures
/// are errors.
pub async fn run_calculator(
    ctx: &StageContext<'_>,
    config: &StageConfig,
    idea: &IdeaInput,
    result: &ValidationResult,
) -> Result<Narrative> {
    let stage = Stage::Calculator;
    let prompt = PromptAssembler::build_calculator_prompt(idea, result);
    let raw = ctx.invoke(stage, config, prompt).await?;

    let value = parser::parse(&raw).map_err(|e| PipelineError::Stage {
        stage,
        message: e.to_string(),
    })?;

    let report = contracts::calculator_schema().validate(&value);
    if !report.valid {
        ctx.warn_advisory(stage, &report.errors, &raw);
    }

    let narrative = Narrative::from_value(&value);
    info!(
        run_id = %ctx.run_id,
        reasoned_metrics = narrative.metric_reasoning.len(),
        schema_valid = report.valid,
        "Calculator narrative received"
    );

    Ok(narrative)
}
