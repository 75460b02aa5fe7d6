//! Deterministic scoring.
//!
//! Every number in a [`ValidationResult`] is computed here from the Sensor's
//! findings and the fixed metric taxonomy. The model never produces a score.

use std::collections::BTreeMap;
use tracing::debug;

use rubric::{
    ArchitectOutput, Confidence, MetricDefinition, MetricScore, ResearchFinding, ResearchType,
    ScoreDetails, SensorOutput, SubMetricScore, ValidationReadiness, ValidationResult,
    CONTEXTUAL_METRIC, FINAL_SCORE_WEIGHTS, METRIC_SCHEMA,
};

/// Raw score for a high-confidence finding.
const HIGH_CONFIDENCE_SCORE: u32 = 90;
/// Raw score for a medium-confidence finding.
const MEDIUM_CONFIDENCE_SCORE: u32 = 60;
/// Raw score for low, null or missing evidence.
const LOW_CONFIDENCE_SCORE: u32 = 30;
/// Ceiling for qualitative findings.
const QUALITATIVE_CAP: u32 = 70;
/// Deduction applied to inferred sub-metrics.
const INFERENCE_PENALTY: u32 = 25;

/// Share of the combined score taken by the core aggregate.
const CORE_SHARE: f64 = 0.85;
/// Share of the combined score taken by the contextual metric.
const CONTEXTUAL_SHARE: f64 = 0.15;

/// Score one sub-metric from its finding, if any.
pub fn score_sub_metric(finding: Option<&ResearchFinding>) -> SubMetricScore {
    let Some(finding) = finding else {
        return SubMetricScore {
            score: LOW_CONFIDENCE_SCORE.saturating_sub(INFERENCE_PENALTY),
            inference: true,
        };
    };

    let (raw, inference) = match (finding.has_value(), finding.confidence) {
        (true, Confidence::High) => (HIGH_CONFIDENCE_SCORE, false),
        (true, Confidence::Medium) => (MEDIUM_CONFIDENCE_SCORE, false),
        _ => (LOW_CONFIDENCE_SCORE, true),
    };

    let mut score = raw.min(finding.epistemic_role.score_cap());
    if finding.research_type == ResearchType::Qualitative {
        score = score.min(QUALITATIVE_CAP);
    }
    if inference {
        score = score.saturating_sub(INFERENCE_PENALTY);
    }

    SubMetricScore { score, inference }
}

/// Score one metric as the weighted mean of its sub-metrics.
pub fn score_metric(definition: &MetricDefinition, sensor: &SensorOutput) -> MetricScore {
    let mut sub_metrics = BTreeMap::new();
    let mut weighted = 0.0;
    let mut total_weight = 0.0;

    for sub in definition.sub_metrics {
        let scored = score_sub_metric(sensor.find(definition.key, sub.key));
        weighted += scored.score as f64 * sub.weight;
        total_weight += sub.weight;
        sub_metrics.insert(sub.key.to_string(), scored);
    }

    let score = if total_weight > 0.0 {
        (weighted / total_weight).round() as u32
    } else {
        0
    };

    MetricScore {
        score,
        score_confidence: Confidence::from_score(score),
        sub_metrics,
        reasoning: String::new(),
    }
}

/// Aggregate metric scores into core, contextual and combined values.
pub fn aggregate(metrics: &BTreeMap<String, MetricScore>) -> ScoreDetails {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (key, weight) in FINAL_SCORE_WEIGHTS {
        if let Some(metric) = metrics.get(*key) {
            weighted += metric.score as f64 * weight;
            total_weight += weight;
        }
    }

    let core = if total_weight > 0.0 {
        (weighted / total_weight).round() as u32
    } else {
        0
    };
    let contextual = metrics.get(CONTEXTUAL_METRIC).map(|m| m.score).unwrap_or(0);
    let combined = (core as f64 * CORE_SHARE + contextual as f64 * CONTEXTUAL_SHARE).round() as u32;

    ScoreDetails {
        core,
        contextual,
        combined,
    }
}

/// Compute the full deterministic result.
///
/// Narrative fields are left empty and `readiness` is carried through
/// unchanged. The Architect output does not influence the arithmetic.
pub fn score(
    _architect: &ArchitectOutput,
    sensor: &SensorOutput,
    readiness: ValidationReadiness,
) -> ValidationResult {
    let metrics: BTreeMap<String, MetricScore> = METRIC_SCHEMA
        .iter()
        .map(|definition| (definition.key.to_string(), score_metric(definition, sensor)))
        .collect();

    let score_details = aggregate(&metrics);

    debug!(
        core = score_details.core,
        contextual = score_details.contextual,
        combined = score_details.combined,
        "Scored validation run"
    );

    ValidationResult {
        final_score: score_details.combined,
        score_details,
        validation_readiness: readiness,
        metrics,
        key_risks: Vec::new(),
        research_gaps: Vec::new(),
        summary: String::new(),
    }
}
