//! Pre-scoring evidence gate and post-scoring readiness upgrade.

use std::collections::BTreeMap;
use tracing::{info, warn};

use rubric::{
    ArchitectOutput, Confidence, EpistemicRole, ReadinessTier, ResearchFinding, ScoreDetails,
    SensorOutput, ValidationReadiness, ValidationResult, CRITICAL_METRICS, METRIC_SCHEMA,
};

use crate::config::{GateConfig, ReadinessUpgradePolicy};

/// High-confidence metric count above which a run is "Verified".
const VERIFIED_THRESHOLD: usize = 5;
/// High-confidence metric count above which a run is "Investment Ready".
const INVESTMENT_READY_THRESHOLD: usize = 8;

/// Outcome of the pre-scoring gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    /// Whether scoring should proceed
    pub pass: bool,
    /// Readiness assigned from evidence completeness
    pub readiness: ValidationReadiness,
    /// Every market-sourced `metric.sub_metric` without qualifying evidence
    pub missing: Vec<String>,
}

/// Whether a finding counts as evidence for the gate.
///
/// A null finding never qualifies, nor does a low-confidence measurement.
fn qualifies(finding: &ResearchFinding) -> bool {
    finding.has_value()
        && !(finding.confidence == Confidence::Low
            && finding.epistemic_role == EpistemicRole::Measurement)
}

/// Check evidence completeness before scoring.
pub fn evaluate(
    _architect: &ArchitectOutput,
    sensor: &SensorOutput,
    config: &GateConfig,
) -> GateOutcome {
    let mut missing = Vec::new();
    let mut critical = Vec::new();

    for definition in METRIC_SCHEMA {
        for sub in definition.sub_metrics {
            if !sub.source.includes_market() {
                continue;
            }
            let satisfied = sensor
                .find(definition.key, sub.key)
                .map(qualifies)
                .unwrap_or(false);
            if satisfied {
                continue;
            }

            let key = format!("{}.{}", definition.key, sub.key);
            if CRITICAL_METRICS.contains(&definition.key) {
                critical.push(key.clone());
            }
            missing.push(key);
        }
    }

    let readiness = if !critical.is_empty() {
        let gaps = critical
            .iter()
            .map(|key| format!("Critical evidence gap: {}", key))
            .collect();
        warn!(missing = critical.len(), "Critical market evidence missing");
        ValidationReadiness::new(ReadinessTier::InsufficientEvidence, gaps)
    } else if missing.len() > config.low_density_threshold {
        let gap = format!(
            "{} market sub-metrics lack qualifying evidence: {}",
            missing.len(),
            missing.join(", ")
        );
        ValidationReadiness::new(ReadinessTier::LowDataDensity, vec![gap])
    } else {
        ValidationReadiness::new(ReadinessTier::ReadyForScoring, Vec::new())
    };

    let pass = !(config.halt_on_insufficient_evidence
        && readiness.level == ReadinessTier::InsufficientEvidence.level());

    info!(
        level = readiness.level,
        label = %readiness.label,
        missing = missing.len(),
        pass,
        "Gate evaluated"
    );

    GateOutcome {
        pass,
        readiness,
        missing,
    }
}

/// Zero-score result returned when the gate halts a run.
pub fn halted_result(readiness: ValidationReadiness) -> ValidationResult {
    let research_gaps = readiness
        .blocking_gaps
        .iter()
        .map(|gap| format!("Research required before scoring: {}", gap))
        .collect();

    ValidationResult {
        final_score: 0,
        score_details: ScoreDetails::default(),
        key_risks: vec![format!(
            "Validation halted at the evidence gate: {} ({} blocking gaps)",
            readiness.label,
            readiness.blocking_gaps.len()
        )],
        research_gaps,
        validation_readiness: readiness,
        metrics: BTreeMap::new(),
        summary: String::new(),
    }
}

/// Upgrade readiness from the number of high-confidence metrics.
///
/// Never downgrades. Under [`ReadinessUpgradePolicy::PreserveBlockingGaps`]
/// a readiness carrying blocking gaps is left as is.
pub fn upgrade_readiness(
    current: &ValidationReadiness,
    result: &ValidationResult,
    policy: ReadinessUpgradePolicy,
) -> ValidationReadiness {
    if policy == ReadinessUpgradePolicy::PreserveBlockingGaps && current.has_blocking_gaps() {
        return current.clone();
    }

    let high = result.high_confidence_metrics();
    let tier = if high > INVESTMENT_READY_THRESHOLD {
        ReadinessTier::InvestmentReady
    } else if high > VERIFIED_THRESHOLD {
        ReadinessTier::Verified
    } else {
        return current.clone();
    };

    if tier.level() <= current.level {
        return current.clone();
    }

    info!(from = current.level, to = tier.level(), high_confidence = high, "Readiness upgraded");
    ValidationReadiness::new(tier, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rubric::{MetricScore, ResearchType};

    fn finding(metric: &str, sub: &str, confidence: Confidence, role: EpistemicRole) -> ResearchFinding {
        ResearchFinding {
            metric: metric.to_string(),
            sub_metric: sub.to_string(),
            finding: Some("observed".to_string()),
            source: Some("survey".to_string()),
            confidence,
            research_type: ResearchType::Quantitative,
            epistemic_role: role,
            decision_dependency: None,
            evidence_value: None,
        }
    }

    /// Findings for every market-sourced sub-metric, except those listed.
    fn market_sensor(except: &[&str]) -> SensorOutput {
        let mut results = Vec::new();
        for m in METRIC_SCHEMA {
            for s in m.sub_metrics {
                let key = format!("{}.{}", m.key, s.key);
                if s.source.includes_market() && !except.contains(&key.as_str()) {
                    results.push(finding(m.key, s.key, Confidence::Medium, EpistemicRole::Measurement));
                }
            }
        }
        SensorOutput {
            research_results: results,
        }
    }

    fn result_with_high(count: usize) -> ValidationResult {
        let metrics = METRIC_SCHEMA
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let confidence = if i < count { Confidence::High } else { Confidence::Medium };
                (
                    m.key.to_string(),
                    MetricScore {
                        score: 50,
                        score_confidence: confidence,
                        sub_metrics: BTreeMap::new(),
                        reasoning: String::new(),
                    },
                )
            })
            .collect();

        ValidationResult {
            final_score: 50,
            score_details: ScoreDetails::default(),
            validation_readiness: ValidationReadiness::pending(),
            metrics,
            key_risks: Vec::new(),
            research_gaps: Vec::new(),
            summary: String::new(),
        }
    }

    #[test]
    fn test_complete_evidence_is_ready() {
        let outcome = evaluate(&ArchitectOutput::default(), &market_sensor(&[]), &GateConfig::default());
        assert!(outcome.pass);
        assert_eq!(outcome.readiness.level, 3);
        assert_eq!(outcome.readiness.label, "Ready for Scoring");
        assert!(outcome.missing.is_empty());
    }

    #[test]
    fn test_leading_sub_metric_evidence_is_ready() {
        let sensor = SensorOutput {
            research_results: METRIC_SCHEMA
                .iter()
                .map(|m| finding(m.key, m.sub_metrics[0].key, Confidence::High, EpistemicRole::Measurement))
                .collect(),
        };
        let outcome = evaluate(&ArchitectOutput::default(), &sensor, &GateConfig::default());

        assert_eq!(outcome.readiness.level, 3);
        assert_eq!(
            outcome.missing,
            vec![
                "market_saturation.incumbent_strength".to_string(),
                "business_model.unit_economics".to_string(),
                "scalability.expansion_reach".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_critical_evidence() {
        let sensor = market_sensor(&["market_size.tam"]);
        let outcome = evaluate(&ArchitectOutput::default(), &sensor, &GateConfig::default());

        assert!(outcome.pass);
        assert_eq!(outcome.readiness.level, 1);
        assert_eq!(outcome.readiness.label, "Insufficient Evidence");
        assert_eq!(
            outcome.readiness.blocking_gaps,
            vec!["Critical evidence gap: market_size.tam".to_string()]
        );
    }

    #[test]
    fn test_low_confidence_measurement_does_not_qualify() {
        let mut sensor = market_sensor(&["customer_pain.pain_intensity"]);
        sensor.research_results.push(finding(
            "customer_pain",
            "pain_intensity",
            Confidence::Low,
            EpistemicRole::Measurement,
        ));
        let outcome = evaluate(&ArchitectOutput::default(), &sensor, &GateConfig::default());
        assert_eq!(outcome.readiness.level, 1);

        // Low-confidence validation evidence still counts
        let mut sensor = market_sensor(&["customer_pain.pain_intensity"]);
        sensor.research_results.push(finding(
            "customer_pain",
            "pain_intensity",
            Confidence::Low,
            EpistemicRole::Validation,
        ));
        let outcome = evaluate(&ArchitectOutput::default(), &sensor, &GateConfig::default());
        assert_eq!(outcome.readiness.level, 3);
    }

    #[test]
    fn test_low_data_density() {
        let sensor = market_sensor(&[
            "uniqueness.differentiation",
            "technical_feasibility.technology_readiness",
            "capital_intensity.upfront_capital",
            "market_saturation.competitor_density",
            "market_saturation.incumbent_strength",
            "scalability.expansion_reach",
        ]);
        let outcome = evaluate(&ArchitectOutput::default(), &sensor, &GateConfig::default());

        assert_eq!(outcome.readiness.level, 2);
        assert_eq!(outcome.readiness.label, "Low Data Density");
        assert_eq!(outcome.readiness.blocking_gaps.len(), 1);
        assert_eq!(outcome.missing.len(), 6);

        // Exactly at the threshold is still ready
        let sensor = market_sensor(&[
            "uniqueness.differentiation",
            "technical_feasibility.technology_readiness",
            "capital_intensity.upfront_capital",
            "market_saturation.competitor_density",
            "market_saturation.incumbent_strength",
        ]);
        let outcome = evaluate(&ArchitectOutput::default(), &sensor, &GateConfig::default());
        assert_eq!(outcome.readiness.level, 3);
    }

    #[test]
    fn test_halt_on_insufficient_evidence() {
        let config = GateConfig {
            halt_on_insufficient_evidence: true,
            ..GateConfig::default()
        };
        let outcome = evaluate(&ArchitectOutput::default(), &SensorOutput::default(), &config);
        assert!(!outcome.pass);
        assert_eq!(outcome.readiness.level, 1);

        let result = halted_result(outcome.readiness.clone());
        assert_eq!(result.final_score, 0);
        assert_eq!(result.research_gaps.len(), outcome.readiness.blocking_gaps.len());
        assert!(result.key_risks[0].contains("Insufficient Evidence"));
    }

    #[test]
    fn test_upgrade_thresholds() {
        let ready = ValidationReadiness::new(ReadinessTier::ReadyForScoring, Vec::new());
        let policy = ReadinessUpgradePolicy::PreserveBlockingGaps;

        assert_eq!(upgrade_readiness(&ready, &result_with_high(5), policy).level, 3);
        assert_eq!(upgrade_readiness(&ready, &result_with_high(6), policy).level, 4);
        assert_eq!(upgrade_readiness(&ready, &result_with_high(8), policy).label, "Verified");
        assert_eq!(upgrade_readiness(&ready, &result_with_high(9), policy).level, 5);
    }

    #[test]
    fn test_upgrade_never_downgrades() {
        let top = ValidationReadiness::new(ReadinessTier::InvestmentReady, Vec::new());
        let upgraded = upgrade_readiness(&top, &result_with_high(6), ReadinessUpgradePolicy::Overwrite);
        assert_eq!(upgraded.level, 5);
    }

    #[test]
    fn test_upgrade_policies_with_blocking_gaps() {
        let blocked = ValidationReadiness::new(
            ReadinessTier::InsufficientEvidence,
            vec!["Critical evidence gap: market_size.tam".to_string()],
        );
        let result = result_with_high(9);

        let preserved = upgrade_readiness(&blocked, &result, ReadinessUpgradePolicy::PreserveBlockingGaps);
        assert_eq!(preserved, blocked);

        let overwritten = upgrade_readiness(&blocked, &result, ReadinessUpgradePolicy::Overwrite);
        assert_eq!(overwritten.level, 5);
        assert!(overwritten.blocking_gaps.is_empty());
    }
}
