//! Data model shared by every stage of the validation pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::metrics::METRIC_SCHEMA;

// ========== Idea input ==========

/// Seller-provided, normalized form data describing one idea.
///
/// Immutable input to a validation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct IdeaInput {
    /// Listing title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Primary category
    #[serde(default)]
    pub category: String,
    /// Optional secondary category
    #[serde(default)]
    pub secondary_category: Option<String>,
    /// Structured pain-point fields
    #[serde(default)]
    pub pain_points: PainPoints,
    /// How the problem is solved today
    #[serde(default)]
    pub current_solution: CurrentSolution,
    /// Monetization text
    #[serde(default)]
    pub monetization: String,
    /// Asking price for the idea
    #[serde(default)]
    pub price: Option<f64>,
    /// Text extracted from an attached document
    #[serde(default)]
    pub document_content: Option<String>,
}

impl IdeaInput {
    /// Create an input with a title and description.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Set the primary category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the monetization text.
    pub fn with_monetization(mut self, monetization: impl Into<String>) -> Self {
        self.monetization = monetization.into();
        self
    }

    /// Attach extracted document text.
    pub fn with_document(mut self, content: impl Into<String>) -> Self {
        self.document_content = Some(content.into());
        self
    }
}

/// Structured description of the customer problem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct PainPoints {
    #[serde(default)]
    pub problem_statement: String,
    #[serde(default)]
    pub who_experiences: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub severity: String,
}

/// How customers cope with the problem today.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CurrentSolution {
    #[serde(default)]
    pub existing_alternatives: String,
    #[serde(default)]
    pub shortcomings: String,
}

// ========== Enumerations ==========

/// Kind of research a plan item calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ResearchType {
    Quantitative,
    Qualitative,
    Landscape,
}

impl ResearchType {
    pub const ALL: [&'static str; 3] = ["quantitative", "qualitative", "landscape"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchType::Quantitative => "quantitative",
            ResearchType::Qualitative => "qualitative",
            ResearchType::Landscape => "landscape",
        }
    }
}

/// How strongly a finding may influence a score.
///
/// Ordered from strongest to weakest: measurement > validation > context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum EpistemicRole {
    Measurement,
    Validation,
    Context,
}

impl EpistemicRole {
    pub const ALL: [&'static str; 3] = ["measurement", "validation", "context"];

    pub fn as_str(&self) -> &'static str {
        match self {
            EpistemicRole::Measurement => "measurement",
            EpistemicRole::Validation => "validation",
            EpistemicRole::Context => "context",
        }
    }

    /// Highest raw score a finding with this role may contribute.
    pub fn score_cap(&self) -> u32 {
        match self {
            EpistemicRole::Measurement => 100,
            EpistemicRole::Validation => 75,
            EpistemicRole::Context => 60,
        }
    }
}

/// Research priority assigned by the Architect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [&'static str; 3] = ["high", "medium", "low"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Confidence level, used both for findings and for computed metric scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub const ALL: [&'static str; 3] = ["low", "medium", "high"];

    /// Derive score confidence from a 0-100 metric score.
    pub fn from_score(score: u32) -> Self {
        if score > 70 {
            Confidence::High
        } else if score > 40 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

// ========== Architect output ==========

/// Five-field summary of the concept produced by the Architect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedIdea {
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub target_customer: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub business_model: String,
    #[serde(default)]
    pub differentiation: String,
}

/// Assertions the idea depends on, partitioned by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub physics: Vec<String>,
    #[serde(default)]
    pub market: Vec<String>,
    #[serde(default)]
    pub operational: Vec<String>,
}

/// One question the Sensor must research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchPlanItem {
    pub metric: String,
    pub sub_metric: String,
    pub question: String,
    /// How the answer changes scoring
    #[serde(default)]
    pub decision_dependency: String,
    #[serde(default)]
    pub data_required: String,
    pub research_type: ResearchType,
    pub epistemic_role: EpistemicRole,
    #[serde(default)]
    pub priority: Priority,
}

/// A market-sourced sub-metric the Architect declared impossible to research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresearchableItem {
    pub metric: String,
    pub sub_metric: String,
    #[serde(default)]
    pub reason: String,
}

/// Output of the Architect stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchitectOutput {
    pub normalized_idea: NormalizedIdea,
    pub claims: Claims,
    pub research_plan: Vec<ResearchPlanItem>,
    #[serde(default)]
    pub unresearchable: Vec<UnresearchableItem>,
}

impl ArchitectOutput {
    /// Market-sourced (metric, sub_metric) pairs neither planned nor marked unresearchable.
    pub fn uncovered_market_pairs(&self) -> Vec<String> {
        let covered = |metric: &str, sub: &str| {
            self.research_plan
                .iter()
                .any(|i| i.metric == metric && i.sub_metric == sub)
                || self
                    .unresearchable
                    .iter()
                    .any(|u| u.metric == metric && u.sub_metric == sub)
        };

        METRIC_SCHEMA
            .iter()
            .flat_map(|m| m.sub_metrics.iter().map(move |s| (m.key, s)))
            .filter(|(_, s)| s.source.includes_market())
            .filter(|(metric, s)| !covered(metric, s.key))
            .map(|(metric, s)| format!("{}.{}", metric, s.key))
            .collect()
    }
}

// ========== Sensor output ==========

/// One piece of evidence returned by the Sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchFinding {
    pub metric: String,
    pub sub_metric: String,
    /// The claimed fact, or null when nothing verifiable was found
    #[serde(default)]
    pub finding: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub confidence: Confidence,
    pub research_type: ResearchType,
    pub epistemic_role: EpistemicRole,
    #[serde(default)]
    pub decision_dependency: Option<String>,
    #[serde(default)]
    pub evidence_value: Option<serde_json::Value>,
}

impl ResearchFinding {
    /// Whether a non-null finding was reported.
    pub fn has_value(&self) -> bool {
        self.finding.is_some()
    }
}

/// Output of the Sensor stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorOutput {
    pub research_results: Vec<ResearchFinding>,
}

impl SensorOutput {
    /// First finding with an exact (metric, sub_metric) match.
    pub fn find(&self, metric: &str, sub_metric: &str) -> Option<&ResearchFinding> {
        self.research_results
            .iter()
            .find(|f| f.metric == metric && f.sub_metric == sub_metric)
    }

    /// Force `confidence = low` on every finding without a value.
    ///
    /// Returns the keys of the findings that were corrected.
    pub fn enforce_no_speculation(&mut self) -> Vec<String> {
        let mut corrected = Vec::new();
        for finding in &mut self.research_results {
            if finding.finding.is_none() && finding.confidence != Confidence::Low {
                finding.confidence = Confidence::Low;
                corrected.push(format!("{}.{}", finding.metric, finding.sub_metric));
            }
        }
        corrected
    }
}

// ========== Scores and result ==========

/// Score for a single sub-metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SubMetricScore {
    pub score: u32,
    /// True when no qualifying finding backed the score
    pub inference: bool,
}

/// Computed result for one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MetricScore {
    pub score: u32,
    pub score_confidence: Confidence,
    pub sub_metrics: BTreeMap<String, SubMetricScore>,
    /// Filled by the narrative stage
    #[serde(default)]
    pub reasoning: String,
}

/// Breakdown of the final score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ScoreDetails {
    pub core: u32,
    pub contextual: u32,
    pub combined: u32,
}

/// Evidence-completeness tier of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadinessTier {
    InsufficientEvidence,
    LowDataDensity,
    ReadyForScoring,
    Verified,
    InvestmentReady,
}

impl ReadinessTier {
    pub fn level(&self) -> u8 {
        match self {
            ReadinessTier::InsufficientEvidence => 1,
            ReadinessTier::LowDataDensity => 2,
            ReadinessTier::ReadyForScoring => 3,
            ReadinessTier::Verified => 4,
            ReadinessTier::InvestmentReady => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadinessTier::InsufficientEvidence => "Insufficient Evidence",
            ReadinessTier::LowDataDensity => "Low Data Density",
            ReadinessTier::ReadyForScoring => "Ready for Scoring",
            ReadinessTier::Verified => "Verified",
            ReadinessTier::InvestmentReady => "Investment Ready",
        }
    }
}

/// Readiness as reported in a [`ValidationResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ValidationReadiness {
    pub level: u8,
    pub label: String,
    #[serde(default)]
    pub blocking_gaps: Vec<String>,
}

impl ValidationReadiness {
    pub fn new(tier: ReadinessTier, blocking_gaps: Vec<String>) -> Self {
        Self {
            level: tier.level(),
            label: tier.label().to_string(),
            blocking_gaps,
        }
    }

    /// Placeholder used before the gate has run.
    pub fn pending() -> Self {
        Self {
            level: 0,
            label: "Pending".to_string(),
            blocking_gaps: Vec::new(),
        }
    }

    pub fn has_blocking_gaps(&self) -> bool {
        !self.blocking_gaps.is_empty()
    }
}

impl Default for ValidationReadiness {
    fn default() -> Self {
        Self::pending()
    }
}

/// Terminal artifact of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ValidationResult {
    pub final_score: u32,
    pub score_details: ScoreDetails,
    pub validation_readiness: ValidationReadiness,
    pub metrics: BTreeMap<String, MetricScore>,
    pub key_risks: Vec<String>,
    pub research_gaps: Vec<String>,
    pub summary: String,
}

impl ValidationResult {
    /// Number of metrics whose score confidence is high.
    pub fn high_confidence_metrics(&self) -> usize {
        self.metrics
            .values()
            .filter(|m| m.score_confidence == Confidence::High)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(metric: &str, sub: &str, value: Option<&str>, confidence: Confidence) -> ResearchFinding {
        ResearchFinding {
            metric: metric.to_string(),
            sub_metric: sub.to_string(),
            finding: value.map(String::from),
            source: None,
            confidence,
            research_type: ResearchType::Quantitative,
            epistemic_role: EpistemicRole::Measurement,
            decision_dependency: None,
            evidence_value: None,
        }
    }

    #[test]
    fn test_confidence_from_score() {
        assert_eq!(Confidence::from_score(71), Confidence::High);
        assert_eq!(Confidence::from_score(70), Confidence::Medium);
        assert_eq!(Confidence::from_score(41), Confidence::Medium);
        assert_eq!(Confidence::from_score(40), Confidence::Low);
        assert_eq!(Confidence::from_score(0), Confidence::Low);
    }

    #[test]
    fn test_enforce_no_speculation() {
        let mut sensor = SensorOutput {
            research_results: vec![
                finding("market_size", "tam", None, Confidence::High),
                finding("market_size", "sam", Some("$2B"), Confidence::High),
                finding("market_size", "som", None, Confidence::Low),
            ],
        };

        let corrected = sensor.enforce_no_speculation();
        assert_eq!(corrected, vec!["market_size.tam".to_string()]);
        assert_eq!(sensor.research_results[0].confidence, Confidence::Low);
        assert_eq!(sensor.research_results[1].confidence, Confidence::High);
    }

    #[test]
    fn test_finding_deserializes_null_fields() {
        let json = r#"{
            "metric": "market_size",
            "sub_metric": "tam",
            "finding": null,
            "source": null,
            "confidence": "low",
            "research_type": "quantitative",
            "epistemic_role": "measurement"
        }"#;

        let parsed: ResearchFinding = serde_json::from_str(json).unwrap();
        assert!(!parsed.has_value());
        assert!(parsed.evidence_value.is_none());
    }

    #[test]
    fn test_uncovered_market_pairs() {
        let architect = ArchitectOutput {
            research_plan: vec![ResearchPlanItem {
                metric: "market_size".to_string(),
                sub_metric: "tam".to_string(),
                question: "How large is the market?".to_string(),
                decision_dependency: String::new(),
                data_required: String::new(),
                research_type: ResearchType::Quantitative,
                epistemic_role: EpistemicRole::Measurement,
                priority: Priority::High,
            }],
            unresearchable: vec![UnresearchableItem {
                metric: "market_saturation".to_string(),
                sub_metric: "incumbent_strength".to_string(),
                reason: "No public share data".to_string(),
            }],
            ..Default::default()
        };

        let uncovered = architect.uncovered_market_pairs();
        assert!(!uncovered.contains(&"market_size.tam".to_string()));
        assert!(!uncovered.contains(&"market_saturation.incumbent_strength".to_string()));
        assert!(uncovered.contains(&"market_growth_rate.cagr".to_string()));
        // Seller-only sub-metrics never need research
        assert!(!uncovered.contains(&"market_size.sam".to_string()));
        assert!(!uncovered.contains(&"uniqueness.defensibility".to_string()));
    }

    #[test]
    fn test_readiness_tiers() {
        let readiness = ValidationReadiness::new(ReadinessTier::LowDataDensity, vec![]);
        assert_eq!(readiness.level, 2);
        assert_eq!(readiness.label, "Low Data Density");
        assert!(!readiness.has_blocking_gaps());
        assert_eq!(ValidationReadiness::default().level, 0);
    }
}
