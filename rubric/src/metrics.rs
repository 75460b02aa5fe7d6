//! Static scoring taxonomy.
//!
//! Ten metrics, each split into weighted sub-metrics that declare where their
//! evidence has to come from. Sub-metric weights are normalized at aggregation
//! time, so a table does not need to sum to exactly 1.0.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Where evidence for a sub-metric is expected to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EvidenceSource {
    #[serde(rename = "seller")]
    Seller,
    #[serde(rename = "market")]
    Market,
    #[serde(rename = "seller+market")]
    SellerAndMarket,
}

impl EvidenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceSource::Seller => "seller",
            EvidenceSource::Market => "market",
            EvidenceSource::SellerAndMarket => "seller+market",
        }
    }

    /// Whether external market research is required.
    pub fn includes_market(&self) -> bool {
        self.as_str().contains("market")
    }
}

/// A weighted component of a metric.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubMetricDefinition {
    pub key: &'static str,
    pub weight: f64,
    pub source: EvidenceSource,
    pub description: &'static str,
}

/// A top-level evaluation axis.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub sub_metrics: &'static [SubMetricDefinition],
}

impl MetricDefinition {
    /// Look up a sub-metric by key.
    pub fn sub_metric(&self, key: &str) -> Option<&'static SubMetricDefinition> {
        self.sub_metrics.iter().find(|s| s.key == key)
    }

    /// Sum of all sub-metric weights.
    pub fn total_weight(&self) -> f64 {
        self.sub_metrics.iter().map(|s| s.weight).sum()
    }
}

const fn sub(
    key: &'static str,
    weight: f64,
    source: EvidenceSource,
    description: &'static str,
) -> SubMetricDefinition {
    SubMetricDefinition {
        key,
        weight,
        source,
        description,
    }
}

use EvidenceSource::{Market, Seller, SellerAndMarket};

/// The full metric taxonomy, in presentation order.
pub static METRIC_SCHEMA: &[MetricDefinition] = &[
    MetricDefinition {
        key: "customer_pain",
        label: "Customer Pain",
        description: "How acute and recurring the problem is for the people who have it",
        sub_metrics: &[
            sub("pain_intensity", 0.85, SellerAndMarket, "Severity of the problem when it occurs"),
            sub("frequency", 0.10, Seller, "How often target users hit the problem"),
            sub("willingness_to_pay", 0.05, Seller, "Price point the seller expects customers to accept"),
        ],
    },
    MetricDefinition {
        key: "market_size",
        label: "Market Size",
        description: "Addressable revenue available to the idea",
        sub_metrics: &[
            sub("tam", 0.85, Market, "Total addressable market"),
            sub("sam", 0.10, Seller, "Share of the market the offering can serve"),
            sub("som", 0.05, Seller, "Share the seller plans to capture"),
        ],
    },
    MetricDefinition {
        key: "market_growth_rate",
        label: "Market Growth Rate",
        description: "Whether the market is expanding, flat or shrinking",
        sub_metrics: &[
            sub("cagr", 0.85, Market, "Compound annual growth rate of the segment"),
            sub("demand_trend", 0.15, Seller, "Demand shifts the seller observes first-hand"),
        ],
    },
    MetricDefinition {
        key: "uniqueness",
        label: "Uniqueness",
        description: "How distinct the solution is from what exists",
        sub_metrics: &[
            sub("differentiation", 0.85, SellerAndMarket, "Meaningful difference from alternatives"),
            sub("defensibility", 0.15, Seller, "Moats such as IP, data or network effects"),
        ],
    },
    MetricDefinition {
        key: "technical_feasibility",
        label: "Technical Feasibility",
        description: "Whether the solution can be built with available technology",
        sub_metrics: &[
            sub("technology_readiness", 0.85, SellerAndMarket, "Maturity of the required technology"),
            sub("build_complexity", 0.15, Seller, "Engineering effort and risk to deliver"),
        ],
    },
    MetricDefinition {
        key: "capital_intensity",
        label: "Capital Intensity",
        description: "Money required before the idea sustains itself",
        sub_metrics: &[
            sub("upfront_capital", 0.85, SellerAndMarket, "Capital needed to reach launch"),
            sub("burn_profile", 0.15, Seller, "Ongoing spend until break-even"),
        ],
    },
    MetricDefinition {
        key: "market_saturation",
        label: "Market Saturation",
        description: "Competitive crowding of the target market",
        sub_metrics: &[
            sub("competitor_density", 0.85, Market, "Number and size of direct competitors"),
            sub("incumbent_strength", 0.15, Market, "Entrenchment of current market leaders"),
        ],
    },
    MetricDefinition {
        key: "business_model",
        label: "Business Model",
        description: "How the idea turns usage into profit",
        sub_metrics: &[
            sub("revenue_clarity", 0.85, Seller, "Clarity of who pays, for what, and how"),
            sub("unit_economics", 0.15, SellerAndMarket, "Margin per customer against acquisition cost"),
        ],
    },
    MetricDefinition {
        key: "scalability",
        label: "Scalability",
        description: "Ability to grow without proportional cost growth",
        sub_metrics: &[
            sub("operational_leverage", 0.85, Seller, "Marginal cost of serving one more customer"),
            sub("expansion_reach", 0.15, Market, "Adjacent segments and geographies available"),
        ],
    },
    MetricDefinition {
        key: "social_value",
        label: "Social Value",
        description: "Benefit to society beyond the paying customer",
        sub_metrics: &[
            sub("societal_impact", 0.85, SellerAndMarket, "Positive effect on people and communities"),
            sub("sustainability", 0.15, Seller, "Environmental and long-term footprint"),
        ],
    },
];

/// Weights of the nine core metrics in the core aggregate.
pub static FINAL_SCORE_WEIGHTS: &[(&str, f64)] = &[
    ("customer_pain", 0.15),
    ("market_size", 0.15),
    ("market_growth_rate", 0.10),
    ("uniqueness", 0.12),
    ("technical_feasibility", 0.10),
    ("capital_intensity", 0.08),
    ("market_saturation", 0.10),
    ("business_model", 0.12),
    ("scalability", 0.08),
];

/// Metrics whose missing market evidence blocks readiness.
pub const CRITICAL_METRICS: [&str; 3] = ["market_size", "customer_pain", "market_growth_rate"];

/// The metric aggregated as a modifier rather than a core axis.
pub const CONTEXTUAL_METRIC: &str = "social_value";

/// Look up a metric definition by key.
pub fn metric(key: &str) -> Option<&'static MetricDefinition> {
    METRIC_SCHEMA.iter().find(|m| m.key == key)
}

/// Core aggregation weight for a metric, if it is a core metric.
pub fn final_weight(key: &str) -> Option<f64> {
    FINAL_SCORE_WEIGHTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, w)| *w)
}

/// SHA-256 over the canonical serialization of both tables.
pub fn rubric_fingerprint() -> String {
    let canonical = serde_json::to_string(&(METRIC_SCHEMA, FINAL_SCORE_WEIGHTS)).unwrap_or_default();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_metrics() {
        assert_eq!(METRIC_SCHEMA.len(), 10);
        assert!(metric("market_size").is_some());
        assert!(metric("unknown").is_none());
    }

    #[test]
    fn test_weights_in_range() {
        for m in METRIC_SCHEMA {
            assert!(!m.sub_metrics.is_empty(), "{} has no sub-metrics", m.key);
            for s in m.sub_metrics {
                assert!(s.weight > 0.0 && s.weight <= 1.0, "{}.{}", m.key, s.key);
            }
            assert!((m.total_weight() - 1.0).abs() < 1e-9, "{} weights", m.key);
            assert!(m.sub_metrics[0].weight > 0.5, "{} leading weight", m.key);
        }
    }

    #[test]
    fn test_final_weights_cover_core_metrics() {
        assert_eq!(FINAL_SCORE_WEIGHTS.len(), 9);
        assert!(final_weight(CONTEXTUAL_METRIC).is_none());

        for m in METRIC_SCHEMA.iter().filter(|m| m.key != CONTEXTUAL_METRIC) {
            assert!(final_weight(m.key).is_some(), "{} missing weight", m.key);
        }

        let total: f64 = FINAL_SCORE_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_critical_metrics_are_market_sourced() {
        for key in CRITICAL_METRICS {
            let m = metric(key).unwrap();
            assert!(m.sub_metrics[0].source.includes_market(), "{}", key);
            assert!(
                m.sub_metrics[1..].iter().all(|s| !s.source.includes_market()),
                "{} has trailing market pairs",
                key
            );
        }
    }

    #[test]
    fn test_evidence_source_serialization() {
        let json = serde_json::to_string(&EvidenceSource::SellerAndMarket).unwrap();
        assert_eq!(json, "\"seller+market\"");
        assert!(EvidenceSource::SellerAndMarket.includes_market());
        assert!(!EvidenceSource::Seller.includes_market());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = rubric_fingerprint();
        assert_eq!(a.len(), 64);
        assert_eq!(a, rubric_fingerprint());
    }
}
