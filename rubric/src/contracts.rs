//! Response contracts for the three model-backed stages.

use crate::metrics::METRIC_SCHEMA;
use crate::schema::SchemaNode;
use crate::types::{Confidence, EpistemicRole, Priority, ResearchType};

/// Schema for the Architect stage response.
pub fn architect_schema() -> SchemaNode {
    let normalized_idea = SchemaNode::object()
        .require([
            "problem",
            "target_customer",
            "solution",
            "business_model",
            "differentiation",
        ])
        .property("problem", SchemaNode::string())
        .property("target_customer", SchemaNode::string())
        .property("solution", SchemaNode::string())
        .property("business_model", SchemaNode::string())
        .property("differentiation", SchemaNode::string());

    let claims = SchemaNode::object()
        .require(["physics", "market", "operational"])
        .property("physics", SchemaNode::array(SchemaNode::string()))
        .property("market", SchemaNode::array(SchemaNode::string()))
        .property("operational", SchemaNode::array(SchemaNode::string()));

    let plan_item = SchemaNode::object()
        .require(["metric", "sub_metric", "question", "research_type", "epistemic_role"])
        .property("metric", SchemaNode::string())
        .property("sub_metric", SchemaNode::string())
        .property("question", SchemaNode::string())
        .property("decision_dependency", SchemaNode::string())
        .property("data_required", SchemaNode::string())
        .property("research_type", SchemaNode::string().one_of(ResearchType::ALL))
        .property("epistemic_role", SchemaNode::string().one_of(EpistemicRole::ALL))
        .property("priority", SchemaNode::string().one_of(Priority::ALL));

    let unresearchable = SchemaNode::object()
        .require(["metric", "sub_metric"])
        .property("metric", SchemaNode::string())
        .property("sub_metric", SchemaNode::string())
        .property("reason", SchemaNode::string());

    SchemaNode::object()
        .require(["normalized_idea", "claims", "research_plan"])
        .property("normalized_idea", normalized_idea)
        .property("claims", claims)
        .property("research_plan", SchemaNode::array(plan_item))
        .property("unresearchable", SchemaNode::array(unresearchable))
}

/// Schema for the Sensor stage response.
pub fn sensor_schema() -> SchemaNode {
    let finding = SchemaNode::object()
        .require([
            "metric",
            "sub_metric",
            "source",
            "confidence",
            "research_type",
            "epistemic_role",
        ])
        .property("metric", SchemaNode::string())
        .property("sub_metric", SchemaNode::string())
        .property("finding", SchemaNode::string().nullable())
        .property("source", SchemaNode::string().nullable())
        .property("confidence", SchemaNode::string().one_of(Confidence::ALL))
        .property("research_type", SchemaNode::string().one_of(ResearchType::ALL))
        .property("epistemic_role", SchemaNode::string().one_of(EpistemicRole::ALL))
        .property("decision_dependency", SchemaNode::string().nullable())
        .property("evidence_value", SchemaNode::any());

    SchemaNode::object()
        .require(["research_results"])
        .property("research_results", SchemaNode::array(finding))
}

/// Schema for the Calculator narrative response.
///
/// Only advisory: the pipeline merges whatever fields are usable.
pub fn calculator_schema() -> SchemaNode {
    let reasoning = METRIC_SCHEMA.iter().fold(SchemaNode::object(), |node, m| {
        node.property(m.key, SchemaNode::string())
    });

    SchemaNode::object()
        .require(["summary", "key_risks", "research_gaps", "metric_reasoning"])
        .property("summary", SchemaNode::string())
        .property("key_risks", SchemaNode::array(SchemaNode::string()))
        .property("research_gaps", SchemaNode::array(SchemaNode::string()))
        .property("metric_reasoning", reasoning)
}
