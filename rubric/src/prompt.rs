//! Prompt assembly for the model-backed stages.
//!
//! Each prompt embeds the data the stage needs and the exact JSON shape it
//! must return. The Calculator prompt carries already-computed scores and
//! asks only for prose.

use crate::metrics::METRIC_SCHEMA;
use crate::types::{ArchitectOutput, IdeaInput, ValidationResult};

/// Maximum characters of attached document text embedded in a prompt.
const MAX_DOCUMENT_CHARS: usize = 12_000;

/// Assembles stage prompts.
pub struct PromptAssembler;

impl PromptAssembler {
    /// Build the Architect prompt: normalize the idea and plan research.
    pub fn build_architect_prompt(idea: &IdeaInput) -> String {
        let mut prompt = String::new();

        prompt.push_str("# ROLE: ARCHITECT\n\n");
        prompt.push_str("You normalize a business idea into structured claims and design the research\n");
        prompt.push_str("needed to score it. You do not score the idea and you do not research it.\n\n");

        prompt.push_str("## IDEA\n\n");
        prompt.push_str(&Self::render_idea(idea));

        prompt.push_str("\n## METRIC SCHEMA\n\n");
        prompt.push_str("Every sub-metric below is scored later from evidence. Sources:\n");
        prompt.push_str("- `seller`: answered from the seller's own material\n");
        prompt.push_str("- `market`: requires external research\n");
        prompt.push_str("- `seller+market`: seller claims that must be checked against the market\n\n");
        prompt.push_str(&Self::render_metric_schema());

        prompt.push_str("\n## INSTRUCTIONS\n\n");
        prompt.push_str("1. Summarize the idea in the five `normalized_idea` fields.\n");
        prompt.push_str("2. Split the idea's assertions into physics (what must be physically or\n");
        prompt.push_str("   technically true), market (what customers and competitors must do) and\n");
        prompt.push_str("   operational (what the team must execute) claims.\n");
        prompt.push_str("3. Add one research_plan item for EVERY sub-metric whose source includes\n");
        prompt.push_str("   `market`. If a sub-metric cannot be researched, list it under\n");
        prompt.push_str("   `unresearchable` with a reason instead.\n");
        prompt.push_str("4. For each item state how the answer changes the score in `decision_dependency`.\n");
        prompt.push_str("5. `epistemic_role` is `measurement` for direct numbers, `validation` for\n");
        prompt.push_str("   corroborating signals and `context` for background.\n");

        prompt.push_str("\n## REQUIRED RESPONSE FORMAT\n\n");
        prompt.push_str("Respond with ONLY this JSON object:\n\n");
        prompt.push_str("```json\n");
        prompt.push_str("{\n");
        prompt.push_str("  \"normalized_idea\": {\n");
        prompt.push_str("    \"problem\": \"<problem>\",\n");
        prompt.push_str("    \"target_customer\": \"<who>\",\n");
        prompt.push_str("    \"solution\": \"<what>\",\n");
        prompt.push_str("    \"business_model\": \"<how it earns>\",\n");
        prompt.push_str("    \"differentiation\": \"<why it is different>\"\n");
        prompt.push_str("  },\n");
        prompt.push_str("  \"claims\": {\"physics\": [\"...\"], \"market\": [\"...\"], \"operational\": [\"...\"]},\n");
        prompt.push_str("  \"research_plan\": [\n");
        prompt.push_str("    {\n");
        prompt.push_str("      \"metric\": \"<metric key>\",\n");
        prompt.push_str("      \"sub_metric\": \"<sub-metric key>\",\n");
        prompt.push_str("      \"question\": \"<what to find out>\",\n");
        prompt.push_str("      \"decision_dependency\": \"<how the answer changes scoring>\",\n");
        prompt.push_str("      \"data_required\": \"<data that answers it>\",\n");
        prompt.push_str("      \"research_type\": \"quantitative|qualitative|landscape\",\n");
        prompt.push_str("      \"epistemic_role\": \"measurement|validation|context\",\n");
        prompt.push_str("      \"priority\": \"high|medium|low\"\n");
        prompt.push_str("    }\n");
        prompt.push_str("  ],\n");
        prompt.push_str("  \"unresearchable\": [{\"metric\": \"...\", \"sub_metric\": \"...\", \"reason\": \"...\"}]\n");
        prompt.push_str("}\n");
        prompt.push_str("```\n");

        prompt
    }

    /// Build the Sensor prompt: answer the research plan with evidence only.
    pub fn build_sensor_prompt(architect: &ArchitectOutput) -> String {
        let mut prompt = String::new();

        prompt.push_str("# ROLE: SENSOR\n\n");
        prompt.push_str("You are a fact-finding agent. Answer each research question with verifiable\n");
        prompt.push_str("evidence and cite where it comes from.\n\n");

        prompt.push_str("## NORMALIZED IDEA\n\n");
        let idea = &architect.normalized_idea;
        prompt.push_str(&format!("- Problem: {}\n", idea.problem));
        prompt.push_str(&format!("- Target customer: {}\n", idea.target_customer));
        prompt.push_str(&format!("- Solution: {}\n", idea.solution));
        prompt.push_str(&format!("- Business model: {}\n", idea.business_model));
        prompt.push_str(&format!("- Differentiation: {}\n", idea.differentiation));

        prompt.push_str("\n## RESEARCH PLAN\n\n");
        for (i, item) in architect.research_plan.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. [{}.{}] ({}, {}, priority {}) {}\n",
                i + 1,
                item.metric,
                item.sub_metric,
                item.research_type.as_str(),
                item.epistemic_role.as_str(),
                item.priority.as_str(),
                item.question
            ));
            if !item.data_required.is_empty() {
                prompt.push_str(&format!("   Data required: {}\n", item.data_required));
            }
            if !item.decision_dependency.is_empty() {
                prompt.push_str(&format!("   Decision dependency: {}\n", item.decision_dependency));
            }
        }

        prompt.push_str("\n## RULES\n\n");
        prompt.push_str("- Return one result per research plan item, echoing its metric, sub_metric,\n");
        prompt.push_str("  research_type and epistemic_role.\n");
        prompt.push_str("- If you cannot find verifiable evidence, return `\"finding\": null` and\n");
        prompt.push_str("  `\"confidence\": \"low\"`. Never estimate or invent a value.\n");
        prompt.push_str("- `confidence` is `high` only for sourced, recent, directly relevant data.\n");

        prompt.push_str("\n## REQUIRED RESPONSE FORMAT\n\n");
        prompt.push_str("Respond with ONLY this JSON object:\n\n");
        prompt.push_str("```json\n");
        prompt.push_str("{\n");
        prompt.push_str("  \"research_results\": [\n");
        prompt.push_str("    {\n");
        prompt.push_str("      \"metric\": \"<metric key>\",\n");
        prompt.push_str("      \"sub_metric\": \"<sub-metric key>\",\n");
        prompt.push_str("      \"finding\": \"<fact>\" or null,\n");
        prompt.push_str("      \"source\": \"<citation>\" or null,\n");
        prompt.push_str("      \"confidence\": \"low|medium|high\",\n");
        prompt.push_str("      \"research_type\": \"quantitative|qualitative|landscape\",\n");
        prompt.push_str("      \"epistemic_role\": \"measurement|validation|context\",\n");
        prompt.push_str("      \"decision_dependency\": \"<optional>\",\n");
        prompt.push_str("      \"evidence_value\": <optional number or string>\n");
        prompt.push_str("    }\n");
        prompt.push_str("  ]\n");
        prompt.push_str("}\n");
        prompt.push_str("```\n");

        prompt
    }

    /// Build the Calculator prompt: explain precomputed scores in prose.
    pub fn build_calculator_prompt(idea: &IdeaInput, result: &ValidationResult) -> String {
        let mut prompt = String::new();

        prompt.push_str("# ROLE: CALCULATOR (NARRATIVE)\n\n");
        prompt.push_str("The scores below were computed deterministically from evidence.\n");
        prompt.push_str("DO NOT recompute, adjust or question any number. Write only the prose\n");
        prompt.push_str("that explains them.\n\n");

        prompt.push_str("## IDEA\n\n");
        prompt.push_str(&Self::render_idea(idea));

        prompt.push_str("\n## COMPUTED SCORES\n\n");
        prompt.push_str(&format!("Final score: {}/100\n", result.final_score));
        prompt.push_str(&format!(
            "Core: {}, Contextual: {}, Combined: {}\n",
            result.score_details.core, result.score_details.contextual, result.score_details.combined
        ));
        prompt.push_str(&format!(
            "Readiness: level {} ({})\n\n",
            result.validation_readiness.level, result.validation_readiness.label
        ));

        for (key, metric) in &result.metrics {
            prompt.push_str(&format!(
                "- {}: {} ({} confidence)",
                key,
                metric.score,
                metric.score_confidence.as_str()
            ));
            let inferred: Vec<&str> = metric
                .sub_metrics
                .iter()
                .filter(|(_, s)| s.inference)
                .map(|(k, _)| k.as_str())
                .collect();
            if !inferred.is_empty() {
                prompt.push_str(&format!(" - inferred without evidence: {}", inferred.join(", ")));
            }
            prompt.push('\n');
        }

        if !result.validation_readiness.blocking_gaps.is_empty() {
            prompt.push_str("\nBlocking evidence gaps:\n");
            for gap in &result.validation_readiness.blocking_gaps {
                prompt.push_str(&format!("- {}\n", gap));
            }
        }

        prompt.push_str("\n## REQUIRED RESPONSE FORMAT\n\n");
        prompt.push_str("Respond with ONLY this JSON object:\n\n");
        prompt.push_str("```json\n");
        prompt.push_str("{\n");
        prompt.push_str("  \"summary\": \"<2-4 sentence assessment>\",\n");
        prompt.push_str("  \"key_risks\": [\"<risk>\"],\n");
        prompt.push_str("  \"research_gaps\": [\"<what evidence is still missing>\"],\n");
        prompt.push_str("  \"metric_reasoning\": {\"<metric key>\": \"<why this score>\"}\n");
        prompt.push_str("}\n");
        prompt.push_str("```\n");

        prompt
    }

    /// Render the seller's idea as a markdown block.
    pub fn render_idea(idea: &IdeaInput) -> String {
        let mut out = String::new();

        out.push_str(&format!("**Title**: {}\n", idea.title));
        out.push_str(&format!("**Description**: {}\n", idea.description));
        if !idea.category.is_empty() {
            out.push_str(&format!("**Category**: {}", idea.category));
            if let Some(secondary) = &idea.secondary_category {
                out.push_str(&format!(" / {}", secondary));
            }
            out.push('\n');
        }

        let pain = &idea.pain_points;
        if !pain.problem_statement.is_empty() {
            out.push_str(&format!("**Problem**: {}\n", pain.problem_statement));
        }
        if !pain.who_experiences.is_empty() {
            out.push_str(&format!("**Who experiences it**: {}\n", pain.who_experiences));
        }
        if !pain.frequency.is_empty() {
            out.push_str(&format!("**Frequency**: {}\n", pain.frequency));
        }
        if !pain.severity.is_empty() {
            out.push_str(&format!("**Severity**: {}\n", pain.severity));
        }

        let current = &idea.current_solution;
        if !current.existing_alternatives.is_empty() {
            out.push_str(&format!("**Current alternatives**: {}\n", current.existing_alternatives));
        }
        if !current.shortcomings.is_empty() {
            out.push_str(&format!("**Their shortcomings**: {}\n", current.shortcomings));
        }

        if !idea.monetization.is_empty() {
            out.push_str(&format!("**Monetization**: {}\n", idea.monetization));
        }
        if let Some(price) = idea.price {
            out.push_str(&format!("**Asking price**: {:.2}\n", price));
        }

        if let Some(document) = &idea.document_content {
            let excerpt: String = document.chars().take(MAX_DOCUMENT_CHARS).collect();
            out.push_str("\n**Attached document**:\n");
            out.push_str(&excerpt);
            out.push('\n');
        }

        out
    }

    /// Render the taxonomy as a bulleted list.
    pub fn render_metric_schema() -> String {
        let mut out = String::new();

        for metric in METRIC_SCHEMA {
            out.push_str(&format!("- **{}**: {}\n", metric.key, metric.description));
            for sub in metric.sub_metrics {
                out.push_str(&format!(
                    "  - `{}` (weight {:.2}, source {}): {}\n",
                    sub.key,
                    sub.weight,
                    sub.source.as_str(),
                    sub.description
                ));
            }
        }

        out
    }
}
