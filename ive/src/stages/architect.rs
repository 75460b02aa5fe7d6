//! Architect stage: normalize the idea and plan research.

use tracing::{info, warn};

use rubric::{contracts, ArchitectOutput, IdeaInput, PromptAssembler};

use super::StageContext;
use crate::config::StageConfig;
use crate::types::{Result, Stage};

/// Run the Architect stage.
pub async fn run_architect(
    ctx: &StageContext<'_>,
    config: &StageConfig,
    idea: &IdeaInput,
) -> Result<ArchitectOutput> {
    let stage = Stage::Architect;
    let prompt = PromptAssembler::build_architect_prompt(idea);
    let raw = ctx.invoke(stage, config, prompt).await?;

    let value = ctx.parse_strict(stage, &raw, &contracts::architect_schema())?;
    let output: ArchitectOutput = ctx.decode(stage, value)?;

    let uncovered = output.uncovered_market_pairs();
    if !uncovered.is_empty() {
        warn!(
            run_id = %ctx.run_id,
            uncovered = %uncovered.join(", "),
            "Research plan does not cover every market sub-metric"
        );
    }

    info!(
        run_id = %ctx.run_id,
        plan_items = output.research_plan.len(),
        unresearchable = output.unresearchable.len(),
        "Architect complete"
    );

    Ok(output)
}
