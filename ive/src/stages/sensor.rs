//! Sensor stage: gather evidence for the research plan.

use tracing::{info, warn};

use rubric::{contracts, ArchitectOutput, PromptAssembler, SensorOutput};

use super::StageContext;
use crate::config::StageConfig;
use crate::types::{Result, Stage};

/// Run the Sensor stage.
///
/// Findings reported without a value are forced to low confidence.
pub async fn run_sensor(
    ctx: &StageContext<'_>,
    config: &StageConfig,
    architect: &ArchitectOutput,
) -> Result<SensorOutput> {
    let stage = Stage::Sensor;
    let prompt = PromptAssembler::build_sensor_prompt(architect);
    let raw = ctx.invoke(stage, config, prompt).await?;

    let value = ctx.parse_strict(stage, &raw, &contracts::sensor_schema())?;
    let mut output: SensorOutput = ctx.decode(stage, value)?;

    let corrected = output.enforce_no_speculation();
    if !corrected.is_empty() {
        warn!(
            run_id = %ctx.run_id,
            corrected = %corrected.join(", "),
            "Null findings reported above low confidence"
        );
    }

    let with_value = output.research_results.iter().filter(|f| f.has_value()).count();
    info!(
        run_id = %ctx.run_id,
        results = output.research_results.len(),
        with_value,
        "Sensor complete"
    );

    Ok(output)
}
