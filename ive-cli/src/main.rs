//! ive: command-line front end for the Idea Validation Engine
//!
//! - `ive validate` runs the full pipeline against an OpenAI-compatible API
//! - `ive score` re-runs gate and scoring offline from saved stage outputs
//! - `ive schema` prints the metric taxonomy and its fingerprint

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};

use ideaval_agent::OpenAiBackend;
use ive::{gate, scoring, EngineConfig, NoopObserver, ValidationEngine};
use rubric::{
    contracts, parser, rubric_fingerprint, ArchitectOutput, IdeaInput, SchemaNode, SensorOutput,
    FINAL_SCORE_WEIGHTS, METRIC_SCHEMA,
};

#[derive(Parser)]
#[command(name = "ive")]
#[command(about = "Evidence-gated scoring of business ideas")]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, global = true, env = "IVE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full validation pipeline on an idea
    Validate {
        /// Idea input as JSON
        idea: PathBuf,

        /// Base URL of the OpenAI-compatible API
        #[arg(long, env = "IVE_BASE_URL", default_value = "https://api.openai.com/v1")]
        base_url: String,

        /// API key
        #[arg(long, env = "IVE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Use one model for every stage (overrides config file)
        #[arg(long)]
        model: Option<String>,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,

        /// Write every prompt and response as JSON lines
        #[arg(long)]
        transcript: Option<PathBuf>,
    },

    /// Gate and score saved Architect and Sensor outputs without a model
    Score {
        /// Architect output JSON
        #[arg(long)]
        architect: PathBuf,

        /// Sensor output JSON
        #[arg(long)]
        sensor: PathBuf,
    },

    /// Print the metric taxonomy and its fingerprint
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ive=info".parse()?)
                .add_directive("ideaval_agent=info".parse()?)
                .add_directive("rubric=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => {
            info!("No config file given, using defaults");
            EngineConfig::default()
        }
    };

    match cli.command {
        Command::Validate {
            idea,
            base_url,
            api_key,
            model,
            timeout_secs,
            transcript,
        } => {
            let config = match model {
                Some(model) => config.with_model(model),
                None => config,
            };
            validate(&idea, config, base_url, api_key, timeout_secs, transcript.as_deref()).await
        }
        Command::Score { architect, sensor } => score(&architect, &sensor, &config),
        Command::Schema => {
            let out = json!({
                "fingerprint": rubric_fingerprint(),
                "metrics": METRIC_SCHEMA,
                "final_score_weights": FINAL_SCORE_WEIGHTS,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}

async fn validate(
    idea_path: &Path,
    config: EngineConfig,
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    transcript: Option<&Path>,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(idea_path)
        .with_context(|| format!("reading {}", idea_path.display()))?;
    let idea: IdeaInput = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", idea_path.display()))?;

    if api_key.is_none() {
        warn!("No API key set; requests are sent unauthenticated");
    }

    let backend = OpenAiBackend::new(base_url, config.architect.model.clone(), api_key)?;
    let engine = ValidationEngine::new(Arc::new(backend)).with_config(config);
    let run_id = uuid::Uuid::new_v4().to_string();

    let outcome = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        engine.run_as(&run_id, &idea, &NoopObserver),
    )
    .await;

    // Transcript is written even when the run fails
    if let Some(path) = transcript {
        let lines = engine.audit_log().to_json_lines(&run_id).await?;
        std::fs::write(path, lines).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Transcript written");
    }

    let result = outcome
        .map_err(|_| anyhow::anyhow!("validation timed out after {}s", timeout_secs))??;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn score(architect_path: &Path, sensor_path: &Path, config: &EngineConfig) -> anyhow::Result<()> {
    let architect: ArchitectOutput = load_stage(architect_path, &contracts::architect_schema())?;
    let mut sensor: SensorOutput = load_stage(sensor_path, &contracts::sensor_schema())?;
    sensor.enforce_no_speculation();

    let outcome = gate::evaluate(&architect, &sensor, &config.gate);
    let result = if outcome.pass {
        let mut result = scoring::score(&architect, &sensor, outcome.readiness.clone());
        result.validation_readiness = gate::upgrade_readiness(
            &outcome.readiness,
            &result,
            config.policy.readiness_upgrade,
        );
        result
    } else {
        gate::halted_result(outcome.readiness)
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Read a saved stage output, held to the same contract as a live response.
fn load_stage<T: serde::de::DeserializeOwned>(path: &Path, schema: &SchemaNode) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value = parser::parse(&text).with_context(|| format!("parsing {}", path.display()))?;

    let report = schema.validate(&value);
    if !report.valid {
        anyhow::bail!("{} failed schema validation: {}", path.display(), report.joined());
    }

    Ok(serde_json::from_value(value)?)
}
