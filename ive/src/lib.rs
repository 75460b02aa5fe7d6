//! Idea Validation Engine (IVE)
//!
//! Scores a business idea through a three-stage pipeline in which the model
//! plans, researches and explains, but never computes a number:
//!
//! - **Architect**: normalizes the idea and plans research per sub-metric
//! - **Sensor**: returns evidence, with null findings instead of guesses
//! - **Gate**: rates evidence completeness before scoring
//! - **Scoring**: deterministic arithmetic over the metric taxonomy
//! - **Calculator**: narrative around the computed scores
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      ValidationEngine                        │
//! │                                                              │
//! │  ┌───────────┐  ┌────────┐  ┌──────┐  ┌───────┐  ┌────────┐ │
//! │  │ Architect │──│ Sensor │──│ Gate │──│ Score │──│Narrate │ │
//! │  └─────┬─────┘  └───┬────┘  └──────┘  └───────┘  └───┬────┘ │
//! │        │            │                                │      │
//! │        └────────────┴───────────┬────────────────────┘      │
//! │                         ┌───────▼───────┐                   │
//! │                         │  LlmBackend   │                   │
//! │                         └───────────────┘                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod gate;
pub mod observer;
pub mod pipeline;
pub mod scoring;
pub mod stages;
pub mod types;

// Re-export main types
pub use config::{
    EngineConfig, GateConfig, GeneralConfig, NarrativeFailurePolicy, PolicyConfig,
    ReadinessUpgradePolicy, StageConfig,
};
pub use gate::GateOutcome;
pub use observer::{InteractionEvent, NoopObserver, PipelineObserver};
pub use pipeline::{run_validation_pipeline, ValidationEngine};
pub use types::*;
