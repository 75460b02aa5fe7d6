//! Rubric - scoring taxonomy and stage contracts for idea validation
//!
//! This crate holds everything about the validation pipeline that does not
//! talk to a model:
//!
//! - **Data model**: idea input, stage outputs, and the final [`ValidationResult`]
//! - **Metric taxonomy**: [`METRIC_SCHEMA`] and [`FINAL_SCORE_WEIGHTS`]
//! - **Schema validation**: a recursive structural validator for model output
//! - **Response parsing**: recovery of JSON from free-form completion text
//! - **Prompt assembly**: the Architect, Sensor and Calculator prompts
//!
//! # Example
//!
//! ```ignore
//! use rubric::{contracts, parser, schema};
//!
//! let value = parser::parse(&completion_text)?;
//! let report = schema::validate(&value, &contracts::architect_schema(), "root");
//! if !report.valid {
//!     eprintln!("{}", report.errors.join("; "));
//! }
//! ```

pub mod contracts;
pub mod metrics;
pub mod parser;
pub mod prompt;
pub mod schema;
pub mod types;

// Re-export main types
pub use metrics::{
    final_weight, metric, rubric_fingerprint, EvidenceSource, MetricDefinition,
    SubMetricDefinition, CONTEXTUAL_METRIC, CRITICAL_METRICS, FINAL_SCORE_WEIGHTS, METRIC_SCHEMA,
};
pub use parser::ParseError;
pub use prompt::PromptAssembler;
pub use schema::{SchemaKind, SchemaNode, ValidationReport};
pub use types::*;
