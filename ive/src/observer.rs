//! Pipeline observation hooks.
//!
//! Observers see every prompt, every raw response and a log line per stage.
//! They cannot influence the run.

use async_trait::async_trait;

use ideaval_agent::{InteractionDirection, InteractionEntry, InteractionLog};

use crate::types::{PipelinePhase, Stage};

/// One prompt or response crossing the model boundary.
#[derive(Debug, Clone)]
pub struct InteractionEvent<'a> {
    pub run_id: &'a str,
    pub stage: Stage,
    pub direction: InteractionDirection,
    pub content: &'a str,
}

/// Receives progress notifications from a validation run.
///
/// All methods default to no-ops.
#[async_trait]
pub trait PipelineObserver: Send + Sync {
    /// Human-readable progress line, emitted after each stage.
    async fn on_log(&self, _message: &str) {}

    /// Called before each prompt is sent and after each response arrives.
    async fn on_interaction(&self, _event: &InteractionEvent<'_>) {}

    /// Called on every state machine transition.
    async fn on_phase(&self, _run_id: &str, _phase: PipelinePhase) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

#[async_trait]
impl PipelineObserver for NoopObserver {}

#[async_trait]
impl PipelineObserver for InteractionLog {
    async fn on_interaction(&self, event: &InteractionEvent<'_>) {
        self.record(InteractionEntry::new(
            event.run_id,
            event.stage.name(),
            event.direction,
            event.content,
        ))
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_interaction_log_records_events() {
        let log = InteractionLog::new();
        let observer: &dyn PipelineObserver = &log;

        observer
            .on_interaction(&InteractionEvent {
                run_id: "run-1",
                stage: Stage::Sensor,
                direction: InteractionDirection::Sent,
                content: "prompt",
            })
            .await;
        observer.on_log("Sensor complete").await;

        let entries = log.for_run("run-1").await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].stage, "Sensor");
        assert_eq!(entries[0].content, "prompt");
    }

    #[test]
    fn test_noop_observer() {
        let observer = NoopObserver;
        tokio_test::block_on(async {
            observer.on_log("ignored").await;
            observer.on_phase("run-1", PipelinePhase::Done).await;
        });
    }
}
