//! Audit trail for model interactions.
//!
//! Records every prompt sent and every raw response received so a bad model
//! answer can be diagnosed without rerunning the validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Maximum entries in the audit log before pruning.
const MAX_AUDIT_ENTRIES: usize = 10_000;

/// Direction of a model interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum InteractionDirection {
    /// Prompt text sent to the model
    Sent,
    /// Raw response text received from the model
    Received,
}

/// An entry in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEntry {
    /// Unique entry ID
    pub entry_id: String,
    /// Validation run this interaction belongs to
    pub run_id: String,
    /// Pipeline stage name
    pub stage: String,
    /// Prompt or response
    pub direction: InteractionDirection,
    /// Exact text
    pub content: String,
    /// SHA-256 of the content, hex encoded
    pub content_sha256: String,
    /// When the interaction was recorded
    pub recorded_at: DateTime<Utc>,
}

impl InteractionEntry {
    /// Create an entry, hashing the content.
    pub fn new(
        run_id: impl Into<String>,
        stage: impl Into<String>,
        direction: InteractionDirection,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            run_id: run_id.into(),
            stage: stage.into(),
            direction,
            content_sha256: hex::encode(Sha256::digest(content.as_bytes())),
            content,
            recorded_at: Utc::now(),
        }
    }
}

/// Bounded in-memory log of model interactions.
pub struct InteractionLog {
    /// Log entries (newest first)
    entries: Arc<RwLock<VecDeque<InteractionEntry>>>,
    /// Maximum entries to retain
    max_entries: usize,
}

impl InteractionLog {
    /// Create a new audit log.
    pub fn new() -> Self {
        Self::with_max_entries(MAX_AUDIT_ENTRIES)
    }

    /// Create with custom max entries.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            max_entries,
        }
    }

    /// Record an interaction, returning its entry ID.
    pub async fn record(&self, entry: InteractionEntry) -> String {
        let entry_id = entry.entry_id.clone();

        let mut entries = self.entries.write().await;
        entries.push_front(entry);

        // Prune if over limit
        while entries.len() > self.max_entries {
            entries.pop_back();
        }

        entry_id
    }

    /// Get recent entries.
    pub async fn recent(&self, limit: usize) -> Vec<InteractionEntry> {
        let entries = self.entries.read().await;
        entries.iter().take(limit).cloned().collect()
    }

    /// Entries for one run, oldest first.
    pub async fn for_run(&self, run_id: &str) -> Vec<InteractionEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .rev()
            .filter(|e| e.run_id == run_id)
            .cloned()
            .collect()
    }

    /// Get statistics.
    pub async fn stats(&self) -> InteractionStats {
        let entries = self.entries.read().await;

        let sent = entries
            .iter()
            .filter(|e| e.direction == InteractionDirection::Sent)
            .count();
        let received = entries
            .iter()
            .filter(|e| e.direction == InteractionDirection::Received)
            .count();

        let mut runs: Vec<&str> = entries.iter().map(|e| e.run_id.as_str()).collect();
        runs.sort_unstable();
        runs.dedup();

        InteractionStats {
            total: entries.len(),
            sent,
            received,
            // A sent prompt with no matching response means the call failed
            unanswered: sent.saturating_sub(received),
            runs: runs.len(),
        }
    }

    /// Serialize the entries of one run as JSON lines, oldest first.
    pub async fn to_json_lines(&self, run_id: &str) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for entry in self.for_run(run_id).await {
            out.push_str(&serde_json::to_string(&entry)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Clear the log.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Get count.
    pub async fn count(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }
}

impl Default for InteractionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics from the audit log.
#[derive(Debug, Clone)]
pub struct InteractionStats {
    /// Entries logged
    pub total: usize,
    /// Prompts sent
    pub sent: usize,
    /// Responses received
    pub received: usize,
    /// Prompts with no response
    pub unanswered: usize,
    /// Distinct runs
    pub runs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_interaction_log() {
        let log = InteractionLog::new();

        log.record(InteractionEntry::new("run-1", "Architect", InteractionDirection::Sent, "prompt"))
            .await;
        log.record(InteractionEntry::new("run-1", "Architect", InteractionDirection::Received, "{}"))
            .await;
        log.record(InteractionEntry::new("run-2", "Architect", InteractionDirection::Sent, "prompt"))
            .await;

        let run = log.for_run("run-1").await;
        assert_eq!(run.len(), 2);
        assert_eq!(run[0].direction, InteractionDirection::Sent);
        assert_eq!(run[1].content, "{}");

        let stats = log.stats().await;
        assert_eq!(stats.total, 3);
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.received, 1);
        assert_eq!(stats.unanswered, 1);
        assert_eq!(stats.runs, 2);
    }

    #[test]
    fn test_pruning() {
        let log = InteractionLog::with_max_entries(2);

        tokio_test::block_on(async {
            for i in 0..5 {
                log.record(InteractionEntry::new(
                    format!("run-{}", i),
                    "Sensor",
                    InteractionDirection::Sent,
                    "p",
                ))
                .await;
            }

            assert_eq!(log.count().await, 2);
            let recent = log.recent(10).await;
            assert_eq!(recent[0].run_id, "run-4");
        });
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_clear_empties() {
        let log = InteractionLog::new();
        for stage in ["Architect", "Sensor", "Calculator reasoning"] {
            log.record(InteractionEntry::new("run-1", stage, InteractionDirection::Sent, "p"))
                .await;
        }

        let recent = log.recent(2).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].stage, "Calculator reasoning");
        assert_eq!(recent[1].stage, "Sensor");

        log.clear().await;
        assert!(log.recent(10).await.is_empty());
        assert!(log.for_run("run-1").await.is_empty());
        assert_eq!(log.stats().await.total, 0);
    }

    #[tokio::test]
    async fn test_json_lines_and_hash() {
        let log = InteractionLog::new();
        log.record(InteractionEntry::new("r", "Sensor", InteractionDirection::Received, "abc"))
            .await;

        let lines = log.to_json_lines("r").await.unwrap();
        assert_eq!(lines.lines().count(), 1);
        assert!(lines.contains("\"direction\":\"received\""));
        // sha256("abc")
        assert!(lines.contains("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"));

        log.clear().await;
        assert_eq!(log.count().await, 0);
    }
}
