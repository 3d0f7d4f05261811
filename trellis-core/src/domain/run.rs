//! Run domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Train,
    Predict,
}

impl RunKind {
    /// Lowercase name used in artifact paths and trigger topics
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Train => "train",
            RunKind::Predict => "predict",
        }
    }
}

impl std::fmt::Display for RunKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run lifecycle status
///
/// Transitions are owned by the pipeline runner: SUBMITTED is recorded by the
/// accepting transport, RUNNING by the runner after validation, and exactly
/// one of SUCCESS/FAILED terminates the run. There is no retry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Submitted,
    Running,
    Success,
    Failed,
}

impl RunStatus {
    /// Whether this status terminates the run
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Success | RunStatus::Failed)
    }
}

/// A single timestamped status record
///
/// Written to the append-only per-run status history and overwritten into the
/// project-level last-status pointer, with the same payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub project_id: Uuid,
    pub run_id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusRecord {
    /// Creates a record stamped with the current time
    pub fn now(project_id: Uuid, run_id: Uuid, status: RunStatus, error: Option<String>) -> Self {
        Self {
            project_id,
            run_id,
            timestamp: chrono::Utc::now(),
            status,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_screaming() {
        assert_eq!(
            serde_json::to_string(&RunStatus::Submitted).unwrap(),
            "\"SUBMITTED\""
        );
        assert_eq!(
            serde_json::to_string(&RunStatus::Failed).unwrap(),
            "\"FAILED\""
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(RunStatus::Success.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(!RunStatus::Submitted.is_terminal());
    }

    #[test]
    fn test_record_omits_empty_error() {
        let record = StatusRecord::now(
            Uuid::new_v4(),
            Uuid::new_v4(),
            RunStatus::Running,
            None,
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"RUNNING\""));
    }

    #[test]
    fn test_kind_path_segment() {
        assert_eq!(RunKind::Train.as_str(), "train");
        assert_eq!(RunKind::Predict.to_string(), "predict");
    }
}
