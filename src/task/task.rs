//! Async task data model.
//!
//! Tasks are owned by the server. Every `TaskSnapshot` is an observation that
//! is stale as soon as it is received.
//!
//! # Invariants
//! - `completed_batches <= total_batches`
//! - a terminal status never transitions again

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::http::ApiError;

/// Server-side status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted and waiting for a worker slot
    #[default]
    Pending,
    /// Being processed
    Running,
    /// Finished; `result` is set
    Completed,
    /// Finished with an error; `error` is set
    Failed,
    /// Cancelled before completion
    Cancelled,
    /// Exceeded the server's execution time limit
    Timeout,
}

impl TaskStatus {
    /// Check if the task is in a terminal state.
    ///
    /// # Property
    /// `is_terminal() => !is_active()`
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled | TaskStatus::Timeout
        )
    }

    /// Check if the task is still active (can make progress).
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of work a task performs.
///
/// Unknown server values are preserved in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskType {
    TestPointGeneration,
    TestCaseDesign,
    TestCaseOptimization,
    OneClickGeneration,
    Other(String),
}

impl TaskType {
    pub fn as_str(&self) -> &str {
        match self {
            TaskType::TestPointGeneration => "test_point_generation",
            TaskType::TestCaseDesign => "test_case_design",
            TaskType::TestCaseOptimization => "test_case_optimization",
            TaskType::OneClickGeneration => "one_click_generation",
            TaskType::Other(s) => s,
        }
    }

    /// Agents endpoint that accepts a JSON payload of this kind.
    ///
    /// One-click generation is submitted against a requirement file instead;
    /// see `AsyncTaskClient::submit_one_click_generation`.
    pub fn submit_path(&self) -> Option<&'static str> {
        match self {
            TaskType::TestPointGeneration => Some("/api/agents/test-point-generation/async"),
            TaskType::TestCaseDesign => Some("/api/agents/test-case-design/async"),
            TaskType::TestCaseOptimization => Some("/api/agents/test-case-optimization/batch"),
            TaskType::OneClickGeneration | TaskType::Other(_) => None,
        }
    }
}

impl From<String> for TaskType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "test_point_generation" => TaskType::TestPointGeneration,
            "test_case_design" => TaskType::TestCaseDesign,
            "test_case_optimization" => TaskType::TestCaseOptimization,
            "one_click_generation" => TaskType::OneClickGeneration,
            _ => TaskType::Other(value),
        }
    }
}

impl From<TaskType> for String {
    fn from(value: TaskType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response to a task submission.
///
/// One-click generation replies without a status; the task is then pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAccepted {
    pub task_id: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub message: String,
    /// Human-readable duration estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

/// One observation of a task's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: String,
    pub task_type: TaskType,
    pub status: TaskStatus,
    /// Percentage in 0..=100
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub total_batches: u32,
    #[serde(default)]
    pub completed_batches: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Progress note from the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 1-based position while waiting in the server queue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<u32>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskSnapshot {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Progress clamped to 0..=100.
    pub fn progress_percent(&self) -> u8 {
        self.progress.min(100) as u8
    }

    /// Completed batches over total, `None` until the server reports a total.
    pub fn batch_fraction(&self) -> Option<f64> {
        if self.total_batches == 0 {
            return None;
        }
        Some(self.completed_batches.min(self.total_batches) as f64 / self.total_batches as f64)
    }

    /// Convert a terminal snapshot into the task's outcome.
    ///
    /// Completed yields the result payload (`Null` if the server sent none).
    /// A snapshot that is still active is reported as `TaskError::NotFinished`.
    pub fn into_result(self) -> Result<Value, TaskError> {
        match self.status {
            TaskStatus::Completed => Ok(self.result.unwrap_or(Value::Null)),
            TaskStatus::Failed => Err(TaskError::Failed {
                message: self.error.unwrap_or_else(|| "task failed".to_string()),
                task_id: self.task_id,
            }),
            TaskStatus::Timeout => Err(TaskError::Failed {
                message: self
                    .error
                    .unwrap_or_else(|| "task timed out on the server".to_string()),
                task_id: self.task_id,
            }),
            TaskStatus::Cancelled => Err(TaskError::Cancelled {
                task_id: self.task_id,
            }),
            TaskStatus::Pending | TaskStatus::Running => Err(TaskError::NotFinished {
                task_id: self.task_id,
                status: self.status,
            }),
        }
    }
}

/// Response to a cancellation request.
///
/// `success == false` means the cancellation had no effect (the task was
/// already finished or no longer exists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Error)]
pub enum TaskError {
    #[error("task not found: {task_id}")]
    NotFound { task_id: String },

    #[error("{message}")]
    Failed { task_id: String, message: String },

    #[error("task {task_id} was cancelled")]
    Cancelled { task_id: String },

    #[error("task {task_id} is still {status}")]
    NotFinished { task_id: String, status: TaskStatus },

    #[error("stopped waiting for task {task_id}")]
    Aborted { task_id: String },

    #[error("task {task_id} did not finish within {}s", .elapsed.as_secs())]
    DeadlineExceeded { task_id: String, elapsed: Duration },

    #[error("task {task_id} did not finish after {attempts} status checks")]
    AttemptsExhausted { task_id: String, attempts: u32 },

    #[error("{last_error}")]
    PollFailed {
        task_id: String,
        consecutive_failures: u32,
        last_error: ApiError,
    },

    #[error("task type {0} cannot be submitted with a JSON payload")]
    Unsupported(TaskType),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parse RFC 3339, or a naive ISO 8601 timestamp taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
