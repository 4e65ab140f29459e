//! Single-shot primitives for server-side async tasks.
//!
//! `AsyncTaskClient` never loops or sleeps: submit, read status and cancel
//! are each one request. Polling cadence belongs to the caller (see
//! [`Poller`](super::poller::Poller)).

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use super::payload::{
    TestCaseDesignRequest, TestCaseOptimizationBatchRequest, TestPointGenerationRequest,
};
use super::task::{CancelOutcome, TaskAccepted, TaskError, TaskSnapshot, TaskType};
use crate::http::{segment, ApiErrorKind, RequestOptions, Transport};

/// Anything that can report a task's current state.
///
/// The poller depends on this seam rather than on `AsyncTaskClient` directly.
#[async_trait]
pub trait TaskStatusSource: Send + Sync {
    async fn fetch_status(&self, task_id: &str) -> Result<TaskSnapshot, TaskError>;
}

#[derive(Debug, Clone)]
pub struct AsyncTaskClient {
    transport: Transport,
}

impl AsyncTaskClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Submit a task of `task_type`. Returns as soon as the server accepts it.
    ///
    /// Failures are returned as-is and never retried here.
    pub async fn submit<P: Serialize + ?Sized>(
        &self,
        task_type: &TaskType,
        payload: &P,
    ) -> Result<TaskAccepted, TaskError> {
        let path = task_type
            .submit_path()
            .ok_or_else(|| TaskError::Unsupported(task_type.clone()))?;

        let accepted: TaskAccepted = self.transport.post(path, payload).await?;
        info!(
            task_id = %accepted.task_id,
            task_type = %task_type,
            status = %accepted.status,
            "Submitted async task"
        );
        Ok(accepted)
    }

    pub async fn submit_test_point_generation(
        &self,
        request: &TestPointGenerationRequest,
    ) -> Result<TaskAccepted, TaskError> {
        self.submit(&TaskType::TestPointGeneration, request).await
    }

    pub async fn submit_test_case_design(
        &self,
        request: &TestCaseDesignRequest,
    ) -> Result<TaskAccepted, TaskError> {
        self.submit(&TaskType::TestCaseDesign, request).await
    }

    pub async fn submit_test_case_optimization(
        &self,
        request: &TestCaseOptimizationBatchRequest,
    ) -> Result<TaskAccepted, TaskError> {
        self.submit(&TaskType::TestCaseOptimization, request).await
    }

    /// Start the full requirement → test point → test case → optimization
    /// pipeline for an uploaded requirement file.
    ///
    /// The file must belong to `project_id` and have extracted text; otherwise
    /// the server answers 404 or 400 and the error is returned unchanged.
    pub async fn submit_one_click_generation(
        &self,
        project_id: i64,
        module_id: i64,
        file_id: i64,
    ) -> Result<TaskAccepted, TaskError> {
        let path = format!(
            "/api/projects/{}/modules/{}/requirements/files/{}/generate-all",
            project_id, module_id, file_id
        );
        let accepted: TaskAccepted = self
            .transport
            .post_empty(&path, RequestOptions::default())
            .await?;
        info!(
            task_id = %accepted.task_id,
            task_type = %TaskType::OneClickGeneration,
            project_id,
            module_id,
            file_id,
            "Submitted async task"
        );
        Ok(accepted)
    }

    /// Read the current state of a task.
    ///
    /// An identifier unknown to the server yields `TaskError::NotFound`.
    pub async fn get_status(&self, task_id: &str) -> Result<TaskSnapshot, TaskError> {
        let path = format!("/api/agents/tasks/{}/status", segment(task_id));
        match self.transport.get::<TaskSnapshot>(&path).await {
            Ok(snapshot) => {
                debug!(
                    task_id = %task_id,
                    status = %snapshot.status,
                    progress = snapshot.progress,
                    completed_batches = snapshot.completed_batches,
                    total_batches = snapshot.total_batches,
                    "Fetched task status"
                );
                Ok(snapshot)
            }
            Err(err) if err.is_not_found() => Err(TaskError::NotFound {
                task_id: task_id.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Request cooperative cancellation.
    ///
    /// If the server refuses because the task is unknown (404) or cannot be
    /// cancelled (400, 409), or answers `success: false`, the outcome has
    /// `success == false`; that is not an error.
    ///
    /// The TestFlow server answers 404 only for evicted tasks. For a
    /// task that already finished it still replies `success: true` and
    /// overwrites the stored status with `cancelled`, so a later status read
    /// may report `cancelled` for work that completed.
    pub async fn cancel(&self, task_id: &str) -> Result<CancelOutcome, TaskError> {
        let path = format!("/api/agents/tasks/{}/cancel", segment(task_id));
        match self
            .transport
            .post_empty::<CancelOutcome>(&path, RequestOptions::default())
            .await
        {
            Ok(outcome) => {
                if outcome.success {
                    info!(task_id = %task_id, "Cancelled async task");
                } else {
                    info!(task_id = %task_id, message = %outcome.message, "Cancellation had no effect");
                }
                Ok(outcome)
            }
            Err(err) if cancel_was_noop(err.kind, err.status_code) => {
                info!(task_id = %task_id, message = %err.message, "Cancellation had no effect");
                Ok(CancelOutcome {
                    success: false,
                    message: err.message,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Statuses with which the server refuses a cancel because there is nothing to cancel.
fn cancel_was_noop(kind: ApiErrorKind, status: Option<u16>) -> bool {
    kind == ApiErrorKind::NotFound || matches!(status, Some(400) | Some(409))
}

#[async_trait]
impl TaskStatusSource for AsyncTaskClient {
    async fn fetch_status(&self, task_id: &str) -> Result<TaskSnapshot, TaskError> {
        self.get_status(task_id).await
    }
}
