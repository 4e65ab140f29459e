//! Async task module - submission, status, cancellation and polling.
//!
//! The client issues single requests; the poller decides when to ask again.

pub mod task;
mod client;
mod payload;
mod poller;

pub use client::{AsyncTaskClient, TaskStatusSource};
pub use payload::{TestCaseDesignRequest, TestCaseOptimizationBatchRequest, TestPointGenerationRequest};
pub use poller::{Backoff, Poller, PollerConfig, DEFAULT_MAX_CONSECUTIVE_ERRORS};
pub use task::{CancelOutcome, TaskAccepted, TaskError, TaskSnapshot, TaskStatus, TaskType};
