//! Reusable status poller.
//!
//! Drives a [`TaskStatusSource`] until the task reaches a terminal state. The
//! poller owns cadence (interval and backoff), bounds (attempts, consecutive
//! failures, wall-clock deadline) and cancellation; the task client owns none
//! of these.

use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::client::TaskStatusSource;
use super::task::{TaskError, TaskSnapshot};
use crate::config::ClientConfig;

pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Delay growth between polls.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// Always wait `interval`
    Fixed,
    /// Wait `interval * factor^n` after the n-th poll, capped at `max`
    Exponential { factor: f64, max: Duration },
}

impl Backoff {
    /// Delay to wait after poll number `attempt` (0-based).
    pub fn delay(&self, interval: Duration, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed => interval,
            Backoff::Exponential { factor, max } => {
                let exponent = attempt.min(i32::MAX as u32) as i32;
                let secs = interval.as_secs_f64() * factor.max(1.0).powi(exponent);
                if !secs.is_finite() || secs >= max.as_secs_f64() {
                    *max
                } else {
                    Duration::from_secs_f64(secs)
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Base delay between polls
    pub interval: Duration,
    pub backoff: Backoff,
    /// Total status requests allowed, successful or not
    pub max_attempts: u32,
    /// Polling gives up after this many failed polls in a row
    pub max_consecutive_errors: u32,
    /// Wall-clock limit for the whole wait
    pub timeout: Option<Duration>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: crate::config::DEFAULT_POLL_INTERVAL,
            backoff: Backoff::Fixed,
            max_attempts: crate::config::DEFAULT_POLL_MAX_ATTEMPTS,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
            timeout: None,
        }
    }
}

impl PollerConfig {
    pub fn from_client_config(config: &ClientConfig) -> Self {
        Self {
            interval: config.poll_interval,
            max_attempts: config.poll_max_attempts,
            ..Self::default()
        }
    }
}

/// Keeps observed progress non-decreasing across snapshots.
#[derive(Debug, Default)]
struct ProgressTracker {
    completed_batches: u32,
    progress: u32,
}

impl ProgressTracker {
    fn observe(&mut self, mut snapshot: TaskSnapshot) -> TaskSnapshot {
        if snapshot.completed_batches < self.completed_batches
            || snapshot.progress < self.progress
        {
            warn!(
                task_id = %snapshot.task_id,
                completed_batches = snapshot.completed_batches,
                previous = self.completed_batches,
                "Task progress went backwards; keeping previous value"
            );
        }
        self.completed_batches = self.completed_batches.max(snapshot.completed_batches);
        self.progress = self.progress.max(snapshot.progress);
        snapshot.completed_batches = self.completed_batches;
        snapshot.progress = self.progress;
        snapshot
    }
}

#[derive(Debug, Clone, Default)]
pub struct Poller {
    config: PollerConfig,
}

impl Poller {
    pub fn new(config: PollerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Poll `task_id` until it is terminal and return the terminal snapshot.
    ///
    /// `on_snapshot` sees every successful observation in order. Transient
    /// failures (network, 5xx) are retried up to `max_consecutive_errors` in a
    /// row; `NotFound` and every other error stop immediately. Once `cancel`
    /// fires no further request is issued.
    pub async fn poll_until_terminal<S, F>(
        &self,
        source: &S,
        task_id: &str,
        cancel: &CancellationToken,
        mut on_snapshot: F,
    ) -> Result<TaskSnapshot, TaskError>
    where
        S: TaskStatusSource + ?Sized,
        F: FnMut(&TaskSnapshot),
    {
        let started = Instant::now();
        let deadline = self.config.timeout.map(|t| started + t);
        let mut tracker = ProgressTracker::default();
        let mut attempts: u32 = 0;
        let mut consecutive_errors: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(aborted(task_id));
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(TaskError::DeadlineExceeded {
                        task_id: task_id.to_string(),
                        elapsed: started.elapsed(),
                    });
                }
            }
            if attempts >= self.config.max_attempts {
                warn!(task_id = %task_id, attempts, "Giving up on task: attempt limit reached");
                return Err(TaskError::AttemptsExhausted {
                    task_id: task_id.to_string(),
                    attempts,
                });
            }

            attempts += 1;
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(aborted(task_id)),
                _ = sleep_until_deadline(deadline) => {
                    warn!(task_id = %task_id, "Deadline passed during status request");
                    return Err(TaskError::DeadlineExceeded {
                        task_id: task_id.to_string(),
                        elapsed: started.elapsed(),
                    });
                }
                fetched = source.fetch_status(task_id) => fetched,
            };

            match fetched {
                Ok(snapshot) => {
                    consecutive_errors = 0;
                    let snapshot = tracker.observe(snapshot);
                    on_snapshot(&snapshot);
                    if snapshot.is_terminal() {
                        info!(
                            task_id = %task_id,
                            status = %snapshot.status,
                            attempts,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Task reached terminal state"
                        );
                        return Ok(snapshot);
                    }
                    debug!(
                        task_id = %task_id,
                        status = %snapshot.status,
                        progress = snapshot.progress,
                        "Task still active"
                    );
                }
                Err(TaskError::Api(err)) if err.is_transient() => {
                    consecutive_errors += 1;
                    warn!(
                        task_id = %task_id,
                        consecutive_errors,
                        error = %err,
                        "Status poll failed"
                    );
                    if consecutive_errors >= self.config.max_consecutive_errors {
                        return Err(TaskError::PollFailed {
                            task_id: task_id.to_string(),
                            consecutive_failures: consecutive_errors,
                            last_error: err,
                        });
                    }
                }
                Err(err) => return Err(err),
            }

            let mut delay = self.config.backoff.delay(self.config.interval, attempts - 1);
            if let Some(deadline) = deadline {
                delay = delay.min(deadline.saturating_duration_since(Instant::now()));
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(aborted(task_id)),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Poll until terminal and convert the outcome.
    ///
    /// Completed yields the result payload; failed or timed-out tasks yield
    /// `TaskError::Failed` and cancelled tasks `TaskError::Cancelled`.
    pub async fn wait_for_result<S>(
        &self,
        source: &S,
        task_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, TaskError>
    where
        S: TaskStatusSource + ?Sized,
    {
        self.poll_until_terminal(source, task_id, cancel, |_| {})
            .await?
            .into_result()
    }
}

/// Resolves at `deadline`, or never when there is none.
async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

fn aborted(task_id: &str) -> TaskError {
    debug!(task_id = %task_id, "Polling cancelled by caller");
    TaskError::Aborted {
        task_id: task_id.to_string(),
    }
}
