//! Execution Monitor
//!
//! Submits an assembled request, then polls the job's status endpoint on a
//! fixed interval until the job completes, a poll fails, or the poll budget
//! runs out:
//!
//! ```text
//! Submitting → Polling → { Completed | Failed | TimedOut }
//! ```
//!
//! Submission errors are fatal and returned to the caller. Polling errors are
//! absorbed into a synthesized terminal status so a run always ends with
//! something to report.

pub mod config;

pub use config::MonitorConfig;

use crate::transport::{SyncTransport, Transport, TransportError};
use canary_adhoc_core::model::status::ExecutionResponse;
use canary_adhoc_core::{ExecutionRequest, ExecutionStatus};
use std::fmt;
use std::thread;
use tracing::{debug, info, warn};

/// Identifier of a submitted canary execution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        JobId(value.to_string())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        JobId(value)
    }
}

/// Submission errors (fatal, never retried)
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The request could not be serialized
    #[error("Error serializing canary adhoc execution request, reason: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The POST failed at the transport level
    #[error("Unable to complete POST request, reason: {0}")]
    Transport(#[from] TransportError),

    /// The service answered with something other than an execution id
    #[error("Unable to complete POST request, reason: {0}")]
    InvalidResponse(String),
}

/// A single failed status poll
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Unable to decode execution status: {0}")]
    Decode(#[from] serde_json::Error),
}

/// How the poll loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    /// The service reported `complete = true`
    Completed,
    /// A poll failed; the status carries the error message
    Failed,
    /// The poll budget ran out
    TimedOut,
}

/// Result of waiting for a job
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    pub state: TerminalState,
    /// Last status: decoded from the service when completed, synthesized otherwise
    pub status: ExecutionStatus,
    /// Status requests issued
    pub attempts: u64,
}

/// Everything the report needs about one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub job: JobId,
    pub status_url: String,
    pub outcome: PollOutcome,
}

/// Receives run milestones from [`ExecutionMonitor::run`]
///
/// Any `FnMut(u64)` closure is an observer that only hears progress ticks.
pub trait RunObserver {
    /// The service accepted the request
    fn submitted(&mut self, _job: &JobId) {}

    /// `tick` polls have been made without a terminal status
    fn progress(&mut self, tick: u64);
}

impl<F: FnMut(u64)> RunObserver for F {
    fn progress(&mut self, tick: u64) {
        self(tick)
    }
}

/// Submits execution requests and waits for them to finish
#[derive(Debug)]
pub struct ExecutionMonitor<T: SyncTransport = Transport> {
    transport: T,
    config: MonitorConfig,
}

impl<T: SyncTransport> ExecutionMonitor<T> {
    pub fn new(transport: T, config: MonitorConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// POST the request once and return the execution id
    pub fn submit(&self, request: &ExecutionRequest) -> Result<JobId, SubmissionError> {
        let body = request.to_json().map_err(SubmissionError::Serialize)?;
        let params = self.config.submit_params();
        debug!(url = %self.config.service_url, body_len = body.len(), "submitting adhoc execution request");

        let response = self
            .transport
            .post_json(&self.config.service_url, &params, &body)?;
        let response: ExecutionResponse = serde_json::from_str(&response)
            .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))?;
        if response.canary_execution_id.trim().is_empty() {
            return Err(SubmissionError::InvalidResponse(
                "response carried an empty canaryExecutionId".to_string(),
            ));
        }

        let job = JobId::from(response.canary_execution_id);
        info!(job = %job, "canary execution submitted");
        Ok(job)
    }

    /// Poll until the job completes, a poll fails, or the budget runs out
    ///
    /// `on_progress` receives the tick count every `progress_every` ticks. It
    /// is feedback only and never affects when the loop ends.
    pub fn await_completion<F>(&self, job: &JobId, mut on_progress: F) -> PollOutcome
    where
        F: FnMut(u64),
    {
        let url = self.config.status_url(job);
        let params = self.config.status_params(job);
        let mut remaining = self.config.poll_budget;
        let mut attempts = 0;

        while remaining > 0 {
            attempts += 1;
            let status = match self.poll_once(&url, &params) {
                Ok(status) => status,
                Err(err) => {
                    warn!(job = %job, attempts, error = %err, "status poll failed");
                    return PollOutcome {
                        state: TerminalState::Failed,
                        status: ExecutionStatus::failed(err.to_string()),
                        attempts,
                    };
                }
            };

            if status.complete {
                info!(job = %job, attempts, status = ?status.status, "canary execution complete");
                return PollOutcome {
                    state: TerminalState::Completed,
                    status,
                    attempts,
                };
            }
            debug!(job = %job, attempts, status = ?status.status, "canary execution still running");

            thread::sleep(self.config.poll_interval);
            if self.config.progress_every > 0 && attempts % self.config.progress_every == 0 {
                on_progress(attempts);
            }
            remaining -= 1;
        }

        warn!(job = %job, attempts, budget = self.config.poll_budget, "timed out waiting for canary execution");
        PollOutcome {
            state: TerminalState::TimedOut,
            status: ExecutionStatus::timed_out(),
            attempts,
        }
    }

    /// Submit, then wait for completion
    pub fn run<O>(&self, request: &ExecutionRequest, observer: &mut O) -> Result<RunSummary, SubmissionError>
    where
        O: RunObserver,
    {
        let job = self.submit(request)?;
        observer.submitted(&job);
        let outcome = self.await_completion(&job, |tick| observer.progress(tick));
        Ok(RunSummary {
            status_url: self.config.status_url(&job),
            job,
            outcome,
        })
    }

    fn poll_once(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<ExecutionStatus, PollError> {
        let body = self.transport.get(url, params)?;
        Ok(ExecutionStatus::from_json_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FakeTransport;
    use std::time::Duration;

    fn monitor(transport: FakeTransport, budget: u64) -> ExecutionMonitor<FakeTransport> {
        let config = MonitorConfig::new("http://svc/canary").with_polling(Duration::ZERO, budget, 2);
        ExecutionMonitor::new(transport, config)
    }

    #[test]
    fn test_job_id_display() {
        let job = JobId::from("01HXYZ");
        assert_eq!(job.to_string(), "01HXYZ");
        assert_eq!(job.as_str(), "01HXYZ");
    }

    #[test]
    fn test_progress_every_n_ticks() {
        let transport = FakeTransport::new().with_get(r#"{"complete": false}"#);
        let monitor = monitor(transport, 7);
        let mut ticks = Vec::new();
        let outcome = monitor.await_completion(&JobId::from("j"), |t| ticks.push(t));
        assert_eq!(outcome.state, TerminalState::TimedOut);
        assert_eq!(ticks, vec![2, 4, 6]);
    }

    #[test]
    fn test_progress_disabled() {
        let transport = FakeTransport::new().with_get(r#"{"complete": false}"#);
        let config = MonitorConfig::default().with_polling(Duration::ZERO, 4, 0);
        let monitor = ExecutionMonitor::new(transport, config);
        let mut ticks = 0;
        monitor.await_completion(&JobId::from("j"), |_| ticks += 1);
        assert_eq!(ticks, 0);
    }

    #[test]
    fn test_zero_budget_never_polls() {
        let monitor = monitor(FakeTransport::new(), 0);
        let outcome = monitor.await_completion(&JobId::from("j"), |_| {});
        assert_eq!(outcome.state, TerminalState::TimedOut);
        assert_eq!(outcome.attempts, 0);
        assert_eq!(monitor.transport().get_count(), 0);
    }

    #[test]
    fn test_decode_failure_is_terminal() {
        let transport = FakeTransport::new().with_get("<html>502</html>");
        let monitor = monitor(transport, 10);
        let outcome = monitor.await_completion(&JobId::from("j"), |_| {});
        assert_eq!(outcome.state, TerminalState::Failed);
        assert_eq!(outcome.attempts, 1);
        assert!(!outcome.status.complete);
        assert!(outcome
            .status
            .status
            .as_deref()
            .unwrap()
            .starts_with("Unable to decode execution status"));
    }

    #[derive(Default)]
    struct Milestones {
        events: Vec<String>,
    }

    impl RunObserver for Milestones {
        fn submitted(&mut self, job: &JobId) {
            self.events.push(format!("submitted {}", job));
        }

        fn progress(&mut self, tick: u64) {
            self.events.push(format!("tick {}", tick));
        }
    }

    #[test]
    fn test_run_reports_submission_before_progress() {
        let transport = FakeTransport::new()
            .with_post(r#"{"canaryExecutionId": "01HJOB"}"#)
            .with_get(r#"{"complete": false}"#);
        let monitor = monitor(transport, 4);
        let mut observer = Milestones::default();
        let summary = monitor
            .run(&crate::test_support::request(), &mut observer)
            .unwrap();
        assert_eq!(summary.outcome.state, TerminalState::TimedOut);
        assert_eq!(observer.events, vec!["submitted 01HJOB", "tick 2", "tick 4"]);
    }

    #[test]
    fn test_submit_rejects_empty_execution_id() {
        let transport = FakeTransport::new().with_post(r#"{"canaryExecutionId": ""}"#);
        let monitor = monitor(transport, 1);
        let request = crate::test_support::request();
        assert!(matches!(
            monitor.submit(&request),
            Err(SubmissionError::InvalidResponse(_))
        ));
    }
}
