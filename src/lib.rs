//! canary-adhoc: submit an ad-hoc canary analysis and report the verdict
//!
//! Request assembly lives in `canary-adhoc-core`. This crate adds the HTTP
//! transport, the submit-and-poll monitor, the console report and the CLI.

pub mod cli;
pub mod monitor;
pub mod report;
pub mod transport;

// Re-export the run surface
pub use monitor::{
    ExecutionMonitor, JobId, MonitorConfig, PollOutcome, RunObserver, RunSummary,
    SubmissionError, TerminalState,
};
pub use report::{write_report, write_status};
pub use transport::{FakeTransport, SyncTransport, Transport, TransportError, UreqTransport};
