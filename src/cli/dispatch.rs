//! CLI run dispatch
//!
//! One run: load and assemble the request, submit it, wait for the verdict
//! and print the status report. Console output goes through a writer so the
//! whole run can be driven against a fake transport.

use crate::cli::{Args, Result, EXIT_SUCCESS};
use crate::monitor::{ExecutionMonitor, JobId, RunObserver, RunSummary, SubmissionError};
use crate::report::write_report;
use crate::transport::{SyncTransport, Transport, UreqTransport};
use canary_adhoc_core::{AdhocConfig, ExecutionRequest, MetricProviderRegistry, RequestAssembler};
use chrono::{DateTime, Utc};
use std::io::Write;
use tracing::debug;

/// Exit code wrapper for CLI operations
pub type ExitCode = i32;

/// Run the CLI and return the exit code
///
/// The exit code reflects whether the run finished, not the canary verdict.
pub fn run_cli(args: Args) -> ExitCode {
    let transport = Transport::Real(UreqTransport::with_timeout(args.http_timeout_secs));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match run_with(&args, transport, &mut out, Utc::now()) {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            let _ = out.flush();
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

/// Run against an explicit transport, writer and clock
pub fn run_with<T, W>(args: &Args, transport: T, out: &mut W, now: DateTime<Utc>) -> Result<RunSummary>
where
    T: SyncTransport,
    W: Write,
{
    let request = build_request(args, now)?;
    let body = serde_json::to_string_pretty(&request).map_err(SubmissionError::Serialize)?;
    if args.verbose {
        writeln!(out, "{}", body)?;
    } else {
        debug!(body = %body, "assembled canary execution request");
    }

    writeln!(out, "sending the adhoc request to the server...")?;
    let monitor = ExecutionMonitor::new(transport, args.monitor_config());
    let mut console = ConsoleProgress { out: &mut *out, dots: 0 };
    let summary = monitor.run(&request, &mut console)?;
    if console.dots > 0 {
        writeln!(out)?;
    }

    writeln!(out, "logging the request execution status...")?;
    write_report(out, &summary, args.verbose)?;
    writeln!(out, "done.")?;
    Ok(summary)
}

/// Prints the wait banner and progress dots
struct ConsoleProgress<'w, W: Write> {
    out: &'w mut W,
    dots: u64,
}

impl<W: Write> RunObserver for ConsoleProgress<'_, W> {
    fn submitted(&mut self, _job: &JobId) {
        let _ = writeln!(self.out, "waiting for the request to complete...");
        let _ = self.out.flush();
    }

    fn progress(&mut self, _tick: u64) {
        self.dots += 1;
        let _ = write!(self.out, ".");
        let _ = self.out.flush();
    }
}

fn build_request(args: &Args, now: DateTime<Utc>) -> Result<ExecutionRequest> {
    let registry = MetricProviderRegistry::new();
    let assembler = RequestAssembler::new(&registry);
    let config = AdhocConfig::from_path(&args.request_config)?;
    Ok(assembler.assemble_at(&config, args.window(now), now)?)
}
