//! Console report
//!
//! Renders the final execution status as the plain-text block printed at the
//! end of a run. Rendering goes through `io::Write` so tests can capture it.

use crate::monitor::RunSummary;
use canary_adhoc_core::model::status::{AnalysisResult, JudgeResult};
use canary_adhoc_core::{partition, ExecutionStatus};
use std::io::{self, Write};

const RULE: &str = "=============================================";
const ENTRY_SEPARATOR: &str = "-------------";

/// Write the status report for a run
pub fn write_report<W: Write>(out: &mut W, summary: &RunSummary, verbose: bool) -> io::Result<()> {
    write_status(out, &summary.status_url, Some(&summary.outcome.status), verbose)
}

/// Write the status block; `status` is `None` when no status was ever obtained
pub fn write_status<W: Write>(
    out: &mut W,
    status_url: &str,
    status: Option<&ExecutionStatus>,
    verbose: bool,
) -> io::Result<()> {
    writeln!(out, "========== Canary Execution Status ==========")?;
    writeln!(out, "Status URL: {}", status_url)?;

    match status {
        Some(status) => {
            writeln!(out, "Complete: {}", status.complete)?;
            writeln!(out, "Status: {}", status.status.as_deref().unwrap_or("null"))?;
            if let Some(judge) = status.judge_result() {
                write_judge(out, judge, verbose)?;
            }
        }
        None => {
            writeln!(out, "Complete: false")?;
            writeln!(out, "Status: null")?;
        }
    }

    writeln!(out, "{}", RULE)
}

fn write_judge<W: Write>(out: &mut W, judge: &JudgeResult, verbose: bool) -> io::Result<()> {
    if let Some(score) = &judge.score {
        writeln!(out, "Score: {:?}", score.score)?;
        writeln!(
            out,
            "Grade: {}",
            score.classification.as_deref().unwrap_or("null")
        )?;
        if let Some(reason) = score.classification_reason.as_deref().filter(|r| !r.is_empty()) {
            writeln!(out, "Reason: {}", reason)?;
        }
    }

    if verbose {
        let split = partition(&judge.results);
        writeln!(out, "========== Passed Results Summary ===========")?;
        write_entries(out, &split.passing)?;
        writeln!(out, "========== Failed Results Summary ===========")?;
        write_entries(out, &split.failing)?;
    }
    Ok(())
}

fn write_entries<W: Write>(out: &mut W, results: &[&AnalysisResult]) -> io::Result<()> {
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            writeln!(out, "{}", ENTRY_SEPARATOR)?;
        }
        writeln!(out, "Name: {}", result.name)?;
        writeln!(out, "Experiment: {}", result.experiment_metadata)?;
        writeln!(out, "Control:    {}", result.control_metadata)?;
        writeln!(out, "Overall:    {}", result.result_metadata)?;
    }
    Ok(())
}
