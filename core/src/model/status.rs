//! Execution status snapshots
//!
//! Only the fields the client reads are typed. Everything else the service
//! sends is kept in `extra` so a decoded status can be handed on unaltered.

use crate::classifier::{partition, Partition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Status text for a poll loop that ran out of budget
pub const TIMED_OUT_STATUS: &str = "timed out waiting for completion status";

/// Response body of a successful submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub canary_execution_id: String,
}

/// Remote job state snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CanaryResult>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ExecutionStatus {
    /// Locally synthesized terminal status for an unrecoverable poll error
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            complete: false,
            status: Some(message.into()),
            ..Self::default()
        }
    }

    /// Locally synthesized terminal status for an exhausted poll budget
    pub fn timed_out() -> Self {
        Self::failed(TIMED_OUT_STATUS)
    }

    /// Decode a status endpoint response body
    pub fn from_json_str(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Judge result, when the service produced one
    pub fn judge_result(&self) -> Option<&JudgeResult> {
        self.result.as_ref().and_then(|r| r.judge_result.as_ref())
    }

    /// Passing/failing split of the judge's per-metric results
    pub fn partition_results(&self) -> Option<Partition<'_>> {
        self.judge_result().map(|judge| partition(&judge.results))
    }
}

/// Analysis result payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanaryResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_result: Option<JudgeResult>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The judge's verdict
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeResult {
    #[serde(default)]
    pub judge_name: Option<String>,
    #[serde(default)]
    pub results: Vec<AnalysisResult>,
    #[serde(default)]
    pub score: Option<JudgeScore>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Overall score and grade
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeScore {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub classification_reason: Option<String>,
}

/// One judged metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub name: String,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub classification_reason: Option<String>,
    #[serde(default)]
    pub experiment_metadata: Value,
    #[serde(default)]
    pub control_metadata: Value,
    #[serde(default)]
    pub result_metadata: Value,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
