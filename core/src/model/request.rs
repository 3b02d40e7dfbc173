//! Assembled execution request
//!
//! Serializes to the service's ad-hoc execution JSON shape: a canary config
//! and an execution request side by side.

use crate::providers::MetricQuerySpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Fully assembled, submittable ad-hoc execution request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub canary_config: CanaryConfig,
    pub execution_request: CanaryExecutionRequest,
}

impl ExecutionRequest {
    /// Serialize to the JSON body sent to the service
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Ordered metric configurations
    pub fn metrics(&self) -> &[MetricConfig] {
        &self.canary_config.metrics
    }

    /// Scope pair registered under `scope_name`
    pub fn scope_pair(&self, scope_name: &str) -> Option<&ScopePair> {
        self.execution_request.scopes.get(scope_name)
    }
}

/// What to measure and how to judge it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanaryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub applications: Vec<String>,
    pub judge: JudgeConfig,
    pub metrics: Vec<MetricConfig>,
    pub templates: BTreeMap<String, String>,
    pub classifier: ClassifierConfig,
    pub created_timestamp: i64,
    pub created_timestamp_iso: String,
    pub updated_timestamp: i64,
    pub updated_timestamp_iso: String,
}

/// Judge reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeConfig {
    pub name: String,
    #[serde(default)]
    pub judge_configurations: Map<String, Value>,
}

/// One metric to query and compare
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricConfig {
    pub name: String,
    pub query: MetricQuerySpec,
    pub groups: Vec<String>,
    pub analysis_configurations: BTreeMap<String, Map<String, Value>>,
    pub scope_name: String,
}

/// Group weights and score cut points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    pub group_weights: BTreeMap<String, f64>,
    pub score_thresholds: ThresholdsConfig,
}

/// Marginal and pass cut points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    pub marginal: f64,
    pub pass: f64,
}

/// Where and when the analysis runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanaryExecutionRequest {
    pub scopes: BTreeMap<String, ScopePair>,
    pub thresholds: ThresholdsConfig,
    pub metadata: Vec<Metadata>,
    pub site_local: Map<String, Value>,
}

/// Free-form execution metadata entry (unused by ad-hoc requests)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub hidden: bool,
}

/// Control and experiment scopes for one scope name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopePair {
    pub control_scope: CanaryScope,
    pub experiment_scope: CanaryScope,
}

/// One side of a scope pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanaryScope {
    pub scope: String,
    pub location: String,
    #[serde(flatten)]
    pub window: ScopeWindow,
    pub extended_scope_params: BTreeMap<String, String>,
}

/// Resolved query interval, shared by both sides of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Sampling step in seconds
    pub step: u64,
}
