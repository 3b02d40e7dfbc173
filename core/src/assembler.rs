//! Request Assembler
//!
//! Builds an [`ExecutionRequest`] from an [`AdhocConfig`] and an analysis
//! window. Any failure aborts assembly; no partial request is returned.

use crate::error::AssemblyError;
use crate::model::config::{AdhocConfig, MetricGroup, ScopeSection};
use crate::model::request::{
    CanaryConfig, CanaryExecutionRequest, CanaryScope, ClassifierConfig, ExecutionRequest,
    JudgeConfig, MetricConfig, ScopePair, ScopeWindow, ThresholdsConfig,
};
use crate::providers::{MetricProviderRegistry, MetricQueryInputs};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Map;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Sampling step shared by both scopes, in seconds
pub const SAMPLING_STEP_SECS: u64 = 60;

/// Analysis interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AnalysisWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window from epoch milliseconds; `None` if either is out of range
    pub fn from_epoch_millis(start_ms: i64, end_ms: i64) -> Option<Self> {
        let start = Utc.timestamp_millis_opt(start_ms).single()?;
        let end = Utc.timestamp_millis_opt(end_ms).single()?;
        Some(Self { start, end })
    }

    fn scope_window(&self) -> ScopeWindow {
        ScopeWindow {
            start: self.start,
            end: self.end,
            step: SAMPLING_STEP_SECS,
        }
    }
}

/// Assembles execution requests against a metric provider registry
#[derive(Debug, Clone, Copy)]
pub struct RequestAssembler<'r> {
    registry: &'r MetricProviderRegistry,
}

impl<'r> RequestAssembler<'r> {
    pub fn new(registry: &'r MetricProviderRegistry) -> Self {
        Self { registry }
    }

    /// Read the configuration document at `path`, then assemble
    pub fn assemble_from_path<P: AsRef<Path>>(
        &self,
        path: P,
        window: AnalysisWindow,
    ) -> Result<ExecutionRequest, AssemblyError> {
        let config = AdhocConfig::from_path(path)?;
        self.assemble(&config, window)
    }

    /// Assemble, stamping the request with the current time
    pub fn assemble(
        &self,
        config: &AdhocConfig,
        window: AnalysisWindow,
    ) -> Result<ExecutionRequest, AssemblyError> {
        self.assemble_at(config, window, Utc::now())
    }

    /// Assemble, stamping the request with `now`
    pub fn assemble_at(
        &self,
        config: &AdhocConfig,
        window: AnalysisWindow,
        now: DateTime<Utc>,
    ) -> Result<ExecutionRequest, AssemblyError> {
        if config.scope_name.trim().is_empty() {
            return Err(AssemblyError::InvalidConfig(
                "scopeName must not be empty".to_string(),
            ));
        }
        if window.end < window.start {
            return Err(AssemblyError::InvalidWindow {
                start: window.start.to_rfc3339(),
                end: window.end.to_rfc3339(),
            });
        }
        let scope_name = config.scope_name.clone();

        let classifier = ClassifierConfig {
            group_weights: config.classifier.group_weights.clone(),
            score_thresholds: thresholds(
                "classifier.scoreThresholds",
                &config.classifier.score_thresholds,
            )?,
        };

        let mut metrics = Vec::with_capacity(config.metric_count());
        for group in &config.metric_groups {
            self.push_group_metrics(&scope_name, group, &mut metrics)?;
        }

        let (stamp_ms, stamp_iso) = timestamp(now);

        let canary_config = CanaryConfig {
            name: config.name.clone(),
            applications: vec![scope_name.clone()],
            judge: JudgeConfig {
                name: config.judge.clone(),
                judge_configurations: Map::new(),
            },
            metrics,
            templates: config.templates.clone(),
            classifier,
            created_timestamp: stamp_ms,
            created_timestamp_iso: stamp_iso.clone(),
            updated_timestamp: stamp_ms,
            updated_timestamp_iso: stamp_iso,
        };

        let scope_window = window.scope_window();
        let pair = ScopePair {
            control_scope: scope(&scope_name, &config.control_scope, scope_window),
            experiment_scope: scope(&scope_name, &config.experiment_scope, scope_window),
        };
        let mut scopes = BTreeMap::new();
        scopes.insert(scope_name.clone(), pair);

        let execution_request = CanaryExecutionRequest {
            scopes,
            thresholds: thresholds("requestThresholds", &config.request_thresholds)?,
            metadata: Vec::new(),
            site_local: Map::new(),
        };

        info!(
            scope = %scope_name,
            metrics = canary_config.metrics.len(),
            start = %window.start,
            end = %window.end,
            "assembled adhoc execution request"
        );

        Ok(ExecutionRequest {
            canary_config,
            execution_request,
        })
    }

    fn push_group_metrics(
        &self,
        scope_name: &str,
        group: &MetricGroup,
        out: &mut Vec<MetricConfig>,
    ) -> Result<(), AssemblyError> {
        let descriptor = self.registry.resolve(&group.service_type)?;
        for metric_name in &group.metric_names {
            let query = descriptor.build_query(&MetricQueryInputs {
                metric_name,
                custom_filter: group.custom_filter.as_deref(),
                custom_filter_template: group.custom_filter_template.as_deref(),
                group_by_fields: group.group_by_fields.as_deref(),
            });
            debug!(group = %group.group_name, metric = %metric_name, service_type = %group.service_type, "built metric query");
            out.push(MetricConfig {
                name: metric_name.clone(),
                query,
                groups: vec![group.group_name.clone()],
                analysis_configurations: group.analysis_configurations.clone(),
                scope_name: scope_name.to_string(),
            });
        }
        Ok(())
    }
}

fn thresholds(
    section: &'static str,
    values: &BTreeMap<String, f64>,
) -> Result<ThresholdsConfig, AssemblyError> {
    let lookup = |key: &'static str| {
        values
            .get(key)
            .copied()
            .ok_or(AssemblyError::MissingThreshold { section, key })
    };
    Ok(ThresholdsConfig {
        marginal: lookup("marginal")?,
        pass: lookup("pass")?,
    })
}

fn scope(scope_name: &str, section: &ScopeSection, window: ScopeWindow) -> CanaryScope {
    CanaryScope {
        scope: scope_name.to_string(),
        location: section.location.clone(),
        window,
        extended_scope_params: section.extended_scope_params.clone(),
    }
}

/// Epoch millis and ISO-8601 text for one instant, truncated to millis
fn timestamp(now: DateTime<Utc>) -> (i64, String) {
    let millis = now.timestamp_millis();
    let truncated = Utc.timestamp_millis_opt(millis).single().unwrap_or(now);
    (
        millis,
        truncated.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    )
}
