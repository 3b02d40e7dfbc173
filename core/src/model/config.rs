//! Ad-hoc request configuration document
//!
//! The document is authored by hand, so most sections are optional at parse
//! time; the assembler enforces what it actually needs.

use crate::error::AssemblyError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Default location of the request configuration document
pub const DEFAULT_FILENAME: &str = "./adhoc-request.json";

/// User-authored ad-hoc request document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdhocConfig {
    /// Canary config name
    #[serde(default)]
    pub name: Option<String>,
    /// Scope name, also used as the application name
    #[serde(default)]
    pub scope_name: String,
    /// Judge implementation name
    pub judge: String,
    /// Named metric filter templates
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
    /// Group weights and score thresholds
    #[serde(default)]
    pub classifier: ClassifierSection,
    /// Overall request thresholds ("marginal", "pass")
    #[serde(default)]
    pub request_thresholds: BTreeMap<String, f64>,
    /// Baseline scope
    pub control_scope: ScopeSection,
    /// Candidate scope
    pub experiment_scope: ScopeSection,
    /// Metric groups, in rendering order
    #[serde(default)]
    pub metric_groups: Vec<MetricGroup>,
}

/// Classifier section of the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierSection {
    #[serde(default)]
    pub group_weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub score_thresholds: BTreeMap<String, f64>,
}

/// One side of the scope pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSection {
    pub location: String,
    #[serde(default)]
    pub extended_scope_params: BTreeMap<String, String>,
}

/// A named group of metrics sharing one metrics backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricGroup {
    pub group_name: String,
    pub service_type: String,
    #[serde(default)]
    pub custom_filter: Option<String>,
    #[serde(default)]
    pub custom_filter_template: Option<String>,
    #[serde(default)]
    pub group_by_fields: Option<Vec<String>>,
    #[serde(default)]
    pub metric_names: Vec<String>,
    /// Per-metric analysis configuration, passed through opaquely
    #[serde(default)]
    pub analysis_configurations: BTreeMap<String, Map<String, Value>>,
}

impl AdhocConfig {
    /// Read and parse a configuration document from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AssemblyError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| AssemblyError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "read adhoc request configuration");
        Self::from_json_str(&content)
    }

    /// Parse a configuration document from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, AssemblyError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Total number of metrics across all groups
    pub fn metric_count(&self) -> usize {
        self.metric_groups.iter().map(|g| g.metric_names.len()).sum()
    }
}
