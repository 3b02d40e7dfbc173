//! Metric Provider Registry
//!
//! Maps a metric group's service type onto the query schema its metrics
//! backend expects. The set of backends is closed per build and listed in
//! [`KNOWN_PROVIDERS`]; each entry carries the factory that builds its
//! [`MetricQuerySpec`] variant, so assembly never branches on backend.
//!
//! Discovery validates the table once, on first use, and the result is
//! cached for the registry's lifetime.

use crate::error::RegistryError;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Backend-specific query for a single metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetricQuerySpec {
    Datadog(DatadogQuery),
    Prometheus(PrometheusQuery),
    Stackdriver(StackdriverQuery),
}

impl MetricQuerySpec {
    /// Registry key of the variant
    pub fn service_type(&self) -> &'static str {
        match self {
            MetricQuerySpec::Datadog(_) => "datadog",
            MetricQuerySpec::Prometheus(_) => "prometheus",
            MetricQuerySpec::Stackdriver(_) => "stackdriver",
        }
    }

    /// Metric the query selects
    pub fn metric_name(&self) -> &str {
        match self {
            MetricQuerySpec::Datadog(q) => &q.metric_name,
            MetricQuerySpec::Prometheus(q) => &q.metric_name,
            MetricQuerySpec::Stackdriver(q) => &q.metric_type,
        }
    }
}

/// Datadog query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatadogQuery {
    pub metric_name: String,
}

/// Prometheus query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusQuery {
    pub metric_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_filter_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by_fields: Option<Vec<String>>,
}

/// Stackdriver query; the metric name is the Stackdriver metric type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackdriverQuery {
    pub metric_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_filter_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by_fields: Option<Vec<String>>,
}

/// Optional fields a query schema may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryField {
    CustomFilter,
    CustomFilterTemplate,
    GroupByFields,
}

/// Everything a factory may copy into a query
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricQueryInputs<'a> {
    pub metric_name: &'a str,
    pub custom_filter: Option<&'a str>,
    pub custom_filter_template: Option<&'a str>,
    pub group_by_fields: Option<&'a [String]>,
}

/// Query schema registration: name key, declared fields, and factory
#[derive(Debug, Clone, Copy)]
pub struct ProviderDescriptor {
    /// Service type key the schema is registered under
    pub service_type: &'static str,
    /// Schema name, for diagnostics
    pub schema: &'static str,
    /// Optional fields the schema carries besides the metric name
    pub declared_fields: &'static [QueryField],
    /// Builds the schema's query variant
    pub build: fn(&MetricQueryInputs<'_>) -> MetricQuerySpec,
}

impl ProviderDescriptor {
    pub fn declares(&self, field: QueryField) -> bool {
        self.declared_fields.contains(&field)
    }

    /// Build the query for one metric
    ///
    /// Inputs for fields the schema does not declare never reach the factory.
    pub fn build_query(&self, inputs: &MetricQueryInputs<'_>) -> MetricQuerySpec {
        let declared = MetricQueryInputs {
            metric_name: inputs.metric_name,
            custom_filter: inputs
                .custom_filter
                .filter(|_| self.declares(QueryField::CustomFilter)),
            custom_filter_template: inputs
                .custom_filter_template
                .filter(|_| self.declares(QueryField::CustomFilterTemplate)),
            group_by_fields: inputs
                .group_by_fields
                .filter(|_| self.declares(QueryField::GroupByFields)),
        };
        (self.build)(&declared)
    }
}

const FILTERED_FIELDS: &[QueryField] = &[
    QueryField::CustomFilter,
    QueryField::CustomFilterTemplate,
    QueryField::GroupByFields,
];

fn build_datadog(inputs: &MetricQueryInputs<'_>) -> MetricQuerySpec {
    MetricQuerySpec::Datadog(DatadogQuery {
        metric_name: inputs.metric_name.to_string(),
    })
}

fn build_prometheus(inputs: &MetricQueryInputs<'_>) -> MetricQuerySpec {
    MetricQuerySpec::Prometheus(PrometheusQuery {
        metric_name: inputs.metric_name.to_string(),
        custom_filter: inputs.custom_filter.map(str::to_string),
        custom_filter_template: inputs.custom_filter_template.map(str::to_string),
        group_by_fields: inputs.group_by_fields.map(<[String]>::to_vec),
    })
}

fn build_stackdriver(inputs: &MetricQueryInputs<'_>) -> MetricQuerySpec {
    MetricQuerySpec::Stackdriver(StackdriverQuery {
        metric_type: inputs.metric_name.to_string(),
        custom_filter: inputs.custom_filter.map(str::to_string),
        custom_filter_template: inputs.custom_filter_template.map(str::to_string),
        group_by_fields: inputs.group_by_fields.map(<[String]>::to_vec),
    })
}

/// Every query schema this build supports
pub const KNOWN_PROVIDERS: &[ProviderDescriptor] = &[
    ProviderDescriptor {
        service_type: "datadog",
        schema: "DatadogQuery",
        declared_fields: &[],
        build: build_datadog,
    },
    ProviderDescriptor {
        service_type: "prometheus",
        schema: "PrometheusQuery",
        declared_fields: FILTERED_FIELDS,
        build: build_prometheus,
    },
    ProviderDescriptor {
        service_type: "stackdriver",
        schema: "StackdriverQuery",
        declared_fields: FILTERED_FIELDS,
        build: build_stackdriver,
    },
];

/// Service type → query schema table, discovered lazily
#[derive(Debug)]
pub struct MetricProviderRegistry {
    descriptors: Vec<ProviderDescriptor>,
    table: OnceCell<HashMap<&'static str, ProviderDescriptor>>,
}

impl MetricProviderRegistry {
    /// Registry over [`KNOWN_PROVIDERS`]
    pub fn new() -> Self {
        Self::with_descriptors(KNOWN_PROVIDERS.to_vec())
    }

    /// Registry over an explicit descriptor list
    pub fn with_descriptors(descriptors: Vec<ProviderDescriptor>) -> Self {
        Self {
            descriptors,
            table: OnceCell::new(),
        }
    }

    /// Run discovery now instead of on first resolution
    pub fn ensure_discovered(&self) -> Result<(), RegistryError> {
        self.table().map(|_| ())
    }

    /// Look up the query schema for a service type
    pub fn resolve(&self, service_type: &str) -> Result<&ProviderDescriptor, RegistryError> {
        self.table()?
            .get(service_type)
            .ok_or_else(|| RegistryError::UnknownServiceType(service_type.to_string()))
    }

    /// Registered service types, sorted
    pub fn service_types(&self) -> Result<Vec<&'static str>, RegistryError> {
        let mut keys: Vec<_> = self.table()?.keys().copied().collect();
        keys.sort_unstable();
        Ok(keys)
    }

    fn table(&self) -> Result<&HashMap<&'static str, ProviderDescriptor>, RegistryError> {
        self.table.get_or_try_init(|| discover(&self.descriptors))
    }
}

impl Default for MetricProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn discover(
    descriptors: &[ProviderDescriptor],
) -> Result<HashMap<&'static str, ProviderDescriptor>, RegistryError> {
    let mut table = HashMap::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if descriptor.service_type.trim().is_empty() {
            return Err(RegistryError::InvalidSubtypeConfiguration(format!(
                "Subtype {} does not declare a service type name",
                descriptor.schema
            )));
        }
        if let Some(existing) = table.insert(descriptor.service_type, *descriptor) {
            return Err(RegistryError::InvalidSubtypeConfiguration(format!(
                "Subtypes {} and {} both declare service type '{}'",
                existing.schema, descriptor.schema, descriptor.service_type
            )));
        }
    }
    debug!(providers = table.len(), "discovered metric query schemas");
    Ok(table)
}
