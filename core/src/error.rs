//! Error types for request assembly

use std::path::PathBuf;

/// Metric provider registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No query schema is registered for the service type
    #[error("No metric query schema is registered for service type '{0}'")]
    UnknownServiceType(String),

    /// A registered query schema has no usable name key, or shares one
    #[error("Invalid metric provider configuration: {0}")]
    InvalidSubtypeConfiguration(String),
}

/// Request assembly errors
///
/// Every variant is fatal: assembly never returns a partial request.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// The request configuration document could not be read
    #[error("An exception was encountered reading adhoc request configuration file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request configuration document is not valid JSON for the expected shape
    #[error("Unable to parse adhoc request configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The document parsed but violates a structural invariant
    #[error("Invalid adhoc request configuration: {0}")]
    InvalidConfig(String),

    /// The analysis window ends before it starts
    #[error("Invalid analysis window: end {end} is before start {start}")]
    InvalidWindow { start: String, end: String },

    /// A required threshold cut point is missing
    #[error("Missing required threshold '{key}' in {section}")]
    MissingThreshold {
        section: &'static str,
        key: &'static str,
    },

    /// Service type resolution failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
