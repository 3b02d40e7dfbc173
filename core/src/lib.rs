//! Canary Adhoc Core
//!
//! Turns a loosely-typed ad-hoc request document into a submittable canary
//! execution request, and classifies the judge's per-metric results once the
//! remote analysis finishes. Nothing in this crate touches the network.

pub mod assembler;
pub mod classifier;
pub mod error;
pub mod model;
pub mod providers;

pub use assembler::{AnalysisWindow, RequestAssembler, SAMPLING_STEP_SECS};
pub use classifier::{partition, Partition, PASS_LABEL};
pub use error::{AssemblyError, RegistryError};
pub use model::config::AdhocConfig;
pub use model::request::ExecutionRequest;
pub use model::status::{AnalysisResult, ExecutionStatus};
pub use providers::{MetricProviderRegistry, MetricQuerySpec, ProviderDescriptor};
