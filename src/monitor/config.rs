//! Monitor configuration
//!
//! Service location, backend account selection and polling policy.

use crate::monitor::JobId;
use std::time::Duration;

/// Service URL used when none is given
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8090/canary";

/// Sleep between status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll attempts before giving up
pub const DEFAULT_POLL_BUDGET: u64 = 300;

/// Ticks between progress signals
pub const DEFAULT_PROGRESS_EVERY: u64 = 5;

/// Execution monitor configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Ad-hoc submission endpoint; status lives at `<service_url>/<jobId>`
    pub service_url: String,
    /// Metrics backend account (`metricsAccountName`)
    pub metrics_account: Option<String>,
    /// Storage account (`storageAccountName`)
    pub storage_account: Option<String>,
    pub poll_interval: Duration,
    /// Maximum number of status polls
    pub poll_budget: u64,
    /// Signal progress every this many ticks; 0 disables progress signals
    pub progress_every: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            metrics_account: None,
            storage_account: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_budget: DEFAULT_POLL_BUDGET,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

impl MonitorConfig {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            ..Self::default()
        }
    }

    /// Set backend accounts; empty names count as unset
    pub fn with_accounts(
        mut self,
        metrics_account: Option<String>,
        storage_account: Option<String>,
    ) -> Self {
        self.metrics_account = non_empty(metrics_account);
        self.storage_account = non_empty(storage_account);
        self
    }

    pub fn with_polling(mut self, interval: Duration, budget: u64, progress_every: u64) -> Self {
        self.poll_interval = interval;
        self.poll_budget = budget;
        self.progress_every = progress_every;
        self
    }

    /// Status endpoint for a job
    pub fn status_url(&self, job: &JobId) -> String {
        format!("{}/{}", self.service_url.trim_end_matches('/'), job)
    }

    /// Query parameters for the submission POST
    pub(crate) fn submit_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(account) = &self.metrics_account {
            params.push(("metricsAccountName", account.clone()));
        }
        if let Some(account) = &self.storage_account {
            params.push(("storageAccountName", account.clone()));
        }
        params
    }

    /// Query parameters for a status GET
    pub(crate) fn status_params(&self, job: &JobId) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(account) = &self.storage_account {
            params.push(("storageAccountName", account.clone()));
        }
        params.push(("canaryExecutionId", job.to_string()));
        params
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
