//! CLI argument parsing
//!
//! Flags select the request document, the service and its backend accounts,
//! the analysis window and the polling policy. Policy flags can also be set
//! through `CANARY_*` environment variables.

use crate::cli::{Error, Result};
use crate::monitor::config::{
    DEFAULT_POLL_BUDGET, DEFAULT_PROGRESS_EVERY, DEFAULT_SERVICE_URL,
};
use crate::monitor::MonitorConfig;
use crate::transport::transport_ureq::DEFAULT_TIMEOUT_SECS;
use canary_adhoc_core::model::config::DEFAULT_FILENAME;
use canary_adhoc_core::AnalysisWindow;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use clap::Parser;
use std::path::PathBuf;

/// Local-time format accepted for `--t0` / `--t1`
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parsed CLI arguments
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(
    name = "canary-adhoc",
    version,
    about = "Submit an ad-hoc canary analysis and wait for the verdict"
)]
pub struct Args {
    /// Request configuration document
    #[arg(short = 'r', long = "request-config", default_value = DEFAULT_FILENAME)]
    pub request_config: PathBuf,

    /// Canary service URL
    #[arg(short = 'u', long = "url", env = "CANARY_SERVICE_URL", default_value = DEFAULT_SERVICE_URL)]
    pub service_url: String,

    /// Metrics account name
    #[arg(short = 'm', long = "metrics-account", env = "CANARY_METRICS_ACCOUNT")]
    pub metrics_account: Option<String>,

    /// Storage account name
    #[arg(short = 's', long = "storage-account", env = "CANARY_STORAGE_ACCOUNT")]
    pub storage_account: Option<String>,

    /// Analysis start, "yyyy-MM-dd HH:mm:ss" local time or RFC 3339 (default: one hour ago)
    #[arg(long = "t0", visible_alias = "start", value_parser = parse_time)]
    pub start: Option<DateTime<Utc>>,

    /// Analysis end, same formats as --t0 (default: one hour after start)
    #[arg(long = "t1", visible_alias = "end", value_parser = parse_time)]
    pub end: Option<DateTime<Utc>>,

    /// Print the request body and the passed/failed metric breakdown
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Seconds to sleep between status polls
    #[arg(long, env = "CANARY_POLL_INTERVAL_SECS", default_value_t = 1)]
    pub poll_interval_secs: u64,

    /// Status polls before giving up (a count, not seconds)
    #[arg(long, env = "CANARY_POLL_BUDGET", default_value_t = DEFAULT_POLL_BUDGET)]
    pub poll_budget: u64,

    /// Print a progress dot every this many polls (0 disables)
    #[arg(long, env = "CANARY_PROGRESS_EVERY", default_value_t = DEFAULT_PROGRESS_EVERY)]
    pub progress_every: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "CANARY_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

/// Parse CLI arguments (first item is the program name)
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    Args::try_parse_from(args).map_err(|e| Error::InvalidArgs(e.to_string()))
}

/// Parse a `--t0` / `--t1` value
pub fn parse_time(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|e| format!("expected \"yyyy-MM-dd HH:mm:ss\" or RFC 3339 ({})", e))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("{} does not exist in the local time zone", value))
}

impl Args {
    /// Resolve the analysis window, filling defaults relative to `now`
    pub fn window(&self, now: DateTime<Utc>) -> AnalysisWindow {
        let start = self.start.unwrap_or(now - Duration::hours(1));
        let end = self.end.unwrap_or(start + Duration::hours(1));
        AnalysisWindow::new(start, end)
    }

    /// Monitor configuration from the service and polling flags
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig::new(self.service_url.clone())
            .with_accounts(self.metrics_account.clone(), self.storage_account.clone())
            .with_polling(
                std::time::Duration::from_secs(self.poll_interval_secs),
                self.poll_budget,
                self.progress_every,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        parse_args(
            std::iter::once("canary-adhoc")
                .chain(args.iter().copied())
                .map(str::to_string),
        )
    }

    #[test]
    fn test_parse_empty_args() {
        let parsed = parse(&[]).unwrap();
        assert_eq!(parsed.request_config, PathBuf::from(DEFAULT_FILENAME));
        assert!(!parsed.verbose);
        assert!(parsed.start.is_none());
        assert!(parsed.end.is_none());
    }

    #[test]
    fn test_parse_short_flags() {
        let parsed = parse(&[
            "-r", "req.json", "-u", "http://kayenta:8090/canary", "-m", "prom", "-s", "gcs", "-v",
        ])
        .unwrap();
        assert_eq!(parsed.request_config, PathBuf::from("req.json"));
        assert_eq!(parsed.service_url, "http://kayenta:8090/canary");
        assert_eq!(parsed.metrics_account.as_deref(), Some("prom"));
        assert_eq!(parsed.storage_account.as_deref(), Some("gcs"));
        assert!(parsed.verbose);
    }

    #[test]
    fn test_parse_rfc3339_times() {
        let parsed = parse(&[
            "--t0",
            "2024-05-01T12:00:00Z",
            "--end",
            "2024-05-01T14:30:00+02:00",
        ])
        .unwrap();
        assert_eq!(
            parsed.start,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(
            parsed.end,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_local_time() {
        let instant = parse_time("2024-05-01 12:00:00").unwrap();
        let expected = Local
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(instant, expected);
    }

    #[test]
    fn test_parse_bad_time() {
        assert!(parse_time("yesterday").is_err());
        assert!(matches!(parse(&["--t0", "01/05/2024"]), Err(Error::InvalidArgs(_))));
    }

    #[test]
    fn test_unknown_option() {
        assert!(parse(&["--no-such-flag"]).is_err());
    }

    #[test]
    fn test_window_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let window = parse(&[]).unwrap().window(now);
        assert_eq!(window.start, now - Duration::hours(1));
        assert_eq!(window.end, now);

        let start = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let window = parse(&["--t0", "2024-04-01T00:00:00Z"]).unwrap().window(now);
        assert_eq!(window.start, start);
        assert_eq!(window.end, start + Duration::hours(1));
    }

    #[test]
    fn test_monitor_config_from_flags() {
        let parsed = parse(&[
            "--poll-interval-secs",
            "2",
            "--poll-budget",
            "10",
            "--progress-every",
            "0",
            "-m",
            "",
        ])
        .unwrap();
        let config = parsed.monitor_config();
        assert_eq!(config.poll_interval, std::time::Duration::from_secs(2));
        assert_eq!(config.poll_budget, 10);
        assert_eq!(config.progress_every, 0);
        assert_eq!(config.metrics_account, None);
    }
}
