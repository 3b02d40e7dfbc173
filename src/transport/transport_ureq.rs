//! Real HTTP transport using ureq
//!
//! Synchronous blocking HTTP client for the analysis service.

use crate::transport::transport_types::{QueryParams, SyncTransport, TransportError};
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Real HTTP transport using ureq
#[derive(Debug)]
pub struct UreqTransport {
    /// Timeout in seconds for requests
    timeout: u64,
}

impl UreqTransport {
    /// Create new transport with default timeout (30s)
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create transport with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            timeout: timeout_secs,
        }
    }

    fn request(&self, method: &str, url: &str, params: &QueryParams) -> ureq::Request {
        let mut request =
            ureq::request(method, url).timeout(Duration::from_secs(self.timeout));
        for (key, value) in params {
            request = request.query(key, value);
        }
        request
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn read_body(response: ureq::Response) -> Result<String, TransportError> {
    let status = response.status();
    if status >= 400 {
        return Err(TransportError::Http {
            status,
            message: response.status_text().to_string(),
        });
    }
    let mut body = String::new();
    response.into_reader().read_to_string(&mut body)?;
    Ok(body)
}

impl SyncTransport for UreqTransport {
    fn get(&self, url: &str, params: &QueryParams) -> Result<String, TransportError> {
        debug!(url, params = params.len(), timeout_secs = self.timeout, "HTTP GET");
        let response = self.request("GET", url, params).call()?;
        read_body(response)
    }

    fn post_json(
        &self,
        url: &str,
        params: &QueryParams,
        body: &str,
    ) -> Result<String, TransportError> {
        debug!(url, params = params.len(), body_len = body.len(), timeout_secs = self.timeout, "HTTP POST");
        let response = self
            .request("POST", url, params)
            .set("Content-Type", "application/json")
            .send_string(body)?;
        read_body(response)
    }
}
