//! Transport types
//!
//! Common types shared across transport implementations.

/// Ordered query parameters; names are fixed by the service API
pub type QueryParams = [(&'static str, String)];

/// Transport errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Network error (connection refused, DNS, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP error (non-2xx status)
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// IO error while reading the response body
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => TransportError::Http {
                status: code,
                message: response.status_text().to_string(),
            },
            ureq::Error::Transport(err) => TransportError::Network(err.to_string()),
        }
    }
}

/// Synchronous HTTP transport
///
/// Abstraction over the HTTP client so the monitor can be driven by
/// `FakeTransport` in tests. Both calls block until the full response body
/// has been read.
pub trait SyncTransport: Send + Sync {
    /// GET `url` with query parameters and return the response body
    fn get(&self, url: &str, params: &QueryParams) -> Result<String, TransportError>;

    /// POST a JSON body to `url` with query parameters and return the response body
    fn post_json(
        &self,
        url: &str,
        params: &QueryParams,
        body: &str,
    ) -> Result<String, TransportError>;
}
