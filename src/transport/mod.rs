//! HTTP transport
//!
//! Blocking GET/POST-with-query-parameters capability used by the execution
//! monitor. `UreqTransport` talks to the network; `FakeTransport` replays
//! scripted responses in tests.

pub mod transport_fake;
pub mod transport_types;
pub mod transport_ureq;

pub use transport_fake::{FakeTransport, RecordedCall};
pub use transport_types::{QueryParams, SyncTransport, TransportError};
pub use transport_ureq::UreqTransport;

/// Concrete transport enum
///
/// Wraps all transport types so callers can pick one at runtime without
/// boxing.
#[derive(Debug)]
pub enum Transport {
    Real(UreqTransport),
    Fake(FakeTransport),
}

impl SyncTransport for Transport {
    fn get(&self, url: &str, params: &QueryParams) -> Result<String, TransportError> {
        match self {
            Transport::Real(t) => t.get(url, params),
            Transport::Fake(t) => t.get(url, params),
        }
    }

    fn post_json(
        &self,
        url: &str,
        params: &QueryParams,
        body: &str,
    ) -> Result<String, TransportError> {
        match self {
            Transport::Real(t) => t.post_json(url, params, body),
            Transport::Fake(t) => t.post_json(url, params, body),
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Real(UreqTransport::new())
    }
}
