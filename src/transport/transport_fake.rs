//! Fake transport for testing
//!
//! Replays scripted responses instead of making HTTP calls, and records every
//! call so tests can assert on URLs and parameters.

use crate::transport::transport_types::{QueryParams, SyncTransport, TransportError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One call made through the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub params: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl RecordedCall {
    /// Value of a query parameter, if it was sent
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Fake transport for testing (uses fixture strings)
///
/// POST and GET draw from separate queues. When a GET queue runs dry the
/// last GET response repeats, which models a job that never finishes.
#[derive(Debug, Default)]
pub struct FakeTransport {
    post_responses: Mutex<VecDeque<Result<String, TransportError>>>,
    get_responses: Mutex<VecDeque<Result<String, TransportError>>>,
    last_get: Mutex<Option<Result<String, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTransport {
    /// Create fake transport with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a POST response body
    pub fn with_post(self, body: &str) -> Self {
        self.push_post(Ok(body.to_string()));
        self
    }

    /// Queue a POST failure
    pub fn with_post_error(self, err: TransportError) -> Self {
        self.push_post(Err(err));
        self
    }

    /// Queue a GET response body
    pub fn with_get(self, body: &str) -> Self {
        self.push_get(Ok(body.to_string()));
        self
    }

    /// Queue a GET failure
    pub fn with_get_error(self, err: TransportError) -> Self {
        self.push_get(Err(err));
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of GET calls made so far
    pub fn get_count(&self) -> usize {
        lock(&self.calls).iter().filter(|c| c.method == "GET").count()
    }

    fn push_post(&self, response: Result<String, TransportError>) {
        lock(&self.post_responses).push_back(response);
    }

    fn push_get(&self, response: Result<String, TransportError>) {
        lock(&self.get_responses).push_back(response);
    }

    fn record(&self, method: &'static str, url: &str, params: &QueryParams, body: Option<&str>) {
        lock(&self.calls).push(RecordedCall {
            method,
            url: url.to_string(),
            params: params.to_vec(),
            body: body.map(str::to_string),
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SyncTransport for FakeTransport {
    fn get(&self, url: &str, params: &QueryParams) -> Result<String, TransportError> {
        self.record("GET", url, params, None);
        let next = lock(&self.get_responses).pop_front();
        let mut last = lock(&self.last_get);
        match next {
            Some(response) => {
                *last = Some(response.clone());
                response
            }
            None => last.clone().unwrap_or_else(|| {
                Err(TransportError::Network("no scripted GET response".to_string()))
            }),
        }
    }

    fn post_json(
        &self,
        url: &str,
        params: &QueryParams,
        body: &str,
    ) -> Result<String, TransportError> {
        self.record("POST", url, params, Some(body));
        lock(&self.post_responses).pop_front().unwrap_or_else(|| {
            Err(TransportError::Network("no scripted POST response".to_string()))
        })
    }
}
