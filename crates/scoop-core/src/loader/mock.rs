//! Mock loader for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{FetchFuture, RemoteLoader};
use crate::LoadError;
use crate::flavor::RawRecord;

/// A configurable mock response for [`MockLoader`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Simulate a successful fetch.
    Records(Vec<RawRecord>),
    /// Simulate a network/HTTP failure.
    Transport(String),
    /// Simulate a payload that is not a list of mappings.
    Decode(String),
}

impl MockResponse {
    /// Records built from `name` values only.
    pub fn names(names: &[&str]) -> Self {
        MockResponse::Records(
            names
                .iter()
                .map(|n| RawRecord::from([("name".to_string(), n.to_string())]))
                .collect(),
        )
    }

    fn into_result(self) -> Result<Vec<RawRecord>, LoadError> {
        match self {
            MockResponse::Records(records) => Ok(records),
            MockResponse::Transport(msg) => Err(LoadError::Transport(msg)),
            MockResponse::Decode(msg) => Err(LoadError::Decode(msg)),
        }
    }
}

/// A hand-rolled mock implementing [`RemoteLoader`] for tests.
///
/// Returns responses in order, repeating the last one once the sequence is
/// exhausted. Supports per-call latency and call counting.
pub struct MockLoader {
    /// Reversed so the next response can be popped.
    responses: Mutex<Vec<MockResponse>>,
    fallback: MockResponse,
    delay: Option<Duration>,
    call_count: AtomicUsize,
}

impl MockLoader {
    /// Create a mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self::with_sequence(vec![response])
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        let fallback = responses
            .last()
            .cloned()
            .unwrap_or(MockResponse::Records(Vec::new()));
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            fallback,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Set simulated network latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `fetch()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> MockResponse {
        let mut seq = match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        seq.pop().unwrap_or_else(|| self.fallback.clone())
    }
}

impl RemoteLoader for MockLoader {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch<'a>(&'a self, _source: &'a str) -> FetchFuture<'a> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let response = self.next_response();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            response.into_result()
        })
    }
}
