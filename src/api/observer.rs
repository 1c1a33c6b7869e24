//! Request logging hook
//!
//! Every call made through [`super::ApiClient`] is reported to a
//! [`RequestObserver`] once it finishes.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::Method;

/// How the response cache took part in a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the cache, no network call
    Hit,
    /// Cacheable but not cached yet
    Miss,
    /// Not cacheable, or caching disabled
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Bypass => "bypass",
        }
    }
}

/// A completed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEvent {
    pub method: Method,
    pub path: String,
    pub elapsed: Duration,
    pub cache: CacheStatus,
    /// Upstream status of the final attempt, if a response was received
    pub status: Option<u16>,
    /// Whether the call went through the 401 recovery cycle
    pub retried: bool,
}

pub trait RequestObserver: Send + Sync {
    fn on_request(&self, event: &RequestEvent);
}

/// Writes one `tracing` event per call
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, event: &RequestEvent) {
        tracing::info!(
            method = %event.method,
            path = %event.path,
            latency_ms = event.elapsed.as_millis() as u64,
            cache = event.cache.as_str(),
            status = event.status,
            retried = event.retried,
            "api call"
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RequestObserver for NoopObserver {
    fn on_request(&self, _event: &RequestEvent) {}
}

/// Keeps every event in memory, for inspecting calls in tests
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RequestEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RequestEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Number of recorded events with the given cache status
    pub fn count(&self, cache: CacheStatus) -> usize {
        self.events().iter().filter(|e| e.cache == cache).count()
    }
}

impl RequestObserver for RecordingObserver {
    fn on_request(&self, event: &RequestEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
