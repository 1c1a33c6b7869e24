//! In-memory TTL cache for API responses
//!
//! Provides a `TtlCache` that keeps values with a per-entry expiry instant.
//! Expired entries are evicted lazily when they are read; there is no
//! background sweep.

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// A cached value together with the instant it stops being valid
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// When the cache entry expires; `None` when the TTL does not fit in an
    /// `Instant`
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Thread-safe key/value store with per-entry time-to-live
///
/// Mutation goes through `set`, `delete` and `clear`, plus the eviction
/// performed by `get`.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Creates an empty cache whose entries live for `default_ttl` unless
    /// overridden in `set_with_ttl`.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Returns the TTL applied by `set`
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Reads a value from the cache
    ///
    /// Returns `None` if the key is missing or the entry has expired. An
    /// expired entry is removed as part of the read.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }
        // The read guard must be released before removing.
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    /// Stores a value using the default TTL
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Stores a value with an explicit TTL
    ///
    /// # Arguments
    /// * `key` - Cache key, usually built with [`make_key`]
    /// * `value` - The value to cache
    /// * `ttl` - How long the entry should be returned by `get`
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now().checked_add(ttl),
        };
        self.entries.insert(key.into(), entry);
    }

    /// Removes an entry, returning whether one was present
    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Removes every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds a deterministic cache key from an endpoint and its parameters
///
/// Parameters are sorted by name (then value) before being joined, so two
/// requests with the same parameters in a different order share a key.
/// Names and values are percent-encoded, so `&` or `=` inside a value cannot
/// collide with the separators. Without parameters the key is the endpoint
/// itself.
///
/// # Examples
/// `make_key("/rooms", &[("b", "2"), ("a", "1")])` yields `/rooms?a=1&b=2`.
pub fn make_key<K, V>(endpoint: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return endpoint.to_string();
    }

    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_ref()))
        .collect();
    pairs.sort_unstable();

    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", endpoint, query)
}
