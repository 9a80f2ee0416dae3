//! Opt-in response cache for deterministic generation calls.
//!
//! [`ResponseCache`] memoizes temperature-zero model calls, which are
//! reproducible by contract (same input → same output). Non-zero
//! temperatures are never cached or served from cache — randomness makes
//! the result unrepeatable, so a stored value would be misleading.
//!
//! # Architecture
//!
//! The cache sits in [`Gateway`](crate::gateway::Gateway), above the
//! provider dispatch. A cache hit bypasses the network call and its
//! metrics entirely; hit/miss counters are emitted separately.
//!
//! Entries expire lazily: an expired entry is deleted on the read that
//! discovers it. When the cache is at capacity, `set` evicts exactly the
//! single entry with the oldest insertion time (linear scan — fine at the
//! default size of 1000, deliberately not an LRU).
//!
//! Time is read through `tokio::time::Instant`, so tests drive expiry
//! deterministically with `#[tokio::test(start_paused = true)]` and
//! `tokio::time::advance` instead of sleeping.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::telemetry;
use crate::types::{Message, Schema};

/// Configuration for the response cache.
///
/// ```rust
/// # use huginn::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_size(500)
///     .max_age(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Whether the cache reads and writes at all. Default: true.
    pub enabled: bool,
    /// Entry time-to-live. Default: 1 hour.
    pub max_age: Duration,
    /// Maximum number of entries before oldest-first eviction. Default: 1000.
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age: Duration::from_secs(3600),
            max_size: 1000,
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with both read and write paths disabled.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Enable or disable the cache.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the entry time-to-live.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set the maximum number of entries.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}

struct CacheEntry {
    inserted_at: Instant,
    value: Value,
}

/// In-memory cache for deterministic generation results.
///
/// Keyed on a content hash of (messages, temperature, schema) after
/// canonical key-sorting, so semantically identical requests hit the same
/// entry regardless of key declaration order. Safe for concurrent use.
pub struct ResponseCache {
    config: CacheConfig,
    entries: Mutex<HashMap<u64, CacheEntry>>,
}

impl ResponseCache {
    /// Create a new response cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a cached result.
    ///
    /// Returns `None` when disabled, when the request is non-deterministic
    /// (temperature != 0), on absence, or on expiry. An expired entry is
    /// deleted by the read that discovers it.
    pub fn get(&self, messages: &[Message], temperature: f32, schema: Option<&Schema>) -> Option<Value> {
        if !self.config.enabled || temperature != 0.0 {
            return None;
        }
        let key = cache_key(messages, temperature, schema);
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() <= self.config.max_age => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(&key);
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Store a result.
    ///
    /// No-op when disabled or when the request is non-deterministic. At
    /// capacity, evicts the single oldest entry before inserting, so the
    /// entry count never exceeds `max_size` once `set` returns.
    pub fn set(
        &self,
        messages: &[Message],
        temperature: f32,
        value: Value,
        schema: Option<&Schema>,
    ) {
        if !self.config.enabled || temperature != 0.0 {
            return;
        }
        let key = cache_key(messages, temperature, schema);
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        if !entries.contains_key(&key) && entries.len() >= self.config.max_size {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| *k);
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                value,
            },
        );
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }

    /// Current entry count.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute a cache key from messages, temperature, and optional schema.
///
/// Messages are reduced to role + content; the schema is rendered through
/// [`Schema::to_json_schema`] and serialized with recursively sorted keys,
/// so key declaration order never affects the resulting hash.
///
/// Uses `DefaultHasher` (SipHash), deterministic within a process lifetime —
/// sufficient for an in-memory cache.
fn cache_key(messages: &[Message], temperature: f32, schema: Option<&Schema>) -> u64 {
    let mut hasher = DefaultHasher::new();
    for message in messages {
        let role = match message.role {
            crate::types::Role::System => "system",
            crate::types::Role::User => "user",
            crate::types::Role::Assistant => "assistant",
        };
        role.hash(&mut hasher);
        message.content.hash(&mut hasher);
    }
    temperature.to_bits().hash(&mut hasher);
    if let Some(schema) = schema {
        let mut rendered = String::new();
        write_canonical(&schema.to_json_schema(), &mut rendered);
        rendered.hash(&mut hasher);
    }
    hasher.finish()
}

/// Serialize a JSON value with object keys recursively sorted.
///
/// Independent of serde_json's map ordering, so the key stays stable even
/// if a `preserve_order` feature is enabled transitively.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            out.push('{');
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key).unwrap_or_default());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}
