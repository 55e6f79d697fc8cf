//! Time-boxed page cache injected into the [`Scraper`](super::Scraper)
//!
//! Entries expire on read once their TTL has elapsed. Nothing purges entries
//! proactively, so the map only shrinks when an expired key is read again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Source of the current time, swappable in tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by [`Utc::now`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Cache collaborator used by the fetcher
pub trait PageCache: Send + Sync {
    /// Return the cached body for `key` if it has not expired
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` for `ttl`
    fn put(&self, key: &str, value: String, ttl: Duration);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: DateTime<Utc>,
}

/// In-process cache guarded by a mutex
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl PageCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.body.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: &str, value: String, ttl: Duration) {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());
        let entry = CacheEntry {
            body: value,
            expires_at: self.clock.now() + ttl,
        };
        self.entries.lock().insert(key.to_string(), entry);
    }
}
