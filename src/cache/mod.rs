//! Short-lived in-memory caches
//!
//! A [`TtlCache`] holds a single value and the time it was stored. The clock is
//! injected so expiry can be driven explicitly in tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: parking_lot::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: parking_lot::Mutex::new(Utc::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Cached value plus the time it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub fetched_at: DateTime<Utc>,
}

/// Single-slot cache that expires after a fixed TTL
pub struct TtlCache<T> {
    entry: RwLock<Option<CacheEntry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        TtlCache {
            entry: RwLock::new(None),
            ttl,
            clock,
        }
    }

    /// Build with a TTL given in seconds
    pub fn with_ttl_secs(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        let ttl = Duration::seconds(i64::from(u32::try_from(ttl_secs).unwrap_or(u32::MAX)));
        Self::new(ttl, clock)
    }

    /// Fresh entry, if one is stored and younger than the TTL
    pub fn get(&self) -> Option<CacheEntry<T>> {
        let guard = self.entry.read();
        let entry = guard.as_ref()?;
        (self.clock.now() - entry.fetched_at < self.ttl).then(|| entry.clone())
    }

    /// Store a value, replacing whatever was there
    pub fn put(&self, payload: T) -> CacheEntry<T> {
        let entry = CacheEntry {
            payload,
            fetched_at: self.clock.now(),
        };
        *self.entry.write() = Some(entry.clone());
        entry
    }

    /// Clear the entry only while it still holds `stale`
    pub fn invalidate_if(&self, stale: &T) -> bool
    where
        T: PartialEq,
    {
        let mut guard = self.entry.write();
        if guard.as_ref().is_some_and(|entry| entry.payload == *stale) {
            *guard = None;
            true
        } else {
            false
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.get().is_some()
    }
}
