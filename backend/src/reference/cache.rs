//! TTL cache for reference data
//!
//! Reference records (cultivar profiles, phenology, regions) change on
//! the order of seasons, so the resolver caches them. The clock is a
//! constructor parameter rather than a call to the system time, which
//! lets tests drive expiry deterministically.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Production clock backed by the system monotonic clock
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A small TTL-expiring key/value cache.
///
/// Entries expire `ttl` after insertion; an expired entry reads as a
/// miss and is evicted on the next lookup of its key.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, (V, Instant)>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().ok()?;
        let now = self.clock.now();
        match entries.get(key) {
            Some((_, inserted_at)) if now.duration_since(*inserted_at) >= self.ttl => {
                entries.remove(key);
                None
            }
            Some((value, _)) => Some(value.clone()),
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        if let Ok(mut entries) = self.entries.lock() {
            let now = self.clock.now();
            entries.insert(key, (value, now));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Test clock advanced by hand
    struct ManualClock {
        origin: Instant,
        elapsed: StdMutex<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                origin: Instant::now(),
                elapsed: StdMutex::new(Duration::ZERO),
            }
        }

        fn advance(&self, by: Duration) {
            *self.elapsed.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.origin + *self.elapsed.lock().unwrap()
        }
    }

    #[test]
    fn entries_survive_within_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<String, i32> =
            TtlCache::new(clock.clone(), Duration::from_secs(60));

        cache.insert("navel".to_string(), 42);
        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get(&"navel".to_string()), Some(42));
    }

    #[test]
    fn entries_expire_at_exactly_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<String, i32> =
            TtlCache::new(clock.clone(), Duration::from_secs(60));

        cache.insert("navel".to_string(), 42);
        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.get(&"navel".to_string()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn reinsert_resets_the_clock() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<String, i32> =
            TtlCache::new(clock.clone(), Duration::from_secs(60));

        cache.insert("navel".to_string(), 1);
        clock.advance(Duration::from_secs(45));
        cache.insert("navel".to_string(), 2);
        clock.advance(Duration::from_secs(45));
        assert_eq!(cache.get(&"navel".to_string()), Some(2));
    }
}
