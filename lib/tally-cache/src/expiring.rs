/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::hash::Hash;
use std::sync::Mutex;
use std::time::Duration;

use ahash::AHashMap;

use tally_types::ArcClock;

type ComputeFn<K, V, E> = Box<dyn Fn(&K) -> Result<V, E> + Send + Sync>;

struct CacheEntry<V> {
    value: V,
    computed_at: Duration,
}

/// Memoize a function of a key, dropping results older than `ttl`.
///
/// The lock is not held while the function runs, so two callers that
/// miss on the same key at the same time will both compute it, and the
/// later result replaces the earlier one. The function should be free
/// of side effects for this reason.
pub struct ExpiringCache<K, V, E> {
    ttl: Duration,
    clock: ArcClock,
    compute: ComputeFn<K, V, E>,
    entries: Mutex<AHashMap<K, CacheEntry<V>>>,
}

impl<K, V, E> ExpiringCache<K, V, E>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new<F>(ttl: Duration, clock: ArcClock, compute: F) -> Self
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        ExpiringCache {
            ttl,
            clock,
            compute: Box::new(compute),
            entries: Mutex::new(AHashMap::new()),
        }
    }

    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_live(&self, now: Duration, computed_at: Duration) -> bool {
        match now.checked_sub(computed_at) {
            Some(age) => age < self.ttl,
            // clock moved backwards, don't trust this entry
            None => false,
        }
    }

    /// Get the cached value, or compute and store a new one.
    ///
    /// A failed computation is returned as is and nothing is stored.
    pub fn get(&self, key: &K) -> Result<V, E> {
        let now = self.clock.now();
        {
            let entries = self.entries.lock().unwrap();
            if let Some(entry) = entries.get(key) {
                if self.is_live(now, entry.computed_at) {
                    return Ok(entry.value.clone());
                }
            }
        }

        let value = (self.compute)(key)?;
        let entry = CacheEntry {
            value: value.clone(),
            computed_at: self.clock.now(),
        };
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.clone(), entry);
        Ok(value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key).map(|e| e.value)
    }

    /// Drop all entries that are no longer live, returns the removed count.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        let old_len = entries.len();
        entries.retain(|_, e| self.is_live(now, e.computed_at));
        old_len - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tally_types::ManualClock;

    fn counting_cache(
        ttl_ms: u64,
        clock: Arc<ManualClock>,
    ) -> (ExpiringCache<String, String, ()>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let cache = ExpiringCache::new(Duration::from_millis(ttl_ms), clock, move |k: &String| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(k.to_uppercase())
        });
        (cache, calls)
    }

    #[test]
    fn expire() {
        let clock = Arc::new(ManualClock::default());
        let (cache, calls) = counting_cache(100, clock.clone());
        let key = "foo".to_string();

        assert_eq!(cache.get(&key), Ok("FOO".to_string()));
        assert_eq!(calls.load(Ordering::Relaxed), 1);

        assert_eq!(cache.get(&key), Ok("FOO".to_string()));
        assert_eq!(calls.load(Ordering::Relaxed), 1);

        clock.set_millis(200);
        assert_eq!(cache.get(&key), Ok("FOO".to_string()));
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn ttl_boundary() {
        let clock = Arc::new(ManualClock::default());
        let (cache, calls) = counting_cache(100, clock.clone());
        let key = "a".to_string();

        cache.get(&key).unwrap();
        clock.set_millis(99);
        cache.get(&key).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 1);

        clock.set_millis(100);
        cache.get(&key).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn zero_ttl() {
        let clock = Arc::new(ManualClock::default());
        let (cache, calls) = counting_cache(0, clock);
        let key = "a".to_string();
        cache.get(&key).unwrap();
        cache.get(&key).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn error_not_cached() {
        let clock = Arc::new(ManualClock::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let cache: ExpiringCache<u32, u32, String> =
            ExpiringCache::new(Duration::from_secs(60), clock, move |k: &u32| {
                counter.fetch_add(1, Ordering::Relaxed);
                if *k == 0 {
                    Err("zero".to_string())
                } else {
                    Ok(k * 2)
                }
            });

        assert_eq!(cache.get(&0), Err("zero".to_string()));
        assert_eq!(cache.get(&0), Err("zero".to_string()));
        assert_eq!(calls.load(Ordering::Relaxed), 2);
        assert!(cache.is_empty());

        assert_eq!(cache.get(&4), Ok(8));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sweep() {
        let clock = Arc::new(ManualClock::default());
        let (cache, _calls) = counting_cache(100, clock.clone());
        cache.get(&"a".to_string()).unwrap();
        clock.set_millis(50);
        cache.get(&"b".to_string()).unwrap();

        clock.set_millis(120);
        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);

        clock.set_millis(500);
        assert_eq!(cache.sweep(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn remove() {
        let clock = Arc::new(ManualClock::default());
        let (cache, calls) = counting_cache(100, clock);
        let key = "k".to_string();
        cache.get(&key).unwrap();
        assert_eq!(cache.remove(&key), Some("K".to_string()));
        cache.get(&key).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }
}
