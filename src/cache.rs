//! Time-bounded cache for expensive, read-only resources.
//!
//! The model handle and the reference dataset are both loaded once and then
//! shared read-only. `TtlCache` keeps the last successful load together with
//! its load time and reloads it once the time-to-live has elapsed.
//!
//! The internal lock is held while a load runs, so concurrent callers within
//! one TTL window trigger at most one load. A failed load leaves the cache
//! untouched; the next call tries again.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct Entry<T> {
    value: Arc<T>,
    loaded_at: Instant,
}

pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value, loading it first if absent or expired.
    pub fn get_or_reload<E>(&self, load: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        self.get_or_reload_at(Instant::now(), load)
    }

    /// Same as `get_or_reload`, with an explicit clock reading.
    pub fn get_or_reload_at<E>(
        &self,
        now: Instant,
        load: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        // A poisoned lock only means another caller panicked mid-load; the
        // slot itself is still a valid `Option`.
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());

        if let Some(entry) = slot.as_ref() {
            if now.saturating_duration_since(entry.loaded_at) < self.ttl {
                return Ok(Arc::clone(&entry.value));
            }
        }

        let value = Arc::new(load()?);
        *slot = Some(Entry {
            value: Arc::clone(&value),
            loaded_at: now,
        });
        Ok(value)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn reuses_value_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = Cell::new(0);
        let t0 = Instant::now();

        let load = || -> Result<u32, ()> {
            calls.set(calls.get() + 1);
            Ok(7)
        };
        let a = cache.get_or_reload_at(t0, load).unwrap();
        let b = cache
            .get_or_reload_at(t0 + Duration::from_secs(59), || -> Result<u32, ()> {
                calls.set(calls.get() + 1);
                Ok(8)
            })
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, 7);
    }

    #[test]
    fn reloads_after_expiry() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.get_or_reload_at(t0, || Ok::<_, ()>(1)).unwrap();
        let v = cache
            .get_or_reload_at(t0 + Duration::from_secs(60), || Ok::<_, ()>(2))
            .unwrap();
        assert_eq!(*v, 2);

        // The window restarts at the reload.
        let v = cache
            .get_or_reload_at(t0 + Duration::from_secs(119), || Ok::<_, ()>(3))
            .unwrap();
        assert_eq!(*v, 2);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        let err = cache.get_or_reload(|| Err("boom")).unwrap_err();
        assert_eq!(err, "boom");

        let calls = Cell::new(0);
        let v = cache
            .get_or_reload(|| {
                calls.set(calls.get() + 1);
                Ok::<_, &str>(3)
            })
            .unwrap();
        assert_eq!(*v, 3);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn concurrent_callers_trigger_one_load() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let values: Vec<Arc<u32>> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        cache
                            .get_or_reload(|| {
                                calls.fetch_add(1, Ordering::SeqCst);
                                std::thread::sleep(Duration::from_millis(20));
                                Ok::<_, ()>(9)
                            })
                            .unwrap()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
    }
}
