//! Keyed single-flight cache.
//!
//! Concurrent callers asking for the same key inside the freshness window
//! share one producer execution instead of issuing N redundant platform
//! calls. The per-key slot lock is the in-flight marker: it is released on
//! completion whether the producer succeeded or failed, so a failed fetch
//! never poisons its key.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

struct Slot<V> {
    value: Option<(V, Instant)>,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self { value: None }
    }
}

pub struct Memoizer<V> {
    slots: Mutex<HashMap<String, Arc<Mutex<Slot<V>>>>>,
}

impl<V: Clone> Memoizer<V> {
    pub fn new() -> Self {
        Self { slots: Mutex::new(HashMap::new()) }
    }

    /// Return the cached value for `key` if it is younger than `ttl`,
    /// otherwise run `producer` and cache its result. At most one producer
    /// runs per key at a time; waiters observe the fresh value instead of
    /// producing again. A producer error is returned to its caller and
    /// leaves the slot empty.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            Arc::clone(slots.entry(key.to_string()).or_default())
        };

        let mut guard = slot.lock().await;

        if let Some((value, cached_at)) = &guard.value {
            if cached_at.elapsed() < ttl {
                return Ok(value.clone());
            }
        }

        let value = producer().await?;
        guard.value = Some((value.clone(), Instant::now()));

        Ok(value)
    }
}

impl<V: Clone> Default for Memoizer<V> {
    fn default() -> Self {
        Self::new()
    }
}
