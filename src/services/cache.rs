use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::models::ChartDataPoint;

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    stored_at_ms: i64,
    identity: String,
}

/// Per-name cache whose entries are bound to an identity (the wallet
/// address) and expire after a fixed TTL.
///
/// An entry is only served back to the identity that wrote it; a lookup with
/// any other identity evicts it.
pub struct TimedCache<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

pub type ChartCache = TimedCache<Vec<ChartDataPoint>>;

impl<T: Clone + Send + Sync> TimedCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub async fn get(&self, name: &str, identity: &str) -> Option<T> {
        let now = self.clock.now_millis();
        {
            let guard = self.entries.read().await;
            let entry = guard.get(name)?;
            if entry.identity == identity && !self.is_expired(entry, now) {
                return Some(entry.data.clone());
            }
        }

        let mut guard = self.entries.write().await;
        let evict = guard
            .get(name)
            .map(|entry| entry.identity != identity || self.is_expired(entry, now))
            .unwrap_or(false);
        if evict {
            tracing::debug!("Evicting cache entry {} for {}", name, identity);
            guard.remove(name);
        }
        None
    }

    pub async fn set(&self, name: &str, identity: &str, data: T) {
        let entry = CacheEntry {
            data,
            stored_at_ms: self.clock.now_millis(),
            identity: identity.to_string(),
        };
        self.entries.write().await.insert(name.to_string(), entry);
    }

    /// Removes the entry for `name` written by `identity`.
    pub async fn clear(&self, name: &str, identity: &str) {
        let mut guard = self.entries.write().await;
        if guard
            .get(name)
            .is_some_and(|entry| entry.identity == identity)
        {
            guard.remove(name);
        }
    }

    #[cfg(test)]
    pub async fn clear_all(&self) {
        self.entries.write().await.clear();
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    fn is_expired(&self, entry: &CacheEntry<T>, now_ms: i64) -> bool {
        let age_ms = now_ms.saturating_sub(entry.stored_at_ms);
        age_ms < 0 || age_ms as u128 >= self.ttl.as_millis()
    }
}
