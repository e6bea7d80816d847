//! Short-lived response cache keyed by request fingerprint.
//!
//! De-duplicates rapid repeated identical requests (client retries,
//! double-submits). Entries live for seconds, so the store is an in-process
//! map shared across invocations. There is no single-flight coalescing: two
//! concurrent misses for one fingerprint both go to the model.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::models::TripPlan;

#[derive(Debug, Clone)]
struct StoredEntry {
    plan: TripPlan,
    expires_at: Instant,
}

/// Concurrent TTL cache for validated plans.
#[derive(Debug, Clone, Default)]
pub struct PlanCache {
    store: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

impl PlanCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a plan with a time-to-live (TTL). Entries are replaced
    /// wholesale, never mutated in place.
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, plan))]
    pub async fn put(&self, key: &str, plan: TripPlan, ttl: Duration) {
        let entry = StoredEntry {
            plan,
            expires_at: Instant::now() + ttl,
        };
        self.store.write().await.insert(key.to_string(), entry);
    }

    /// Retrieves a plan if it exists and has not expired. Expired entries
    /// count as misses and are removed on observation.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get(&self, key: &str) -> Option<TripPlan> {
        let now = Instant::now();

        {
            let store = self.store.read().await;
            match store.get(key) {
                Some(entry) if now < entry.expires_at => {
                    tracing::debug!("Key found and still fresh");
                    return Some(entry.plan.clone());
                }
                Some(_) => {}
                None => {
                    tracing::debug!("Key not found");
                    return None;
                }
            }
        }

        tracing::debug!("Key found but expired");
        let mut store = self.store.write().await;
        if let Some(entry) = store.get(key) {
            if now >= entry.expires_at {
                store.remove(key);
            }
        }
        None
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) {
        self.store.write().await.remove(key);
    }
}
