use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub enabled: bool,
    pub ttl: Duration,
}

/// Holds fetched values for `ttl`, at most `capacity` keys at a time. A
/// disabled cache never stores anything.
pub struct Cache<K, V> {
    config: Config,
    capacity: usize,
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(config: Config, capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            config,
            capacity,
            entries: Default::default(),
        })
    }

    /// Stores `value` under `key` and hands it back shared. When the cache
    /// is full, new keys are passed through without being stored.
    pub async fn insert(self: Arc<Self>, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        if !self.config.enabled {
            return value;
        }

        {
            let mut entries = self.entries.write().await;
            if entries.len() >= self.capacity && !entries.contains_key(&key) {
                tracing::debug!(capacity = self.capacity, "cache full, not storing");
                return value;
            }
            entries.insert(key.clone(), Arc::clone(&value));
        }

        let cache = Arc::clone(&self);
        let stored = Arc::clone(&value);
        task::spawn(async move {
            sleep(cache.config.ttl).await;
            let mut entries = cache.entries.write().await;
            // A newer insert for the same key owns its own timer.
            if entries.get(&key).is_some_and(|current| Arc::ptr_eq(current, &stored)) {
                entries.remove(&key);
            }
        });

        value
    }

    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        if !self.config.enabled {
            return None;
        }

        self.entries.read().await.get(key).map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool) -> Config {
        Config {
            enabled,
            ttl: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = Cache::new(config(false), 8);

        let value = Arc::clone(&cache).insert("feed", 1).await;

        assert_eq!(*value, 1);
        assert!(cache.get(&"feed").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = Cache::new(config(true), 8);

        Arc::clone(&cache).insert("event:e1", "Rally").await;
        assert_eq!(cache.get(&"event:e1").await.as_deref(), Some(&"Rally"));

        sleep(Duration::from_secs(61)).await;
        assert!(cache.get(&"event:e1").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reinsert_keeps_newer_value_alive() {
        let cache = Cache::new(config(true), 8);

        Arc::clone(&cache).insert("feed", 1).await;
        sleep(Duration::from_secs(30)).await;
        Arc::clone(&cache).insert("feed", 2).await;
        sleep(Duration::from_secs(31)).await;

        assert_eq!(cache.get(&"feed").await.as_deref(), Some(&2));
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_passes_new_keys_through() {
        let cache = Cache::new(config(true), 2);

        Arc::clone(&cache).insert("e1", 1).await;
        Arc::clone(&cache).insert("e2", 2).await;
        let value = Arc::clone(&cache).insert("e3", 3).await;

        assert_eq!(*value, 3);
        assert!(cache.get(&"e3").await.is_none());

        // Existing keys can still be refreshed.
        Arc::clone(&cache).insert("e1", 10).await;
        assert_eq!(cache.get(&"e1").await.as_deref(), Some(&10));

        sleep(Duration::from_secs(61)).await;
        Arc::clone(&cache).insert("e3", 3).await;
        assert_eq!(cache.get(&"e3").await.as_deref(), Some(&3));
    }
}
