//! Query embedding cache to reduce embedding service calls

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};

/// Cache entry with TTL
#[derive(Clone)]
struct CacheEntry {
    vector: Vec<f32>,
    expires_at: SystemTime,
}

/// In-memory cache of embeddings keyed by model and text
pub struct EmbeddingCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl EmbeddingCache {
    /// Create new cache with default TTL of 1 hour
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(3600))
    }

    /// Create cache with custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: 4096,
        }
    }

    #[cfg(test)]
    fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::with_ttl(ttl)
        }
    }

    /// Get cached vector if present and not expired
    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if SystemTime::now() < entry.expires_at {
            Some(entry.vector.clone())
        } else {
            None
        }
    }

    /// Store a vector; expired entries are dropped once the cache is full
    pub fn set(&self, key: String, vector: Vec<f32>) {
        let expires_at = SystemTime::now() + self.ttl;

        if let Ok(mut entries) = self.entries.write() {
            if entries.len() >= self.max_entries {
                let now = SystemTime::now();
                entries.retain(|_, entry| now < entry.expires_at);
                if entries.len() >= self.max_entries {
                    entries.clear();
                }
            }
            entries.insert(key, CacheEntry { vector, expires_at });
        }
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate cache key for embeddings
pub fn embedding_cache_key(model: &str, text: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    text.hash(&mut hasher);
    format!("embed:{}:{:x}", model, hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basic() {
        let cache = EmbeddingCache::new();

        cache.set("key1".to_string(), vec![0.1, 0.2]);
        assert_eq!(cache.get("key1"), Some(vec![0.1, 0.2]));
        assert_eq!(cache.get("key2"), None);
    }

    #[test]
    fn test_cache_expiry() {
        let cache = EmbeddingCache::with_ttl(Duration::from_millis(100));

        cache.set("key1".to_string(), vec![1.0]);
        assert_eq!(cache.get("key1"), Some(vec![1.0]));

        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(cache.get("key1"), None);
    }

    #[test]
    fn test_cache_is_bounded() {
        let cache = EmbeddingCache::with_capacity(Duration::from_secs(60), 2);

        cache.set("a".to_string(), vec![1.0]);
        cache.set("b".to_string(), vec![2.0]);
        assert_eq!(cache.len(), 2);

        // Full of live entries, so the cache is cleared before inserting
        cache.set("c".to_string(), vec![3.0]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("c"), Some(vec![3.0]));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_cache_key_generation() {
        let key1 = embedding_cache_key("model1", "text1");
        let key2 = embedding_cache_key("model1", "text1");
        let key3 = embedding_cache_key("model1", "text2");

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
    }
}
