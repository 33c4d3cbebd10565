use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::models::ConversationTurn;

/// Thread-safe LRU cache for rewritten search queries.
///
/// Keyed by a hash of the full conversation plus the chat model, since the
/// rewrite depends on both. A capacity of zero disables caching.
#[derive(Clone)]
pub struct RewriteCache {
    cache: Option<Arc<Mutex<LruCache<String, String>>>>,
}

impl RewriteCache {
    pub fn new(capacity: usize) -> Self {
        let cache = NonZeroUsize::new(capacity)
            .map(|capacity| Arc::new(Mutex::new(LruCache::new(capacity))));
        Self { cache }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        let mut cache = cache.lock().ok()?;
        cache.get(key).cloned()
    }

    pub fn put(&self, key: String, value: String) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        if let Ok(mut cache) = cache.lock() {
            cache.put(key, value);
        }
    }

    /// Stable hash key over the conversation and the model producing the
    /// rewrite.
    pub fn key_for(turns: &[ConversationTurn], chat_model: &str) -> String {
        let mut hasher = DefaultHasher::new();
        chat_model.hash(&mut hasher);
        for turn in turns {
            turn.role.as_str().hash(&mut hasher);
            turn.content.hash(&mut hasher);
        }
        format!("{:x}", hasher.finish())
    }
}
