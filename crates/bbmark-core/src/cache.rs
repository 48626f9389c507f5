use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;

type Cache = Mutex<LruCache<String, Arc<str>>>;

/// Rendered HTML keyed by content id, evicting the least recently used entry.
///
/// Renders run outside the lock, so two threads missing the same key may both render it;
/// the later insert wins.
pub struct RenderCache {
    entries: Cache,
}

impl RenderCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<str>> {
        self.lock().get(key).cloned()
    }

    pub fn get_or_render<F>(&self, key: &str, render: F) -> Arc<str>
    where
        F: FnOnce() -> String,
    {
        if let Some(cached) = self.get(key) {
            log::trace!("render cache hit for {key}");
            return cached;
        }
        let html: Arc<str> = Arc::from(render());
        self.lock().put(key.to_string(), Arc::clone(&html));
        html
    }

    pub fn insert(&self, key: impl Into<String>, html: impl Into<Arc<str>>) {
        self.lock().put(key.into(), html.into());
    }

    /// Drops the entry for `key`, e.g. after the content was edited.
    pub fn invalidate(&self, key: &str) -> Option<Arc<str>> {
        self.lock().pop(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, Arc<str>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCache")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::RenderCache;
    use std::num::NonZeroUsize;

    fn cache(capacity: usize) -> RenderCache {
        RenderCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn renders_once_per_key() {
        let cache = cache(4);
        let mut calls = 0;
        for _ in 0..3 {
            let html = cache.get_or_render("post:1", || {
                calls += 1;
                "<strong>x</strong>".to_string()
            });
            assert_eq!(&*html, "<strong>x</strong>");
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = cache(2);
        cache.insert("a", "1");
        cache.insert("b", "2");
        assert!(cache.get("a").is_some());
        cache.insert("c", "3");
        assert!(cache.get("b").is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn invalidate_forces_a_new_render() {
        let cache = cache(2);
        cache.insert("a", "old");
        cache.invalidate("a");
        assert_eq!(&*cache.get_or_render("a", || "new".to_string()), "new");
    }
}
