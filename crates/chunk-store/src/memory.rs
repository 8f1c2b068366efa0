use crate::store::ChunkStore;
use codechunk_code_chunker::CodeChunk;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

/// Bounded in-memory tier in front of a [`ChunkStore`].
///
/// Writes go through to disk; reads fall back to disk and repopulate memory.
/// When full, the least recently used entry is evicted.
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<LruCache<String, CodeChunk>>,
    store: ChunkStore,
}

impl MemoryCache {
    pub fn new(store: ChunkStore, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            store,
        }
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<String, CodeChunk>> {
        // A panic while holding the lock cannot leave the LRU half-updated.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub async fn set(&self, key: &str, chunk: CodeChunk) {
        let evicted = self.entries().push(key.to_string(), chunk.clone());
        if let Some((old_key, _)) = evicted.filter(|(k, _)| k != key) {
            log::debug!("Evicted '{old_key}' from memory cache");
        }
        self.store.put(key, &chunk).await;
    }

    pub async fn get(&self, key: &str) -> Option<CodeChunk> {
        let cached = self.entries().get(key).cloned();
        if cached.is_some() {
            return cached;
        }
        let chunk = self.store.get(key).await?;
        self.entries().push(key.to_string(), chunk.clone());
        Some(chunk)
    }

    pub async fn delete(&self, key: &str) {
        self.entries().pop(key);
        self.store.delete(key).await;
    }

    pub async fn clear(&self) {
        self.entries().clear();
        self.store.clear().await;
    }

    /// Entries held in memory
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Memory-tier membership; does not touch recency or disk
    pub fn contains(&self, key: &str) -> bool {
        self.entries().contains(key)
    }

    pub fn capacity(&self) -> usize {
        self.entries().cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn chunk(id: &str) -> CodeChunk {
        CodeChunk::new(id, id, "source.lang.swift.decl.function.free", "/p/a.swift")
            .with_content(format!("body of {id}"))
    }

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let tmp = TempDir::new().unwrap();
        let cache = MemoryCache::new(ChunkStore::new(tmp.path()), 3);
        for k in ["a", "b", "c"] {
            cache.set(k, chunk(k)).await;
        }
        // touch "a" so "b" becomes the oldest
        assert!(cache.get("a").await.is_some());
        cache.set("d", chunk("d")).await;

        assert_eq!(cache.len(), 3);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
    }

    #[tokio::test]
    async fn unwritable_store_degrades_to_memory() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let cache = MemoryCache::new(ChunkStore::new(blocker.join("chunks")), 2);

        cache.set("a", chunk("a")).await;
        assert_eq!(cache.get("a").await, Some(chunk("a")));
        assert!(cache.store().list_keys().await.is_empty());

        cache.delete("a").await;
        assert_eq!(cache.get("a").await, None);
        cache.clear().await;
    }

    #[tokio::test]
    async fn evicted_entry_reloads_from_disk() {
        let tmp = TempDir::new().unwrap();
        let cache = MemoryCache::new(ChunkStore::new(tmp.path()), 1);
        cache.set("a", chunk("a")).await;
        cache.set("b", chunk("b")).await;
        assert!(!cache.contains("a"));

        assert_eq!(cache.get("a").await, Some(chunk("a")));
        assert!(cache.contains("a"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn overwrite_keeps_single_entry() {
        let tmp = TempDir::new().unwrap();
        let cache = MemoryCache::new(ChunkStore::new(tmp.path()), 2);
        cache.set("a", chunk("a")).await;
        let updated = chunk("a").with_content("new body");
        cache.set("a", updated.clone()).await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").await, Some(updated.clone()));
        assert_eq!(cache.store().get("a").await, Some(updated));
    }

    #[tokio::test]
    async fn delete_and_clear_reach_disk() {
        let tmp = TempDir::new().unwrap();
        let cache = MemoryCache::new(ChunkStore::new(tmp.path().join("c")), 4);
        cache.set("a", chunk("a")).await;
        cache.set("b", chunk("b")).await;

        cache.delete("a").await;
        assert_eq!(cache.get("a").await, None);

        cache.clear().await;
        assert!(cache.is_empty());
        assert_eq!(cache.get("b").await, None);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cache = MemoryCache::new(ChunkStore::new("unused"), 0);
        assert_eq!(cache.capacity(), 1);
    }
}
