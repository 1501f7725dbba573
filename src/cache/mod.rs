//! Bounded AST cache keyed by filename.
//!
//! Entries are validated by SHA-256 content hash and evicted LRU-first when
//! over capacity or past their maximum age. All operations take the internal
//! lock, so the cache is safe to share across worker threads.

use crate::parser::{self, Dockerfile, ParseError};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_MAX_ENTRIES: usize = 100;
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(300);

/// A cached parse result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub dockerfile: Arc<Dockerfile>,
    pub parse_errors: Arc<Vec<ParseError>>,
    pub hash: String,
    last_access: Instant,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Keys ordered most-recently-used first.
    order: Vec<String>,
}

impl CacheInner {
    fn touch(&mut self, filename: &str) {
        if let Some(idx) = self.order.iter().position(|k| k == filename) {
            let key = self.order.remove(idx);
            self.order.insert(0, key);
        }
    }

    fn remove(&mut self, filename: &str) {
        self.entries.remove(filename);
        if let Some(idx) = self.order.iter().position(|k| k == filename) {
            self.order.remove(idx);
        }
    }
}

/// LRU cache for parsed Dockerfiles.
pub struct AstCache {
    inner: RwLock<CacheInner>,
    max_entries: usize,
    max_age: Duration,
}

impl Default for AstCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, DEFAULT_MAX_AGE)
    }
}

impl AstCache {
    pub fn new(max_entries: usize, max_age: Duration) -> Self {
        Self {
            inner: RwLock::new(CacheInner {
                entries: HashMap::new(),
                order: Vec::new(),
            }),
            max_entries: max_entries.max(1),
            max_age,
        }
    }

    /// Fetch a cached entry if the content hash still matches and the entry
    /// has not aged out. Hits move to most-recently-used.
    ///
    /// Lookup and validation happen under the read lock; only stale-entry
    /// eviction and the recency update take the write lock.
    pub fn get(&self, filename: &str, content: &str) -> Option<CacheEntry> {
        let hash = hash_content(content);

        let stale = {
            let inner = self.inner.read();
            match inner.entries.get(filename) {
                None => return None,
                Some(entry) => {
                    entry.hash != hash || entry.last_access.elapsed() > self.max_age
                }
            }
        };

        if stale {
            self.inner.write().remove(filename);
            return None;
        }

        let mut inner = self.inner.write();
        inner.touch(filename);
        let entry = inner.entries.get_mut(filename)?;
        entry.last_access = Instant::now();
        Some(entry.clone())
    }

    /// Insert or replace; evicts least-recently-used entries over capacity.
    pub fn put(
        &self,
        filename: &str,
        content: &str,
        dockerfile: Arc<Dockerfile>,
        parse_errors: Arc<Vec<ParseError>>,
    ) {
        let entry = CacheEntry {
            dockerfile,
            parse_errors,
            hash: hash_content(content),
            last_access: Instant::now(),
        };

        let mut inner = self.inner.write();

        if inner.entries.contains_key(filename) {
            inner.entries.insert(filename.to_string(), entry);
            inner.touch(filename);
            return;
        }

        inner.entries.insert(filename.to_string(), entry);
        inner.order.insert(0, filename.to_string());

        while inner.order.len() > self.max_entries {
            if let Some(oldest) = inner.order.pop() {
                inner.entries.remove(&oldest);
            }
        }
    }

    pub fn invalidate(&self, filename: &str) {
        self.inner.write().remove(filename);
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.max_entries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
}

fn hash_content(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    hex::encode(digest)
}

/// Parser front-end that consults the cache first.
pub struct CachedParser {
    cache: Arc<AstCache>,
}

impl CachedParser {
    pub fn new(cache: Arc<AstCache>) -> Self {
        Self { cache }
    }

    pub fn parse(&self, filename: &str, content: &str) -> (Arc<Dockerfile>, Arc<Vec<ParseError>>) {
        if let Some(entry) = self.cache.get(filename, content) {
            log::trace!("ast cache hit for {}", filename);
            return (entry.dockerfile, entry.parse_errors);
        }

        let (df, errors) = parser::parse(content);
        let df = Arc::new(df);
        let errors = Arc::new(errors);
        self.cache
            .put(filename, content, Arc::clone(&df), Arc::clone(&errors));
        (df, errors)
    }

    pub fn invalidate(&self, filename: &str) {
        self.cache.invalidate(filename);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(content: &str) -> (Arc<Dockerfile>, Arc<Vec<ParseError>>) {
        let (df, errors) = parser::parse(content);
        (Arc::new(df), Arc::new(errors))
    }

    #[test]
    fn hit_on_same_content() {
        let cache = AstCache::default();
        let (df, errors) = parsed("FROM a\n");
        cache.put("Dockerfile", "FROM a\n", df, errors);
        assert!(cache.get("Dockerfile", "FROM a\n").is_some());
    }

    #[test]
    fn same_ast_object_on_back_to_back_gets() {
        let cache = Arc::new(AstCache::default());
        let cached = CachedParser::new(Arc::clone(&cache));
        let (first, _) = cached.parse("Dockerfile", "FROM a\n");
        let (second, _) = cached.parse("Dockerfile", "FROM a\n");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn miss_on_single_byte_change() {
        let cache = AstCache::default();
        let (df, errors) = parsed("FROM a\n");
        cache.put("Dockerfile", "FROM a\n", df, errors);
        assert!(cache.get("Dockerfile", "FROM b\n").is_none());
        // The stale entry is evicted.
        assert!(cache.is_empty());
    }

    #[test]
    fn miss_on_unknown_file() {
        let cache = AstCache::default();
        assert!(cache.get("unknown", "FROM a\n").is_none());
    }

    #[test]
    fn lru_eviction_at_capacity() {
        let cache = AstCache::new(2, Duration::from_secs(300));
        for name in ["a", "b", "c"] {
            let (df, errors) = parsed("FROM x:1\n");
            cache.put(name, "FROM x:1\n", df, errors);
        }
        assert_eq!(cache.len(), 2);
        // "a" was least recently used.
        assert!(cache.get("a", "FROM x:1\n").is_none());
        assert!(cache.get("c", "FROM x:1\n").is_some());
    }

    #[test]
    fn get_refreshes_recency() {
        let cache = AstCache::new(2, Duration::from_secs(300));
        let (df, errors) = parsed("FROM x:1\n");
        cache.put("a", "FROM x:1\n", df.clone(), errors.clone());
        cache.put("b", "FROM x:1\n", df.clone(), errors.clone());
        // Touch "a" so "b" becomes the eviction candidate.
        assert!(cache.get("a", "FROM x:1\n").is_some());
        cache.put("c", "FROM x:1\n", df, errors);
        assert!(cache.get("a", "FROM x:1\n").is_some());
        assert!(cache.get("b", "FROM x:1\n").is_none());
    }

    #[test]
    fn expired_entries_evicted() {
        let cache = AstCache::new(10, Duration::from_millis(0));
        let (df, errors) = parsed("FROM a\n");
        cache.put("Dockerfile", "FROM a\n", df, errors);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("Dockerfile", "FROM a\n").is_none());
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = AstCache::default();
        let (df, errors) = parsed("FROM a\n");
        cache.put("one", "FROM a\n", df.clone(), errors.clone());
        cache.put("two", "FROM a\n", df, errors);
        cache.invalidate("one");
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().capacity, DEFAULT_MAX_ENTRIES);
    }

    #[test]
    fn concurrent_access_is_safe() {
        let cache = Arc::new(AstCache::default());
        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                let name = format!("file-{}", i % 4);
                let content = format!("FROM img{}:1\n", i % 4);
                for _ in 0..100 {
                    let (df, errors) = parsed(&content);
                    cache.put(&name, &content, df, errors);
                    let _ = cache.get(&name, &content);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 4);
    }
}
