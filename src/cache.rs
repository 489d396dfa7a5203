//! Bounded caches for parsed trees and rendered output.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use markdown::mdast::Node;
use sha2::{Digest, Sha256};

use crate::markdown::parser;

pub const DEFAULT_TREE_CAPACITY: usize = 64;
pub const DEFAULT_RENDER_CAPACITY: usize = 128;

/// In-memory LRU cache. Insertion order doubles as recency order: the front is evicted first
/// and reads move an entry to the back.
pub struct LruCache<K, V> {
    capacity: usize,
    entries: IndexMap<K, V>,
}

impl<K: Eq + Hash, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let (key, value) = self.entries.shift_remove_entry(key)?;
        self.entries.insert(key, value);
        self.entries.last().map(|(_, value)| value)
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        self.entries.shift_remove(&key);
        if self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&K, &V) -> bool) {
        self.entries.retain(|key, value| keep(key, value));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// SHA-256 of the Markdown source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    pub fn digest(markdown: &str) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&Sha256::digest(markdown.as_bytes()));
        Self(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub content: ContentKey,
    pub bucket: usize,
    pub theme: String,
}

#[derive(Debug, Clone)]
struct RenderEntry {
    /// Exact width the output was produced at.
    width: usize,
    output: Arc<str>,
}

/// Rounds to the nearest multiple of ten, halves up.
pub fn width_bucket(width: usize) -> usize {
    (width + 5) / 10 * 10
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub tree_hits: u64,
    pub tree_misses: u64,
    pub render_hits: u64,
    pub render_misses: u64,
}

#[derive(Debug, Clone)]
pub struct Rendered {
    pub output: Arc<str>,
    pub cache_hit: bool,
}

/// Tree cache keyed by content, render cache keyed by content, width bucket and theme.
///
/// A render entry is only served for a request at least as wide as the entry's own width, so
/// output never exceeds the requested width even when the bucket matches.
pub struct RenderCache {
    trees: Mutex<LruCache<ContentKey, Arc<Node>>>,
    renders: Mutex<LruCache<RenderKey, RenderEntry>>,
    tree_hits: AtomicU64,
    tree_misses: AtomicU64,
    render_hits: AtomicU64,
    render_misses: AtomicU64,
}

impl RenderCache {
    pub fn new(tree_capacity: usize, render_capacity: usize) -> Self {
        Self {
            trees: Mutex::new(LruCache::new(tree_capacity)),
            renders: Mutex::new(LruCache::new(render_capacity)),
            tree_hits: AtomicU64::new(0),
            tree_misses: AtomicU64::new(0),
            render_hits: AtomicU64::new(0),
            render_misses: AtomicU64::new(0),
        }
    }

    /// Returns cached output or renders the (possibly cached) tree with `render`. No lock is
    /// held while parsing or rendering.
    pub fn get_or_render<F>(
        &self,
        markdown: &str,
        width: usize,
        theme: &str,
        render: F,
    ) -> Rendered
    where
        F: FnOnce(&Node) -> String,
    {
        let content = ContentKey::digest(markdown);
        let key = RenderKey {
            content,
            bucket: width_bucket(width),
            theme: theme.to_string(),
        };

        let cached = lock(&self.renders)
            .get(&key)
            .filter(|entry| entry.width <= width)
            .map(|entry| entry.output.clone());
        if let Some(output) = cached {
            self.render_hits.fetch_add(1, Ordering::Relaxed);
            return Rendered {
                output,
                cache_hit: true,
            };
        }
        self.render_misses.fetch_add(1, Ordering::Relaxed);

        let tree = self.tree(content, markdown);
        let output: Arc<str> = Arc::from(render(&tree));
        lock(&self.renders).insert(
            key,
            RenderEntry {
                width,
                output: output.clone(),
            },
        );
        Rendered {
            output,
            cache_hit: false,
        }
    }

    fn tree(&self, content: ContentKey, markdown: &str) -> Arc<Node> {
        if let Some(tree) = lock(&self.trees).get(&content).cloned() {
            self.tree_hits.fetch_add(1, Ordering::Relaxed);
            return tree;
        }
        self.tree_misses.fetch_add(1, Ordering::Relaxed);

        let tree = Arc::new(parser::parse(markdown));
        lock(&self.trees).insert(content, tree.clone());
        tree
    }

    /// Drops every rendered entry in `width`'s bucket. Parsed trees are width independent and
    /// stay.
    pub fn invalidate_for_width(&self, width: usize) {
        let bucket = width_bucket(width);
        lock(&self.renders).retain(|key, _| key.bucket != bucket);
    }

    pub fn clear(&self) {
        lock(&self.trees).clear();
        lock(&self.renders).clear();
    }

    /// `(trees, renders)`.
    pub fn entry_counts(&self) -> (usize, usize) {
        (lock(&self.trees).len(), lock(&self.renders).len())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            tree_hits: self.tree_hits.load(Ordering::Relaxed),
            tree_misses: self.tree_misses.load(Ordering::Relaxed),
            render_hits: self.render_hits.load(Ordering::Relaxed),
            render_misses: self.render_misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(DEFAULT_TREE_CAPACITY, DEFAULT_RENDER_CAPACITY)
    }
}

// A poisoned cache is still used.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::{width_bucket, CacheStats, ContentKey, LruCache, RenderCache};
    use markdown::mdast::Node;

    fn text_of(tree: &Node) -> String {
        format!("{} blocks", tree.children().map_or(0, Vec::len))
    }

    #[test]
    fn lru_promotes_on_read_and_evicts_oldest() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), Some(&1));
        cache.insert("c", 3);
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"c"), Some(&3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn lru_reinsert_replaces_value() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("a", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a"), Some(&2));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut cache = LruCache::new(0);
        cache.insert("a", 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn buckets_round_half_up() {
        assert_eq!(width_bucket(80), 80);
        assert_eq!(width_bucket(84), 80);
        assert_eq!(width_bucket(85), 90);
        assert_eq!(width_bucket(4), 0);
    }

    #[test]
    fn content_keys_differ_by_content() {
        assert_eq!(ContentKey::digest("a"), ContentKey::digest("a"));
        assert_ne!(ContentKey::digest("a"), ContentKey::digest("b"));
    }

    #[test]
    fn second_render_is_served_from_cache() {
        let cache = RenderCache::default();
        let first = cache.get_or_render("hello", 80, "dark", text_of);
        let second = cache.get_or_render("hello", 80, "dark", |_| unreachable!());
        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.output, second.output);
        assert_eq!(
            cache.stats(),
            CacheStats {
                tree_hits: 0,
                tree_misses: 1,
                render_hits: 1,
                render_misses: 1,
            }
        );
    }

    #[test]
    fn wider_entries_are_not_served_to_narrower_requests() {
        let cache = RenderCache::default();
        cache.get_or_render("hello", 84, "dark", text_of);
        assert!(cache.get_or_render("hello", 84, "dark", text_of).cache_hit);
        assert!(!cache.get_or_render("hello", 81, "dark", text_of).cache_hit);
        assert!(cache.get_or_render("hello", 84, "dark", text_of).cache_hit);
    }

    #[test]
    fn theme_is_part_of_the_render_key_but_not_the_tree_key() {
        let cache = RenderCache::default();
        cache.get_or_render("hello", 80, "dark", text_of);
        assert!(!cache.get_or_render("hello", 80, "light", text_of).cache_hit);
        assert_eq!(cache.stats().tree_hits, 1);
    }

    #[test]
    fn invalidation_only_drops_one_bucket() {
        let cache = RenderCache::default();
        cache.get_or_render("hello", 80, "dark", text_of);
        cache.get_or_render("hello", 120, "dark", text_of);
        cache.invalidate_for_width(82);
        assert_eq!(cache.entry_counts(), (1, 1));
        assert!(cache.get_or_render("hello", 120, "dark", text_of).cache_hit);
        assert!(!cache.get_or_render("hello", 80, "dark", text_of).cache_hit);
    }
}
