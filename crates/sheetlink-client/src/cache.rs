use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use sheetlink_model::Document;

/// Time-boxed memoization of full-document fetches, keyed by document id.
///
/// Reads share the lock; only storing a fresh snapshot takes it exclusively.
/// There is no single-flight guarantee: two callers refreshing the same key
/// may both reach the transport, and the later store wins.
#[derive(Debug, Default)]
pub(crate) struct DocumentCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: Instant,
    document: Document,
}

impl DocumentCache {
    /// A cached snapshot of `id` if one exists and is younger than `ttl`.
    /// A zero `ttl` disables caching entirely.
    pub fn get(&self, id: &str, ttl: Duration) -> Option<Document> {
        if ttl.is_zero() {
            return None;
        }
        let entries = self.entries.read().expect("cache lock poisoned");
        let entry = entries.get(id)?;
        if entry.fetched_at.elapsed() < ttl {
            Some(entry.document.clone())
        } else {
            None
        }
    }

    /// Store a freshly fetched snapshot, restamping the fetch time.
    pub fn store(&self, id: &str, document: &Document) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.insert(
            id.to_string(),
            CacheEntry {
                fetched_at: Instant::now(),
                document: document.clone(),
            },
        );
    }
}
