//! TTL-bounded cache of the last computed selection.

use crate::types::ActiveStreams;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct CacheState {
    streams: ActiveStreams,
    /// `None` until first populated, and again after invalidation
    updated_at: Option<Instant>,
}

/// Holds the group -> selected-candidate mapping from the most recent
/// completed (or optimistic) selection.
///
/// The mapping is only ever swapped whole, never patched entry by entry,
/// so readers cannot observe a half-finished pass. Freshness is a single
/// timestamp plus a fixed TTL.
#[derive(Debug)]
pub struct SelectionCache {
    state: RwLock<CacheState>,
    ttl: Duration,
}

impl SelectionCache {
    /// Create an empty cache with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            ttl,
        }
    }

    /// The cached mapping, if fresh and non-empty. `None` is a miss the
    /// caller resolves by running a verification pass.
    pub async fn read(&self) -> Option<ActiveStreams> {
        let state = self.state.read().await;
        match state.updated_at {
            Some(at) if at.elapsed() < self.ttl && !state.streams.is_empty() => {
                Some(state.streams.clone())
            }
            _ => None,
        }
    }

    /// Whatever the cache holds right now, at any age. Served to callers
    /// that lose the single-flight race, in place of a redundant pass.
    pub async fn peek(&self) -> ActiveStreams {
        self.state.read().await.streams.clone()
    }

    /// Atomically replace the whole mapping and stamp it fresh.
    pub async fn store(&self, streams: ActiveStreams) {
        let mut state = self.state.write().await;
        debug!(groups = streams.len(), "selection cache updated");
        state.streams = streams;
        state.updated_at = Some(Instant::now());
    }

    /// Drop the mapping and force the next read to miss.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.streams.clear();
        state.updated_at = None;
        debug!("selection cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Candidate;
    use std::collections::HashMap;

    fn streams(pairs: &[(&str, &str)]) -> ActiveStreams {
        pairs
            .iter()
            .map(|(group, url)| (group.to_string(), Candidate::new(*url)))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_cache_misses() {
        let cache = SelectionCache::new(Duration::from_secs(300));
        assert!(cache.read().await.is_none());
        assert!(cache.peek().await.is_empty());
    }

    #[tokio::test]
    async fn test_fresh_write_serves() {
        let cache = SelectionCache::new(Duration::from_secs(300));
        cache.store(streams(&[("news", "http://a")])).await;

        let served = cache.read().await.expect("fresh cache should serve");
        assert_eq!(served["news"].url, "http://a");
    }

    #[tokio::test]
    async fn test_expired_entry_misses_but_peeks() {
        let cache = SelectionCache::new(Duration::from_millis(30));
        cache.store(streams(&[("news", "http://a")])).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.read().await.is_none());
        // Stale contents remain visible to peek
        assert_eq!(cache.peek().await["news"].url, "http://a");
    }

    #[tokio::test]
    async fn test_empty_mapping_is_a_miss_even_when_fresh() {
        let cache = SelectionCache::new(Duration::from_secs(300));
        cache.store(HashMap::new()).await;
        assert!(cache.read().await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_forces_miss() {
        let cache = SelectionCache::new(Duration::from_secs(300));
        cache.store(streams(&[("news", "http://a")])).await;
        cache.invalidate().await;

        assert!(cache.read().await.is_none());
        assert!(cache.peek().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_replaces_whole_mapping() {
        let cache = SelectionCache::new(Duration::from_secs(300));
        cache
            .store(streams(&[("news", "http://a"), ("sports", "http://b")]))
            .await;
        cache.store(streams(&[("news", "http://c")])).await;

        let served = cache.read().await.unwrap();
        assert_eq!(served.len(), 1);
        assert_eq!(served["news"].url, "http://c");
    }
}
