//! In-process page cache storage.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use metrics::counter;
use tokio::time::Instant;
use tracing::debug;

use crate::application::feed::FeedPage;

use super::config::CacheConfig;
use super::keys::PageCacheKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

pub const METRIC_PAGE_CACHE_HIT: &str = "tidings_page_cache_hit_total";
pub const METRIC_PAGE_CACHE_MISS: &str = "tidings_page_cache_miss_total";
pub const METRIC_PAGE_CACHE_EXPIRED: &str = "tidings_page_cache_expired_total";
pub const METRIC_PAGE_CACHE_CLEAR: &str = "tidings_page_cache_clear_total";

struct Entry {
    page: FeedPage,
    stored_at: Instant,
}

/// Time-bounded cache of feed pages.
///
/// There is no size eviction. Keys are served page numbers, which are bounded
/// by the feed's page count, and expired entries are swept on every `put`.
pub struct PageCache {
    ttl: Duration,
    entries: RwLock<HashMap<PageCacheKey, Entry>>,
}

impl PageCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_ttl(config.ttl())
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached page while it is younger than the TTL.
    ///
    /// An expired entry is removed on access and reported as a miss.
    pub fn get(&self, key: &PageCacheKey) -> Option<FeedPage> {
        let expired = {
            let entries = rw_read(&self.entries, SOURCE, "get");
            match entries.get(key) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    counter!(METRIC_PAGE_CACHE_HIT).increment(1);
                    debug!(%key, "page cache hit");
                    return Some(entry.page.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            let mut entries = rw_write(&self.entries, SOURCE, "get_expired");
            // Another writer may have refreshed the entry in between.
            if entries
                .get(key)
                .is_some_and(|entry| entry.stored_at.elapsed() >= self.ttl)
            {
                entries.remove(key);
                counter!(METRIC_PAGE_CACHE_EXPIRED).increment(1);
                debug!(%key, "page cache entry expired");
            }
        }

        counter!(METRIC_PAGE_CACHE_MISS).increment(1);
        debug!(%key, "page cache miss");
        None
    }

    /// Stores a page, replacing any previous entry for the key and dropping expired ones.
    pub fn put(&self, key: PageCacheKey, page: FeedPage) {
        let entry = Entry {
            page,
            stored_at: Instant::now(),
        };
        let mut entries = rw_write(&self.entries, SOURCE, "put");
        let before = entries.len();
        entries.retain(|_, existing| existing.stored_at.elapsed() < self.ttl);
        let swept = before - entries.len();
        if swept > 0 {
            counter!(METRIC_PAGE_CACHE_EXPIRED).increment(swept as u64);
            debug!(swept, "page cache swept expired entries");
        }
        entries.insert(key, entry);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let removed = {
            let mut entries = rw_write(&self.entries, SOURCE, "clear");
            let removed = entries.len();
            entries.clear();
            removed
        };
        counter!(METRIC_PAGE_CACHE_CLEAR).increment(1);
        debug!(removed, "page cache cleared");
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for PageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::feed::FeedExtra;
    use crate::application::pagination::Paginator;
    use crate::domain::types::FeedKind;

    fn page(total: u64) -> FeedPage {
        FeedPage {
            kind: FeedKind::Global,
            items: Vec::new(),
            page: Paginator::default().locate(total, 1),
            extra: FeedExtra::None,
        }
    }

    #[test]
    fn put_then_get_returns_the_page() {
        let cache = PageCache::with_ttl(Duration::from_secs(20));
        cache.put(PageCacheKey::global(1), page(3));

        let cached = cache.get(&PageCacheKey::global(1)).expect("cached page");
        assert_eq!(cached.page.total_items, 3);
        assert!(cache.get(&PageCacheKey::global(2)).is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let cache = PageCache::with_ttl(Duration::from_secs(20));
        cache.put(PageCacheKey::global(1), page(1));
        cache.put(PageCacheKey::global(2), page(1));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&PageCacheKey::global(1)).is_none());
    }

    #[test]
    fn put_replaces_existing_entry() {
        let cache = PageCache::with_ttl(Duration::from_secs(20));
        cache.put(PageCacheKey::global(1), page(1));
        cache.put(PageCacheKey::global(1), page(7));

        assert_eq!(cache.len(), 1);
        let cached = cache.get(&PageCacheKey::global(1)).expect("cached page");
        assert_eq!(cached.page.total_items, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = PageCache::with_ttl(Duration::from_secs(20));
        cache.put(PageCacheKey::global(1), page(1));

        tokio::time::advance(Duration::from_secs(19)).await;
        assert!(cache.get(&PageCacheKey::global(1)).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&PageCacheKey::global(1)).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn put_sweeps_expired_entries() {
        let cache = PageCache::with_ttl(Duration::from_secs(20));
        for number in 1..=5 {
            cache.put(PageCacheKey::global(number), page(50));
        }
        assert_eq!(cache.len(), 5);

        tokio::time::advance(Duration::from_secs(21)).await;
        cache.put(PageCacheKey::global(1), page(50));

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&PageCacheKey::global(2)).is_none());
    }
}
