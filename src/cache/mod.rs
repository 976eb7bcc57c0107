//! Page cache for rendered feed pages.
//!
//! Only the viewer-agnostic global feed is cached. Entries stay valid until
//! their time-to-live elapses or [`PageCache::clear`] runs; writing a post does
//! not evict anything, so a cached page is allowed to be stale for up to one TTL.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 20
//! ```

mod config;
mod keys;
mod lock;
mod store;

pub(crate) use lock::{rw_read, rw_write};

pub use config::CacheConfig;
pub use keys::PageCacheKey;
pub use store::{
    METRIC_PAGE_CACHE_CLEAR, METRIC_PAGE_CACHE_EXPIRED, METRIC_PAGE_CACHE_HIT,
    METRIC_PAGE_CACHE_MISS, PageCache,
};
