//! Cache key definitions.

use std::fmt;

use crate::domain::types::FeedKind;

/// Key of one cached feed page.
///
/// Deliberately carries no viewer: only viewer-agnostic pages may be cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageCacheKey {
    pub feed: FeedKind,
    /// The page number as requested, before clamping to the last page.
    pub page: u32,
}

impl PageCacheKey {
    pub fn global(page: u32) -> Self {
        Self {
            feed: FeedKind::Global,
            page,
        }
    }
}

impl fmt::Display for PageCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:page={}", self.feed.as_str(), self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_differ_by_page() {
        assert_ne!(PageCacheKey::global(1), PageCacheKey::global(2));
        assert_eq!(PageCacheKey::global(3).to_string(), "global:page=3");
    }
}
