//! Page cache configuration.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECONDS: u64 = 20;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve the global feed from the page cache.
    pub enabled: bool,
    /// Seconds an entry stays servable after it was stored.
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl_seconds: settings.ttl.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// A zero TTL makes every entry expire immediately, which is the same as disabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.ttl_seconds > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.ttl(), Duration::from_secs(20));
        assert!(config.is_enabled());
    }

    #[test]
    fn zero_ttl_disables_cache() {
        let config = CacheConfig {
            ttl_seconds: 0,
            ..Default::default()
        };
        assert!(!config.is_enabled());
    }

    #[test]
    fn explicit_disable_wins() {
        let config = CacheConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(!config.is_enabled());
    }
}
