//! Cache layer
//!
//! In-memory caching for hot read paths: published content listings
//! and popular tags. Values are stored as JSON strings so any
//! serializable type fits through the same interface.
//!
//! # Usage
//!
//! ```rust,ignore
//! use galaxywrite::cache::MemoryCache;
//! use std::time::Duration;
//!
//! let cache = MemoryCache::new();
//! cache.set("tags:popular", &tags, Duration::from_secs(60)).await?;
//! ```

pub mod memory;

pub use memory::MemoryCache;

use crate::config::CacheConfig;
use std::time::Duration;

/// Build the cache from configuration
pub fn create_cache(config: &CacheConfig) -> MemoryCache {
    MemoryCache::with_capacity_and_ttl(
        config.max_entries,
        Duration::from_secs(config.ttl_seconds),
    )
}

/// Cache key for the published content listing
pub fn published_list_key(kind: Option<&str>, page: u32, per_page: u32) -> String {
    format!(
        "content:published:{}:{}:{}",
        kind.unwrap_or("all"),
        page,
        per_page
    )
}

/// Cache key for the popular tags listing
pub fn popular_tags_key(limit: i64) -> String {
    format!("tags:popular:{}", limit)
}
