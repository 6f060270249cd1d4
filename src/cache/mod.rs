// ABOUTME: Cache abstraction for the access token mirror
// ABOUTME: Pluggable backends (in-memory LRU, Redis) behind one async provider trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! The cache holds a derived copy of live access tokens keyed by token value.
//! The relational store stays authoritative; callers treat every cache error
//! as a miss.

/// Cache factory selecting a backend from configuration
pub mod factory;
/// In-memory cache implementation
pub mod memory;
/// Redis cache implementation
pub mod redis;

pub use factory::Cache;

use crate::config::cache::RedisConnectionConfig;
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokenward_core::constants::cache::{DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CLEANUP_INTERVAL_SECS};

/// Token mirror contract: write with TTL, read, drop, and ping
///
/// # Examples
///
/// ```rust,no_run
/// use tokenward::cache::{CacheConfig, CacheKey, CacheProvider};
/// use tokenward::cache::memory::InMemoryCache;
/// use std::time::Duration;
/// # async fn example() -> Result<(), tokenward::errors::AppError> {
///
/// let config = CacheConfig {
///     enable_background_cleanup: false,
///     ..Default::default()
/// };
/// let cache = InMemoryCache::new(config).await?;
///
/// let key = CacheKey::access_token("opaque-token-value");
/// cache.set(&key, &"payload", Duration::from_secs(60)).await?;
/// let cached: Option<String> = cache.get(&key).await?;
/// assert_eq!(cached.as_deref(), Some("payload"));
///
/// cache.invalidate(&key).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait CacheProvider: Send + Sync + Clone {
    /// Create new cache instance with configuration
    ///
    /// # Errors
    ///
    /// Returns an error if cache initialization fails
    async fn new(config: CacheConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Store value in cache with TTL; a zero TTL writes nothing
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>;

    /// Retrieve value from cache; `None` on miss or expiry
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or deserialization fails
    async fn get<T: for<'de> Deserialize<'de> + Send>(&self, key: &CacheKey) -> AppResult<Option<T>>;

    /// Remove one entry
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails
    async fn invalidate(&self, key: &CacheKey) -> AppResult<()>;

    /// Verify the backend is reachable
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unhealthy
    async fn health_check(&self) -> AppResult<()>;
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum entries held by the in-memory backend
    pub max_entries: usize,
    /// Redis URL; selects the Redis backend when set
    pub redis_url: Option<String>,
    /// Interval between in-memory expiry sweeps
    pub cleanup_interval: Duration,
    /// Run the in-memory expiry sweep task
    pub enable_background_cleanup: bool,
    /// Redis connection tuning
    pub redis_connection: RedisConnectionConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            redis_url: None,
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            // Tests disable this explicitly
            enable_background_cleanup: true,
            redis_connection: RedisConnectionConfig::default(),
        }
    }
}

/// Cache key of a mirrored token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key of the access token mirror; the token value itself
    #[must_use]
    pub fn access_token(token: &str) -> Self {
        Self(token.to_owned())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
