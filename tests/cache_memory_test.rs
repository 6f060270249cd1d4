// ABOUTME: Unit tests for the in-memory token mirror
// ABOUTME: Tests TTL expiration, capacity limits, invalidation, and factory selection
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokenward::cache::{factory::Cache, CacheConfig, CacheKey, CacheProvider};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct TestData {
    value: String,
    count: u32,
}

fn test_data(count: u32) -> TestData {
    TestData {
        value: format!("entry-{count}"),
        count,
    }
}

/// Helper: Create in-memory cache with custom capacity
async fn create_test_cache(max_entries: usize) -> Result<Cache> {
    let config = CacheConfig {
        max_entries,
        redis_url: None,
        enable_background_cleanup: false,
        ..CacheConfig::default()
    };
    Ok(Cache::new(config).await?)
}

#[tokio::test]
async fn test_cache_set_and_get() -> Result<()> {
    let cache = create_test_cache(100).await?;
    assert_eq!(cache.backend_name(), "memory");

    let key = CacheKey::access_token("token-a");
    cache.set(&key, &test_data(42), Duration::from_secs(10)).await?;

    let retrieved: Option<TestData> = cache.get(&key).await?;
    assert_eq!(retrieved, Some(test_data(42)));

    Ok(())
}

async fn is_live(cache: &Cache, key: &CacheKey) -> Result<bool> {
    Ok(cache.get::<TestData>(key).await?.is_some())
}

#[tokio::test]
async fn test_cache_expiration() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let key = CacheKey::access_token("short-lived");

    cache.set(&key, &test_data(1), Duration::from_millis(50)).await?;
    assert!(is_live(&cache, &key).await?);

    tokio::time::sleep(Duration::from_millis(120)).await;

    assert!(!is_live(&cache, &key).await?);

    Ok(())
}

#[tokio::test]
async fn test_zero_ttl_writes_nothing() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let key = CacheKey::access_token("already-expired");

    cache.set(&key, &test_data(1), Duration::ZERO).await?;
    assert!(!is_live(&cache, &key).await?);

    Ok(())
}

#[tokio::test]
async fn test_cache_capacity_evicts_least_recently_used() -> Result<()> {
    let cache = create_test_cache(2).await?;
    let first = CacheKey::access_token("first");
    let second = CacheKey::access_token("second");
    let third = CacheKey::access_token("third");

    cache.set(&first, &test_data(1), Duration::from_secs(60)).await?;
    cache.set(&second, &test_data(2), Duration::from_secs(60)).await?;

    // Touch `first` so `second` becomes the eviction candidate
    let _: Option<TestData> = cache.get(&first).await?;
    cache.set(&third, &test_data(3), Duration::from_secs(60)).await?;

    assert!(is_live(&cache, &first).await?);
    assert!(!is_live(&cache, &second).await?);
    assert!(is_live(&cache, &third).await?);

    Ok(())
}

#[tokio::test]
async fn test_cache_invalidate() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let a = CacheKey::access_token("a");
    let b = CacheKey::access_token("b");

    cache.set(&a, &test_data(1), Duration::from_secs(60)).await?;
    cache.set(&b, &test_data(2), Duration::from_secs(60)).await?;

    cache.invalidate(&a).await?;
    assert!(!is_live(&cache, &a).await?);
    assert!(is_live(&cache, &b).await?);

    // Invalidating a missing key is not an error
    cache.invalidate(&a).await?;
    cache.health_check().await?;

    Ok(())
}

#[tokio::test]
async fn test_cache_key_is_the_token_value() {
    assert_eq!(CacheKey::access_token("abc").to_string(), "abc");
}
