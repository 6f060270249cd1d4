// ABOUTME: Integration tests for the Redis token mirror
// ABOUTME: Runs against a real Redis instance when REDIS_URL is set and skips otherwise
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use common::{fixture_with, memory_store, test_oauth_config};
use redis::AsyncCommands;
use std::time::Duration;
use tokenward::cache::redis::RedisCache;
use tokenward::cache::{CacheConfig, CacheKey, CacheProvider};
use tokenward::errors::OAuthError;
use tokenward_core::constants::cache::CACHE_KEY_PREFIX;
use tokenward_core::models::AccessToken;
use uuid::Uuid;

/// Redis mirror from `REDIS_URL`; `None` when the variable is unset
async fn create_redis_cache() -> Result<Option<RedisCache>> {
    let Ok(redis_url) = std::env::var("REDIS_URL") else {
        println!("REDIS_URL not set, skipping Redis mirror tests");
        return Ok(None);
    };

    let config = CacheConfig {
        redis_url: Some(redis_url),
        enable_background_cleanup: false,
        ..CacheConfig::default()
    };
    Ok(Some(RedisCache::new(config).await?))
}

macro_rules! require_redis {
    ($cache:expr) => {
        match $cache {
            Some(cache) => cache,
            None => {
                println!("Skipping test: Redis not available");
                return Ok(());
            }
        }
    };
}

fn unique_key() -> CacheKey {
    CacheKey::access_token(&Uuid::new_v4().to_string())
}

#[tokio::test]
async fn test_redis_mirror_health_check() -> Result<()> {
    let cache = require_redis!(create_redis_cache().await?);
    cache.health_check().await?;
    Ok(())
}

#[tokio::test]
async fn test_redis_mirror_set_get_invalidate() -> Result<()> {
    let cache = require_redis!(create_redis_cache().await?);
    let key = unique_key();

    cache.set(&key, &"payload", Duration::from_secs(60)).await?;
    let hit: Option<String> = cache.get(&key).await?;
    assert_eq!(hit.as_deref(), Some("payload"));

    cache.invalidate(&key).await?;
    let miss: Option<String> = cache.get(&key).await?;
    assert!(miss.is_none());

    Ok(())
}

#[tokio::test]
async fn test_redis_mirror_honors_subsecond_expiry() -> Result<()> {
    let cache = require_redis!(create_redis_cache().await?);
    let key = unique_key();

    cache.set(&key, &"brief", Duration::from_millis(150)).await?;
    tokio::time::sleep(Duration::from_millis(400)).await;
    let miss: Option<String> = cache.get(&key).await?;
    assert!(miss.is_none());

    cache.set(&key, &"never", Duration::ZERO).await?;
    let miss: Option<String> = cache.get(&key).await?;
    assert!(miss.is_none());

    Ok(())
}

#[tokio::test]
async fn test_redis_mirror_drops_undecodable_entries() -> Result<()> {
    let cache = require_redis!(create_redis_cache().await?);
    let key = unique_key();
    let raw_key = format!("{CACHE_KEY_PREFIX}{key}");

    let client = redis::Client::open(std::env::var("REDIS_URL")?)?;
    let mut conn = client.get_multiplexed_async_connection().await?;
    conn.set_ex::<_, _, ()>(&raw_key, "not json", 60).await?;

    let miss: Option<AccessToken> = cache.get(&key).await?;
    assert!(miss.is_none());
    let remaining: bool = conn.exists(&raw_key).await?;
    assert!(!remaining);

    Ok(())
}

#[tokio::test]
async fn test_issuer_over_redis_mirror() -> Result<()> {
    let cache = require_redis!(create_redis_cache().await?);
    let fx = fixture_with(test_oauth_config(), memory_store(), cache).await?;
    let issuer = fx.service.issuer();

    let token = issuer
        .grant_access_token(&fx.client, Some(&fx.user), 60, "read")
        .await?;
    let key = CacheKey::access_token(&token.token);
    let mirrored: Option<AccessToken> = issuer.cache().get(&key).await?;
    assert_eq!(mirrored.as_ref(), Some(&token));

    assert!(issuer.revoke_access_token(&token.token).await?);
    let mirrored: Option<AccessToken> = issuer.cache().get(&key).await?;
    assert!(mirrored.is_none());
    assert!(matches!(
        issuer.authenticate(&token.token).await,
        Err(OAuthError::AccessTokenNotFound)
    ));

    Ok(())
}
