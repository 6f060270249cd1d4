// ABOUTME: Redis-backed access token mirror shared across server instances
// ABOUTME: Namespaced keys, millisecond expiry, and undecodable entries read as misses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{CacheConfig, CacheKey, CacheProvider};
use crate::config::cache::RedisConnectionConfig;
use crate::errors::{AppError, AppResult};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, RedisError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokenward_core::constants::cache::CACHE_KEY_PREFIX;
use tracing::{debug, info, warn};

/// Access token mirror in Redis
///
/// Entries live under `CACHE_KEY_PREFIX` followed by the token value and
/// expire with `PX`, so a mirrored token never outlives its row by more than
/// clock skew. The store stays authoritative: an entry that fails to decode
/// is deleted and reported as a miss.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

/// Redis key of a mirrored token
fn mirror_key(key: &CacheKey) -> String {
    format!("{CACHE_KEY_PREFIX}{key}")
}

/// `PX` argument for a TTL; `None` when nothing should be written
fn expiry_millis(ttl: Duration) -> Option<u64> {
    if ttl.is_zero() {
        return None;
    }
    Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1))
}

fn backend_error(operation: &'static str, e: &RedisError) -> AppError {
    warn!(operation, error = %e, "Redis token mirror command failed");
    AppError::unavailable(format!("Redis {operation} failed: {e}"))
}

fn manager_config(tuning: &RedisConnectionConfig) -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_connection_timeout(Duration::from_secs(tuning.connection_timeout_secs))
        .set_response_timeout(Duration::from_secs(tuning.response_timeout_secs))
        .set_number_of_retries(tuning.reconnection_retries)
        .set_exponent_base(tuning.retry_exponent_base)
        .set_max_delay(tuning.max_retry_delay_ms)
}

impl RedisCache {
    /// Open the connection manager, retrying the first connect with backoff
    async fn connect(config: &CacheConfig) -> AppResult<Self> {
        let url = config
            .redis_url
            .as_deref()
            .ok_or_else(|| AppError::config("REDIS_URL is required for the Redis cache backend"))?;
        let client = redis::Client::open(url)
            .map_err(|e| AppError::config_invalid(format!("Invalid REDIS_URL: {e}")))?;

        let tuning = &config.redis_connection;
        let attempts = tuning.initial_connection_retries.saturating_add(1);
        let mut delay_ms = tuning.initial_retry_delay_ms;

        let mut attempt = 1;
        loop {
            match ConnectionManager::new_with_config(client.clone(), manager_config(tuning)).await
            {
                Ok(manager) => {
                    info!(attempt, "Connected to Redis token mirror");
                    return Ok(Self { manager });
                }
                Err(e) if attempt < attempts => {
                    warn!(attempt, attempts, delay_ms, error = %e, "Redis connect failed, retrying");
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = delay_ms.saturating_mul(2).min(tuning.max_retry_delay_ms);
                    attempt += 1;
                }
                Err(e) => {
                    return Err(AppError::unavailable(format!(
                        "Redis token mirror unreachable after {attempts} attempts: {e}"
                    )));
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl CacheProvider for RedisCache {
    async fn new(config: CacheConfig) -> AppResult<Self> {
        Self::connect(&config).await
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let Some(millis) = expiry_millis(ttl) else {
            return Ok(());
        };
        let payload = serde_json::to_vec(value)
            .map_err(|e| AppError::serialization(format!("Token mirror encode failed: {e}")))?;

        let mut conn = self.manager.clone();
        conn.pset_ex::<_, _, ()>(mirror_key(key), payload, millis)
            .await
            .map_err(|e| backend_error("PSETEX", &e))
    }

    async fn get<T: for<'de> Deserialize<'de> + Send>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let redis_key = mirror_key(key);
        let mut conn = self.manager.clone();
        let Some(bytes) = conn
            .get::<_, Option<Vec<u8>>>(&redis_key)
            .await
            .map_err(|e| backend_error("GET", &e))?
        else {
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // Written by an incompatible build; the store still has the row
                debug!(error = %e, "Dropping undecodable token mirror entry");
                conn.del::<_, ()>(&redis_key)
                    .await
                    .map_err(|e| backend_error("DEL", &e))?;
                Ok(None)
            }
        }
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(mirror_key(key))
            .await
            .map_err(|e| backend_error("DEL", &e))
    }

    async fn health_check(&self) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| backend_error("PING", &e))?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(AppError::unavailable(format!(
                "Unexpected Redis PING reply '{reply}'"
            )))
        }
    }
}
