// ABOUTME: Environment-driven server configuration for the authorization server
// ABOUTME: Combines HTTP, database, cache, and OAuth settings loaded at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::cache::CacheConfig;
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tokenward_core::constants::defaults;
use tracing::info;

use super::database::DatabaseConfig;
use super::oauth::OAuthConfig;

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Token store configuration
    pub database: DatabaseConfig,
    /// Cache mirror configuration
    pub cache: CacheConfig,
    /// Token issuance configuration
    pub oauth: OAuthConfig,
}

impl ServerConfig {
    /// Load the full configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but invalid
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: parse_env("HTTP_PORT", defaults::HTTP_PORT)?,
            database: DatabaseConfig::from_env()?,
            cache: CacheConfig::from_env(),
            oauth: OAuthConfig::from_env()?,
        };

        info!(
            http_port = config.http_port,
            database = %config.database.url,
            redis = config.cache.redis_url.is_some(),
            "Server configuration loaded"
        );
        Ok(config)
    }
}

/// Read `key`, falling back to `default` when unset
pub(crate) fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Read and parse `key`, falling back to `default` when unset
///
/// A set but unparseable value is an error rather than a silent default.
pub(crate) fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            AppError::config_invalid(format!("Invalid {key} value '{raw}': {e}"))
        }),
        Err(_) => Ok(default),
    }
}
