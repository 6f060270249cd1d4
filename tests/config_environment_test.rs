// ABOUTME: Tests for environment-driven configuration loading
// ABOUTME: Validates defaults, overrides, and rejection of malformed values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serial_test::serial;
use std::env;
use tokenward::config::{DatabaseUrl, OAuthConfig, ServerConfig};

const VARS: &[&str] = &[
    "HTTP_PORT",
    "DATABASE_URL",
    "AUTO_MIGRATE",
    "REDIS_URL",
    "CACHE_MAX_ENTRIES",
    "OAUTH_ACCESS_TOKEN_LIFETIME_SECS",
    "OAUTH_REFRESH_TOKEN_LIFETIME_SECS",
    "OAUTH_AUTH_CODE_LIFETIME_SECS",
    "OAUTH_JWT_ENABLED",
    "OAUTH_JWT_ISSUER",
    "OAUTH_ALLOWED_SCOPES",
    "OAUTH_DEFAULT_SCOPE",
    "PASSWORD_HMAC_SECRET",
    "PASSWORD_HMAC_SALT",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();
    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8080);
    assert_eq!(
        config.database.url,
        DatabaseUrl::SQLite {
            path: "./data/tokenward.db".to_owned()
        }
    );
    assert!(config.database.auto_migrate);
    assert!(config.cache.redis_url.is_none());
    assert_eq!(config.oauth.access_token_lifetime_secs, 3600);
    assert_eq!(config.oauth.refresh_token_lifetime_secs, 1_209_600);
    assert!(!config.oauth.jwt_enabled);
    assert_eq!(config.oauth.default_scope, "read");
    assert_eq!(config.oauth.allowed_scopes, vec!["read", "read_write"]);
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    env::set_var("HTTP_PORT", "9090");
    env::set_var("DATABASE_URL", "memory://");
    env::set_var("OAUTH_JWT_ENABLED", "true");
    env::set_var("OAUTH_JWT_ISSUER", "https://auth.example.com");
    env::set_var("OAUTH_ALLOWED_SCOPES", "read,write admin");
    env::set_var("OAUTH_DEFAULT_SCOPE", "read write");
    env::set_var("PASSWORD_HMAC_SECRET", "s3cret");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 9090);
    assert_eq!(config.database.url, DatabaseUrl::Memory);
    assert!(config.oauth.jwt_enabled);
    assert_eq!(config.oauth.jwt_issuer, "https://auth.example.com");
    assert_eq!(config.oauth.allowed_scopes, vec!["read", "write", "admin"]);
    assert_eq!(config.oauth.default_scope, "read write");
    assert!(config.oauth.password_secret_fingerprint().is_some());
}

#[test]
#[serial]
fn test_malformed_values_are_rejected() {
    clear_env();
    env::set_var("OAUTH_ACCESS_TOKEN_LIFETIME_SECS", "an hour");
    assert!(OAuthConfig::from_env().is_err());

    env::set_var("OAUTH_ACCESS_TOKEN_LIFETIME_SECS", "-5");
    assert!(OAuthConfig::from_env().is_err());
    clear_env();

    env::set_var("DATABASE_URL", "postgres://localhost/tokens");
    assert!(ServerConfig::from_env().is_err());
    clear_env();
}

#[test]
#[serial]
fn test_default_scope_outside_allow_list_is_rejected() {
    clear_env();
    env::set_var("OAUTH_ALLOWED_SCOPES", "read");
    env::set_var("OAUTH_DEFAULT_SCOPE", "admin");

    let error = OAuthConfig::from_env().unwrap_err();
    clear_env();
    assert!(error.message.contains("admin"));
}
