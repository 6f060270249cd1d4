// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Provides stores, clients, users, signing keys, and service builders
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `tokenward`

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Once, OnceLock};
use std::time::Duration;
use tokenward::{
    cache::{memory::InMemoryCache, CacheConfig, CacheKey, CacheProvider},
    config::{DatabaseUrl, OAuthConfig},
    database::{MemoryStore, SqliteStore, TokenStore},
    errors::{AppError, AppResult},
    oauth2_server::{OAuthService, PasswordVerifier, RsaKeyPair},
};
use tokenward_core::constants::password::{SCHEME_BCRYPT, SCHEME_HMAC_SHA1_V2};
use tokenward_core::models::{Client, User};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Secret of the v2 password scheme used across tests
pub const HMAC_SECRET: &str = "test-hmac-secret";
/// Salt of the v2 password scheme used across tests
pub const HMAC_SALT: &str = "test-salt";
/// Secret of every fixture client
pub const CLIENT_SECRET: &str = "client-secret";
/// Password of every fixture user
pub const USER_PASSWORD: &str = "correct horse battery staple";
/// Tenant of the fixture clients and users
pub const TENANT: &str = "acme";
/// Issuer configured for JWT tests
pub const ISSUER: &str = "https://auth.test";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Issuance configuration with the test HMAC secret and JWT disabled
pub fn test_oauth_config() -> OAuthConfig {
    OAuthConfig {
        jwt_issuer: ISSUER.to_owned(),
        password_secret: HMAC_SECRET.to_owned(),
        password_salt: HMAC_SALT.to_owned(),
        ..OAuthConfig::default()
    }
}

/// Fresh in-process store
pub fn memory_store() -> Arc<dyn TokenStore> {
    init_test_logging();
    Arc::new(MemoryStore::new())
}

/// Fresh migrated in-memory `SQLite` store
pub async fn sqlite_memory_store() -> Result<Arc<dyn TokenStore>> {
    init_test_logging();
    let store = SqliteStore::connect(&DatabaseUrl::SQLiteMemory).await?;
    store.migrate().await?;
    Ok(Arc::new(store))
}

/// Migrated file-backed `SQLite` store inside `dir`
pub async fn sqlite_file_store(dir: &tempfile::TempDir) -> Result<SqliteStore> {
    init_test_logging();
    let path = dir.path().join("tokens.db");
    let store = SqliteStore::connect(&DatabaseUrl::SQLite {
        path: path.to_string_lossy().into_owned(),
    })
    .await?;
    store.migrate().await?;
    Ok(store)
}

/// In-memory cache without the background sweep
pub async fn memory_cache() -> Result<InMemoryCache> {
    let config = CacheConfig {
        enable_background_cleanup: false,
        ..CacheConfig::default()
    };
    Ok(InMemoryCache::new(config).await?)
}

/// Client with a bcrypt secret hash at minimum cost
pub fn test_client(key: &str) -> Client {
    Client {
        id: Uuid::new_v4(),
        key: key.to_owned(),
        secret_hash: bcrypt::hash(CLIENT_SECRET, 4).unwrap(),
        redirect_uri: Some("https://app.test/callback".to_owned()),
        tenant_id: TENANT.to_owned(),
        created_at: Utc::now(),
    }
}

fn blank_user(username: &str) -> User {
    User {
        id: Uuid::new_v4(),
        tenant_id: TENANT.to_owned(),
        username: username.to_owned(),
        account: Some(username.to_owned()),
        phone: None,
        name: Some(format!("{username} tester")),
        password_hash: None,
        password_scheme: None,
        created_at: Utc::now(),
    }
}

/// User whose password is hashed with the v2 HMAC scheme
pub fn hmac_user(username: &str) -> User {
    let mut user = blank_user(username);
    let verifier = PasswordVerifier::new(HMAC_SECRET, HMAC_SALT);
    user.password_hash = Some(verifier.hash_v2(USER_PASSWORD, &user));
    user.password_scheme = Some(SCHEME_HMAC_SHA1_V2.to_owned());
    user
}

/// User whose password is hashed with bcrypt
pub fn bcrypt_user(username: &str) -> User {
    let mut user = blank_user(username);
    user.password_hash = Some(bcrypt::hash(USER_PASSWORD, 4).unwrap());
    user.password_scheme = Some(SCHEME_BCRYPT.to_owned());
    user
}

/// Signing pair shared by every test in the process; generation is slow
pub fn shared_key_pair() -> &'static RsaKeyPair {
    static PAIR: OnceLock<RsaKeyPair> = OnceLock::new();
    PAIR.get_or_init(|| RsaKeyPair::generate_with_key_size("test", 2048).unwrap())
}

/// Service fixture with one registered client and one HMAC user
pub struct Fixture<C: CacheProvider = InMemoryCache> {
    pub service: OAuthService<C>,
    pub store: Arc<dyn TokenStore>,
    pub client: Client,
    pub user: User,
}

/// Build a service over `store` and `cache` with a client and a user
pub async fn fixture_with<C: CacheProvider>(
    config: OAuthConfig,
    store: Arc<dyn TokenStore>,
    cache: C,
) -> Result<Fixture<C>> {
    let client = test_client("web-app");
    let user = hmac_user("alice");
    store.create_client(&client).await?;
    store.create_user(&user).await?;

    let service = OAuthService::new(config, Arc::clone(&store), cache);
    if service.config().jwt_enabled {
        service.keys().install(shared_key_pair()).await?;
    }

    Ok(Fixture {
        service,
        store,
        client,
        user,
    })
}

/// Default fixture over the memory store and memory cache
pub async fn fixture() -> Result<Fixture> {
    fixture_with(test_oauth_config(), memory_store(), memory_cache().await?).await
}

/// Fixture with JWT issuance enabled and a signing pair installed
pub async fn jwt_fixture() -> Result<Fixture> {
    let config = OAuthConfig {
        jwt_enabled: true,
        ..test_oauth_config()
    };
    fixture_with(config, memory_store(), memory_cache().await?).await
}

/// Cache whose every operation fails, for fail-open checks
#[derive(Clone, Default)]
pub struct FailingCache;

fn unavailable() -> AppError {
    AppError::unavailable("cache offline")
}

#[async_trait::async_trait]
impl CacheProvider for FailingCache {
    async fn new(_config: CacheConfig) -> AppResult<Self> {
        Ok(Self)
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        _key: &CacheKey,
        _value: &T,
        _ttl: Duration,
    ) -> AppResult<()> {
        Err(unavailable())
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, _key: &CacheKey) -> AppResult<Option<T>> {
        Err(unavailable())
    }

    async fn invalidate(&self, _key: &CacheKey) -> AppResult<()> {
        Err(unavailable())
    }

    async fn health_check(&self) -> AppResult<()> {
        Err(unavailable())
    }
}
