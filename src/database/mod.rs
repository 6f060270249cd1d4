// ABOUTME: Token store abstraction over clients, users, tokens, codes, and signing keys
// ABOUTME: SQLite backs production; the in-process memory store backs tests and memory:// URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Token Store
//!
//! The relational store is the source of truth for every credential the
//! server issues. Implementations must make
//! [`TokenStore::purge_expired_and_insert_access_token`] atomic.

/// In-process store used by tests and `memory://`
pub mod memory;
/// `SQLite` store built on sqlx
pub mod sqlite;
/// Transaction guard and retry helpers
pub mod transactions;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::config::{DatabaseConfig, DatabaseUrl};
use crate::errors::DatabaseError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokenward_core::models::{
    AccessToken, AuthorizationCode, Client, JwkEntry, RefreshToken, User,
};
use tracing::info;
use uuid::Uuid;

/// Persistence contract of the authorization server
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Create the schema if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails
    async fn migrate(&self) -> Result<(), DatabaseError>;

    // ================================
    // Clients
    // ================================

    /// Register a client
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::ConstraintViolation`] for a duplicate id or key
    async fn create_client(&self, client: &Client) -> Result<(), DatabaseError>;

    /// Get a client by internal id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn get_client(&self, client_id: Uuid) -> Result<Option<Client>, DatabaseError>;

    /// Get a client by its public key, ignoring case
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn get_client_by_key(&self, key: &str) -> Result<Option<Client>, DatabaseError>;

    /// Remove a client; token rows referencing it are left in place
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn delete_client(&self, client_id: Uuid) -> Result<bool, DatabaseError>;

    // ================================
    // Users
    // ================================

    /// Create a user
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::ConstraintViolation`] for a duplicate id or
    /// a duplicate username within the tenant
    async fn create_user(&self, user: &User) -> Result<(), DatabaseError>;

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, DatabaseError>;

    /// Find a user by username within a tenant, ignoring case
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn find_user_by_username(
        &self,
        tenant_id: &str,
        username: &str,
    ) -> Result<Option<User>, DatabaseError>;

    /// Find a user by account identifier within a tenant
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn find_user_by_account(
        &self,
        tenant_id: &str,
        account: &str,
    ) -> Result<Option<User>, DatabaseError>;

    /// Find a user by phone number within a tenant
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn find_user_by_phone(
        &self,
        tenant_id: &str,
        phone: &str,
    ) -> Result<Option<User>, DatabaseError>;

    /// Remove a user; token rows referencing it are left in place
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, DatabaseError>;

    // ================================
    // Access tokens
    // ================================

    /// Atomically delete the expired access tokens of the token's principal
    /// and insert `token`
    ///
    /// The principal is (`client_id`, `user_id`), where an absent user only
    /// matches rows without a user. Returns the values of the purged tokens.
    /// On failure nothing is deleted or inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement or the commit fails
    async fn purge_expired_and_insert_access_token(
        &self,
        token: &AccessToken,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, DatabaseError>;

    /// Get an access token by value, expired or not
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn get_access_token(&self, token: &str) -> Result<Option<AccessToken>, DatabaseError>;

    /// Delete an access token; `false` when no row matched
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn delete_access_token(&self, token: &str) -> Result<bool, DatabaseError>;

    // ================================
    // Refresh tokens
    // ================================

    /// Most recent refresh token held by (client, user)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn find_refresh_token_for(
        &self,
        client_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<RefreshToken>, DatabaseError>;

    /// Insert a refresh token
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::ConstraintViolation`] for a duplicate value
    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<(), DatabaseError>;

    /// Get a refresh token by value, restricted to `client_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn get_refresh_token(
        &self,
        token: &str,
        client_id: Uuid,
    ) -> Result<Option<RefreshToken>, DatabaseError>;

    /// Delete a refresh token; `false` when no row matched
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn delete_refresh_token(&self, token: &str) -> Result<bool, DatabaseError>;

    // ================================
    // Authorization codes
    // ================================

    /// Insert an authorization code
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::ConstraintViolation`] for a duplicate value
    async fn create_authorization_code(
        &self,
        code: &AuthorizationCode,
    ) -> Result<(), DatabaseError>;

    /// Delete and return the code issued to `client_id`, if any
    ///
    /// Expired codes are returned too so the caller decides how to reject them.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn take_authorization_code(
        &self,
        code: &str,
        client_id: Uuid,
    ) -> Result<Option<AuthorizationCode>, DatabaseError>;

    // ================================
    // Signing keys
    // ================================

    /// Store a key entry
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::ConstraintViolation`] for a duplicate key id
    async fn create_jwk(&self, entry: &JwkEntry) -> Result<(), DatabaseError>;

    /// Every key entry of a group, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    async fn list_jwks(&self, sid: &str) -> Result<Vec<JwkEntry>, DatabaseError>;
}

/// Open the store named by `config`, running migrations when enabled
///
/// # Errors
///
/// Returns an error if the store cannot be opened or migrated
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn TokenStore>, DatabaseError> {
    let store: Arc<dyn TokenStore> = match &config.url {
        DatabaseUrl::Memory => Arc::new(MemoryStore::new()),
        url @ (DatabaseUrl::SQLite { .. } | DatabaseUrl::SQLiteMemory) => {
            Arc::new(SqliteStore::connect(url).await?)
        }
    };

    if config.auto_migrate {
        store.migrate().await?;
        info!(url = %config.url, "Token store schema ready");
    }
    Ok(store)
}
