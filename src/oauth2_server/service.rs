// ABOUTME: The authorization server value shared by every request handler
// ABOUTME: Explicitly wires configuration, store, cache, validators, issuer, and key manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::credentials::CredentialAuthenticator;
use super::issuer::TokenIssuer;
use super::jwks::JwkKeyManager;
use super::models::ClientCredentials;
use super::scope::ScopeValidator;
use crate::cache::{Cache, CacheProvider};
use crate::config::{OAuthConfig, ServerConfig};
use crate::database::{self, TokenStore};
use crate::errors::{AppResult, OAuthError, OAuthResult};
use std::sync::Arc;
use tokenward_core::models::Client;
use tracing::info;

/// OAuth2 authorization server core
///
/// Grant handling lives in `grants`, introspection and revocation in
/// `introspection`.
#[derive(Clone)]
pub struct OAuthService<C: CacheProvider = Cache> {
    pub(super) config: Arc<OAuthConfig>,
    pub(super) store: Arc<dyn TokenStore>,
    pub(super) scopes: ScopeValidator,
    pub(super) credentials: CredentialAuthenticator,
    pub(super) issuer: TokenIssuer<C>,
    pub(super) keys: JwkKeyManager,
}

impl<C: CacheProvider> OAuthService<C> {
    /// Assemble the service from its parts
    #[must_use]
    pub fn new(config: OAuthConfig, store: Arc<dyn TokenStore>, cache: C) -> Self {
        let config = Arc::new(config);
        Self {
            scopes: ScopeValidator::from_config(&config),
            credentials: CredentialAuthenticator::new(Arc::clone(&store), &config),
            issuer: TokenIssuer::new(Arc::clone(&store), cache, Arc::clone(&config)),
            keys: JwkKeyManager::new(Arc::clone(&store), config.jwt_issuer.clone()),
            store,
            config,
        }
    }

    /// Issuance configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Token store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Scope validator
    #[must_use]
    pub const fn scopes(&self) -> &ScopeValidator {
        &self.scopes
    }

    /// Client and user authenticator
    #[must_use]
    pub const fn credentials(&self) -> &CredentialAuthenticator {
        &self.credentials
    }

    /// Token issuer
    #[must_use]
    pub const fn issuer(&self) -> &TokenIssuer<C> {
        &self.issuer
    }

    /// Signing key manager
    #[must_use]
    pub const fn keys(&self) -> &JwkKeyManager {
        &self.keys
    }

    pub(super) async fn authenticate_client(
        &self,
        credentials: Option<&ClientCredentials>,
    ) -> OAuthResult<Client> {
        let credentials = credentials.ok_or(OAuthError::InvalidClientCredentials)?;
        self.credentials
            .authenticate_client(&credentials.client_id, &credentials.client_secret)
            .await
    }
}

impl OAuthService<Cache> {
    /// Open the store and cache named by `config` and assemble the service
    ///
    /// # Errors
    ///
    /// Returns an error if the store or cache cannot be initialized
    pub async fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let store = database::connect(&config.database).await?;
        let cache = Cache::new(config.cache.clone()).await?;
        info!(
            store = %config.database.url,
            cache = cache.backend_name(),
            jwt_enabled = config.oauth.jwt_enabled,
            "Authorization service ready"
        );
        Ok(Self::new(config.oauth.clone(), store, cache))
    }
}
