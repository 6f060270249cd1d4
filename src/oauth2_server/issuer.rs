// ABOUTME: Token issuer owning access token, refresh token, and authorization code lifecycles
// ABOUTME: Writes the store transactionally and mirrors live access tokens into the cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Token Issuer
//!
//! The store is authoritative. The cache holds a best-effort copy of live
//! access tokens: it is written only after a commit, and every cache error is
//! logged and treated as a miss.

use crate::cache::{Cache, CacheKey, CacheProvider};
use crate::config::OAuthConfig;
use crate::database::TokenStore;
use crate::errors::{OAuthError, OAuthResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use tokenward_core::models::{AccessToken, AuthorizationCode, Client, RefreshToken, User};
use tracing::{debug, error, warn};

/// Random bytes behind every token and code value
const TOKEN_BYTES: usize = 32;

/// Generate an opaque token value: 32 CSPRNG bytes, base64url without padding
///
/// # Errors
///
/// Returns [`OAuthError::Internal`] if the system RNG fails
pub fn generate_token_value() -> OAuthResult<String> {
    let mut bytes = [0_u8; TOKEN_BYTES];
    SystemRandom::new().fill(&mut bytes).map_err(|_| {
        error!("SystemRandom failed - cannot generate token values");
        OAuthError::internal("system RNG failure")
    })?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Issues, resolves, and revokes tokens
#[derive(Clone)]
pub struct TokenIssuer<C: CacheProvider = Cache> {
    store: Arc<dyn TokenStore>,
    cache: C,
    config: Arc<OAuthConfig>,
}

impl<C: CacheProvider> TokenIssuer<C> {
    /// Create an issuer over `store` mirroring into `cache`
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, cache: C, config: Arc<OAuthConfig>) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// Cache mirror
    #[must_use]
    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// Issue an access token, purging the principal's expired tokens in the
    /// same transaction
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Storage`] if the transaction fails; nothing is
    /// purged or inserted in that case
    pub async fn grant_access_token(
        &self,
        client: &Client,
        user: Option<&User>,
        expires_in: i64,
        scope: &str,
    ) -> OAuthResult<AccessToken> {
        let now = Utc::now();
        let token = AccessToken {
            token: generate_token_value()?,
            client_id: client.id,
            user_id: user.map(|u| u.id),
            tenant_id: user.map_or_else(|| client.tenant_id.clone(), |u| u.tenant_id.clone()),
            scope: scope.to_owned(),
            expires_at: now + Duration::seconds(expires_in),
        };

        let purged = self
            .store
            .purge_expired_and_insert_access_token(&token, now)
            .await?;
        debug!(
            client_id = %client.id,
            user_id = ?token.user_id,
            purged = purged.len(),
            "Issued access token"
        );

        for value in &purged {
            if let Err(e) = self.cache.invalidate(&CacheKey::access_token(value)).await {
                warn!(error = %e, "Failed to drop purged access token from cache");
            }
        }
        self.mirror(&token).await;
        Ok(token)
    }

    async fn mirror(&self, token: &AccessToken) {
        let Some(ttl) = token.remaining_at(Utc::now()) else {
            debug!("Access token already expired, not mirrored");
            return;
        };
        if let Err(e) = self
            .cache
            .set(&CacheKey::access_token(&token.token), token, ttl)
            .await
        {
            warn!(error = %e, "Failed to mirror access token into cache");
        }
    }

    /// Return the live refresh token of (client, user), replacing an expired
    /// one, or create the first
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Storage`] if a store operation fails
    pub async fn get_or_create_refresh_token(
        &self,
        client: &Client,
        user: &User,
        expires_in: i64,
        scope: &str,
    ) -> OAuthResult<RefreshToken> {
        let now = Utc::now();
        if let Some(existing) = self.store.find_refresh_token_for(client.id, user.id).await? {
            if !existing.is_expired_at(now) {
                return Ok(existing);
            }
            self.store.delete_refresh_token(&existing.token).await?;
            debug!(client_id = %client.id, user_id = %user.id, "Replaced expired refresh token");
        }

        let token = RefreshToken {
            token: generate_token_value()?,
            client_id: client.id,
            user_id: user.id,
            tenant_id: user.tenant_id.clone(),
            scope: scope.to_owned(),
            expires_at: now + Duration::seconds(expires_in),
        };
        self.store.create_refresh_token(&token).await?;
        Ok(token)
    }

    /// Access token plus refresh token with the configured lifetimes
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Storage`] if a store operation fails
    pub async fn login(
        &self,
        client: &Client,
        user: &User,
        scope: &str,
    ) -> OAuthResult<(AccessToken, RefreshToken)> {
        let access = self
            .grant_access_token(
                client,
                Some(user),
                self.config.access_token_lifetime_secs,
                scope,
            )
            .await?;
        let refresh = self
            .get_or_create_refresh_token(
                client,
                user,
                self.config.refresh_token_lifetime_secs,
                scope,
            )
            .await?;
        Ok((access, refresh))
    }

    /// Mint a single-use authorization code
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Storage`] if the insert fails
    pub async fn grant_authorization_code(
        &self,
        client: &Client,
        user: &User,
        expires_in: i64,
        redirect_uri: Option<&str>,
        scope: &str,
    ) -> OAuthResult<AuthorizationCode> {
        let code = AuthorizationCode {
            code: generate_token_value()?,
            client_id: client.id,
            user_id: user.id,
            tenant_id: user.tenant_id.clone(),
            redirect_uri: redirect_uri.map(str::to_owned),
            scope: scope.to_owned(),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        };
        self.store.create_authorization_code(&code).await?;
        Ok(code)
    }

    /// Consume an authorization code issued to `client`
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidOrExpiredToken`] when the code is unknown,
    /// belongs to another client, or has expired
    pub async fn redeem_authorization_code(
        &self,
        code: &str,
        client: &Client,
    ) -> OAuthResult<AuthorizationCode> {
        match self.store.take_authorization_code(code, client.id).await? {
            Some(code) if !code.is_expired_at(Utc::now()) => Ok(code),
            Some(_) => {
                debug!(client_id = %client.id, "Authorization code expired");
                Err(OAuthError::InvalidOrExpiredToken)
            }
            None => Err(OAuthError::InvalidOrExpiredToken),
        }
    }

    /// Resolve a live access token, cache first
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::AccessTokenNotFound`] or
    /// [`OAuthError::AccessTokenExpired`]
    pub async fn authenticate(&self, token: &str) -> OAuthResult<AccessToken> {
        let key = CacheKey::access_token(token);
        let cached = match self.cache.get::<AccessToken>(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "Cache lookup failed, falling back to store");
                None
            }
        };

        let record = match cached {
            Some(record) => record,
            None => self
                .store
                .get_access_token(token)
                .await?
                .ok_or(OAuthError::AccessTokenNotFound)?,
        };

        if record.is_expired_at(Utc::now()) {
            return Err(OAuthError::AccessTokenExpired);
        }
        Ok(record)
    }

    /// Resolve a live refresh token issued to `client_id`
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::RefreshTokenNotFound`] or
    /// [`OAuthError::RefreshTokenExpired`]
    pub async fn get_valid_refresh_token(
        &self,
        token: &str,
        client_id: uuid::Uuid,
    ) -> OAuthResult<RefreshToken> {
        let record = self
            .store
            .get_refresh_token(token, client_id)
            .await?
            .ok_or(OAuthError::RefreshTokenNotFound)?;
        if record.is_expired_at(Utc::now()) {
            return Err(OAuthError::RefreshTokenExpired);
        }
        Ok(record)
    }

    /// Delete an access token and drop its mirror; `false` when unknown
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Storage`] if the delete fails
    pub async fn revoke_access_token(&self, token: &str) -> OAuthResult<bool> {
        let deleted = self.store.delete_access_token(token).await?;
        if deleted {
            if let Err(e) = self.cache.invalidate(&CacheKey::access_token(token)).await {
                warn!(error = %e, "Failed to drop revoked access token from cache");
            }
        }
        Ok(deleted)
    }

    /// Delete a refresh token; `false` when unknown
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Storage`] if the delete fails
    pub async fn revoke_refresh_token(&self, token: &str) -> OAuthResult<bool> {
        Ok(self.store.delete_refresh_token(token).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_values_are_urlsafe_and_unique() {
        let a = generate_token_value().unwrap();
        let b = generate_token_value().unwrap();
        assert_ne!(a, b);
        // 32 bytes -> 43 base64url characters without padding
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
