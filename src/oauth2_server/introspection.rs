// ABOUTME: Token introspection and revocation over access tokens, refresh tokens, and JWTs
// ABOUTME: Resolves a token to its owning client and user, or deletes it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::models::{ClientCredentials, IntrospectRequest, IntrospectionResponse, RevokeRequest};
use super::service::OAuthService;
use crate::cache::CacheProvider;
use crate::errors::{OAuthError, OAuthResult};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use tokenward_core::constants::oauth::{token_hints, TOKEN_TYPE_BEARER};
use tracing::debug;
use uuid::Uuid;

/// Kind of token named by `token_type_hint`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTypeHint {
    /// Opaque access token
    AccessToken,
    /// Opaque refresh token
    RefreshToken,
    /// JWT whose `jti` names an access token
    Jwt,
}

impl FromStr for TokenTypeHint {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | token_hints::ACCESS_TOKEN => Ok(Self::AccessToken),
            token_hints::REFRESH_TOKEN => Ok(Self::RefreshToken),
            token_hints::JWT => Ok(Self::Jwt),
            other => Err(OAuthError::InvalidTokenHint {
                hint: other.to_owned(),
            }),
        }
    }
}

impl TokenTypeHint {
    /// Parse an optional hint; absent means access token
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidTokenHint`] for unknown hints
    pub fn parse_optional(hint: Option<&str>) -> OAuthResult<Self> {
        hint.map_or(Ok(Self::AccessToken), str::parse)
    }
}

/// Fields shared by every live token kind
struct TokenFacts<'a> {
    client_id: Uuid,
    user_id: Option<Uuid>,
    tenant_id: &'a str,
    scope: &'a str,
    expires_at: DateTime<Utc>,
}

impl<C: CacheProvider> OAuthService<C> {
    /// Resolve a token for an authenticated client
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidClientCredentials`],
    /// [`OAuthError::TokenMissing`], [`OAuthError::InvalidTokenHint`], the
    /// lookup error of the hinted token kind, or
    /// [`OAuthError::ClientNotFound`] / [`OAuthError::UserNotFound`] when the
    /// token outlived its owner
    pub async fn introspect(
        &self,
        basic: Option<ClientCredentials>,
        request: IntrospectRequest,
    ) -> OAuthResult<IntrospectionResponse> {
        let client = self.authenticate_client(basic.as_ref()).await?;
        if request.token.is_empty() {
            return Err(OAuthError::TokenMissing);
        }
        let hint = TokenTypeHint::parse_optional(request.token_type_hint.as_deref())?;
        debug!(client_key = %client.key, ?hint, "Introspecting token");

        match hint {
            TokenTypeHint::AccessToken => self.introspect_access_token(&request.token).await,
            TokenTypeHint::RefreshToken => {
                let token = self
                    .issuer
                    .get_valid_refresh_token(&request.token, client.id)
                    .await?;
                self.describe(TokenFacts {
                    client_id: token.client_id,
                    user_id: Some(token.user_id),
                    tenant_id: &token.tenant_id,
                    scope: &token.scope,
                    expires_at: token.expires_at,
                })
                .await
            }
            TokenTypeHint::Jwt => {
                let claims = self.keys.verify(&request.token).await?;
                self.introspect_access_token(&claims.jti).await
            }
        }
    }

    async fn introspect_access_token(&self, token: &str) -> OAuthResult<IntrospectionResponse> {
        let token = self.issuer.authenticate(token).await?;
        self.describe(TokenFacts {
            client_id: token.client_id,
            user_id: token.user_id,
            tenant_id: &token.tenant_id,
            scope: &token.scope,
            expires_at: token.expires_at,
        })
        .await
    }

    async fn describe(&self, facts: TokenFacts<'_>) -> OAuthResult<IntrospectionResponse> {
        let client = self
            .store
            .get_client(facts.client_id)
            .await?
            .ok_or(OAuthError::ClientNotFound)?;

        let user = match facts.user_id {
            Some(user_id) => Some(
                self.store
                    .get_user(user_id)
                    .await?
                    .ok_or(OAuthError::UserNotFound)?,
            ),
            None => None,
        };

        Ok(IntrospectionResponse {
            active: true,
            scope: Some(facts.scope.to_owned()),
            client_id: Some(client.key),
            name: user.as_ref().and_then(|u| u.name.clone()),
            user_id: user.as_ref().map(|u| u.id.to_string()),
            tenant_id: Some(facts.tenant_id.to_owned()),
            token_type: Some(TOKEN_TYPE_BEARER.to_owned()),
            exp: Some(facts.expires_at.timestamp()),
        })
    }

    /// Delete an access token, or else a refresh token
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenMissing`] for an empty token and
    /// [`OAuthError::InvalidToken`] when neither kind matched
    pub async fn revoke(&self, request: RevokeRequest) -> OAuthResult<()> {
        if request.token.is_empty() {
            return Err(OAuthError::TokenMissing);
        }
        if self.issuer.revoke_access_token(&request.token).await? {
            debug!("Revoked access token");
            return Ok(());
        }
        if self.issuer.revoke_refresh_token(&request.token).await? {
            debug!("Revoked refresh token");
            return Ok(());
        }
        Err(OAuthError::InvalidToken)
    }
}
