// ABOUTME: Token endpoint grant engine dispatching over the closed set of supported grants
// ABOUTME: Authenticates the client, runs the grant, and assembles the token response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::models::{ClientCredentials, TokenRequest, TokenResponse};
use super::service::OAuthService;
use crate::cache::CacheProvider;
use crate::errors::{OAuthError, OAuthResult};
use std::str::FromStr;
use tokenward_core::constants::oauth::{grant_types, TOKEN_TYPE_BEARER};
use tokenward_core::models::{AccessToken, Client, RefreshToken, User};
use tracing::{debug, info};

/// Supported grant types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    /// Resource owner password credentials
    Password,
    /// Client acting on its own behalf
    ClientCredentials,
    /// Authorization code exchange
    AuthorizationCode,
    /// Refresh token exchange
    RefreshToken,
}

impl FromStr for GrantType {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            grant_types::PASSWORD => Ok(Self::Password),
            grant_types::CLIENT_CREDENTIALS => Ok(Self::ClientCredentials),
            grant_types::AUTHORIZATION_CODE => Ok(Self::AuthorizationCode),
            grant_types::REFRESH_TOKEN => Ok(Self::RefreshToken),
            _ => Err(OAuthError::InvalidGrantType),
        }
    }
}

/// A token request with the fields its grant requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    /// Password grant
    Password {
        /// Account or phone number
        username: String,
        /// Plain password
        password: String,
        /// Tenant to search; the client's when absent
        tenant_id: Option<String>,
        /// Requested scope
        scope: Option<String>,
    },
    /// Client credentials grant
    ClientCredentials {
        /// Requested scope
        scope: Option<String>,
    },
    /// Authorization code grant
    AuthorizationCode {
        /// Code to redeem
        code: String,
        /// Redirect URI repeated from the authorization request
        redirect_uri: Option<String>,
    },
    /// Refresh token grant
    RefreshToken {
        /// Refresh token to exchange
        refresh_token: String,
        /// Requested narrower scope
        scope: Option<String>,
    },
}

fn required(value: Option<&String>, parameter: &'static str) -> OAuthResult<String> {
    value
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or(OAuthError::MissingParameter { parameter })
}

impl Grant {
    /// Parse the grant type and collect its required fields
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidGrantType`] for unknown grant types and
    /// [`OAuthError::MissingParameter`] for absent required fields
    pub fn from_request(request: &TokenRequest) -> OAuthResult<Self> {
        Ok(match request.grant_type.parse::<GrantType>()? {
            GrantType::Password => Self::Password {
                username: required(request.username.as_ref(), "username")?,
                password: required(request.password.as_ref(), "password")?,
                tenant_id: request.tenant_id.clone().filter(|t| !t.is_empty()),
                scope: request.scope.clone(),
            },
            GrantType::ClientCredentials => Self::ClientCredentials {
                scope: request.scope.clone(),
            },
            GrantType::AuthorizationCode => Self::AuthorizationCode {
                code: required(request.code.as_ref(), "code")?,
                redirect_uri: request.redirect_uri.clone(),
            },
            GrantType::RefreshToken => Self::RefreshToken {
                refresh_token: required(request.refresh_token.as_ref(), "refresh_token")?,
                scope: request.scope.clone(),
            },
        })
    }

    /// Grant type of this request
    #[must_use]
    pub const fn grant_type(&self) -> GrantType {
        match self {
            Self::Password { .. } => GrantType::Password,
            Self::ClientCredentials { .. } => GrantType::ClientCredentials,
            Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
            Self::RefreshToken { .. } => GrantType::RefreshToken,
        }
    }
}

/// What a grant handler produced
struct Issued {
    access: AccessToken,
    refresh: Option<RefreshToken>,
    user: Option<User>,
}

impl<C: CacheProvider> OAuthService<C> {
    /// Handle a token endpoint request
    ///
    /// `basic` credentials, when present, take precedence over the client
    /// fields of the body.
    ///
    /// # Errors
    ///
    /// Returns the [`OAuthError`] of the first failing step: grant parsing,
    /// client authentication, then the grant itself
    pub async fn token(
        &self,
        request: TokenRequest,
        basic: Option<ClientCredentials>,
    ) -> OAuthResult<TokenResponse> {
        let grant = Grant::from_request(&request)?;

        let credentials = basic.or_else(|| {
            Some(ClientCredentials {
                client_id: request.client_id.clone()?,
                client_secret: request
                    .client_secret
                    .clone()
                    .or_else(|| request.secret.clone())?,
            })
        });
        let client = self.authenticate_client(credentials.as_ref()).await?;
        debug!(client_key = %client.key, grant = ?grant.grant_type(), "Token request authenticated");

        let issued = match grant {
            Grant::Password {
                username,
                password,
                tenant_id,
                scope,
            } => {
                let tenant = tenant_id.unwrap_or_else(|| client.tenant_id.clone());
                self.password_grant(&client, &tenant, &username, &password, scope.as_deref())
                    .await?
            }
            Grant::ClientCredentials { scope } => {
                self.client_credentials_grant(&client, scope.as_deref())
                    .await?
            }
            Grant::AuthorizationCode { code, redirect_uri } => {
                self.authorization_code_grant(&client, &code, redirect_uri.as_deref())
                    .await?
            }
            Grant::RefreshToken {
                refresh_token,
                scope,
            } => {
                self.refresh_token_grant(&client, &refresh_token, scope.as_deref())
                    .await?
            }
        };

        self.respond(issued).await
    }

    async fn password_grant(
        &self,
        client: &Client,
        tenant_id: &str,
        username: &str,
        password: &str,
        scope: Option<&str>,
    ) -> OAuthResult<Issued> {
        let scope = self.scopes.resolve(scope)?;
        let user = self
            .credentials
            .authenticate_user(tenant_id, username, password)
            .await?;
        let (access, refresh) = self.issuer.login(client, &user, &scope).await?;
        info!(client_key = %client.key, user_id = %user.id, "Password grant issued tokens");
        Ok(Issued {
            access,
            refresh: Some(refresh),
            user: Some(user),
        })
    }

    async fn client_credentials_grant(
        &self,
        client: &Client,
        scope: Option<&str>,
    ) -> OAuthResult<Issued> {
        let scope = self.scopes.resolve(scope)?;
        let access = self
            .issuer
            .grant_access_token(client, None, self.config.access_token_lifetime_secs, &scope)
            .await?;
        info!(client_key = %client.key, "Client credentials grant issued token");
        Ok(Issued {
            access,
            refresh: None,
            user: None,
        })
    }

    async fn authorization_code_grant(
        &self,
        client: &Client,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> OAuthResult<Issued> {
        let code = self.issuer.redeem_authorization_code(code, client).await?;
        if let Some(expected) = code.redirect_uri.as_deref() {
            if redirect_uri != Some(expected) {
                return Err(OAuthError::InvalidRedirectUri);
            }
        }

        let user = self
            .store
            .get_user(code.user_id)
            .await?
            .ok_or(OAuthError::UserNotFound)?;
        let (access, refresh) = self.issuer.login(client, &user, &code.scope).await?;
        info!(client_key = %client.key, user_id = %user.id, "Authorization code redeemed");
        Ok(Issued {
            access,
            refresh: Some(refresh),
            user: Some(user),
        })
    }

    async fn refresh_token_grant(
        &self,
        client: &Client,
        refresh_token: &str,
        scope: Option<&str>,
    ) -> OAuthResult<Issued> {
        let stored = self
            .issuer
            .get_valid_refresh_token(refresh_token, client.id)
            .await
            .map_err(|e| match e {
                OAuthError::RefreshTokenNotFound | OAuthError::RefreshTokenExpired => {
                    OAuthError::InvalidOrExpiredToken
                }
                other => other,
            })?;
        let scope = self.scopes.narrow(scope, &stored.scope)?;

        let user = self
            .store
            .get_user(stored.user_id)
            .await?
            .ok_or(OAuthError::UserNotFound)?;
        let (access, refresh) = self.issuer.login(client, &user, &scope).await?;
        info!(client_key = %client.key, user_id = %user.id, "Refresh grant issued tokens");
        Ok(Issued {
            access,
            refresh: Some(refresh),
            user: Some(user),
        })
    }

    async fn respond(&self, issued: Issued) -> OAuthResult<TokenResponse> {
        let id_token = match (&issued.user, self.config.jwt_enabled) {
            (Some(user), true) => Some(
                self.keys
                    .sign_access_token(
                        user,
                        self.config.access_token_lifetime_secs,
                        &issued.access.scope,
                        &issued.access.token,
                    )
                    .await?,
            ),
            _ => None,
        };

        Ok(TokenResponse {
            access_token: issued.access.token,
            token_type: TOKEN_TYPE_BEARER.to_owned(),
            expires_in: self.config.access_token_lifetime_secs,
            scope: issued.access.scope,
            refresh_token: issued.refresh.map(|r| r.token),
            id_token,
        })
    }
}
