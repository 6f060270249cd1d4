// ABOUTME: Request and response bodies of the token, introspection, and revocation endpoints
// ABOUTME: Field names follow RFC 6749 and RFC 7662
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

/// Token endpoint request
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokenRequest {
    /// `password`, `client_credentials`, `authorization_code`, or `refresh_token`
    #[serde(default)]
    pub grant_type: String,
    /// Client key; overridden by basic authentication
    #[serde(default)]
    pub client_id: Option<String>,
    /// Client secret; overridden by basic authentication
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Legacy spelling of `client_secret`, used only when that is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Requested scope
    #[serde(default)]
    pub scope: Option<String>,
    /// Account or phone number (password grant)
    #[serde(default)]
    pub username: Option<String>,
    /// Password (password grant)
    #[serde(default)]
    pub password: Option<String>,
    /// Tenant of the user (password grant); defaults to the client's tenant
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Refresh token (refresh grant)
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Authorization code (code grant)
    #[serde(default)]
    pub code: Option<String>,
    /// Redirect URI bound to the code (code grant)
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

/// Client credentials presented through HTTP basic authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Client key
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
}

/// Token endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Opaque access token
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Configured access token lifetime in seconds
    pub expires_in: i64,
    /// Scope of the access token
    pub scope: String,
    /// Refresh token, for grants with a user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Signed JWT mirroring the access token, when enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

/// Introspection request form
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IntrospectRequest {
    /// Token to resolve
    #[serde(default)]
    pub token: String,
    /// `access_token` (default), `refresh_token`, or `jwt`
    #[serde(default)]
    pub token_type_hint: Option<String>,
}

/// Introspection response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectionResponse {
    /// Whether the token is live
    pub active: bool,
    /// Granted scope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Public key of the owning client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Display name of the owning user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Owning user id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Tenant of the token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Always "Bearer"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiry (Unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Revocation request form
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RevokeRequest {
    /// Access or refresh token to delete
    #[serde(default)]
    pub token: String,
}
