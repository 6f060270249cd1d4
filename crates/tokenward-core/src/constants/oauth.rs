// ABOUTME: OAuth2 wire identifiers shared by the grant engine and HTTP layer
// ABOUTME: Grant type tags, token type, introspection hints, and JWK row tags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// `grant_type` values accepted at the token endpoint
pub mod grant_types {
    /// Resource owner password credentials
    pub const PASSWORD: &str = "password";
    /// Refresh token exchange
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// Client credentials
    pub const CLIENT_CREDENTIALS: &str = "client_credentials";
    /// Authorization code exchange
    pub const AUTHORIZATION_CODE: &str = "authorization_code";
}

/// `token_type_hint` values accepted at the introspection endpoint
pub mod token_hints {
    /// Opaque access token (the default)
    pub const ACCESS_TOKEN: &str = "access_token";
    /// Opaque refresh token
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// Signed JWT whose `jti` names an access token
    pub const JWT: &str = "jwt";
}

/// Token type reported in token and introspection responses
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// JWK row tags
pub mod jwk {
    /// Group tag shared by the signing key rows
    pub const SID: &str = "oauth-jwk";
    /// Key id prefix of the private key row
    pub const PRIVATE_KID_PREFIX: &str = "private";
    /// Key id prefix of the public key row
    pub const PUBLIC_KID_PREFIX: &str = "public";
    /// Signing algorithm advertised in the JWKS document
    pub const ALGORITHM: &str = "RS256";
    /// Key size used when provisioning a new pair
    pub const RSA_KEY_SIZE: usize = 2048;
}

/// HTTP route paths
pub mod routes {
    /// Token endpoint
    pub const TOKEN: &str = "/oauth/token";
    /// Introspection endpoint
    pub const INTROSPECT: &str = "/oauth/introspect";
    /// Revocation endpoint
    pub const REVOKE: &str = "/oauth/revoke";
    /// Public key set
    pub const JWKS: &str = "/.well-known/jwks.json";
    /// Liveness probe
    pub const HEALTH: &str = "/health";
}
