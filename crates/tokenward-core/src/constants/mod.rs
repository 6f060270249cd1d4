// ABOUTME: Protocol constants and configuration defaults for the authorization server
// ABOUTME: Grant type tags, introspection hints, JWK tags, cache settings, and lifetimes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Cache backend defaults and key namespacing
pub mod cache;

/// Wire-level OAuth2 identifiers
pub mod oauth;

/// Service identity used in logs
pub mod service_names {
    /// Name reported by the server binary and logging setup
    pub const TOKENWARD: &str = "tokenward";
}

/// Password hashing scheme tags and the versioned HMAC prefix
pub mod password {
    /// Legacy bcrypt scheme tag
    pub const SCHEME_BCRYPT: &str = "bcrypt";
    /// Versioned HMAC-SHA1 scheme tag
    pub const SCHEME_HMAC_SHA1_V2: &str = "hmac-sha1-v2";
    /// Prefix carried by every HMAC-SHA1 v2 hash
    pub const HMAC_V2_PREFIX: &str = "V2====";
    /// Separator joining password, user id, and salt before hashing
    pub const HMAC_V2_SEPARATOR: &str = "_";
}

/// Default token lifetimes and scope settings
pub mod defaults {
    /// Access token lifetime (one hour)
    pub const ACCESS_TOKEN_LIFETIME_SECS: i64 = 3600;
    /// Refresh token lifetime (fourteen days)
    pub const REFRESH_TOKEN_LIFETIME_SECS: i64 = 1_209_600;
    /// Authorization code lifetime (one hour)
    pub const AUTH_CODE_LIFETIME_SECS: i64 = 3600;
    /// Scope granted when a request names none
    pub const DEFAULT_SCOPE: &str = "read";
    /// Allow-list used when none is configured
    pub const ALLOWED_SCOPES: &str = "read read_write";
    /// JWT issuer used when none is configured
    pub const JWT_ISSUER: &str = "tokenward";
    /// HTTP listen port
    pub const HTTP_PORT: u16 = 8080;
    /// Database used when `DATABASE_URL` is unset
    pub const DATABASE_URL: &str = "sqlite:./data/tokenward.db";
    /// Maximum transaction attempts on transient SQLite lock errors
    pub const TRANSACTION_MAX_RETRIES: u32 = 3;
}
