// ABOUTME: Authorization server settings for token lifetimes, JWT issuance, and scopes
// ABOUTME: Also carries the secret and salt of the versioned HMAC password scheme
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;
use tokenward_core::constants::defaults;
use tracing::{info, warn};

use super::environment::{env_var_or, parse_env};

/// Token issuance configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Access token lifetime in seconds
    pub access_token_lifetime_secs: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_lifetime_secs: i64,
    /// Authorization code lifetime in seconds
    pub auth_code_lifetime_secs: i64,
    /// Mint a signed JWT next to every user-bound access token
    pub jwt_enabled: bool,
    /// `iss` claim of minted JWTs
    pub jwt_issuer: String,
    /// Every scope token a client may request
    pub allowed_scopes: Vec<String>,
    /// Scope granted when a request names none
    pub default_scope: String,
    /// HMAC key of the v2 password scheme
    #[serde(skip_serializing)]
    pub password_secret: String,
    /// Salt appended by the v2 password scheme
    #[serde(skip_serializing)]
    pub password_salt: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime_secs: defaults::ACCESS_TOKEN_LIFETIME_SECS,
            refresh_token_lifetime_secs: defaults::REFRESH_TOKEN_LIFETIME_SECS,
            auth_code_lifetime_secs: defaults::AUTH_CODE_LIFETIME_SECS,
            jwt_enabled: false,
            jwt_issuer: defaults::JWT_ISSUER.to_owned(),
            allowed_scopes: parse_scopes(defaults::ALLOWED_SCOPES),
            default_scope: defaults::DEFAULT_SCOPE.to_owned(),
            password_secret: String::new(),
            password_salt: String::new(),
        }
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("access_token_lifetime_secs", &self.access_token_lifetime_secs)
            .field("refresh_token_lifetime_secs", &self.refresh_token_lifetime_secs)
            .field("auth_code_lifetime_secs", &self.auth_code_lifetime_secs)
            .field("jwt_enabled", &self.jwt_enabled)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("allowed_scopes", &self.allowed_scopes)
            .field("default_scope", &self.default_scope)
            .field("password_secret", &"[REDACTED]")
            .field("password_salt", &"[REDACTED]")
            .finish()
    }
}

impl OAuthConfig {
    /// Load token issuance configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed, or
    /// if the resulting configuration fails [`OAuthConfig::validate`]
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            access_token_lifetime_secs: parse_env(
                "OAUTH_ACCESS_TOKEN_LIFETIME_SECS",
                defaults::ACCESS_TOKEN_LIFETIME_SECS,
            )?,
            refresh_token_lifetime_secs: parse_env(
                "OAUTH_REFRESH_TOKEN_LIFETIME_SECS",
                defaults::REFRESH_TOKEN_LIFETIME_SECS,
            )?,
            auth_code_lifetime_secs: parse_env(
                "OAUTH_AUTH_CODE_LIFETIME_SECS",
                defaults::AUTH_CODE_LIFETIME_SECS,
            )?,
            jwt_enabled: parse_env("OAUTH_JWT_ENABLED", false)?,
            jwt_issuer: env_var_or("OAUTH_JWT_ISSUER", defaults::JWT_ISSUER),
            allowed_scopes: parse_scopes(&env_var_or(
                "OAUTH_ALLOWED_SCOPES",
                defaults::ALLOWED_SCOPES,
            )),
            default_scope: env_var_or("OAUTH_DEFAULT_SCOPE", defaults::DEFAULT_SCOPE),
            password_secret: env::var("PASSWORD_HMAC_SECRET").unwrap_or_default(),
            password_salt: env::var("PASSWORD_HMAC_SALT").unwrap_or_default(),
        };

        config.validate()?;
        config.log_summary();
        Ok(config)
    }

    /// Check lifetimes are positive and the default scope is allowed
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first violated rule
    pub fn validate(&self) -> AppResult<()> {
        for (name, value) in [
            ("OAUTH_ACCESS_TOKEN_LIFETIME_SECS", self.access_token_lifetime_secs),
            ("OAUTH_REFRESH_TOKEN_LIFETIME_SECS", self.refresh_token_lifetime_secs),
            ("OAUTH_AUTH_CODE_LIFETIME_SECS", self.auth_code_lifetime_secs),
        ] {
            if value <= 0 {
                return Err(AppError::config_invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.allowed_scopes.is_empty() {
            return Err(AppError::config_invalid(
                "OAUTH_ALLOWED_SCOPES must name at least one scope",
            ));
        }

        if let Some(unknown) = self
            .default_scope
            .split_whitespace()
            .find(|scope| !self.allowed_scopes.iter().any(|allowed| allowed == scope))
        {
            return Err(AppError::config_invalid(format!(
                "OAUTH_DEFAULT_SCOPE contains '{unknown}', which is not in OAUTH_ALLOWED_SCOPES"
            )));
        }

        Ok(())
    }

    /// SHA-256 fingerprint of the HMAC secret (first 8 hex chars) for
    /// comparing deployments without logging the secret
    #[must_use]
    pub fn password_secret_fingerprint(&self) -> Option<String> {
        if self.password_secret.is_empty() {
            return None;
        }
        let digest = Sha256::digest(self.password_secret.as_bytes());
        Some(hex::encode(digest).chars().take(8).collect())
    }

    fn log_summary(&self) {
        info!(
            access_lifetime = self.access_token_lifetime_secs,
            refresh_lifetime = self.refresh_token_lifetime_secs,
            jwt_enabled = self.jwt_enabled,
            default_scope = %self.default_scope,
            "OAuth configuration loaded"
        );
        match self.password_secret_fingerprint() {
            Some(fingerprint) => info!(fingerprint = %fingerprint, "HMAC password secret configured"),
            None => warn!("PASSWORD_HMAC_SECRET is not set; hmac-sha1-v2 users cannot log in"),
        }
    }
}

/// Parse a whitespace- or comma-separated scope list
fn parse_scopes(scopes: &str) -> Vec<String> {
    scopes
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(OAuthConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_scope_must_be_allowed() {
        let config = OAuthConfig {
            default_scope: "admin".to_owned(),
            ..OAuthConfig::default()
        };
        let error = config.validate().unwrap_err();
        assert!(error.message.contains("admin"));
    }

    #[test]
    fn test_non_positive_lifetime_rejected() {
        let config = OAuthConfig {
            refresh_token_lifetime_secs: 0,
            ..OAuthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_scopes_accepts_commas_and_spaces() {
        assert_eq!(
            parse_scopes("read, write  admin"),
            vec!["read".to_owned(), "write".to_owned(), "admin".to_owned()]
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = OAuthConfig {
            password_secret: "hunter2".to_owned(),
            ..OAuthConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert_eq!(
            config.password_secret_fingerprint().map(|f| f.len()),
            Some(8)
        );
    }
}
