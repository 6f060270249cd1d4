// ABOUTME: Token-protocol error taxonomy with categories and OAuth2 wire codes
// ABOUTME: Every grant, introspection, revocation, and JWK failure maps to one variant here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

use super::database::DatabaseError;

/// Coarse classification that fixes the HTTP status of an [`OAuthError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or disallowed request input
    Validation,
    /// Client or user credentials rejected
    Authentication,
    /// Token, client, or user absent or no longer live
    NotFound,
    /// Signing key rows absent or unusable
    KeyMaterial,
    /// Relational store failure
    Storage,
    /// Anything else the server cannot recover from
    Internal,
}

impl ErrorCategory {
    /// HTTP status for this category
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Authentication => 401,
            Self::NotFound => 404,
            Self::KeyMaterial | Self::Storage | Self::Internal => 500,
        }
    }
}

/// Errors returned by token issuance, introspection, and revocation
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// `grant_type` is not one of the supported flows
    #[error("Invalid grant type")]
    InvalidGrantType,

    /// The request body could not be decoded
    #[error("Malformed request: {reason}")]
    MalformedRequest {
        /// Decoder message
        reason: String,
    },

    /// A parameter required by the selected flow is absent
    #[error("Missing required parameter '{parameter}'")]
    MissingParameter {
        /// Parameter name as it appears on the wire
        parameter: &'static str,
    },

    /// A requested scope token is not in the allow-list
    #[error("Invalid scope: {scope}")]
    InvalidScope {
        /// Scope string as requested
        scope: String,
    },

    /// A refresh request asked for more than the original grant
    #[error("Requested scope cannot be greater than the original scope")]
    RequestedScopeCannotBeGreater,

    /// `token_type_hint` is not a supported value
    #[error("Invalid token type hint: {hint}")]
    InvalidTokenHint {
        /// Hint as supplied
        hint: String,
    },

    /// The `token` parameter is empty
    #[error("Token missing")]
    TokenMissing,

    /// Revocation matched neither an access nor a refresh token
    #[error("Invalid token")]
    InvalidToken,

    /// The redirect URI differs from the one bound to the authorization code
    #[error("Invalid redirect URI")]
    InvalidRedirectUri,

    /// Client id unknown or secret mismatch
    #[error("Invalid client credentials")]
    InvalidClientCredentials,

    /// Any user authentication failure
    #[error("Invalid username or password")]
    InvalidUsernameOrPassword,

    /// Refresh token or authorization code missing or expired
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// No access token has this value
    #[error("Access token not found")]
    AccessTokenNotFound,

    /// The access token exists but its expiry has passed
    #[error("Access token expired")]
    AccessTokenExpired,

    /// No refresh token has this value for the requesting client
    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    /// The refresh token exists but its expiry has passed
    #[error("Refresh token expired")]
    RefreshTokenExpired,

    /// A token references a client row that no longer exists
    #[error("Client not found")]
    ClientNotFound,

    /// A token references a user row that no longer exists
    #[error("User not found")]
    UserNotFound,

    /// No JWK row with the private key prefix exists
    #[error("JWK private key not found")]
    JwkPrivateKeyNotFound,

    /// No JWK row with the public key prefix exists
    #[error("JWK public key not found")]
    JwkPublicKeyNotFound,

    /// A JWK row could not be parsed into a usable key
    #[error("Invalid key material: {reason}")]
    InvalidKeyMaterial {
        /// Parser message
        reason: String,
    },

    /// A presented JWT failed to parse or verify
    #[error("JWT rejected: {message}")]
    Jwt {
        /// Parser or verifier message
        message: String,
    },

    /// The relational store failed
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    /// Randomness, encoding, or another internal step failed
    #[error("Internal error: {reason}")]
    Internal {
        /// What failed
        reason: String,
    },
}

/// Result type alias for token-protocol operations
pub type OAuthResult<T> = Result<T, OAuthError>;

impl OAuthError {
    /// Category that fixes the HTTP status
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidGrantType
            | Self::MalformedRequest { .. }
            | Self::MissingParameter { .. }
            | Self::InvalidScope { .. }
            | Self::RequestedScopeCannotBeGreater
            | Self::InvalidTokenHint { .. }
            | Self::TokenMissing
            | Self::InvalidToken
            | Self::InvalidRedirectUri
            | Self::Jwt { .. } => ErrorCategory::Validation,
            Self::InvalidClientCredentials
            | Self::InvalidUsernameOrPassword
            | Self::InvalidOrExpiredToken => ErrorCategory::Authentication,
            Self::AccessTokenNotFound
            | Self::AccessTokenExpired
            | Self::RefreshTokenNotFound
            | Self::RefreshTokenExpired
            | Self::ClientNotFound
            | Self::UserNotFound => ErrorCategory::NotFound,
            Self::JwkPrivateKeyNotFound
            | Self::JwkPublicKeyNotFound
            | Self::InvalidKeyMaterial { .. } => ErrorCategory::KeyMaterial,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// HTTP status for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.category().http_status()
    }

    /// OAuth2 `error` code reported on the wire
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidGrantType => "unsupported_grant_type",
            Self::InvalidScope { .. } | Self::RequestedScopeCannotBeGreater => "invalid_scope",
            Self::InvalidClientCredentials => "invalid_client",
            Self::InvalidUsernameOrPassword
            | Self::InvalidOrExpiredToken
            | Self::InvalidRedirectUri => "invalid_grant",
            Self::MalformedRequest { .. }
            | Self::MissingParameter { .. }
            | Self::InvalidTokenHint { .. }
            | Self::TokenMissing
            | Self::InvalidToken
            | Self::Jwt { .. } => "invalid_request",
            Self::AccessTokenNotFound
            | Self::AccessTokenExpired
            | Self::RefreshTokenNotFound
            | Self::RefreshTokenExpired
            | Self::ClientNotFound
            | Self::UserNotFound => "not_found",
            Self::JwkPrivateKeyNotFound
            | Self::JwkPublicKeyNotFound
            | Self::InvalidKeyMaterial { .. }
            | Self::Storage(_)
            | Self::Internal { .. } => "server_error",
        }
    }

    /// Shorthand for [`OAuthError::Internal`]
    #[must_use]
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`OAuthError::MalformedRequest`]
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`OAuthError::InvalidKeyMaterial`]
    #[must_use]
    pub fn key_material(reason: impl Into<String>) -> Self {
        Self::InvalidKeyMaterial {
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "jwt-errors")]
impl From<jsonwebtoken::errors::Error> for OAuthError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt {
            message: error.to_string(),
        }
    }
}

/// OAuth2 error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthErrorResponse {
    /// OAuth2 error code
    pub error: String,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl From<&OAuthError> for OAuthErrorResponse {
    fn from(error: &OAuthError) -> Self {
        // Server-side failures never echo driver or parser details
        let description = match error.category() {
            ErrorCategory::KeyMaterial | ErrorCategory::Storage | ErrorCategory::Internal => {
                "Internal server error".to_owned()
            }
            _ => error.to_string(),
        };
        Self {
            error: error.error_code().to_owned(),
            error_description: Some(description),
        }
    }
}

#[cfg(feature = "http-response")]
impl axum::response::IntoResponse for OAuthError {
    fn into_response(self) -> axum::response::Response {
        let status = http::StatusCode::from_u16(self.http_status())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self, "OAuth request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "OAuth request rejected");
        }
        (status, axum::Json(OAuthErrorResponse::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_status_mapping() {
        assert_eq!(OAuthError::InvalidGrantType.http_status(), 400);
        assert_eq!(OAuthError::InvalidUsernameOrPassword.http_status(), 401);
        assert_eq!(OAuthError::ClientNotFound.http_status(), 404);
        assert_eq!(OAuthError::JwkPrivateKeyNotFound.http_status(), 500);
        assert_eq!(
            OAuthError::Storage(DatabaseError::TransactionFailed {
                message: "disk full".to_owned()
            })
            .http_status(),
            500
        );
    }

    #[test]
    fn test_storage_details_are_not_echoed() {
        let error = OAuthError::Storage(DatabaseError::QueryFailed {
            context: "insert access token",
            message: "no such table: oauth_access_tokens".to_owned(),
        });
        let body = OAuthErrorResponse::from(&error);
        assert_eq!(body.error, "server_error");
        assert_eq!(
            body.error_description.as_deref(),
            Some("Internal server error")
        );
    }

    #[test]
    fn test_authentication_message_is_generic() {
        let body = OAuthErrorResponse::from(&OAuthError::InvalidUsernameOrPassword);
        assert_eq!(body.error, "invalid_grant");
        assert_eq!(
            body.error_description.as_deref(),
            Some("Invalid username or password")
        );
    }

    #[test]
    fn test_malformed_body_is_invalid_request() {
        let error = OAuthError::malformed("missing field `token`");
        assert_eq!(error.http_status(), 400);
        assert_eq!(error.error_code(), "invalid_request");
    }
}
