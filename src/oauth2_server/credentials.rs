// ABOUTME: Client and resource owner authentication against the token store
// ABOUTME: Logs the precise failure reason but only ever returns generic credential errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::password::PasswordVerifier;
use crate::config::OAuthConfig;
use crate::database::TokenStore;
use crate::errors::{OAuthError, OAuthResult};
use std::sync::Arc;
use tokenward_core::models::{Client, User};
use tracing::{debug, warn};

/// Why a credential check failed; never shown to callers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialFailure {
    /// No client or user matched the identifier
    #[error("not found")]
    NotFound,
    /// The user has no password hash
    #[error("password not set")]
    PasswordNotSet,
    /// The presented secret does not match the stored hash
    #[error("hash mismatch")]
    HashMismatch,
    /// The stored scheme tag is missing or unsupported
    #[error("unknown scheme {0:?}")]
    UnknownScheme(Option<String>),
}

/// Authenticates clients by key and secret, and users by identifier and password
#[derive(Clone)]
pub struct CredentialAuthenticator {
    store: Arc<dyn TokenStore>,
    passwords: PasswordVerifier,
}

impl CredentialAuthenticator {
    /// Create an authenticator over `store`
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, config: &OAuthConfig) -> Self {
        Self {
            store,
            passwords: PasswordVerifier::new(&config.password_secret, &config.password_salt),
        }
    }

    /// Password verifier shared with provisioning tools
    #[must_use]
    pub const fn passwords(&self) -> &PasswordVerifier {
        &self.passwords
    }

    /// Authenticate a client by its public key and secret
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidClientCredentials`] for an unknown key or
    /// a wrong secret, and [`OAuthError::Storage`] if the lookup fails
    pub async fn authenticate_client(&self, key: &str, secret: &str) -> OAuthResult<Client> {
        let Some(client) = self.store.get_client_by_key(key).await? else {
            debug!(client_key = %key, reason = %CredentialFailure::NotFound, "Client authentication failed");
            return Err(OAuthError::InvalidClientCredentials);
        };

        match bcrypt::verify(secret, &client.secret_hash) {
            Ok(true) => Ok(client),
            Ok(false) => {
                debug!(client_key = %key, reason = %CredentialFailure::HashMismatch, "Client authentication failed");
                Err(OAuthError::InvalidClientCredentials)
            }
            Err(e) => {
                warn!(client_key = %key, error = %e, "Client secret hash is malformed");
                Err(OAuthError::InvalidClientCredentials)
            }
        }
    }

    /// Authenticate a user of `tenant_id` by account, falling back to phone
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidUsernameOrPassword`] for every credential
    /// failure, and [`OAuthError::Storage`] if a lookup fails
    pub async fn authenticate_user(
        &self,
        tenant_id: &str,
        identifier: &str,
        password: &str,
    ) -> OAuthResult<User> {
        let user = match self.store.find_user_by_account(tenant_id, identifier).await? {
            Some(user) => Some(user),
            None => self.store.find_user_by_phone(tenant_id, identifier).await?,
        };

        let outcome = user
            .ok_or(CredentialFailure::NotFound)
            .and_then(|user| self.passwords.verify(&user, password).map(|()| user));

        outcome.map_err(|reason| {
            match &reason {
                CredentialFailure::UnknownScheme(_) => {
                    warn!(tenant_id, %reason, "User password uses an unsupported scheme");
                }
                _ => debug!(tenant_id, %reason, "User authentication failed"),
            }
            OAuthError::InvalidUsernameOrPassword
        })
    }
}
