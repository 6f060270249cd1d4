// ABOUTME: Password hash verification for the bcrypt and versioned HMAC-SHA1 schemes
// ABOUTME: Dispatches on the scheme tag stored with each user's hash
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::credentials::CredentialFailure;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use ring::hmac;
use subtle::ConstantTimeEq;
use tokenward_core::constants::password::{HMAC_V2_PREFIX, HMAC_V2_SEPARATOR};
use tokenward_core::models::{PasswordScheme, User};
use tracing::warn;
use zeroize::Zeroizing;

/// Verifies user passwords against their stored, scheme-tagged hashes
#[derive(Clone)]
pub struct PasswordVerifier {
    key: hmac::Key,
    salt: Zeroizing<String>,
}

impl PasswordVerifier {
    /// Build a verifier holding the HMAC secret and salt of the v2 scheme
    #[must_use]
    pub fn new(secret: &str, salt: &str) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, secret.as_bytes()),
            salt: Zeroizing::new(salt.to_owned()),
        }
    }

    /// Check `password` against the user's stored hash
    ///
    /// # Errors
    ///
    /// Returns the reason the password was rejected; callers collapse every
    /// variant into one generic authentication failure
    pub fn verify(&self, user: &User, password: &str) -> Result<(), CredentialFailure> {
        let stored = user
            .password_hash
            .as_deref()
            .filter(|hash| !hash.is_empty())
            .ok_or(CredentialFailure::PasswordNotSet)?;

        let tag = user.password_scheme.as_deref();
        let scheme = tag
            .and_then(PasswordScheme::from_tag)
            .ok_or_else(|| CredentialFailure::UnknownScheme(tag.map(str::to_owned)))?;

        let matched = match scheme {
            PasswordScheme::Bcrypt => bcrypt::verify(password, stored).unwrap_or_else(|e| {
                warn!(user_id = %user.id, error = %e, "Stored bcrypt hash is malformed");
                false
            }),
            PasswordScheme::HmacSha1V2 => {
                let expected = self.hash_v2(password, user);
                bool::from(expected.as_bytes().ct_eq(stored.as_bytes()))
            }
        };

        if matched {
            Ok(())
        } else {
            Err(CredentialFailure::HashMismatch)
        }
    }

    /// `"V2===="` + base64(hex(HMAC-SHA1(secret, password_userid_salt)))
    #[must_use]
    pub fn hash_v2(&self, password: &str, user: &User) -> String {
        let message = Zeroizing::new(format!(
            "{password}{HMAC_V2_SEPARATOR}{}{HMAC_V2_SEPARATOR}{}",
            user.id,
            self.salt.as_str()
        ));
        let tag = hmac::sign(&self.key, message.as_bytes());
        format!(
            "{HMAC_V2_PREFIX}{}",
            STANDARD.encode(hex::encode(tag.as_ref()))
        )
    }
}
