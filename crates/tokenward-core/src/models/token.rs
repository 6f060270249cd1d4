// ABOUTME: Access token, refresh token, and authorization code models
// ABOUTME: Token rows are keyed by their opaque value and expire lazily
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Bearer access token
///
/// The serialized form doubles as the cache mirror payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Opaque token value
    pub token: String,
    /// Client the token was issued to
    pub client_id: Uuid,
    /// Resource owner; absent for client credential grants
    pub user_id: Option<Uuid>,
    /// Tenant of the user, or of the client when there is no user
    pub tenant_id: String,
    /// Space-delimited granted scope
    pub scope: String,
    /// Instant after which the token is no longer accepted
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Whether the token has expired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Lifetime left at `now`, or `None` once expired
    #[must_use]
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.expires_at - now)
            .to_std()
            .ok()
            .filter(|ttl| !ttl.is_zero())
    }
}

/// Refresh token bound to one (client, user) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Opaque token value
    pub token: String,
    /// Client the token was issued to
    pub client_id: Uuid,
    /// Resource owner
    pub user_id: Uuid,
    /// Tenant of the user
    pub tenant_id: String,
    /// Space-delimited scope the token may be exchanged for
    pub scope: String,
    /// Instant after which the token is no longer accepted
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Whether the token has expired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Single-use authorization code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// Opaque code value
    pub code: String,
    /// Client that may redeem the code
    pub client_id: Uuid,
    /// User who approved the request
    pub user_id: Uuid,
    /// Tenant of the user
    pub tenant_id: String,
    /// Redirect URI the exchange must repeat, when one was bound
    pub redirect_uri: Option<String>,
    /// Scope granted on redemption
    pub scope: String,
    /// Instant after which the code is no longer accepted
    pub expires_at: DateTime<Utc>,
}

impl AuthorizationCode {
    /// Whether the code has expired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn token_expiring_in(secs: i64, now: DateTime<Utc>) -> AccessToken {
        AccessToken {
            token: "tok".to_owned(),
            client_id: Uuid::new_v4(),
            user_id: None,
            tenant_id: "t1".to_owned(),
            scope: "read".to_owned(),
            expires_at: now + ChronoDuration::seconds(secs),
        }
    }

    #[test]
    fn test_remaining_lifetime() {
        let now = Utc::now();
        let token = token_expiring_in(90, now);
        assert_eq!(token.remaining_at(now), Some(Duration::from_secs(90)));
        assert!(!token.is_expired_at(now));
    }

    #[test]
    fn test_expiry_boundary_counts_as_expired() {
        let now = Utc::now();
        let token = token_expiring_in(0, now);
        assert!(token.is_expired_at(now));
        assert_eq!(token.remaining_at(now), None);
        assert_eq!(token_expiring_in(-5, now).remaining_at(now), None);
    }
}
