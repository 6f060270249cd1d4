// ABOUTME: Resource owner model with a tagged password hash
// ABOUTME: PasswordScheme names the algorithm that produced the stored hash
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::password::{SCHEME_BCRYPT, SCHEME_HMAC_SHA1_V2};

/// Resource owner within a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Internal identifier, also the JWT subject
    pub id: Uuid,
    /// Tenant the user belongs to
    pub tenant_id: String,
    /// Login name, matched case-insensitively
    pub username: String,
    /// Account identifier accepted by the password grant
    pub account: Option<String>,
    /// Phone number accepted by the password grant when no account matches
    pub phone: Option<String>,
    /// Display name reported by introspection
    pub name: Option<String>,
    /// Stored password hash; `None` means password login is disabled
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Tag of the scheme that produced `password_hash`, kept raw so unknown
    /// tags surface at verification time
    pub password_scheme: Option<String>,
    /// When the user was created
    pub created_at: DateTime<Utc>,
}

/// Password hashing schemes understood by the verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordScheme {
    /// Legacy bcrypt hashes
    Bcrypt,
    /// `"V2===="` + base64(hex(HMAC-SHA1(secret, password_userid_salt)))
    HmacSha1V2,
}

impl PasswordScheme {
    /// Parse a stored scheme tag; unknown tags yield `None`
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            SCHEME_BCRYPT => Some(Self::Bcrypt),
            SCHEME_HMAC_SHA1_V2 => Some(Self::HmacSha1V2),
            _ => None,
        }
    }

    /// Tag persisted next to the hash
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::Bcrypt => SCHEME_BCRYPT,
            Self::HmacSha1V2 => SCHEME_HMAC_SHA1_V2,
        }
    }
}
