// ABOUTME: Signing key row stored in the JWK table
// ABOUTME: Rows are grouped by sid and told apart by the prefix of their key id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One half of the signing key pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkEntry {
    /// Group tag, `oauth-jwk` for the token signing pair
    pub sid: String,
    /// Key id; starts with `private` or `public`
    pub kid: String,
    /// PKCS#8 PEM for the private row, JWK JSON for the public row
    #[serde(skip_serializing)]
    pub key_data: String,
    /// When the row was written
    pub created_at: DateTime<Utc>,
}
