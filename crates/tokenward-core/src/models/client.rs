// ABOUTME: OAuth2 client registration model
// ABOUTME: Public key, bcrypt secret hash, optional redirect URI, and owning tenant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered OAuth2 client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Internal identifier referenced by token rows
    pub id: Uuid,
    /// Public `client_id`, matched case-insensitively
    pub key: String,
    /// bcrypt hash of the client secret
    #[serde(skip_serializing)]
    pub secret_hash: String,
    /// Redirect URI registered for the authorization code flow
    pub redirect_uri: Option<String>,
    /// Tenant the client belongs to
    pub tenant_id: String,
    /// When the client was registered
    pub created_at: DateTime<Utc>,
}
