// ABOUTME: In-process token store holding every table behind one async RwLock
// ABOUTME: Mirrors the SQLite semantics (case rules, uniqueness, atomic purge) without SQL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::TokenStore;
use crate::errors::DatabaseError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokenward_core::models::{
    AccessToken, AuthorizationCode, Client, JwkEntry, RefreshToken, User,
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    clients: HashMap<Uuid, Client>,
    users: HashMap<Uuid, User>,
    access_tokens: HashMap<String, AccessToken>,
    refresh_tokens: HashMap<String, RefreshToken>,
    codes: HashMap<String, AuthorizationCode>,
    jwks: Vec<JwkEntry>,
}

/// Token store kept entirely in process memory
///
/// Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(context: &'static str, what: &str) -> DatabaseError {
    DatabaseError::ConstraintViolation {
        context,
        message: format!("duplicate {what}"),
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn migrate(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_client(&self, client: &Client) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let key_taken = tables
            .clients
            .values()
            .any(|c| c.key.eq_ignore_ascii_case(&client.key));
        if key_taken || tables.clients.contains_key(&client.id) {
            return Err(duplicate("create client", "client"));
        }
        tables.clients.insert(client.id, client.clone());
        Ok(())
    }

    async fn get_client(&self, client_id: Uuid) -> Result<Option<Client>, DatabaseError> {
        Ok(self.tables.read().await.clients.get(&client_id).cloned())
    }

    async fn get_client_by_key(&self, key: &str) -> Result<Option<Client>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .clients
            .values()
            .find(|c| c.key.eq_ignore_ascii_case(key))
            .cloned())
    }

    async fn delete_client(&self, client_id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self
            .tables
            .write()
            .await
            .clients
            .remove(&client_id)
            .is_some())
    }

    async fn create_user(&self, user: &User) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let name_taken = tables.users.values().any(|u| {
            u.tenant_id == user.tenant_id && u.username.eq_ignore_ascii_case(&user.username)
        });
        if name_taken || tables.users.contains_key(&user.id) {
            return Err(duplicate("create user", "user"));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(
        &self,
        tenant_id: &str,
        username: &str,
    ) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.tenant_id == tenant_id && u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_user_by_account(
        &self,
        tenant_id: &str,
        account: &str,
    ) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.tenant_id == tenant_id && u.account.as_deref() == Some(account))
            .cloned())
    }

    async fn find_user_by_phone(
        &self,
        tenant_id: &str,
        phone: &str,
    ) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.tenant_id == tenant_id && u.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.users.remove(&user_id).is_some())
    }

    async fn purge_expired_and_insert_access_token(
        &self,
        token: &AccessToken,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, DatabaseError> {
        let mut tables = self.tables.write().await;
        // Checked before any mutation so a failed insert leaves the purge undone
        if tables.access_tokens.contains_key(&token.token) {
            return Err(duplicate("insert access token", "access token"));
        }

        let expired: Vec<String> = tables
            .access_tokens
            .values()
            .filter(|t| {
                t.client_id == token.client_id
                    && t.user_id == token.user_id
                    && t.is_expired_at(now)
            })
            .map(|t| t.token.clone())
            .collect();
        for value in &expired {
            tables.access_tokens.remove(value);
        }
        tables
            .access_tokens
            .insert(token.token.clone(), token.clone());
        Ok(expired)
    }

    async fn get_access_token(&self, token: &str) -> Result<Option<AccessToken>, DatabaseError> {
        Ok(self.tables.read().await.access_tokens.get(token).cloned())
    }

    async fn delete_access_token(&self, token: &str) -> Result<bool, DatabaseError> {
        Ok(self
            .tables
            .write()
            .await
            .access_tokens
            .remove(token)
            .is_some())
    }

    async fn find_refresh_token_for(
        &self,
        client_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<RefreshToken>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .refresh_tokens
            .values()
            .filter(|t| t.client_id == client_id && t.user_id == user_id)
            .max_by_key(|t| t.expires_at)
            .cloned())
    }

    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.refresh_tokens.contains_key(&token.token) {
            return Err(duplicate("create refresh token", "refresh token"));
        }
        tables
            .refresh_tokens
            .insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn get_refresh_token(
        &self,
        token: &str,
        client_id: Uuid,
    ) -> Result<Option<RefreshToken>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .refresh_tokens
            .get(token)
            .filter(|t| t.client_id == client_id)
            .cloned())
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<bool, DatabaseError> {
        Ok(self
            .tables
            .write()
            .await
            .refresh_tokens
            .remove(token)
            .is_some())
    }

    async fn create_authorization_code(
        &self,
        code: &AuthorizationCode,
    ) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.codes.contains_key(&code.code) {
            return Err(duplicate("create authorization code", "authorization code"));
        }
        tables.codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn take_authorization_code(
        &self,
        code: &str,
        client_id: Uuid,
    ) -> Result<Option<AuthorizationCode>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .codes
            .get(code)
            .is_some_and(|c| c.client_id == client_id);
        Ok(if owned { tables.codes.remove(code) } else { None })
    }

    async fn create_jwk(&self, entry: &JwkEntry) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.jwks.iter().any(|e| e.kid == entry.kid) {
            return Err(duplicate("create jwk", "key id"));
        }
        tables.jwks.push(entry.clone());
        Ok(())
    }

    async fn list_jwks(&self, sid: &str) -> Result<Vec<JwkEntry>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .jwks
            .iter()
            .filter(|e| e.sid == sid)
            .cloned()
            .collect())
    }
}
