// ABOUTME: SQLite token store implementation built on a sqlx connection pool
// ABOUTME: Owns the schema, row decoding, and the transactional access token purge-and-insert
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::transactions::{retry_transaction, SqliteTransactionGuard};
use super::TokenStore;
use crate::config::DatabaseUrl;
use crate::errors::DatabaseError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::time::Duration;
use tokenward_core::constants::defaults::TRANSACTION_MAX_RETRIES;
use tokenward_core::models::{
    AccessToken, AuthorizationCode, Client, JwkEntry, RefreshToken, User,
};
use tracing::debug;
use uuid::Uuid;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const FILE_POOL_CONNECTIONS: u32 = 5;

/// `SQLite` token store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the database named by `url`
    ///
    /// File databases are created along with their parent directory. An
    /// in-memory database is pinned to a single connection that is never
    /// recycled, otherwise each new connection would see an empty schema.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::UnsupportedUrl`] for non-SQLite URLs and
    /// [`DatabaseError::ConnectionFailed`] if the pool cannot be opened
    pub async fn connect(url: &DatabaseUrl) -> Result<Self, DatabaseError> {
        let pool = match url {
            DatabaseUrl::SQLite { path } => {
                ensure_parent_dir(path).await?;
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(BUSY_TIMEOUT);
                SqlitePoolOptions::new()
                    .max_connections(FILE_POOL_CONNECTIONS)
                    .connect_with(options)
                    .await
            }
            DatabaseUrl::SQLiteMemory => {
                let options = SqliteConnectOptions::new()
                    .in_memory(true)
                    .busy_timeout(BUSY_TIMEOUT);
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
            }
            DatabaseUrl::Memory => {
                return Err(DatabaseError::UnsupportedUrl {
                    url: url.to_string(),
                })
            }
        }
        .map_err(|e| DatabaseError::ConnectionFailed {
            message: format!("{url}: {e}"),
        })?;

        debug!(%url, "Opened SQLite token store");
        Ok(Self { pool })
    }

    /// Underlying pool, for maintenance queries
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate_clients(&self) -> Result<(), DatabaseError> {
        self.run_ddl(
            r"
            CREATE TABLE IF NOT EXISTS oauth_clients (
                id TEXT PRIMARY KEY,
                key TEXT NOT NULL,
                secret_hash TEXT NOT NULL,
                redirect_uri TEXT,
                tenant_id TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            ",
        )
        .await?;
        self.run_ddl(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_oauth_clients_key ON oauth_clients(LOWER(key))",
        )
        .await
    }

    async fn migrate_users(&self) -> Result<(), DatabaseError> {
        self.run_ddl(
            r"
            CREATE TABLE IF NOT EXISTS oauth_users (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                username TEXT NOT NULL,
                account TEXT,
                phone TEXT,
                name TEXT,
                password_hash TEXT,
                password_scheme TEXT,
                created_at INTEGER NOT NULL
            )
            ",
        )
        .await?;
        self.run_ddl(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_oauth_users_username ON oauth_users(tenant_id, LOWER(username))",
        )
        .await?;
        self.run_ddl(
            "CREATE INDEX IF NOT EXISTS idx_oauth_users_account ON oauth_users(tenant_id, account)",
        )
        .await?;
        self.run_ddl(
            "CREATE INDEX IF NOT EXISTS idx_oauth_users_phone ON oauth_users(tenant_id, phone)",
        )
        .await
    }

    async fn migrate_tokens(&self) -> Result<(), DatabaseError> {
        // No foreign keys: introspection must be able to see dangling rows
        self.run_ddl(
            r"
            CREATE TABLE IF NOT EXISTS oauth_access_tokens (
                token TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                user_id TEXT,
                tenant_id TEXT NOT NULL,
                scope TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )
            ",
        )
        .await?;
        self.run_ddl(
            "CREATE INDEX IF NOT EXISTS idx_oauth_access_tokens_principal ON oauth_access_tokens(client_id, user_id)",
        )
        .await?;

        self.run_ddl(
            r"
            CREATE TABLE IF NOT EXISTS oauth_refresh_tokens (
                token TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                tenant_id TEXT NOT NULL,
                scope TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )
            ",
        )
        .await?;
        self.run_ddl(
            "CREATE INDEX IF NOT EXISTS idx_oauth_refresh_tokens_principal ON oauth_refresh_tokens(client_id, user_id)",
        )
        .await?;

        self.run_ddl(
            r"
            CREATE TABLE IF NOT EXISTS oauth_authorization_codes (
                code TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                tenant_id TEXT NOT NULL,
                redirect_uri TEXT,
                scope TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )
            ",
        )
        .await
    }

    async fn migrate_jwks(&self) -> Result<(), DatabaseError> {
        self.run_ddl(
            r"
            CREATE TABLE IF NOT EXISTS oauth_jwk (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sid TEXT NOT NULL,
                kid TEXT NOT NULL UNIQUE,
                key_data TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            ",
        )
        .await?;
        self.run_ddl("CREATE INDEX IF NOT EXISTS idx_oauth_jwk_sid ON oauth_jwk(sid)")
            .await
    }

    async fn run_ddl(&self, statement: &str) -> Result<(), DatabaseError> {
        sqlx::query(statement)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::MigrationFailed {
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn purge_and_insert_once(
        &self,
        token: &AccessToken,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, DatabaseError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed {
                message: format!("begin: {e}"),
            })?;
        let mut guard = SqliteTransactionGuard::new(tx);

        let client_id = token.client_id.to_string();
        let user_id = token.user_id.map(|id| id.to_string());

        let expired: Vec<String> = sqlx::query_scalar(
            r"
            SELECT token FROM oauth_access_tokens
            WHERE client_id = ? AND user_id IS ? AND expires_at <= ?
            ",
        )
        .bind(&client_id)
        .bind(&user_id)
        .bind(now.timestamp())
        .fetch_all(guard.executor()?)
        .await
        .map_err(|e| DatabaseError::query("select expired access tokens", &e))?;

        if !expired.is_empty() {
            sqlx::query(
                r"
                DELETE FROM oauth_access_tokens
                WHERE client_id = ? AND user_id IS ? AND expires_at <= ?
                ",
            )
            .bind(&client_id)
            .bind(&user_id)
            .bind(now.timestamp())
            .execute(guard.executor()?)
            .await
            .map_err(|e| DatabaseError::query("purge expired access tokens", &e))?;
        }

        sqlx::query(
            r"
            INSERT INTO oauth_access_tokens (token, client_id, user_id, tenant_id, scope, expires_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&token.token)
        .bind(&client_id)
        .bind(&user_id)
        .bind(&token.tenant_id)
        .bind(&token.scope)
        .bind(token.expires_at.timestamp())
        .execute(guard.executor()?)
        .await
        .map_err(|e| DatabaseError::query("insert access token", &e))?;

        guard.commit().await?;
        Ok(expired)
    }

    async fn fetch_user(
        &self,
        context: &'static str,
        sql: &str,
        tenant_id: &str,
        value: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query(sql)
            .bind(tenant_id)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::query(context, &e))?;
        row.map(|r| Self::row_to_user(&r)).transpose()
    }
}

async fn ensure_parent_dir(path: &str) -> Result<(), DatabaseError> {
    if let Some(parent) = Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed {
                message: format!("cannot create {}: {e}", parent.display()),
            })?;
    }
    Ok(())
}

const CLIENT_COLUMNS: &str = "id, key, secret_hash, redirect_uri, tenant_id, created_at";
const USER_COLUMNS: &str =
    "id, tenant_id, username, account, phone, name, password_hash, password_scheme, created_at";
const ACCESS_TOKEN_COLUMNS: &str = "token, client_id, user_id, tenant_id, scope, expires_at";
const REFRESH_TOKEN_COLUMNS: &str = "token, client_id, user_id, tenant_id, scope, expires_at";
const CODE_COLUMNS: &str = "code, client_id, user_id, tenant_id, redirect_uri, scope, expires_at";

#[async_trait]
impl TokenStore for SqliteStore {
    async fn migrate(&self) -> Result<(), DatabaseError> {
        self.migrate_clients().await?;
        self.migrate_users().await?;
        self.migrate_tokens().await?;
        self.migrate_jwks().await
    }

    async fn create_client(&self, client: &Client) -> Result<(), DatabaseError> {
        sqlx::query(&format!(
            "INSERT INTO oauth_clients ({CLIENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
        ))
        .bind(client.id.to_string())
        .bind(&client.key)
        .bind(&client.secret_hash)
        .bind(&client.redirect_uri)
        .bind(&client.tenant_id)
        .bind(client.created_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("create client", &e))?;
        Ok(())
    }

    async fn get_client(&self, client_id: Uuid) -> Result<Option<Client>, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {CLIENT_COLUMNS} FROM oauth_clients WHERE id = ?"
        ))
        .bind(client_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("get client", &e))?;
        row.map(|r| Self::row_to_client(&r)).transpose()
    }

    async fn get_client_by_key(&self, key: &str) -> Result<Option<Client>, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {CLIENT_COLUMNS} FROM oauth_clients WHERE LOWER(key) = LOWER(?)"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("get client by key", &e))?;
        row.map(|r| Self::row_to_client(&r)).transpose()
    }

    async fn delete_client(&self, client_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM oauth_clients WHERE id = ?")
            .bind(client_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("delete client", &e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_user(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query(&format!(
            "INSERT INTO oauth_users ({USER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(user.id.to_string())
        .bind(&user.tenant_id)
        .bind(&user.username)
        .bind(&user.account)
        .bind(&user.phone)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.password_scheme)
        .bind(user.created_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("create user", &e))?;
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM oauth_users WHERE id = ?"))
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("get user", &e))?;
        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    async fn find_user_by_username(
        &self,
        tenant_id: &str,
        username: &str,
    ) -> Result<Option<User>, DatabaseError> {
        self.fetch_user(
            "find user by username",
            &format!(
                "SELECT {USER_COLUMNS} FROM oauth_users WHERE tenant_id = ? AND LOWER(username) = LOWER(?)"
            ),
            tenant_id,
            username,
        )
        .await
    }

    async fn find_user_by_account(
        &self,
        tenant_id: &str,
        account: &str,
    ) -> Result<Option<User>, DatabaseError> {
        self.fetch_user(
            "find user by account",
            &format!(
                "SELECT {USER_COLUMNS} FROM oauth_users WHERE tenant_id = ? AND account = ? LIMIT 1"
            ),
            tenant_id,
            account,
        )
        .await
    }

    async fn find_user_by_phone(
        &self,
        tenant_id: &str,
        phone: &str,
    ) -> Result<Option<User>, DatabaseError> {
        self.fetch_user(
            "find user by phone",
            &format!(
                "SELECT {USER_COLUMNS} FROM oauth_users WHERE tenant_id = ? AND phone = ? LIMIT 1"
            ),
            tenant_id,
            phone,
        )
        .await
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM oauth_users WHERE id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("delete user", &e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired_and_insert_access_token(
        &self,
        token: &AccessToken,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, DatabaseError> {
        retry_transaction(
            || self.purge_and_insert_once(token, now),
            TRANSACTION_MAX_RETRIES,
        )
        .await
    }

    async fn get_access_token(&self, token: &str) -> Result<Option<AccessToken>, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCESS_TOKEN_COLUMNS} FROM oauth_access_tokens WHERE token = ?"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("get access token", &e))?;
        row.map(|r| Self::row_to_access_token(&r)).transpose()
    }

    async fn delete_access_token(&self, token: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM oauth_access_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("delete access token", &e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_refresh_token_for(
        &self,
        client_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<RefreshToken>, DatabaseError> {
        let row = sqlx::query(&format!(
            r"
            SELECT {REFRESH_TOKEN_COLUMNS} FROM oauth_refresh_tokens
            WHERE client_id = ? AND user_id = ?
            ORDER BY expires_at DESC
            LIMIT 1
            "
        ))
        .bind(client_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("find refresh token", &e))?;
        row.map(|r| Self::row_to_refresh_token(&r)).transpose()
    }

    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<(), DatabaseError> {
        sqlx::query(&format!(
            "INSERT INTO oauth_refresh_tokens ({REFRESH_TOKEN_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
        ))
        .bind(&token.token)
        .bind(token.client_id.to_string())
        .bind(token.user_id.to_string())
        .bind(&token.tenant_id)
        .bind(&token.scope)
        .bind(token.expires_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("create refresh token", &e))?;
        Ok(())
    }

    async fn get_refresh_token(
        &self,
        token: &str,
        client_id: Uuid,
    ) -> Result<Option<RefreshToken>, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {REFRESH_TOKEN_COLUMNS} FROM oauth_refresh_tokens WHERE token = ? AND client_id = ?"
        ))
        .bind(token)
        .bind(client_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("get refresh token", &e))?;
        row.map(|r| Self::row_to_refresh_token(&r)).transpose()
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM oauth_refresh_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("delete refresh token", &e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_authorization_code(
        &self,
        code: &AuthorizationCode,
    ) -> Result<(), DatabaseError> {
        sqlx::query(&format!(
            "INSERT INTO oauth_authorization_codes ({CODE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&code.code)
        .bind(code.client_id.to_string())
        .bind(code.user_id.to_string())
        .bind(&code.tenant_id)
        .bind(&code.redirect_uri)
        .bind(&code.scope)
        .bind(code.expires_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("create authorization code", &e))?;
        Ok(())
    }

    async fn take_authorization_code(
        &self,
        code: &str,
        client_id: Uuid,
    ) -> Result<Option<AuthorizationCode>, DatabaseError> {
        let row = sqlx::query(&format!(
            "DELETE FROM oauth_authorization_codes WHERE code = ? AND client_id = ? RETURNING {CODE_COLUMNS}"
        ))
        .bind(code)
        .bind(client_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("take authorization code", &e))?;
        row.map(|r| Self::row_to_authorization_code(&r)).transpose()
    }

    async fn create_jwk(&self, entry: &JwkEntry) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO oauth_jwk (sid, kid, key_data, created_at) VALUES (?, ?, ?, ?)")
            .bind(&entry.sid)
            .bind(&entry.kid)
            .bind(&entry.key_data)
            .bind(entry.created_at.timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("create jwk", &e))?;
        Ok(())
    }

    async fn list_jwks(&self, sid: &str) -> Result<Vec<JwkEntry>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT sid, kid, key_data, created_at FROM oauth_jwk WHERE sid = ? ORDER BY id",
        )
        .bind(sid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("list jwks", &e))?;
        rows.iter().map(Self::row_to_jwk).collect()
    }
}

impl SqliteStore {
    fn row_to_client(row: &SqliteRow) -> Result<Client, DatabaseError> {
        Ok(Client {
            id: parse_uuid("client", &row.try_get::<String, _>("id")?)?,
            key: row.try_get("key")?,
            secret_hash: row.try_get("secret_hash")?,
            redirect_uri: row.try_get("redirect_uri")?,
            tenant_id: row.try_get("tenant_id")?,
            created_at: from_unix("client", row.try_get("created_at")?)?,
        })
    }

    fn row_to_user(row: &SqliteRow) -> Result<User, DatabaseError> {
        Ok(User {
            id: parse_uuid("user", &row.try_get::<String, _>("id")?)?,
            tenant_id: row.try_get("tenant_id")?,
            username: row.try_get("username")?,
            account: row.try_get("account")?,
            phone: row.try_get("phone")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
            password_scheme: row.try_get("password_scheme")?,
            created_at: from_unix("user", row.try_get("created_at")?)?,
        })
    }

    fn row_to_access_token(row: &SqliteRow) -> Result<AccessToken, DatabaseError> {
        let user_id: Option<String> = row.try_get("user_id")?;
        Ok(AccessToken {
            token: row.try_get("token")?,
            client_id: parse_uuid("access token", &row.try_get::<String, _>("client_id")?)?,
            user_id: user_id
                .as_deref()
                .map(|id| parse_uuid("access token", id))
                .transpose()?,
            tenant_id: row.try_get("tenant_id")?,
            scope: row.try_get("scope")?,
            expires_at: from_unix("access token", row.try_get("expires_at")?)?,
        })
    }

    fn row_to_refresh_token(row: &SqliteRow) -> Result<RefreshToken, DatabaseError> {
        Ok(RefreshToken {
            token: row.try_get("token")?,
            client_id: parse_uuid("refresh token", &row.try_get::<String, _>("client_id")?)?,
            user_id: parse_uuid("refresh token", &row.try_get::<String, _>("user_id")?)?,
            tenant_id: row.try_get("tenant_id")?,
            scope: row.try_get("scope")?,
            expires_at: from_unix("refresh token", row.try_get("expires_at")?)?,
        })
    }

    fn row_to_authorization_code(row: &SqliteRow) -> Result<AuthorizationCode, DatabaseError> {
        Ok(AuthorizationCode {
            code: row.try_get("code")?,
            client_id: parse_uuid(
                "authorization code",
                &row.try_get::<String, _>("client_id")?,
            )?,
            user_id: parse_uuid("authorization code", &row.try_get::<String, _>("user_id")?)?,
            tenant_id: row.try_get("tenant_id")?,
            redirect_uri: row.try_get("redirect_uri")?,
            scope: row.try_get("scope")?,
            expires_at: from_unix("authorization code", row.try_get("expires_at")?)?,
        })
    }

    fn row_to_jwk(row: &SqliteRow) -> Result<JwkEntry, DatabaseError> {
        Ok(JwkEntry {
            sid: row.try_get("sid")?,
            kid: row.try_get("kid")?,
            key_data: row.try_get("key_data")?,
            created_at: from_unix("jwk", row.try_get("created_at")?)?,
        })
    }
}

fn parse_uuid(entity: &'static str, value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|e| DatabaseError::InvalidRecord {
        entity,
        reason: format!("bad id {value:?}: {e}"),
    })
}

fn from_unix(entity: &'static str, secs: i64) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| DatabaseError::InvalidRecord {
        entity,
        reason: format!("timestamp {secs} out of range"),
    })
}
