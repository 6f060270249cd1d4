// ABOUTME: Token store configuration and connection URL parsing
// ABOUTME: Selects SQLite on disk, SQLite in memory, or the in-process fake store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::errors::AppResult;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tokenward_core::constants::defaults;
use tokenward_core::errors::DatabaseError;

use super::environment::{env_var_or, parse_env};

/// Type-safe store location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// Path to the database file
        path: String,
    },
    /// In-memory `SQLite` (schema and transactions, no persistence)
    SQLiteMemory,
    /// In-process fake store without SQL
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::UnsupportedUrl`] for schemes other than
    /// `sqlite:` and `memory://`
    pub fn parse_url(s: &str) -> Result<Self, DatabaseError> {
        if s == "memory://" {
            return Ok(Self::Memory);
        }
        match s.strip_prefix("sqlite:") {
            Some(":memory:") => Ok(Self::SQLiteMemory),
            Some(path) if !path.is_empty() => Ok(Self::SQLite {
                path: path.trim_start_matches("//").to_owned(),
            }),
            _ => Err(DatabaseError::UnsupportedUrl { url: s.to_owned() }),
        }
    }

    /// Connection string understood by sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{path}"),
            Self::SQLiteMemory => "sqlite::memory:".to_owned(),
            Self::Memory => "memory://".to_owned(),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Token store configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Store location
    pub url: DatabaseUrl,
    /// Create tables on startup
    pub auto_migrate: bool,
}

impl DatabaseConfig {
    /// Load store configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` or `AUTO_MIGRATE` is invalid
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            url: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", defaults::DATABASE_URL))?,
            auto_migrate: parse_env("AUTO_MIGRATE", true)?,
        })
    }
}
