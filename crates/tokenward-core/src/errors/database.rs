// ABOUTME: Database error types returned by every token store implementation
// ABOUTME: Classifies sqlx failures into connection, query, constraint, and record errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Errors raised by the relational token store
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The store could not be opened or a connection could not be acquired
    #[error("Database connection failed: {message}")]
    ConnectionFailed {
        /// Driver message
        message: String,
    },

    /// A statement failed
    #[error("Query failed during {context}: {message}")]
    QueryFailed {
        /// Operation that issued the statement
        context: &'static str,
        /// Driver message
        message: String,
    },

    /// A uniqueness or integrity constraint rejected a write
    #[error("Constraint violated during {context}: {message}")]
    ConstraintViolation {
        /// Operation that issued the statement
        context: &'static str,
        /// Driver message
        message: String,
    },

    /// Beginning, committing, or rolling back a transaction failed
    #[error("Transaction failed: {message}")]
    TransactionFailed {
        /// Driver message
        message: String,
    },

    /// Schema creation failed
    #[error("Migration failed: {message}")]
    MigrationFailed {
        /// Driver message
        message: String,
    },

    /// A persisted row could not be decoded into its model
    #[error("Invalid {entity} record: {reason}")]
    InvalidRecord {
        /// Model being decoded
        entity: &'static str,
        /// What was wrong with the row
        reason: String,
    },

    /// The connection URL names no supported backend
    #[error("Unsupported database URL: {url}")]
    UnsupportedUrl {
        /// URL as configured
        url: String,
    },
}

impl DatabaseError {
    /// Whether retrying the whole transaction may succeed
    ///
    /// SQLite reports writer contention as `database is locked` or `busy`.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::QueryFailed { message, .. }
            | Self::TransactionFailed { message }
            | Self::ConnectionFailed { message } => {
                let lowered = message.to_lowercase();
                lowered.contains("database is locked")
                    || lowered.contains("busy")
                    || lowered.contains("pool timed out")
            }
            _ => false,
        }
    }

    /// Classify a driver error raised while running `context`
    #[cfg(feature = "database-errors")]
    #[must_use]
    pub fn query(context: &'static str, error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::Database(db) if db.is_unique_violation() || db.is_check_violation() => {
                Self::ConstraintViolation {
                    context,
                    message: db.message().to_owned(),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::ConnectionFailed {
                    message: error.to_string(),
                }
            }
            _ => Self::QueryFailed {
                context,
                message: error.to_string(),
            },
        }
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        Self::query("query", &error)
    }
}
