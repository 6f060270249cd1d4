// ABOUTME: Transaction guard with rollback on drop and retry with exponential backoff
// ABOUTME: Wraps sqlx transactions so multi-statement token writes commit all or nothing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Transaction helpers for the `SQLite` token store
//!
//! ```text
//! retry_transaction(|| async {
//!     let mut guard = TransactionGuard::new(pool.begin().await?);
//!     sqlx::query("DELETE ...").execute(guard.executor()?).await?;
//!     sqlx::query("INSERT ...").execute(guard.executor()?).await?;
//!     guard.commit().await
//! }, 3).await
//! ```

use std::future::Future;
use std::time::Duration;

use sqlx::{Database, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::DatabaseError;

/// Retry `f` while it fails with a transient locking error
///
/// Backoff doubles from 20ms. Constraint violations and other permanent
/// failures are returned on the first attempt.
///
/// # Errors
///
/// Returns the last error once `max_retries` attempts have failed, or the
/// first non-retryable error
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_retries: u32) -> Result<T, DatabaseError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DatabaseError>>,
{
    let mut attempts: u32 = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if !e.is_retryable() {
                    debug!(attempts, error = %e, "Transaction failed with non-retryable error");
                    return Err(e);
                }
                if attempts >= max_retries {
                    error!(
                        attempts,
                        max_retries,
                        error = %e,
                        "Transaction failed after max retries"
                    );
                    return Err(e);
                }

                let backoff_ms = 10_u64 << attempts.min(10);
                warn!(
                    attempt = attempts,
                    max_retries,
                    backoff_ms,
                    error = %e,
                    "Transaction hit a locked database, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Transaction wrapper that rolls back unless [`TransactionGuard::commit`] runs
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Wrap a freshly begun transaction
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        Self {
            transaction: Some(transaction),
        }
    }

    /// Commit and consume the guard
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::TransactionFailed`] if the commit fails or the
    /// guard no longer holds a transaction
    pub async fn commit(mut self) -> Result<(), DatabaseError> {
        let tx = self
            .transaction
            .take()
            .ok_or_else(|| DatabaseError::TransactionFailed {
                message: "transaction already finished".to_owned(),
            })?;
        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed {
                message: format!("commit: {e}"),
            })
    }

    /// Connection to run statements on
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::TransactionFailed`] after commit
    pub fn executor(&mut self) -> Result<&mut DB::Connection, DatabaseError> {
        self.transaction
            .as_deref_mut()
            .ok_or_else(|| DatabaseError::TransactionFailed {
                message: "transaction already finished".to_owned(),
            })
    }
}

impl<DB: Database> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            warn!("TransactionGuard dropped without commit, rolling back");
        }
    }
}

/// Guard over a `SQLite` transaction
pub type SqliteTransactionGuard<'c> = TransactionGuard<'c, sqlx::Sqlite>;
