// ABOUTME: Cache configuration constants for the token mirror
// ABOUTME: Capacity, cleanup cadence, Redis key namespace, and Redis retry defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Maximum entries held by the in-memory backend
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Seconds between background sweeps of expired in-memory entries
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;

/// Namespace prefix applied to every Redis key
pub const CACHE_KEY_PREFIX: &str = "tokenward:";

/// Redis connection defaults
pub mod redis {
    /// Connection timeout in seconds
    pub const CONNECTION_TIMEOUT_SECS: u64 = 5;
    /// Command response timeout in seconds
    pub const RESPONSE_TIMEOUT_SECS: u64 = 2;
    /// Reconnection attempts after a dropped connection
    pub const RECONNECTION_RETRIES: usize = 3;
    /// Exponential backoff base
    pub const RETRY_EXPONENT_BASE: u64 = 2;
    /// Upper bound on a single retry delay
    pub const MAX_RETRY_DELAY_MS: u64 = 5_000;
    /// Attempts made for the initial connection at startup
    pub const INITIAL_CONNECTION_RETRIES: u32 = 3;
    /// First retry delay, doubled after each failure
    pub const INITIAL_RETRY_DELAY_MS: u64 = 500;
}
