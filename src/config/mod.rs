// ABOUTME: Configuration management for the authorization server
// ABOUTME: Environment-only settings for HTTP, token store, cache mirror, and token issuance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Configuration module
//!
//! All settings come from environment variables; there is no config file.
//!
//! - **environment**: `ServerConfig`, the aggregate loaded at startup
//! - **database**: store URL parsing (`sqlite:`, `sqlite::memory:`, `memory://`)
//! - **cache**: Redis connection tuning and in-memory capacity
//! - **oauth**: token lifetimes, JWT issuance, scope allow-list, password HMAC

/// Cache mirror configuration
pub mod cache;
/// Token store configuration
pub mod database;
/// Environment and server configuration
pub mod environment;
/// Token issuance configuration
pub mod oauth;

pub use cache::RedisConnectionConfig;
pub use database::{DatabaseConfig, DatabaseUrl};
pub use environment::ServerConfig;
pub use oauth::OAuthConfig;
