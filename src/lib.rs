// ABOUTME: Main library entry point for the Tokenward OAuth2 authorization server
// ABOUTME: Exposes configuration, storage, cache, the OAuth service core, and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Tokenward
//!
//! A multi-tenant OAuth2 authorization server core. It issues opaque access
//! and refresh tokens for the password, client credentials, authorization
//! code, and refresh token grants, optionally mints an RS256 JWT next to each
//! user-bound access token, and answers introspection and revocation
//! requests.
//!
//! ## Architecture
//!
//! - **Store**: [`database::TokenStore`] is authoritative (`SQLite` or memory)
//! - **Cache**: [`cache::CacheProvider`] mirrors live access tokens (LRU or Redis)
//! - **Service**: [`oauth2_server::OAuthService`] wires both with the grant
//!   engine, token issuer, and JWK key manager
//! - **Routes**: [`routes::router`] exposes the service over axum
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tokenward::config::ServerConfig;
//! use tokenward::errors::AppResult;
//! use tokenward::oauth2_server::OAuthService;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let service = OAuthService::from_config(&config).await?;
//!     println!("Issuing tokens for scopes {:?}", service.config().allowed_scopes);
//!     Ok(())
//! }
//! ```

/// Access token cache mirror
pub mod cache;

/// Environment-driven configuration
pub mod config;

/// Token store trait and implementations
pub mod database;

/// Error types
pub mod errors;

/// Tracing subscriber setup
pub mod logging;

/// OAuth2 authorization server core
pub mod oauth2_server;

/// HTTP routes
pub mod routes;
