// ABOUTME: HTTP route assembly for the authorization server
// ABOUTME: Merges the OAuth2 endpoints and health probe under one traced axum router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route module for the authorization server
//!
//! Handlers are thin: they extract the request, delegate to
//! [`OAuthService`], and let [`crate::errors::OAuthError`] render failures.

/// Health check routes
pub mod health;
/// OAuth2 token, introspection, revocation, and JWKS routes
pub mod oauth2;

pub use health::HealthRoutes;
pub use oauth2::OAuth2Routes;

use crate::cache::CacheProvider;
use crate::oauth2_server::OAuthService;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Full application router with request tracing
pub fn router<C: CacheProvider + 'static>(service: Arc<OAuthService<C>>) -> Router {
    Router::new()
        .merge(OAuth2Routes::routes(Arc::clone(&service)))
        .merge(HealthRoutes::routes(service))
        .layer(TraceLayer::new_for_http())
}
