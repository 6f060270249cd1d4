// ABOUTME: OAuth2 HTTP handlers for token issuance, introspection, revocation, and JWKS
// ABOUTME: Extracts basic-auth client credentials and delegates to the OAuth service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::cache::CacheProvider;
use crate::errors::OAuthError;
use crate::oauth2_server::jwks::JsonWebKeySet;
use crate::oauth2_server::models::{
    ClientCredentials, IntrospectRequest, IntrospectionResponse, RevokeRequest, TokenRequest,
    TokenResponse,
};
use crate::oauth2_server::OAuthService;
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use std::sync::Arc;
use tokenward_core::constants::oauth::routes;

/// OAuth2 route definitions
pub struct OAuth2Routes;

impl OAuth2Routes {
    /// Create all OAuth2 routes
    pub fn routes<C: CacheProvider + 'static>(service: Arc<OAuthService<C>>) -> Router {
        Router::new()
            .route(routes::TOKEN, post(handle_token::<C>))
            .route(routes::INTROSPECT, post(handle_introspect::<C>))
            .route(routes::REVOKE, post(handle_revoke::<C>))
            .route(routes::JWKS, get(handle_jwks::<C>))
            .with_state(service)
    }
}

type BasicAuth = Option<TypedHeader<Authorization<Basic>>>;

fn basic_credentials(header: BasicAuth) -> Option<ClientCredentials> {
    header.map(|TypedHeader(Authorization(basic))| ClientCredentials {
        client_id: basic.username().to_owned(),
        client_secret: basic.password().to_owned(),
    })
}

// Undecodable bodies are reported as OAuth2 `invalid_request`
fn body_or_invalid<T, R: std::fmt::Display>(body: Result<T, R>) -> Result<T, OAuthError> {
    body.map_err(|rejection| OAuthError::malformed(rejection.to_string()))
}

async fn handle_token<C: CacheProvider + 'static>(
    State(service): State<Arc<OAuthService<C>>>,
    basic: BasicAuth,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, OAuthError> {
    let Json(request) = body_or_invalid(body)?;
    service
        .token(request, basic_credentials(basic))
        .await
        .map(Json)
}

async fn handle_introspect<C: CacheProvider + 'static>(
    State(service): State<Arc<OAuthService<C>>>,
    basic: BasicAuth,
    body: Result<Form<IntrospectRequest>, FormRejection>,
) -> Result<Json<IntrospectionResponse>, OAuthError> {
    let Form(request) = body_or_invalid(body)?;
    service
        .introspect(basic_credentials(basic), request)
        .await
        .map(Json)
}

async fn handle_revoke<C: CacheProvider + 'static>(
    State(service): State<Arc<OAuthService<C>>>,
    body: Result<Form<RevokeRequest>, FormRejection>,
) -> Result<(), OAuthError> {
    let Form(request) = body_or_invalid(body)?;
    service.revoke(request).await
}

async fn handle_jwks<C: CacheProvider + 'static>(
    State(service): State<Arc<OAuthService<C>>>,
) -> Result<Json<JsonWebKeySet>, OAuthError> {
    service.keys().public_jwk_set().await.map(Json)
}
