// ABOUTME: OAuth2 authorization server core: grants, issuance, keys, and introspection
// ABOUTME: Everything hangs off one explicitly constructed OAuthService value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Client and user authentication
pub mod credentials;
/// Token endpoint grant engine
pub mod grants;
/// Introspection and revocation
pub mod introspection;
/// Access token, refresh token, and authorization code issuance
pub mod issuer;
/// RS256 signing keys and JWKS publication
pub mod jwks;
/// Endpoint request and response bodies
pub mod models;
/// Password hash verification
pub mod password;
/// Scope validation
pub mod scope;
/// Service wiring
pub mod service;

/// Client and user authenticator
pub use credentials::CredentialAuthenticator;
/// Closed set of supported grants
pub use grants::{Grant, GrantType};
/// Introspection hint
pub use introspection::TokenTypeHint;
/// Token issuer
pub use issuer::TokenIssuer;
/// Signing key manager
pub use jwks::{JwkKeyManager, RsaKeyPair};
/// Token endpoint request
pub use models::TokenRequest;
/// Token endpoint response
pub use models::TokenResponse;
/// Password verifier
pub use password::PasswordVerifier;
/// Scope validator
pub use scope::ScopeValidator;
/// The authorization server
pub use service::OAuthService;
