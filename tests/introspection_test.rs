// ABOUTME: Integration tests for token introspection and revocation
// ABOUTME: Covers hint dispatch, dangling owners, client authentication, and revoke fallbacks
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

mod common;

use anyhow::Result;
use common::{fixture, jwt_fixture, CLIENT_SECRET, USER_PASSWORD};
use tokenward::cache::{CacheKey, CacheProvider};
use tokenward::errors::OAuthError;
use tokenward::oauth2_server::models::{
    ClientCredentials, IntrospectRequest, RevokeRequest, TokenRequest,
};
use tokenward::oauth2_server::TokenResponse;
use tokenward_core::models::{AccessToken, Client};

fn basic(client: &Client) -> Option<ClientCredentials> {
    Some(ClientCredentials {
        client_id: client.key.clone(),
        client_secret: CLIENT_SECRET.to_owned(),
    })
}

fn introspect(token: &str, hint: Option<&str>) -> IntrospectRequest {
    IntrospectRequest {
        token: token.to_owned(),
        token_type_hint: hint.map(str::to_owned),
    }
}

async fn login(fx: &common::Fixture) -> Result<TokenResponse> {
    let request = TokenRequest {
        grant_type: "password".to_owned(),
        username: Some(fx.user.username.clone()),
        password: Some(USER_PASSWORD.to_owned()),
        scope: Some("read read_write".to_owned()),
        ..TokenRequest::default()
    };
    Ok(fx.service.token(request, basic(&fx.client)).await?)
}

#[tokio::test]
async fn test_access_token_introspection() -> Result<()> {
    let fx = fixture().await?;
    let tokens = login(&fx).await?;

    for hint in [None, Some(""), Some("access_token")] {
        let response = fx
            .service
            .introspect(basic(&fx.client), introspect(&tokens.access_token, hint))
            .await?;
        assert!(response.active);
        assert_eq!(response.scope.as_deref(), Some("read read_write"));
        assert_eq!(response.client_id.as_deref(), Some(fx.client.key.as_str()));
        assert_eq!(response.user_id, Some(fx.user.id.to_string()));
        assert_eq!(response.name, fx.user.name);
        assert_eq!(response.tenant_id.as_deref(), Some(fx.user.tenant_id.as_str()));
        assert_eq!(response.token_type.as_deref(), Some("Bearer"));
        assert!(response.exp.is_some_and(|exp| exp > chrono::Utc::now().timestamp()));
    }

    Ok(())
}

#[tokio::test]
async fn test_refresh_token_introspection() -> Result<()> {
    let fx = fixture().await?;
    let tokens = login(&fx).await?;
    let refresh = tokens
        .refresh_token
        .ok_or_else(|| anyhow::anyhow!("no refresh token issued"))?;

    let response = fx
        .service
        .introspect(
            basic(&fx.client),
            introspect(&refresh, Some("refresh_token")),
        )
        .await?;
    assert!(response.active);
    assert_eq!(response.user_id, Some(fx.user.id.to_string()));

    // Refresh tokens are only visible to the client they were issued to
    let other = common::test_client("other-app");
    fx.store.create_client(&other).await?;
    assert!(matches!(
        fx.service
            .introspect(basic(&other), introspect(&refresh, Some("refresh_token")))
            .await,
        Err(OAuthError::RefreshTokenNotFound)
    ));

    Ok(())
}

#[tokio::test]
async fn test_jwt_introspection_resolves_the_mirrored_access_token() -> Result<()> {
    let fx = jwt_fixture().await?;
    let tokens = login(&fx).await?;
    let id_token = tokens
        .id_token
        .ok_or_else(|| anyhow::anyhow!("no id_token issued"))?;

    let response = fx
        .service
        .introspect(basic(&fx.client), introspect(&id_token, Some("jwt")))
        .await?;
    assert!(response.active);
    assert_eq!(response.user_id, Some(fx.user.id.to_string()));

    // Revoking the opaque token deactivates the JWT too
    fx.service
        .revoke(RevokeRequest {
            token: tokens.access_token,
        })
        .await?;
    assert!(matches!(
        fx.service
            .introspect(basic(&fx.client), introspect(&id_token, Some("jwt")))
            .await,
        Err(OAuthError::AccessTokenNotFound)
    ));

    Ok(())
}

#[tokio::test]
async fn test_introspection_requires_client_and_token() -> Result<()> {
    let fx = fixture().await?;
    let tokens = login(&fx).await?;

    assert!(matches!(
        fx.service
            .introspect(None, introspect(&tokens.access_token, None))
            .await,
        Err(OAuthError::InvalidClientCredentials)
    ));
    assert!(matches!(
        fx.service
            .introspect(basic(&fx.client), introspect("", None))
            .await,
        Err(OAuthError::TokenMissing)
    ));
    assert!(matches!(
        fx.service
            .introspect(
                basic(&fx.client),
                introspect(&tokens.access_token, Some("id_token"))
            )
            .await,
        Err(OAuthError::InvalidTokenHint { .. })
    ));
    assert!(matches!(
        fx.service
            .introspect(basic(&fx.client), introspect("unknown", None))
            .await,
        Err(OAuthError::AccessTokenNotFound)
    ));

    Ok(())
}

#[tokio::test]
async fn test_expired_access_token_introspection() -> Result<()> {
    let fx = fixture().await?;
    let expired = fx
        .service
        .issuer()
        .grant_access_token(&fx.client, Some(&fx.user), -1, "read")
        .await?;

    assert!(matches!(
        fx.service
            .introspect(basic(&fx.client), introspect(&expired.token, None))
            .await,
        Err(OAuthError::AccessTokenExpired)
    ));

    Ok(())
}

#[tokio::test]
async fn test_expired_refresh_token_is_never_active() -> Result<()> {
    let fx = fixture().await?;
    let expired = fx
        .service
        .issuer()
        .get_or_create_refresh_token(&fx.client, &fx.user, -10, "read")
        .await?;

    assert!(matches!(
        fx.service
            .introspect(
                basic(&fx.client),
                introspect(&expired.token, Some("refresh_token"))
            )
            .await,
        Err(OAuthError::RefreshTokenExpired)
    ));

    Ok(())
}

#[tokio::test]
async fn test_dangling_owners_are_reported() -> Result<()> {
    let fx = fixture().await?;
    let tokens = login(&fx).await?;

    fx.store.delete_user(fx.user.id).await?;
    assert!(matches!(
        fx.service
            .introspect(basic(&fx.client), introspect(&tokens.access_token, None))
            .await,
        Err(OAuthError::UserNotFound)
    ));

    // The introspecting client stays registered; the owning one disappears
    let owner = common::test_client("short-lived");
    fx.store.create_client(&owner).await?;
    let orphan = fx
        .service
        .issuer()
        .grant_access_token(&owner, None, 60, "read")
        .await?;
    fx.store.delete_client(owner.id).await?;
    assert!(matches!(
        fx.service
            .introspect(basic(&fx.client), introspect(&orphan.token, None))
            .await,
        Err(OAuthError::ClientNotFound)
    ));

    Ok(())
}

#[tokio::test]
async fn test_revoke_access_then_refresh_then_unknown() -> Result<()> {
    let fx = fixture().await?;
    let tokens = login(&fx).await?;
    let refresh = tokens
        .refresh_token
        .ok_or_else(|| anyhow::anyhow!("no refresh token issued"))?;

    fx.service
        .revoke(RevokeRequest {
            token: tokens.access_token.clone(),
        })
        .await?;
    assert!(matches!(
        fx.service.issuer().authenticate(&tokens.access_token).await,
        Err(OAuthError::AccessTokenNotFound)
    ));

    fx.service
        .revoke(RevokeRequest {
            token: refresh.clone(),
        })
        .await?;
    assert!(fx
        .store
        .get_refresh_token(&refresh, fx.client.id)
        .await?
        .is_none());

    assert!(matches!(
        fx.service
            .revoke(RevokeRequest {
                token: refresh.clone()
            })
            .await,
        Err(OAuthError::InvalidToken)
    ));
    assert!(matches!(
        fx.service
            .revoke(RevokeRequest {
                token: String::new()
            })
            .await,
        Err(OAuthError::TokenMissing)
    ));

    Ok(())
}

#[tokio::test]
async fn test_revoking_an_unknown_token_changes_nothing() -> Result<()> {
    let fx = fixture().await?;
    let tokens = login(&fx).await?;
    let refresh = tokens
        .refresh_token
        .ok_or_else(|| anyhow::anyhow!("no refresh token issued"))?;

    assert!(matches!(
        fx.service
            .revoke(RevokeRequest {
                token: "does-not-exist".to_owned()
            })
            .await,
        Err(OAuthError::InvalidToken)
    ));

    assert!(fx
        .store
        .get_access_token(&tokens.access_token)
        .await?
        .is_some());
    assert!(fx
        .store
        .get_refresh_token(&refresh, fx.client.id)
        .await?
        .is_some());
    let mirrored: Option<AccessToken> = fx
        .service
        .issuer()
        .cache()
        .get(&CacheKey::access_token(&tokens.access_token))
        .await?;
    assert_eq!(
        mirrored.map(|record| record.token),
        Some(tokens.access_token)
    );

    Ok(())
}
