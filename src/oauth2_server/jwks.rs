// ABOUTME: RS256 signing key management backed by the token store's JWK rows
// ABOUTME: Signs and verifies access token JWTs and publishes the public key as a JWKS document
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! JWK Key Management
//!
//! One RSA key pair is stored as two rows of the `oauth-jwk` group: the
//! private row carries a PKCS#8 PEM, the public row carries the public JWK as
//! JSON. Rows are found by key-id prefix.
//!
//! ```rust,no_run
//! use tokenward::database::{MemoryStore, TokenStore};
//! use tokenward::oauth2_server::jwks::JwkKeyManager;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), tokenward::errors::OAuthError> {
//! let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::new());
//! let keys = JwkKeyManager::new(store, "https://auth.example.com");
//!
//! keys.provision(2048).await?;
//! let jwks = keys.public_jwk_set().await?;
//! assert_eq!(jwks.keys.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::database::TokenStore;
use crate::errors::{OAuthError, OAuthResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokenward_core::constants::oauth::jwk::{ALGORITHM, PRIVATE_KID_PREFIX, PUBLIC_KID_PREFIX, SID};
use tokenward_core::models::{JwkEntry, User};
use tracing::{debug, info};

/// JWK (JSON Web Key) representation of an RSA public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key type (always "RSA")
    pub kty: String,
    /// Public key use (always "sig")
    #[serde(rename = "use")]
    pub key_use: String,
    /// Key id, also the `kid` header of signed tokens
    pub kid: String,
    /// Algorithm (RS256)
    pub alg: String,
    /// RSA modulus (base64url)
    pub n: String,
    /// RSA exponent (base64url)
    pub e: String,
}

/// JWKS (JSON Web Key Set) document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    /// Published public keys
    pub keys: Vec<JsonWebKey>,
}

/// Claims of a JWT minted next to an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User id
    pub sub: String,
    /// Configured issuer
    pub iss: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Not before (Unix seconds)
    pub nbf: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// The opaque access token this JWT mirrors
    pub jti: String,
    /// Granted scope
    pub scope: String,
    /// Tenant of the user
    pub tenant_id: String,
}

/// RSA key pair in memory
#[derive(Clone)]
pub struct RsaKeyPair {
    /// Suffix shared by the private and public key ids
    pub kid: String,
    /// Private key for signing
    pub private_key: RsaPrivateKey,
    /// Public key for verification
    pub public_key: RsaPublicKey,
    /// Key creation timestamp
    pub created_at: DateTime<Utc>,
}

impl RsaKeyPair {
    /// Generate a key pair of `key_size_bits`
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidKeyMaterial`] if generation fails
    pub fn generate_with_key_size(kid: &str, key_size_bits: usize) -> OAuthResult<Self> {
        let mut rng = rand::rngs::OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, key_size_bits)
            .map_err(|e| OAuthError::key_material(format!("RSA key generation failed: {e}")))?;
        let public_key = RsaPublicKey::from(&private_key);

        Ok(Self {
            kid: kid.to_owned(),
            private_key,
            public_key,
            created_at: Utc::now(),
        })
    }

    /// Key id of the private row
    #[must_use]
    pub fn private_kid(&self) -> String {
        format!("{PRIVATE_KID_PREFIX}-{}", self.kid)
    }

    /// Key id of the public row
    #[must_use]
    pub fn public_kid(&self) -> String {
        format!("{PUBLIC_KID_PREFIX}-{}", self.kid)
    }

    /// Public key as a JWK under the public key id
    #[must_use]
    pub fn to_jwk(&self) -> JsonWebKey {
        JsonWebKey {
            kty: "RSA".to_owned(),
            key_use: "sig".to_owned(),
            kid: self.public_kid(),
            alg: ALGORITHM.to_owned(),
            n: URL_SAFE_NO_PAD.encode(self.public_key.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(self.public_key.e().to_bytes_be()),
        }
    }

    /// Export the private key as PKCS#8 PEM
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidKeyMaterial`] if encoding fails
    pub fn export_private_key_pem(&self) -> OAuthResult<String> {
        self.private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(|e| OAuthError::key_material(format!("PEM export failed: {e}")))
    }

    /// Import a key pair from a PKCS#8 PEM
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidKeyMaterial`] if the PEM cannot be parsed
    pub fn import_private_key_pem(kid: &str, pem: &str) -> OAuthResult<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| OAuthError::key_material(format!("PEM import failed: {e}")))?;
        let public_key = RsaPublicKey::from(&private_key);

        Ok(Self {
            kid: kid.to_owned(),
            private_key,
            public_key,
            created_at: Utc::now(),
        })
    }

    /// The two store rows describing this pair
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidKeyMaterial`] if encoding fails
    pub fn to_entries(&self) -> OAuthResult<[JwkEntry; 2]> {
        let public_json = serde_json::to_string(&self.to_jwk())
            .map_err(|e| OAuthError::internal(format!("JWK serialization failed: {e}")))?;
        Ok([
            JwkEntry {
                sid: SID.to_owned(),
                kid: self.private_kid(),
                key_data: self.export_private_key_pem()?,
                created_at: self.created_at,
            },
            JwkEntry {
                sid: SID.to_owned(),
                kid: self.public_kid(),
                key_data: public_json,
                created_at: self.created_at,
            },
        ])
    }
}

/// Signs, verifies, and publishes with the stored key pair
#[derive(Clone)]
pub struct JwkKeyManager {
    store: Arc<dyn TokenStore>,
    issuer: String,
}

impl JwkKeyManager {
    /// Create a manager reading keys from `store`
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, issuer: impl Into<String>) -> Self {
        Self {
            store,
            issuer: issuer.into(),
        }
    }

    /// Issuer written into and required from every token
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    async fn entry(&self, prefix: &str) -> OAuthResult<Option<JwkEntry>> {
        Ok(self
            .store
            .list_jwks(SID)
            .await?
            .into_iter()
            .find(|entry| entry.kid.starts_with(prefix)))
    }

    async fn public_jwk(&self) -> OAuthResult<JsonWebKey> {
        let entry = self
            .entry(PUBLIC_KID_PREFIX)
            .await?
            .ok_or(OAuthError::JwkPublicKeyNotFound)?;
        let mut jwk: JsonWebKey = serde_json::from_str(&entry.key_data)
            .map_err(|e| OAuthError::key_material(format!("public JWK {}: {e}", entry.kid)))?;
        jwk.kid = entry.kid;
        Ok(jwk)
    }

    /// Sign a JWT mirroring `access_token` for `user`
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::JwkPrivateKeyNotFound`] or
    /// [`OAuthError::JwkPublicKeyNotFound`] when a row is missing and
    /// [`OAuthError::InvalidKeyMaterial`] when the private key is unusable
    pub async fn sign_access_token(
        &self,
        user: &User,
        expires_in: i64,
        scope: &str,
        access_token: &str,
    ) -> OAuthResult<String> {
        let private = self
            .entry(PRIVATE_KID_PREFIX)
            .await?
            .ok_or(OAuthError::JwkPrivateKeyNotFound)?;
        let public = self
            .entry(PUBLIC_KID_PREFIX)
            .await?
            .ok_or(OAuthError::JwkPublicKeyNotFound)?;

        let key = EncodingKey::from_rsa_pem(private.key_data.as_bytes())
            .map_err(|e| OAuthError::key_material(format!("private key {}: {e}", private.kid)))?;

        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user.id.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + Duration::seconds(expires_in)).timestamp(),
            jti: access_token.to_owned(),
            scope: scope.to_owned(),
            tenant_id: user.tenant_id.clone(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(public.kid);
        header.typ = Some("JWT".to_owned());

        encode(&header, &claims, &key)
            .map_err(|e| OAuthError::key_material(format!("JWT signing failed: {e}")))
    }

    /// Public key set for `/.well-known/jwks.json`
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::JwkPublicKeyNotFound`] when no public row exists
    /// and [`OAuthError::InvalidKeyMaterial`] when it cannot be parsed
    pub async fn public_jwk_set(&self) -> OAuthResult<JsonWebKeySet> {
        Ok(JsonWebKeySet {
            keys: vec![self.public_jwk().await?],
        })
    }

    /// Verify a JWT's signature, issuer, and expiry
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Jwt`] for malformed, badly signed, foreign, or
    /// expired tokens
    pub async fn verify(&self, token: &str) -> OAuthResult<AccessTokenClaims> {
        let jwk = self.public_jwk().await?;
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| OAuthError::key_material(format!("public JWK {}: {e}", jwk.kid)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_nbf = true;

        let data = decode::<AccessTokenClaims>(token, &key, &validation)?;
        debug!(jti_len = data.claims.jti.len(), "Verified access token JWT");
        Ok(data.claims)
    }

    /// Store `pair` unless a signing pair already exists
    ///
    /// Returns `false` when keys were already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be written
    pub async fn install(&self, pair: &RsaKeyPair) -> OAuthResult<bool> {
        if self.entry(PRIVATE_KID_PREFIX).await?.is_some() {
            return Ok(false);
        }
        for entry in pair.to_entries()? {
            self.store.create_jwk(&entry).await?;
        }
        info!(kid = %pair.public_kid(), "Installed JWT signing key pair");
        Ok(true)
    }

    /// Generate and store a signing pair unless one already exists
    ///
    /// # Errors
    ///
    /// Returns an error if generation or storage fails
    pub async fn provision(&self, key_size_bits: usize) -> OAuthResult<bool> {
        if self.entry(PRIVATE_KID_PREFIX).await?.is_some() {
            debug!("JWT signing key pair already provisioned");
            return Ok(false);
        }
        let kid = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let pair = tokio::task::spawn_blocking(move || {
            RsaKeyPair::generate_with_key_size(&kid, key_size_bits)
        })
        .await
        .map_err(|e| OAuthError::internal(format!("key generation task failed: {e}")))??;
        self.install(&pair).await
    }
}
