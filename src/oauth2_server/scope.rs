// ABOUTME: Scope validation against the configured allow-list and default scope
// ABOUTME: Resolves requested scopes for new grants and narrows scopes on refresh
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::config::OAuthConfig;
use crate::errors::{OAuthError, OAuthResult};
use std::collections::HashSet;

/// Validates requested scope strings
#[derive(Debug, Clone)]
pub struct ScopeValidator {
    allowed: HashSet<String>,
    default_scope: String,
}

impl ScopeValidator {
    /// Build a validator from an allow-list and a default scope
    #[must_use]
    pub fn new<I, S>(allowed: I, default_scope: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            default_scope: default_scope.into(),
        }
    }

    /// Build a validator from the issuance configuration
    #[must_use]
    pub fn from_config(config: &OAuthConfig) -> Self {
        Self::new(config.allowed_scopes.iter().cloned(), config.default_scope.clone())
    }

    /// Scope granted when a request names none
    #[must_use]
    pub fn default_scope(&self) -> &str {
        &self.default_scope
    }

    /// Resolve the scope of a new grant
    ///
    /// Absent or blank input yields the default scope.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidScope`] naming the first token outside
    /// the allow-list
    pub fn resolve(&self, requested: Option<&str>) -> OAuthResult<String> {
        match self.validated(requested)? {
            Some(tokens) => Ok(tokens.join(" ")),
            None => Ok(self.default_scope.clone()),
        }
    }

    /// Resolve the scope of a refresh grant against the previously granted one
    ///
    /// Absent or blank input keeps `granted` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidScope`] for tokens outside the allow-list
    /// and [`OAuthError::RequestedScopeCannotBeGreater`] when a token was not
    /// part of `granted`
    pub fn narrow(&self, requested: Option<&str>, granted: &str) -> OAuthResult<String> {
        let Some(tokens) = self.validated(requested)? else {
            return Ok(granted.to_owned());
        };

        let granted: HashSet<&str> = granted.split_whitespace().collect();
        if tokens.iter().all(|token| granted.contains(token)) {
            Ok(tokens.join(" "))
        } else {
            Err(OAuthError::RequestedScopeCannotBeGreater)
        }
    }

    fn validated<'a>(&self, requested: Option<&'a str>) -> OAuthResult<Option<Vec<&'a str>>> {
        let tokens: Vec<&str> = requested.unwrap_or_default().split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(None);
        }
        if let Some(unknown) = tokens.iter().find(|t| !self.allowed.contains(**t)) {
            return Err(OAuthError::InvalidScope {
                scope: (*unknown).to_owned(),
            });
        }
        Ok(Some(tokens))
    }
}
