// ABOUTME: Persistence models for the authorization server
// ABOUTME: Re-exports clients, users, tokens, authorization codes, and JWK rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Data Models
//!
//! Rows persisted by the token store. Token rows are keyed by their opaque
//! value; clients and users by UUID. Timestamps are UTC and persisted as Unix
//! seconds, so values read back from a store carry whole-second precision.

mod client;
mod jwk;
mod token;
mod user;

pub use client::Client;
pub use jwk::JwkEntry;
pub use token::{AccessToken, AuthorizationCode, RefreshToken};
pub use user::{PasswordScheme, User};
