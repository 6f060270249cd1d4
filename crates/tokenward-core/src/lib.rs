// ABOUTME: Core types and constants for the Tokenward OAuth2 authorization server
// ABOUTME: Foundation crate with error handling, persistence models, and protocol constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Tokenward Core
//!
//! Foundation crate providing shared types and constants for the Tokenward
//! authorization server. This crate changes infrequently, which keeps
//! incremental compilation of the server crate cheap.
//!
//! ## Modules
//!
//! - **errors**: `AppError`/`ErrorCode` for infrastructure, `OAuthError` for the
//!   token protocol, and `DatabaseError` for the relational store
//! - **models**: persisted clients, users, tokens, authorization codes and JWK rows
//! - **constants**: grant types, token hints, JWK tags, and lifetime defaults

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Protocol constants and configuration defaults organized by domain
pub mod constants;

/// Persistence models for the authorization server
pub mod models;
