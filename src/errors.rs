// ABOUTME: Error types re-exported from tokenward-core for use across the server crate
// ABOUTME: Keeps `crate::errors::*` paths stable while the definitions live in the core crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Unified Error Handling System
//!
//! Definitions live in [`tokenward_core::errors`]; this module re-exports them.

pub use tokenward_core::errors::{
    AppError, AppResult, DatabaseError, ErrorCategory, ErrorCode, ErrorResponse, OAuthError,
    OAuthErrorResponse, OAuthResult,
};
