// ABOUTME: HTTP integration tests for the health check route
// ABOUTME: Checks healthy and degraded reports without authentication
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use anyhow::Result;
use common::{fixture, fixture_with, memory_store, test_oauth_config, FailingCache};
use helpers::axum_test::AxumTestRequest;
use std::sync::Arc;
use tokenward::routes::HealthRoutes;

#[tokio::test]
async fn test_health_endpoint_success() -> Result<()> {
    let fx = fixture().await?;
    let routes = HealthRoutes::routes(Arc::new(fx.service));

    let response = AxumTestRequest::get("/health").send(routes).await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cache"], "ok");
    assert!(body["timestamp"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_health_endpoint_reports_degraded_cache() -> Result<()> {
    let fx = fixture_with(test_oauth_config(), memory_store(), FailingCache).await?;
    let routes = HealthRoutes::routes(Arc::new(fx.service));

    let response = AxumTestRequest::get("/health").send(routes).await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["cache"], "unavailable");

    Ok(())
}
