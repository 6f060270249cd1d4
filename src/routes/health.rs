// ABOUTME: Health check route reporting process liveness and cache reachability
// ABOUTME: A failing cache degrades the report but never the status code
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::cache::CacheProvider;
use crate::oauth2_server::OAuthService;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use tokenward_core::constants::oauth::routes;
use tracing::warn;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes<C: CacheProvider + 'static>(service: Arc<OAuthService<C>>) -> Router {
        Router::new()
            .route(routes::HEALTH, get(health_handler::<C>))
            .with_state(service)
    }
}

async fn health_handler<C: CacheProvider + 'static>(
    State(service): State<Arc<OAuthService<C>>>,
) -> Json<serde_json::Value> {
    let cache_ok = match service.issuer().cache().health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Cache health check failed");
            false
        }
    };

    Json(serde_json::json!({
        "status": if cache_ok { "healthy" } else { "degraded" },
        "cache": if cache_ok { "ok" } else { "unavailable" },
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
