// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Service information and health endpoints

use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
    pub version: String,
    pub docs: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ConnectivityResponse {
    pub message: String,
    pub database: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
    pub database: String,
    pub gitea: String,
}

#[utoipa::path(get, path = "/", responses((status = 200, body = WelcomeResponse)))]
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to MiniHub API!".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/openapi.json".to_string(),
    })
}

/// Smoke test used by the frontend
#[utoipa::path(get, path = "/api/test", responses((status = 200, body = ConnectivityResponse)))]
pub async fn api_test(State(state): State<AppState>) -> Json<ConnectivityResponse> {
    Json(ConnectivityResponse {
        message: "Backend is working!".to_string(),
        database: database_status(&state).await,
    })
}

/// Health check endpoint.
///
/// Always answers 200; `status` is `degraded` when the database does not
/// respond.
#[utoipa::path(get, path = "/api/health", responses((status = 200, body = HealthResponse)))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = database_status(&state).await;
    let status = if database == "connected" { "ok" } else { "degraded" };
    Json(HealthResponse {
        status: status.to_string(),
        environment: state.config.environment.clone(),
        database,
        gitea: format!("configured for {}", state.remote.default_owner()),
    })
}

async fn database_status(state: &AppState) -> String {
    match state.store.ping().await {
        Ok(()) => "connected".to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "database health probe failed");
            "unavailable".to_string()
        }
    }
}
