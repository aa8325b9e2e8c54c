// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! OpenAPI document endpoint

use crate::handlers::{health, repositories};
use axum::Json;
use mh_api_contract::{
    CreateRepositoryRequest, DeleteRepositoryResponse, ProblemDetails, RemoteRepositorySummary,
    RepositoryCountResponse, RepositoryResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "MiniHub API"),
    paths(
        health::root,
        health::api_test,
        health::health_check,
        repositories::create_repository,
        repositories::list_repositories,
        repositories::count_repositories,
        repositories::get_repository,
        repositories::delete_repository,
        repositories::list_remote_repositories,
    ),
    components(schemas(
        CreateRepositoryRequest,
        RepositoryResponse,
        RepositoryCountResponse,
        DeleteRepositoryResponse,
        RemoteRepositorySummary,
        ProblemDetails,
        health::WelcomeResponse,
        health::ConnectivityResponse,
        health::HealthResponse,
    )),
    tags((name = "repositories", description = "Repository metadata bridged to Gitea"))
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
