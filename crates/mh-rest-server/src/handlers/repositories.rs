// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Repository endpoints

use crate::auth::CallerIdentity;
use crate::error::{ServerError, ServerResult};
use crate::models::repository_response;
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use mh_api_contract::{
    validation, CreateRepositoryRequest, DeleteRepositoryResponse, ListRepositoriesQuery,
    RemoteRepositorySummary, RepositoryCountResponse, RepositoryResponse,
};

/// Create a repository on the remote service and record it locally
#[utoipa::path(
    post,
    path = "/api/repos",
    request_body = CreateRepositoryRequest,
    responses(
        (status = 201, description = "Repository created", body = RepositoryResponse),
        (status = 400, description = "Invalid request", body = mh_api_contract::ProblemDetails),
        (status = 401, description = "Caller identity required", body = mh_api_contract::ProblemDetails),
        (status = 404, description = "Owner not found", body = mh_api_contract::ProblemDetails),
        (status = 409, description = "Repository already exists", body = mh_api_contract::ProblemDetails),
        (status = 500, description = "Remote service or database failure", body = mh_api_contract::ProblemDetails)
    )
)]
pub async fn create_repository(
    State(state): State<AppState>,
    caller: CallerIdentity,
    payload: Result<Json<CreateRepositoryRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<RepositoryResponse>)> {
    let Json(request) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let record = state.bridge().create(&request, caller.user_id).await?;
    Ok((StatusCode::CREATED, Json(repository_response(record))))
}

/// List tracked repositories in creation order
#[utoipa::path(
    get,
    path = "/api/repos",
    params(ListRepositoriesQuery),
    responses(
        (status = 200, description = "Page of repositories", body = [RepositoryResponse]),
        (status = 400, description = "Invalid paging parameters", body = mh_api_contract::ProblemDetails)
    )
)]
pub async fn list_repositories(
    State(state): State<AppState>,
    query: Result<Query<ListRepositoriesQuery>, QueryRejection>,
) -> ServerResult<Json<Vec<RepositoryResponse>>> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    validation::validate_list_query(&query)?;

    let records = state.bridge().list(query.skip, query.limit).await?;
    Ok(Json(records.into_iter().map(repository_response).collect()))
}

/// Number of tracked repositories
#[utoipa::path(
    get,
    path = "/api/repos/count",
    responses(
        (status = 200, description = "Repository count", body = RepositoryCountResponse)
    )
)]
pub async fn count_repositories(
    State(state): State<AppState>,
) -> ServerResult<Json<RepositoryCountResponse>> {
    let total = state.bridge().count().await?;
    Ok(Json(RepositoryCountResponse { total }))
}

/// Fetch one repository
#[utoipa::path(
    get,
    path = "/api/repos/{id}",
    params(("id" = i64, Path, description = "Repository id")),
    responses(
        (status = 200, description = "Repository", body = RepositoryResponse),
        (status = 404, description = "Repository not found", body = mh_api_contract::ProblemDetails)
    )
)]
pub async fn get_repository(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ServerResult<Json<RepositoryResponse>> {
    let Path(id) = id.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let record = state.bridge().get(id).await?;
    Ok(Json(repository_response(record)))
}

/// Delete a repository locally, attempting remote deletion first
#[utoipa::path(
    delete,
    path = "/api/repos/{id}",
    params(("id" = i64, Path, description = "Repository id")),
    responses(
        (status = 200, description = "Repository deleted", body = DeleteRepositoryResponse),
        (status = 401, description = "Caller identity required", body = mh_api_contract::ProblemDetails),
        (status = 404, description = "Repository not found", body = mh_api_contract::ProblemDetails)
    )
)]
pub async fn delete_repository(
    State(state): State<AppState>,
    caller: CallerIdentity,
    id: Result<Path<i64>, PathRejection>,
) -> ServerResult<Json<DeleteRepositoryResponse>> {
    let Path(id) = id.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let outcome = state.bridge().delete(id, caller.user_id).await?;
    Ok(Json(DeleteRepositoryResponse {
        id: outcome.id,
        remote_cleanup_succeeded: outcome.remote_cleanup_succeeded,
    }))
}

/// Repositories held by the remote service for the default owner
#[utoipa::path(
    get,
    path = "/api/remote/repos",
    responses(
        (status = 200, description = "Remote repositories", body = [RemoteRepositorySummary]),
        (status = 500, description = "Remote service failure", body = mh_api_contract::ProblemDetails)
    )
)]
pub async fn list_remote_repositories(
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<RemoteRepositorySummary>>> {
    let repos = state.bridge().list_remote().await?;
    Ok(Json(
        repos
            .into_iter()
            .map(|repo| RemoteRepositorySummary {
                id: repo.id,
                name: repo.name,
                owner: repo.owner.login,
                private: repo.private,
                clone_url: repo.clone_url,
                ssh_url: repo.ssh_url,
            })
            .collect(),
    ))
}
