// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! API contract types for the MiniHub repository service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default page size for repository listings
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Upper bound accepted for `limit` on repository listings
pub const MAX_LIST_LIMIT: u32 = 1000;

/// Request body for creating a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct CreateRepositoryRequest {
    #[validate(
        length(min = 1, max = 100),
        custom(function = "crate::validation::validate_repository_name")
    )]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

/// A tracked repository as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct RepositoryResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub owner_id: i64,
    pub remote_id: Option<i64>,
    pub remote_owner: Option<String>,
    pub clone_url: Option<String>,
    pub ssh_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Offset pagination for repository listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema, utoipa::IntoParams))]
#[cfg_attr(feature = "utoipa", into_params(parameter_in = Query))]
pub struct ListRepositoriesQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = MAX_LIST_LIMIT))]
    pub limit: u32,
}

impl Default for ListRepositoriesQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

/// Response for `GET /api/repos/count`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct RepositoryCountResponse {
    pub total: u64,
}

/// Result of deleting a repository.
///
/// `remote_cleanup_succeeded` is `false` whenever the remote repository
/// could not be confirmed deleted, including records that never had a
/// remote counterpart. The local record is gone in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct DeleteRepositoryResponse {
    pub id: i64,
    pub remote_cleanup_succeeded: bool,
}

/// Repository as reported by the remote Git-hosting service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct RemoteRepositorySummary {
    pub id: i64,
    pub name: String,
    pub owner: String,
    pub private: bool,
    pub clone_url: String,
    pub ssh_url: String,
}
