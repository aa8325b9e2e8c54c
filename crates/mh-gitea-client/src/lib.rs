// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Client for the repository endpoints of a Gitea server
//!
//! MiniHub never touches Git data itself. Repositories are created, listed
//! and deleted on the remote service through its admin-token HTTP API, and
//! this crate is the only place that knows the shape of that API.
//!
//! The [`RemoteRepositoryClient`] trait is the seam the server depends on;
//! [`GiteaClient`] is the production implementation.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::GiteaClient;
pub use config::{GiteaConfig, DEFAULT_REQUEST_TIMEOUT};
pub use error::{GiteaError, GiteaResult};
pub use types::{CreateRepoOption, RemoteOwner, RemoteRepo};

use async_trait::async_trait;

/// Operations MiniHub needs from the remote Git-hosting service.
///
/// Each call issues exactly one outbound request. There are no retries.
#[async_trait]
pub trait RemoteRepositoryClient: Send + Sync {
    /// Create a repository under `owner`, or the default owner when `None`
    async fn create_repository(
        &self,
        name: &str,
        description: Option<&str>,
        is_private: bool,
        owner: Option<&str>,
    ) -> GiteaResult<RemoteRepo>;

    async fn list_repositories(&self, owner: Option<&str>) -> GiteaResult<Vec<RemoteRepo>>;

    /// Returns `true` only when the service confirmed the deletion
    async fn delete_repository(&self, owner: &str, name: &str) -> GiteaResult<bool>;

    fn default_owner(&self) -> &str;
}

#[async_trait]
impl RemoteRepositoryClient for GiteaClient {
    async fn create_repository(
        &self,
        name: &str,
        description: Option<&str>,
        is_private: bool,
        owner: Option<&str>,
    ) -> GiteaResult<RemoteRepo> {
        GiteaClient::create_repository(self, name, description, is_private, owner).await
    }

    async fn list_repositories(&self, owner: Option<&str>) -> GiteaResult<Vec<RemoteRepo>> {
        GiteaClient::list_repositories(self, owner).await
    }

    async fn delete_repository(&self, owner: &str, name: &str) -> GiteaResult<bool> {
        GiteaClient::delete_repository(self, owner, name).await
    }

    fn default_owner(&self) -> &str {
        self.config().default_owner.as_str()
    }
}
