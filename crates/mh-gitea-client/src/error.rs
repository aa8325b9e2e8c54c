// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::time::Duration;
use thiserror::Error;

pub type GiteaResult<T> = Result<T, GiteaError>;

#[derive(Debug, Error)]
pub enum GiteaError {
    /// Settings are missing or unusable; raised only while constructing the client
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The service answered 409 to a create request
    #[error("Repository '{0}' already exists")]
    AlreadyExists(String),

    /// The service answered 201 but the body could not be read, so the
    /// repository exists remotely without usable linkage
    #[error("Repository '{owner}/{name}' was created but the response was unusable: {reason}")]
    UnreadableCreateResponse {
        owner: String,
        name: String,
        reason: String,
    },

    #[error("Gitea API error: {status} - {body}")]
    Remote { status: u16, body: String },

    #[error("Gitea request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Json(#[from] serde_json::Error),
}

impl GiteaError {
    /// The failure was the caller's fault rather than the service's
    pub fn is_client_error(&self) -> bool {
        matches!(self, GiteaError::AlreadyExists(_))
    }
}
