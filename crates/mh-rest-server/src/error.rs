// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Server error types and handling

use crate::bridge::BridgeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mh_api_contract::{ApiContractError, ProblemDetails};
use std::collections::HashMap;

/// Server result type
pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] mh_local_db::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ApiContractError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The remote Git-hosting service failed or could not be reached
    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServerError::Validation(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::Database(_) | ServerError::Remote(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Convert error to Problem+JSON response
    pub fn to_problem(&self) -> ProblemDetails {
        let (kind, title, detail, errors) = match self {
            ServerError::Database(err) => (
                "database",
                "Database Error",
                format!("Database operation failed: {err}"),
                HashMap::new(),
            ),
            ServerError::Auth(msg) => ("auth", "Authentication Failed", msg.clone(), HashMap::new()),
            ServerError::Validation(err) => (
                "validation",
                "Validation Error",
                "Request validation failed".to_string(),
                err.field_errors(),
            ),
            ServerError::NotFound(msg) => ("not-found", "Not Found", msg.clone(), HashMap::new()),
            ServerError::Conflict(msg) => ("conflict", "Conflict", msg.clone(), HashMap::new()),
            ServerError::BadRequest(msg) => {
                ("bad-request", "Bad Request", msg.clone(), HashMap::new())
            }
            ServerError::Remote(msg) => {
                ("remote", "Remote Service Error", msg.clone(), HashMap::new())
            }
            ServerError::Internal(msg) => {
                ("internal", "Internal Server Error", msg.clone(), HashMap::new())
            }
        };

        ProblemDetails {
            problem_type: format!("/problems/{kind}"),
            title: title.to_string(),
            status: Some(self.status().as_u16()),
            detail,
            errors,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(self.to_problem())).into_response()
    }
}

impl From<BridgeError> for ServerError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Validation(err) => ServerError::Validation(err),
            BridgeError::OwnerNotFound(id) => ServerError::NotFound(format!("User {id} not found")),
            BridgeError::NotFound(id) => {
                ServerError::NotFound(format!("Repository {id} not found"))
            }
            BridgeError::AlreadyExists { name, .. } => {
                ServerError::Conflict(format!("Repository '{name}' already exists"))
            }
            err @ (BridgeError::Remote { .. }
            | BridgeError::Timeout(_)
            | BridgeError::RemoteTransport(_)
            | BridgeError::Configuration(_)) => ServerError::Remote(err.to_string()),
            BridgeError::Store(err) => ServerError::Database(err),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}
