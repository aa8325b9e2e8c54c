// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Server state management

use crate::auth::AuthConfig;
use crate::bridge::RepositoryBridge;
use crate::config::ServerConfig;
use crate::models::MetadataStore;
use mh_gitea_client::RemoteRepositoryClient;
use std::sync::Arc;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,

    /// Repository and user metadata
    pub store: Arc<dyn MetadataStore>,

    /// Remote Git-hosting service
    pub remote: Arc<dyn RemoteRepositoryClient>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn MetadataStore>,
        remote: Arc<dyn RemoteRepositoryClient>,
    ) -> Self {
        Self {
            config,
            store,
            remote,
        }
    }

    /// Bridge over this state's store and remote client
    pub fn bridge(&self) -> RepositoryBridge {
        RepositoryBridge::new(Arc::clone(&self.store), Arc::clone(&self.remote))
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.config.jwt_secret.clone(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
