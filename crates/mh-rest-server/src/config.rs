// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Server configuration

use mh_gitea_client::{GiteaConfig, GiteaResult};
use std::net::SocketAddr;

/// Default origin of the web frontend allowed by CORS
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,

    /// Path to the SQLite database, or `:memory:`
    pub database_path: String,

    /// Origin allowed to call the API from a browser
    pub cors_origin: String,

    /// HS256 secret for bearer tokens. Without it the `X-Acting-User`
    /// header from the fronting proxy is trusted.
    pub jwt_secret: Option<String>,

    /// Reported by the health endpoint
    pub environment: String,

    pub gitea: GiteaSettings,

    /// User ensured to exist at start-up
    pub seed_user: Option<SeedUser>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_path: ":memory:".to_string(),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            jwt_secret: None,
            environment: "development".to_string(),
            gitea: GiteaSettings::default(),
            seed_user: None,
        }
    }
}

/// Raw Gitea settings as collected from flags and environment
#[derive(Clone, Default)]
pub struct GiteaSettings {
    pub url: Option<String>,
    pub token: Option<String>,
    pub admin_username: Option<String>,
}

impl GiteaSettings {
    /// Fails when any of the three settings is absent
    pub fn to_client_config(&self) -> GiteaResult<GiteaConfig> {
        GiteaConfig::from_parts(
            self.url.clone(),
            self.token.clone(),
            self.admin_username.clone(),
        )
    }
}

impl std::fmt::Debug for GiteaSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaSettings")
            .field("url", &self.url)
            .field("token", &self.token.as_deref().map(mh_logging::redact))
            .field("admin_username", &self.admin_username)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
}
