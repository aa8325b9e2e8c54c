// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use crate::error::{GiteaError, GiteaResult};
use std::time::Duration;
use url::Url;

/// Per-request timeout applied to every remote call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Gitea server
#[derive(Clone)]
pub struct GiteaConfig {
    pub base_url: String,
    pub api_token: String,
    /// Account repositories are created under when no owner is given
    pub default_owner: String,
    pub timeout: Duration,
}

impl GiteaConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        default_owner: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            default_owner: default_owner.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from optional values, as they arrive from flags or the environment
    pub fn from_parts(
        base_url: Option<String>,
        api_token: Option<String>,
        default_owner: Option<String>,
    ) -> GiteaResult<Self> {
        let config = Self::new(
            base_url.unwrap_or_default(),
            api_token.unwrap_or_default(),
            default_owner.unwrap_or_default(),
        );
        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is present and return the parsed base URL
    pub fn validate(&self) -> GiteaResult<Url> {
        let mut missing = Vec::new();
        if self.base_url.trim().is_empty() {
            missing.push("GITEA_URL");
        }
        if self.api_token.trim().is_empty() {
            missing.push("GITEA_API_TOKEN");
        }
        if self.default_owner.trim().is_empty() {
            missing.push("GITEA_ADMIN_USERNAME");
        }
        if !missing.is_empty() {
            return Err(GiteaError::Configuration(format!(
                "Gitea configuration incomplete, missing {}",
                missing.join(", ")
            )));
        }

        let url = Url::parse(self.base_url.trim()).map_err(|e| {
            GiteaError::Configuration(format!("invalid Gitea URL '{}': {e}", self.base_url))
        })?;
        if url.cannot_be_a_base() {
            return Err(GiteaError::Configuration(format!(
                "Gitea URL '{}' cannot be used as a base",
                self.base_url
            )));
        }
        Ok(url)
    }
}

impl std::fmt::Debug for GiteaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .field("default_owner", &self.default_owner)
            .field("timeout", &self.timeout)
            .finish()
    }
}
