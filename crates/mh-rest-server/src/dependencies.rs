// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Dependency wiring for the REST server

use crate::{
    config::{SeedUser, ServerConfig},
    models::{DatabaseMetadataStore, MetadataStore},
    state::AppState,
};
use anyhow::{Context, Result};
use mh_gitea_client::{GiteaClient, RemoteRepositoryClient};
use mh_local_db::{Database, NewUser};
use std::sync::Arc;

/// Production dependencies: SQLite store and the Gitea client
pub struct DefaultServerDependencies {
    state: AppState,
}

impl DefaultServerDependencies {
    /// Open the database, build the Gitea client and apply the seed user.
    ///
    /// Fails when the Gitea settings are incomplete.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let gitea_config = config
            .gitea
            .to_client_config()
            .context("cannot start without Gitea settings")?;
        let remote: Arc<dyn RemoteRepositoryClient> = Arc::new(GiteaClient::new(gitea_config)?);

        let db = if config.database_path == ":memory:" {
            Database::open_in_memory()?
        } else {
            Database::open(&config.database_path)
                .with_context(|| format!("failed to open database {}", config.database_path))?
        };
        let store: Arc<dyn MetadataStore> = Arc::new(DatabaseMetadataStore::new(db));

        if let Some(seed) = &config.seed_user {
            seed_user(store.as_ref(), seed).await?;
        }

        tracing::info!(
            database = %config.database_path,
            gitea_owner = remote.default_owner(),
            "server dependencies ready"
        );

        Ok(Self {
            state: AppState::new(config, store, remote),
        })
    }

    /// Consume the dependency builder and return the resulting app state
    pub fn into_state(self) -> AppState {
        self.state
    }
}

/// Ensure the operator-provided user exists
pub async fn seed_user(store: &dyn MetadataStore, seed: &SeedUser) -> Result<i64> {
    let user = store
        .ensure_user(NewUser {
            username: seed.username.clone(),
            email: seed.email.clone(),
            full_name: None,
        })
        .await
        .with_context(|| format!("failed to seed user {}", seed.username))?;
    tracing::info!(user_id = user.id, username = %user.username, "seed user available");
    Ok(user.id)
}
