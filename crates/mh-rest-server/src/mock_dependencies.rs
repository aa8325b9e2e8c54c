// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Dependency wiring for the mock server and tests
//!
//! [`MockRemoteClient`] stands in for the Gitea API. It keeps created
//! repositories in memory, counts every call and can be told to fail.

use crate::{
    config::ServerConfig,
    models::{InMemoryMetadataStore, MetadataStore},
    state::AppState,
};
use anyhow::Result;
use async_trait::async_trait;
use mh_gitea_client::{GiteaError, GiteaResult, RemoteOwner, RemoteRepo, RemoteRepositoryClient};
use mh_local_db::NewUser;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the mock answers the next calls of one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteBehavior {
    #[default]
    Succeed,
    /// Create answers 409, delete reports "not deleted"
    Conflict,
    /// Answer with HTTP 500
    ServerError,
    Timeout,
    /// Create succeeds remotely but the answer cannot be read
    UnreadableBody,
}

#[derive(Default)]
struct MockRemoteState {
    repositories: BTreeMap<(String, String), RemoteRepo>,
    next_id: i64,
    create_behavior: RemoteBehavior,
    delete_behavior: RemoteBehavior,
}

/// Counting in-memory replacement for the remote Git-hosting service
pub struct MockRemoteClient {
    default_owner: String,
    state: Mutex<MockRemoteState>,
    create_calls: AtomicUsize,
    list_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MockRemoteClient {
    pub fn new(default_owner: impl Into<String>) -> Self {
        Self {
            default_owner: default_owner.into(),
            state: Mutex::new(MockRemoteState::default()),
            create_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_create_behavior(&self, behavior: RemoteBehavior) {
        self.lock().create_behavior = behavior;
    }

    pub fn set_delete_behavior(&self, behavior: RemoteBehavior) {
        self.lock().delete_behavior = behavior;
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Whether the mock currently holds `owner/name`
    pub fn contains(&self, owner: &str, name: &str) -> bool {
        self.lock().repositories.contains_key(&(owner.to_string(), name.to_string()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockRemoteState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn failure(behavior: RemoteBehavior, name: &str) -> Option<GiteaError> {
        match behavior {
            RemoteBehavior::Succeed => None,
            RemoteBehavior::Conflict => Some(GiteaError::AlreadyExists(name.to_string())),
            RemoteBehavior::ServerError => Some(GiteaError::Remote {
                status: 500,
                body: "mock failure".to_string(),
            }),
            RemoteBehavior::Timeout => Some(GiteaError::Timeout(Duration::from_secs(30))),
            RemoteBehavior::UnreadableBody => None,
        }
    }
}

#[async_trait]
impl RemoteRepositoryClient for MockRemoteClient {
    async fn create_repository(
        &self,
        name: &str,
        description: Option<&str>,
        is_private: bool,
        owner: Option<&str>,
    ) -> GiteaResult<RemoteRepo> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let owner = owner.unwrap_or(&self.default_owner).to_string();
        let mut state = self.lock();

        if let Some(err) = Self::failure(state.create_behavior, name) {
            return Err(err);
        }
        let key = (owner.clone(), name.to_string());
        if state.repositories.contains_key(&key) {
            return Err(GiteaError::AlreadyExists(name.to_string()));
        }

        state.next_id += 1;
        let repo = RemoteRepo {
            id: state.next_id,
            name: name.to_string(),
            full_name: Some(format!("{owner}/{name}")),
            owner: RemoteOwner {
                id: Some(1),
                login: owner.clone(),
            },
            description: description.map(str::to_string),
            private: is_private,
            clone_url: format!("http://gitea.mock/{owner}/{name}.git"),
            ssh_url: format!("git@gitea.mock:{owner}/{name}.git"),
            html_url: Some(format!("http://gitea.mock/{owner}/{name}")),
        };
        state.repositories.insert(key, repo.clone());
        if state.create_behavior == RemoteBehavior::UnreadableBody {
            return Err(GiteaError::UnreadableCreateResponse {
                owner,
                name: name.to_string(),
                reason: "missing ssh_url".to_string(),
            });
        }
        Ok(repo)
    }

    async fn list_repositories(&self, owner: Option<&str>) -> GiteaResult<Vec<RemoteRepo>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let owner = owner.unwrap_or(&self.default_owner);
        Ok(self
            .lock()
            .repositories
            .values()
            .filter(|r| r.owner.login == owner)
            .cloned()
            .collect())
    }

    async fn delete_repository(&self, owner: &str, name: &str) -> GiteaResult<bool> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        match state.delete_behavior {
            RemoteBehavior::Succeed => Ok(state
                .repositories
                .remove(&(owner.to_string(), name.to_string()))
                .is_some()),
            RemoteBehavior::Conflict
            | RemoteBehavior::ServerError
            | RemoteBehavior::UnreadableBody => Ok(false),
            RemoteBehavior::Timeout => Err(GiteaError::Timeout(Duration::from_secs(30))),
        }
    }

    fn default_owner(&self) -> &str {
        &self.default_owner
    }
}

/// Dependency wiring for the mock REST server
pub struct MockServerDependencies {
    state: AppState,
    remote: Arc<MockRemoteClient>,
    store: Arc<InMemoryMetadataStore>,
}

impl MockServerDependencies {
    /// In-memory store seeded with the configured user (or `admin`), and a
    /// mock remote owned by the same name
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let seed = config.seed_user.clone().unwrap_or_else(|| crate::config::SeedUser {
            username: "admin".to_string(),
            email: "admin@minihub.local".to_string(),
        });

        let store = Arc::new(InMemoryMetadataStore::new());
        let owner = store
            .ensure_user(NewUser {
                username: seed.username.clone(),
                email: seed.email.clone(),
                full_name: None,
            })
            .await?;
        tracing::info!(user_id = owner.id, username = %owner.username, "seeded mock user");

        let remote = Arc::new(MockRemoteClient::new(seed.username));
        let store_trait: Arc<dyn MetadataStore> = store.clone();
        let remote_trait: Arc<dyn RemoteRepositoryClient> = remote.clone();
        let state = AppState::new(config, store_trait, remote_trait);

        Ok(Self {
            state,
            remote,
            store,
        })
    }

    /// Handle to the mock remote for assertions
    pub fn remote(&self) -> Arc<MockRemoteClient> {
        Arc::clone(&self.remote)
    }

    pub fn store(&self) -> Arc<InMemoryMetadataStore> {
        Arc::clone(&self.store)
    }

    pub fn into_state(self) -> AppState {
        self.state
    }
}
