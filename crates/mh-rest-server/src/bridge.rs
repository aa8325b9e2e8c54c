// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Keeps local repository records and remote repositories in step
//!
//! Create is all-or-nothing as seen by the caller: a local row is written
//! only after the remote repository exists. A remote repository whose
//! local row cannot be written, or whose creation response cannot be read,
//! is deleted again. Delete removes the local row
//! once it is found; the remote deletion is attempted first and its outcome
//! is reported but never fails the call.
//!
//! No lock spans the remote call and the local insert. Two concurrent
//! creates of the same name can both pass the local check; the store's
//! `(owner_id, name)` constraint then rejects the second insert and the
//! bridge removes the remote repository it created.

use crate::models::MetadataStore;
use mh_api_contract::{validation, ApiContractError, CreateRepositoryRequest};
use mh_gitea_client::{GiteaError, RemoteRepo, RemoteRepositoryClient};
use mh_local_db::{NewRepository, RepositoryRecord};
use std::sync::Arc;
use std::time::Duration;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Which check detected a duplicate repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictSource {
    /// Found in the local store before contacting the remote service
    Local,
    /// Rejected by the remote service
    Remote,
    /// Rejected by the store's unique constraint after the remote create
    Store,
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Validation error: {0}")]
    Validation(#[from] ApiContractError),

    #[error("User {0} not found")]
    OwnerNotFound(i64),

    #[error("Repository '{name}' already exists")]
    AlreadyExists { name: String, origin: ConflictSource },

    #[error("Gitea API error: {status} - {body}")]
    Remote { status: u16, body: String },

    #[error("Remote service timed out after {0:?}")]
    Timeout(Duration),

    #[error("Remote service unreachable: {0}")]
    RemoteTransport(String),

    #[error("Remote service misconfigured: {0}")]
    Configuration(String),

    #[error("Repository {0} not found")]
    NotFound(i64),

    #[error("Store error: {0}")]
    Store(#[from] mh_local_db::Error),
}

impl From<GiteaError> for BridgeError {
    fn from(err: GiteaError) -> Self {
        match err {
            GiteaError::AlreadyExists(name) => BridgeError::AlreadyExists {
                name,
                origin: ConflictSource::Remote,
            },
            GiteaError::Remote { status, body } => BridgeError::Remote { status, body },
            GiteaError::Timeout(after) => BridgeError::Timeout(after),
            GiteaError::Http(e) => BridgeError::RemoteTransport(e.to_string()),
            GiteaError::Json(e) => {
                BridgeError::RemoteTransport(format!("unexpected response body: {e}"))
            }
            GiteaError::Configuration(msg) => BridgeError::Configuration(msg),
            err @ GiteaError::UnreadableCreateResponse { .. } => {
                BridgeError::RemoteTransport(err.to_string())
            }
        }
    }
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub id: i64,
    /// `false` when the remote deletion failed, was not confirmed, or the
    /// record had no remote linkage
    pub remote_cleanup_succeeded: bool,
}

/// Repository bridge over a metadata store and a remote client
pub struct RepositoryBridge {
    store: Arc<dyn MetadataStore>,
    remote: Arc<dyn RemoteRepositoryClient>,
}

impl RepositoryBridge {
    pub fn new(store: Arc<dyn MetadataStore>, remote: Arc<dyn RemoteRepositoryClient>) -> Self {
        Self { store, remote }
    }

    /// Create a repository remotely, then record it locally for `acting_user_id`
    pub async fn create(
        &self,
        request: &CreateRepositoryRequest,
        acting_user_id: i64,
    ) -> BridgeResult<RepositoryRecord> {
        validation::validate_create_repository_request(request)?;
        let name = request.name.as_str();

        let owner = self
            .store
            .find_owner(acting_user_id)
            .await?
            .ok_or(BridgeError::OwnerNotFound(acting_user_id))?;

        if self.store.find_by_owner_and_name(owner.id, name).await?.is_some() {
            return Err(BridgeError::AlreadyExists {
                name: name.to_string(),
                origin: ConflictSource::Local,
            });
        }

        let remote = match self
            .remote
            .create_repository(name, request.description.as_deref(), request.is_private, None)
            .await
        {
            Ok(remote) => remote,
            Err(err) => {
                tracing::warn!(name, owner_id = owner.id, error = %err, "remote repository creation failed");
                if let GiteaError::UnreadableCreateResponse {
                    owner: remote_owner,
                    name: remote_name,
                    ..
                } = &err
                {
                    self.compensate(remote_owner, remote_name).await;
                }
                return Err(err.into());
            }
        };

        let new_repo = linked_repository(request, owner.id, &remote);
        match self.store.insert(new_repo).await {
            Ok(record) => {
                tracing::info!(
                    id = record.id,
                    name,
                    owner_id = owner.id,
                    remote_id = remote.id,
                    "repository created"
                );
                Ok(record)
            }
            Err(err) => {
                tracing::warn!(name, owner_id = owner.id, error = %err, "local insert failed after remote create");
                self.compensate(&remote.owner.login, &remote.name).await;
                if err.is_conflict() {
                    Err(BridgeError::AlreadyExists {
                        name: name.to_string(),
                        origin: ConflictSource::Store,
                    })
                } else {
                    Err(BridgeError::Store(err))
                }
            }
        }
    }

    /// Delete the local record, attempting the remote deletion first
    pub async fn delete(&self, id: i64, acting_user_id: i64) -> BridgeResult<DeleteOutcome> {
        let record = self.store.find_by_id(id).await?.ok_or(BridgeError::NotFound(id))?;

        let remote_cleanup_succeeded = match record.remote_coordinates() {
            Some((owner, name)) => match self.remote.delete_repository(owner, name).await {
                Ok(true) => true,
                Ok(false) => {
                    tracing::warn!(id, owner, name, "remote service did not confirm deletion");
                    false
                }
                Err(err) => {
                    tracing::warn!(id, owner, name, error = %err, "failed to delete remote repository");
                    false
                }
            },
            None => false,
        };

        self.store.delete(id).await?;
        tracing::info!(id, acting_user_id, remote_cleanup_succeeded, "repository deleted");

        Ok(DeleteOutcome {
            id,
            remote_cleanup_succeeded,
        })
    }

    pub async fn list(&self, skip: u32, limit: u32) -> BridgeResult<Vec<RepositoryRecord>> {
        Ok(self.store.list_all(skip, limit).await?)
    }

    pub async fn get(&self, id: i64) -> BridgeResult<RepositoryRecord> {
        self.store.find_by_id(id).await?.ok_or(BridgeError::NotFound(id))
    }

    pub async fn count(&self) -> BridgeResult<u64> {
        Ok(self.store.count().await?)
    }

    /// Repositories the remote service holds for the default owner
    pub async fn list_remote(&self) -> BridgeResult<Vec<RemoteRepo>> {
        Ok(self.remote.list_repositories(None).await?)
    }

    /// Best-effort removal of a remote repository whose local row was not written
    async fn compensate(&self, owner: &str, name: &str) {
        match self.remote.delete_repository(owner, name).await {
            Ok(true) => tracing::info!(owner, name, "removed orphaned remote repository"),
            Ok(false) => tracing::warn!(
                owner,
                name,
                "orphaned remote repository was not confirmed deleted"
            ),
            Err(err) => tracing::warn!(
                owner,
                name,
                error = %err,
                "failed to remove orphaned remote repository"
            ),
        }
    }
}

fn linked_repository(
    request: &CreateRepositoryRequest,
    owner_id: i64,
    remote: &RemoteRepo,
) -> NewRepository {
    NewRepository {
        name: request.name.clone(),
        description: request.description.clone(),
        is_private: request.is_private,
        owner_id,
        remote_id: Some(remote.id),
        remote_owner: Some(remote.owner.login.clone()),
        clone_url: Some(remote.clone_url.clone()),
        ssh_url: Some(remote.ssh_url.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_dependencies::{MockRemoteClient, RemoteBehavior};
    use crate::models::InMemoryMetadataStore;
    use mh_local_db::NewUser;
    use tracing_test::traced_test;

    async fn bridge_with(remote: Arc<MockRemoteClient>) -> (RepositoryBridge, i64) {
        let store = Arc::new(InMemoryMetadataStore::new());
        let owner = store
            .ensure_user(NewUser {
                username: "admin".into(),
                email: "admin@example.com".into(),
                full_name: None,
            })
            .await
            .unwrap();
        (RepositoryBridge::new(store, remote), owner.id)
    }

    fn request(name: &str) -> CreateRepositoryRequest {
        CreateRepositoryRequest {
            name: name.to_string(),
            description: Some("demo repository".into()),
            is_private: false,
        }
    }

    #[tokio::test]
    async fn create_links_remote_fields() {
        let remote = Arc::new(MockRemoteClient::new("admin"));
        let (bridge, owner_id) = bridge_with(remote.clone()).await;

        let record = bridge.create(&request("demo"), owner_id).await.unwrap();
        assert_eq!(record.owner_id, owner_id);
        assert!(record.remote_id.is_some());
        assert_eq!(record.remote_owner.as_deref(), Some("admin"));
        assert!(record.clone_url.is_some());
        assert!(record.ssh_url.is_some());
        assert_eq!(remote.create_calls(), 1);
    }

    #[tokio::test]
    async fn unknown_owner_never_reaches_remote() {
        let remote = Arc::new(MockRemoteClient::new("admin"));
        let (bridge, owner_id) = bridge_with(remote.clone()).await;

        let err = bridge.create(&request("demo"), owner_id + 100).await.unwrap_err();
        assert!(matches!(err, BridgeError::OwnerNotFound(_)));
        assert_eq!(remote.create_calls(), 0);
    }

    #[tokio::test]
    async fn invalid_name_is_rejected_first() {
        let remote = Arc::new(MockRemoteClient::new("admin"));
        let (bridge, owner_id) = bridge_with(remote.clone()).await;

        let err = bridge.create(&request("bad name!"), owner_id).await.unwrap_err();
        assert!(matches!(err, BridgeError::Validation(_)));
        assert_eq!(remote.create_calls(), 0);
    }

    #[tokio::test]
    async fn remote_failure_leaves_no_local_record() {
        let remote = Arc::new(MockRemoteClient::new("admin"));
        remote.set_create_behavior(RemoteBehavior::ServerError);
        let (bridge, owner_id) = bridge_with(remote.clone()).await;

        let err = bridge.create(&request("demo"), owner_id).await.unwrap_err();
        assert!(matches!(err, BridgeError::Remote { status: 500, .. }));
        assert_eq!(bridge.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unreadable_create_response_removes_remote_repository() {
        let remote = Arc::new(MockRemoteClient::new("admin"));
        remote.set_create_behavior(RemoteBehavior::UnreadableBody);
        let (bridge, owner_id) = bridge_with(remote.clone()).await;

        let err = bridge.create(&request("demo"), owner_id).await.unwrap_err();
        assert!(matches!(err, BridgeError::RemoteTransport(_)), "{err:?}");
        assert_eq!(remote.delete_calls(), 1);
        assert!(!remote.contains("admin", "demo"));
        assert_eq!(bridge.count().await.unwrap(), 0);

        remote.set_create_behavior(RemoteBehavior::Succeed);
        bridge.create(&request("demo"), owner_id).await.unwrap();
        assert_eq!(bridge.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn remote_conflict_is_already_exists() {
        let remote = Arc::new(MockRemoteClient::new("admin"));
        remote.set_create_behavior(RemoteBehavior::Conflict);
        let (bridge, owner_id) = bridge_with(remote).await;

        let err = bridge.create(&request("demo"), owner_id).await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::AlreadyExists {
                origin: ConflictSource::Remote,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn delete_without_linkage_skips_remote() {
        let remote = Arc::new(MockRemoteClient::new("admin"));
        let store = Arc::new(InMemoryMetadataStore::new());
        let owner = store
            .ensure_user(NewUser {
                username: "admin".into(),
                email: "admin@example.com".into(),
                full_name: None,
            })
            .await
            .unwrap();
        let record = store
            .insert(NewRepository {
                name: "local-only".into(),
                description: None,
                is_private: false,
                owner_id: owner.id,
                remote_id: None,
                remote_owner: None,
                clone_url: None,
                ssh_url: None,
            })
            .await
            .unwrap();
        let bridge = RepositoryBridge::new(store, remote.clone());

        let outcome = bridge.delete(record.id, owner.id).await.unwrap();
        assert!(!outcome.remote_cleanup_succeeded);
        assert_eq!(remote.delete_calls(), 0);
        assert!(matches!(bridge.get(record.id).await, Err(BridgeError::NotFound(_))));
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_remote_delete_is_logged_and_swallowed() {
        let remote = Arc::new(MockRemoteClient::new("admin"));
        let (bridge, owner_id) = bridge_with(remote.clone()).await;
        let record = bridge.create(&request("demo"), owner_id).await.unwrap();

        remote.set_delete_behavior(RemoteBehavior::Timeout);
        let outcome = bridge.delete(record.id, owner_id).await.unwrap();

        assert_eq!(outcome.id, record.id);
        assert!(!outcome.remote_cleanup_succeeded);
        assert_eq!(bridge.count().await.unwrap(), 0);
        assert!(logs_contain("failed to delete remote repository"));
    }
}
