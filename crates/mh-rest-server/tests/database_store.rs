// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Bridge behaviour over the SQLite store, including the duplicate-create race

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use mh_api_contract::CreateRepositoryRequest;
use mh_gitea_client::{GiteaClient, GiteaConfig};
use mh_local_db::{
    Database, NewRepository, NewUser, RepositoryRecord, Result as StoreResult, UserRecord,
};
use mh_rest_server::bridge::{BridgeError, ConflictSource, RepositoryBridge};
use mh_rest_server::mock_dependencies::MockRemoteClient;
use mh_rest_server::models::{DatabaseMetadataStore, MetadataStore};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Store whose duplicate pre-check always misses, as when a concurrent
/// request inserts between the check and the insert
struct RacingStore {
    inner: DatabaseMetadataStore,
}

#[async_trait]
impl MetadataStore for RacingStore {
    async fn find_owner(&self, user_id: i64) -> StoreResult<Option<UserRecord>> {
        self.inner.find_owner(user_id).await
    }

    async fn find_by_owner_and_name(
        &self,
        _owner_id: i64,
        _name: &str,
    ) -> StoreResult<Option<RepositoryRecord>> {
        Ok(None)
    }

    async fn insert(&self, repo: NewRepository) -> StoreResult<RepositoryRecord> {
        self.inner.insert(repo).await
    }

    async fn list_all(&self, skip: u32, limit: u32) -> StoreResult<Vec<RepositoryRecord>> {
        self.inner.list_all(skip, limit).await
    }

    async fn count(&self) -> StoreResult<u64> {
        self.inner.count().await
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<RepositoryRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.inner.delete(id).await
    }

    async fn ensure_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        self.inner.ensure_user(user).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }
}

fn admin() -> NewUser {
    NewUser {
        username: "admin".into(),
        email: "admin@example.com".into(),
        full_name: Some("Administrator".into()),
    }
}

fn request(name: &str) -> CreateRepositoryRequest {
    CreateRepositoryRequest {
        name: name.to_string(),
        description: None,
        is_private: true,
    }
}

#[tokio::test]
async fn created_repository_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("minihub.db");
    let remote = Arc::new(MockRemoteClient::new("admin"));

    let id = {
        let store = Arc::new(DatabaseMetadataStore::new(Database::open(&path).unwrap()));
        let owner = store.ensure_user(admin()).await.unwrap();
        let bridge = RepositoryBridge::new(store, remote.clone());
        bridge.create(&request("persisted"), owner.id).await.unwrap().id
    };

    let store = Arc::new(DatabaseMetadataStore::new(Database::open(&path).unwrap()));
    let bridge = RepositoryBridge::new(store, remote);
    let record = bridge.get(id).await.unwrap();
    assert_eq!(record.name, "persisted");
    assert!(record.is_private);
    assert_eq!(record.remote_owner.as_deref(), Some("admin"));
}

#[tokio::test]
async fn insert_conflict_after_remote_create_is_compensated() {
    let store = Arc::new(RacingStore {
        inner: DatabaseMetadataStore::new(Database::open_in_memory().unwrap()),
    });
    let owner = store.ensure_user(admin()).await.unwrap();
    let remote = Arc::new(MockRemoteClient::new("admin"));

    // Another request already recorded the name locally, without a remote
    // repository under this mock.
    store
        .insert(NewRepository {
            name: "demo".into(),
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

    let bridge = RepositoryBridge::new(store.clone(), remote.clone());
    let err = bridge.create(&request("demo"), owner.id).await.unwrap_err();

    assert!(
        matches!(
            err,
            BridgeError::AlreadyExists {
                origin: ConflictSource::Store,
                ..
            }
        ),
        "unexpected error: {err:?}"
    );
    assert_eq!(remote.create_calls(), 1);
    assert_eq!(remote.delete_calls(), 1);
    assert!(!remote.contains("admin", "demo"));
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_creates_leave_one_record_and_one_remote() {
    let store = Arc::new(RacingStore {
        inner: DatabaseMetadataStore::new(Database::open_in_memory().unwrap()),
    });
    let owner_id = store.ensure_user(admin()).await.unwrap().id;
    let remote = Arc::new(MockRemoteClient::new("admin"));
    let bridge = Arc::new(RepositoryBridge::new(store.clone(), remote.clone()));

    let first = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move { bridge.create(&request("race"), owner_id).await })
    };
    let second = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move { bridge.create(&request("race"), owner_id).await })
    };
    let results = [first.await.unwrap(), second.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(BridgeError::AlreadyExists { .. }))));
    assert_eq!(store.count().await.unwrap(), 1);
    assert!(remote.contains("admin", "race"));
}

/// Gitea stand-in that creates repositories but answers with an `ssh_url`
/// of `null`, and counts deletions
async fn spawn_gitea_with_null_ssh_url() -> (String, Arc<AtomicUsize>) {
    async fn create(Path(owner): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let name = body["name"].as_str().unwrap_or_default().to_string();
        (
            StatusCode::CREATED,
            Json(json!({
                "id": 5,
                "name": name,
                "owner": { "id": 1, "login": owner },
                "private": false,
                "clone_url": format!("http://gitea.test/{owner}/{name}.git"),
                "ssh_url": null,
            })),
        )
    }

    async fn remove(
        State(deletes): State<Arc<AtomicUsize>>,
        Path((_owner, _name)): Path<(String, String)>,
    ) -> StatusCode {
        deletes.fetch_add(1, Ordering::SeqCst);
        StatusCode::NO_CONTENT
    }

    let deletes = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/v1/admin/users/:owner/repos", post(create))
        .route("/api/v1/repos/:owner/:name", delete(remove))
        .with_state(Arc::clone(&deletes));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), deletes)
}

#[tokio::test]
async fn unreadable_create_response_is_compensated_over_http() {
    let (base, deletes) = spawn_gitea_with_null_ssh_url().await;
    let remote = Arc::new(GiteaClient::new(GiteaConfig::new(base, "token", "admin")).unwrap());
    let store = Arc::new(DatabaseMetadataStore::new(Database::open_in_memory().unwrap()));
    let owner = store.ensure_user(admin()).await.unwrap();
    let bridge = RepositoryBridge::new(store.clone(), remote);

    let err = bridge.create(&request("demo"), owner.id).await.unwrap_err();

    assert!(matches!(err, BridgeError::RemoteTransport(_)), "unexpected error: {err:?}");
    assert_eq!(store.count().await.unwrap(), 0);
    assert_eq!(deletes.load(Ordering::SeqCst), 1);
}
