// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Metadata store interface and its implementations

use async_trait::async_trait;
use chrono::Utc;
use mh_api_contract::RepositoryResponse;
use mh_local_db::{
    Database, Error as StoreError, NewRepository, NewUser, RepositoryRecord, RepositoryStore,
    Result as StoreResult, UserRecord, UserStore,
};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Persistence used by the repository bridge.
///
/// Implementations must reject a second repository with the same
/// `(owner_id, name)` with [`StoreError::Conflict`].
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn find_owner(&self, user_id: i64) -> StoreResult<Option<UserRecord>>;
    async fn find_by_owner_and_name(
        &self,
        owner_id: i64,
        name: &str,
    ) -> StoreResult<Option<RepositoryRecord>>;
    async fn insert(&self, repo: NewRepository) -> StoreResult<RepositoryRecord>;
    /// Ordered by id ascending
    async fn list_all(&self, skip: u32, limit: u32) -> StoreResult<Vec<RepositoryRecord>>;
    async fn count(&self) -> StoreResult<u64>;
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<RepositoryRecord>>;
    async fn delete(&self, id: i64) -> StoreResult<bool>;
    /// Return the user with this username, creating it if needed
    async fn ensure_user(&self, user: NewUser) -> StoreResult<UserRecord>;
    async fn ping(&self) -> StoreResult<()>;
}

/// SQLite-backed store
pub struct DatabaseMetadataStore {
    db: Database,
}

impl DatabaseMetadataStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for DatabaseMetadataStore {
    async fn find_owner(&self, user_id: i64) -> StoreResult<Option<UserRecord>> {
        self.db.with_connection(|conn| UserStore::new(conn).get(user_id))
    }

    async fn find_by_owner_and_name(
        &self,
        owner_id: i64,
        name: &str,
    ) -> StoreResult<Option<RepositoryRecord>> {
        self.db
            .with_connection(|conn| RepositoryStore::new(conn).find_by_owner_and_name(owner_id, name))
    }

    async fn insert(&self, repo: NewRepository) -> StoreResult<RepositoryRecord> {
        self.db.with_connection(|conn| RepositoryStore::new(conn).insert(&repo))
    }

    async fn list_all(&self, skip: u32, limit: u32) -> StoreResult<Vec<RepositoryRecord>> {
        self.db.with_connection(|conn| RepositoryStore::new(conn).list(skip, limit))
    }

    async fn count(&self) -> StoreResult<u64> {
        self.db.with_connection(|conn| RepositoryStore::new(conn).count())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<RepositoryRecord>> {
        self.db.with_connection(|conn| RepositoryStore::new(conn).get(id))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.db.with_connection(|conn| RepositoryStore::new(conn).delete(id))
    }

    async fn ensure_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        self.db.with_connection(|conn| UserStore::new(conn).ensure(&user))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db.ping()
    }
}

#[derive(Default)]
struct InMemoryTables {
    users: BTreeMap<i64, UserRecord>,
    repositories: BTreeMap<i64, RepositoryRecord>,
    next_user_id: i64,
    next_repository_id: i64,
}

/// In-memory store for development and testing
#[derive(Default)]
pub struct InMemoryMetadataStore {
    tables: RwLock<InMemoryTables>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn find_owner(&self, user_id: i64) -> StoreResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_by_owner_and_name(
        &self,
        owner_id: i64,
        name: &str,
    ) -> StoreResult<Option<RepositoryRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .repositories
            .values()
            .find(|r| r.owner_id == owner_id && r.name == name)
            .cloned())
    }

    async fn insert(&self, repo: NewRepository) -> StoreResult<RepositoryRecord> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&repo.owner_id) {
            return Err(StoreError::MissingReference(format!("user {}", repo.owner_id)));
        }
        if tables
            .repositories
            .values()
            .any(|r| r.owner_id == repo.owner_id && r.name == repo.name)
        {
            return Err(StoreError::Conflict(format!(
                "repository '{}' for owner {}",
                repo.name, repo.owner_id
            )));
        }

        tables.next_repository_id += 1;
        let record = repo.into_record(tables.next_repository_id, Utc::now());
        tables.repositories.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_all(&self, skip: u32, limit: u32) -> StoreResult<Vec<RepositoryRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .repositories
            .values()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.tables.read().await.repositories.len() as u64)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<RepositoryRecord>> {
        Ok(self.tables.read().await.repositories.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.repositories.remove(&id).is_some())
    }

    async fn ensure_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.users.values().find(|u| u.username == user.username) {
            return Ok(existing.clone());
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email '{}'", user.email)));
        }

        tables.next_user_id += 1;
        let record = UserRecord {
            id: tables.next_user_id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Wire representation of a stored repository
pub fn repository_response(record: RepositoryRecord) -> RepositoryResponse {
    RepositoryResponse {
        id: record.id,
        name: record.name,
        description: record.description,
        is_private: record.is_private,
        owner_id: record.owner_id,
        remote_id: record.remote_id,
        remote_owner: record.remote_owner,
        clone_url: record.clone_url,
        ssh_url: record.ssh_url,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}
