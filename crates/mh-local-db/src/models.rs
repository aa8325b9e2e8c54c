// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Record types stored in the metadata database

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner of tracked repositories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

/// One tracked repository.
///
/// The `remote_*`, `clone_url` and `ssh_url` fields link the row to its
/// counterpart on the Git-hosting service. Nothing re-checks that the remote
/// repository still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub owner_id: i64,
    pub remote_id: Option<i64>,
    pub remote_owner: Option<String>,
    pub clone_url: Option<String>,
    pub ssh_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepositoryRecord {
    /// Owner/name pair to address the remote repository, when linked
    pub fn remote_coordinates(&self) -> Option<(&str, &str)> {
        match self.remote_owner.as_deref() {
            Some(owner) if !owner.is_empty() && !self.name.is_empty() => {
                Some((owner, self.name.as_str()))
            }
            _ => None,
        }
    }
}

/// Values for a repository row about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepository {
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub owner_id: i64,
    pub remote_id: Option<i64>,
    pub remote_owner: Option<String>,
    pub clone_url: Option<String>,
    pub ssh_url: Option<String>,
}

impl NewRepository {
    /// Materialise the record the store will hold after insertion
    pub fn into_record(self, id: i64, now: DateTime<Utc>) -> RepositoryRecord {
        RepositoryRecord {
            id,
            name: self.name,
            description: self.description,
            is_private: self.is_private,
            owner_id: self.owner_id,
            remote_id: self.remote_id,
            remote_owner: self.remote_owner,
            clone_url: self.clone_url,
            ssh_url: self.ssh_url,
            created_at: now,
            updated_at: now,
        }
    }
}
