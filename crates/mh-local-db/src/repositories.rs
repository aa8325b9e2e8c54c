// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Repository rows

use crate::models::{NewRepository, RepositoryRecord};
use crate::{Error, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};

const REPOSITORY_COLUMNS: &str = "id, name, description, is_private, owner_id, remote_id, \
     remote_owner, clone_url, ssh_url, created_at, updated_at";

pub struct RepositoryStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> RepositoryStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Insert a row, assigning id and timestamps.
    ///
    /// A second row for the same `(owner_id, name)` fails with
    /// [`Error::Conflict`]; an unknown owner with [`Error::MissingReference`].
    pub fn insert(&self, repo: &NewRepository) -> Result<RepositoryRecord> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO repositories (
                    name, description, is_private, owner_id,
                    remote_id, remote_owner, clone_url, ssh_url,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    repo.name,
                    repo.description,
                    repo.is_private,
                    repo.owner_id,
                    repo.remote_id,
                    repo.remote_owner,
                    repo.clone_url,
                    repo.ssh_url,
                    now,
                ],
            )
            .map_err(|e| {
                Error::from_write(e, || {
                    format!("repository '{}' for owner {}", repo.name, repo.owner_id)
                })
            })?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, name = %repo.name, owner_id = repo.owner_id, "inserted repository row");
        Ok(repo.clone().into_record(id, now))
    }

    pub fn get(&self, id: i64) -> Result<Option<RepositoryRecord>> {
        let sql = format!("SELECT {REPOSITORY_COLUMNS} FROM repositories WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], repository_from_row).optional()?)
    }

    pub fn find_by_owner_and_name(
        &self,
        owner_id: i64,
        name: &str,
    ) -> Result<Option<RepositoryRecord>> {
        let sql = format!(
            "SELECT {REPOSITORY_COLUMNS} FROM repositories WHERE owner_id = ?1 AND name = ?2"
        );
        Ok(self
            .conn
            .query_row(&sql, params![owner_id, name], repository_from_row)
            .optional()?)
    }

    /// Page through all repositories in id (insertion) order
    pub fn list(&self, skip: u32, limit: u32) -> Result<Vec<RepositoryRecord>> {
        let sql = format!(
            "SELECT {REPOSITORY_COLUMNS} FROM repositories ORDER BY id LIMIT ?1 OFFSET ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![i64::from(limit), i64::from(skip)], repository_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count(&self) -> Result<u64> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM repositories", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Permanently remove a row. Returns whether a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let removed = self.conn.execute("DELETE FROM repositories WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}

fn repository_from_row(row: &Row<'_>) -> rusqlite::Result<RepositoryRecord> {
    Ok(RepositoryRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        is_private: row.get("is_private")?,
        owner_id: row.get("owner_id")?,
        remote_id: row.get("remote_id")?,
        remote_owner: row.get("remote_owner")?,
        clone_url: row.get("clone_url")?,
        ssh_url: row.get("ssh_url")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
