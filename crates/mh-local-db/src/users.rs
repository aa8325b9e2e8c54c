// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! User rows

use crate::models::{NewUser, UserRecord};
use crate::{Error, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};

const USER_COLUMNS: &str = "id, username, email, full_name, is_active, created_at";

pub struct UserStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> UserStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, user: &NewUser) -> Result<UserRecord> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO users (username, email, full_name, is_active, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                params![user.username, user.email, user.full_name, now],
            )
            .map_err(|e| Error::from_write(e, || format!("user '{}'", user.username)))?;

        Ok(UserRecord {
            id: self.conn.last_insert_rowid(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            is_active: true,
            created_at: now,
        })
    }

    pub fn get(&self, id: i64) -> Result<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], user_from_row).optional()?)
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
        Ok(self.conn.query_row(&sql, [username], user_from_row).optional()?)
    }

    /// Return the user with this username, creating it first if needed
    pub fn ensure(&self, user: &NewUser) -> Result<UserRecord> {
        if let Some(existing) = self.find_by_username(&user.username)? {
            return Ok(existing);
        }
        self.insert(user)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        full_name: row.get("full_name")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn alice() -> NewUser {
        NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            full_name: Some("Alice Example".into()),
        }
    }

    #[test]
    fn insert_and_get_user() {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            let users = UserStore::new(conn);
            let created = users.insert(&alice())?;
            assert_eq!(users.get(created.id)?, Some(created.clone()));
            assert!(users.get(created.id + 1)?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn duplicate_username_is_conflict() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .with_connection(|conn| {
                let users = UserStore::new(conn);
                users.insert(&alice())?;
                users.insert(&alice())
            })
            .unwrap_err();
        assert!(err.is_conflict(), "unexpected error: {err}");
    }

    #[test]
    fn ensure_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            let users = UserStore::new(conn);
            let first = users.ensure(&alice())?;
            let second = users.ensure(&alice())?;
            assert_eq!(first.id, second.id);
            Ok(())
        })
        .unwrap();
    }
}
