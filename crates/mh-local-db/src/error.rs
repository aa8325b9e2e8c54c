// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Database error type

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A UNIQUE constraint rejected the write
    #[error("Conflicting record: {0}")]
    Conflict(String),

    /// A FOREIGN KEY constraint rejected the write
    #[error("Missing referenced record: {0}")]
    MissingReference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Classify constraint failures; everything else stays a plain SQLite error.
    pub(crate) fn from_write(err: rusqlite::Error, what: impl FnOnce() -> String) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &err {
            match failure.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => return Error::Conflict(what()),
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return Error::MissingReference(what())
                }
                _ => {}
            }
        }
        Error::Sqlite(err)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}
