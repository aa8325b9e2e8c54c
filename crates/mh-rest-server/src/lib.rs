// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! MiniHub REST API server
//!
//! A thin backend over a Gitea server. Repositories are created and deleted
//! on Gitea while a local SQLite record keeps the owner, visibility and clone
//! URLs of each one. The [`bridge`] module keeps the two sides consistent;
//! the rest of the crate is HTTP plumbing around it.

pub mod auth;
pub mod bridge;
pub mod config;
pub mod dependencies;
pub mod error;
pub mod handlers;
pub mod mock_dependencies;
pub mod models;
pub mod server;
pub mod state;

pub use bridge::{BridgeError, DeleteOutcome, RepositoryBridge};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::Server;
