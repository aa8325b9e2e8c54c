// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! MiniHub server wired to an in-memory store and a mock Gitea, for frontend work

use clap::Parser;
use mh_logging::CliLoggingArgs;
use mh_rest_server::config::{SeedUser, DEFAULT_CORS_ORIGIN};
use mh_rest_server::{mock_dependencies::MockServerDependencies, Server, ServerConfig};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(author, version, about = "MiniHub REST server (mock backend)")]
struct Args {
    /// Bind address for the server
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Browser origin allowed by CORS
    #[arg(long, default_value = DEFAULT_CORS_ORIGIN)]
    cors_origin: String,

    /// Username of the pre-created user (id 1)
    #[arg(long, default_value = "admin")]
    user: String,

    #[command(flatten)]
    logging: CliLoggingArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.logging.clone().init("minihub-mock-server")?;

    tracing::info!("Starting MiniHub REST API mock server");

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_origin: args.cors_origin,
        environment: "mock".to_string(),
        seed_user: Some(SeedUser {
            email: format!("{}@minihub.local", args.user),
            username: args.user,
        }),
        ..Default::default()
    };

    let deps = MockServerDependencies::new(config.clone()).await?;
    let server = Server::with_state(config, deps.into_state())?;
    server.run().await?;

    Ok(())
}
