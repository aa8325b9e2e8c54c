// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! MiniHub REST API server binary

use clap::Parser;
use mh_logging::CliLoggingArgs;
use mh_rest_server::config::{GiteaSettings, SeedUser, DEFAULT_CORS_ORIGIN};
use mh_rest_server::{Server, ServerConfig};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(author, version, about = "MiniHub repository API server", long_about = None)]
struct Args {
    /// Bind address for the server
    #[arg(short, long, env = "MINIHUB_BIND", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Database path (SQLite), or `:memory:`
    #[arg(short, long, env = "MINIHUB_DATABASE")]
    database: String,

    /// Base URL of the Gitea server
    #[arg(long, env = "GITEA_URL")]
    gitea_url: Option<String>,

    /// Gitea admin API token
    #[arg(long, env = "GITEA_API_TOKEN", hide_env_values = true)]
    gitea_token: Option<String>,

    /// Gitea account new repositories are created under
    #[arg(long, env = "GITEA_ADMIN_USERNAME")]
    gitea_admin: Option<String>,

    /// Browser origin allowed by CORS
    #[arg(long, default_value = DEFAULT_CORS_ORIGIN)]
    cors_origin: String,

    /// Verify HS256 bearer tokens with this secret instead of trusting X-Acting-User
    #[arg(long, env = "MINIHUB_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Environment name reported by the health endpoint
    #[arg(long, env = "MINIHUB_ENV", default_value = "development")]
    environment: String,

    /// Ensure a user with this username exists at start-up
    #[arg(long, requires = "seed_email")]
    seed_user: Option<String>,

    /// Email for --seed-user
    #[arg(long, requires = "seed_user")]
    seed_email: Option<String>,

    #[command(flatten)]
    logging: CliLoggingArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.logging.clone().init("minihub-server")?;

    tracing::info!("Starting MiniHub REST API server");

    let seed_user = match (args.seed_user, args.seed_email) {
        (Some(username), Some(email)) => Some(SeedUser { username, email }),
        _ => None,
    };

    let config = ServerConfig {
        bind_addr: args.bind,
        database_path: args.database,
        cors_origin: args.cors_origin,
        jwt_secret: args.jwt_secret,
        environment: args.environment,
        gitea: GiteaSettings {
            url: args.gitea_url,
            token: args.gitea_token,
            admin_username: args.gitea_admin,
        },
        seed_user,
    };
    tracing::debug!(
        bind = %config.bind_addr,
        database = %config.database_path,
        gitea = ?config.gitea,
        jwt = config.jwt_secret.is_some(),
        "resolved configuration"
    );

    let server = Server::new(config).await?;
    server.run().await?;

    Ok(())
}
