// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Main server implementation

use crate::auth::{auth_middleware, ACTING_USER_HEADER};
use crate::config::ServerConfig;
use crate::dependencies::DefaultServerDependencies;
use crate::error::{ServerError, ServerResult};
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

/// REST API server
pub struct Server {
    config: ServerConfig,
    app: Router,
}

impl Server {
    /// Create a server with the production dependencies
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let state = DefaultServerDependencies::new(config.clone()).await?.into_state();
        Self::with_state(config, state)
    }

    /// Construct a server from an already-built app state
    pub fn with_state(config: ServerConfig, state: AppState) -> ServerResult<Self> {
        let app = Self::build_app(state, &config)?;
        Ok(Self { config, app })
    }

    /// Router with all routes and middleware, for in-process requests
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Build the Axum application with routes and middleware
    fn build_app(state: AppState, config: &ServerConfig) -> ServerResult<Router> {
        let origin = HeaderValue::from_str(&config.cors_origin).map_err(|_| {
            ServerError::Internal(format!("invalid CORS origin '{}'", config.cors_origin))
        })?;

        let auth_config = state.auth_config();
        let middleware_stack = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(
                CorsLayer::new()
                    .allow_origin(origin)
                    .allow_methods([Method::GET, Method::POST, Method::DELETE])
                    .allow_headers([
                        header::AUTHORIZATION,
                        header::CONTENT_TYPE,
                        HeaderName::from_static(ACTING_USER_HEADER),
                    ])
                    .allow_credentials(true),
            )
            .layer(from_fn(move |req, next| auth_middleware(auth_config.clone(), req, next)));

        let router = Router::new()
            .route("/", get(handlers::health::root))
            .route("/api/test", get(handlers::health::api_test))
            .route("/api/health", get(handlers::health::health_check))
            .route(
                "/api/repos",
                post(handlers::repositories::create_repository)
                    .get(handlers::repositories::list_repositories),
            )
            .route(
                "/api/repos/",
                post(handlers::repositories::create_repository)
                    .get(handlers::repositories::list_repositories),
            )
            .route("/api/repos/count", get(handlers::repositories::count_repositories))
            .route(
                "/api/repos/:id",
                get(handlers::repositories::get_repository)
                    .delete(handlers::repositories::delete_repository),
            )
            .route(
                "/api/remote/repos",
                get(handlers::repositories::list_remote_repositories),
            )
            .route("/openapi.json", get(handlers::openapi::openapi_spec))
            .with_state(state)
            .layer(middleware_stack);

        Ok(router)
    }

    /// Run the server
    pub async fn run(self) -> ServerResult<()> {
        let addr = self.config.bind_addr;
        info!("Starting MiniHub server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.app)
            .await
            .map_err(|err| ServerError::Internal(format!("REST server error: {err}")))?;
        Ok(())
    }

    /// Get the bind address
    pub fn addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
