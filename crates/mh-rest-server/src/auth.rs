// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Caller identity resolution
//!
//! The server does not authenticate users itself. With a JWT secret
//! configured it accepts HS256 bearer tokens whose `sub` claim is the user
//! id. Without one it trusts the `X-Acting-User` header set by the fronting
//! auth proxy. Handlers that act on behalf of a user take a
//! [`CallerIdentity`], which rejects the request with 401 when no identity
//! was resolved.

use crate::error::ServerError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Header carrying the user id when no JWT secret is configured
pub const ACTING_USER_HEADER: &str = "x-acting-user";

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
}

impl AuthConfig {
    /// Validate an HS256 token
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, ServerError> {
        let secret = self
            .jwt_secret
            .as_ref()
            .ok_or_else(|| ServerError::Auth("JWT authentication not configured".to_string()))?;

        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| ServerError::Auth("Invalid JWT token".to_string()))?;
        Ok(token_data.claims)
    }

    /// Resolve the caller from request headers. `Ok(None)` means anonymous.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<Option<CallerIdentity>, ServerError> {
        if self.jwt_secret.is_some() {
            let Some(value) = headers.get(header::AUTHORIZATION) else {
                return Ok(None);
            };
            let token = value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or_else(|| {
                    ServerError::Auth("Missing or invalid authorization header".to_string())
                })?;
            let claims = self.validate_jwt(token.trim())?;
            let user_id = parse_user_id(&claims.sub)?;
            return Ok(Some(CallerIdentity {
                user_id,
                source: IdentitySource::Token,
            }));
        }

        match headers.get(ACTING_USER_HEADER) {
            None => Ok(None),
            Some(value) => {
                let raw = value
                    .to_str()
                    .map_err(|_| ServerError::Auth("Invalid X-Acting-User header".to_string()))?;
                Ok(Some(CallerIdentity {
                    user_id: parse_user_id(raw)?,
                    source: IdentitySource::ProxyHeader,
                }))
            }
        }
    }
}

fn parse_user_id(raw: &str) -> Result<i64, ServerError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ServerError::Auth(format!("Invalid user id '{raw}'")))
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Token,
    ProxyHeader,
}

/// The user a request acts on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: i64,
    pub source: IdentitySource,
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| ServerError::Auth("Caller identity required".to_string()))
    }
}

/// Paths served without identity resolution
fn is_public_path(path: &str) -> bool {
    matches!(path, "/" | "/api/health" | "/api/test" | "/openapi.json")
}

/// Attach the resolved [`CallerIdentity`] to the request
pub async fn auth_middleware(auth_config: AuthConfig, mut req: Request, next: Next) -> Response {
    if is_public_path(req.uri().path()) {
        return next.run(req).await;
    }

    match auth_config.resolve(req.headers()) {
        Ok(Some(identity)) => {
            tracing::debug!(user_id = identity.user_id, source = ?identity.source, "resolved caller");
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Ok(None) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}
