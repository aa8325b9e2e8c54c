// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP implementation of the Gitea repository calls

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::config::GiteaConfig;
use crate::error::{GiteaError, GiteaResult};
use crate::types::{CreateRepoOption, RemoteRepo};

/// Gitea API client authenticated with an admin token
#[derive(Debug, Clone)]
pub struct GiteaClient {
    http_client: HttpClient,
    base_url: Url,
    config: GiteaConfig,
}

impl GiteaClient {
    /// Validate the configuration and build the underlying HTTP client
    pub fn new(config: GiteaConfig) -> GiteaResult<Self> {
        let base_url = config.validate()?;

        let mut token = HeaderValue::from_str(&format!("token {}", config.api_token.trim()))
            .map_err(|_| {
                GiteaError::Configuration("API token contains invalid header characters".into())
            })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = HttpClient::builder()
            .user_agent(concat!("minihub/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GiteaError::Configuration(format!("failed to build HTTP client: {e}")))?;

        tracing::debug!(base_url = %base_url, owner = %config.default_owner, "configured Gitea client");

        Ok(Self {
            http_client,
            base_url,
            config,
        })
    }

    pub fn config(&self) -> &GiteaConfig {
        &self.config
    }

    /// `POST /api/v1/admin/users/{owner}/repos`
    pub async fn create_repository(
        &self,
        name: &str,
        description: Option<&str>,
        is_private: bool,
        owner: Option<&str>,
    ) -> GiteaResult<RemoteRepo> {
        let owner = self.owner_or_default(owner);
        let url = self.endpoint(&["api", "v1", "admin", "users", owner, "repos"])?;
        let body = CreateRepoOption::new(name, description, is_private);

        let response = self.send(Method::POST, url, Some(&body)).await?;
        match response.status() {
            StatusCode::CREATED => match self.read_json::<RemoteRepo>(response).await {
                Ok(repo) => {
                    tracing::info!(remote_id = repo.id, owner, name, "created remote repository");
                    Ok(repo)
                }
                Err(err) => {
                    tracing::warn!(owner, name, error = %err, "unreadable body for created repository");
                    Err(GiteaError::UnreadableCreateResponse {
                        owner: owner.to_string(),
                        name: name.to_string(),
                        reason: err.to_string(),
                    })
                }
            },
            StatusCode::CONFLICT => Err(GiteaError::AlreadyExists(name.to_string())),
            _ => Err(self.remote_error(response).await),
        }
    }

    /// `GET /api/v1/users/{owner}/repos`
    pub async fn list_repositories(&self, owner: Option<&str>) -> GiteaResult<Vec<RemoteRepo>> {
        let owner = self.owner_or_default(owner);
        let url = self.endpoint(&["api", "v1", "users", owner, "repos"])?;

        let response = self.send(Method::GET, url, None::<&()>).await?;
        if response.status() == StatusCode::OK {
            self.read_json(response).await
        } else {
            Err(self.remote_error(response).await)
        }
    }

    /// `DELETE /api/v1/repos/{owner}/{name}`
    ///
    /// Any status other than 204 is reported as `Ok(false)`.
    pub async fn delete_repository(&self, owner: &str, name: &str) -> GiteaResult<bool> {
        let url = self.endpoint(&["api", "v1", "repos", owner, name])?;

        let response = self.send(Method::DELETE, url, None::<&()>).await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            tracing::info!(owner, name, "deleted remote repository");
            Ok(true)
        } else {
            tracing::debug!(owner, name, status = status.as_u16(), "remote delete not confirmed");
            Ok(false)
        }
    }

    fn owner_or_default<'a>(&'a self, owner: Option<&'a str>) -> &'a str {
        owner
            .filter(|o| !o.is_empty())
            .unwrap_or(self.config.default_owner.as_str())
    }

    /// Append percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> GiteaResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GiteaError::Configuration("Gitea URL cannot be used as a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> GiteaResult<Response> {
        tracing::debug!(%method, %url, "sending Gitea request");

        let mut request = self.http_client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|e| self.transport_error(e))
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> GiteaResult<T> {
        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&text).map_err(GiteaError::from)
    }

    async fn remote_error(&self, response: Response) -> GiteaError {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => return self.transport_error(e),
        };
        tracing::warn!(status, body = %body, "Gitea API returned an error");
        GiteaError::Remote { status, body }
    }

    fn transport_error(&self, err: reqwest::Error) -> GiteaError {
        if err.is_timeout() {
            GiteaError::Timeout(self.config.timeout)
        } else {
            GiteaError::Http(err)
        }
    }
}
