// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Gitea wire types (subset of the fields MiniHub reads or sends)

use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/admin/users/{owner}/repos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRepoOption {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub auto_init: bool,
    pub default_branch: String,
}

impl CreateRepoOption {
    pub fn new(name: &str, description: Option<&str>, private: bool) -> Self {
        Self {
            name: name.to_string(),
            description: description.unwrap_or_default().to_string(),
            private,
            auto_init: true,
            default_branch: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOwner {
    #[serde(default)]
    pub id: Option<i64>,
    pub login: String,
}

/// Repository as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub owner: RemoteOwner,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub clone_url: String,
    pub ssh_url: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_option_always_initialises_main() {
        let body = serde_json::to_value(CreateRepoOption::new("demo", None, true)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "name": "demo",
                "description": "",
                "private": true,
                "auto_init": true,
                "default_branch": "main",
            })
        );
    }

    #[test]
    fn remote_repo_ignores_unknown_fields() {
        let repo: RemoteRepo = serde_json::from_value(serde_json::json!({
            "id": 12,
            "name": "demo",
            "owner": { "id": 1, "login": "admin", "avatar_url": "" },
            "clone_url": "http://gitea/admin/demo.git",
            "ssh_url": "git@gitea:admin/demo.git",
            "stars_count": 0
        }))
        .unwrap();
        assert_eq!(repo.owner.login, "admin");
        assert!(!repo.private);
        assert!(repo.full_name.is_none());
    }
}
