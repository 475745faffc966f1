//! Thin client for the GitHub REST endpoints the connector delegates to:
//! branch listing and commit lookup. Authorized per request with the
//! credential resolved by the auth gate.

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;

use crate::auth::Credential;
use crate::auth::exchange::SERVICE_USER_AGENT;
use crate::error::{AppError, Result};

/// Default GitHub REST API base.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone, Deserialize)]
pub struct BranchResponse {
    pub name: String,
    pub commit: BranchCommitRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchCommitRef {
    pub sha: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitResponse {
    pub commit: CommitPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitPayload {
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
    pub date: String,
}

/// Per-request GitHub API client bound to one credential.
pub struct GithubClient {
    client: Client,
    api_base: String,
    token: String,
}

impl GithubClient {
    pub fn new(credential: &Credential) -> Self {
        Self::with_api_base(credential, GITHUB_API_BASE)
    }

    /// Point the client at a non-default API base (GitHub Enterprise, or a
    /// mock server in tests).
    pub fn with_api_base(credential: &Credential, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token: credential.access_token.clone(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.api_base);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github.v3+json")
            .header(USER_AGENT, SERVICE_USER_AGENT)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::PathNotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(AppError::Remote(format!("{status} for {path}")));
        }

        response
            .json()
            .await
            .map_err(|err| AppError::Remote(format!("invalid response for {path}: {err}")))
    }

    pub async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<BranchResponse>> {
        self.get_json(&format!("/repos/{owner}/{repo}/branches?per_page=100"))
            .await
    }

    pub async fn get_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<BranchResponse> {
        self.get_json(&format!("/repos/{owner}/{repo}/branches/{branch}"))
            .await
    }

    pub async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<CommitResponse> {
        self.get_json(&format!("/repos/{owner}/{repo}/commits/{sha}"))
            .await
    }
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn credential() -> Credential {
        Credential {
            access_token: "gho_test".to_string(),
        }
    }

    #[tokio::test]
    async fn list_branches_sends_token_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/site/branches"))
            .and(header("authorization", "token gho_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "main", "commit": {"sha": "abc", "url": "https://api.github.com/c/abc"}},
                {"name": "workspace/redesign", "commit": {"sha": "def", "url": "https://api.github.com/c/def"}},
            ])))
            .mount(&server)
            .await;

        let client = GithubClient::with_api_base(&credential(), &server.uri());
        let branches = client.list_branches("acme", "site").await.unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].name, "main");
        assert_eq!(branches[1].commit.sha, "def");
    }

    #[tokio::test]
    async fn get_commit_parses_author() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/site/commits/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "commit": {"author": {
                    "name": "Ada",
                    "email": "ada@example.com",
                    "date": "2024-05-01T12:00:00Z",
                }},
            })))
            .mount(&server)
            .await;

        let client = GithubClient::with_api_base(&credential(), &server.uri());
        let commit = client.get_commit("acme", "site", "abc").await.unwrap();
        assert_eq!(commit.commit.author.name, "Ada");
        assert_eq!(commit.commit.author.date, "2024-05-01T12:00:00Z");
    }

    #[tokio::test]
    async fn missing_branch_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "Not Found",
            })))
            .mount(&server)
            .await;

        let client = GithubClient::with_api_base(&credential(), &server.uri());
        let err = client.get_branch("acme", "site", "gone").await.unwrap_err();
        assert!(matches!(err, AppError::PathNotFound(_)));
    }

    #[tokio::test]
    async fn server_error_is_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = GithubClient::with_api_base(&credential(), &server.uri());
        let err = client.list_branches("acme", "site").await.unwrap_err();
        assert!(matches!(err, AppError::Remote(_)));
    }
}
