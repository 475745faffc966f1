//! OAuth code-exchange client for GitHub's token endpoint.
//!
//! GitHub answers the exchange POST with 200 regardless of outcome and
//! signals failure through an error payload. The response is decoded once,
//! here at the boundary, into a tagged success/error union instead of being
//! inspected field-by-field downstream.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default GitHub token endpoint.
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// User-Agent for requests against GitHub.
pub const SERVICE_USER_AGENT: &str = "editor-connector";

/// Failure modes of one token exchange.
///
/// Cloneable so a settled outcome can be handed to every request waiting on
/// the same exchange.
#[derive(Debug, Clone, Error)]
pub enum ExchangeError {
    /// GitHub returned an OAuth error payload (e.g. `bad_verification_code`).
    #[error("GitHub rejected the authorization code: {description}")]
    Provider {
        error: String,
        description: String,
        uri: String,
    },

    #[error("token endpoint request failed: {0}")]
    Network(String),

    #[error("token store write failed: {0}")]
    Store(String),

    #[error("token exchange timed out after {0}s")]
    TimedOut(u64),

    #[error("token exchange aborted: {0}")]
    Aborted(String),
}

/// Successful exchange payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

/// Wire shape of the token endpoint response. Success carries
/// `access_token`; failure carries `error` plus optional description fields.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenEndpointResponse {
    Granted(AccessToken),
    Denied {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
        #[serde(default)]
        error_uri: Option<String>,
    },
}

#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    state: &'a str,
}

/// Performs the network call to the OAuth provider's token endpoint.
#[async_trait]
pub trait OAuthExchanger: Send + Sync {
    async fn exchange(&self, code: &str, state: &str) -> Result<AccessToken, ExchangeError>;
}

/// [`OAuthExchanger`] backed by GitHub's web-flow token endpoint.
pub struct GithubExchanger {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl GithubExchanger {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self::with_token_url(client_id, client_secret, GITHUB_TOKEN_URL)
    }

    /// Point the exchanger at a non-default token endpoint (GitHub
    /// Enterprise, or a mock server in tests).
    pub fn with_token_url(client_id: &str, client_secret: &str, token_url: &str) -> Self {
        Self {
            client: Client::new(),
            token_url: token_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(SERVICE_USER_AGENT));
        headers
    }
}

#[async_trait]
impl OAuthExchanger for GithubExchanger {
    async fn exchange(&self, code: &str, state: &str) -> Result<AccessToken, ExchangeError> {
        let body = TokenExchangeRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            code,
            state,
        };

        let response = self
            .client
            .post(&self.token_url)
            .headers(Self::headers())
            .json(&body)
            .send()
            .await
            .map_err(|err| ExchangeError::Network(err.to_string()))?;

        let payload: TokenEndpointResponse = response
            .json()
            .await
            .map_err(|err| ExchangeError::Network(err.to_string()))?;

        match payload {
            TokenEndpointResponse::Granted(token) => Ok(token),
            TokenEndpointResponse::Denied {
                error,
                error_description,
                error_uri,
            } => {
                tracing::warn!(error = %error, "token exchange rejected by GitHub");
                Err(ExchangeError::Provider {
                    description: error_description.unwrap_or_else(|| error.clone()),
                    uri: error_uri.unwrap_or_default(),
                    error,
                })
            }
        }
    }
}

// Custom Debug keeps the client secret out of logs.
impl std::fmt::Debug for GithubExchanger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubExchanger")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
