//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` enum for all error conditions and implements Axum's
//! `IntoResponse` to automatically convert errors to appropriate HTTP responses
//! with JSON error bodies.
//!
//! Error mappings:
//! - `MissingAuth` → 400
//! - `Provider` → 401 (carries GitHub's description and reference uri)
//! - `RepoNotFound`, `PathNotFound` → 404
//! - `InvalidPath` → 400
//! - `Network`, `Remote` → 502
//! - `Git`, `Storage`, `ExchangeTimeout`, `Internal` → 500

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::auth::ExchangeError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("No authentication information provided.")]
    MissingAuth,

    #[error("Unable to confirm authentication with GitHub.")]
    Provider {
        error: String,
        description: String,
        uri: String,
    },

    #[error("Token exchange timed out after {0}s")]
    ExchangeTimeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("GitHub API error: {0}")]
    Remote(String),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ExchangeError> for AppError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Provider {
                error,
                description,
                uri,
            } => AppError::Provider {
                error,
                description,
                uri,
            },
            ExchangeError::Network(msg) => AppError::Network(msg),
            ExchangeError::Store(msg) => AppError::Storage(msg),
            ExchangeError::TimedOut(secs) => AppError::ExchangeTimeout(secs),
            ExchangeError::Aborted(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Provider failures keep GitHub's description and reference uri in the
        // body so the editor can show them to the user.
        if let AppError::Provider {
            error,
            description,
            uri,
        } = &self
        {
            let body = Json(json!({
                "error": "Unable to confirm authentication with GitHub.",
                "description": if description.is_empty() { error } else { description },
                "details": { "uri": uri },
            }));
            return (StatusCode::UNAUTHORIZED, body).into_response();
        }

        let status = match &self {
            AppError::MissingAuth | AppError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            AppError::Provider { .. } => StatusCode::UNAUTHORIZED,
            AppError::RepoNotFound(_) | AppError::PathNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Network(_) | AppError::Remote(_) => StatusCode::BAD_GATEWAY,
            AppError::Git(_)
            | AppError::ExchangeTimeout(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_maps_to_unauthorized() {
        let err = AppError::Provider {
            error: "bad_verification_code".to_string(),
            description: "The code passed is incorrect or expired.".to_string(),
            uri: "https://docs.github.com/apps".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_auth_maps_to_bad_request() {
        let response = AppError::MissingAuth.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn path_not_found_maps_to_not_found() {
        let response = AppError::PathNotFound("/content/page.yaml".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn exchange_error_conversion_keeps_provider_details() {
        let err = AppError::from(ExchangeError::Provider {
            error: "bad_verification_code".to_string(),
            description: "expired".to_string(),
            uri: "https://docs.github.com".to_string(),
        });
        match err {
            AppError::Provider { description, .. } => assert_eq!(description, "expired"),
            other => panic!("expected provider error, got {other:?}"),
        }
    }
}
