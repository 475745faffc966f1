//! API route handlers - maps editor API endpoints to storage and GitHub
//! operations.
//!
//! Every route is a POST under `/gh/{organization}/{project}/{branch}/` and
//! passes through the auth gate middleware before its handler runs:
//! - `files`: file.get (content + history), file.copy/create/delete/save/
//!   upload, files.get
//! - `project`: project.get and devices.get from the repo's editor.yaml
//! - `workspaces`: workspace.get / workspaces.get via the GitHub REST API

pub mod files;
pub mod project;
pub mod workspaces;

use std::sync::Arc;

use axum::{Router, middleware};
use serde::Deserialize;

use crate::auth::{AuthGate, require_auth};
use crate::storage::StorageManager;

/// Shared state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
    pub storage: StorageManager,
    /// GitHub REST API base; overridable for tests and GitHub Enterprise.
    pub api_base: String,
}

/// Path parameters addressing one workspace branch.
#[derive(Debug, Deserialize)]
pub struct WorkspaceParams {
    pub organization: String,
    pub project: String,
    pub branch: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(files::routes(state.clone()))
        .merge(project::routes(state.clone()))
        .merge(workspaces::routes(state.clone()))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.gate),
            require_auth,
        ))
}
