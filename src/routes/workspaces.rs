//! Workspace endpoints backed by the GitHub REST API.
//!
//! Branches following the reserved workspace naming convention are exposed as
//! editor workspaces with shortened display names.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::auth::Credential;
use crate::error::Result;
use crate::github::GithubClient;
use crate::models::{AuthorInfo, BranchCommitData, BranchData, WorkspaceData};
use crate::naming::{is_workspace_branch, shorten_workspace_name};

use super::{AppState, WorkspaceParams};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/gh/{organization}/{project}/{branch}/workspace.get", post(get_workspace))
        .route("/gh/{organization}/{project}/{branch}/workspaces.get", post(get_workspaces))
        .with_state(state)
}

async fn get_workspace(
    State(state): State<AppState>,
    Path(params): Path<WorkspaceParams>,
    Extension(credential): Extension<Credential>,
) -> Result<Json<WorkspaceData>> {
    let client = GithubClient::with_api_base(&credential, &state.api_base);

    let branch = client
        .get_branch(&params.organization, &params.project, &params.branch)
        .await?;
    let commit = client
        .get_commit(&params.organization, &params.project, &branch.commit.sha)
        .await?;

    Ok(Json(WorkspaceData {
        name: shorten_workspace_name(&branch.name).to_string(),
        branch: BranchData {
            name: branch.name.clone(),
            commit: BranchCommitData {
                hash: branch.commit.sha,
                url: branch.commit.url,
                author: Some(AuthorInfo {
                    name: commit.commit.author.name,
                    email: commit.commit.author.email,
                }),
                timestamp: Some(commit.commit.author.date),
            },
        },
    }))
}

async fn get_workspaces(
    State(state): State<AppState>,
    Path(params): Path<WorkspaceParams>,
    Extension(credential): Extension<Credential>,
) -> Result<Json<Vec<WorkspaceData>>> {
    let client = GithubClient::with_api_base(&credential, &state.api_base);
    let branches = client
        .list_branches(&params.organization, &params.project)
        .await?;

    let workspaces = branches
        .into_iter()
        .filter(|branch| is_workspace_branch(&branch.name))
        .map(|branch| WorkspaceData {
            name: shorten_workspace_name(&branch.name).to_string(),
            branch: BranchData {
                name: branch.name.clone(),
                commit: BranchCommitData {
                    hash: branch.commit.sha,
                    url: branch.commit.url,
                    author: None,
                    timestamp: None,
                },
            },
        })
        .collect();

    Ok(Json(workspaces))
}
