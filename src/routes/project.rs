//! Project metadata endpoints backed by the repository's `editor.yaml`.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::error::{AppError, Result};
use crate::models::{DeviceData, EditorFileSettings, FEATURE_WORKSPACE_CREATE, ProjectData};
use crate::storage::BranchStorage;

use super::{AppState, WorkspaceParams};

const EDITOR_CONFIG_PATH: &str = "editor.yaml";

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/gh/{organization}/{project}/{branch}/project.get", post(get_project))
        .route("/gh/{organization}/{project}/{branch}/devices.get", post(get_devices))
        .with_state(state)
}

/// Load `editor.yaml` from the branch. A missing file is an empty
/// configuration; a malformed one propagates.
async fn read_editor_config(storage: &BranchStorage) -> Result<EditorFileSettings> {
    let raw = match storage.read_file(EDITOR_CONFIG_PATH).await {
        Ok(raw) => raw,
        Err(AppError::PathNotFound(_)) => return Ok(EditorFileSettings::default()),
        Err(err) => return Err(err),
    };
    serde_yaml::from_str(&raw)
        .map_err(|err| AppError::Storage(format!("unable to parse editor.yaml: {err}")))
}

async fn get_project(
    State(state): State<AppState>,
    Path(params): Path<WorkspaceParams>,
) -> Result<Json<ProjectData>> {
    let storage =
        state
            .storage
            .storage_for_branch(&params.organization, &params.project, &params.branch)?;
    let config = read_editor_config(&storage).await?;

    let mut features = config.features;
    // Workspaces cannot be created through this connector.
    features.insert(FEATURE_WORKSPACE_CREATE.to_string(), false);

    Ok(Json(ProjectData {
        title: config.title,
        site: config.site,
        experiments: config.experiments,
        features,
    }))
}

async fn get_devices(
    State(state): State<AppState>,
    Path(params): Path<WorkspaceParams>,
) -> Result<Json<Vec<DeviceData>>> {
    let storage =
        state
            .storage
            .storage_for_branch(&params.organization, &params.project, &params.branch)?;
    let config = read_editor_config(&storage).await?;
    Ok(Json(config.devices))
}
