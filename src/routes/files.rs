//! File CRUD endpoints over branch storage.
//!
//! All endpoints are thin delegation to [`BranchStorage`]; only `file.get`
//! and `file.save` add work by enriching the response with the file's commit
//! history from the local working copy.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::error::Result;
use crate::git::GitRepository;
use crate::git::history::DEFAULT_HISTORY_DEPTH;
use crate::models::{
    CopyFileRequest, CreateFileRequest, DeleteFileRequest, EditorFileData, FileData,
    GetFileRequest, SaveFileRequest, UploadFileRequest,
};
use crate::storage::BranchStorage;

use super::{AppState, WorkspaceParams};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/gh/{organization}/{project}/{branch}/file.get", post(get_file))
        .route("/gh/{organization}/{project}/{branch}/file.copy", post(copy_file))
        .route("/gh/{organization}/{project}/{branch}/file.create", post(create_file))
        .route("/gh/{organization}/{project}/{branch}/file.delete", post(delete_file))
        .route("/gh/{organization}/{project}/{branch}/file.save", post(save_file))
        .route("/gh/{organization}/{project}/{branch}/file.upload", post(upload_file))
        .route("/gh/{organization}/{project}/{branch}/files.get", post(get_files))
        .with_state(state)
}

fn storage_for(state: &AppState, params: &WorkspaceParams) -> Result<BranchStorage> {
    state
        .storage
        .storage_for_branch(&params.organization, &params.project, &params.branch)
}

/// Read a file plus the commits that changed it, newest first.
async fn file_with_history(storage: &BranchStorage, path: &str) -> Result<EditorFileData> {
    let content = storage.read_file(path).await?;
    let repo = GitRepository::open(storage.root())?;
    let history = repo.file_history(path, DEFAULT_HISTORY_DEPTH)?;
    Ok(EditorFileData {
        file: FileData {
            path: path.to_string(),
        },
        content,
        history,
    })
}

async fn get_file(
    State(state): State<AppState>,
    Path(params): Path<WorkspaceParams>,
    Json(request): Json<GetFileRequest>,
) -> Result<Json<EditorFileData>> {
    let storage = storage_for(&state, &params)?;
    let data = file_with_history(&storage, &request.file.path).await?;
    Ok(Json(data))
}

async fn copy_file(
    State(state): State<AppState>,
    Path(params): Path<WorkspaceParams>,
    Json(request): Json<CopyFileRequest>,
) -> Result<Json<FileData>> {
    let storage = storage_for(&state, &params)?;
    let content = storage.read_file(&request.original_path).await?;
    storage.write_file(&request.path, &content).await?;
    Ok(Json(FileData { path: request.path }))
}

async fn create_file(
    State(state): State<AppState>,
    Path(params): Path<WorkspaceParams>,
    Json(request): Json<CreateFileRequest>,
) -> Result<Json<FileData>> {
    let storage = storage_for(&state, &params)?;
    storage
        .write_file(&request.path, request.content.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(FileData { path: request.path }))
}

async fn delete_file(
    State(state): State<AppState>,
    Path(params): Path<WorkspaceParams>,
    Json(request): Json<DeleteFileRequest>,
) -> Result<Json<()>> {
    let storage = storage_for(&state, &params)?;
    storage.delete_file(&request.file.path).await?;
    Ok(Json(()))
}

async fn save_file(
    State(state): State<AppState>,
    Path(params): Path<WorkspaceParams>,
    Json(request): Json<SaveFileRequest>,
) -> Result<Json<EditorFileData>> {
    let storage = storage_for(&state, &params)?;
    storage
        .write_file(&request.file.path, &request.content)
        .await?;
    let data = file_with_history(&storage, &request.file.path).await?;
    Ok(Json(data))
}

async fn upload_file(
    State(state): State<AppState>,
    Path(params): Path<WorkspaceParams>,
    Json(request): Json<UploadFileRequest>,
) -> Result<Json<FileData>> {
    let storage = storage_for(&state, &params)?;
    storage.write_file(&request.path, &request.content).await?;
    Ok(Json(FileData { path: request.path }))
}

/// Directory listing is delegated to the connector layer; the API answers
/// with an empty set, matching the editor's expectations.
async fn get_files() -> Result<Json<Vec<FileData>>> {
    Ok(Json(Vec::new()))
}
