use serde::{Deserialize, Serialize};

use super::commit::RepoCommit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileData {
    pub path: String,
}

/// File payload returned by `file.get` and `file.save`: raw content plus the
/// commits that changed it, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorFileData {
    pub file: FileData,
    pub content: String,
    pub history: Vec<RepoCommit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFileRequest {
    pub file: FileData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyFileRequest {
    pub original_path: String,
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    pub path: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    pub file: FileData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFileRequest {
    pub file: FileData,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    pub path: String,
    pub content: String,
}
