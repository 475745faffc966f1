use serde::{Deserialize, Serialize};

use super::commit::AuthorInfo;

/// Editor-facing view of a workspace branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceData {
    /// Shortened display name (reserved branch prefix stripped).
    pub name: String,
    pub branch: BranchData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchData {
    pub name: String,
    pub commit: BranchCommitData,
}

/// Commit reference on a branch. Author and timestamp are only populated by
/// `workspace.get`, which issues the extra commit lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCommitData {
    pub hash: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
