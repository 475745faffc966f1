use serde::{Deserialize, Serialize};

/// One entry in a file's commit history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoCommit {
    pub hash: String,
    pub summary: String,
    pub author: AuthorInfo,
    /// ISO-8601 timestamp derived from the commit's author time.
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub name: String,
    pub email: String,
}
