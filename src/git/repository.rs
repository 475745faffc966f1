use std::path::Path;

use chrono::SecondsFormat;
use git2::Repository;

use crate::error::{AppError, Result};
use crate::models::{AuthorInfo, RepoCommit};

/// Handle on a workspace branch's local working copy.
pub struct GitRepository {
    pub repo: Repository,
    pub path: String,
}

impl GitRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let repo =
            Repository::discover(&path).map_err(|_| AppError::RepoNotFound(path_str.clone()))?;

        Ok(Self {
            repo,
            path: path_str,
        })
    }
}

pub fn commit_to_entry(commit: &git2::Commit) -> RepoCommit {
    let author = commit.author();
    RepoCommit {
        hash: commit.id().to_string(),
        summary: commit.summary().unwrap_or("").to_string(),
        author: AuthorInfo {
            name: author.name().unwrap_or("Unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
        },
        timestamp: format_timestamp(commit.time().seconds()),
    }
}

/// ISO-8601 rendering of a commit author time, matching the editor API's
/// timestamp format.
pub fn format_timestamp(seconds: i64) -> String {
    chrono::DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_timestamp_renders_utc_iso() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_timestamp(1_600_000_000), "2020-09-13T12:26:40.000Z");
    }

    #[test]
    fn open_missing_repo_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = GitRepository::open(dir.path().join("nope"));
        assert!(matches!(result, Err(AppError::RepoNotFound(_))));
    }
}
