//! Commit-history reconstruction for a single file.
//!
//! Recovers the commits that changed a file's content by walking the full
//! commit log newest-first and watching the file's blob id, instead of relying
//! on a path-aware history query. A full-log walk is a deliberate trade-off;
//! acceptable for the repository sizes this connector serves.

use std::path::Path;

use git2::{ErrorCode, Oid, Sort};

use crate::error::Result;
use crate::git::repository::{GitRepository, commit_to_entry};
use crate::models::RepoCommit;

/// Default number of history entries returned when the caller does not ask
/// for a specific depth.
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

impl GitRepository {
    /// Walk the commit log and return the commits that changed `file_path`,
    /// newest first, capped at `depth`.
    ///
    /// A commit "changed" the file when the blob id observed at that point in
    /// the walk differs from the blob id at the next-newer commit; the commit
    /// attributed with the change is the newer one. When the file is absent at
    /// a commit it was introduced strictly later, so the walk stops there.
    /// A revert to identical bytes is indistinguishable from no change.
    ///
    /// Only the absent-file condition is swallowed; any other read error
    /// aborts the walk and propagates.
    pub fn file_history(&self, file_path: &str, depth: usize) -> Result<Vec<RepoCommit>> {
        let rel_path = file_path.trim_start_matches('/');

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        let mut last_blob: Option<Oid> = None;
        let mut last_commit: Option<RepoCommit> = None;
        let mut matching: Vec<RepoCommit> = Vec::new();

        for oid in revwalk {
            if matching.len() >= depth {
                break;
            }

            let commit = self.repo.find_commit(oid?)?;

            match blob_id_at(&commit, rel_path) {
                Ok(blob_id) => {
                    if last_blob != Some(blob_id) {
                        // The next-newer commit introduced the content we just
                        // left behind. Nothing to attribute on the very first
                        // observation.
                        if last_blob.is_some() {
                            if let Some(entry) = last_commit.take() {
                                matching.push(entry);
                            }
                        }
                        last_blob = Some(blob_id);
                    }
                }
                Err(err) if err.code() == ErrorCode::NotFound => {
                    // File absent here, so it appeared strictly later. Older
                    // history cannot touch it.
                    if let Some(entry) = last_commit.take() {
                        matching.push(entry);
                    }
                    break;
                }
                Err(err) => return Err(err.into()),
            }

            last_commit = Some(commit_to_entry(&commit));
        }

        tracing::debug!(
            path = rel_path,
            entries = matching.len(),
            "resolved file history"
        );
        Ok(matching)
    }
}

/// Content object id for `path` in the commit's tree.
fn blob_id_at(commit: &git2::Commit, path: &str) -> std::result::Result<Oid, git2::Error> {
    let tree = commit.tree()?;
    let entry = tree.get_path(Path::new(path))?;
    Ok(entry.id())
}
