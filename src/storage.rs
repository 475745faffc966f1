//! Branch-scoped file storage over local working copies.
//!
//! Each workspace branch has a working copy checked out at
//! `<root>/<organization>/<project>/<branch>`. File paths from the editor are
//! repository-relative with an optional leading slash; traversal outside the
//! working copy is rejected.

use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, Result};

/// Hands out [`BranchStorage`] handles scoped to one workspace branch.
#[derive(Debug, Clone)]
pub struct StorageManager {
    root: PathBuf,
}

impl StorageManager {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn storage_for_branch(
        &self,
        organization: &str,
        project: &str,
        branch: &str,
    ) -> Result<BranchStorage> {
        for segment in [organization, project, branch] {
            if segment.is_empty() || segment.contains("..") {
                return Err(AppError::InvalidPath(segment.to_string()));
            }
        }

        let root = self.root.join(organization).join(project).join(branch);
        if !root.is_dir() {
            return Err(AppError::RepoNotFound(root.to_string_lossy().to_string()));
        }
        Ok(BranchStorage { root })
    }
}

/// File access inside one branch's working copy.
#[derive(Debug, Clone)]
pub struct BranchStorage {
    root: PathBuf,
}

impl BranchStorage {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an editor-supplied path inside the working copy.
    fn resolve(&self, file_path: &str) -> Result<PathBuf> {
        let rel = file_path.trim_start_matches('/');
        let rel_path = Path::new(rel);
        for component in rel_path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(AppError::InvalidPath(file_path.to_string())),
            }
        }
        Ok(self.root.join(rel_path))
    }

    pub async fn read_file(&self, file_path: &str) -> Result<String> {
        let full = self.resolve(file_path)?;
        match tokio::fs::read_to_string(&full).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::PathNotFound(file_path.to_string()))
            }
            Err(err) => Err(AppError::Storage(format!(
                "unable to read '{file_path}': {err}"
            ))),
        }
    }

    pub async fn write_file(&self, file_path: &str, content: &str) -> Result<()> {
        let full = self.resolve(file_path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                AppError::Storage(format!("unable to create parent for '{file_path}': {err}"))
            })?;
        }
        tokio::fs::write(&full, content).await.map_err(|err| {
            AppError::Storage(format!("unable to write '{file_path}': {err}"))
        })
    }

    pub async fn delete_file(&self, file_path: &str) -> Result<()> {
        let full = self.resolve(file_path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::PathNotFound(file_path.to_string()))
            }
            Err(err) => Err(AppError::Storage(format!(
                "unable to delete '{file_path}': {err}"
            ))),
        }
    }
}
