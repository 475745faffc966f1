//! Workspace branch naming convention.
//!
//! The editor only exposes branches that are workspaces: the standard primary
//! branches plus any branch under the reserved `workspace/` prefix. Display
//! names strip the prefix.

/// Reserved prefix marking a branch as an editor workspace.
pub const WORKSPACE_BRANCH_PREFIX: &str = "workspace/";

/// Branches that are always treated as workspaces.
const SPECIAL_BRANCHES: [&str; 3] = ["main", "master", "staging"];

pub fn is_workspace_branch(branch: &str) -> bool {
    SPECIAL_BRANCHES.contains(&branch) || branch.starts_with(WORKSPACE_BRANCH_PREFIX)
}

/// Editor-facing name for a workspace branch.
pub fn shorten_workspace_name(branch: &str) -> &str {
    branch.strip_prefix(WORKSPACE_BRANCH_PREFIX).unwrap_or(branch)
}
