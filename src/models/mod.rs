//! Data transfer objects (DTOs) for the editor API.
//!
//! These structs are serialized to JSON for editor consumption and follow the
//! editor API's camelCase field naming.
//! - `commit`: RepoCommit, AuthorInfo for file history entries
//! - `file`: FileData, EditorFileData and the file.* request bodies
//! - `project`: ProjectData, DeviceData and the editor.yaml settings shape
//! - `workspace`: WorkspaceData and branch/commit references

pub mod commit;
pub mod file;
pub mod project;
pub mod workspace;

pub use commit::*;
pub use file::*;
pub use project::*;
pub use workspace::*;
