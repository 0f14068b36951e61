//! Project management: workspace enumeration and import path resolution.

mod error;
mod workspace;

pub use error::WorkspaceError;
pub use workspace::{FsWorkspace, MemoryWorkspace, Workspace, find_import_target, resolve_import};
