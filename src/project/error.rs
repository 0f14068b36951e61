//! Error types for workspace loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors at the filesystem boundary. Everything above this layer sees an
/// unreadable file as absent.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The workspace root is missing or not a directory.
    #[error("workspace root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// IO error while walking or reading.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk failure.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// More matching files than the configured limit.
    #[error("workspace has more than {limit} source files")]
    TooManyFiles { limit: usize },
}

impl WorkspaceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
