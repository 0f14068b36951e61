//! Workspace document enumeration.
//!
//! Cross-file operations read candidate documents synchronously and in a
//! single linear pass; there is no persistent project index.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use walkdir::WalkDir;

use super::error::WorkspaceError;
use crate::base::{DocumentUri, KITE_EXTENSION};

/// Source of documents for cross-file searches.
pub trait Workspace {
    /// Every document in the workspace, in a stable order.
    fn documents(&self) -> Vec<DocumentUri>;

    /// Current text of a document, `None` when absent or unreadable.
    fn read(&self, uri: &str) -> Option<Arc<str>>;
}

// ============================================================================
// IN-MEMORY
// ============================================================================

/// Open editor buffers, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspace {
    documents: IndexMap<DocumentUri, Arc<str>>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<DocumentUri>, text: impl Into<Arc<str>>) {
        self.documents.insert(uri.into(), text.into());
    }

    pub fn remove(&mut self, uri: &str) -> Option<Arc<str>> {
        self.documents.shift_remove(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Workspace for MemoryWorkspace {
    fn documents(&self) -> Vec<DocumentUri> {
        self.documents.keys().cloned().collect()
    }

    fn read(&self, uri: &str) -> Option<Arc<str>> {
        self.documents.get(uri).cloned()
    }
}

impl<T: Workspace + ?Sized> Workspace for &T {
    fn documents(&self) -> Vec<DocumentUri> {
        (**self).documents()
    }

    fn read(&self, uri: &str) -> Option<Arc<str>> {
        (**self).read(uri)
    }
}

// ============================================================================
// FILESYSTEM
// ============================================================================

/// Source files under a root directory, with open buffers taking
/// precedence over disk content.
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
    extension: String,
    max_files: usize,
    files: Vec<DocumentUri>,
    overlay: MemoryWorkspace,
}

impl FsWorkspace {
    /// Walk `root` for `.kite` files.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        Self::load_with(root, KITE_EXTENSION, usize::MAX)
    }

    pub fn load_with(
        root: impl Into<PathBuf>,
        extension: &str,
        max_files: usize,
    ) -> Result<Self, WorkspaceError> {
        let mut workspace = Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
            max_files,
            files: Vec::new(),
            overlay: MemoryWorkspace::new(),
        };
        workspace.refresh()?;
        Ok(workspace)
    }

    /// Re-scan the root directory.
    pub fn refresh(&mut self) -> Result<(), WorkspaceError> {
        if !self.root.is_dir() {
            return Err(WorkspaceError::NotADirectory(self.root.clone()));
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() || !has_extension(entry.path(), &self.extension) {
                continue;
            }
            if files.len() >= self.max_files {
                return Err(WorkspaceError::TooManyFiles {
                    limit: self.max_files,
                });
            }
            files.push(path_to_uri(entry.path()));
        }
        files.sort();
        tracing::debug!(root = %self.root.display(), count = files.len(), "scanned workspace");
        self.files = files;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register an open buffer; it shadows the file on disk.
    pub fn open(&mut self, uri: impl Into<DocumentUri>, text: impl Into<Arc<str>>) {
        self.overlay.insert(uri, text);
    }

    pub fn close(&mut self, uri: &str) {
        self.overlay.remove(uri);
    }

    /// Read a file straight from disk.
    pub fn read_from_disk(&self, uri: &str) -> Result<String, WorkspaceError> {
        let path = uri_to_path(uri);
        std::fs::read_to_string(&path).map_err(|e| WorkspaceError::io(path, e))
    }
}

impl Workspace for FsWorkspace {
    fn documents(&self) -> Vec<DocumentUri> {
        let mut documents = self.files.clone();
        for uri in self.overlay.documents() {
            if !documents.contains(&uri) {
                documents.push(uri);
            }
        }
        documents
    }

    fn read(&self, uri: &str) -> Option<Arc<str>> {
        if let Some(text) = self.overlay.read(uri) {
            return Some(text);
        }
        match self.read_from_disk(uri) {
            Ok(text) => Some(Arc::from(text)),
            Err(err) => {
                tracing::warn!(uri, error = %err, "skipping unreadable workspace file");
                None
            }
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

fn path_to_uri(path: &Path) -> DocumentUri {
    Arc::from(path.to_string_lossy().replace('\\', "/"))
}

fn uri_to_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}

// ============================================================================
// IMPORT PATHS
// ============================================================================

/// Resolve an import path against the importing document's directory,
/// normalising `.` and `..` segments. Absolute paths and URIs with a
/// scheme are only normalised.
pub fn resolve_import(from_uri: &str, path: &str) -> DocumentUri {
    let (scheme, from_rest) = split_scheme(from_uri);
    let (path_scheme, path_rest) = split_scheme(path);
    if !path_scheme.is_empty() {
        return Arc::from(format!("{path_scheme}{}", normalize(path_rest)));
    }
    let joined = if path_rest.starts_with('/') {
        path_rest.to_string()
    } else {
        match from_rest.rfind('/') {
            Some(idx) => format!("{}/{}", &from_rest[..idx], path_rest),
            None => path_rest.to_string(),
        }
    };
    Arc::from(format!("{scheme}{}", normalize(&joined)))
}

/// Find the workspace document an import refers to. Falls back to a
/// suffix match so bare file names still resolve in flat workspaces.
pub fn find_import_target(
    workspace: &dyn Workspace,
    from_uri: &str,
    path: &str,
) -> Option<DocumentUri> {
    let resolved = resolve_import(from_uri, path);
    let documents = workspace.documents();
    if let Some(found) = documents.iter().find(|uri| **uri == resolved) {
        return Some(found.clone());
    }
    let suffix = normalize(path.trim_start_matches("./"));
    documents
        .into_iter()
        .find(|uri| **uri == *suffix || uri.ends_with(&format!("/{suffix}")))
}

fn split_scheme(uri: &str) -> (&str, &str) {
    match uri.find("://") {
        Some(idx) => uri.split_at(idx + 3),
        None => ("", uri),
    }
}

fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute { format!("/{joined}") } else { joined }
}
