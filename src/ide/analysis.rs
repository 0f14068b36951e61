//! AnalysisHost and Analysis: the editor session.
//!
//! The `AnalysisHost` owns all mutable state and provides `Analysis` snapshots
//! for querying. Every `set_document` re-parses (through the parse cache),
//! re-indexes and re-validates that document in full.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//! host.set_document("main.kite", "var x = 1");
//!
//! let analysis = host.analysis();
//! let refs = analysis.find_references("main.kite", offset);
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use text_size::TextSize;

use super::code_actions::{CodeAction, code_actions};
use super::goto::goto_definition;
use super::references::{RenameError, WorkspaceEdit, find_references, rename};
use crate::base::{DocumentUri, KITE_EXTENSION, Location};
use crate::hir::{AnalyzedDocument, Declaration, Diagnostic, ResolvedSymbol, resolve};
use crate::parser::{CacheStats, DEFAULT_CAPACITY, ParseCache};
use crate::project::{FsWorkspace, Workspace, WorkspaceError};
use crate::validation::{Pipeline, ValidationContext};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Settings for an [`AnalysisHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Number of distinct document texts whose parse is kept.
    pub parse_cache_capacity: usize,
    /// Extension of source files discovered under `workspace_root`.
    pub file_extension: String,
    /// Directory scanned for cross-file lookups. Without it only open
    /// documents are searched.
    pub workspace_root: Option<PathBuf>,
    /// Run the token-level lints after the semantic passes.
    pub lints: bool,
    pub max_workspace_files: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parse_cache_capacity: DEFAULT_CAPACITY,
            file_extension: KITE_EXTENSION.to_string(),
            workspace_root: None,
            lints: true,
            max_workspace_files: 10_000,
        }
    }
}

impl AnalysisConfig {
    pub fn with_parse_cache_capacity(mut self, capacity: usize) -> Self {
        self.parse_cache_capacity = capacity;
        self
    }

    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn with_lints(mut self, lints: bool) -> Self {
        self.lints = lints;
        self
    }

    pub fn with_max_workspace_files(mut self, max: usize) -> Self {
        self.max_workspace_files = max;
        self
    }
}

// ============================================================================
// HOST
// ============================================================================

struct DocumentState {
    document: AnalyzedDocument,
    diagnostics: Vec<Diagnostic>,
}

/// Owns all mutable state for the IDE layer.
///
/// Open documents shadow files of the same URI on disk.
pub struct AnalysisHost {
    config: AnalysisConfig,
    documents: IndexMap<DocumentUri, DocumentState>,
    cache: Mutex<ParseCache>,
    disk: Option<FsWorkspace>,
    pipeline: Pipeline,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    /// A host over open documents only, with the default configuration.
    pub fn new() -> Self {
        Self::with_parts(AnalysisConfig::default(), None)
    }

    /// Fails only when `workspace_root` is set and cannot be scanned.
    pub fn with_config(config: AnalysisConfig) -> Result<Self, WorkspaceError> {
        let disk = match &config.workspace_root {
            Some(root) => Some(FsWorkspace::load_with(
                root.clone(),
                &config.file_extension,
                config.max_workspace_files,
            )?),
            None => None,
        };
        Ok(Self::with_parts(config, disk))
    }

    fn with_parts(config: AnalysisConfig, disk: Option<FsWorkspace>) -> Self {
        Self {
            cache: Mutex::new(ParseCache::new(config.parse_cache_capacity)),
            pipeline: Pipeline::with_lints(config.lints),
            documents: IndexMap::new(),
            disk,
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Open or replace a document and analyze it.
    pub fn set_document(&mut self, uri: impl Into<DocumentUri>, text: impl Into<Arc<str>>) {
        let uri = uri.into();
        let text = text.into();
        let parse = self.cache.lock().get_or_parse(&text);
        let document = AnalyzedDocument::from_parse(uri.clone(), text, parse);
        tracing::debug!(uri = %uri, declarations = document.declarations.len(), "document indexed");
        self.documents.insert(
            uri.clone(),
            DocumentState {
                document,
                diagnostics: Vec::new(),
            },
        );

        let diagnostics = match self.documents.get(&uri) {
            Some(state) => {
                let cx = ValidationContext::new(&state.document).with_workspace(&*self);
                self.pipeline.run(&cx)
            }
            None => Vec::new(),
        };
        tracing::debug!(uri = %uri, count = diagnostics.len(), "document validated");
        if let Some(state) = self.documents.get_mut(&uri) {
            state.diagnostics = diagnostics;
        }
    }

    /// Close a document. Returns whether it was open.
    pub fn remove_document(&mut self, uri: &str) -> bool {
        self.documents.shift_remove(uri).is_some()
    }

    pub fn document(&self, uri: &str) -> Option<&AnalyzedDocument> {
        self.documents.get(uri).map(|state| &state.document)
    }

    /// Declarations of an open document; empty when it is not open.
    pub fn declarations(&self, uri: &str) -> &[Declaration] {
        self.document(uri).map(|d| d.declarations.as_slice()).unwrap_or(&[])
    }

    /// Diagnostics from the last analysis of an open document.
    pub fn diagnostics(&self, uri: &str) -> &[Diagnostic] {
        self.documents
            .get(uri)
            .map(|state| state.diagnostics.as_slice())
            .unwrap_or(&[])
    }

    pub fn open_documents(&self) -> impl Iterator<Item = &DocumentUri> {
        self.documents.keys()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Re-scan the workspace root for added or removed files.
    pub fn refresh_workspace(&mut self) -> Result<(), WorkspaceError> {
        match &mut self.disk {
            Some(disk) => disk.refresh(),
            None => Ok(()),
        }
    }

    /// Get an immutable snapshot for querying.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis { host: self }
    }
}

impl Workspace for AnalysisHost {
    fn documents(&self) -> Vec<DocumentUri> {
        let mut documents: Vec<DocumentUri> = self.documents.keys().cloned().collect();
        if let Some(disk) = &self.disk {
            for uri in disk.documents() {
                if !self.documents.contains_key(&uri) {
                    documents.push(uri);
                }
            }
        }
        documents
    }

    fn read(&self, uri: &str) -> Option<Arc<str>> {
        if let Some(state) = self.documents.get(uri) {
            return Some(state.document.text.clone());
        }
        self.disk.as_ref()?.read(uri)
    }
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Read-only view of the host for answering queries.
pub struct Analysis<'a> {
    host: &'a AnalysisHost,
}

impl<'a> Analysis<'a> {
    pub fn document(&self, uri: &str) -> Option<&'a AnalyzedDocument> {
        self.host.document(uri)
    }

    pub fn declarations(&self, uri: &str) -> &'a [Declaration] {
        self.host.declarations(uri)
    }

    pub fn diagnostics(&self, uri: &str) -> &'a [Diagnostic] {
        self.host.diagnostics(uri)
    }

    /// The symbol under the cursor.
    pub fn resolve(&self, uri: &str, offset: TextSize) -> Option<ResolvedSymbol> {
        let document = self.document(uri)?;
        let (_, word) = document.word_at(offset)?;
        resolve(word, Some(offset), document, self.host)
    }

    pub fn goto_definition(&self, uri: &str, offset: TextSize) -> Option<Location> {
        goto_definition(offset, self.document(uri)?, self.host)
    }

    /// References to the symbol under the cursor, definition first.
    pub fn find_references(&self, uri: &str, offset: TextSize) -> Vec<Location> {
        let Some(document) = self.document(uri) else {
            return Vec::new();
        };
        let Some((_, word)) = document.word_at(offset) else {
            return Vec::new();
        };
        if !document.lexical.is_code(offset) {
            return Vec::new();
        }
        find_references(word, offset, document, self.host)
    }

    pub fn rename(
        &self,
        uri: &str,
        offset: TextSize,
        new_name: &str,
    ) -> Result<WorkspaceEdit, RenameError> {
        let document = self.document(uri).ok_or(RenameError::NoSymbol)?;
        rename(offset, new_name, document, self.host)
    }

    /// Quick fixes for `diagnostics` reported on `uri`.
    pub fn code_actions(&self, uri: &str, diagnostics: &[Diagnostic]) -> Vec<CodeAction> {
        match self.document(uri) {
            Some(document) => code_actions(document, diagnostics),
            None => Vec::new(),
        }
    }
}
