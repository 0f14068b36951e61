//! Validation pipeline — independent diagnostic passes over one document.
//!
//! Every pass is a pure function of the analyzed document (and, for the
//! cross-file checks, the workspace). Passes never see each other's output,
//! so the pipeline may run them in any order; [`Pipeline::default`] fixes
//! one for stable diagnostic ordering.
//!
//! ## Passes
//!
//! ```text
//! syntax               ← parse errors
//! missing-properties   ← required schema properties not set on a resource
//! type-mismatch        ← literal values against declared types
//! unused-symbols       ← variables, parameters, loop variables, outputs
//! unused-imports       ← named and wildcard imports
//! decorators           ← duplicate, unknown, bad arguments, wrong target
//! duplicates           ← same name declared twice in one scope
//! lint:*               ← token-level checks, independent of the tree
//! ```
//!
//! A pass that panics is logged and contributes nothing; the remaining
//! passes still run.

mod cross_file;
mod decorators;
mod duplicates;
mod lints;
mod missing_properties;
mod syntax;
mod type_mismatch;
mod unused_imports;
mod unused_symbols;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::base::DocumentUri;
use crate::hir::{AnalyzedDocument, Diagnostic};
use crate::project::Workspace;

pub use decorators::DecoratorPass;
pub use duplicates::DuplicateDeclarationPass;
pub use lints::{
    AssignmentInConditionLint, CrossTypeComparisonLint, ImplicitAnyLint, InfiniteLoopLint,
    UnclosedStringLint,
};
pub use missing_properties::MissingPropertiesPass;
pub use syntax::SyntaxPass;
pub use type_mismatch::{TypeMismatchPass, infer_literal_type, is_compatible};
pub use unused_imports::UnusedImportsPass;
pub use unused_symbols::UnusedSymbolsPass;

// ============================================================================
// PASS INTERFACE
// ============================================================================

/// Input shared by every pass.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub document: &'a AnalyzedDocument,
    /// Other documents for cross-file lookups; `None` limits checks to
    /// what the document itself declares.
    pub workspace: Option<&'a dyn Workspace>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(document: &'a AnalyzedDocument) -> Self {
        Self {
            document,
            workspace: None,
        }
    }

    pub fn with_workspace(self, workspace: &'a dyn Workspace) -> Self {
        Self {
            workspace: Some(workspace),
            ..self
        }
    }

    /// The workspace, or an empty one.
    pub fn workspace(&self) -> &'a dyn Workspace {
        self.workspace.unwrap_or(&NoWorkspace)
    }
}

struct NoWorkspace;

impl Workspace for NoWorkspace {
    fn documents(&self) -> Vec<DocumentUri> {
        Vec::new()
    }

    fn read(&self, _uri: &str) -> Option<Arc<str>> {
        None
    }
}

/// A single validation check.
pub trait ValidationPass {
    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic>;
}

// ============================================================================
// PIPELINE
// ============================================================================

/// An ordered list of passes.
pub struct Pipeline {
    passes: Vec<Box<dyn ValidationPass + Send + Sync>>,
}

impl Pipeline {
    /// A pipeline with no passes.
    pub fn empty() -> Self {
        Self { passes: Vec::new() }
    }

    /// The default semantic passes, followed by the lint passes when
    /// `lints` is set.
    pub fn with_lints(lints: bool) -> Self {
        let pipeline = Self::empty()
            .with_pass(SyntaxPass)
            .with_pass(MissingPropertiesPass)
            .with_pass(TypeMismatchPass)
            .with_pass(UnusedSymbolsPass)
            .with_pass(UnusedImportsPass)
            .with_pass(DecoratorPass)
            .with_pass(DuplicateDeclarationPass);
        if !lints {
            return pipeline;
        }
        pipeline
            .with_pass(AssignmentInConditionLint)
            .with_pass(InfiniteLoopLint)
            .with_pass(UnclosedStringLint)
            .with_pass(CrossTypeComparisonLint)
            .with_pass(ImplicitAnyLint)
    }

    pub fn with_pass(mut self, pass: impl ValidationPass + Send + Sync + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass, isolating panics to the pass that raised them.
    pub fn run(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for pass in &self.passes {
            match catch_unwind(AssertUnwindSafe(|| pass.check(cx))) {
                Ok(found) => {
                    tracing::debug!(
                        pass = pass.name(),
                        count = found.len(),
                        "validation pass finished"
                    );
                    diagnostics.extend(found);
                }
                Err(_) => {
                    tracing::error!(
                        pass = pass.name(),
                        uri = %cx.document.uri,
                        "validation pass panicked"
                    );
                }
            }
        }
        diagnostics
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_lints(true)
    }
}

/// Run the default pipeline over `document`.
pub fn validate(document: &AnalyzedDocument, workspace: Option<&dyn Workspace>) -> Vec<Diagnostic> {
    let cx = ValidationContext { document, workspace };
    Pipeline::default().run(&cx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_size::TextRange;

    struct Exploding;

    impl ValidationPass for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }

        fn check(&self, _cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
            panic!("boom")
        }
    }

    struct Constant;

    impl ValidationPass for Constant {
        fn name(&self) -> &'static str {
            "constant"
        }

        fn check(&self, _cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
            vec![Diagnostic::warning(TextRange::default(), "always")]
        }
    }

    #[test]
    fn test_panicking_pass_is_isolated() {
        let doc = AnalyzedDocument::new("a.kite", "var x = 1");
        let pipeline = Pipeline::empty().with_pass(Exploding).with_pass(Constant);
        let diagnostics = pipeline.run(&ValidationContext::new(&doc));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(&*diagnostics[0].message, "always");
    }

    #[test]
    fn test_lints_can_be_disabled() {
        let with = Pipeline::with_lints(true).pass_names();
        let without = Pipeline::with_lints(false).pass_names();
        assert_eq!(with.len(), without.len() + 5);
        assert!(without.iter().all(|name| !name.starts_with("lint:")));
        assert_eq!(without[0], "syntax");
    }
}
