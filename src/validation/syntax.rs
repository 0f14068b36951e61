use super::{ValidationContext, ValidationPass};
use crate::hir::{Diagnostic, codes};

/// Surfaces parse errors as diagnostics.
pub struct SyntaxPass;

impl ValidationPass for SyntaxPass {
    fn name(&self) -> &'static str {
        "syntax"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        cx.document
            .parse
            .errors
            .iter()
            .map(|error| {
                Diagnostic::error(error.range, error.message.as_str())
                    .with_code(codes::SYNTAX_ERROR)
            })
            .collect()
    }
}
