//! IDE features: high-level APIs for editor requests.
//!
//! This module sits between the semantic layer (HIR + validation) and an
//! editor integration. Each function answers one editor request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: Take data in, return data out
//! 2. **No LSP types**: Byte ranges and our own types, converted at the boundary
//! 3. **Composable**: Built on the resolver and the validation payloads
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use kite::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! host.set_document("main.kite", "var x = 1\nvar y = x");
//!
//! let analysis = host.analysis();
//! let refs = analysis.find_references("main.kite", TextSize::from(4));
//! ```

mod analysis;
mod code_actions;
mod goto;
mod references;

pub use analysis::{Analysis, AnalysisConfig, AnalysisHost};
pub use code_actions::{CodeAction, CodeActionKind, code_actions, default_value};
pub use goto::goto_definition;
pub use references::{RenameError, TextEdit, WorkspaceEdit, find_references, rename};
