#[path = "helpers/mod.rs"]
mod helpers;

#[path = "hir/mod.rs"]
mod hir;

#[path = "ide/mod.rs"]
mod ide;

#[path = "parser/mod.rs"]
mod parser;

#[path = "validation/mod.rs"]
mod validation;
