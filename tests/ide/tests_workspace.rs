//! Filesystem-backed workspaces.

use std::fs;

use kite::hir::codes;
use kite::ide::{AnalysisConfig, AnalysisHost};
use kite::project::{FsWorkspace, Workspace, WorkspaceError};
use tempfile::TempDir;

use crate::helpers::analysis_helpers::offset_of;

fn workspace_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, text) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, text).unwrap();
    }
    dir
}

fn uri(dir: &TempDir, path: &str) -> String {
    dir.path().join(path).to_string_lossy().replace('\\', "/")
}

#[test]
fn test_walk_finds_only_kite_files() {
    let dir = workspace_dir(&[
        ("main.kite", "var x = 1"),
        ("lib/net.kite", "schema Vpc {\n  string cidr\n}"),
        ("README.md", "# docs"),
    ]);
    let ws = FsWorkspace::load(dir.path()).unwrap();
    let documents = ws.documents();
    assert_eq!(documents.len(), 2);
    assert!(documents.iter().all(|d| d.ends_with(".kite")));
}

#[test]
fn test_file_limit_is_enforced() {
    let dir = workspace_dir(&[("a.kite", ""), ("b.kite", ""), ("c.kite", "")]);
    let result = FsWorkspace::load_with(dir.path(), "kite", 2);
    assert!(matches!(result, Err(WorkspaceError::TooManyFiles { limit: 2 })));
}

#[test]
fn test_open_buffer_shadows_disk() {
    let dir = workspace_dir(&[("main.kite", "var x = 1")]);
    let mut ws = FsWorkspace::load(dir.path()).unwrap();
    let main = uri(&dir, "main.kite");
    ws.open(main.as_str(), "var y = 2");
    assert_eq!(ws.read(&main).as_deref(), Some("var y = 2"));
    ws.close(&main);
    assert_eq!(ws.read(&main).as_deref(), Some("var x = 1"));
}

#[test]
fn test_host_uses_schemas_on_disk() {
    let dir = workspace_dir(&[("schemas/config.kite", "schema Config {\n  string host\n}")]);
    let config = AnalysisConfig::default().with_workspace_root(dir.path());
    let mut host = AnalysisHost::with_config(config).unwrap();
    let main = uri(&dir, "main.kite");
    host.set_document(main.as_str(), "resource Config c {}");
    let missing: Vec<_> = host
        .diagnostics(&main)
        .iter()
        .filter(|d| d.has_code(codes::MISSING_PROPERTY))
        .collect();
    assert_eq!(missing.len(), 1);

    let text = "resource Config c {}";
    let target = host
        .analysis()
        .goto_definition(&main, offset_of(text, "Config", 0))
        .unwrap();
    assert_eq!(target.uri.as_ref(), uri(&dir, "schemas/config.kite"));
}

#[test]
fn test_refresh_picks_up_new_files() {
    let dir = workspace_dir(&[("a.kite", "")]);
    let config = AnalysisConfig::default().with_workspace_root(dir.path());
    let mut host = AnalysisHost::with_config(config).unwrap();
    assert_eq!(host.documents().len(), 1);
    fs::write(dir.path().join("b.kite"), "schema B {\n  string x\n}").unwrap();
    host.refresh_workspace().unwrap();
    assert_eq!(host.documents().len(), 2);
}
