//! Integration tests for the CLI
//!
//! Tests outline, generate, sync, complete and sync-header through `cargo run`

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const HEADER: &str = r#"#pragma once

namespace geo {

class Shape {
public:
    Shape();
    double area() const;
    void draw();
};

int count();

}
"#;

const SOURCE: &str = r#"#include "shape.h"

namespace geo {

Shape::Shape() {
}

double Shape::area() const {
    return 1.0;
}

void unused() {
}

}
"#;

/// Helper to create a test workspace with a header and its source
fn setup_test_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("shape.h"), HEADER).unwrap();
    fs::write(dir.path().join("shape.cpp"), SOURCE).unwrap();
    dir
}

fn run(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .unwrap()
}

fn path(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_str().unwrap().to_string()
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_help_lists_commands() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("outline"));
    assert!(stdout.contains("generate"));
    assert!(stdout.contains("sync-header"));
}

#[test]
fn test_outline_prints_json() {
    let workspace = setup_test_workspace();

    let output = run(&["outline", &path(&workspace, "shape.h")]);

    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["namespaces"][0]["name"], "geo");
    assert_eq!(tree["namespaces"][0]["classes"][0]["name"], "Shape");
}

#[test]
fn test_generate_to_stdout() {
    let workspace = setup_test_workspace();

    let output = run(&["generate", &path(&workspace, "shape.h"), "--mode", "source"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("#include \"shape.h\"\n"));
    assert!(stdout.contains("void geo::Shape::draw() {"));
    assert!(stdout.contains("int geo::count() {"));
}

#[test]
fn test_generate_range_keeps_selected_declaration() {
    let workspace = setup_test_workspace();
    let start = HEADER.find("void draw();").unwrap();
    let range = format!("{start}..{}", start + "void draw();".len());

    let output = run(&["generate", &path(&workspace, "shape.h"), "--range", &range]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("void geo::Shape::draw() {"));
    assert!(!stdout.contains("area"));
    assert!(!stdout.contains("count"));
}

#[test]
fn test_generate_rejects_bad_range() {
    let workspace = setup_test_workspace();

    let output = run(&["generate", &path(&workspace, "shape.h"), "--range", "9..3"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid range '9..3'"));
}

#[test]
fn test_generate_unknown_mode_fails() {
    let workspace = setup_test_workspace();

    let output = run(&["generate", &path(&workspace, "shape.h"), "--mode", "java"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown serialization mode 'java'"));
}

#[test]
fn test_sync_dry_run_leaves_file_alone() {
    let workspace = setup_test_workspace();

    let output = run(&[
        "sync",
        "--header",
        &path(&workspace, "shape.h"),
        "--source",
        &path(&workspace, "shape.cpp"),
        "--diff",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added to file"));
    assert!(stdout.contains("Removed from file"));
    assert!(stdout.contains("DRY RUN"));
    assert!(stdout.contains("+void Shape::draw() {"));
    assert_eq!(read(workspace.path().join("shape.cpp")), SOURCE);
}

#[test]
fn test_sync_apply_is_idempotent() {
    let workspace = setup_test_workspace();
    let args = [
        "sync",
        "--header",
        &path(&workspace, "shape.h"),
        "--source",
        &path(&workspace, "shape.cpp"),
        "--apply",
    ];

    let output = run(&args);
    assert!(output.status.success());
    let synced = read(workspace.path().join("shape.cpp"));
    assert!(synced.contains("void Shape::draw() {"));
    assert!(synced.contains("int count() {"));
    assert!(!synced.contains("unused"));
    assert!(synced.contains("    return 1.0;"));

    let output = run(&args);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("is up to date"));
    assert_eq!(read(workspace.path().join("shape.cpp")), synced);
}

#[test]
fn test_sync_keep_unmatched() {
    let workspace = setup_test_workspace();

    let output = run(&[
        "sync",
        "--header",
        &path(&workspace, "shape.h"),
        "--source",
        &path(&workspace, "shape.cpp"),
        "--keep-unmatched",
        "--apply",
    ]);

    assert!(output.status.success());
    let synced = read(workspace.path().join("shape.cpp"));
    assert!(synced.contains("void unused() {"));
    assert!(synced.contains("void Shape::draw() {"));
}

#[test]
fn test_sync_rejects_header_mode() {
    let workspace = setup_test_workspace();

    let output = run(&[
        "sync",
        "--header",
        &path(&workspace, "shape.h"),
        "--source",
        &path(&workspace, "shape.cpp"),
        "--mode",
        "header",
    ]);

    assert!(!output.status.success());
}

#[test]
fn test_sync_range_only_adds() {
    let workspace = setup_test_workspace();
    let start = HEADER.find("int count();").unwrap();
    let range = format!("{start}..{}", start + 4);

    let output = run(&[
        "sync",
        "--header",
        &path(&workspace, "shape.h"),
        "--source",
        &path(&workspace, "shape.cpp"),
        "--range",
        &range,
        "--apply",
    ]);

    assert!(output.status.success());
    let synced = read(workspace.path().join("shape.cpp"));
    assert!(synced.contains("int count() {"));
    assert!(synced.contains("void unused() {"));
    assert!(!synced.contains("draw"));
}

#[test]
fn test_complete_lists_missing_definitions() {
    let workspace = setup_test_workspace();
    let at = SOURCE.find("Shape::Shape").unwrap().to_string();

    let output = run(&[
        "complete",
        "--header",
        &path(&workspace, "shape.h"),
        "--source",
        &path(&workspace, "shape.cpp"),
        "--at",
        &at,
    ]);

    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["kind"], "definition");
    assert_eq!(entries[0]["label"], "int count()");
    assert_eq!(entries[1]["label"], "void Shape::draw()");
    assert_eq!(entries[1]["insert_text"], "void Shape::draw() {\n}");

    let output = run(&[
        "complete",
        "--header",
        &path(&workspace, "shape.h"),
        "--source",
        &path(&workspace, "shape.cpp"),
        "--at",
        "0",
    ]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}

#[test]
fn test_sync_header_adds_declaration() {
    let workspace = setup_test_workspace();
    fs::write(
        workspace.path().join("old.h"),
        "#pragma once\n\nnamespace geo {\n\nclass Shape {\npublic:\n    Shape();\n    double area() const;\n};\n\n}\n",
    )
    .unwrap();

    let output = run(&[
        "sync-header",
        "--from",
        &path(&workspace, "shape.h"),
        "--into",
        &path(&workspace, "old.h"),
        "--apply",
    ]);

    assert!(output.status.success());
    let synced = read(workspace.path().join("old.h"));
    assert!(synced.contains("    double area() const;\n    void draw();\n};"));
    assert!(synced.contains("int count();"));
}

#[test]
fn test_parse_error_exits_with_failure() {
    let workspace = setup_test_workspace();
    fs::write(
        workspace.path().join("broken.h"),
        "class Shape {\npublic:\n    ~Shape();\n    virtual ~Shape();\n};\n",
    )
    .unwrap();

    let output = run(&["outline", &path(&workspace, "broken.h")]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse"));
    assert!(stderr.contains("declares 2 destructors"));
}

#[test]
fn test_explicit_config_is_used() {
    let workspace = setup_test_workspace();
    fs::write(
        workspace.path().join("custom.toml"),
        "[source]\ninclude_header = false\n\n[file_header]\nsource = [\"// custom\"]\n",
    )
    .unwrap();

    let output = run(&[
        "--config",
        &path(&workspace, "custom.toml"),
        "generate",
        &path(&workspace, "shape.h"),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("// custom\n"));
    assert!(!stdout.contains("#include"));
}
