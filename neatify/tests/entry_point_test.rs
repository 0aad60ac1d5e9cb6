//! Tests for `entry_point::run_with_args_to` argument handling.
#![allow(clippy::unwrap_used)]

use neatify::entry_point::run_with_args_to;
use std::fs;
use tempfile::tempdir;

fn run(args: &[&str]) -> (i32, String) {
    colored::control::set_override(false);
    let mut buffer = Vec::new();
    let code = run_with_args_to(args.iter().map(|&a| a.to_owned()).collect(), &mut buffer).unwrap();
    (code, String::from_utf8(buffer).unwrap())
}

#[test]
fn test_version_flag() {
    let (code, out) = run(&["--version"]);
    assert_eq!(code, 0);
    assert!(out.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_commands() {
    let (code, out) = run(&["--help"]);
    assert_eq!(code, 0);
    for command in ["run", "all", "summary", "rules", "init"] {
        assert!(out.contains(command), "missing {command}");
    }
}

#[test]
fn test_missing_subcommand_fails() {
    let (code, _) = run(&[]);
    assert_eq!(code, 1);
}

#[test]
fn test_rules_table() {
    let (code, out) = run(&["rules"]);
    assert_eq!(code, 0);
    assert!(out.contains("remove-unused-imports"));
    assert!(out.contains("modernize-bindings"));
}

#[test]
fn test_run_verbose_lists_changes() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.js");
    fs::write(&file, "import { a, b } from \"m\";\na();\n").unwrap();

    let (code, out) = run(&[
        "run",
        "remove-unused-imports",
        "--verbose",
        "--dry-run",
        file.to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    assert!(out.contains("[remove-unused-imports] Removed unused import(s): b"));
    assert!(out.contains("- b"));
    assert!(out.contains("-import { a, b } from \"m\";"));
    assert!(out.contains("+import { a } from \"m\";"));
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "import { a, b } from \"m\";\na();\n"
    );
}

#[test]
fn test_summary_json() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "var x = 1;\nfunction go() {}\n").unwrap();
    fs::write(dir.path().join("b.ts"), "const y: number = 2;\n").unwrap();

    let (code, out) = run(&["summary", "--json", dir.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["variable_names"][0], "x");
    assert_eq!(rows[0]["function_names"][0], "go");
    assert_eq!(rows[1]["variable_names"][0], "y");
}

#[test]
fn test_mcp_server_requires_cli_binary() {
    let (code, _) = run(&["mcp-server"]);
    assert_eq!(code, 1);
}
