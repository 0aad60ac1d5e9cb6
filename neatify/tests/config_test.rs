//! Tests for configuration loading and its effect on the engine.
#![allow(clippy::unwrap_used)]

use neatify::config::Config;
use neatify::{Engine, RuleId};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_found_in_parent_directory() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".neatify.toml"),
        "[neatify]\nignore_names = [\"Legacy_Api\"]\n",
    )
    .unwrap();
    let nested = temp.path().join("src").join("components");
    fs::create_dir_all(&nested).unwrap();
    let file = nested.join("card.js");
    fs::write(&file, "var x = 1;\n").unwrap();

    let config = Config::load_from_path(&file);
    assert_eq!(config.neatify.ignore_names, vec!["Legacy_Api"]);
    assert_eq!(
        config.config_file_path.as_deref(),
        Some(temp.path().join(".neatify.toml").as_path())
    );
}

#[test]
fn test_neatify_toml_takes_precedence_over_package_json() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".neatify.toml"),
        "[neatify]\nverify = false\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("package.json"),
        r#"{ "neatify": { "keep_exported": false } }"#,
    )
    .unwrap();

    let config = Config::load_from_path(temp.path());
    assert!(!config.neatify.verify());
    assert!(config.neatify.keep_exported());
}

#[test]
fn test_unknown_keys_rejected() {
    assert!(Config::from_toml("[neatify]\nconfidence = 60\n").is_err());
}

#[test]
fn test_broken_config_falls_back_to_defaults() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".neatify.toml"), "[neatify\n").unwrap();
    let config = Config::load_from_path(temp.path());
    assert!(config.config_file_path.is_none());
    assert_eq!(config.neatify, Config::default().neatify);
}

#[test]
fn test_ignore_names_protect_from_rules() {
    let config =
        Config::from_toml("[neatify]\nignore_names = [\"my_flag\"]\nignore_pattern = \"^_\"\n")
            .unwrap();
    let engine = Engine::new(&config).unwrap();

    let source = "let my_flag = 1;\nlet _tmp = 2;\n";
    let removed = engine
        .run_rule(RuleId::UnusedVariables, source, "a.js")
        .unwrap();
    assert_eq!(removed.updated_text, source);

    let renamed = engine
        .run_rule(RuleId::Casing, "let my_flag = 1;\nuse(my_flag);\n", "a.js")
        .unwrap();
    assert_eq!(renamed.updated_text, "let my_flag = 1;\nuse(my_flag);\n");
}

#[test]
fn test_invalid_ignore_pattern_rejected() {
    let config = Config::from_toml("[neatify]\nignore_pattern = \"(\"\n").unwrap();
    assert!(Engine::new(&config).is_err());
}
