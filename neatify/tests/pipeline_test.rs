//! Tests for chained runs, idempotence and the host session boundary.
#![allow(clippy::unwrap_used)]

use neatify::config::Config;
use neatify::cst::parse;
use neatify::host::{MemoryHost, Session, NO_EDITOR_NOTICE, OPTIMIZED_NOTICE};
use neatify::{Engine, NeatifyError, RuleId};
use pretty_assertions::assert_eq;

const MESSY: &str = "\
import { used, dead } from \"m\";
import stale from \"n\";
var my_total = used();
var scratch = 1;
function print_total() { console.log(my_total); }
print_total();
";

#[test]
fn test_run_all_applies_every_stage_in_order() {
    let report = Engine::default().run_all(MESSY, "app.js").unwrap();
    let rules: Vec<RuleId> = report.results.iter().map(|r| r.rule).collect();
    assert_eq!(rules, RuleId::ALL.to_vec());
    assert!(report.changed());

    let out = &report.updated_text;
    assert!(out.contains("import { used } from \"m\";"));
    assert!(!out.contains("stale"));
    assert!(!out.contains("scratch"));
    assert!(out.contains("let myTotal = used();"));
    assert!(out.contains("function printTotal() { console.log(myTotal); }"));
    assert!(out.contains("printTotal();"));
}

#[test]
fn test_run_all_output_parses_cleanly() {
    let report = Engine::default().run_all(MESSY, "app.js").unwrap();
    let tree = parse(&report.updated_text, "app.js").unwrap();
    assert_eq!(tree.error_count(), 0);
}

#[test]
fn test_each_rule_is_idempotent() {
    let engine = Engine::default();
    for rule in RuleId::ALL {
        let first = engine.run_rule(rule, MESSY, "app.js").unwrap();
        let second = engine.run_rule(rule, &first.updated_text, "app.js").unwrap();
        assert_eq!(second.updated_text, first.updated_text, "{rule} not idempotent");
        assert_eq!(second.edits_applied(), 0, "{rule} proposed edits twice");
    }
}

#[test]
fn test_run_all_is_idempotent() {
    let engine = Engine::default();
    let first = engine.run_all(MESSY, "app.js").unwrap();
    let second = engine.run_all(&first.updated_text, "app.js").unwrap();
    assert_eq!(second.updated_text, first.updated_text);
    assert!(!second.changed());
}

#[test]
fn test_typescript_sources() {
    let source = "import { Foo, Bar } from \"./types\";\nvar item_count: Foo = make();\nuse(item_count);\n";
    let report = Engine::default().run_all(source, "model.ts").unwrap();
    assert_eq!(
        report.updated_text,
        "import { Foo } from \"./types\";\nlet itemCount: Foo = make();\nuse(itemCount);\n"
    );
}

#[test]
fn test_configured_pipeline_subset() {
    let config = Config::from_toml("[neatify]\nrules = [\"modernize-bindings\"]\n").unwrap();
    let engine = Engine::new(&config).unwrap();
    let report = engine.run_all("var my_x = 1;\n", "a.js").unwrap();
    assert_eq!(report.updated_text, "let my_x = 1;\n");
    assert_eq!(report.results.len(), 1);
}

#[test]
fn test_unknown_configured_rule_rejected() {
    let config = Config::from_toml("[neatify]\nrules = [\"shout\"]\n").unwrap();
    let err = Engine::new(&config).unwrap_err();
    assert!(matches!(err, NeatifyError::UnknownRule(_)));
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn test_session_without_snapshot_notifies() {
    let engine = Engine::default();
    let mut host = MemoryHost::empty();
    let outcome = Session::new(&engine).run_all(&mut host).unwrap();
    assert!(outcome.is_none());
    assert_eq!(host.notices(), [NO_EDITOR_NOTICE]);
    assert_eq!(host.applied(), 0);
}

#[test]
fn test_session_run_all_commits_once() {
    let engine = Engine::default();
    let mut host = MemoryHost::new(MESSY, "app.js");
    let report = Session::new(&engine).run_all(&mut host).unwrap().unwrap();
    assert_eq!(host.applied(), 1);
    assert_eq!(host.text(), Some(report.updated_text.as_str()));
    assert_eq!(host.notices().len(), RuleId::ALL.len() + 1);
    assert_eq!(host.notices().last().map(String::as_str), Some(OPTIMIZED_NOTICE));
}

#[test]
fn test_session_rejected_edit_leaves_text() {
    let engine = Engine::default();
    let mut host = MemoryHost::new("var a = 1;\n", "a.js").rejecting_edits();
    let err = Session::new(&engine)
        .run_rule(&mut host, RuleId::Bindings)
        .unwrap_err();
    assert!(matches!(err, NeatifyError::Sink(_)));
    assert_eq!(host.text(), Some("var a = 1;\n"));
    assert!(host.notices()[0].starts_with("Could not apply edits"));
}

#[test]
fn test_session_summary() {
    let engine = Engine::default();
    let mut host = MemoryHost::new("let count = 1;\nfunction bump() {}\n", "a.js");
    let summary = Session::new(&engine)
        .summarize_declarations(&mut host)
        .unwrap()
        .unwrap();
    assert_eq!(summary.variable_names, vec!["count"]);
    assert_eq!(summary.function_names, vec!["bump"]);
    assert_eq!(host.notices(), ["Variables: count | Functions: bump"]);
}
