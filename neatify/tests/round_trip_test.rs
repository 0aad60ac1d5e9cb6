//! Every rule, run alone, must leave a file that parses at least as cleanly.
#![allow(clippy::unwrap_used)]

use neatify::cst::parse;
use neatify::{Engine, RuleId};
use proptest::prelude::*;

const FIXTURES: &[(&str, &str)] = &[
    (
        "nested.js",
        "const a = 1, handler = () => { const tmp = 2; return 3; };\nhandler();\n",
    ),
    (
        "strict.js",
        "export {};\nconst _private = 1;\nuse(_private);\n",
    ),
    (
        "keywords.js",
        "let _class = 2; let my_var = 3; use(_class, my_var);\nlet _new = 1, _arguments = 2;\nuse(_new, _arguments);\n",
    ),
    (
        "shorthand.js",
        "const my_val = 1;\nconst o = { my_val };\nconst { first_name } = o;\nexport { my_val };\nuse(first_name);\n",
    ),
    (
        "panel.tsx",
        "import React, { useState } from \"react\";\nexport function Panel() {\n  var open_state = useState(false);\n  const unused_thing = 1;\n  return <div>{open_state}</div>;\n}\n",
    ),
    (
        "model.ts",
        "import type { Props } from \"./p\";\nvar item_count: number = 1, spare = 2;\nfunction render_item(p: Props) { return item_count; }\nrender_item({});\n",
    ),
    (
        "loops.js",
        "for (var i = 0; i < 3; i++) { var inner_val = i; }\nswitch (x) { case 1: let case_val = 2; break; }\n",
    ),
    (
        "comments.js",
        "// header\nimport a from \"a\"; // trailing\n/* block */ var b_c = 1, d = 2;\nuse(d);\n",
    ),
];

fn assert_round_trip(engine: &Engine, rule: RuleId, identity: &str, source: &str) {
    let before = parse(source, identity).unwrap().error_count();
    let report = engine
        .run_rule(rule, source, identity)
        .unwrap_or_else(|e| panic!("{rule} failed on {identity}: {e}"));
    let after = parse(&report.updated_text, identity).unwrap().error_count();
    assert!(
        after <= before,
        "{rule} added syntax errors to {identity}:\n{}",
        report.updated_text
    );
}

#[test]
fn test_each_rule_keeps_fixtures_parseable() {
    let engine = Engine::default();
    for (identity, source) in FIXTURES {
        for rule in RuleId::ALL {
            assert_round_trip(&engine, rule, identity, source);
        }
    }
}

#[test]
fn test_run_all_keeps_fixtures_parseable() {
    let engine = Engine::default();
    for (identity, source) in FIXTURES {
        let report = engine.run_all(source, identity).unwrap();
        assert_eq!(
            parse(&report.updated_text, identity).unwrap().error_count(),
            0,
            "{identity}:\n{}",
            report.updated_text
        );
    }
}

#[test]
fn test_deeply_nested_source_fails_without_aborting() {
    let depth = 10_000;
    let source = format!("let x = {}1{};\n", "[".repeat(depth), "]".repeat(depth));
    for rule in RuleId::ALL {
        assert!(Engine::default().run_rule(rule, &source, "deep.js").is_err());
    }
}

const INITIALIZERS: &[&str] = &[
    "1",
    "[1, 2]",
    "{ a: 1 }",
    "() => { const tmp_val = 2; return 3; }",
    "function () { var inner_x = 1; return 2; }",
];

/// A multi-declarator statement followed by a call using some of its names.
fn declarator_list() -> impl Strategy<Value = String> {
    let keyword = prop::sample::select(vec!["let", "var", "const"]);
    let declarators = prop::collection::vec(
        (prop::sample::select(INITIALIZERS.to_vec()), any::<bool>()),
        1..5,
    );
    (keyword, declarators).prop_map(|(keyword, declarators)| {
        let list: Vec<String> = declarators
            .iter()
            .enumerate()
            .map(|(i, (init, _))| format!("item_{i} = {init}"))
            .collect();
        let used: Vec<String> = declarators
            .iter()
            .enumerate()
            .filter(|(_, (_, used))| *used)
            .map(|(i, _)| format!("item_{i}"))
            .collect();
        format!("{keyword} {};\nuse({});\n", list.join(", "), used.join(", "))
    })
}

proptest! {
    #[test]
    fn declarator_lists_stay_parseable(source in declarator_list()) {
        let engine = Engine::default();
        for rule in RuleId::ALL {
            let report = engine.run_rule(rule, &source, "gen.js");
            prop_assert!(report.is_ok(), "{} failed on {:?}: {:?}", rule, source, report.err());
            let updated = report.unwrap().updated_text;
            prop_assert_eq!(parse(&updated, "gen.js").unwrap().error_count(), 0);
        }
    }
}
