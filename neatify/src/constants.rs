use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Name of the dedicated configuration file.
pub const CONFIG_FILENAME: &str = ".neatify.toml";

/// Name of the npm manifest that may carry a `"neatify"` section.
pub const PACKAGE_JSON_FILENAME: &str = "package.json";

/// Key of the configuration section in either file.
pub const CONFIG_SECTION: &str = "neatify";

/// Keyword that replaces `var`.
pub const BLOCK_SCOPED_KEYWORD: &str = "let";

/// Folders skipped by default when walking directories.
pub const DEFAULT_EXCLUDE_FOLDERS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "coverage",
    "out",
    ".git",
    ".next",
    ".nuxt",
    ".cache",
    ".turbo",
];

/// Deepest syntax tree the engine builds; deeper sources fail to parse.
pub const MAX_NESTING_DEPTH: usize = 512;

/// File extensions the engine knows how to parse.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

/// Regex for compliant camelCase names: a lowercase letter, then letters or digits.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_camel_case_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$").expect("Invalid camelCase regex pattern"))
}

/// Regex for a hyphen or underscore followed by the character it folds into.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_word_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"[-_](.)").expect("Invalid word boundary regex pattern"))
}

/// Words a renamed binding must never become: ES keywords, literals and the
/// names strict-mode code refuses as bindings.
pub const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "implements", "interface", "let",
    "package", "private", "protected", "public", "static", "yield", "await", "arguments", "eval",
];

/// Set of reserved words.
pub fn get_reserved_words() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| RESERVED_WORDS.iter().copied().collect())
}

/// Set of default-excluded folder names.
pub fn get_default_excludes() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| DEFAULT_EXCLUDE_FOLDERS.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_re() {
        let re = get_camel_case_re();
        assert!(re.is_match("myFunc"));
        assert!(re.is_match("a1"));
        assert!(!re.is_match("my_func"));
        assert!(!re.is_match("MyFunc"));
        assert!(!re.is_match("$el"));
    }

    #[test]
    fn test_reserved_words() {
        let words = get_reserved_words();
        for word in ["class", "new", "private", "arguments", "eval", "await"] {
            assert!(words.contains(word), "{word}");
        }
        assert!(!words.contains("value"));
        assert!(!words.contains("async"));
    }

    #[test]
    fn test_default_excludes() {
        assert!(get_default_excludes().contains("node_modules"));
        assert!(!get_default_excludes().contains("src"));
    }
}
