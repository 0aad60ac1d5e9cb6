//! Grammar selection from a file identity.

use crate::constants::SOURCE_EXTENSIONS;
use std::path::Path;
use tree_sitter::Language;

/// Source dialects understood by the parser adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceLanguage {
    /// Plain JavaScript (the grammar also accepts JSX).
    #[default]
    JavaScript,
    /// TypeScript without JSX.
    TypeScript,
    /// TypeScript with JSX.
    Tsx,
}

impl SourceLanguage {
    /// Detect language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Detect language from a file identity (a path or a virtual file name).
    ///
    /// Unknown extensions fall back to JavaScript, which is the most lenient
    /// grammar for the files an editor may hand us.
    pub fn from_identity(identity: &str) -> Self {
        Path::new(identity)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or_default()
    }

    /// Whether the path looks like a JavaScript/TypeScript source file.
    pub fn is_source_path(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            && !path.to_string_lossy().ends_with(".d.ts")
    }

    /// Get the tree-sitter language for this dialect.
    pub(crate) fn grammar(self) -> Language {
        match self {
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Short display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }
}
