use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_FILENAME, CONFIG_SECTION, PACKAGE_JSON_FILENAME};

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The main configuration section for Neatify.
    pub neatify: NeatifyConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
/// Configuration options for Neatify.
pub struct NeatifyConfig {
    /// Rule ids run by the all-in-one pipeline, in order.
    pub rules: Option<Vec<String>>,
    /// Names that are never removed or renamed.
    #[serde(default)]
    pub ignore_names: Vec<String>,
    /// Regex; matching names are never removed or renamed.
    pub ignore_pattern: Option<String>,
    /// Leave exported declarations alone.
    pub keep_exported: Option<bool>,
    /// Re-parse every rewrite and reject it if it adds syntax errors.
    pub verify: Option<bool>,
    /// Additional folders to skip when walking directories.
    pub exclude_folders: Option<Vec<String>>,
}

impl NeatifyConfig {
    /// Whether exported declarations are protected (default: true).
    #[must_use]
    pub fn keep_exported(&self) -> bool {
        self.keep_exported.unwrap_or(true)
    }

    /// Whether rewrites are verified by re-parsing (default: true).
    #[must_use]
    pub fn verify(&self) -> bool {
        self.verify.unwrap_or(true)
    }

    /// Configured folder excludes, empty when unset.
    #[must_use]
    pub fn exclude_folders(&self) -> &[String] {
        self.exclude_folders.as_deref().unwrap_or_default()
    }
}

impl Config {
    /// Loads configuration from default locations (.neatify.toml or package.json in current dir).
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// A file that exists but cannot be parsed is reported through `tracing`
    /// and skipped, so a broken manifest never blocks a run.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            // 1. Try CONFIG_FILENAME
            let neatify_toml = current.join(CONFIG_FILENAME);
            if neatify_toml.exists() {
                match fs::read_to_string(&neatify_toml)
                    .map_err(|e| e.to_string())
                    .and_then(|content| Self::from_toml(&content).map_err(|e| e.to_string()))
                {
                    Ok(mut config) => {
                        config.config_file_path = Some(neatify_toml);
                        return config;
                    }
                    Err(error) => {
                        tracing::warn!(path = %neatify_toml.display(), %error, "ignoring unreadable config");
                    }
                }
            }

            // 2. Try PACKAGE_JSON_FILENAME
            let package_json = current.join(PACKAGE_JSON_FILENAME);
            if package_json.exists() {
                if let Ok(content) = fs::read_to_string(&package_json) {
                    match Self::from_package_json(&content) {
                        Ok(Some(neatify)) => {
                            return Config {
                                neatify,
                                config_file_path: Some(package_json),
                            };
                        }
                        Ok(None) => {}
                        Err(error) => {
                            tracing::debug!(path = %package_json.display(), %error, "package.json has no usable neatify section");
                        }
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }

    /// Extract the `"neatify"` section of a `package.json` document.
    ///
    /// # Errors
    /// Returns error if the document is not JSON or the section is malformed
    pub fn from_package_json(content: &str) -> Result<Option<NeatifyConfig>, serde_json::Error> {
        let mut manifest: serde_json::Value = serde_json::from_str(content)?;
        manifest
            .get_mut(CONFIG_SECTION)
            .map(|section| serde_json::from_value(section.take()))
            .transpose()
    }

    /// Parse a `.neatify.toml` document.
    ///
    /// # Errors
    /// Returns error if the document is not valid TOML or has unknown keys
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_path_no_config() {
        // Create an empty temp directory with no config files
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_path(dir.path());
        // Should return default config
        assert!(config.neatify.rules.is_none());
        assert!(config.neatify.keep_exported());
        assert!(config.neatify.verify());
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_load_from_path_neatify_toml() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join(".neatify.toml")).unwrap();
        writeln!(
            file,
            r#"[neatify]
rules = ["modernize-bindings"]
ignore_names = ["React"]
keep_exported = false
"#
        )
        .unwrap();

        let config = Config::load_from_path(dir.path());
        assert_eq!(
            config.neatify.rules,
            Some(vec!["modernize-bindings".to_owned()])
        );
        assert_eq!(config.neatify.ignore_names, vec!["React"]);
        assert!(!config.neatify.keep_exported());
        assert!(config.config_file_path.is_some());
    }

    #[test]
    fn test_load_from_path_package_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "app", "neatify": { "verify": false, "ignore_pattern": "^_" } }"#,
        )
        .unwrap();

        let config = Config::load_from_path(dir.path());
        assert!(!config.neatify.verify());
        assert_eq!(config.neatify.ignore_pattern.as_deref(), Some("^_"));
    }

    #[test]
    fn test_package_json_without_section_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{ "name": "app" }"#).unwrap();
        let config = Config::load_from_path(dir.path());
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_load_from_path_traverses_up() {
        // Create nested directory structure
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src").join("lib");
        std::fs::create_dir_all(&nested).unwrap();

        // Put config in root
        let mut file = std::fs::File::create(dir.path().join(".neatify.toml")).unwrap();
        writeln!(
            file,
            r#"[neatify]
exclude_folders = ["vendor"]
"#
        )
        .unwrap();

        // Load from nested path - should find config in parent
        let config = Config::load_from_path(&nested);
        assert_eq!(config.neatify.exclude_folders(), ["vendor".to_owned()]);
    }

    #[test]
    fn test_load_from_file_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".neatify.toml"), "[neatify]\nverify = false\n").unwrap();

        // Create a file in the directory
        let js_file = dir.path().join("index.js");
        std::fs::write(&js_file, "var x = 1;").unwrap();

        // Load from file path (not directory)
        let config = Config::load_from_path(&js_file);
        assert!(!config.neatify.verify());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_toml("[neatify]\nconfidence = 60\n").is_err());
    }
}
