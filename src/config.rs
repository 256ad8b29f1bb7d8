//! Compiler defaults loaded from `recipe.toml`.
//!
//! ```toml
//! dialect = "mysql"
//! default_schema = "analytics"
//! default_limit = 500
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RecipeError, RecipeResult};
use crate::transpiler::Dialect;

pub const CONFIG_FILE: &str = "recipe.toml";

/// Compiler configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Dialect used when neither the recipe nor the caller picks one.
    pub dialect: Dialect,

    /// Schema assumed for recipes that don't name one.
    pub default_schema: String,

    /// Pagination limit applied when the caller passes none.
    pub default_limit: Option<u64>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Postgres,
            default_schema: "public".to_string(),
            default_limit: None,
        }
    }
}

impl CompilerConfig {
    pub fn from_toml(content: &str) -> RecipeResult<Self> {
        toml::from_str(content).map_err(|e| RecipeError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> RecipeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from `explicit` if given, else the first of `./recipe.toml` and
    /// the user config directory that exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> RecipeResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("recipe-sql").join("config.toml"));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml() {
        let config = CompilerConfig::from_toml("dialect = \"sqlite\"\ndefault_limit = 50\n").unwrap();
        assert_eq!(config.dialect, Dialect::SQLite);
        assert_eq!(config.default_schema, "public");
        assert_eq!(config.default_limit, Some(50));
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(CompilerConfig::from_toml("").unwrap(), CompilerConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = CompilerConfig::from_toml("dialect = \"oracle\"").unwrap_err();
        assert!(matches!(err, RecipeError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = CompilerConfig::load(Some(Path::new("/nonexistent/recipe.toml"))).unwrap_err();
        assert!(matches!(err, RecipeError::Io(_)));
    }
}
