//! Configuration handling for carlens.
//!
//! Read from `config.toml` in the config directory, or from the file given
//! with `--config`. A missing file means defaults; every section and field
//! may be omitted.

use anyhow::{Context, Result};
use carlens_core::DEFAULT_LIMIT;
use carlens_extract::OcrConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "cars.db";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Query configuration
    #[serde(default)]
    pub query: QueryConfig,

    /// OCR configuration
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which [`CarStore`](carlens_core::CarStore) backs the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    /// Nothing survives the process
    Memory,
}

/// Store-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database file, defaults to `cars.db` in the data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Query-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Result limit when a query names none
    #[serde(default = "default_limit")]
    pub default_limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, overridden by `--verbose`
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A file that does not exist yields the defaults.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        let Some(path) = path.or_else(Self::config_path) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid config in {}", path.display()))
    }

    fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Path of the default config file.
    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Database file used by the SQLite backend.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.store.path {
            return Ok(path.clone());
        }
        let data = data_dir().context("Failed to get data directory")?;
        Ok(data.join(DATABASE_FILE))
    }

    /// A commented config file with every default spelled out.
    pub fn sample_toml() -> &'static str {
        r#"# carlens configuration

[store]
# "sqlite" or "memory"
backend = "sqlite"
# Defaults to cars.db in the data directory
# path = "/var/lib/carlens/cars.db"

[query]
# Results returned when a query does not say how many
default_limit = 10

[ocr]
command = "tesseract"
languages = "por+eng"

[logging]
level = "info"
"#
    }
}

/// Get the XDG data directory for carlens.
pub fn data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("CARLENS_DATA_DIR") {
        return Some(PathBuf::from(dir));
    }

    ProjectDirs::from("", "", "carlens").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Get the XDG config directory for carlens.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("CARLENS_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }

    ProjectDirs::from("", "", "carlens").map(|dirs| dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert!(config.store.path.is_none());
        assert_eq!(config.query.default_limit, 10);
        assert_eq!(config.ocr.command, "tesseract");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_sample_toml_matches_defaults() {
        let config = Config::parse(Config::sample_toml()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.store.backend, defaults.store.backend);
        assert_eq!(config.query.default_limit, defaults.query.default_limit);
        assert_eq!(config.ocr.languages, defaults.ocr.languages);
        assert_eq!(config.logging.level, defaults.logging.level);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse("[query]\ndefault_limit = 3\n\n[store]\nbackend = \"memory\"\n")
            .unwrap();
        assert_eq!(config.query.default_limit, 3);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.ocr.command, "tesseract");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(Config::parse("[store]\nbackend = \"postgres\"\n").is_err());
        assert!(Config::parse("not toml at all [").is_err());
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.query.default_limit, 10);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[store]\npath = \"/tmp/elsewhere.db\"\n").unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/elsewhere.db")
        );
    }

    #[test]
    fn test_load_from_bad_file_names_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[query]\ndefault_limit = \"ten\"\n").unwrap();

        let err = Config::load_from(Some(path.clone())).unwrap_err();
        assert!(format!("{err:#}").contains(&path.display().to_string()));
    }
}
