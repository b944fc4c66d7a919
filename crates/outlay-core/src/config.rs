//! Configuration loading
//!
//! Configuration is read from TOML. The lookup order is an explicit path,
//! then `<config dir>/outlay/config.toml`, then the built-in defaults.
//!
//! ```toml
//! [database]
//! path = "/home/me/outlay.db"
//!
//! [pagination]
//! default_page_size = 10
//! max_page_size = 100
//!
//! [logging]
//! level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Page size when a listing does not ask for one
    pub default_page_size: u32,
    /// Upper bound for requested page sizes
    pub max_page_size: u32,
    /// Log level used when neither RUST_LOG nor --verbose is given
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("outlay.db"),
            default_page_size: 10,
            max_page_size: 100,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    database: Option<RawDatabase>,
    pagination: Option<RawPagination>,
    logging: Option<RawLogging>,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawPagination {
    default_page_size: Option<u32>,
    max_page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawLogging {
    level: Option<String>,
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("outlay").join("config.toml"))
}

impl Config {
    /// Load from an explicit path, else the default location, else defaults.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(p) => p,
                None => {
                    debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!(path = %path.display(), "Loading config");
        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    /// Parse TOML content over the defaults; unknown keys are ignored
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(path) = raw.database.and_then(|d| d.path) {
            config.database_path = path;
        }

        if let Some(pagination) = raw.pagination {
            if let Some(size) = pagination.default_page_size {
                config.default_page_size = size;
            }
            if let Some(max) = pagination.max_page_size {
                config.max_page_size = max;
            }
        }

        if let Some(level) = raw.logging.and_then(|l| l.level) {
            config.log_level = level;
        }

        if config.default_page_size == 0 || config.max_page_size == 0 {
            return Err(Error::Config("Page sizes must be greater than 0".to_string()));
        }
        if config.default_page_size > config.max_page_size {
            return Err(Error::Config(format!(
                "default_page_size ({}) exceeds max_page_size ({})",
                config.default_page_size, config.max_page_size
            )));
        }

        Ok(config)
    }

    /// Requested page size capped at `max_page_size`, or the default
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [pagination]
            max_page_size = 50

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.database_path, PathBuf::from("outlay.db"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = Config::parse("[database]\npath = \"x.db\"\ncolor = \"blue\"\n").unwrap();
        assert_eq!(config.database_path, PathBuf::from("x.db"));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            Config::parse("[pagination\nmax = "),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_inconsistent_page_sizes() {
        assert!(Config::parse("[pagination]\ndefault_page_size = 0").is_err());
        assert!(Config::parse("[pagination]\ndefault_page_size = 200").is_err());
    }

    #[test]
    fn test_page_size_clamp() {
        let config = Config::default();
        assert_eq!(config.page_size(None), 10);
        assert_eq!(config.page_size(Some(0)), 0);
        assert_eq!(config.page_size(Some(500)), 100);
        assert_eq!(config.page_size(Some(25)), 25);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"/tmp/outlay-test.db\"").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/outlay-test.db"));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(Error::Config(_))
        ));
    }
}
