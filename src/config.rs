//! Application configuration loaded from a TOML file.
//!
//! Every key is optional:
//!
//! ```toml
//! database_path = "/home/me/.local/share/codecards/progress.sqlite3"
//! catalog_path = "data/flashcards.json"
//! default_count = 5
//! write_attempts = 3
//! retry_backoff_ms = 200
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::RetryPolicy;

const APP_DIR: &str = "codecards";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub catalog_path: PathBuf,
    /// Deck size offered when none is given.
    pub default_count: usize,
    pub write_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: data_dir().join("progress.sqlite3"),
            catalog_path: PathBuf::from("data").join("flashcards.json"),
            default_count: 5,
            write_attempts: 3,
            retry_backoff_ms: 200,
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                debug!("Reading config from {}", path.display());
                Ok(toml::from_str(&contents)?)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.write_attempts.max(1),
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

pub fn default_config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path.push("config.toml");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_count, 5);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_count = 12\nwrite_attempts = 5\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.default_count, 12);
        assert_eq!(config.retry_policy().attempts, 5);
        assert_eq!(config.catalog_path, AppConfig::default().catalog_path);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_count = \"many\"").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let config = AppConfig {
            write_attempts: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.retry_policy().attempts, 1);
    }
}
