//! Host configuration read from `agri_chat.ron` in the working directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use agri_chat_engine::{ClientSettings, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const CONFIG_FILENAME: &str = "agri_chat.ron";
pub const BASE_URL_ENV: &str = "AGRI_CHAT_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub history_dir: PathBuf,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            history_dir: PathBuf::from("./.agri_chat"),
            log_destination: LogDestination::File,
        }
    }
}

impl AppConfig {
    /// Loads the config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_env_overrides(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.base_url = url;
        }
        self
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(base_url: "http://farm.example/", request_timeout_secs: 5, log_destination: Both)"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "http://farm.example/");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(
            config.client_settings().request_timeout,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(base_url: 42").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn env_override_replaces_base_url() {
        let config = AppConfig::default().with_env_overrides(Some("http://10.0.0.2:8000".into()));
        assert_eq!(config.base_url, "http://10.0.0.2:8000");
        let config = AppConfig::default().with_env_overrides(Some("  ".into()));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
