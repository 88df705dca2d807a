//! Configuration file
//!
//! ```json
//! {
//!   "data_dir": "./data",
//!   "storage": "memory",
//!   "analysis_mode": "incremental",
//!   "http": { "host": "0.0.0.0", "port": 54330, "cors_origins": [] },
//!   "log": { "format": "pretty", "level": "info" }
//! }
//! ```
//!
//! Every field has a default, so `{}` is a valid config.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::api::AnalysisMode;
use crate::http_server::HttpServerConfig;
use crate::observability::{LogFormat, LOG_LEVELS};

/// Store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,

    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the file backend
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub storage: StorageBackend,

    #[serde(default)]
    pub analysis_mode: AnalysisMode,

    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub log: LogConfig,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage: StorageBackend::default(),
            analysis_mode: AnalysisMode::default(),
            http: HttpServerConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty JSON
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let text = serde_json::to_string_pretty(self).map_err(|e| CliError::json(path, e))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
        }
        fs::write(path, text + "\n").map_err(|e| CliError::io(path, e))
    }

    fn validate(&self) -> CliResult<()> {
        let level = self.log.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(CliError::config(format!(
                "Invalid log.level: '{}'. Must be one of {}.",
                self.log.level,
                LOG_LEVELS.join(", ")
            )));
        }

        if self.http.port == 0 {
            return Err(CliError::config("http.port must be > 0"));
        }

        if self.storage == StorageBackend::File && self.data_dir.trim().is_empty() {
            return Err(CliError::config(
                "data_dir must not be empty when storage is 'file'",
            ));
        }

        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_object_is_all_defaults() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.http.port, 54330);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.analysis_mode, AnalysisMode::Incremental);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_json_str(
            r#"{
                "data_dir": "/var/lib/shapestat",
                "storage": "file",
                "analysis_mode": "recompute",
                "http": {"port": 8080},
                "log": {"format": "json", "level": "debug"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.analysis_mode, AnalysisMode::Recompute);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for raw in [
            r#"{"log": {"level": "loud"}}"#,
            r#"{"http": {"port": 0}}"#,
            r#"{"storage": "file", "data_dir": "  "}"#,
            r#"{"storage": "tape"}"#,
        ] {
            let err = Config::from_json_str(raw).unwrap_err();
            assert_eq!(err.code(), "SHAPE_CLI_CONFIG_ERROR", "{}", raw);
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("shapestat.json");
        let config = Config {
            storage: StorageBackend::File,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
