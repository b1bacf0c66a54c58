//! Settings loading: TOML file with environment variable overrides.
//!
//! Looks for `smarthub.toml` in the working directory unless another path is
//! given. Every field has a sensible default so the file is optional.
//! Environment variables take precedence over file values, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_PATH: &str = "smarthub.toml";

/// Top-level settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// File locations.
    pub storage: StorageSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Where the hub keeps its files.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON hub configuration (devices and routines).
    pub config_path: PathBuf,
    /// CSV durable event log.
    pub event_log_path: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Settings {
    /// Load settings from `path` (if present) then apply environment
    /// variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let mut settings = Self::from_file(path)?;
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(SettingsError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(SettingsError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SMARTHUB_CONFIG") {
            self.storage.config_path = val.into();
        }
        if let Some(val) = lookup("SMARTHUB_EVENT_LOG") {
            self.storage.event_log_path = val.into();
        }
        if let Some(val) = lookup("SMARTHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    /// Apply command-line flags, which win over file and environment.
    pub fn apply_cli_overrides(&mut self, config: Option<PathBuf>, event_log: Option<PathBuf>) {
        if let Some(path) = config {
            self.storage.config_path = path;
        }
        if let Some(path) = event_log {
            self.storage.event_log_path = path;
        }
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::Validation`] for empty paths, or when the
    /// configuration and the event log would share one file.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.storage.config_path.as_os_str().is_empty() {
            return Err(SettingsError::Validation("config_path must not be empty".to_string()));
        }
        if self.storage.event_log_path.as_os_str().is_empty() {
            return Err(SettingsError::Validation(
                "event_log_path must not be empty".to_string(),
            ));
        }
        if self.storage.config_path == self.storage.event_log_path {
            return Err(SettingsError::Validation(
                "config_path and event_log_path must differ".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("smarthub.json"),
            event_log_path: PathBuf::from("events.csv"),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

/// Settings errors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// TOML parse failure.
    #[error("failed to parse settings file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read settings file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid settings: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.storage.config_path, PathBuf::from("smarthub.json"));
        assert_eq!(settings.storage.event_log_path, PathBuf::from("events.csv"));
        assert_eq!(settings.logging.filter, "warn");
    }

    #[test]
    fn should_parse_minimal_toml() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.storage.config_path, PathBuf::from("smarthub.json"));
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [storage]
            config_path = 'data/home.json'
            event_log_path = 'data/events.csv'

            [logging]
            filter = 'debug'
        ";
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.storage.config_path, PathBuf::from("data/home.json"));
        assert_eq!(settings.storage.event_log_path, PathBuf::from("data/events.csv"));
        assert_eq!(settings.logging.filter, "debug");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [storage]
            event_log_path = 'log.csv'
        ";
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.storage.event_log_path, PathBuf::from("log.csv"));
        assert_eq!(settings.storage.config_path, PathBuf::from("smarthub.json"));
        assert_eq!(settings.logging.filter, "warn");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let settings = Settings::from_file(Path::new("nonexistent.toml")).unwrap();
        assert_eq!(settings.logging.filter, "warn");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_PATH);
        std::fs::write(&path, "invalid {{{").unwrap();
        assert!(matches!(
            Settings::from_file(&path),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn should_override_from_environment() {
        let mut settings = Settings::default();
        settings.apply_env_overrides(env(&[
            ("SMARTHUB_CONFIG", "/srv/hub.json"),
            ("SMARTHUB_EVENT_LOG", "/srv/events.csv"),
            ("SMARTHUB_LOG", "info"),
        ]));
        assert_eq!(settings.storage.config_path, PathBuf::from("/srv/hub.json"));
        assert_eq!(settings.storage.event_log_path, PathBuf::from("/srv/events.csv"));
        assert_eq!(settings.logging.filter, "info");
    }

    #[test]
    fn should_prefer_rust_log_over_smarthub_log() {
        let mut settings = Settings::default();
        settings.apply_env_overrides(env(&[("SMARTHUB_LOG", "info"), ("RUST_LOG", "trace")]));
        assert_eq!(settings.logging.filter, "trace");
    }

    #[test]
    fn should_prefer_cli_flags_over_environment() {
        let mut settings = Settings::default();
        settings.apply_env_overrides(env(&[("SMARTHUB_CONFIG", "/env.json")]));
        settings.apply_cli_overrides(Some(PathBuf::from("/cli.json")), None);
        assert_eq!(settings.storage.config_path, PathBuf::from("/cli.json"));
        assert_eq!(settings.storage.event_log_path, PathBuf::from("events.csv"));
    }

    #[test]
    fn should_accept_default_settings() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn should_reject_shared_file_for_config_and_log() {
        let mut settings = Settings::default();
        settings.storage.event_log_path = settings.storage.config_path.clone();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Validation(_))
        ));
    }

    #[test]
    fn should_reject_empty_path() {
        let mut settings = Settings::default();
        settings.storage.config_path = PathBuf::new();
        assert!(settings.validate().is_err());
    }
}
