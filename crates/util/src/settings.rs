//! Settings persistence for the Paddock CLI/TUI.
//!
//! A small JSON file (`~/.config/paddock/settings.json` on most platforms)
//! holds the knobs a user may want to keep between runs. Missing fields fall
//! back to defaults, and a malformed file is reported and ignored rather than
//! aborting startup. A couple of environment variables override the file for
//! one-off runs.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::path_processing::{config_file_path, expand_tilde};

/// Environment variable allowing callers to override the settings file path.
pub const SETTINGS_PATH_ENV: &str = "PADDOCK_SETTINGS_PATH";

/// Overrides [`PaddockSettings::debounce_ms`].
pub const DEBOUNCE_MS_ENV: &str = "PADDOCK_DEBOUNCE_MS";

/// Overrides [`PaddockSettings::latency_ms`].
pub const LATENCY_MS_ENV: &str = "PADDOCK_LATENCY_MS";

/// Default filename for the JSON payload.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

const DEFAULT_DEBOUNCE_MS: u64 = 300;
const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Error surfaced when reading or writing settings fails.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted settings values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddockSettings {
    /// Quiet period before a typeahead fetch is issued, in milliseconds.
    pub debounce_ms: u64,
    /// Maximum number of suggestions the registry returns per lookup.
    pub suggestion_limit: usize,
    /// Artificial latency added to every registry lookup, in milliseconds.
    pub latency_ms: u64,
    /// Registry data file. The embedded sample stable is used when absent.
    pub data_path: Option<PathBuf>,
}

impl Default for PaddockSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            latency_ms: 0,
            data_path: None,
        }
    }
}

impl PaddockSettings {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = Self::load_from(&default_settings_path())?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Load from `path` without consulting the environment.
    ///
    /// A missing file yields defaults. So does a file that fails to parse,
    /// after logging a warning.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<Self>(&data) {
                Ok(mut settings) => {
                    settings.data_path = settings.data_path.map(|p| expand_tilde(&p.to_string_lossy()));
                    debug!(path = %path.display(), "loaded settings");
                    Ok(settings)
                }
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse settings file; using defaults"
                    );
                    Ok(Self::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(SettingsError::Io(error)),
        }
    }

    /// Apply `PADDOCK_DEBOUNCE_MS` and `PADDOCK_LATENCY_MS` when set.
    /// Unparseable values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = millis_from_env(DEBOUNCE_MS_ENV) {
            self.debounce_ms = value;
        }
        if let Some(value) = millis_from_env(LATENCY_MS_ENV) {
            self.latency_ms = value;
        }
    }

    /// Write the settings as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

/// Settings file location, honoring [`SETTINGS_PATH_ENV`].
pub fn default_settings_path() -> PathBuf {
    if let Ok(path) = env::var(SETTINGS_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }
    config_file_path(SETTINGS_FILE_NAME)
}

fn millis_from_env(name: &str) -> Option<u64> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(variable = name, value = %raw, error = %error, "ignoring invalid millisecond override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = PaddockSettings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, PaddockSettings::default());
        assert_eq!(settings.debounce_ms, 300);
        assert_eq!(settings.suggestion_limit, 5);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(PaddockSettings::load_from(&path).unwrap(), PaddockSettings::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{ "latency_ms": 800 }"#).unwrap();

        let settings = PaddockSettings::load_from(&path).unwrap();
        assert_eq!(settings.latency_ms, 800);
        assert_eq!(settings.debounce_ms, 300);
        assert!(settings.data_path.is_none());
    }

    #[test]
    fn saved_settings_are_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);
        let settings = PaddockSettings {
            debounce_ms: 150,
            suggestion_limit: 3,
            latency_ms: 40,
            data_path: Some(PathBuf::from("/srv/stable.json")),
        };
        settings.save_to(&path).unwrap();
        assert_eq!(PaddockSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn env_overrides_replace_file_values() {
        temp_env::with_vars(
            [(DEBOUNCE_MS_ENV, Some("50")), (LATENCY_MS_ENV, Some("not-a-number"))],
            || {
                let mut settings = PaddockSettings { latency_ms: 25, ..PaddockSettings::default() };
                settings.apply_env_overrides();
                assert_eq!(settings.debounce_ms, 50);
                assert_eq!(settings.latency_ms, 25);
            },
        );
    }

    #[test]
    fn settings_path_env_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{ "suggestion_limit": 9 }"#).unwrap();

        temp_env::with_vars(
            [
                (SETTINGS_PATH_ENV, Some(path.to_string_lossy().to_string())),
                (DEBOUNCE_MS_ENV, None),
                (LATENCY_MS_ENV, None),
            ],
            || {
                assert_eq!(default_settings_path(), path);
                let settings = PaddockSettings::load().unwrap();
                assert_eq!(settings.suggestion_limit, 9);
            },
        );
    }
}
