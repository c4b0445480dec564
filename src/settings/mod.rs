//! User settings.
//!
//! Settings live in a JSON file, `breathwork/settings.json` under the
//! platform configuration directory, or wherever `BREATHWORK_CONFIG`
//! points. Every field has a default, so a missing file or a partial file
//! is fine.

mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::SettingsError;

use crate::patterns::DEFAULT_PATTERN;
use crate::session::{ControllerOptions, DEFAULT_PRE_ROLL_SECONDS, DEFAULT_RESUME_CUE_THRESHOLD};
use crate::sound::CueSources;

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV_VAR: &str = "BREATHWORK_CONFIG";

const APP_DIR: &str = "breathwork";
const SETTINGS_FILE: &str = "settings.json";

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

fn default_sound_enabled() -> bool {
    true
}

fn default_resume_cue_threshold_ms() -> u64 {
    DEFAULT_RESUME_CUE_THRESHOLD.as_millis() as u64
}

fn default_pre_roll_seconds() -> u32 {
    DEFAULT_PRE_ROLL_SECONDS
}

/// Optional cue file overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueFiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inhale: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhale: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<PathBuf>,
}

/// Persistent user preferences.
///
/// # Example
///
/// ```
/// use breathwork::settings::Settings;
///
/// let settings: Settings = serde_json::from_str(r#"{"sound_enabled": false}"#).unwrap();
/// assert!(!settings.sound_enabled);
/// assert_eq!(settings.default_pattern, "box");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Preset used when `start` is given no pattern
    #[serde(default = "default_pattern")]
    pub default_pattern: String,

    /// Whether cues are played
    #[serde(default = "default_sound_enabled")]
    pub sound_enabled: bool,

    /// Audio files replacing the built-in tones
    #[serde(default)]
    pub cue_files: CueFiles,

    /// Resuming this close to a phase start replays its cue
    #[serde(default = "default_resume_cue_threshold_ms")]
    pub resume_cue_threshold_ms: u64,

    /// Length of the 3-2-1 countdown; 0 disables it
    #[serde(default = "default_pre_roll_seconds")]
    pub pre_roll_seconds: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_pattern: default_pattern(),
            sound_enabled: default_sound_enabled(),
            cue_files: CueFiles::default(),
            resume_cue_threshold_ms: default_resume_cue_threshold_ms(),
            pre_roll_seconds: default_pre_roll_seconds(),
        }
    }
}

impl Settings {
    /// Returns the settings file location.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::ConfigDirNotFound` if neither the override
    /// variable nor a platform configuration directory is available.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }
        let dir = dirs::config_dir().ok_or(SettingsError::ConfigDirNotFound)?;
        Ok(dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Loads settings from the default location.
    ///
    /// # Errors
    ///
    /// See [`Settings::load_from`].
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Loads settings from `path`, using defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(io_err)?;

        debug!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Controller options derived from these settings.
    #[must_use]
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            pre_roll_seconds: self.pre_roll_seconds,
            resume_cue_threshold: Duration::from_millis(self.resume_cue_threshold_ms),
        }
    }

    /// Cue sources derived from the configured files.
    #[must_use]
    pub fn cue_sources(&self) -> CueSources {
        CueSources::from_files(
            self.cue_files.inhale.as_deref(),
            self.cue_files.exhale.as_deref(),
            self.cue_files.completion.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CueId;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.default_pattern, "box");
        assert!(settings.sound_enabled);
        assert_eq!(settings.cue_files, CueFiles::default());
        assert_eq!(settings.resume_cue_threshold_ms, 1_000);
        assert_eq!(settings.pre_roll_seconds, 3);
    }

    #[test]
    fn test_deserialize_empty_json() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_deserialize_partial_json() {
        let json = r#"{
            "default_pattern": "calm",
            "cue_files": { "inhale": "/cues/in.wav" },
            "pre_roll_seconds": 0
        }"#;

        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.default_pattern, "calm");
        assert_eq!(settings.cue_files.inhale, Some(PathBuf::from("/cues/in.wav")));
        assert_eq!(settings.cue_files.exhale, None);
        assert_eq!(settings.pre_roll_seconds, 0);
        assert!(settings.sound_enabled);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let json = r#"{"resume_cue_threshold_ms": -5}"#;
        assert!(serde_json::from_str::<Settings>(json).is_err());
    }

    #[test]
    fn test_serialize_skips_unset_cue_files() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(json.contains("\"cue_files\":{}"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            default_pattern: "deep".to_string(),
            sound_enabled: false,
            ..Settings::default()
        };

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();

        assert!(err.is_parse_error());
    }

    #[test]
    fn test_controller_options() {
        let settings = Settings {
            resume_cue_threshold_ms: 250,
            pre_roll_seconds: 5,
            ..Settings::default()
        };

        let options = settings.controller_options();

        assert_eq!(options.pre_roll_seconds, 5);
        assert_eq!(options.resume_cue_threshold, Duration::from_millis(250));
    }

    #[test]
    fn test_cue_sources_from_files() {
        let settings = Settings {
            cue_files: CueFiles {
                completion: Some(PathBuf::from("/cues/gong.mp3")),
                ..CueFiles::default()
            },
            ..Settings::default()
        };

        let sources = settings.cue_sources();

        assert_eq!(sources.get(CueId::Completion).name(), "gong");
        assert!(sources.get(CueId::Inhale).is_embedded());
    }
}
