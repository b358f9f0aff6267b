use crate::core::crc32::InputMode;
use crate::core::storage::StorageUnit;
use crate::core::timer::{FrequencyUnit, TimeUnit};
use crate::utils::{ensure_data_dir, get_data_dir};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

/// How command results are printed
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Defaults applied when a CLI flag is not given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub crc_input_mode: InputMode,
    #[serde(default)]
    pub storage_unit: StorageUnit,
    /// Unit for `--clock` values
    #[serde(default = "default_clock_unit")]
    pub clock_unit: FrequencyUnit,
    /// Unit for `--target` values
    #[serde(default)]
    pub target_unit: FrequencyUnit,
    #[serde(default)]
    pub time_unit: TimeUnit,
    /// PWM duty cycle in percent when `--duty` is omitted
    #[serde(default = "default_duty_percent")]
    pub duty_percent: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::default(),
            crc_input_mode: InputMode::default(),
            storage_unit: StorageUnit::default(),
            clock_unit: default_clock_unit(),
            target_unit: FrequencyUnit::default(),
            time_unit: TimeUnit::default(),
            duty_percent: default_duty_percent(),
        }
    }
}

fn default_clock_unit() -> FrequencyUnit {
    FrequencyUnit::MHz
}

fn default_duty_percent() -> f64 {
    50.0
}

/// Location of the persisted config, if a data directory exists.
pub fn config_path() -> Option<PathBuf> {
    get_data_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Saves the config to the data directory.
///
/// See [`save_config_to`] for the write procedure.
pub fn save_config(config: &AppConfig) -> std::io::Result<PathBuf> {
    let path = ensure_data_dir()?.join(CONFIG_FILE);
    save_config_to(config, &path)?;
    Ok(path)
}

/// Saves the config to `path` using an atomic write pattern.
/// 1. Writes to a temporary file in the same directory.
/// 2. Sets restrictive permissions (0o600).
/// 3. Atomically renames to the target path.
///
/// # Security
///
/// On Unix systems the file ends up with mode 0o600 (user read/write only).
/// On Windows, files inherit directory permissions.
pub fn save_config_to(config: &AppConfig, path: &Path) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    // NamedTempFile is created 0o600 on Unix, before any data is written
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(json.as_bytes())?;
    file.as_file().sync_all()?;

    file.persist(path).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::StorageFull {
            std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                "Disk full: cannot save configuration. Free up space and try again.",
            )
        } else {
            e.error
        }
    })?;

    tracing::debug!("Saved config to {}", path.display());
    Ok(())
}

/// Loads the config from the data directory, or returns default if not found.
pub fn load_config() -> AppConfig {
    config_path().map_or_else(AppConfig::default, |path| load_config_from(&path))
}

/// Loads the config from `path`. Missing or unreadable files yield the default.
pub fn load_config_from(path: &Path) -> AppConfig {
    if let Ok(json) = std::fs::read_to_string(path) {
        match serde_json::from_str::<AppConfig>(&json) {
            Ok(config) => return config,
            Err(e) => tracing::warn!("Ignoring invalid config {}: {e}", path.display()),
        }
    }
    AppConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let config = AppConfig {
            output_format: OutputFormat::Json,
            crc_input_mode: InputMode::Hex,
            storage_unit: StorageUnit::Kilobyte,
            clock_unit: FrequencyUnit::KHz,
            target_unit: FrequencyUnit::Hz,
            time_unit: TimeUnit::Microseconds,
            duty_percent: 25.0,
        };
        save_config_to(&config, &path).unwrap();

        assert_eq!(load_config_from(&path), config);
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_config_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        save_config_to(&AppConfig::default(), &path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            load_config_from(&dir.path().join("nope.json")),
            AppConfig::default()
        );
    }

    #[test]
    fn test_corrupt_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config_from(&path), AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "output_format": "json" }"#).unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.clock_unit, FrequencyUnit::MHz);
        assert_eq!(config.duty_percent, 50.0);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::Text.to_string(), "text");
    }
}
