//! Configuration loading and typed config structures for the Starlog engine.
//!
//! The engine configuration lives in `starlog-config.yaml` in the working
//! directory. Each profile may additionally carry a `config.yaml` in its
//! own directory whose `gameplay` section overrides individual knobs.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use starlog_actions::{ActionsError, GameplayConfig};
use tracing::warn;

/// Default engine config file name.
pub const CONFIG_FILE: &str = "starlog-config.yaml";

/// Environment variable overriding `storage.data_dir`.
pub const ENV_DATA_DIR: &str = "STARLOG_DATA_DIR";

/// Environment variable overriding `autopilot.profile`.
pub const ENV_PROFILE: &str = "STARLOG_PROFILE";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config: {source}")]
    Invalid {
        /// The range check that failed.
        #[from]
        source: ActionsError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `starlog-config.yaml`. Every field has a
/// default, so an empty file is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StarlogConfig {
    /// Where profile data lives.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging and log compaction.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Engine-wide gameplay defaults.
    #[serde(default)]
    pub gameplay: GameplayConfig,

    /// Unattended play settings for the engine binary.
    #[serde(default)]
    pub autopilot: AutopilotConfig,
}

impl StarlogConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `STARLOG_DATA_DIR` overrides `storage.data_dir`
    /// - `STARLOG_PROFILE` overrides `autopilot.profile`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a gameplay knob is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse and check configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a gameplay knob is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.gameplay.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process
    /// environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(profile) = lookup(ENV_PROFILE).filter(|v| !v.is_empty()) {
            self.autopilot.profile = profile;
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Root directory; profiles live under `<data_dir>/profiles/`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// Append a compaction snapshot to the logbook every N days.
    /// Zero disables compaction.
    #[serde(default = "default_snapshot_interval_days")]
    pub snapshot_interval_days: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            snapshot_interval_days: default_snapshot_interval_days(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_snapshot_interval_days() -> u64 {
    10
}

/// Autopilot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AutopilotConfig {
    /// Profile the engine binary plays.
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Maximum number of actions per run.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            max_steps: default_max_steps(),
        }
    }
}

fn default_profile() -> String {
    "offline".to_owned()
}

const fn default_max_steps() -> u32 {
    10
}

/// Per-knob overrides from a profile's `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameplayOverrides {
    /// Overrides [`GameplayConfig::xp_per_tick`].
    pub xp_per_tick: Option<i64>,
    /// Overrides [`GameplayConfig::power_loss_per_tick`].
    pub power_loss_per_tick: Option<i64>,
    /// Overrides [`GameplayConfig::anomaly_chance`].
    pub anomaly_chance: Option<f64>,
    /// Overrides [`GameplayConfig::anomaly_hull_loss`].
    pub anomaly_hull_loss: Option<i64>,
    /// Overrides [`GameplayConfig::xp_level_base`].
    pub xp_level_base: Option<i64>,
}

impl GameplayOverrides {
    /// `base` with every present override applied.
    pub fn apply(&self, base: &GameplayConfig) -> GameplayConfig {
        GameplayConfig {
            xp_per_tick: self.xp_per_tick.unwrap_or(base.xp_per_tick),
            power_loss_per_tick: self.power_loss_per_tick.unwrap_or(base.power_loss_per_tick),
            anomaly_chance: self.anomaly_chance.unwrap_or(base.anomaly_chance),
            anomaly_hull_loss: self.anomaly_hull_loss.unwrap_or(base.anomaly_hull_loss),
            xp_level_base: self.xp_level_base.unwrap_or(base.xp_level_base),
        }
    }
}

/// Shape of a profile's `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileConfig {
    /// Gameplay overrides for this profile.
    #[serde(default)]
    pub gameplay: GameplayOverrides,
}

/// Resolve the gameplay config of a profile.
///
/// A missing file means no overrides. An unreadable, malformed, or
/// out-of-range file is logged and ignored so that a corrupt override can
/// never lock a player out of their save.
pub fn load_profile_gameplay(path: &Path, base: &GameplayConfig) -> GameplayConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return base.clone(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Unreadable profile config, using defaults");
            return base.clone();
        }
    };
    let overrides = match serde_yml::from_str::<Option<ProfileConfig>>(&contents) {
        Ok(parsed) => parsed.unwrap_or_default(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Malformed profile config, using defaults");
            return base.clone();
        }
    };
    let merged = overrides.gameplay.apply(base);
    if let Err(err) = merged.validate() {
        warn!(path = %path.display(), error = %err, "Out-of-range profile config, using defaults");
        return base.clone();
    }
    merged
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    fn scratch_file(contents: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("starlog-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("config.yaml");
        std::fs::write(&file, contents).unwrap();
        (dir, file)
    }

    #[test]
    fn empty_yaml_is_all_defaults() {
        let config = StarlogConfig::parse("{}").unwrap();
        assert_eq!(config, StarlogConfig::default());
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.snapshot_interval_days, 10);
        assert_eq!(config.autopilot.profile, "offline");
        assert_eq!(config.gameplay, GameplayConfig::default());
    }

    #[test]
    fn sections_parse() {
        let yaml = r"
storage:
  data_dir: /var/lib/starlog
logging:
  level: debug
  json: true
  snapshot_interval_days: 5
gameplay:
  xp_per_tick: 7
  anomaly_chance: 0.25
autopilot:
  profile: bot
  max_steps: 3
";
        let config = StarlogConfig::parse(yaml).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/starlog"));
        assert!(config.logging.json);
        assert_eq!(config.logging.snapshot_interval_days, 5);
        assert_eq!(config.gameplay.xp_per_tick, 7);
        assert_eq!(config.gameplay.power_loss_per_tick, 1);
        assert_eq!(config.autopilot.max_steps, 3);
    }

    #[test]
    fn out_of_range_gameplay_is_rejected() {
        let err = StarlogConfig::parse("gameplay:\n  anomaly_chance: 2.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn overrides_replace_values() {
        let mut config = StarlogConfig::default();
        config.apply_overrides(|key| match key {
            ENV_DATA_DIR => Some("/tmp/saves".to_owned()),
            ENV_PROFILE => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/saves"));
        assert_eq!(config.autopilot.profile, "offline");
    }

    #[test]
    fn profile_overrides_merge_over_base() {
        let base = GameplayConfig {
            xp_per_tick: 9,
            ..GameplayConfig::default()
        };
        let (dir, file) = scratch_file("gameplay:\n  anomaly_chance: 0.0\n");
        let merged = load_profile_gameplay(&file, &base);
        assert_eq!(merged.xp_per_tick, 9);
        assert!(merged.anomaly_chance.abs() < f64::EPSILON);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_or_corrupt_profile_config_falls_back() {
        let base = GameplayConfig::default();
        let missing = std::env::temp_dir().join(format!("starlog-none-{}.yaml", uuid::Uuid::new_v4()));
        assert_eq!(load_profile_gameplay(&missing, &base), base);

        let (dir, file) = scratch_file("gameplay: [this, is: not valid");
        assert_eq!(load_profile_gameplay(&file, &base), base);
        std::fs::remove_dir_all(dir).unwrap();

        let (dir, file) = scratch_file("gameplay:\n  xp_level_base: 0\n");
        assert_eq!(load_profile_gameplay(&file, &base), base);
        std::fs::remove_dir_all(dir).unwrap();

        let (dir, file) = scratch_file("");
        assert_eq!(load_profile_gameplay(&file, &base), base);
        std::fs::remove_dir_all(dir).unwrap();
    }
}
