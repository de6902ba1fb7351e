//! reaper.toml configuration parser.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag that opts an autoscaling group into termination.
pub const DEFAULT_ELIGIBILITY_KEY: &str = "can-be-terminated";
pub const DEFAULT_ELIGIBILITY_VALUE: &str = "true";
/// Tag that binds several groups into one termination group.
pub const DEFAULT_GROUPING_KEY: &str = "instance-terminator-group";
pub const DEFAULT_INTERVAL: &str = "24h";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaperConfig {
    pub tags: TagsConfig,
    pub fleet: FleetConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    pub eligibility_key: String,
    pub eligibility_value: String,
    pub grouping_key: String,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            eligibility_key: DEFAULT_ELIGIBILITY_KEY.to_string(),
            eligibility_value: DEFAULT_ELIGIBILITY_VALUE.to_string(),
            grouping_key: DEFAULT_GROUPING_KEY.to_string(),
        }
    }
}

/// Where the fleet is read from and terminations are sent to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Live AWS Auto Scaling and EC2 APIs.
    #[default]
    Aws,
    /// A JSON fleet snapshot on disk.
    Snapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub backend: Backend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
    /// Log the chosen instance instead of terminating it.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Time between invocations in daemon mode (e.g. "30m", "24h").
    pub interval: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL.to_string(),
        }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.interval)
    }
}

impl ReaperConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tags = &self.tags;
        if tags.eligibility_key.is_empty() {
            return Err(ConfigError::Invalid("tags.eligibility_key is empty".into()));
        }
        if tags.grouping_key.is_empty() {
            return Err(ConfigError::Invalid("tags.grouping_key is empty".into()));
        }
        if tags.eligibility_key == tags.grouping_key {
            return Err(ConfigError::Invalid(format!(
                "tags.eligibility_key and tags.grouping_key are both {:?}",
                tags.grouping_key
            )));
        }
        if self.fleet.backend == Backend::Snapshot && self.fleet.snapshot.is_none() {
            return Err(ConfigError::Invalid(
                "fleet.backend = \"snapshot\" requires fleet.snapshot".into(),
            ));
        }
        if self.schedule.interval()?.is_zero() {
            return Err(ConfigError::Invalid("schedule.interval must be non-zero".into()));
        }
        Ok(())
    }
}

/// Parse a duration like "90", "30s", "15m" or "24h".
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    let (digits, multiplier) = if let Some(secs) = s.strip_suffix('s') {
        (secs, 1)
    } else if let Some(mins) = s.strip_suffix('m') {
        (mins, 60)
    } else if let Some(hours) = s.strip_suffix('h') {
        (hours, 60 * 60)
    } else {
        (s, 1)
    };

    digits
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidDuration(s.to_string()))
}
