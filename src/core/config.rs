//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::core::errors::{EngineError, Result};
use crate::series::extract::ParsePolicy;
use crate::series::report::TrendStage;

/// Full engine configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub series: SeriesConfig,
    pub labels: LabelsConfig,
    pub paths: PathsConfig,
}

/// Reconstruction policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SeriesConfig {
    /// What to do with a non-numeric value under a daily key.
    pub parse_policy: ParsePolicy,
    /// Whether the trend comparator consumes the trimmed or pre-trim series.
    pub trend_stage: TrendStage,
}

/// Day-label rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LabelsConfig {
    /// strftime format for day labels, rendered in UTC.
    pub date_format: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            // Matches the historical chart labels, e.g. `5 Mar '20`.
            date_format: "%-d %b '%y".to_string(),
        }
    }
}

/// Filesystem paths used by cse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub store_db: PathBuf,
    pub jsonl_log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[CSE-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir.join(".config").join("cse").join("config.toml");
        let data = home_dir.join(".local").join("share").join("cse");
        Self {
            config_file: cfg,
            store_db: data.join("counters.sqlite3"),
            jsonl_log: data.join("activity.jsonl"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path;
    /// defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| EngineError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(EngineError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(raw) = env_var("CSE_SERIES_PARSE_POLICY") {
            self.series.parse_policy = raw.parse().map_err(|details| EngineError::ConfigParse {
                context: "env",
                details: format!("CSE_SERIES_PARSE_POLICY={raw:?}: {details}"),
            })?;
        }
        if let Some(raw) = env_var("CSE_SERIES_TREND_STAGE") {
            self.series.trend_stage = raw.parse().map_err(|details| EngineError::ConfigParse {
                context: "env",
                details: format!("CSE_SERIES_TREND_STAGE={raw:?}: {details}"),
            })?;
        }
        if let Some(raw) = env_var("CSE_LABELS_DATE_FORMAT") {
            self.labels.date_format = raw;
        }
        if let Some(raw) = env_var("CSE_PATHS_STORE_DB") {
            self.paths.store_db = PathBuf::from(raw);
        }
        if let Some(raw) = env_var("CSE_PATHS_JSONL_LOG") {
            self.paths.jsonl_log = PathBuf::from(raw);
        }
        Ok(())
    }

    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.labels.date_format.trim().is_empty() {
            return Err(EngineError::InvalidConfig {
                details: "labels.date_format must not be empty".to_string(),
            });
        }

        // A bad strftime string would otherwise only surface when the first
        // label is rendered.
        let has_error = StrftimeItems::new(&self.labels.date_format)
            .any(|item| matches!(item, Item::Error));
        if has_error {
            return Err(EngineError::InvalidConfig {
                details: format!(
                    "labels.date_format {:?} is not a valid strftime string",
                    self.labels.date_format
                ),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}
