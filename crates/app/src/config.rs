use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Granularity the read side expects bucketed data at.
pub const ANALYTICS_READ_BUCKET_SIZE: u32 = 15;

/// Storage backend for tracked events, selected once at process start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    Relational,
    TimeSeries,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub db_path: PathBuf,
    #[serde(default = "default_bucket_size")]
    pub bucket_size: u32,
    #[serde(default = "default_run_every")]
    pub run_every: u32,
    /// Enables a daily pass rolling the main pass's buckets into hourly
    /// buckets instead of re-scanning raw data.
    #[serde(default)]
    pub daily_rollup: bool,
    #[serde(default = "default_raw_retention_days")]
    pub raw_retention_days: u32,
    #[serde(default = "default_bucketed_retention_days")]
    pub bucketed_retention_days: u32,
    #[serde(default)]
    pub sink: SinkKind,
}

impl AnalyticsConfig {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            bucket_size: default_bucket_size(),
            run_every: default_run_every(),
            daily_rollup: false,
            raw_retention_days: default_raw_retention_days(),
            bucketed_retention_days: default_bucketed_retention_days(),
            sink: SinkKind::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_bucket_size("bucket_size", self.bucket_size)?;
        if self.daily_rollup && self.bucket_size == 60 {
            return Err(AppError::InvalidConfiguration(
                "daily rollup needs a bucket size finer than 60 minutes".to_string(),
            ));
        }
        if self.run_every == 0 {
            return Err(AppError::InvalidConfiguration(
                "run_every cannot be zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }
}

fn check_bucket_size(field: &str, value: u32) -> Result<()> {
    if value == 0 || value > 60 {
        return Err(AppError::InvalidConfiguration(format!(
            "{field} must be between 1 and 60 minutes, got {value}"
        )));
    }
    if 60 % value != 0 {
        return Err(AppError::InvalidConfiguration(format!(
            "{field} must divide 60 to tile the hour, got {value}"
        )));
    }
    Ok(())
}

fn default_bucket_size() -> u32 {
    ANALYTICS_READ_BUCKET_SIZE
}

fn default_run_every() -> u32 {
    60
}

fn default_raw_retention_days() -> u32 {
    2
}

fn default_bucketed_retention_days() -> u32 {
    90
}
