//! Forecast configuration
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path (CLI `--config`, or the `CADENCE_CONFIG` env var)
//! 2. The override in the data dir (~/.local/share/cadence/config/cadence.toml)
//! 3. Embedded defaults (compiled into the binary)
//!
//! Keys missing from a file keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::detect::DetectionConfig;
use crate::error::{Error, Result};
use crate::writer::DEFAULT_QUEUE_CAPACITY;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/cadence.toml");

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "CADENCE_CONFIG";

/// Engine-wide configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub detection: DetectionConfig,
    /// Days of history summed for proportional distribution
    pub history_window_days: i64,
    /// Bound on queued schedule write-backs
    pub writer_queue_capacity: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            history_window_days: 90,
            writer_queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ForecastConfig {
    /// Load using the standard resolution order
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let path = explicit.map(Path::to_path_buf).or(env_path);

        match path {
            // An explicitly named file must exist
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                debug!("Loaded config from {}", path.display());
                parse_config(&content)
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    let content = fs::read_to_string(&path).map_err(|e| {
                        Error::Config(format!("Failed to read {}: {}", path.display(), e))
                    })?;
                    debug!("Loaded config override from {}", path.display());
                    parse_config(&content)
                }
                None => parse_config(DEFAULT_CONFIG),
            },
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cadence").join("config").join("cadence.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    detection: Option<RawDetection>,
    distribution: Option<RawDistribution>,
    writer: Option<RawWriter>,
}

#[derive(Debug, Deserialize)]
struct RawDetection {
    interval_tolerance: Option<f64>,
    amount_tolerance: Option<f64>,
    min_occurrences: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawDistribution {
    history_window_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawWriter {
    queue_capacity: Option<usize>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<ForecastConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = ForecastConfig::default();

    if let Some(detection) = raw.detection {
        if let Some(tolerance) = detection.interval_tolerance {
            config.detection.interval_tolerance = positive_fraction("interval_tolerance", tolerance)?;
        }
        if let Some(tolerance) = detection.amount_tolerance {
            config.detection.amount_tolerance = positive_fraction("amount_tolerance", tolerance)?;
        }
        if let Some(min) = detection.min_occurrences {
            config.detection.min_occurrences = min.max(2);
        }
    }

    if let Some(distribution) = raw.distribution {
        if let Some(days) = distribution.history_window_days {
            if days <= 0 {
                return Err(Error::Config(format!(
                    "history_window_days must be positive, got {}",
                    days
                )));
            }
            config.history_window_days = days;
        }
    }

    if let Some(writer) = raw.writer {
        if let Some(capacity) = writer.queue_capacity {
            if capacity == 0 {
                return Err(Error::Config("queue_capacity must be at least 1".into()));
            }
            config.writer_queue_capacity = capacity;
        }
    }

    Ok(config)
}

fn positive_fraction(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::Config(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}
