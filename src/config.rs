//! Analysis configuration
//!
//! Loaded from an optional JSON file; every field has a default so a
//! partial file (or none) works. Command line flags override what is read.
//!
//! ```json
//! {
//!   "percent_metrics": ["Hit Rate", "False Alarm Ratio"],
//!   "log": { "level": "debug", "format": "json" },
//!   "jobs": 4
//! }
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Environment variable holding the default log level
pub const LOG_ENV: &str = "SEPVAL_LOG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metrics stored as fractions and shown as percentages
    pub percent_metrics: Vec<String>,
    pub log: LogConfig,
    /// Worker threads for multi-file exports (None = one per CPU)
    pub jobs: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            percent_metrics: default_percent_metrics(),
            log: LogConfig::default(),
            jobs: None,
        }
    }
}

fn default_percent_metrics() -> Vec<String> {
    [
        "Percent Correct",
        "Hit Rate",
        "False Alarm Rate",
        "Frequency of Misses",
        "Frequency of Hits",
        "Probability of Correct Negatives",
        "Frequency of Correct Negatives",
        "False Alarm Ratio",
        "Detection Failure Ratio",
        "Threat Score",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load `path` if given, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Human,
            timestamps: false,
        }
    }
}

impl LogConfig {
    /// Level from `SEPVAL_LOG` when set and valid, else the configured one
    pub fn with_env(mut self) -> Self {
        if let Some(level) = std::env::var(LOG_ENV).ok().and_then(|v| LogLevel::parse(&v)) {
            self.level = level;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Human,
    Json,
}
